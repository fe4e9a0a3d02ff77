use crate::catalog::custom_type::{CustomType, TypeKind};
use crate::diff::operations::{TypeAction, TypeChange};
use crate::render::{RenderedSql, SqlRenderer, escape_string, quote_ident};
use itertools::Itertools;

impl SqlRenderer for TypeChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            TypeChange::Create { custom_type } => {
                vec![RenderedSql::new(render_create_type(custom_type))]
            }
            TypeChange::Drop { schema, name } => vec![RenderedSql::new(format!(
                "DROP TYPE {}.{};",
                quote_ident(schema),
                quote_ident(name)
            ))],
            TypeChange::Alter {
                schema,
                name,
                actions,
            } => actions
                .iter()
                .map(|action| render_type_action(action, schema, name))
                .collect(),
        }
    }
}

fn render_create_type(custom_type: &CustomType) -> String {
    let target = format!(
        "{}.{}",
        quote_ident(&custom_type.schema),
        quote_ident(&custom_type.name)
    );
    match &custom_type.kind {
        TypeKind::Enum { labels } => {
            let label_list = labels.iter().map(|label| escape_string(label)).join(", ");
            format!("CREATE TYPE {} AS ENUM ({});", target, label_list)
        }
        TypeKind::Composite { attributes } => {
            let attribute_list = attributes
                .iter()
                .map(|attribute| format!("{} {}", quote_ident(&attribute.name), attribute.data_type))
                .join(", ");
            format!("CREATE TYPE {} AS ({});", target, attribute_list)
        }
    }
}

fn render_type_action(action: &TypeAction, schema: &str, name: &str) -> RenderedSql {
    let target = format!("{}.{}", quote_ident(schema), quote_ident(name));
    let sql = match action {
        TypeAction::AddEnumValue { value } => {
            format!("ALTER TYPE {} ADD VALUE {};", target, escape_string(value))
        }
        TypeAction::AddAttribute { name, data_type } => format!(
            "ALTER TYPE {} ADD ATTRIBUTE {} {};",
            target,
            quote_ident(name),
            data_type
        ),
        TypeAction::DropAttribute { name } => {
            format!("ALTER TYPE {} DROP ATTRIBUTE {};", target, quote_ident(name))
        }
        TypeAction::AlterAttributeType { name, data_type } => format!(
            "ALTER TYPE {} ALTER ATTRIBUTE {} SET DATA TYPE {};",
            target,
            quote_ident(name),
            data_type
        ),
    };
    RenderedSql::new(sql)
}
