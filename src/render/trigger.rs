use crate::diff::operations::TriggerChange;
use crate::render::{RenderedSql, SqlRenderer, normalize_statement, quote_ident};

impl SqlRenderer for TriggerChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            // pg_get_triggerdef already yields the full CREATE TRIGGER.
            TriggerChange::Create { definition, .. } => {
                vec![RenderedSql::new(normalize_statement(definition))]
            }
            TriggerChange::Drop {
                schema,
                table,
                name,
            } => vec![RenderedSql::new(format!(
                "DROP TRIGGER {} ON {}.{};",
                quote_ident(name),
                quote_ident(schema),
                quote_ident(table)
            ))],
        }
    }
}
