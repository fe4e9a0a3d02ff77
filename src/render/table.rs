//! SQL rendering for table changes

use crate::catalog::table::{Column, Table};
use crate::diff::operations::{TableAction, TableChange};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};
use itertools::Itertools;

impl SqlRenderer for TableChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            TableChange::Create { table } => vec![RenderedSql::new(render_create_table(table))],
            TableChange::Drop { schema, name } => vec![RenderedSql::destructive(format!(
                "DROP TABLE {}.{};",
                quote_ident(schema),
                quote_ident(name)
            ))],
            TableChange::Alter {
                schema,
                name,
                actions,
            } => actions
                .iter()
                .map(|action| render_table_action(action, schema, name))
                .collect(),
        }
    }
}

fn render_column_clause(column: &Column) -> String {
    let default_clause = match &column.default {
        Some(default) => format!(" DEFAULT {}", default),
        None => String::new(),
    };
    let not_null_clause = if column.not_null { " NOT NULL" } else { "" };

    format!(
        "{} {}{}{}",
        quote_ident(&column.name),
        column.data_type,
        default_clause,
        not_null_clause
    )
}

/// Columns render in extractor position order; that order is the observable
/// one a fresh CREATE TABLE reproduces.
pub fn render_create_table(table: &Table) -> String {
    let mut columns: Vec<&Column> = table.columns.iter().collect();
    columns.sort_by_key(|column| column.position);

    let column_list = columns
        .iter()
        .map(|column| format!("    {}", render_column_clause(column)))
        .join(",\n");

    if column_list.is_empty() {
        format!(
            "CREATE TABLE {}.{} ();",
            quote_ident(&table.schema),
            quote_ident(&table.name)
        )
    } else {
        format!(
            "CREATE TABLE {}.{} (\n{}\n);",
            quote_ident(&table.schema),
            quote_ident(&table.name),
            column_list
        )
    }
}

fn render_table_action(action: &TableAction, schema: &str, table: &str) -> RenderedSql {
    let target = format!("{}.{}", quote_ident(schema), quote_ident(table));
    match action {
        TableAction::AddColumn { column } => RenderedSql::new(format!(
            "ALTER TABLE {} ADD COLUMN {};",
            target,
            render_column_clause(column)
        )),
        TableAction::DropColumn { name } => RenderedSql::destructive(format!(
            "ALTER TABLE {} DROP COLUMN {};",
            target,
            quote_ident(name)
        )),
        TableAction::AlterColumnType {
            name,
            new_type,
            using,
        } => {
            let using_clause = match using {
                Some(expr) => format!(" USING ({})", expr),
                None => String::new(),
            };
            RenderedSql::destructive(format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {}{};",
                target,
                quote_ident(name),
                new_type,
                using_clause
            ))
        }
        TableAction::SetColumnDefault { name, default } => RenderedSql::new(format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
            target,
            quote_ident(name),
            default
        )),
        TableAction::DropColumnDefault { name } => RenderedSql::new(format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;",
            target,
            quote_ident(name)
        )),
        TableAction::SetColumnNotNull { name } => RenderedSql::new(format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL;",
            target,
            quote_ident(name)
        )),
        TableAction::DropColumnNotNull { name } => RenderedSql::new(format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL;",
            target,
            quote_ident(name)
        )),
        TableAction::EnableRowSecurity => RenderedSql::new(format!(
            "ALTER TABLE {} ENABLE ROW LEVEL SECURITY;",
            target
        )),
        TableAction::DisableRowSecurity => RenderedSql::new(format!(
            "ALTER TABLE {} DISABLE ROW LEVEL SECURITY;",
            target
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str, not_null: bool, position: i32) -> Column {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
            default: None,
            not_null,
            position,
        }
    }

    #[test]
    fn test_render_create_table() {
        let table = Table {
            schema: "app".to_string(),
            name: "users".to_string(),
            columns: vec![
                column("id", "bigint", true, 1),
                column("email", "text", false, 2),
            ],
            rls_enabled: false,
            oid: 0,
        };

        let change = TableChange::Create {
            table: Box::new(table),
        };
        let sql = change.to_sql();
        assert_eq!(sql.len(), 1);
        assert_eq!(
            sql[0].sql,
            "CREATE TABLE \"app\".\"users\" (\n    \"id\" bigint NOT NULL,\n    \"email\" text\n);"
        );
    }

    #[test]
    fn test_render_add_column() {
        let change = TableChange::Alter {
            schema: "public".to_string(),
            name: "users".to_string(),
            actions: vec![TableAction::AddColumn {
                column: column("email", "text", false, 2),
            }],
        };

        let sql = change.to_sql();
        assert_eq!(
            sql[0].sql,
            "ALTER TABLE \"public\".\"users\" ADD COLUMN \"email\" text;"
        );
    }

    #[test]
    fn test_render_alter_type_with_using() {
        let change = TableChange::Alter {
            schema: "public".to_string(),
            name: "t".to_string(),
            actions: vec![TableAction::AlterColumnType {
                name: "n".to_string(),
                new_type: "integer".to_string(),
                using: Some("n::integer".to_string()),
            }],
        };

        let sql = change.to_sql();
        assert_eq!(
            sql[0].sql,
            "ALTER TABLE \"public\".\"t\" ALTER COLUMN \"n\" TYPE integer USING (n::integer);"
        );
        assert_eq!(sql[0].safety, crate::render::Safety::Destructive);
    }

    #[test]
    fn test_drop_table_is_destructive() {
        let change = TableChange::Drop {
            schema: "public".to_string(),
            name: "users".to_string(),
        };
        let sql = change.to_sql();
        assert_eq!(sql[0].sql, "DROP TABLE \"public\".\"users\";");
        assert_eq!(sql[0].safety, crate::render::Safety::Destructive);
    }

    #[test]
    fn test_render_rls_toggles() {
        let change = TableChange::Alter {
            schema: "public".to_string(),
            name: "users".to_string(),
            actions: vec![TableAction::EnableRowSecurity],
        };
        assert_eq!(
            change.to_sql()[0].sql,
            "ALTER TABLE \"public\".\"users\" ENABLE ROW LEVEL SECURITY;"
        );
    }
}
