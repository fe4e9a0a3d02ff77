use crate::diff::operations::SchemaChange;
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for SchemaChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            SchemaChange::Create { name } => vec![RenderedSql::new(format!(
                "CREATE SCHEMA {};",
                quote_ident(name)
            ))],
            SchemaChange::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP SCHEMA {};",
                quote_ident(name)
            ))],
        }
    }
}
