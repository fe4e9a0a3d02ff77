use crate::diff::operations::MaterializedViewChange;
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for MaterializedViewChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            MaterializedViewChange::Create {
                schema,
                name,
                definition,
            } => vec![RenderedSql::new(format!(
                "CREATE MATERIALIZED VIEW {}.{} AS\n{};",
                quote_ident(schema),
                quote_ident(name),
                definition.trim().trim_end_matches(';'),
            ))],
            MaterializedViewChange::Drop { schema, name } => vec![RenderedSql::new(format!(
                "DROP MATERIALIZED VIEW {}.{};",
                quote_ident(schema),
                quote_ident(name)
            ))],
            MaterializedViewChange::Replace {
                schema,
                name,
                definition,
            } => vec![RenderedSql::new(format!(
                "CREATE OR REPLACE MATERIALIZED VIEW {}.{} AS\n{};",
                quote_ident(schema),
                quote_ident(name),
                definition.trim().trim_end_matches(';'),
            ))],
        }
    }
}
