//! SQL rendering for view changes

use crate::diff::operations::ViewChange;
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for ViewChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ViewChange::Create {
                schema,
                name,
                definition,
            } => vec![RenderedSql::new(format!(
                "CREATE VIEW {}.{} AS\n{};",
                quote_ident(schema),
                quote_ident(name),
                definition.trim().trim_end_matches(';'),
            ))],
            ViewChange::Drop { schema, name } => vec![RenderedSql::new(format!(
                "DROP VIEW {}.{};",
                quote_ident(schema),
                quote_ident(name)
            ))],
            ViewChange::Replace {
                schema,
                name,
                definition,
            } => vec![RenderedSql::new(format!(
                "CREATE OR REPLACE VIEW {}.{} AS\n{};",
                quote_ident(schema),
                quote_ident(name),
                definition.trim().trim_end_matches(';'),
            ))],
        }
    }
}
