use crate::diff::operations::ConstraintChange;
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for ConstraintChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ConstraintChange::Create {
                schema,
                table,
                name,
                definition,
            } => vec![RenderedSql::new(format!(
                "ALTER TABLE {}.{} ADD CONSTRAINT {} {};",
                quote_ident(schema),
                quote_ident(table),
                quote_ident(name),
                definition.trim().trim_end_matches(';'),
            ))],
            ConstraintChange::Drop {
                schema,
                table,
                name,
            } => vec![RenderedSql::new(format!(
                "ALTER TABLE {}.{} DROP CONSTRAINT {};",
                quote_ident(schema),
                quote_ident(table),
                quote_ident(name)
            ))],
        }
    }
}
