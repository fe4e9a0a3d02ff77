pub mod constraint;
pub mod function;
pub mod index;
pub mod materialized_view;
pub mod policy;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod types;
pub mod view;

use crate::diff::operations::Change;

/// Trait for rendering SQL from changes
pub trait SqlRenderer {
    fn to_sql(&self) -> Vec<RenderedSql>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone)]
pub struct RenderedSql {
    pub safety: Safety,
    pub sql: String,
}

impl RenderedSql {
    pub fn new(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Destructive,
        }
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Trim trailing whitespace/semicolons from a captured definition and close
/// it with exactly one semicolon.
pub fn normalize_statement(sql: &str) -> String {
    format!("{};", sql.trim().trim_end_matches(';').trim_end())
}

/// Upgrade a captured `CREATE …` prefix to `CREATE OR REPLACE …` by literal
/// prefix substitution. Definitions captured from pg_get_functiondef already
/// carry OR REPLACE and pass through unchanged.
pub fn ensure_or_replace(definition: &str) -> String {
    let trimmed = definition.trim_start();
    if trimmed.starts_with("CREATE OR REPLACE ") {
        definition.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("CREATE ") {
        format!("CREATE OR REPLACE {}", rest)
    } else {
        definition.to_string()
    }
}

impl SqlRenderer for Change {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            Change::Schema(c) => c.to_sql(),
            Change::Table(c) => c.to_sql(),
            Change::View(c) => c.to_sql(),
            Change::MaterializedView(c) => c.to_sql(),
            Change::Index(c) => c.to_sql(),
            Change::Sequence(c) => c.to_sql(),
            Change::Constraint(c) => c.to_sql(),
            Change::Trigger(c) => c.to_sql(),
            Change::Function(c) => c.to_sql(),
            Change::Policy(c) => c.to_sql(),
            Change::Type(c) => c.to_sql(),
        }
    }
}

/// Emit the ordered statement list for an ordered change list.
pub fn emit_all(changes: &[Change]) -> Vec<RenderedSql> {
    changes.iter().flat_map(Change::to_sql).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("it's"), "'it''s'");
    }

    #[test]
    fn test_normalize_statement() {
        assert_eq!(normalize_statement("SELECT 1"), "SELECT 1;");
        assert_eq!(normalize_statement("SELECT 1;;  \n"), "SELECT 1;");
    }

    #[test]
    fn test_ensure_or_replace() {
        assert_eq!(
            ensure_or_replace("CREATE VIEW v AS SELECT 1"),
            "CREATE OR REPLACE VIEW v AS SELECT 1"
        );
        assert_eq!(
            ensure_or_replace("CREATE OR REPLACE FUNCTION f() …"),
            "CREATE OR REPLACE FUNCTION f() …"
        );
    }
}
