use crate::diff::operations::IndexChange;
use crate::render::{RenderedSql, SqlRenderer, normalize_statement, quote_ident};

impl SqlRenderer for IndexChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            // The definition is the pg_get_indexdef capture; only the
            // trailing semicolon needs normalizing.
            IndexChange::Create { definition, .. } => {
                vec![RenderedSql::new(normalize_statement(definition))]
            }
            IndexChange::Drop { schema, name } => vec![RenderedSql::new(format!(
                "DROP INDEX {}.{};",
                quote_ident(schema),
                quote_ident(name)
            ))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_reuses_captured_definition() {
        let change = IndexChange::Create {
            schema: "app".to_string(),
            name: "idx_users_id".to_string(),
            definition: "CREATE INDEX idx_users_id ON app.users USING btree (id)".to_string(),
        };
        assert_eq!(
            change.to_sql()[0].sql,
            "CREATE INDEX idx_users_id ON app.users USING btree (id);"
        );
    }

    #[test]
    fn test_render_drop_index() {
        let change = IndexChange::Drop {
            schema: "public".to_string(),
            name: "idx_t_id".to_string(),
        };
        assert_eq!(change.to_sql()[0].sql, "DROP INDEX \"public\".\"idx_t_id\";");
    }
}
