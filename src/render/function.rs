use crate::diff::operations::FunctionChange;
use crate::render::{RenderedSql, SqlRenderer, ensure_or_replace, normalize_statement, quote_ident};

impl SqlRenderer for FunctionChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            FunctionChange::Create { function } => {
                vec![RenderedSql::new(normalize_statement(&function.definition))]
            }
            FunctionChange::Drop {
                schema,
                name,
                arguments,
                function_kind,
            } => vec![RenderedSql::new(format!(
                "DROP {} {}.{}({});",
                function_kind.sql_keyword(),
                quote_ident(schema),
                quote_ident(name),
                arguments
            ))],
            FunctionChange::Replace { function } => vec![RenderedSql::new(normalize_statement(
                &ensure_or_replace(&function.definition),
            ))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::function::{Function, FunctionKind};

    #[test]
    fn test_render_drop_function_with_identity_arguments() {
        let change = FunctionChange::Drop {
            schema: "app".to_string(),
            name: "touch".to_string(),
            arguments: "integer, text".to_string(),
            function_kind: FunctionKind::Function,
        };
        assert_eq!(
            change.to_sql()[0].sql,
            "DROP FUNCTION \"app\".\"touch\"(integer, text);"
        );
    }

    #[test]
    fn test_replace_upgrades_create_prefix() {
        let change = FunctionChange::Replace {
            function: Box::new(Function {
                schema: "app".to_string(),
                name: "touch".to_string(),
                arguments: String::new(),
                kind: FunctionKind::Function,
                return_type: Some("void".to_string()),
                definition: "CREATE FUNCTION app.touch() RETURNS void AS $$ $$ LANGUAGE sql"
                    .to_string(),
                oid: 0,
            }),
        };
        assert!(
            change.to_sql()[0]
                .sql
                .starts_with("CREATE OR REPLACE FUNCTION app.touch()")
        );
    }
}
