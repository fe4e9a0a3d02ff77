use crate::catalog::policy::Policy;
use crate::diff::operations::PolicyChange;
use crate::render::{RenderedSql, SqlRenderer, quote_ident};
use itertools::Itertools;

impl SqlRenderer for PolicyChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            PolicyChange::Create { policy } => vec![RenderedSql::new(render_create_policy(policy))],
            PolicyChange::Drop {
                schema,
                table,
                name,
            } => vec![RenderedSql::new(format!(
                "DROP POLICY {} ON {}.{};",
                quote_ident(name),
                quote_ident(schema),
                quote_ident(table)
            ))],
            PolicyChange::Alter {
                schema,
                table,
                name,
                roles,
                using_expr,
                with_check_expr,
            } => {
                let mut clauses = Vec::new();
                if let Some(roles) = roles {
                    clauses.push(format!(" TO {}", render_roles(roles)));
                }
                if let Some(expr) = using_expr {
                    clauses.push(format!(" USING ({})", expr));
                }
                if let Some(expr) = with_check_expr {
                    clauses.push(format!(" WITH CHECK ({})", expr));
                }
                vec![RenderedSql::new(format!(
                    "ALTER POLICY {} ON {}.{}{};",
                    quote_ident(name),
                    quote_ident(schema),
                    quote_ident(table),
                    clauses.join("")
                ))]
            }
        }
    }
}

fn render_roles(roles: &[String]) -> String {
    if roles.is_empty() {
        "PUBLIC".to_string()
    } else {
        roles.iter().map(|role| quote_ident(role)).join(", ")
    }
}

fn render_create_policy(policy: &Policy) -> String {
    let mut sql = format!(
        "CREATE POLICY {} ON {}.{} AS {} FOR {}",
        quote_ident(&policy.name),
        quote_ident(&policy.schema),
        quote_ident(&policy.table),
        if policy.permissive {
            "PERMISSIVE"
        } else {
            "RESTRICTIVE"
        },
        policy.command.sql_keyword(),
    );

    if !policy.roles.is_empty() {
        sql.push_str(&format!(" TO {}", render_roles(&policy.roles)));
    }
    if let Some(expr) = &policy.using_expr {
        sql.push_str(&format!(" USING ({})", expr));
    }
    if let Some(expr) = &policy.with_check_expr {
        sql.push_str(&format!(" WITH CHECK ({})", expr));
    }
    sql.push(';');
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::policy::PolicyCommand;

    #[test]
    fn test_render_create_policy() {
        let change = PolicyChange::Create {
            policy: Box::new(Policy {
                schema: "app".to_string(),
                table: "users".to_string(),
                name: "tenant_isolation".to_string(),
                command: PolicyCommand::Select,
                permissive: true,
                roles: vec!["app_user".to_string()],
                using_expr: Some("tenant_id = 1".to_string()),
                with_check_expr: None,
                oid: 0,
            }),
        };
        assert_eq!(
            change.to_sql()[0].sql,
            "CREATE POLICY \"tenant_isolation\" ON \"app\".\"users\" AS PERMISSIVE FOR SELECT TO \"app_user\" USING (tenant_id = 1);"
        );
    }

    #[test]
    fn test_render_alter_policy_only_changed_clauses() {
        let change = PolicyChange::Alter {
            schema: "app".to_string(),
            table: "users".to_string(),
            name: "tenant_isolation".to_string(),
            roles: None,
            using_expr: Some("tenant_id = 2".to_string()),
            with_check_expr: None,
        };
        assert_eq!(
            change.to_sql()[0].sql,
            "ALTER POLICY \"tenant_isolation\" ON \"app\".\"users\" USING (tenant_id = 2);"
        );
    }
}
