use super::ChangeKind;
use crate::catalog::id::StableId;
use crate::catalog::policy::Policy;

/// ALTER POLICY can change roles, USING and WITH CHECK; it cannot change the
/// command or the permissive flag, and it cannot remove an expression. The
/// differ falls back to Drop + Create in those cases.
#[derive(Debug, Clone)]
pub enum PolicyChange {
    Create {
        policy: Box<Policy>,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
    Alter {
        schema: String,
        table: String,
        name: String,
        roles: Option<Vec<String>>,
        using_expr: Option<String>,
        with_check_expr: Option<String>,
    },
}

impl PolicyChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            PolicyChange::Create { policy } => policy.stable_id(),
            PolicyChange::Drop {
                schema,
                table,
                name,
            }
            | PolicyChange::Alter {
                schema,
                table,
                name,
                ..
            } => StableId::Policy {
                schema: schema.clone(),
                table: table.clone(),
                name: name.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            PolicyChange::Create { .. } => ChangeKind::Create,
            PolicyChange::Drop { .. } => ChangeKind::Drop,
            PolicyChange::Alter { .. } => ChangeKind::Alter,
        }
    }
}
