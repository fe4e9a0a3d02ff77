use super::ChangeKind;
use crate::catalog::id::StableId;

#[derive(Debug, Clone)]
pub enum ConstraintChange {
    Create {
        schema: String,
        table: String,
        name: String,
        /// Captured constraint body from pg_get_constraintdef.
        definition: String,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
}

impl ConstraintChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            ConstraintChange::Create {
                schema,
                table,
                name,
                ..
            }
            | ConstraintChange::Drop {
                schema,
                table,
                name,
            } => StableId::Constraint {
                schema: schema.clone(),
                table: table.clone(),
                name: name.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ConstraintChange::Create { .. } => ChangeKind::Create,
            ConstraintChange::Drop { .. } => ChangeKind::Drop,
        }
    }
}
