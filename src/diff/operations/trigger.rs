use super::ChangeKind;
use crate::catalog::id::StableId;

#[derive(Debug, Clone)]
pub enum TriggerChange {
    Create {
        schema: String,
        table: String,
        name: String,
        /// Captured `CREATE TRIGGER …` statement.
        definition: String,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
}

impl TriggerChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            TriggerChange::Create {
                schema,
                table,
                name,
                ..
            }
            | TriggerChange::Drop {
                schema,
                table,
                name,
            } => StableId::Trigger {
                schema: schema.clone(),
                table: table.clone(),
                name: name.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            TriggerChange::Create { .. } => ChangeKind::Create,
            TriggerChange::Drop { .. } => ChangeKind::Drop,
        }
    }
}
