use super::ChangeKind;
use crate::catalog::id::StableId;

/// Schemas have no ALTER path worth taking: a rename is a different schema,
/// so modification is always drop + create.
#[derive(Debug, Clone)]
pub enum SchemaChange {
    Create { name: String },
    Drop { name: String },
}

impl SchemaChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            SchemaChange::Create { name } | SchemaChange::Drop { name } => StableId::Schema {
                name: name.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            SchemaChange::Create { .. } => ChangeKind::Create,
            SchemaChange::Drop { .. } => ChangeKind::Drop,
        }
    }
}
