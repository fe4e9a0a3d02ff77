use super::ChangeKind;
use crate::catalog::id::StableId;

/// Indexes have no ALTER path for anything the differ tracks; a changed
/// definition is drop + create.
#[derive(Debug, Clone)]
pub enum IndexChange {
    Create {
        schema: String,
        name: String,
        /// Captured `CREATE [UNIQUE] INDEX …` statement.
        definition: String,
    },
    Drop {
        schema: String,
        name: String,
    },
}

impl IndexChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            IndexChange::Create { schema, name, .. } | IndexChange::Drop { schema, name } => {
                StableId::Index {
                    schema: schema.clone(),
                    name: name.clone(),
                }
            }
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            IndexChange::Create { .. } => ChangeKind::Create,
            IndexChange::Drop { .. } => ChangeKind::Drop,
        }
    }
}
