use super::ChangeKind;
use crate::catalog::id::StableId;

#[derive(Debug, Clone)]
pub enum MaterializedViewChange {
    Create {
        schema: String,
        name: String,
        definition: String,
    },
    Drop {
        schema: String,
        name: String,
    },
    Replace {
        schema: String,
        name: String,
        definition: String,
    },
}

impl MaterializedViewChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            MaterializedViewChange::Create { schema, name, .. }
            | MaterializedViewChange::Drop { schema, name }
            | MaterializedViewChange::Replace { schema, name, .. } => StableId::MaterializedView {
                schema: schema.clone(),
                name: name.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            MaterializedViewChange::Create { .. } => ChangeKind::Create,
            MaterializedViewChange::Drop { .. } => ChangeKind::Drop,
            MaterializedViewChange::Replace { .. } => ChangeKind::Replace,
        }
    }
}
