use super::ChangeKind;
use crate::catalog::id::StableId;

#[derive(Debug, Clone)]
pub enum ViewChange {
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

impl ViewChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            ViewChange::Create { schema, name, .. }
            | ViewChange::Drop { schema, name }
            | ViewChange::Replace { schema, name, .. } => StableId::View {
                schema: schema.clone(),
                name: name.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ViewChange::Create { .. } => ChangeKind::Create,
            ViewChange::Drop { .. } => ChangeKind::Drop,
            ViewChange::Replace { .. } => ChangeKind::Replace,
        }
    }
}
