use super::ChangeKind;
use crate::catalog::id::StableId;
use crate::catalog::sequence::{Sequence, SequenceOwner};

#[derive(Debug, Clone)]
pub enum SequenceChange {
    /// Creation never includes OWNED BY; ownership is a separate Alter so it
    /// can be ordered after the owning table exists.
    Create {
        sequence: Box<Sequence>,
    },
    Drop {
        schema: String,
        name: String,
    },
    Alter {
        schema: String,
        name: String,
        actions: Vec<SequenceAction>,
    },
}

impl SequenceChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            SequenceChange::Create { sequence } => sequence.stable_id(),
            SequenceChange::Drop { schema, name }
            | SequenceChange::Alter { schema, name, .. } => StableId::Sequence {
                schema: schema.clone(),
                name: name.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            SequenceChange::Create { .. } => ChangeKind::Create,
            SequenceChange::Drop { .. } => ChangeKind::Drop,
            SequenceChange::Alter { .. } => ChangeKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SequenceAction {
    SetDataType(String),
    SetIncrement(i64),
    SetMinValue(i64),
    SetMaxValue(i64),
    SetStart(i64),
    SetCache(i64),
    SetCycle(bool),
    SetOwnedBy(SequenceOwner),
    DropOwnedBy,
}
