use super::ChangeKind;
use crate::catalog::custom_type::CustomType;
use crate::catalog::id::StableId;

#[derive(Debug, Clone)]
pub enum TypeChange {
    Create {
        custom_type: Box<CustomType>,
    },
    Drop {
        schema: String,
        name: String,
    },
    Alter {
        schema: String,
        name: String,
        actions: Vec<TypeAction>,
    },
}

impl TypeChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            TypeChange::Create { custom_type } => custom_type.stable_id(),
            TypeChange::Drop { schema, name } | TypeChange::Alter { schema, name, .. } => {
                StableId::Type {
                    schema: schema.clone(),
                    name: name.clone(),
                }
            }
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            TypeChange::Create { .. } => ChangeKind::Create,
            TypeChange::Drop { .. } => ChangeKind::Drop,
            TypeChange::Alter { .. } => ChangeKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TypeAction {
    /// Appends to the end of the enum; the differ only emits this when the
    /// old label list is a strict prefix of the new one.
    AddEnumValue { value: String },
    AddAttribute { name: String, data_type: String },
    DropAttribute { name: String },
    AlterAttributeType { name: String, data_type: String },
}
