use super::ChangeKind;
use crate::catalog::function::{Function, FunctionKind};
use crate::catalog::id::StableId;

#[derive(Debug, Clone)]
pub enum FunctionChange {
    Create {
        function: Box<Function>,
    },
    Drop {
        schema: String,
        name: String,
        arguments: String,
        function_kind: FunctionKind,
    },
    /// `CREATE OR REPLACE`; only valid when the result type is unchanged,
    /// which the differ guarantees.
    Replace {
        function: Box<Function>,
    },
}

impl FunctionChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            FunctionChange::Create { function } | FunctionChange::Replace { function } => {
                function.stable_id()
            }
            FunctionChange::Drop {
                schema,
                name,
                arguments,
                ..
            } => StableId::Function {
                schema: schema.clone(),
                name: name.clone(),
                arguments: arguments.clone(),
            },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            FunctionChange::Create { .. } => ChangeKind::Create,
            FunctionChange::Drop { .. } => ChangeKind::Drop,
            FunctionChange::Replace { .. } => ChangeKind::Replace,
        }
    }
}
