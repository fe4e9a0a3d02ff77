//! Table operations

use super::ChangeKind;
use crate::catalog::id::StableId;
use crate::catalog::table::{Column, Table};

#[derive(Debug, Clone)]
pub enum TableChange {
    Create {
        table: Box<Table>,
    },
    Drop {
        schema: String,
        name: String,
    },
    Alter {
        schema: String,
        name: String,
        actions: Vec<TableAction>,
    },
}

impl TableChange {
    pub fn stable_id(&self) -> StableId {
        match self {
            TableChange::Create { table } => table.stable_id(),
            TableChange::Drop { schema, name } | TableChange::Alter { schema, name, .. } => {
                StableId::Table {
                    schema: schema.clone(),
                    name: name.clone(),
                }
            }
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            TableChange::Create { .. } => ChangeKind::Create,
            TableChange::Drop { .. } => ChangeKind::Drop,
            TableChange::Alter { .. } => ChangeKind::Alter,
        }
    }
}

/// Sub-operations within ALTER TABLE. The differ guarantees that a drop of a
/// column name precedes an add of the same name, and that a type change on a
/// column precedes default changes on that column.
#[derive(Debug, Clone)]
pub enum TableAction {
    AddColumn {
        column: Column,
    },
    DropColumn {
        name: String,
    },
    AlterColumnType {
        name: String,
        new_type: String,
        /// Optional conversion expression for `USING (…)`.
        using: Option<String>,
    },
    SetColumnDefault {
        name: String,
        default: String,
    },
    DropColumnDefault {
        name: String,
    },
    SetColumnNotNull {
        name: String,
    },
    DropColumnNotNull {
        name: String,
    },
    EnableRowSecurity,
    DisableRowSecurity,
}
