//! The change taxonomy: one tagged variant per (entity, operation) pair.
//!
//! A `Change` carries the affected entity's `StableId`, its operation kind,
//! and the minimal payload the emitter needs. Changes are immutable; the
//! solver orders them by index.

use crate::catalog::id::StableId;

pub use constraint::*;
pub use function::*;
pub use index::*;
pub use materialized_view::*;
pub use policy::*;
pub use schema::*;
pub use sequence::*;
pub use table::*;
pub use trigger::*;
pub use types::*;
pub use view::*;

pub mod constraint;
pub mod function;
pub mod index;
pub mod materialized_view;
pub mod policy;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod types;
pub mod view;

/// Operation discriminant. The variant order is the same-object priority
/// used by the solver: a Drop of an id precedes its Create, which precedes
/// Alters, which precede Replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    Drop,
    Create,
    Alter,
    Replace,
}

/// One schema change to apply, hierarchical by entity kind.
#[derive(Debug, Clone)]
pub enum Change {
    Schema(SchemaChange),
    Table(TableChange),
    View(ViewChange),
    MaterializedView(MaterializedViewChange),
    Index(IndexChange),
    Sequence(SequenceChange),
    Constraint(ConstraintChange),
    Trigger(TriggerChange),
    Function(FunctionChange),
    Policy(PolicyChange),
    Type(TypeChange),
}

impl Change {
    pub fn stable_id(&self) -> StableId {
        match self {
            Change::Schema(c) => c.stable_id(),
            Change::Table(c) => c.stable_id(),
            Change::View(c) => c.stable_id(),
            Change::MaterializedView(c) => c.stable_id(),
            Change::Index(c) => c.stable_id(),
            Change::Sequence(c) => c.stable_id(),
            Change::Constraint(c) => c.stable_id(),
            Change::Trigger(c) => c.stable_id(),
            Change::Function(c) => c.stable_id(),
            Change::Policy(c) => c.stable_id(),
            Change::Type(c) => c.stable_id(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Schema(c) => c.kind(),
            Change::Table(c) => c.kind(),
            Change::View(c) => c.kind(),
            Change::MaterializedView(c) => c.kind(),
            Change::Index(c) => c.kind(),
            Change::Sequence(c) => c.kind(),
            Change::Constraint(c) => c.kind(),
            Change::Trigger(c) => c.kind(),
            Change::Function(c) => c.kind(),
            Change::Policy(c) => c.kind(),
            Change::Type(c) => c.kind(),
        }
    }

    /// Diagnostic label, e.g. `Replace v:public.active_users`.
    pub fn describe(&self) -> String {
        format!("{:?} {}", self.kind(), self.stable_id())
    }
}
