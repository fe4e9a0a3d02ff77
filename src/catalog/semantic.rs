//! Semantic equality: identity + data fields compare, internal fields
//! (snapshot oids, column ordinals) do not. This is what makes the same
//! logical schema extracted from two different databases compare equal.

use super::constraint::Constraint;
use super::custom_type::CustomType;
use super::function::Function;
use super::index::Index;
use super::materialized_view::MaterializedView;
use super::policy::Policy;
use super::schema::Schema;
use super::sequence::Sequence;
use super::table::{Column, Table};
use super::trigger::Trigger;
use super::view::View;
use std::collections::BTreeMap;

pub trait SemanticEq {
    fn semantic_eq(&self, other: &Self) -> bool;
}

impl SemanticEq for Schema {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Column equality ignores the ordinal position: `ADD COLUMN` can only
/// append, so two tables whose columns match by name and shape are the same
/// table even when their ordinals differ.
fn columns_semantic_eq(a: &[Column], b: &[Column]) -> bool {
    let by_name = |cols: &[Column]| -> BTreeMap<String, (String, Option<String>, bool)> {
        cols.iter()
            .map(|c| {
                (
                    c.name.clone(),
                    (c.data_type.clone(), c.default.clone(), c.not_null),
                )
            })
            .collect()
    };
    by_name(a) == by_name(b)
}

impl SemanticEq for Table {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.rls_enabled == other.rls_enabled
            && columns_semantic_eq(&self.columns, &other.columns)
    }
}

impl SemanticEq for View {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.definition == other.definition
    }
}

impl SemanticEq for MaterializedView {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.definition == other.definition
    }
}

impl SemanticEq for Index {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.table_schema == other.table_schema
            && self.table_name == other.table_name
            && self.definition == other.definition
    }
}

impl SemanticEq for Sequence {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.data_type == other.data_type
            && self.start_value == other.start_value
            && self.min_value == other.min_value
            && self.max_value == other.max_value
            && self.increment == other.increment
            && self.cache == other.cache
            && self.cycle == other.cycle
            && self.owned_by == other.owned_by
    }
}

impl SemanticEq for Constraint {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.table == other.table
            && self.name == other.name
            && self.definition == other.definition
    }
}

impl SemanticEq for Trigger {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.table == other.table
            && self.name == other.name
            && self.definition == other.definition
    }
}

impl SemanticEq for Function {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.arguments == other.arguments
            && self.kind == other.kind
            && self.return_type == other.return_type
            && self.definition == other.definition
    }
}

impl SemanticEq for Policy {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.table == other.table
            && self.name == other.name
            && self.command == other.command
            && self.permissive == other.permissive
            && self.roles == other.roles
            && self.using_expr == other.using_expr
            && self.with_check_expr == other.with_check_expr
    }
}

impl SemanticEq for CustomType {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.name == other.name && self.kind == other.kind
    }
}
