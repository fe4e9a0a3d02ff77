use std::fmt;

/// A cross-snapshot identifier for any database object in pgdelta.
///
/// The `Display` form is `prefix:qualified_name`, where the prefix encodes
/// the entity kind. The same logical object extracted from two different
/// databases produces the same `StableId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StableId {
    Schema {
        name: String,
    },

    Table {
        schema: String,
        name: String,
    },

    View {
        schema: String,
        name: String,
    },

    MaterializedView {
        schema: String,
        name: String,
    },

    Index {
        schema: String,
        name: String,
    },
    Sequence {
        schema: String,
        name: String,
    },
    Constraint {
        schema: String,
        table: String,
        name: String,
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
    },
    Type {
        schema: String,
        name: String,
    },
    Policy {
        schema: String,
        table: String,
        name: String,
    },
    Column {
        schema: String,
        table: String,
        name: String,
    },
}

impl StableId {
    /// Get the schema name for this object. Returns the object's own name for
    /// `Schema` (where the name IS the schema).
    pub fn schema(&self) -> &str {
        match self {
            StableId::Schema { name } => name.as_str(),
            StableId::Table { schema, .. }
            | StableId::View { schema, .. }
            | StableId::MaterializedView { schema, .. }
            | StableId::Index { schema, .. }
            | StableId::Sequence { schema, .. }
            | StableId::Constraint { schema, .. }
            | StableId::Trigger { schema, .. }
            | StableId::Function { schema, .. }
            | StableId::Type { schema, .. }
            | StableId::Policy { schema, .. }
            | StableId::Column { schema, .. } => schema.as_str(),
        }
    }

    /// For table-scoped objects (constraints, triggers, policies, columns),
    /// the id of the owning table.
    pub fn owning_table(&self) -> Option<StableId> {
        match self {
            StableId::Constraint { schema, table, .. }
            | StableId::Trigger { schema, table, .. }
            | StableId::Policy { schema, table, .. }
            | StableId::Column { schema, table, .. } => Some(StableId::Table {
                schema: schema.clone(),
                name: table.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StableId::Schema { name } => write!(f, "s:{}", name),
            StableId::Table { schema, name } => write!(f, "t:{}.{}", schema, name),
            StableId::View { schema, name } => write!(f, "v:{}.{}", schema, name),
            StableId::MaterializedView { schema, name } => write!(f, "m:{}.{}", schema, name),
            StableId::Index { schema, name } => write!(f, "i:{}.{}", schema, name),
            StableId::Sequence { schema, name } => write!(f, "S:{}.{}", schema, name),
            StableId::Constraint {
                schema,
                table,
                name,
            } => write!(f, "c:{}.{}.{}", schema, table, name),
            StableId::Trigger {
                schema,
                table,
                name,
            } => write!(f, "tg:{}.{}.{}", schema, table, name),
            StableId::Function {
                schema,
                name,
                arguments,
            } => write!(f, "f:{}.{}({})", schema, name, arguments),
            StableId::Type { schema, name } => write!(f, "typ:{}.{}", schema, name),
            StableId::Policy {
                schema,
                table,
                name,
            } => write!(f, "p:{}.{}.{}", schema, table, name),
            StableId::Column {
                schema,
                table,
                name,
            } => write!(f, "col:{}.{}.{}", schema, table, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            StableId::Schema {
                name: "app".to_string()
            }
            .to_string(),
            "s:app"
        );
        assert_eq!(
            StableId::Table {
                schema: "app".to_string(),
                name: "users".to_string()
            }
            .to_string(),
            "t:app.users"
        );
        assert_eq!(
            StableId::Sequence {
                schema: "app".to_string(),
                name: "users_id_seq".to_string()
            }
            .to_string(),
            "S:app.users_id_seq"
        );
        assert_eq!(
            StableId::Constraint {
                schema: "app".to_string(),
                table: "users".to_string(),
                name: "users_pkey".to_string()
            }
            .to_string(),
            "c:app.users.users_pkey"
        );
        assert_eq!(
            StableId::Function {
                schema: "app".to_string(),
                name: "touch".to_string(),
                arguments: "integer, text".to_string()
            }
            .to_string(),
            "f:app.touch(integer, text)"
        );
        assert_eq!(
            StableId::Trigger {
                schema: "app".to_string(),
                table: "users".to_string(),
                name: "users_audit".to_string()
            }
            .to_string(),
            "tg:app.users.users_audit"
        );
    }

    #[test]
    fn test_identifiers_are_case_sensitive() {
        let lower = StableId::Table {
            schema: "public".to_string(),
            name: "users".to_string(),
        };
        let upper = StableId::Table {
            schema: "public".to_string(),
            name: "Users".to_string(),
        };
        assert_ne!(lower, upper);
        assert_eq!(upper.to_string(), "t:public.Users");
    }

    #[test]
    fn test_schema_method() {
        assert_eq!(
            StableId::Schema {
                name: "public".to_string()
            }
            .schema(),
            "public"
        );
        assert_eq!(
            StableId::Policy {
                schema: "app".to_string(),
                table: "users".to_string(),
                name: "tenant_isolation".to_string()
            }
            .schema(),
            "app"
        );
    }

    #[test]
    fn test_owning_table() {
        let constraint = StableId::Constraint {
            schema: "app".to_string(),
            table: "users".to_string(),
            name: "users_email_key".to_string(),
        };
        assert_eq!(
            constraint.owning_table(),
            Some(StableId::Table {
                schema: "app".to_string(),
                name: "users".to_string()
            })
        );

        let view = StableId::View {
            schema: "app".to_string(),
            name: "active_users".to_string(),
        };
        assert_eq!(view.owning_table(), None);
    }
}
