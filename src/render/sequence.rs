use crate::catalog::sequence::SequenceOwner;
use crate::diff::operations::{SequenceAction, SequenceChange};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for SequenceChange {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            SequenceChange::Create { sequence } => {
                // Ownership is never part of CREATE; it arrives as a
                // separate Alter ordered after the owning table.
                let mut sql = format!(
                    "CREATE SEQUENCE {}.{} AS {} INCREMENT BY {} MINVALUE {} MAXVALUE {} START WITH {} CACHE {}",
                    quote_ident(&sequence.schema),
                    quote_ident(&sequence.name),
                    sequence.data_type,
                    sequence.increment,
                    sequence.min_value,
                    sequence.max_value,
                    sequence.start_value,
                    sequence.cache,
                );
                if sequence.cycle {
                    sql.push_str(" CYCLE");
                }
                sql.push(';');
                vec![RenderedSql::new(sql)]
            }
            SequenceChange::Drop { schema, name } => vec![RenderedSql::new(format!(
                "DROP SEQUENCE {}.{};",
                quote_ident(schema),
                quote_ident(name)
            ))],
            SequenceChange::Alter {
                schema,
                name,
                actions,
            } => actions
                .iter()
                .map(|action| render_sequence_action(action, schema, name))
                .collect(),
        }
    }
}

fn render_sequence_action(action: &SequenceAction, schema: &str, name: &str) -> RenderedSql {
    let target = format!("{}.{}", quote_ident(schema), quote_ident(name));
    let sql = match action {
        SequenceAction::SetDataType(data_type) => {
            format!("ALTER SEQUENCE {} AS {};", target, data_type)
        }
        SequenceAction::SetIncrement(increment) => {
            format!("ALTER SEQUENCE {} INCREMENT BY {};", target, increment)
        }
        SequenceAction::SetMinValue(min) => {
            format!("ALTER SEQUENCE {} MINVALUE {};", target, min)
        }
        SequenceAction::SetMaxValue(max) => {
            format!("ALTER SEQUENCE {} MAXVALUE {};", target, max)
        }
        SequenceAction::SetStart(start) => {
            format!("ALTER SEQUENCE {} START WITH {};", target, start)
        }
        SequenceAction::SetCache(cache) => {
            format!("ALTER SEQUENCE {} CACHE {};", target, cache)
        }
        SequenceAction::SetCycle(true) => format!("ALTER SEQUENCE {} CYCLE;", target),
        SequenceAction::SetCycle(false) => format!("ALTER SEQUENCE {} NO CYCLE;", target),
        SequenceAction::SetOwnedBy(owner) => {
            format!(
                "ALTER SEQUENCE {} OWNED BY {};",
                target,
                render_owner(owner)
            )
        }
        SequenceAction::DropOwnedBy => format!("ALTER SEQUENCE {} OWNED BY NONE;", target),
    };
    RenderedSql::new(sql)
}

fn render_owner(owner: &SequenceOwner) -> String {
    format!(
        "{}.{}.{}",
        quote_ident(&owner.schema),
        quote_ident(&owner.table),
        quote_ident(&owner.column)
    )
}
