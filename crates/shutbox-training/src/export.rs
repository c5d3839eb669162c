//! Flat record views of a [`ValueTable`].
//!
//! - [`PolicyRecord`] - one greedy action per state, for serving a trained policy
//! - [`ValueRecord`] - every table entry, for saving and restoring an agent

use serde::{Deserialize, Serialize};
use shutbox_engine::{BoxHash, MovesHash};

use crate::{
    policy::greedy_index,
    value_table::{ActionKey, StateKey, TableError, ValueKey, ValueTable},
};

/// Greedy action of one state. `moves_hash` is `None` when the state is stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// 1-based position in table order.
    pub id: usize,
    pub box_hash: BoxHash,
    pub roll: u32,
    pub moves_hash: Option<MovesHash>,
}

/// Returns the greedy action of every state, in (box hash, roll) order.
#[must_use]
pub fn policy_records(table: &ValueTable) -> Vec<PolicyRecord> {
    table
        .states()
        .enumerate()
        .map(|(i, (state, actions))| PolicyRecord {
            id: i + 1,
            box_hash: state.box_hash,
            roll: state.roll,
            moves_hash: actions
                .and_then(|actions| greedy_index(actions).map(|best| actions[best].moves_hash())),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    pub box_hash: BoxHash,
    pub roll: u32,
    pub moves_hash: Option<MovesHash>,
    pub value: f64,
}

impl From<(ValueKey, f64)> for ValueRecord {
    fn from((key, value): (ValueKey, f64)) -> Self {
        Self {
            box_hash: key.state.box_hash,
            roll: key.state.roll,
            moves_hash: key.action.moves_hash(),
            value,
        }
    }
}

impl ValueRecord {
    #[must_use]
    pub fn key(&self) -> ValueKey {
        ValueKey {
            state: StateKey::new(self.box_hash, self.roll),
            action: self.moves_hash.map_or(ActionKey::NoAction, ActionKey::Move),
        }
    }
}

/// Returns every entry of `table`, sentinels included.
#[must_use]
pub fn value_records(table: &ValueTable) -> Vec<ValueRecord> {
    table.iter().map(ValueRecord::from).collect()
}

/// Overwrites the values of `table` with `records`.
///
/// Sentinel records (no moves hash) are accepted only for stuck states and carry
/// no value. Stops at the first record naming an entry the table does not have;
/// earlier records stay applied.
pub fn apply_value_records(
    table: &mut ValueTable,
    records: &[ValueRecord],
) -> Result<(), TableError> {
    for record in records {
        let key = record.key();
        if key.action.is_no_action() {
            if table.value(key).is_none() {
                return Err(TableError::UnknownEntry {
                    box_hash: record.box_hash,
                    roll: record.roll,
                    action: key.action,
                });
            }
            continue;
        }
        table.set(key, record.value)?;
    }
    Ok(())
}
