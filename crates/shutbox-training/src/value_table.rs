//! State-action value table.
//!
//! The table holds one estimate per legal (state, action) pair, where a state is a
//! box hash plus a roll. States without any legal move hold a single sentinel
//! entry ([`ActionKey::NoAction`]) fixed at zero.
//!
//! All entries are created up front by [`ValueTable::build`], which enumerates
//! every box hash and every roll. Slots are stored in a flat array indexed by
//! `box_hash * roll_count + (roll - min_roll)`, so the box size is capped at
//! [`MAX_TABLE_BOX_HIGH_NUM`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use shutbox_engine::{
    BoxHash, GameConfig, GameEngine, InvalidHashError, Move, MovesHash, RollSource, SwitchBox,
};

/// Largest box size for which a table can be built.
pub const MAX_TABLE_BOX_HIGH_NUM: u8 = 16;

/// Largest number of state slots a table may hold.
pub const MAX_TABLE_STATES: u64 = 1 << 22;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("a box of {box_high_num} switches exceeds the table limit of {max}")]
    BoxTooLarge { box_high_num: u8, max: u8 },
    #[display("{states} states exceed the table limit of {max}")]
    TooManyStates { states: u64, max: u64 },
    #[display("no entry for box {box_hash}, roll {roll}, action {action:?}")]
    UnknownEntry {
        box_hash: BoxHash,
        roll: u32,
        action: ActionKey,
    },
    #[display("the no-action entry of box {box_hash}, roll {roll} is fixed at zero")]
    FixedSentinel { box_hash: BoxHash, roll: u32 },
    #[display("{_0}")]
    Hash(InvalidHashError),
}

impl From<InvalidHashError> for TableError {
    fn from(err: InvalidHashError) -> Self {
        Self::Hash(err)
    }
}

/// A box hash together with the roll to be played on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StateKey {
    pub box_hash: BoxHash,
    pub roll: u32,
}

impl StateKey {
    #[must_use]
    pub const fn new(box_hash: BoxHash, roll: u32) -> Self {
        Self { box_hash, roll }
    }
}

/// Action half of a table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::IsVariant)]
pub enum ActionKey {
    /// Sentinel for states without any legal move.
    NoAction,
    Move(MovesHash),
}

impl ActionKey {
    #[must_use]
    pub const fn moves_hash(self) -> Option<MovesHash> {
        match self {
            Self::NoAction => None,
            Self::Move(hash) => Some(hash),
        }
    }
}

/// Full key of one table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueKey {
    pub state: StateKey,
    pub action: ActionKey,
}

/// How fresh entries are valued when a table is built.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    #[default]
    Zero,
    One,
    /// Uniform in `[0, 1)`.
    Random,
}

impl Initializer {
    fn sample<R>(self, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Zero => 0.0,
            Self::One => 1.0,
            Self::Random => rng.random(),
        }
    }
}

/// A legal move of one state with its current estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValue {
    action: Move,
    hash: MovesHash,
    pub(crate) value: f64,
}

impl ActionValue {
    #[must_use]
    pub fn action(&self) -> &Move {
        &self.action
    }

    #[must_use]
    pub fn moves_hash(&self) -> MovesHash {
        self.hash
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Eagerly built state-action value table for one game configuration.
#[derive(Debug, Clone)]
pub struct ValueTable {
    config: GameConfig,
    /// `None` marks a state without legal moves.
    slots: Vec<Option<Vec<ActionValue>>>,
}

impl ValueTable {
    /// Builds the table for the engine's configuration.
    ///
    /// Every legal (state, action) pair is valued by `initializer`; states
    /// without moves get the zero sentinel.
    pub fn build<D, R>(
        engine: &GameEngine<D>,
        initializer: Initializer,
        rng: &mut R,
    ) -> Result<Self, TableError>
    where
        D: RollSource,
        R: Rng + ?Sized,
    {
        let config = *engine.config();
        let box_high_num = config.box_high_num();
        if box_high_num > MAX_TABLE_BOX_HIGH_NUM {
            return Err(TableError::BoxTooLarge {
                box_high_num,
                max: MAX_TABLE_BOX_HIGH_NUM,
            });
        }
        let states = SwitchBox::state_count(box_high_num) * u64::from(config.roll_count());
        if states > MAX_TABLE_STATES {
            return Err(TableError::TooManyStates {
                states,
                max: MAX_TABLE_STATES,
            });
        }

        let mut slots = Vec::with_capacity(usize::try_from(states).unwrap_or_default());
        for box_hash in (0..SwitchBox::state_count(box_high_num)).map(BoxHash::new) {
            for roll in config.rolls() {
                let slot = engine.actions_from_hash(box_hash, roll)?.map(|moves| {
                    moves
                        .into_iter()
                        .map(|action| ActionValue {
                            hash: action.hash(),
                            action,
                            value: initializer.sample(rng),
                        })
                        .collect()
                });
                slots.push(slot);
            }
        }
        Ok(Self { config, slots })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the number of (box hash, roll) states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of entries, counting each sentinel once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().map_or(1, Vec::len))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot_index(&self, state: StateKey) -> Option<usize> {
        let rolls = self.config.rolls();
        if !rolls.contains(&state.roll) {
            return None;
        }
        let roll_offset = u64::from(state.roll - rolls.start());
        let index = state
            .box_hash
            .get()
            .checked_mul(u64::from(self.config.roll_count()))?
            .checked_add(roll_offset)?;
        usize::try_from(index)
            .ok()
            .filter(|index| *index < self.slots.len())
    }

    /// Returns the legal moves of `state` with their estimates.
    ///
    /// `None` if the state has no legal move or lies outside the table.
    #[must_use]
    pub fn actions(&self, state: StateKey) -> Option<&[ActionValue]> {
        self.slots[self.slot_index(state)?].as_deref()
    }

    pub(crate) fn actions_mut(&mut self, state: StateKey) -> Option<&mut [ActionValue]> {
        let index = self.slot_index(state)?;
        self.slots[index].as_deref_mut()
    }

    /// Returns the estimate stored under `key`.
    ///
    /// The sentinel of a state without moves reads as zero.
    #[must_use]
    pub fn value(&self, key: ValueKey) -> Option<f64> {
        let slot = self.slots[self.slot_index(key.state)?].as_deref();
        match (slot, key.action) {
            (None, ActionKey::NoAction) => Some(0.0),
            (Some(actions), ActionKey::Move(hash)) => actions
                .iter()
                .find(|a| a.hash == hash)
                .map(ActionValue::value),
            _ => None,
        }
    }

    /// Overwrites the estimate stored under `key`.
    ///
    /// Only existing move entries can be set; sentinels stay at zero.
    pub fn set(&mut self, key: ValueKey, value: f64) -> Result<(), TableError> {
        let unknown = TableError::UnknownEntry {
            box_hash: key.state.box_hash,
            roll: key.state.roll,
            action: key.action,
        };
        let Some(index) = self.slot_index(key.state) else {
            return Err(unknown);
        };
        match (&mut self.slots[index], key.action) {
            (None, ActionKey::NoAction) => Err(TableError::FixedSentinel {
                box_hash: key.state.box_hash,
                roll: key.state.roll,
            }),
            (Some(actions), ActionKey::Move(hash)) => {
                let entry = actions.iter_mut().find(|a| a.hash == hash).ok_or(unknown)?;
                entry.value = value;
                Ok(())
            }
            _ => Err(unknown),
        }
    }

    /// Iterates over all states in (box hash, roll) order.
    pub fn states(&self) -> impl Iterator<Item = (StateKey, Option<&[ActionValue]>)> + '_ {
        let box_count = SwitchBox::state_count(self.config.box_high_num());
        let rolls = self.config.rolls();
        (0..box_count)
            .flat_map(move |box_hash| {
                rolls
                    .clone()
                    .map(move |roll| StateKey::new(BoxHash::new(box_hash), roll))
            })
            .zip(&self.slots)
            .map(|(state, slot)| (state, slot.as_deref()))
    }

    /// Iterates over every entry, sentinels included, in (box hash, roll) order.
    pub fn iter(&self) -> impl Iterator<Item = (ValueKey, f64)> + '_ {
        self.states().flat_map(|(state, actions)| {
            let entries: Vec<(ValueKey, f64)> = match actions {
                None => vec![(
                    ValueKey {
                        state,
                        action: ActionKey::NoAction,
                    },
                    0.0,
                )],
                Some(actions) => actions
                    .iter()
                    .map(|a| {
                        (
                            ValueKey {
                                state,
                                action: ActionKey::Move(a.hash),
                            },
                            a.value,
                        )
                    })
                    .collect(),
            };
            entries
        })
    }
}

#[cfg(test)]
mod tests {
    use rand_pcg::Pcg32;
    use shutbox_engine::{GameEngine, Seed};

    use super::*;

    fn build(config: GameConfig, initializer: Initializer) -> ValueTable {
        let engine = GameEngine::with_seed(config, Seed::from_u64(0));
        let mut rng: Pcg32 = Seed::from_u64(1).rng();
        ValueTable::build(&engine, initializer, &mut rng).unwrap()
    }

    fn key(box_hash: u64, roll: u32, action: ActionKey) -> ValueKey {
        ValueKey {
            state: StateKey::new(BoxHash::new(box_hash), roll),
            action,
        }
    }

    #[test]
    fn test_covers_every_state() {
        let table = build(GameConfig::default(), Initializer::Zero);
        assert_eq!(table.state_count(), 512 * 11);
        assert_eq!(table.states().count(), 512 * 11);

        let engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        for (state, actions) in table.states() {
            let expected = engine.actions_from_hash(state.box_hash, state.roll).unwrap();
            let expected: Option<Vec<MovesHash>> =
                expected.map(|moves| moves.iter().map(Move::hash).collect());
            let found: Option<Vec<MovesHash>> =
                actions.map(|a| a.iter().map(ActionValue::moves_hash).collect());
            assert_eq!(found, expected, "{state:?}");
        }
        assert_eq!(table.iter().count(), table.len());
    }

    #[test]
    fn test_sentinel_for_stuck_states() {
        let table = build(GameConfig::default(), Initializer::One);
        // solved box never has a move
        for roll in 2..=12 {
            assert!(table.actions(StateKey::new(BoxHash::new(0), roll)).is_none());
            assert_eq!(table.value(key(0, roll, ActionKey::NoAction)), Some(0.0));
        }
        // only the 1 is standing
        assert_eq!(table.value(key(0b1, 2, ActionKey::NoAction)), Some(0.0));
    }

    #[test]
    fn test_constant_initializers() {
        for (initializer, expected) in [(Initializer::Zero, 0.0), (Initializer::One, 1.0)] {
            let table = build(GameConfig::default(), initializer);
            for (key, value) in table.iter() {
                let expected = if key.action.is_no_action() { 0.0 } else { expected };
                assert_eq!(value, expected);
            }
        }
    }

    #[test]
    fn test_random_initializer_in_unit_interval() {
        let table = build(GameConfig::default(), Initializer::Random);
        let values: Vec<f64> = table
            .iter()
            .filter(|(k, _)| k.action.is_move())
            .map(|(_, v)| v)
            .collect();
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
        assert!(values.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_set_and_value() {
        let mut table = build(GameConfig::default(), Initializer::Zero);
        let nine = Move::new(&[9]).unwrap().hash();
        let k = key(511, 9, ActionKey::Move(nine));

        table.set(k, 0.25).unwrap();
        assert_eq!(table.value(k), Some(0.25));

        assert_eq!(
            table.set(key(0, 9, ActionKey::NoAction), 1.0),
            Err(TableError::FixedSentinel {
                box_hash: BoxHash::new(0),
                roll: 9
            })
        );
        // 9 is not a legal move for a roll of 8
        assert!(matches!(
            table.set(key(511, 8, ActionKey::Move(nine)), 1.0),
            Err(TableError::UnknownEntry { .. })
        ));
        assert!(table.value(key(511, 13, ActionKey::Move(nine))).is_none());
        assert!(table.value(key(512, 9, ActionKey::Move(nine))).is_none());
    }

    #[test]
    fn test_rejects_oversized_boxes() {
        let engine = GameEngine::with_seed(GameConfig::new(6, 2, 17).unwrap(), Seed::from_u64(0));
        let mut rng: Pcg32 = Seed::from_u64(1).rng();
        assert!(matches!(
            ValueTable::build(&engine, Initializer::Zero, &mut rng),
            Err(TableError::BoxTooLarge { .. })
        ));
    }

    #[test]
    fn test_initializer_from_str() {
        assert_eq!("zero".parse::<Initializer>().unwrap(), Initializer::Zero);
        assert_eq!("Random".parse::<Initializer>().unwrap(), Initializer::Random);
        assert!("two".parse::<Initializer>().is_err());
    }
}
