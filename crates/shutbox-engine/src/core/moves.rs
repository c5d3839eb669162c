//! Legal moves and their enumeration.
//!
//! A move is a set of distinct standing numbers whose sum equals the roll. For a
//! given box and roll, [`enumerate_moves`] finds every such set exactly once.
//!
//! # Enumeration
//!
//! The candidates are the standing numbers not greater than the roll, in ascending
//! order. The search walks the candidates by backtracking: after picking the
//! candidate at index `i`, only candidates at indices below `i` may complete the
//! move. Every move is therefore discovered along exactly one path, written in
//! descending order, and no de-duplication pass is needed.
//!
//! ```text
//! roll 6, candidates [1, 2, 3, 4, 5, 6]
//!
//!   3 -> 2 -> 1  -> [3, 2, 1]
//!   4 -> 2       -> [4, 2]
//!   5 -> 1       -> [5, 1]
//!   6            -> [6]
//! ```
//!
//! The search is exponential in the number of candidates, bounded by `2^9` paths
//! for the standard 9-switch box. Callers that query the same states repeatedly
//! should precompute the results per (box hash, roll).

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{InvalidHashError, InvalidMoveError};

use super::MAX_BOX_HIGH_NUM;

const MOVE_CAPACITY: usize = MAX_BOX_HIGH_NUM as usize;

/// Integer encoding of a move: the sum of `2^m` over its numbers `m`.
///
/// Bits are indexed by the number itself, so bit 0 is never set. This is a
/// different space from [`BoxHash`](super::BoxHash), which indexes switches from 0.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MovesHash(u64);

impl MovesHash {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A set of distinct numbers to flip down in one turn.
///
/// Values keep the order they were given in; moves produced by
/// [`enumerate_moves`] are in descending order. Equality is order-sensitive,
/// compare [`Move::hash`] for set equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    values: ArrayVec<u8, MOVE_CAPACITY>,
}

impl Move {
    /// Creates a move from explicit numbers.
    ///
    /// Numbers must be distinct and in `1..=MAX_BOX_HIGH_NUM`; whether they are
    /// standing is checked when the move is applied.
    pub fn new(values: &[u8]) -> Result<Self, InvalidMoveError> {
        if values.is_empty() {
            return Err(InvalidMoveError::Empty);
        }
        let mut seen = 0_u64;
        let mut move_values = ArrayVec::new();
        for &number in values {
            if number == 0 || number > MAX_BOX_HIGH_NUM {
                return Err(InvalidMoveError::OutOfRange {
                    number,
                    box_high_num: MAX_BOX_HIGH_NUM,
                });
            }
            if seen & (1 << number) != 0 {
                return Err(InvalidMoveError::Duplicate { number });
            }
            seen |= 1 << number;
            move_values.push(number);
        }
        Ok(Self {
            values: move_values,
        })
    }

    /// Decodes a [`MovesHash`] into a move over numbers `1..=box_high_num`.
    ///
    /// The decoded values are ascending.
    pub fn from_hash(hash: MovesHash, box_high_num: u8) -> Result<Self, InvalidHashError> {
        let bits = hash.get();
        let in_range = box_high_num <= MAX_BOX_HIGH_NUM && bits >> (box_high_num + 1) == 0;
        if bits == 0 || bits & 1 != 0 || !in_range {
            return Err(InvalidHashError::MovesOutOfRange {
                hash: bits,
                box_high_num,
            });
        }
        let values = (1..=box_high_num)
            .filter(|n| bits & (1 << n) != 0)
            .collect();
        Ok(Self { values })
    }

    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    #[must_use]
    pub fn sum(&self) -> u32 {
        self.values.iter().map(|&n| u32::from(n)).sum()
    }

    #[must_use]
    pub fn hash(&self) -> MovesHash {
        MovesHash(self.values.iter().fold(0, |acc, &n| acc | (1 << n)))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// Enumerates every move over `active_numbers` that sums exactly to `roll`.
///
/// `active_numbers` is read as a set: order and repeats are ignored, and numbers
/// outside `1..=MAX_BOX_HIGH_NUM` are skipped. [`SwitchBox::active_numbers`]
/// (super::SwitchBox::active_numbers) already yields a clean ascending list.
/// Returns `None` when no move exists, which marks a terminal state.
///
/// # Example
///
/// ```
/// use shutbox_engine::enumerate_moves;
///
/// let moves = enumerate_moves(&[1, 2, 3, 4], 5).unwrap();
/// let values: Vec<_> = moves.iter().map(|m| m.values().to_vec()).collect();
/// assert_eq!(values, vec![vec![3, 2], vec![4, 1]]);
///
/// assert!(enumerate_moves(&[4, 5], 3).is_none());
/// ```
#[must_use]
pub fn enumerate_moves(active_numbers: &[u8], roll: u32) -> Option<Vec<Move>> {
    let mask = active_numbers
        .iter()
        .filter(|&&n| n >= 1 && n <= MAX_BOX_HIGH_NUM && u32::from(n) <= roll)
        .fold(0_u64, |mask, &n| mask | (1 << n));
    // at most MAX_BOX_HIGH_NUM distinct numbers survive, so this never overflows
    let candidates: ArrayVec<u8, MOVE_CAPACITY> =
        (1..=MAX_BOX_HIGH_NUM).filter(|n| mask & (1 << n) != 0).collect();

    let mut moves = vec![];
    if roll > 0 {
        let mut path = ArrayVec::new();
        collect_moves(roll, &candidates, &mut path, &mut moves);
    }
    (!moves.is_empty()).then_some(moves)
}

fn collect_moves(
    roll: u32,
    candidates: &[u8],
    path: &mut ArrayVec<u8, MOVE_CAPACITY>,
    moves: &mut Vec<Move>,
) {
    if roll == 0 {
        moves.push(Move {
            values: path.clone(),
        });
        return;
    }
    for (i, &number) in candidates.iter().enumerate() {
        let value = u32::from(number);
        if value <= roll {
            path.push(number);
            // only lower-indexed candidates may follow
            collect_moves(roll - value, &candidates[..i], path, moves);
            path.pop();
        }
    }
}
