use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{InvalidHashError, InvalidMoveError};

use super::{MAX_BOX_HIGH_NUM, moves::Move};

/// Integer encoding of a box.
///
/// Bit `i` is set iff switch `i` (number `i + 1`) is still standing, so a box of
/// `n` switches maps one-to-one onto `0..2^n`.
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
pub struct BoxHash(u64);

impl BoxHash {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The row of numbered switches.
///
/// Stored as a bitmask where bit `i` represents number `i + 1`. A set bit means
/// the number is active (standing), a cleared bit means it has been flipped down.
/// The number of switches is fixed at construction.
///
/// # Example
///
/// ```
/// use shutbox_engine::SwitchBox;
///
/// let switches = SwitchBox::full(9);
/// assert_eq!(switches.hash().get(), 0b1_1111_1111);
/// assert_eq!(switches.to_string(), "[1][2][3][4][5][6][7][8][9]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchBox {
    bits: u64,
    box_high_num: u8,
}

const fn all_bits(box_high_num: u8) -> u64 {
    (1 << box_high_num) - 1
}

impl SwitchBox {
    /// Creates a box with every switch standing.
    ///
    /// # Panics
    ///
    /// Panics if `box_high_num` exceeds [`MAX_BOX_HIGH_NUM`].
    #[must_use]
    pub const fn full(box_high_num: u8) -> Self {
        assert!(box_high_num <= MAX_BOX_HIGH_NUM);
        Self {
            bits: all_bits(box_high_num),
            box_high_num,
        }
    }

    /// Creates a box from explicit switch states, `switches[i]` being number `i + 1`.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_BOX_HIGH_NUM`] switches are given.
    #[must_use]
    pub fn from_switches(switches: &[bool]) -> Self {
        let box_high_num = u8::try_from(switches.len())
            .ok()
            .filter(|n| *n <= MAX_BOX_HIGH_NUM)
            .expect("too many switches");
        let bits = switches
            .iter()
            .enumerate()
            .filter(|(_, active)| **active)
            .fold(0, |bits, (i, _)| bits | (1 << i));
        Self { bits, box_high_num }
    }

    /// Decodes a [`BoxHash`] for a box of `box_high_num` switches.
    pub fn from_hash(hash: BoxHash, box_high_num: u8) -> Result<Self, InvalidHashError> {
        if box_high_num > MAX_BOX_HIGH_NUM || hash.get() > all_bits(box_high_num) {
            return Err(InvalidHashError::BoxOutOfRange {
                hash: hash.get(),
                box_high_num,
            });
        }
        Ok(Self {
            bits: hash.get(),
            box_high_num,
        })
    }

    /// Returns the number of boxes (distinct hashes) with `box_high_num` switches.
    #[must_use]
    pub const fn state_count(box_high_num: u8) -> u64 {
        1 << box_high_num
    }

    #[must_use]
    pub const fn hash(self) -> BoxHash {
        BoxHash(self.bits)
    }

    #[must_use]
    pub const fn box_high_num(self) -> u8 {
        self.box_high_num
    }

    /// Checks whether `number` is in range and still standing.
    #[must_use]
    pub const fn is_active(self, number: u8) -> bool {
        number >= 1 && number <= self.box_high_num && self.bits & (1 << (number - 1)) != 0
    }

    /// Returns true iff every switch has been flipped down.
    #[must_use]
    pub const fn is_solved(self) -> bool {
        self.bits == 0
    }

    /// Returns the standing numbers in ascending order.
    #[must_use]
    pub fn active_numbers(self) -> Vec<u8> {
        (1..=self.box_high_num)
            .filter(|n| self.is_active(*n))
            .collect()
    }

    /// Returns the switch states, index `i` being number `i + 1`.
    #[must_use]
    pub fn switches(self) -> Vec<bool> {
        (1..=self.box_high_num).map(|n| self.is_active(n)).collect()
    }

    /// Flips down every number of `mv`.
    ///
    /// All numbers are checked before any switch changes, so a rejected move
    /// leaves the box untouched.
    pub fn deactivate(&mut self, mv: &Move) -> Result<(), InvalidMoveError> {
        let mut mask = 0;
        for &number in mv.values() {
            if number == 0 || number > self.box_high_num {
                return Err(InvalidMoveError::OutOfRange {
                    number,
                    box_high_num: self.box_high_num,
                });
            }
            let bit = 1 << (number - 1);
            if mask & bit != 0 {
                return Err(InvalidMoveError::Duplicate { number });
            }
            if self.bits & bit == 0 {
                return Err(InvalidMoveError::NotActive { number });
            }
            mask |= bit;
        }
        self.bits &= !mask;
        Ok(())
    }
}

impl fmt::Display for SwitchBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for number in 1..=self.box_high_num {
            if self.is_active(number) {
                write!(f, "[{number}]")?;
            } else {
                f.write_str("[ ]")?;
            }
        }
        Ok(())
    }
}
