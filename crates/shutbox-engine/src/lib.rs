//! Game engine for "Shut the Box".
//!
//! The engine is split into two layers:
//!
//! - [`core`] - Plain data: the [`SwitchBox`] bitfield, legal [`Move`]s, the
//!   subset-sum move enumeration and the [`BoxHash`] / [`MovesHash`] integer codecs
//! - [`engine`] - Game flow: the validated [`GameConfig`], dice and seeds, and the
//!   stateful [`GameEngine`]
//!
//! # Example
//!
//! ```
//! use shutbox_engine::{GameConfig, GameEngine, Seed};
//!
//! let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(42));
//! engine.reset();
//!
//! let roll = engine.roll_dice();
//! if let Some(moves) = engine.actions(roll) {
//!     engine.apply_move(&moves[0]).unwrap();
//! }
//! assert!(!engine.solved());
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected game configuration.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("dice must have at least one side")]
    NoDiceSides,
    #[display("at least one die must be rolled")]
    NoDice,
    #[display("box_high_num must be in 1..={max}, got {box_high_num}")]
    BoxHighNum { box_high_num: u8, max: u8 },
    #[display("{num_dice} dice with {dice_sides} sides overflow the roll range")]
    RollOverflow { dice_sides: u32, num_dice: u32 },
}

/// Rejected move.
///
/// The box is never modified when a move is rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidMoveError {
    #[display("move must flip at least one number")]
    Empty,
    #[display("number {number} is outside the box 1..={box_high_num}")]
    OutOfRange { number: u8, box_high_num: u8 },
    #[display("number {number} is already flipped down")]
    NotActive { number: u8 },
    #[display("number {number} appears more than once in the move")]
    Duplicate { number: u8 },
}

/// Integer that does not decode to a box or a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidHashError {
    #[display("box hash {hash} does not fit a box of {box_high_num} switches")]
    BoxOutOfRange { hash: u64, box_high_num: u8 },
    #[display("moves hash {hash} is not a move over numbers 1..={box_high_num}")]
    MovesOutOfRange { hash: u64, box_high_num: u8 },
}
