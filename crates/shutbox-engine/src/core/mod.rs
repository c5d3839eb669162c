//! Core data structures: the box of switches and the moves that flip them.

pub use self::{moves::*, switch_box::*};

pub mod moves;
pub mod switch_box;

/// Largest supported number of switches.
///
/// Both hashes fit in a `u64` up to this size (the moves hash uses bit
/// `box_high_num`), and a move never holds more values than this.
pub const MAX_BOX_HIGH_NUM: u8 = 32;
