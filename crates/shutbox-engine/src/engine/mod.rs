//! Game flow on top of the core data structures.
//!
//! - [`GameConfig`] - Dice and box dimensions (validated, serializable)
//! - [`GameEngine`] - Current box plus dice; reset, roll, move, and legal-move queries
//! - [`Dice`] / [`ScriptedDice`] - Random and replayed [`RollSource`]s
//! - [`Seed`] - Seed for every deterministic generator in the workspace
//!
//! # Game Flow
//!
//! 1. [`GameEngine::reset`] stands every switch up
//! 2. [`GameEngine::roll_dice`] rolls the total for this turn
//! 3. [`GameEngine::actions`] lists the moves summing to the roll; `None` ends the game
//! 4. [`GameEngine::apply_move`] flips the chosen numbers down
//! 5. Repeat from 2; the game is won when [`GameEngine::solved`] holds
//!
//! # Example
//!
//! ```
//! use shutbox_engine::{GameConfig, GameEngine, ScriptedDice};
//!
//! let config = GameConfig::new(6, 1, 3).unwrap();
//! let mut engine = GameEngine::with_dice(config, ScriptedDice::new([3, 3]));
//!
//! let roll = engine.roll_dice();
//! let moves = engine.actions(roll).unwrap();
//! assert_eq!(moves.len(), 2); // [3] or [2, 1]
//! engine.apply_move(&moves[0]).unwrap(); // flips 2 and 1
//!
//! let roll = engine.roll_dice();
//! let moves = engine.actions(roll).unwrap();
//! engine.apply_move(&moves[0]).unwrap();
//! assert!(engine.solved());
//! ```

pub use self::{config::*, dice::*, game_engine::*, seed::*};

mod config;
mod dice;
mod game_engine;
mod seed;
