//! Reinforcement learning for "Shut the Box".
//!
//! This crate learns a policy for the game with tabular SARSA and searches the
//! hyperparameter space for the agent with the best win rate.
//!
//! # How Training Works
//!
//! 1. **Table** - Enumerate every (box, roll) state of the configuration and its legal moves
//! 2. **Initialize** - Give every (state, move) pair a starting value (zero, one or random)
//! 3. **Play** - Pick moves epsilon-greedily from the table, one game per episode
//! 4. **Update** - After each move, pull its value toward the reward plus the
//!    discounted value of the next chosen move
//! 5. **Score** - Play greedily without learning and count the wins
//!
//! # Architecture
//!
//! ```text
//! GridSearch
//!     ↓ one trial per parameter combination
//! SarsaAgent (learn, play)
//!     ↓ reads and updates
//! ValueTable (state → moves → value)
//!     ↓ built from
//! GameEngine (shutbox-engine)
//! ```
//!
//! # Modules
//!
//! - [`value_table`] - Eagerly built state-action table and its keys
//! - [`policy`] - Epsilon-greedy selection over a state's moves
//! - [`sarsa`] - The agent, its hyperparameters and the learning loop
//! - [`grid_search`] - Parallel search over epsilon, step size and gamma decay
//! - [`export`] - Greedy policy and full value records for persistence
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use shutbox_engine::{GameConfig, Seed};
//! use shutbox_training::{GridSearch, export};
//!
//! let grid = GridSearch {
//!     epsilons: vec![0.9],
//!     step_sizes: vec![0.1, 0.5],
//!     gamma_decays: vec![0.5],
//!     training_episodes: 50,
//!     testing_episodes: 10,
//!     ..GridSearch::default()
//! };
//! let config = GameConfig::new(6, 2, 6).unwrap();
//! let workers = NonZeroUsize::new(2).unwrap();
//! let result = grid.run(config, Seed::from_u64(0), workers, |_| {}).unwrap();
//!
//! assert_eq!(result.trials.len(), 2);
//! let records = export::policy_records(result.best.value_table());
//! assert_eq!(records.len(), result.best.value_table().state_count());
//! ```
//!
//! # Limitations
//!
//! - **Eager tables only**: the table holds every state up front, so boxes are
//!   limited to [`value_table::MAX_TABLE_BOX_HIGH_NUM`] switches
//! - **Fixed schedule**: epsilon and the step size stay constant during learning
//! - **Win/loss reward**: the agent does not learn to minimize the leftover sum

pub use self::{
    export::{PolicyRecord, ValueRecord},
    grid_search::{GridSearch, GridSearchError, GridSearchResult, TrialSummary},
    policy::{Branch, Choice},
    sarsa::{AgentError, LearnParams, ParamError, SarsaAgent},
    value_table::{ActionKey, ActionValue, Initializer, StateKey, TableError, ValueKey, ValueTable},
};

pub mod export;
pub mod grid_search;
pub mod policy;
pub mod sarsa;
pub mod value_table;
