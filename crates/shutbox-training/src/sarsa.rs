//! SARSA agent for Shut the Box.
//!
//! SARSA is on-policy temporal-difference control: after each move the estimate
//! of the (state, action) pair just played is pulled toward the reward plus the
//! discounted estimate of the action actually chosen next.
//!
//! ```text
//! Q(s, a) <- Q(s, a) + step_size * (r + gamma_decay * Q(s', a') - Q(s, a))
//! ```
//!
//! A state is the box hash after the previous move together with the next roll.
//! The reward is 1 for the move that shuts the box and 0 otherwise. When no
//! move exists for `s'` (box shut, or stuck), `Q(s', a')` is taken as zero and the
//! episode ends.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use shutbox_engine::{GameConfig, GameEngine, InvalidMoveError, Move, RollSource, Seed};

use crate::{
    policy::{Choice, epsilon_greedy},
    value_table::{Initializer, StateKey, TableError, ValueTable},
};

/// Hyperparameters of one [`SarsaAgent::learn`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnParams {
    /// Probability of playing the greedy action, in `[0, 1]`.
    pub epsilon: f64,
    /// Learning rate, positive.
    pub step_size: f64,
    /// Discount of the next estimate, in `[0, 1]`.
    pub gamma_decay: f64,
}

impl Default for LearnParams {
    fn default() -> Self {
        Self {
            epsilon: 0.5,
            step_size: 0.1,
            gamma_decay: 0.5,
        }
    }
}

impl LearnParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        check_epsilon(self.epsilon)?;
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ParamError::StepSize {
                value: self.step_size,
            });
        }
        if !(0.0..=1.0).contains(&self.gamma_decay) {
            return Err(ParamError::GammaDecay {
                value: self.gamma_decay,
            });
        }
        Ok(())
    }
}

fn check_epsilon(epsilon: f64) -> Result<(), ParamError> {
    if (0.0..=1.0).contains(&epsilon) {
        Ok(())
    } else {
        Err(ParamError::Epsilon { value: epsilon })
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParamError {
    #[display("epsilon must be in [0, 1], got {value}")]
    Epsilon { value: f64 },
    #[display("step_size must be positive and finite, got {value}")]
    StepSize { value: f64 },
    #[display("gamma_decay must be in [0, 1], got {value}")]
    GammaDecay { value: f64 },
    #[display("at least one episode must be played")]
    NoEpisodes,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AgentError {
    #[display("{_0}")]
    Param(ParamError),
    #[display("{_0}")]
    Table(TableError),
    #[display("{_0}")]
    Move(InvalidMoveError),
    #[display("engine config {engine:?} does not match the value table config {table:?}")]
    ConfigMismatch {
        engine: GameConfig,
        table: GameConfig,
    },
}

impl From<ParamError> for AgentError {
    fn from(err: ParamError) -> Self {
        Self::Param(err)
    }
}

impl From<TableError> for AgentError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

impl From<InvalidMoveError> for AgentError {
    fn from(err: InvalidMoveError) -> Self {
        Self::Move(err)
    }
}

/// Action picked for a state, copied out of the table.
#[derive(Debug)]
struct Step {
    state: StateKey,
    index: usize,
    action: Move,
    value: f64,
}

/// Tabular SARSA agent.
///
/// The agent owns its [`ValueTable`] and the generator behind its policy and its
/// random initial values. The engine is borrowed per call, so one engine can
/// serve many agents in turn.
///
/// # Example
///
/// ```
/// use shutbox_engine::{GameConfig, GameEngine, Seed};
/// use shutbox_training::{Initializer, LearnParams, SarsaAgent};
///
/// let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(1));
/// let mut agent = SarsaAgent::with_seed(&engine, Initializer::Zero, Seed::from_u64(2)).unwrap();
///
/// agent.learn(&mut engine, 100, &LearnParams::default()).unwrap();
/// let win_rate = agent.play(&mut engine, 20).unwrap();
/// assert!((0.0..=1.0).contains(&win_rate));
/// ```
#[derive(Debug, Clone)]
pub struct SarsaAgent<R = Pcg32> {
    table: ValueTable,
    rng: R,
}

impl SarsaAgent<Pcg32> {
    /// Creates an agent seeded from the thread-local generator.
    pub fn new<D>(engine: &GameEngine<D>, initializer: Initializer) -> Result<Self, TableError>
    where
        D: RollSource,
    {
        let seed = Seed::generate(&mut rand::rng());
        Self::with_seed(engine, initializer, seed)
    }

    /// Like [`Self::new`], but reproducible.
    pub fn with_seed<D>(
        engine: &GameEngine<D>,
        initializer: Initializer,
        seed: Seed,
    ) -> Result<Self, TableError>
    where
        D: RollSource,
    {
        Self::with_rng(engine, initializer, seed.rng())
    }
}

impl<R> SarsaAgent<R>
where
    R: Rng,
{
    /// Builds the value table for the engine's configuration and takes ownership
    /// of `rng`.
    pub fn with_rng<D>(
        engine: &GameEngine<D>,
        initializer: Initializer,
        mut rng: R,
    ) -> Result<Self, TableError>
    where
        D: RollSource,
    {
        let table = ValueTable::build(engine, initializer, &mut rng)?;
        Ok(Self { table, rng })
    }

    /// Wraps an existing table, for example one restored from disk.
    #[must_use]
    pub fn from_table(table: ValueTable, rng: R) -> Self {
        Self { table, rng }
    }

    #[must_use]
    pub fn value_table(&self) -> &ValueTable {
        &self.table
    }

    #[must_use]
    pub fn into_value_table(self) -> ValueTable {
        self.table
    }

    /// Picks an action for `state` epsilon-greedily.
    ///
    /// Returns `Ok(None)` if the state has no legal move, and an error if
    /// `epsilon` is not in `[0, 1]`.
    pub fn policy(&mut self, epsilon: f64, state: StateKey) -> Result<Option<Choice>, ParamError> {
        check_epsilon(epsilon)?;
        Ok(epsilon_greedy(self.table.actions(state), epsilon, &mut self.rng))
    }

    fn choose(&mut self, epsilon: f64, state: StateKey) -> Option<Step> {
        let actions = self.table.actions(state)?;
        let choice = epsilon_greedy(Some(actions), epsilon, &mut self.rng)?;
        let picked = &actions[choice.index];
        Some(Step {
            state,
            index: choice.index,
            action: picked.action().clone(),
            value: picked.value(),
        })
    }

    fn check_engine<D>(&self, engine: &GameEngine<D>) -> Result<(), AgentError>
    where
        D: RollSource,
    {
        if engine.config() != self.table.config() {
            return Err(AgentError::ConfigMismatch {
                engine: *engine.config(),
                table: *self.table.config(),
            });
        }
        Ok(())
    }

    /// Improves the value table over `episodes` games.
    ///
    /// Parameters are validated before any game starts. The engine's box is reset
    /// at the start of every episode and left in its final position.
    pub fn learn<D>(
        &mut self,
        engine: &mut GameEngine<D>,
        episodes: usize,
        params: &LearnParams,
    ) -> Result<(), AgentError>
    where
        D: RollSource,
    {
        params.validate()?;
        self.check_engine(engine)?;

        for _ in 0..episodes {
            engine.reset();
            let roll = engine.roll_dice();
            let mut current = self.choose(params.epsilon, StateKey::new(engine.box_hash(), roll));

            while let Some(step) = current {
                engine.apply_move(&step.action)?;
                let reward = if engine.solved() { 1.0 } else { 0.0 };

                let roll = engine.roll_dice();
                let next = self.choose(params.epsilon, StateKey::new(engine.box_hash(), roll));
                let next_value = next.as_ref().map_or(0.0, |n| n.value);

                let Some(actions) = self.table.actions_mut(step.state) else {
                    unreachable!("state {:?} was chosen from the table", step.state);
                };
                let q = &mut actions[step.index].value;
                *q += params.step_size * (reward + params.gamma_decay * next_value - *q);
                current = next;
            }
        }
        Ok(())
    }

    /// Plays `episodes` games greedily without learning and returns the win rate.
    pub fn play<D>(&mut self, engine: &mut GameEngine<D>, episodes: usize) -> Result<f64, AgentError>
    where
        D: RollSource,
    {
        if episodes == 0 {
            return Err(ParamError::NoEpisodes.into());
        }
        self.check_engine(engine)?;

        let mut wins = 0_usize;
        for _ in 0..episodes {
            engine.reset();
            loop {
                let roll = engine.roll_dice();
                let Some(step) = self.choose(1.0, StateKey::new(engine.box_hash(), roll)) else {
                    break;
                };
                engine.apply_move(&step.action)?;
            }
            if engine.solved() {
                wins += 1;
            }
        }

        #[expect(clippy::cast_precision_loss)]
        let win_rate = wins as f64 / episodes as f64;
        Ok(win_rate)
    }
}
