//! Hyperparameter grid search over SARSA agents.
//!
//! Every combination of epsilon, step size and gamma decay is one trial: a fresh
//! agent learns for `training_episodes` games and is then scored by its greedy
//! win rate over `testing_episodes` games.
//!
//! Trials run on scoped worker threads pulling from a shared queue. Each trial gets
//! its own engine and agent, both seeded from a per-trial seed drawn up front from
//! the master seed, so results do not depend on the number of workers or on
//! scheduling.

use std::{
    num::NonZeroUsize,
    panic,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use serde::{Deserialize, Serialize};
use shutbox_engine::{GameConfig, GameEngine, Seed};

use crate::{
    sarsa::{AgentError, LearnParams, ParamError, SarsaAgent},
    value_table::Initializer,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearch {
    pub epsilons: Vec<f64>,
    pub step_sizes: Vec<f64>,
    pub gamma_decays: Vec<f64>,
    pub training_episodes: usize,
    pub testing_episodes: usize,
    pub initializer: Initializer,
}

impl Default for GridSearch {
    fn default() -> Self {
        Self {
            epsilons: vec![0.1, 0.5, 0.9, 1.0],
            step_sizes: vec![0.001, 0.01, 0.1, 0.5, 0.9, 1.0],
            gamma_decays: vec![0.05, 0.25, 0.5, 0.75, 0.95, 1.0],
            training_episodes: 1000,
            testing_episodes: 50,
            initializer: Initializer::Zero,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum GridSearchError {
    #[display("no {axis} values to search")]
    EmptyAxis { axis: &'static str },
    #[display("at least one testing episode is required")]
    NoTestingEpisodes,
    #[display("invalid parameters: {_0}")]
    Param(ParamError),
    #[display("trial failed: {_0}")]
    Agent(AgentError),
}

impl From<ParamError> for GridSearchError {
    fn from(err: ParamError) -> Self {
        Self::Param(err)
    }
}

impl From<AgentError> for GridSearchError {
    fn from(err: AgentError) -> Self {
        Self::Agent(err)
    }
}

/// Outcome of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    /// Position in [`GridSearch::configurations`].
    pub index: usize,
    pub params: LearnParams,
    pub win_rate: f64,
}

#[derive(Debug, Clone)]
pub struct GridSearchResult {
    /// Trials by win rate, best first; equal rates keep grid order.
    pub trials: Vec<TrialSummary>,
    /// Trained agent of `trials[0]`.
    pub best: SarsaAgent,
}

impl GridSearchResult {
    #[must_use]
    pub fn best_summary(&self) -> &TrialSummary {
        &self.trials[0]
    }
}

#[derive(Debug, Clone, Copy)]
struct Trial {
    index: usize,
    params: LearnParams,
    engine_seed: Seed,
    agent_seed: Seed,
}

#[derive(Debug)]
struct WorkerOutput {
    summaries: Vec<TrialSummary>,
    best: Option<(TrialSummary, SarsaAgent)>,
}

/// Orders summaries best first: higher win rate, then lower index.
fn rank(a: &TrialSummary, b: &TrialSummary) -> std::cmp::Ordering {
    b.win_rate
        .total_cmp(&a.win_rate)
        .then(a.index.cmp(&b.index))
}

impl GridSearch {
    /// Returns every parameter combination, epsilon-major then step size.
    #[must_use]
    pub fn configurations(&self) -> Vec<LearnParams> {
        let len = self.epsilons.len() * self.step_sizes.len() * self.gamma_decays.len();
        let mut configurations = Vec::with_capacity(len);
        for &epsilon in &self.epsilons {
            for &step_size in &self.step_sizes {
                for &gamma_decay in &self.gamma_decays {
                    configurations.push(LearnParams {
                        epsilon,
                        step_size,
                        gamma_decay,
                    });
                }
            }
        }
        configurations
    }

    pub fn validate(&self) -> Result<(), GridSearchError> {
        for (axis, values) in [
            ("epsilon", &self.epsilons),
            ("step_size", &self.step_sizes),
            ("gamma_decay", &self.gamma_decays),
        ] {
            if values.is_empty() {
                return Err(GridSearchError::EmptyAxis { axis });
            }
        }
        if self.testing_episodes == 0 {
            return Err(GridSearchError::NoTestingEpisodes);
        }
        for params in self.configurations() {
            params.validate()?;
        }
        Ok(())
    }

    /// Runs every trial and ranks the results.
    ///
    /// `on_trial` is called from the worker threads as each trial finishes, in
    /// completion order.
    ///
    /// # Errors
    ///
    /// Fails before any trial starts if the grid is invalid, and with the first
    /// failing trial's error otherwise (for example when the configuration is too
    /// large for a value table).
    pub fn run<F>(
        &self,
        config: GameConfig,
        seed: Seed,
        workers: NonZeroUsize,
        on_trial: F,
    ) -> Result<GridSearchResult, GridSearchError>
    where
        F: Fn(&TrialSummary) + Sync,
    {
        self.validate()?;

        let mut rng = seed.rng();
        let trials: Vec<Trial> = self
            .configurations()
            .into_iter()
            .enumerate()
            .map(|(index, params)| Trial {
                index,
                params,
                engine_seed: Seed::generate(&mut rng),
                agent_seed: Seed::generate(&mut rng),
            })
            .collect();

        let next = AtomicUsize::new(0);
        let worker_count = workers.get().min(trials.len());
        let outputs: Vec<Result<WorkerOutput, GridSearchError>> = thread::scope(|s| {
            let (trials, next, on_trial) = (&trials, &next, &on_trial);
            let handles: Vec<_> = (0..worker_count)
                .map(|_| s.spawn(move || self.work(config, trials, next, on_trial)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect()
        });

        let mut summaries = Vec::with_capacity(trials.len());
        let mut best: Option<(TrialSummary, SarsaAgent)> = None;
        for output in outputs {
            let output = output?;
            summaries.extend(output.summaries);
            if let Some(candidate) = output.best {
                match &best {
                    Some((current, _)) if rank(current, &candidate.0).is_le() => {}
                    _ => best = Some(candidate),
                }
            }
        }
        summaries.sort_by(rank);

        let (_, best) =
            best.expect("validate() guarantees a trial, and every trial succeeded");
        Ok(GridSearchResult {
            trials: summaries,
            best,
        })
    }

    fn work<F>(
        &self,
        config: GameConfig,
        trials: &[Trial],
        next: &AtomicUsize,
        on_trial: &F,
    ) -> Result<WorkerOutput, GridSearchError>
    where
        F: Fn(&TrialSummary) + Sync,
    {
        let mut output = WorkerOutput {
            summaries: vec![],
            best: None,
        };
        loop {
            let Some(trial) = trials.get(next.fetch_add(1, Ordering::Relaxed)) else {
                break;
            };

            let mut engine = GameEngine::with_seed(config, trial.engine_seed);
            let mut agent = SarsaAgent::with_seed(&engine, self.initializer, trial.agent_seed)
                .map_err(AgentError::from)?;
            agent.learn(&mut engine, self.training_episodes, &trial.params)?;
            let win_rate = agent.play(&mut engine, self.testing_episodes)?;

            let summary = TrialSummary {
                index: trial.index,
                params: trial.params,
                win_rate,
            };
            on_trial(&summary);
            output.summaries.push(summary);
            match &output.best {
                Some((current, _)) if rank(current, &summary).is_le() => {}
                _ => output.best = Some((summary, agent)),
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn small_grid() -> GridSearch {
        GridSearch {
            epsilons: vec![0.5, 1.0],
            step_sizes: vec![0.1, 0.5],
            gamma_decays: vec![0.5, 1.0],
            training_episodes: 50,
            testing_episodes: 20,
            initializer: Initializer::Zero,
        }
    }

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_default_grid() {
        let grid = GridSearch::default();
        assert!(grid.validate().is_ok());
        let configurations = grid.configurations();
        assert_eq!(configurations.len(), 4 * 6 * 6);
        assert_eq!(
            configurations[0],
            LearnParams {
                epsilon: 0.1,
                step_size: 0.001,
                gamma_decay: 0.05
            }
        );
        assert_eq!(
            configurations[1],
            LearnParams {
                epsilon: 0.1,
                step_size: 0.001,
                gamma_decay: 0.25
            }
        );
        assert_eq!(
            configurations[6],
            LearnParams {
                epsilon: 0.1,
                step_size: 0.01,
                gamma_decay: 0.05
            }
        );
        assert_eq!(configurations[36].epsilon, 0.5);
    }

    #[test]
    fn test_validate() {
        let mut grid = small_grid();
        grid.step_sizes.clear();
        assert_eq!(
            grid.validate(),
            Err(GridSearchError::EmptyAxis { axis: "step_size" })
        );

        let mut grid = small_grid();
        grid.testing_episodes = 0;
        assert_eq!(grid.validate(), Err(GridSearchError::NoTestingEpisodes));

        let mut grid = small_grid();
        grid.gamma_decays.push(1.5);
        assert!(matches!(
            grid.validate(),
            Err(GridSearchError::Param(ParamError::GammaDecay { .. }))
        ));
    }

    #[test]
    fn test_run_ranks_every_trial() {
        let grid = small_grid();
        let config = GameConfig::new(6, 2, 6).unwrap();
        let seen = Mutex::new(vec![]);
        let result = grid
            .run(config, Seed::from_u64(7), workers(3), |summary| {
                seen.lock().unwrap().push(summary.index);
            })
            .unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());

        assert_eq!(result.trials.len(), 8);
        for pair in result.trials.windows(2) {
            assert!(
                pair[0].win_rate > pair[1].win_rate
                    || (pair[0].win_rate == pair[1].win_rate && pair[0].index < pair[1].index)
            );
        }
        let configurations = grid.configurations();
        for trial in &result.trials {
            assert_eq!(trial.params, configurations[trial.index]);
            assert!((0.0..=1.0).contains(&trial.win_rate));
        }
        assert_eq!(result.best.value_table().config(), &config);
    }

    #[test]
    fn test_run_is_independent_of_worker_count() {
        let grid = small_grid();
        let config = GameConfig::new(6, 2, 6).unwrap();
        let one = grid
            .run(config, Seed::from_u64(3), workers(1), |_| {})
            .unwrap();
        let many = grid
            .run(config, Seed::from_u64(3), workers(4), |_| {})
            .unwrap();
        assert_eq!(one.trials, many.trials);

        let values = |r: &GridSearchResult| -> Vec<f64> {
            r.best.value_table().iter().map(|(_, v)| v).collect()
        };
        assert_eq!(values(&one), values(&many));
    }

    #[test]
    fn test_run_reports_table_errors() {
        let grid = small_grid();
        let config = GameConfig::new(6, 2, 20).unwrap();
        let result = grid.run(config, Seed::from_u64(0), workers(2), |_| {});
        assert!(matches!(
            result,
            Err(GridSearchError::Agent(AgentError::Table(_)))
        ));
    }

    #[test]
    fn test_certain_win_ranks_first_by_index() {
        // every roll is 3 on a 3-switch box, so every trial can win
        let grid = GridSearch {
            training_episodes: 20,
            ..small_grid()
        };
        let config = GameConfig::new(1, 3, 3).unwrap();
        let result = grid
            .run(config, Seed::from_u64(1), workers(2), |_| {})
            .unwrap();
        assert!(result.trials.iter().all(|t| t.win_rate == 1.0));
        let indices: Vec<usize> = result.trials.iter().map(|t| t.index).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        assert_eq!(result.best_summary().index, 0);
    }
}
