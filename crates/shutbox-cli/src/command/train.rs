use std::{num::NonZeroUsize, path::PathBuf, thread};

use anyhow::Context;
use chrono::Utc;
use shutbox_engine::Seed;
use shutbox_training::{GridSearch, Initializer, TrialSummary, export};

use crate::{command::GameConfigArg, model::agent_model::AgentModel, util::Output};

const SHOW_BEST: usize = 5;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    game: GameConfigArg,
    /// Greedy probabilities to search, comma separated [default: 0.1,0.5,0.9,1]
    #[arg(long, value_delimiter = ',')]
    epsilons: Vec<f64>,
    /// Step sizes to search, comma separated [default: 0.001,0.01,0.1,0.5,0.9,1]
    #[arg(long, value_delimiter = ',')]
    step_sizes: Vec<f64>,
    /// Gamma decays to search, comma separated [default: 0.05,0.25,0.5,0.75,0.95,1]
    #[arg(long, value_delimiter = ',')]
    gamma_decays: Vec<f64>,
    /// Learning episodes per trial
    #[arg(long, default_value_t = 1000)]
    training_episodes: usize,
    /// Greedy episodes scoring each trial
    #[arg(long, default_value_t = 50)]
    testing_episodes: usize,
    /// Initial action values: zero, one or random
    #[arg(long, default_value = "zero")]
    init: Initializer,
    /// Master seed; random if omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads [default: available parallelism]
    #[arg(long)]
    workers: Option<NonZeroUsize>,
    /// Model name stored in the output
    #[arg(long, default_value = "sarsa")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn or_default(values: &[f64], default: Vec<f64>) -> Vec<f64> {
    if values.is_empty() {
        default
    } else {
        values.to_vec()
    }
}

fn describe(trial: &TrialSummary) -> String {
    let p = &trial.params;
    format!(
        "#{:3}: epsilon={:<5} step_size={:<5} gamma_decay={:<5} => {:.3}",
        trial.index, p.epsilon, p.step_size, p.gamma_decay, trial.win_rate
    )
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.game.to_config().context("Invalid game config")?;
    let defaults = GridSearch::default();
    let grid = GridSearch {
        epsilons: or_default(&arg.epsilons, defaults.epsilons),
        step_sizes: or_default(&arg.step_sizes, defaults.step_sizes),
        gamma_decays: or_default(&arg.gamma_decays, defaults.gamma_decays),
        training_episodes: arg.training_episodes,
        testing_episodes: arg.testing_episodes,
        initializer: arg.init,
    };
    let seed = arg
        .seed
        .map_or_else(|| Seed::generate(&mut rand::rng()), Seed::from_u64);
    let workers = match arg.workers {
        Some(workers) => workers,
        None => thread::available_parallelism().context("Failed to count available CPUs")?,
    };

    eprintln!(
        "Searching {} configurations on {config:?} with {workers} workers",
        grid.configurations().len()
    );
    eprintln!(
        "  Episodes: {} training, {} testing",
        grid.training_episodes, grid.testing_episodes
    );
    eprintln!("  Init: {:?}", grid.initializer);

    let result = grid.run(config, seed, workers, |trial| {
        eprintln!("  {}", describe(trial));
    })?;

    eprintln!("Best configurations:");
    for trial in result.trials.iter().take(SHOW_BEST) {
        eprintln!("  {}", describe(trial));
    }

    let best = result.best_summary();
    let model = AgentModel {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        config,
        params: best.params,
        seed,
        win_rate: best.win_rate,
        values: export::value_records(result.best.value_table()),
    };
    Output::save_json(&model, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Win rate: {:.3}", model.win_rate);
    eprintln!("  Values: {} entries", model.values.len());

    Ok(())
}
