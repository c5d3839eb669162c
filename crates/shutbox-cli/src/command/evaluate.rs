use std::path::PathBuf;

use serde::Serialize;
use shutbox_engine::{GameEngine, Seed};

use crate::{model::agent_model::AgentModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Agent model file written by `train`
    #[arg(long)]
    model: PathBuf,
    /// Number of greedy games to play
    #[arg(long, default_value_t = 1000)]
    episodes: usize,
    /// Dice seed; random if omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Evaluation<'a> {
    name: &'a str,
    episodes: usize,
    win_rate: f64,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let model = AgentModel::open(&arg.model)?;
    let seed = arg
        .seed
        .map_or_else(|| Seed::generate(&mut rand::rng()), Seed::from_u64);

    let mut rng = seed.rng();
    let mut engine = GameEngine::with_seed(model.config, Seed::generate(&mut rng));
    let mut agent = model.to_agent(rng)?;
    eprintln!(
        "Playing {} games with {} ({:?})",
        arg.episodes, model.name, model.config
    );
    let win_rate = agent.play(&mut engine, arg.episodes)?;
    eprintln!("  Win rate: {win_rate:.3} (trained: {:.3})", model.win_rate);

    let evaluation = Evaluation {
        name: &model.name,
        episodes: arg.episodes,
        win_rate,
    };
    Output::save_json(&evaluation, arg.output.as_deref())
}
