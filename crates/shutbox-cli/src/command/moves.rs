use anyhow::Context;
use serde::Serialize;
use shutbox_engine::{BoxHash, GameEngine, MovesHash, Seed};

use crate::{command::GameConfigArg, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct MovesArg {
    #[clap(flatten)]
    game: GameConfigArg,
    /// Box hash (bit i set means number i + 1 is standing)
    #[arg(long)]
    box_hash: u64,
    /// Roll total to play
    #[arg(long)]
    roll: u32,
}

#[derive(Debug, Serialize)]
struct LegalMove {
    values: Vec<u8>,
    moves_hash: MovesHash,
}

pub(crate) fn run(arg: &MovesArg) -> anyhow::Result<()> {
    let config = arg.game.to_config().context("Invalid game config")?;
    let engine = GameEngine::with_seed(config, Seed::from_u64(0));
    let box_hash = BoxHash::new(arg.box_hash);
    let switches = engine.box_from_hash(box_hash)?;

    eprintln!("Box {switches} ({box_hash}), roll {}", arg.roll);
    let moves: Vec<LegalMove> = engine
        .actions_from_hash(box_hash, arg.roll)?
        .unwrap_or_default()
        .into_iter()
        .map(|mv| {
            eprintln!("  {mv} => {}", mv.hash());
            LegalMove {
                values: mv.values().to_vec(),
                moves_hash: mv.hash(),
            }
        })
        .collect();
    if moves.is_empty() {
        eprintln!("  No legal moves");
    }
    Output::save_json(&moves, None)
}
