use clap::{Parser, Subcommand};
use shutbox_engine::{ConfigError, GameConfig};

use self::{evaluate::EvaluateArg, export::ExportArg, moves::MovesArg, train::TrainArg};

mod evaluate;
mod export;
mod moves;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Grid-search SARSA hyperparameters and save the best agent
    Train(#[clap(flatten)] TrainArg),
    /// Replay a saved agent greedily and report its win rate
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Write the greedy policy of a saved agent as fixture records
    Export(#[clap(flatten)] ExportArg),
    /// List the legal moves of a box hash and roll
    Moves(#[clap(flatten)] MovesArg),
}

/// Dice and box dimensions shared by the commands that build an engine.
#[derive(Debug, Clone, Copy, clap::Args)]
pub(crate) struct GameConfigArg {
    /// Number of sides of each die
    #[arg(long, default_value_t = 6)]
    dice_sides: u32,
    /// Number of dice rolled per turn
    #[arg(long, default_value_t = 2)]
    num_dice: u32,
    /// Highest number on the box
    #[arg(long, default_value_t = 9)]
    box_high_num: u8,
}

impl GameConfigArg {
    fn to_config(self) -> Result<GameConfig, ConfigError> {
        GameConfig::new(self.dice_sides, self.num_dice, self.box_high_num)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Export(arg) => export::run(&arg)?,
        Mode::Moves(arg) => moves::run(&arg)?,
    }
    Ok(())
}
