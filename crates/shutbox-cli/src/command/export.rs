use std::path::PathBuf;

use serde::Serialize;
use shutbox_engine::{BoxHash, MovesHash};
use shutbox_training::{PolicyRecord, export};

use crate::{model::agent_model::AgentModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    /// Agent model file written by `train`
    #[arg(long)]
    model: PathBuf,
    /// Model label of every fixture record
    #[arg(long, default_value = "game.BoxQ")]
    model_name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Bulk-load record: `{ "model", "pk", "fields" }`.
#[derive(Debug, Serialize)]
struct Fixture<'a> {
    model: &'a str,
    pk: usize,
    fields: PolicyFields,
}

#[derive(Debug, Serialize)]
struct PolicyFields {
    box_hash: BoxHash,
    roll: u32,
    moves_hash: Option<MovesHash>,
}

impl<'a> Fixture<'a> {
    fn new(model: &'a str, record: &PolicyRecord) -> Self {
        Self {
            model,
            pk: record.id,
            fields: PolicyFields {
                box_hash: record.box_hash,
                roll: record.roll,
                moves_hash: record.moves_hash,
            },
        }
    }
}

pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let model = AgentModel::open(&arg.model)?;
    let table = model.to_value_table()?;
    let records = export::policy_records(&table);
    let stuck = records.iter().filter(|r| r.moves_hash.is_none()).count();

    let fixtures: Vec<Fixture> = records
        .iter()
        .map(|record| Fixture::new(&arg.model_name, record))
        .collect();
    Output::save_json(&fixtures, arg.output.as_deref())?;

    eprintln!("Exported {} policy records", fixtures.len());
    eprintln!("  Without moves: {stuck}");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    Ok(())
}
