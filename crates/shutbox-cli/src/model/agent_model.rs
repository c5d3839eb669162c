use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use shutbox_engine::{GameConfig, GameEngine, Seed};
use shutbox_training::{Initializer, LearnParams, SarsaAgent, ValueRecord, ValueTable, export};

use crate::util;

/// Trained agent as saved by `train`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub config: GameConfig,
    pub params: LearnParams,
    /// Master seed of the search that produced this agent.
    pub seed: Seed,
    pub win_rate: f64,
    pub values: Vec<ValueRecord>,
}

impl AgentModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("agent model", path)
    }

    /// Rebuilds the value table of the saved agent.
    pub fn to_value_table(&self) -> anyhow::Result<ValueTable> {
        let engine = GameEngine::with_seed(self.config, Seed::from_u64(0));
        let mut rng = Seed::from_u64(0).rng();
        let mut table = ValueTable::build(&engine, Initializer::Zero, &mut rng)
            .with_context(|| format!("Failed to build value table for {:?}", self.config))?;
        export::apply_value_records(&mut table, &self.values)
            .with_context(|| format!("Model {} does not match its game config", self.name))?;
        Ok(table)
    }

    pub fn to_agent(&self, rng: Pcg32) -> anyhow::Result<SarsaAgent> {
        Ok(SarsaAgent::from_table(self.to_value_table()?, rng))
    }
}

#[cfg(test)]
mod tests {
    use shutbox_engine::{BoxHash, Move};

    use super::*;

    fn trained_model() -> (AgentModel, ValueTable) {
        let config = GameConfig::new(6, 2, 5).unwrap();
        let mut engine = GameEngine::with_seed(config, Seed::from_u64(1));
        let mut agent =
            SarsaAgent::with_seed(&engine, Initializer::Random, Seed::from_u64(2)).unwrap();
        let params = LearnParams::default();
        agent.learn(&mut engine, 200, &params).unwrap();
        let model = AgentModel {
            name: "test".to_owned(),
            trained_at: Utc::now(),
            config,
            params,
            seed: Seed::from_u64(1),
            win_rate: 0.5,
            values: export::value_records(agent.value_table()),
        };
        (model, agent.into_value_table())
    }

    #[test]
    fn test_json_round_trip_restores_values() {
        let (model, table) = trained_model();
        let json = serde_json::to_string(&model).unwrap();
        let loaded: AgentModel = serde_json::from_str(&json).unwrap();

        let restored = loaded.to_value_table().unwrap();
        assert_eq!(
            restored.iter().collect::<Vec<_>>(),
            table.iter().collect::<Vec<_>>()
        );
        assert_eq!(
            export::policy_records(&restored),
            export::policy_records(&table)
        );
    }

    #[test]
    fn test_mismatched_values_are_rejected() {
        let (mut model, _) = trained_model();
        // [1] does not sum to 2
        model.values.push(ValueRecord {
            box_hash: BoxHash::new(0b11111),
            roll: 2,
            moves_hash: Some(Move::new(&[1]).unwrap().hash()),
            value: 1.0,
        });
        assert!(model.to_value_table().is_err());
    }
}
