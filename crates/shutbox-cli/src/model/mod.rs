pub mod agent_model;
