//! Trial harness for the parlor learners: YAML-configured self-play and
//! rigged-start sampling runs, run summaries, and the evaluator's policy
//! table.

pub mod analytics;
pub mod config;
pub mod logging;
pub mod policy_table;
pub mod roster;
pub mod trials;
