pub mod agent;
pub mod policy;

pub use agent::Agent;
pub use policy::{
    FixedThresholdPolicy, GameFamily, LearnedHandPolicy, LearnedThresholdPolicy,
    LowestOddDiscardPolicy, MatrixEvaluatorPolicy, PairPreservingPolicy, Policy, PolicyContext,
    PolicyError, PolicyKind, RandomPolicy, TableView,
};
