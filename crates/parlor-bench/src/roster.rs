use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parlor_bot::PolicyKind;
use parlor_core::eval::{MatrixError, OpponentPolicy, PolicyEvaluator, SoftTieRule, StationaryMatrix};
use parlor_core::game::JackRules;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, AgentKind, AgentParams, GameKind, ValidationError};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameters for agent '{name}': {source}")]
    Params {
        name: String,
        #[source]
        source: ValidationError,
    },
    #[error("unknown opponent policy '{policy}' for agent '{name}'")]
    UnknownPolicy { name: String, policy: String },
    #[error("agent '{name}' needs a jack game, not {game}")]
    NeedsJack { name: String, game: &'static str },
    #[error("agent '{name}' plays {policy}, which cannot sit at a {game} table")]
    Unsupported {
        name: String,
        policy: &'static str,
        game: &'static str,
    },
    #[error("failed to read matrix {path:?}: {source}")]
    ReadMatrix {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("matrix for agent '{name}' is unusable: {source}")]
    Matrix {
        name: String,
        #[source]
        source: MatrixError,
    },
    #[error("matrix bust threshold {found} does not match the table's {expected}")]
    MatrixBust { expected: u8, found: u8 },
}

/// Turns one configured agent into the policy it will play with.
pub fn policy_kind(agent: &AgentConfig, game: GameKind) -> Result<PolicyKind, AgentError> {
    let params = agent.params().map_err(|source| AgentError::Params {
        name: agent.name.clone(),
        source,
    })?;

    let kind = match agent.kind {
        AgentKind::Random => PolicyKind::Random,
        AgentKind::LowestOddDiscard => PolicyKind::LowestOddDiscard,
        AgentKind::PairPreserving => PolicyKind::PairPreserving,
        AgentKind::LearnedThreshold => PolicyKind::LearnedThreshold,
        AgentKind::LearnedHand => PolicyKind::LearnedHand,
        AgentKind::FixedThreshold => {
            let rules = jack_rules(agent, game)?;
            let policy = match params.threshold {
                Some(threshold) => OpponentPolicy::new(threshold),
                None => opponent(&agent.name, &params, &rules)?,
            };
            PolicyKind::FixedThreshold(policy)
        }
        AgentKind::MatrixEvaluator => {
            let rules = jack_rules(agent, game)?;
            let policy = opponent(&agent.name, &params, &rules)?;
            let evaluator = build_evaluator(
                &agent.name,
                policy,
                params.matrix.as_deref(),
                &rules,
                params.soft_tie.unwrap_or_default(),
            )?;
            PolicyKind::MatrixEvaluator(evaluator)
        }
    };
    if !kind.supports(game.family()) {
        return Err(AgentError::Unsupported {
            name: agent.name.clone(),
            policy: kind.name(),
            game: game.as_str(),
        });
    }
    Ok(kind)
}

/// Evaluator against `policy`, reading the matrix from `matrix` when given
/// and deriving it from the table's deck otherwise.
pub fn build_evaluator(
    name: &str,
    policy: OpponentPolicy,
    matrix: Option<&Path>,
    rules: &JackRules,
    soft_tie: SoftTieRule,
) -> Result<PolicyEvaluator, AgentError> {
    let matrix_error = |source| AgentError::Matrix {
        name: name.to_string(),
        source,
    };

    let matrix_file = matrix.is_some();
    let matrix = match matrix {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|source| AgentError::ReadMatrix {
                path: path.to_path_buf(),
                source,
            })?;
            let matrix = StationaryMatrix::from_json(&json).map_err(matrix_error)?;
            if matrix.bust_threshold() != rules.bust() {
                return Err(AgentError::MatrixBust {
                    expected: rules.bust(),
                    found: matrix.bust_threshold(),
                });
            }
            matrix
        }
        None => StationaryMatrix::derive(policy, rules.bust(), rules.deck()).map_err(matrix_error)?,
    };

    let min_card = rules
        .deck()
        .min_card()
        .ok_or(MatrixError::EmptyDeck)
        .map_err(matrix_error)?;

    event!(
        target: "parlor_bench::roster",
        Level::DEBUG,
        agent = name,
        policy = %policy,
        rows = matrix.rows().len(),
        columns = matrix.columns(),
        from_file = matrix_file,
    );

    Ok(PolicyEvaluator::new(
        Arc::new(matrix),
        min_card.points(),
        soft_tie,
    ))
}

fn jack_rules(agent: &AgentConfig, game: GameKind) -> Result<JackRules, AgentError> {
    game.jack_rules().ok_or_else(|| AgentError::NeedsJack {
        name: agent.name.clone(),
        game: game.as_str(),
    })
}

/// The named opponent policy, defaulting to the table's dealer.
fn opponent(
    name: &str,
    params: &AgentParams,
    rules: &JackRules,
) -> Result<OpponentPolicy, AgentError> {
    match params.policy.as_deref() {
        Some(policy) => OpponentPolicy::named(policy).ok_or_else(|| AgentError::UnknownPolicy {
            name: name.to_string(),
            policy: policy.to_string(),
        }),
        None => Ok(rules.dealer()),
    }
}
