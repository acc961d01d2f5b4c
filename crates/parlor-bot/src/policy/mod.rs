mod hand;
mod learned;
mod matrix;
mod random;
mod threshold;

pub use hand::{LearnedHandPolicy, LowestOddDiscardPolicy, PairPreservingPolicy};
pub use learned::LearnedThresholdPolicy;
pub use matrix::MatrixEvaluatorPolicy;
pub use random::RandomPolicy;
pub use threshold::FixedThresholdPolicy;

use parlor_core::eval::{EvalError, OpponentPolicy, PolicyEvaluator};
use parlor_core::learn::{LearnError, OutcomeLearner, TransitionLearner};
use parlor_core::model::action::Move;
use parlor_core::model::card::Card;
use parlor_core::model::hand::Hand;
use parlor_core::model::player::Seat;
use parlor_core::model::points::Points;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameFamily {
    Jack,
    Poker,
}

/// What a seat can see of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableView {
    Jack {
        total: Points,
        bust: u8,
        /// The opponent's first card.
        upcard: Option<Card>,
    },
    Poker,
}

impl TableView {
    pub fn family(self) -> GameFamily {
        match self {
            TableView::Jack { .. } => GameFamily::Jack,
            TableView::Poker => GameFamily::Poker,
        }
    }
}

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub table: TableView,
    pub legal: &'a [Move],
    /// Distinct cards the deck can produce.
    pub kinds: &'a [Card],
    pub transitions: &'a TransitionLearner,
    pub outcomes: &'a OutcomeLearner,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("no legal moves for the {0} seat")]
    NoLegalMoves(Seat),
    #[error("{policy} needs the opponent's upcard")]
    MissingUpcard { policy: &'static str },
    #[error("{policy} cannot play {family:?} games")]
    Unsupported {
        policy: &'static str,
        family: GameFamily,
    },
    #[error("{policy} chose {chosen}, which is not a legal move")]
    IllegalChoice { policy: &'static str, chosen: Move },
    #[error(transparent)]
    Learn(#[from] LearnError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Unified interface for every decision capability an agent can carry.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError>;
}

/// Decision capabilities selectable by configuration.
#[derive(Debug, Clone)]
pub enum PolicyKind {
    Random,
    LowestOddDiscard,
    PairPreserving,
    FixedThreshold(OpponentPolicy),
    LearnedThreshold,
    LearnedHand,
    MatrixEvaluator(PolicyEvaluator),
}

impl PolicyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Random => RandomPolicy::NAME,
            PolicyKind::LowestOddDiscard => LowestOddDiscardPolicy::NAME,
            PolicyKind::PairPreserving => PairPreservingPolicy::NAME,
            PolicyKind::FixedThreshold(_) => FixedThresholdPolicy::NAME,
            PolicyKind::LearnedThreshold => LearnedThresholdPolicy::NAME,
            PolicyKind::LearnedHand => LearnedHandPolicy::NAME,
            PolicyKind::MatrixEvaluator(_) => MatrixEvaluatorPolicy::NAME,
        }
    }

    pub fn supports(&self, family: GameFamily) -> bool {
        match self {
            PolicyKind::Random => true,
            PolicyKind::LowestOddDiscard | PolicyKind::PairPreserving | PolicyKind::LearnedHand => {
                family == GameFamily::Poker
            }
            PolicyKind::FixedThreshold(_)
            | PolicyKind::LearnedThreshold
            | PolicyKind::MatrixEvaluator(_) => family == GameFamily::Jack,
        }
    }

    /// `seed` only matters for the random policy.
    pub fn build(&self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::with_seed(seed)),
            PolicyKind::LowestOddDiscard => Box::new(LowestOddDiscardPolicy),
            PolicyKind::PairPreserving => Box::new(PairPreservingPolicy),
            PolicyKind::FixedThreshold(rule) => Box::new(FixedThresholdPolicy::new(*rule)),
            PolicyKind::LearnedThreshold => Box::new(LearnedThresholdPolicy),
            PolicyKind::LearnedHand => Box::new(LearnedHandPolicy),
            PolicyKind::MatrixEvaluator(evaluator) => {
                Box::new(MatrixEvaluatorPolicy::new(evaluator.clone()))
            }
        }
    }
}

/// Rejects a choice the round would refuse.
pub(crate) fn ensure_legal(
    policy: &'static str,
    ctx: &PolicyContext,
    chosen: Move,
) -> Result<Move, PolicyError> {
    if ctx.legal.contains(&chosen) {
        Ok(chosen)
    } else if ctx.legal.is_empty() {
        Err(PolicyError::NoLegalMoves(ctx.seat))
    } else {
        Err(PolicyError::IllegalChoice { policy, chosen })
    }
}

pub(crate) fn jack_view(
    policy: &'static str,
    ctx: &PolicyContext,
) -> Result<(Points, u8, Option<Card>), PolicyError> {
    match ctx.table {
        TableView::Jack {
            total,
            bust,
            upcard,
        } => Ok((total, bust, upcard)),
        TableView::Poker => Err(PolicyError::Unsupported {
            policy,
            family: GameFamily::Poker,
        }),
    }
}

pub(crate) fn poker_only(policy: &'static str, ctx: &PolicyContext) -> Result<(), PolicyError> {
    match ctx.table {
        TableView::Poker => Ok(()),
        TableView::Jack { .. } => Err(PolicyError::Unsupported {
            policy,
            family: GameFamily::Jack,
        }),
    }
}
