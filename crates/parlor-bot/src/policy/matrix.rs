use super::{Policy, PolicyContext, PolicyError, ensure_legal, jack_view};
use parlor_core::eval::PolicyEvaluator;
use parlor_core::model::action::Move;
use tracing::{Level, event};

/// Stop/draw from the stationary matrix of a known opponent.
pub struct MatrixEvaluatorPolicy {
    evaluator: PolicyEvaluator,
}

impl MatrixEvaluatorPolicy {
    pub const NAME: &'static str = "matrix_evaluator";

    pub fn new(evaluator: PolicyEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &PolicyEvaluator {
        &self.evaluator
    }
}

impl Policy for MatrixEvaluatorPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError> {
        let (total, _, upcard) = jack_view(Self::NAME, ctx)?;
        let upcard = upcard.ok_or(PolicyError::MissingUpcard { policy: Self::NAME })?;
        let evaluation = self.evaluator.evaluate(upcard.points(), total)?;
        let chosen = ensure_legal(Self::NAME, ctx, evaluation.decision.into())?;
        event!(
            target: "parlor_bot::decision",
            Level::DEBUG,
            policy = Self::NAME,
            seat = %ctx.seat,
            total = %total,
            upcard = %upcard,
            row = evaluation.row,
            rows = evaluation.rows.len(),
            rating = evaluation.rating,
            chosen = %chosen,
        );
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::MatrixEvaluatorPolicy;
    use crate::policy::fixtures::Table;
    use crate::policy::{Policy, PolicyError};
    use parlor_core::eval::{OpponentPolicy, PolicyEvaluator, SoftTieRule, StationaryMatrix};
    use parlor_core::model::action::Move;
    use parlor_core::model::card::Card;
    use parlor_core::model::deck::Deck;
    use std::sync::Arc;

    fn whitejack_policy() -> MatrixEvaluatorPolicy {
        let matrix =
            StationaryMatrix::derive(OpponentPolicy::DRAW_BELOW_FOUR, 5, &Deck::whitejack())
                .unwrap();
        MatrixEvaluatorPolicy::new(PolicyEvaluator::new(
            Arc::new(matrix),
            Card::One.points(),
            SoftTieRule::Adjacent,
        ))
    }

    #[test]
    fn needs_an_upcard() {
        let table = Table::jack(&[Card::Two], 5, None);
        assert!(matches!(
            whitejack_policy().choose_move(&table.ctx()),
            Err(PolicyError::MissingUpcard { .. })
        ));
    }

    #[test]
    fn stands_on_four() {
        let table = Table::jack(&[Card::Four], 5, Some(Card::Two));
        assert_eq!(
            whitejack_policy().choose_move(&table.ctx()).unwrap(),
            Move::Stand
        );
    }
}
