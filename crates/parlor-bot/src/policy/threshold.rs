use super::{Policy, PolicyContext, PolicyError, ensure_legal, jack_view};
use parlor_core::eval::OpponentPolicy;
use parlor_core::model::action::Move;
use tracing::{Level, event};

/// Draws while the real total sits below a fixed threshold.
pub struct FixedThresholdPolicy {
    rule: OpponentPolicy,
}

impl FixedThresholdPolicy {
    pub const NAME: &'static str = "fixed_threshold";

    pub fn new(rule: OpponentPolicy) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> OpponentPolicy {
        self.rule
    }
}

impl Policy for FixedThresholdPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError> {
        let (total, _, _) = jack_view(Self::NAME, ctx)?;
        let chosen = ensure_legal(Self::NAME, ctx, self.rule.decide(total).into())?;
        event!(
            target: "parlor_bot::decision",
            Level::TRACE,
            policy = Self::NAME,
            rule = %self.rule,
            total = %total,
            chosen = %chosen,
        );
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::FixedThresholdPolicy;
    use crate::policy::fixtures::Table;
    use crate::policy::{GameFamily, Policy, PolicyError};
    use parlor_core::eval::OpponentPolicy;
    use parlor_core::model::action::Move;
    use parlor_core::model::card::Card;

    #[test]
    fn draws_below_and_stands_at_threshold() {
        let mut policy = FixedThresholdPolicy::new(OpponentPolicy::DRAW_BELOW_FOUR);
        let low = Table::jack(&[Card::One, Card::Two], 5, None);
        assert_eq!(policy.choose_move(&low.ctx()).unwrap(), Move::Draw);
        let four = Table::jack(&[Card::Four], 5, None);
        assert_eq!(policy.choose_move(&four.ctx()).unwrap(), Move::Stand);
    }

    #[test]
    fn soft_seventeen_stands_for_the_dealer() {
        let mut policy = FixedThresholdPolicy::new(OpponentPolicy::DRAW_BELOW_SEVENTEEN);
        let table = Table::jack(&[Card::Ace, Card::Six], 22, None);
        assert_eq!(policy.choose_move(&table.ctx()).unwrap(), Move::Stand);
    }

    #[test]
    fn poker_tables_are_refused() {
        let mut policy = FixedThresholdPolicy::new(OpponentPolicy::DRAW_BELOW_THREE);
        let table = Table::poker(&[Card::One, Card::Two]);
        assert!(matches!(
            policy.choose_move(&table.ctx()),
            Err(PolicyError::Unsupported {
                family: GameFamily::Poker,
                ..
            })
        ));
    }
}
