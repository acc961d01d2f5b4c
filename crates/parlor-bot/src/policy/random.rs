use super::{Policy, PolicyContext, PolicyError};
use parlor_core::model::action::Move;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{Level, event};

/// Uniform choice over the legal moves.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub const NAME: &'static str = "random";

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError> {
        let chosen = *ctx
            .legal
            .choose(&mut self.rng)
            .ok_or(PolicyError::NoLegalMoves(ctx.seat))?;
        event!(
            target: "parlor_bot::decision",
            Level::TRACE,
            policy = Self::NAME,
            seat = %ctx.seat,
            legal_count = ctx.legal.len(),
            chosen = %chosen,
        );
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::RandomPolicy;
    use crate::policy::fixtures::Table;
    use crate::policy::{Policy, PolicyError};
    use parlor_core::model::card::Card;

    #[test]
    fn same_seed_same_choices() {
        let table = Table::poker(&[Card::One, Card::Three]);
        let mut a = RandomPolicy::with_seed(42);
        let mut b = RandomPolicy::with_seed(42);
        for _ in 0..20 {
            let chosen = a.choose_move(&table.ctx()).unwrap();
            assert_eq!(chosen, b.choose_move(&table.ctx()).unwrap());
            assert!(table.legal.contains(&chosen));
        }
    }

    #[test]
    fn empty_legal_set_is_an_error() {
        let mut table = Table::jack(&[Card::Two], 5, None);
        table.legal.clear();
        let mut policy = RandomPolicy::with_seed(1);
        assert!(matches!(
            policy.choose_move(&table.ctx()),
            Err(PolicyError::NoLegalMoves(_))
        ));
    }
}
