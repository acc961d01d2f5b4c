use super::{Policy, PolicyContext, PolicyError, ensure_legal, poker_only};
use parlor_core::model::action::Move;
use parlor_core::model::card::Card;
use parlor_core::model::hand::{Hand, PokerHand};
use tracing::{Level, event};

/// Throws back the lowest odd card, standing when none is held.
pub struct LowestOddDiscardPolicy;

impl LowestOddDiscardPolicy {
    pub const NAME: &'static str = "lowest_odd_discard";
}

impl Policy for LowestOddDiscardPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError> {
        poker_only(Self::NAME, ctx)?;
        let chosen = ctx
            .hand
            .iter()
            .copied()
            .filter(|card| card.is_odd())
            .min()
            .map_or(Move::Stand, Move::Discard);
        let chosen = ensure_legal(Self::NAME, ctx, chosen)?;
        log_hand_choice(Self::NAME, ctx, chosen, None);
        Ok(chosen)
    }
}

/// Keeps a pair, otherwise discards the lowest card.
pub struct PairPreservingPolicy;

impl PairPreservingPolicy {
    pub const NAME: &'static str = "pair_preserving";
}

impl Policy for PairPreservingPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError> {
        poker_only(Self::NAME, ctx)?;
        let chosen = match ctx.hand.poker_rank() {
            PokerHand::Pair(_) => Move::Stand,
            PokerHand::High(_) => ctx
                .hand
                .iter()
                .copied()
                .min()
                .map_or(Move::Stand, Move::Discard),
        };
        let chosen = ensure_legal(Self::NAME, ctx, chosen)?;
        log_hand_choice(Self::NAME, ctx, chosen, None);
        Ok(chosen)
    }
}

/// Compares the learned weight of the held hand with the expected weight
/// after each possible discard; standing wins ties.
pub struct LearnedHandPolicy;

impl LearnedHandPolicy {
    pub const NAME: &'static str = "learned_hand";

    /// Mean learned weight over every card that could replace `discard`.
    fn discard_value(ctx: &PolicyContext, discard: Card) -> f64 {
        if ctx.kinds.is_empty() {
            return ctx.outcomes.estimate(&ctx.hand.outcome_key());
        }
        let total: f64 = ctx
            .kinds
            .iter()
            .map(|&drawn| {
                let mut next: Hand = ctx.hand.clone();
                next.remove(discard);
                next.add(drawn);
                ctx.outcomes.estimate(&next.outcome_key())
            })
            .sum();
        total / ctx.kinds.len() as f64
    }
}

impl Policy for LearnedHandPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError> {
        poker_only(Self::NAME, ctx)?;
        if ctx.legal.is_empty() {
            return Err(PolicyError::NoLegalMoves(ctx.seat));
        }

        let mut chosen = Move::Stand;
        let mut best = ctx.outcomes.estimate(&ctx.hand.outcome_key());
        for &candidate in ctx.legal {
            if let Move::Discard(card) = candidate {
                let value = Self::discard_value(ctx, card);
                if value > best {
                    best = value;
                    chosen = candidate;
                }
            }
        }

        let chosen = ensure_legal(Self::NAME, ctx, chosen)?;
        log_hand_choice(Self::NAME, ctx, chosen, Some(best));
        Ok(chosen)
    }
}

fn log_hand_choice(policy: &'static str, ctx: &PolicyContext, chosen: Move, value: Option<f64>) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let hand = ctx
        .hand
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(",");
    event!(
        target: "parlor_bot::decision",
        Level::DEBUG,
        policy,
        seat = %ctx.seat,
        hand = %hand,
        rank = %ctx.hand.poker_rank(),
        expected = ?value,
        chosen = %chosen,
    );
}

#[cfg(test)]
mod tests {
    use super::{LearnedHandPolicy, LowestOddDiscardPolicy, PairPreservingPolicy};
    use crate::policy::fixtures::Table;
    use crate::policy::{GameFamily, Policy, PolicyError};
    use parlor_core::model::action::Move;
    use parlor_core::model::card::Card;
    use parlor_core::model::hand::HandKey;

    #[test]
    fn discards_lowest_odd_card() {
        let table = Table::poker(&[Card::Three, Card::One]);
        let mut policy = LowestOddDiscardPolicy;
        assert_eq!(
            policy.choose_move(&table.ctx()).unwrap(),
            Move::Discard(Card::One)
        );
    }

    #[test]
    fn stands_without_odd_cards() {
        let table = Table::poker(&[Card::Two, Card::Two]);
        let mut policy = LowestOddDiscardPolicy;
        assert_eq!(policy.choose_move(&table.ctx()).unwrap(), Move::Stand);
    }

    #[test]
    fn keeps_pairs_and_breaks_high_hands() {
        let mut policy = PairPreservingPolicy;
        let pair = Table::poker(&[Card::One, Card::One]);
        assert_eq!(policy.choose_move(&pair.ctx()).unwrap(), Move::Stand);
        let high = Table::poker(&[Card::Three, Card::Two]);
        assert_eq!(
            policy.choose_move(&high.ctx()).unwrap(),
            Move::Discard(Card::Two)
        );
    }

    #[test]
    fn learned_hand_stands_on_ties() {
        let table = Table::poker(&[Card::One, Card::Two]);
        let mut policy = LearnedHandPolicy;
        assert_eq!(policy.choose_move(&table.ctx()).unwrap(), Move::Stand);
    }

    #[test]
    fn learned_hand_chases_winning_hands() {
        let mut table = Table::poker(&[Card::One, Card::Two]);
        table.outcomes.learn(HandKey::new(vec![1, 2]), false);
        for _ in 0..3 {
            table.outcomes.learn(HandKey::new(vec![2]), true);
        }
        let mut policy = LearnedHandPolicy;
        // discarding the One can pair the Two
        assert_eq!(
            policy.choose_move(&table.ctx()).unwrap(),
            Move::Discard(Card::One)
        );
    }

    #[test]
    fn hand_policies_refuse_jack_tables() {
        let table = Table::jack(&[Card::Two], 5, None);
        assert!(matches!(
            PairPreservingPolicy.choose_move(&table.ctx()),
            Err(PolicyError::Unsupported {
                family: GameFamily::Jack,
                ..
            })
        ));
    }
}
