use super::{Policy, PolicyContext, PolicyError, ensure_legal, jack_view};
use parlor_core::learn::Assessment;
use parlor_core::model::action::Move;
use tracing::{Level, event};

/// Draws when a higher reachable state has a better learned win rate.
pub struct LearnedThresholdPolicy;

impl LearnedThresholdPolicy {
    pub const NAME: &'static str = "learned_threshold";
}

impl Policy for LearnedThresholdPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_move(&mut self, ctx: &PolicyContext) -> Result<Move, PolicyError> {
        let (total, _, _) = jack_view(Self::NAME, ctx)?;
        let state = ctx.transitions.space().of_total(total);
        let assessment = ctx.transitions.assess(state)?;
        let chosen = ensure_legal(Self::NAME, ctx, assessment.decision.into())?;
        log_assessment(ctx, &assessment, chosen);
        Ok(chosen)
    }
}

fn log_assessment(ctx: &PolicyContext, assessment: &Assessment, chosen: Move) {
    let best_state = assessment.best.map(|best| best.state.value());
    let best_estimate = assessment
        .best
        .map(|best| best.estimate.value().to_string());

    if assessment.used_neutral() {
        event!(
            target: "parlor_bot::learned",
            Level::WARN,
            seat = %ctx.seat,
            state = assessment.current.value(),
            best_state = ?best_state,
            chosen = %chosen,
            "decision rested on an unobserved state"
        );
    }

    event!(
        target: "parlor_bot::decision",
        Level::DEBUG,
        policy = LearnedThresholdPolicy::NAME,
        seat = %ctx.seat,
        state = assessment.current.value(),
        current_estimate = %assessment.current_estimate.value(),
        best_state = ?best_state,
        best_estimate = ?best_estimate,
        chosen = %chosen,
    );
}

#[cfg(test)]
mod tests {
    use super::LearnedThresholdPolicy;
    use crate::policy::Policy;
    use crate::policy::fixtures::Table;
    use parlor_core::model::action::Move;
    use parlor_core::model::card::Card;

    #[test]
    fn fresh_learner_stands() {
        let table = Table::jack(&[Card::One], 5, None);
        let mut policy = LearnedThresholdPolicy;
        assert_eq!(policy.choose_move(&table.ctx()).unwrap(), Move::Stand);
    }

    #[test]
    fn draws_toward_a_winning_state() {
        let mut table = Table::jack(&[Card::Two], 5, None);
        let space = table.transitions.space();
        let two = space.state(2).unwrap();
        let four = space.state(4).unwrap();
        table.transitions.observe_outcome(two, false).unwrap();
        table.transitions.observe_outcome(four, true).unwrap();
        table.transitions.normalize(None).unwrap();

        let mut policy = LearnedThresholdPolicy;
        assert_eq!(policy.choose_move(&table.ctx()).unwrap(), Move::Draw);
    }

    #[test]
    fn stands_when_nothing_is_reachable() {
        let mut table = Table::jack(&[Card::Four], 5, None);
        let four = table.transitions.space().state(4).unwrap();
        table.transitions.observe_outcome(four, false).unwrap();
        table.transitions.normalize(None).unwrap();

        let mut policy = LearnedThresholdPolicy;
        assert_eq!(policy.choose_move(&table.ctx()).unwrap(), Move::Stand);
    }
}
