use crate::policy::{Policy, PolicyContext, PolicyError, PolicyKind, TableView};
use parlor_core::game::{JackRound, PokerRound};
use parlor_core::learn::{LearnError, OutcomeLearner, StateSpace, TransitionLearner};
use parlor_core::model::action::{Decision, Move};
use parlor_core::model::card::Card;
use parlor_core::model::hand::Hand;
use parlor_core::model::player::Seat;
use parlor_core::model::points::Points;
use tracing::{Level, event};

/// A named seat occupant: one decision capability plus the learners it
/// owns. Learners record every hand whatever the policy.
pub struct Agent {
    name: String,
    kind: PolicyKind,
    policy: Box<dyn Policy>,
    transitions: TransitionLearner,
    outcomes: OutcomeLearner,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        kind: PolicyKind,
        space: StateSpace,
        learning_rate: f64,
        seed: u64,
    ) -> Result<Self, LearnError> {
        Ok(Self {
            name: name.into(),
            policy: kind.build(seed),
            kind,
            transitions: TransitionLearner::new(space),
            outcomes: OutcomeLearner::new(learning_rate)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PolicyKind {
        &self.kind
    }

    pub fn transitions(&self) -> &TransitionLearner {
        &self.transitions
    }

    pub fn transitions_mut(&mut self) -> &mut TransitionLearner {
        &mut self.transitions
    }

    pub fn outcomes(&self) -> &OutcomeLearner {
        &self.outcomes
    }

    pub fn choose(
        &mut self,
        seat: Seat,
        hand: &Hand,
        table: TableView,
        legal: &[Move],
        kinds: &[Card],
    ) -> Result<Move, PolicyError> {
        let ctx = PolicyContext {
            seat,
            hand,
            table,
            legal,
            kinds,
            transitions: &self.transitions,
            outcomes: &self.outcomes,
        };
        self.policy.choose_move(&ctx)
    }

    pub fn decide_jack(&mut self, round: &JackRound, seat: Seat) -> Result<Decision, PolicyError> {
        let table = TableView::Jack {
            total: round.total(seat),
            bust: round.rules().bust(),
            upcard: round.upcard(seat.other()),
        };
        let legal = round.legal_moves(seat);
        let kinds = round.rules().deck().kinds();
        let chosen = self.choose(seat, round.hand(seat), table, &legal, &kinds)?;
        match chosen {
            Move::Stand => Ok(Decision::Stop),
            Move::Draw => Ok(Decision::Draw),
            Move::Discard(_) => Err(PolicyError::IllegalChoice {
                policy: self.policy.name(),
                chosen,
            }),
        }
    }

    pub fn choose_poker(&mut self, round: &PokerRound, seat: Seat) -> Result<Move, PolicyError> {
        let legal = round.legal_moves(seat);
        let kinds = round.rules().deck().kinds();
        self.choose(seat, round.hand(seat), TableView::Poker, &legal, &kinds)
    }

    /// Records a move between two totals on the transition table.
    pub fn record_transition(&mut self, from: Points, to: Points) -> Result<(), LearnError> {
        let space = self.transitions.space();
        self.transitions
            .observe_transition(space.of_total(from), space.of_total(to))
    }

    /// Records the deal: START to the opening total.
    pub fn record_deal(&mut self, total: Points) -> Result<(), LearnError> {
        let space = self.transitions.space();
        self.transitions
            .observe_transition(space.start(), space.of_total(total))
    }

    /// Credits the hand's last state with the result. A bust also records
    /// the BUST to START restart.
    pub fn record_jack_result(&mut self, total: Points, won: bool) -> Result<(), LearnError> {
        let space = self.transitions.space();
        let last = space.of_total(total);
        self.transitions.observe_outcome(last, won)?;
        if space.is_bust(last) {
            self.transitions
                .observe_transition(space.bust(), space.start())?;
        }
        event!(
            target: "parlor_bot::agent",
            Level::TRACE,
            agent = %self.name,
            state = last.value(),
            won,
        );
        Ok(())
    }

    pub fn record_poker_result(&mut self, hand: &Hand, won: bool) {
        self.outcomes.learn(hand.outcome_key(), won);
    }

    pub fn normalize(&mut self) -> Result<(), LearnError> {
        self.transitions.normalize(None)
    }

    pub fn reset(&mut self) {
        self.transitions.reset();
        self.outcomes.reset();
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("policy", &self.policy.name())
            .finish_non_exhaustive()
    }
}
