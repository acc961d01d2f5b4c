use crate::eval::opponent::OpponentPolicy;
use crate::game::RoundError;
use crate::learn::state::StateSpace;
use crate::model::action::{Decision, Move};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{HandStatus, Seat};
use crate::model::points::Points;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JackVariant {
    Whitejack,
    Greyjack,
    Blackjack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOrder {
    /// Each pass gives every live seat one action.
    Alternating,
    /// The first seat plays out its hand before the second seat starts.
    Sequential,
}

const fn space(bust: u8) -> StateSpace {
    match StateSpace::new(bust) {
        Some(space) => space,
        None => panic!("bust threshold leaves no playable state"),
    }
}

const SMALL_SPACE: StateSpace = space(5);
const FULL_SPACE: StateSpace = space(22);

#[derive(Debug, Clone)]
pub struct JackRules {
    variant: JackVariant,
    space: StateSpace,
    dealer: OpponentPolicy,
    turn_order: TurnOrder,
    deck: Deck,
}

impl JackRules {
    pub fn whitejack() -> Self {
        Self {
            variant: JackVariant::Whitejack,
            space: SMALL_SPACE,
            dealer: OpponentPolicy::DRAW_BELOW_FOUR,
            turn_order: TurnOrder::Alternating,
            deck: Deck::whitejack(),
        }
    }

    pub fn greyjack() -> Self {
        Self {
            variant: JackVariant::Greyjack,
            dealer: OpponentPolicy::DRAW_BELOW_THREE,
            ..Self::whitejack()
        }
    }

    pub fn blackjack() -> Self {
        Self {
            variant: JackVariant::Blackjack,
            space: FULL_SPACE,
            dealer: OpponentPolicy::DRAW_BELOW_SEVENTEEN,
            turn_order: TurnOrder::Sequential,
            deck: Deck::full(),
        }
    }

    pub fn for_variant(variant: JackVariant) -> Self {
        match variant {
            JackVariant::Whitejack => Self::whitejack(),
            JackVariant::Greyjack => Self::greyjack(),
            JackVariant::Blackjack => Self::blackjack(),
        }
    }

    pub fn variant(&self) -> JackVariant {
        self.variant
    }

    pub fn bust(&self) -> u8 {
        self.space.bust_threshold()
    }

    pub fn state_space(&self) -> StateSpace {
        self.space
    }

    /// Stand rule used by a fixed-threshold dealer in this variant.
    pub fn dealer(&self) -> OpponentPolicy {
        self.dealer
    }

    pub fn turn_order(&self) -> TurnOrder {
        self.turn_order
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }
}

/// One applied decision: the seat's total before and after, and the card
/// drawn if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub seat: Seat,
    pub decision: Decision,
    pub from: Points,
    pub to: Points,
    pub card: Option<Card>,
    pub status: HandStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JackShowdown {
    pub totals: [Points; 2],
    pub statuses: [HandStatus; 2],
    pub winner: Option<Seat>,
}

#[derive(Debug, Clone)]
pub struct JackRound {
    rules: JackRules,
    deck: Deck,
    rng: StdRng,
    hands: [Hand; 2],
    status: [HandStatus; 2],
    turn: Option<Seat>,
}

impl JackRound {
    /// Deals one card per seat. A rigged seat starts from the given hand.
    pub fn deal(
        rules: JackRules,
        seed: u64,
        rigged: [Option<Hand>; 2],
    ) -> Result<Self, RoundError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = rules.deck.clone().shuffled(&mut rng);
        let mut hands = [Hand::new(), Hand::new()];

        for (seat, rig) in Seat::BOTH.into_iter().zip(rigged) {
            hands[seat.index()] = match rig {
                Some(hand) => {
                    if hand.jack_total(rules.bust()).floor() >= rules.bust() {
                        return Err(RoundError::RiggedBust { seat });
                    }
                    hand
                }
                None => {
                    let card = deck.draw(&mut rng).ok_or(RoundError::DeckExhausted)?;
                    Hand::with_cards(vec![card])
                }
            };
        }

        Ok(Self {
            rules,
            deck,
            rng,
            hands,
            status: [HandStatus::Dealt; 2],
            turn: Some(Seat::First),
        })
    }

    pub fn rules(&self) -> &JackRules {
        &self.rules
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn total(&self, seat: Seat) -> Points {
        self.hands[seat.index()].jack_total(self.rules.bust())
    }

    pub fn status(&self, seat: Seat) -> HandStatus {
        self.status[seat.index()]
    }

    /// The seat's first card, which the other seat can see.
    pub fn upcard(&self, seat: Seat) -> Option<Card> {
        self.hands[seat.index()].first()
    }

    pub fn to_act(&self) -> Option<Seat> {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        self.turn.is_none()
    }

    pub fn legal_moves(&self, seat: Seat) -> Vec<Move> {
        if self.turn == Some(seat) {
            vec![Move::Stand, Move::Draw]
        } else {
            Vec::new()
        }
    }

    pub fn apply(&mut self, seat: Seat, decision: Decision) -> Result<Transition, RoundError> {
        let expected = self.turn.ok_or(RoundError::Finished)?;
        if expected != seat {
            return Err(RoundError::OutOfTurn { seat, expected });
        }

        let from = self.total(seat);
        let card = match decision {
            Decision::Stop => {
                self.status[seat.index()] = HandStatus::Stood;
                None
            }
            Decision::Draw => {
                let card = self
                    .deck
                    .draw(&mut self.rng)
                    .ok_or(RoundError::DeckExhausted)?;
                self.hands[seat.index()].add(card);
                self.status[seat.index()] = if self.total(seat).floor() >= self.rules.bust() {
                    HandStatus::Bust
                } else {
                    HandStatus::Drawing
                };
                Some(card)
            }
        };

        self.turn = self.next_turn(seat);
        Ok(Transition {
            seat,
            decision,
            from,
            to: self.total(seat),
            card,
            status: self.status(seat),
        })
    }

    fn next_turn(&self, acted: Seat) -> Option<Seat> {
        let live = |seat: Seat| !self.status[seat.index()].is_terminal();
        match self.rules.turn_order {
            TurnOrder::Alternating => {
                if acted == Seat::First && live(Seat::Second) {
                    Some(Seat::Second)
                } else if Seat::BOTH.into_iter().all(live) {
                    Some(Seat::First)
                } else {
                    None
                }
            }
            TurnOrder::Sequential => match (acted, self.status[acted.index()]) {
                (Seat::First, HandStatus::Bust) => None,
                (seat, _) if live(seat) => Some(seat),
                (Seat::First, _) if live(Seat::Second) => Some(Seat::Second),
                _ => None,
            },
        }
    }

    /// Equal real totals draw, a busted seat loses, otherwise the higher
    /// total wins.
    pub fn outcome(&self) -> Result<JackShowdown, RoundError> {
        if !self.is_finished() {
            return Err(RoundError::InProgress);
        }
        let totals = [self.total(Seat::First), self.total(Seat::Second)];
        let bust = self.rules.bust();
        let (first, second) = (totals[0].floor(), totals[1].floor());
        let winner = match (first >= bust, second >= bust) {
            _ if first == second => None,
            (true, true) => None,
            (true, false) => Some(Seat::Second),
            (false, true) => Some(Seat::First),
            (false, false) if first > second => Some(Seat::First),
            (false, false) => Some(Seat::Second),
        };
        Ok(JackShowdown {
            totals,
            statuses: self.status,
            winner,
        })
    }
}
