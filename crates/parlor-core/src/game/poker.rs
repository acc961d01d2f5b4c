use crate::game::RoundError;
use crate::model::action::Move;
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::{Hand, PokerHand};
use crate::model::player::Seat;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

const HAND_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PokerVariant {
    Stud,
    DrawOne,
}

#[derive(Debug, Clone)]
pub struct PokerRules {
    variant: PokerVariant,
    deck: Deck,
}

impl PokerRules {
    pub fn stud() -> Self {
        Self {
            variant: PokerVariant::Stud,
            deck: Deck::preschool(),
        }
    }

    pub fn draw_one() -> Self {
        Self {
            variant: PokerVariant::DrawOne,
            deck: Deck::preschool(),
        }
    }

    pub fn for_variant(variant: PokerVariant) -> Self {
        match variant {
            PokerVariant::Stud => Self::stud(),
            PokerVariant::DrawOne => Self::draw_one(),
        }
    }

    pub fn variant(&self) -> PokerVariant {
        self.variant
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub seat: Seat,
    pub discarded: Option<Card>,
    pub drawn: Option<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PokerShowdown {
    pub ranks: [PokerHand; 2],
    pub winner: Option<Seat>,
}

#[derive(Debug, Clone)]
pub struct PokerRound {
    rules: PokerRules,
    deck: Deck,
    rng: StdRng,
    hands: [Hand; 2],
    turn: Option<Seat>,
}

impl PokerRound {
    /// Shuffles the finite deck and deals two cards to each seat in turn.
    pub fn deal(rules: PokerRules, seed: u64) -> Result<Self, RoundError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = rules.deck.clone().shuffled(&mut rng);
        let mut hands = [Hand::new(), Hand::new()];
        for _ in 0..HAND_SIZE {
            for seat in Seat::BOTH {
                let card = deck.draw(&mut rng).ok_or(RoundError::DeckExhausted)?;
                hands[seat.index()].add(card);
            }
        }

        let turn = match rules.variant {
            PokerVariant::Stud => None,
            PokerVariant::DrawOne => Some(Seat::First),
        };
        Ok(Self {
            rules,
            deck,
            rng,
            hands,
            turn,
        })
    }

    pub fn rules(&self) -> &PokerRules {
        &self.rules
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn to_act(&self) -> Option<Seat> {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        self.turn.is_none()
    }

    /// Stand, or discard any one held card.
    pub fn legal_moves(&self, seat: Seat) -> Vec<Move> {
        if self.turn != Some(seat) {
            return Vec::new();
        }
        let mut moves = vec![Move::Stand];
        let mut held: Vec<Card> = self.hands[seat.index()].cards().to_vec();
        held.sort();
        held.dedup();
        moves.extend(held.into_iter().map(Move::Discard));
        moves
    }

    pub fn apply(&mut self, seat: Seat, chosen: Move) -> Result<Exchange, RoundError> {
        let expected = self.turn.ok_or(RoundError::Finished)?;
        if expected != seat {
            return Err(RoundError::OutOfTurn { seat, expected });
        }

        let exchange = match chosen {
            Move::Stand => Exchange {
                seat,
                discarded: None,
                drawn: None,
            },
            Move::Discard(card) if self.hands[seat.index()].contains(card) => {
                let drawn = self
                    .deck
                    .draw(&mut self.rng)
                    .ok_or(RoundError::DeckExhausted)?;
                let hand = &mut self.hands[seat.index()];
                hand.remove(card);
                hand.add(drawn);
                Exchange {
                    seat,
                    discarded: Some(card),
                    drawn: Some(drawn),
                }
            }
            attempted => return Err(RoundError::IllegalMove { seat, attempted }),
        };

        self.turn = match seat {
            Seat::First => Some(Seat::Second),
            Seat::Second => None,
        };
        Ok(exchange)
    }

    pub fn showdown(&self) -> Result<PokerShowdown, RoundError> {
        if !self.is_finished() {
            return Err(RoundError::InProgress);
        }
        let ranks = [
            self.hands[0].poker_rank(),
            self.hands[1].poker_rank(),
        ];
        let winner = match ranks[0].cmp(&ranks[1]) {
            std::cmp::Ordering::Greater => Some(Seat::First),
            std::cmp::Ordering::Less => Some(Seat::Second),
            std::cmp::Ordering::Equal => None,
        };
        Ok(PokerShowdown { ranks, winner })
    }
}
