use parlor_core::model::card::Card;
use parlor_core::model::deck::Deck;
use parlor_core::model::hand::Hand;
use parlor_core::model::points::Points;

const MAX_START_CARDS: usize = 4;

/// A hand from the deck's kinds whose total is exactly the hard `target`,
/// or `None` when no short hand reaches it. Aces are never used since they
/// would soften the total.
pub fn compose_start(deck: &Deck, bust: u8, target: u8) -> Option<Hand> {
    let mut kinds: Vec<Card> = deck.kinds().into_iter().filter(|c| !c.is_ace()).collect();
    kinds.sort_by_key(|card| std::cmp::Reverse(card.hard_value()));
    kinds.dedup_by_key(|card| card.hard_value());

    let mut cards = Vec::with_capacity(MAX_START_CARDS);
    if !search(&kinds, target, &mut cards) {
        return None;
    }
    let hand = Hand::with_cards(cards);
    (hand.jack_total(bust) == Points::whole(target)).then_some(hand)
}

/// Depth-first over non-increasing card values, largest first.
fn search(kinds: &[Card], remaining: u8, cards: &mut Vec<Card>) -> bool {
    if remaining == 0 {
        return !cards.is_empty();
    }
    if cards.len() == MAX_START_CARDS {
        return false;
    }
    for (index, &card) in kinds.iter().enumerate() {
        let value = card.hard_value();
        if value == 0 || value > remaining {
            continue;
        }
        cards.push(card);
        if search(&kinds[index..], remaining - value, cards) {
            return true;
        }
        cards.pop();
    }
    false
}
