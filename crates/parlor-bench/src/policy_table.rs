use std::fmt;

use parlor_core::eval::{EvalError, PolicyEvaluator};
use parlor_core::model::action::{Decision, Move};
use parlor_core::model::card::Card;
use parlor_core::model::points::Points;

const HARD_TOTALS: std::ops::RangeInclusive<u8> = 4..=21;
const SOFT_TOTALS: std::ops::RangeInclusive<u8> = 12..=20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyTableRow {
    pub total: Points,
    pub upcard: Card,
    pub decision: Decision,
}

impl fmt::Display for PolicyTableRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}: {}",
            self.total,
            upcard_label(self.upcard),
            Move::from(self.decision)
        )
    }
}

/// Ten-valued cards share one column.
fn upcard_label(card: Card) -> String {
    if card.hard_value() == 10 {
        "10".to_string()
    } else {
        card.to_string()
    }
}

/// One upcard per distinct point value, in deck order.
fn upcards() -> Vec<Card> {
    let mut seen: Vec<Points> = Vec::new();
    Card::FULL
        .into_iter()
        .filter(|card| {
            let fresh = !seen.contains(&card.points());
            seen.push(card.points());
            fresh
        })
        .collect()
}

/// Decisions for every hard total, then every soft total, against each
/// upcard of the full deck.
pub fn policy_table(evaluator: &PolicyEvaluator) -> Result<Vec<PolicyTableRow>, EvalError> {
    let totals = HARD_TOTALS
        .map(Points::whole)
        .chain(SOFT_TOTALS.map(Points::soft));
    let upcards = upcards();

    let mut rows = Vec::new();
    for total in totals {
        for &upcard in &upcards {
            rows.push(PolicyTableRow {
                total,
                upcard,
                decision: evaluator.decide(upcard.points(), total)?,
            });
        }
    }
    Ok(rows)
}
