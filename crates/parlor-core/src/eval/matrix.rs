use crate::eval::MatrixError;
use crate::eval::opponent::OpponentPolicy;
use crate::model::deck::Deck;
use crate::model::hand::soft_total;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Terminal-state distribution of an opponent following a fixed stand rule.
///
/// Row `r` starts from the hard total `row_offset + r`. Columns are the
/// opponent's terminal totals `policy_threshold..bust_threshold` followed by
/// a final BUST column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct StationaryMatrix {
    policy_threshold: u8,
    bust_threshold: u8,
    row_offset: u8,
    rows: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawMatrix {
    policy_threshold: u8,
    bust_threshold: u8,
    row_offset: u8,
    rows: Vec<Vec<f64>>,
}

impl TryFrom<RawMatrix> for StationaryMatrix {
    type Error = MatrixError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        StationaryMatrix::new(
            raw.policy_threshold,
            raw.bust_threshold,
            raw.row_offset,
            raw.rows,
        )
    }
}

impl StationaryMatrix {
    pub fn new(
        policy_threshold: u8,
        bust_threshold: u8,
        row_offset: u8,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, MatrixError> {
        if policy_threshold == 0 || policy_threshold >= bust_threshold {
            return Err(MatrixError::InvalidThresholds {
                policy: policy_threshold,
                bust: bust_threshold,
            });
        }
        if rows.is_empty() {
            return Err(MatrixError::Empty);
        }

        let columns = usize::from(bust_threshold - policy_threshold) + 1;
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(MatrixError::RowLength {
                    row: index,
                    expected: columns,
                    found: row.len(),
                });
            }
            for (column, &value) in row.iter().enumerate() {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(MatrixError::InvalidProbability {
                        row: index,
                        column,
                        value,
                    });
                }
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(MatrixError::RowSum { row: index, sum });
            }
        }

        Ok(Self {
            policy_threshold,
            bust_threshold,
            row_offset,
            rows,
        })
    }

    /// Exact terminal distributions for `policy` drawing from `deck`.
    ///
    /// Rows run from twice the smallest card up to whichever is larger of
    /// `bust - 1` and the highest `ceil(card + smallest card)`, so every
    /// visible card lands on a row. Finite decks are treated as drawing
    /// with replacement.
    pub fn derive(policy: OpponentPolicy, bust: u8, deck: &Deck) -> Result<Self, MatrixError> {
        let threshold = policy.threshold();
        if threshold == 0 || threshold >= bust {
            return Err(MatrixError::InvalidThresholds {
                policy: threshold,
                bust,
            });
        }
        let min_card = deck.min_card().ok_or(MatrixError::EmptyDeck)?;
        let row_offset = (min_card.points() + min_card.points()).ceil();
        let last_row = deck
            .kinds()
            .into_iter()
            .map(|card| (card.points() + min_card.points()).ceil())
            .fold(bust - 1, u8::max);

        let mut chain = DealerChain {
            policy,
            bust,
            columns: usize::from(bust - threshold) + 1,
            draws: deck.draw_distribution(),
            memo: HashMap::new(),
        };
        let rows = (row_offset..=last_row)
            .map(|total| chain.terminal(total, false))
            .collect();

        Self::new(threshold, bust, row_offset, rows)
    }

    pub fn from_json(json: &str) -> Result<Self, MatrixError> {
        serde_json::from_str(json).map_err(|err| MatrixError::Json(err.to_string()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn policy_threshold(&self) -> u8 {
        self.policy_threshold
    }

    pub fn bust_threshold(&self) -> u8 {
        self.bust_threshold
    }

    pub fn row_offset(&self) -> u8 {
        self.row_offset
    }

    pub fn columns(&self) -> usize {
        usize::from(self.bust_threshold - self.policy_threshold) + 1
    }

    pub fn bust_column(&self) -> usize {
        self.columns() - 1
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_for_total(&self, total: u8) -> Option<&[f64]> {
        let index = total.checked_sub(self.row_offset)?;
        self.rows.get(usize::from(index)).map(Vec::as_slice)
    }
}

struct DealerChain {
    policy: OpponentPolicy,
    bust: u8,
    columns: usize,
    draws: Vec<(crate::model::card::Card, f64)>,
    memo: HashMap<(u8, bool), Vec<f64>>,
}

impl DealerChain {
    /// Terminal distribution from a hand with `hard` points (Aces as one).
    fn terminal(&mut self, hard: u8, has_ace: bool) -> Vec<f64> {
        if let Some(cached) = self.memo.get(&(hard, has_ace)) {
            return cached.clone();
        }

        let mut dist = vec![0.0; self.columns];
        let total = soft_total(hard, has_ace, self.bust);
        if total.floor() >= self.bust {
            dist[self.columns - 1] = 1.0;
        } else if !self.policy.must_draw(total) {
            dist[usize::from(total.floor() - self.policy.threshold())] = 1.0;
        } else {
            let draws = self.draws.clone();
            for (card, probability) in draws {
                let next = hard.saturating_add(card.hard_value());
                let child = self.terminal(next, has_ace || card.is_ace());
                for (slot, value) in dist.iter_mut().zip(child) {
                    *slot += probability * value;
                }
            }
        }

        self.memo.insert((hard, has_ace), dist.clone());
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::StationaryMatrix;
    use crate::eval::MatrixError;
    use crate::eval::opponent::OpponentPolicy;
    use crate::model::deck::Deck;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn whitejack_draw_below_four_rows() {
        let matrix =
            StationaryMatrix::derive(OpponentPolicy::DRAW_BELOW_FOUR, 5, &Deck::whitejack())
                .unwrap();
        assert_eq!(matrix.row_offset(), 2);
        assert_eq!(matrix.columns(), 2);
        // totals 2, 3, 4 and the bust row 5
        assert_eq!(matrix.rows().len(), 4);

        // From 3: a One lands on 4, anything else busts.
        let from_three = matrix.row_for_total(3).unwrap();
        assert_close(from_three[0], 0.25);
        assert_close(from_three[1], 0.75);

        // From 2: One → 3 (then 1/4 stand), Two → 4, Three/Four bust.
        let from_two = matrix.row_for_total(2).unwrap();
        assert_close(from_two[0], 0.25 * 0.25 + 0.25);
        assert_eq!(matrix.row_for_total(4).unwrap(), &[1.0, 0.0]);
        assert_eq!(matrix.row_for_total(5).unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn blackjack_rows_cover_every_upcard() {
        let matrix =
            StationaryMatrix::derive(OpponentPolicy::DRAW_BELOW_SEVENTEEN, 22, &Deck::full())
                .unwrap();
        assert_eq!(matrix.row_offset(), 4);
        assert_eq!(matrix.columns(), 6);
        assert_eq!(matrix.rows().len(), 18);
        for row in matrix.rows() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert_eq!(matrix.row_for_total(19).unwrap()[2], 1.0);
    }

    #[test]
    fn json_roundtrip_validates() {
        let matrix =
            StationaryMatrix::derive(OpponentPolicy::DRAW_BELOW_THREE, 5, &Deck::whitejack())
                .unwrap();
        let json = matrix.to_json().unwrap();
        assert_eq!(StationaryMatrix::from_json(&json).unwrap(), matrix);

        let broken = r#"{"policy_threshold":3,"bust_threshold":5,"row_offset":2,"rows":[[0.5,0.2,0.2]]}"#;
        assert!(matches!(
            StationaryMatrix::from_json(broken),
            Err(MatrixError::Json(_))
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = StationaryMatrix::new(3, 5, 2, vec![vec![0.5, 0.5]]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::RowLength {
                row: 0,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn threshold_must_sit_below_bust() {
        assert!(matches!(
            StationaryMatrix::new(5, 5, 2, vec![vec![1.0]]),
            Err(MatrixError::InvalidThresholds { policy: 5, bust: 5 })
        ));
    }

    #[test]
    fn negative_probability_is_rejected() {
        assert!(matches!(
            StationaryMatrix::new(3, 5, 2, vec![vec![-0.1, 0.6, 0.5]]),
            Err(MatrixError::InvalidProbability { column: 0, .. })
        ));
    }
}
