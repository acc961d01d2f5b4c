use crate::eval::EvalError;
use crate::eval::matrix::StationaryMatrix;
use crate::model::action::Decision;
use crate::model::points::Points;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which opponent totals count as a tie when the agent holds a soft total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftTieRule {
    /// Both the floor and ceiling column of a soft total tie.
    #[default]
    Adjacent,
    /// Only the real (floor) total ties.
    Exact,
}

/// Loss, draw and win mass of one continuation row, plus its shaped reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowOutcome {
    pub row: usize,
    pub loss: f64,
    pub draw: f64,
    pub win: f64,
    pub reward: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub row: usize,
    /// Inclusive tie columns, or `None` when the agent sits below every
    /// total the opponent can stand on.
    pub window: Option<(usize, usize)>,
    pub rows: Vec<RowOutcome>,
    pub rating: f64,
    pub decision: Decision,
}

/// Stop/draw decisions against a known opponent, read off a shared matrix.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    matrix: Arc<StationaryMatrix>,
    min_card: Points,
    soft_tie: SoftTieRule,
}

impl PolicyEvaluator {
    pub fn new(matrix: Arc<StationaryMatrix>, min_card: Points, soft_tie: SoftTieRule) -> Self {
        Self {
            matrix,
            min_card,
            soft_tie,
        }
    }

    pub fn matrix(&self) -> &StationaryMatrix {
        &self.matrix
    }

    pub fn min_card(&self) -> Points {
        self.min_card
    }

    pub fn soft_tie(&self) -> SoftTieRule {
        self.soft_tie
    }

    /// First matrix row for an opponent showing `visible`.
    pub fn row_offset(&self, visible: Points) -> Result<usize, EvalError> {
        let row = i64::from((visible + self.min_card).ceil()) - i64::from(self.matrix.row_offset());
        let rows = self.matrix.rows().len();
        usize::try_from(row)
            .ok()
            .filter(|&index| index < rows)
            .ok_or(EvalError::RowOutOfRange { row, rows })
    }

    pub fn tie_window(&self, own: Points) -> Result<Option<(usize, usize)>, EvalError> {
        let bust = self.matrix.bust_threshold();
        if own.floor() >= bust {
            return Err(EvalError::BustedTotal { total: own, bust });
        }

        let threshold = i64::from(self.matrix.policy_threshold());
        let floor_col = i64::from(own.floor()) - threshold;
        let ceil_col = i64::from(own.ceil()) - threshold;
        let (low, high) = match self.soft_tie {
            SoftTieRule::Adjacent => (floor_col, ceil_col),
            SoftTieRule::Exact => (floor_col, floor_col),
        };
        if high < 0 {
            return Ok(None);
        }

        let last = self.matrix.bust_column() as i64 - 1;
        if low > last {
            return Err(EvalError::ColumnOutOfRange {
                column: low,
                columns: self.matrix.columns(),
            });
        }
        Ok(Some((low.max(0) as usize, high.min(last) as usize)))
    }

    pub fn evaluate(&self, visible: Points, own: Points) -> Result<Evaluation, EvalError> {
        let window = self.tie_window(own)?;
        let first = self.row_offset(visible)?;
        let bust_column = self.matrix.bust_column();

        let rows: Vec<RowOutcome> = self.matrix.rows()[first..]
            .iter()
            .enumerate()
            .map(|(offset, row)| {
                let (loss, draw, win) = score_row(row, bust_column, window);
                RowOutcome {
                    row: first + offset,
                    loss,
                    draw,
                    win,
                    reward: shaped_reward(loss, draw, win),
                }
            })
            .collect();
        let rating: f64 = rows.iter().map(|outcome| outcome.reward).sum();
        let decision = if rating >= 0.0 {
            Decision::Stop
        } else {
            Decision::Draw
        };

        Ok(Evaluation {
            row: first,
            window,
            rows,
            rating,
            decision,
        })
    }

    pub fn decide(&self, visible: Points, own: Points) -> Result<Decision, EvalError> {
        self.evaluate(visible, own).map(|evaluation| evaluation.decision)
    }
}

/// Splits a row into (loss, draw, win) around the tie window.
pub fn score_row(row: &[f64], bust_column: usize, window: Option<(usize, usize)>) -> (f64, f64, f64) {
    let standing = &row[..bust_column];
    let busted = row[bust_column];
    match window {
        None => (standing.iter().sum(), 0.0, busted),
        Some((low, high)) => {
            let loss = standing[high + 1..].iter().sum();
            let draw = standing[low..=high].iter().sum();
            let win = busted + standing[..low].iter().sum::<f64>();
            (loss, draw, win)
        }
    }
}

/// `+max` when the best outcome beats losing, `-max` otherwise.
pub fn shaped_reward(loss: f64, draw: f64, win: f64) -> f64 {
    let best = loss.max(draw).max(win);
    if best > loss { best } else { -best }
}

#[cfg(test)]
mod tests {
    use super::{PolicyEvaluator, SoftTieRule, score_row, shaped_reward};
    use crate::eval::EvalError;
    use crate::eval::matrix::StationaryMatrix;
    use crate::eval::opponent::OpponentPolicy;
    use crate::model::action::Decision;
    use crate::model::card::Card;
    use crate::model::deck::Deck;
    use crate::model::points::Points;
    use std::sync::Arc;

    fn single_row(row: Vec<f64>) -> PolicyEvaluator {
        // columns: 3, 4, BUST; visible One + min One lands on row 0
        let matrix = StationaryMatrix::new(3, 5, 2, vec![row]).unwrap();
        PolicyEvaluator::new(Arc::new(matrix), Points::whole(1), SoftTieRule::Adjacent)
    }

    #[test]
    fn loss_dominant_row_draws() {
        let evaluator = single_row(vec![0.1, 0.6, 0.3]);
        let evaluation = evaluator.evaluate(Points::whole(1), Points::whole(3)).unwrap();
        let outcome = evaluation.rows[0];
        assert!((outcome.loss - 0.6).abs() < 1e-12);
        assert!((outcome.draw - 0.1).abs() < 1e-12);
        assert!((outcome.win - 0.3).abs() < 1e-12);
        assert!((evaluation.rating + 0.6).abs() < 1e-12);
        assert_eq!(evaluation.decision, Decision::Draw);
    }

    #[test]
    fn win_dominant_row_stops() {
        let evaluator = single_row(vec![0.1, 0.2, 0.7]);
        let evaluation = evaluator.evaluate(Points::whole(1), Points::whole(3)).unwrap();
        assert!((evaluation.rating - 0.7).abs() < 1e-12);
        assert_eq!(evaluation.decision, Decision::Stop);
    }

    #[test]
    fn max_equal_to_loss_counts_against() {
        assert_eq!(shaped_reward(0.5, 0.5, 0.0), -0.5);
        assert_eq!(shaped_reward(0.2, 0.1, 0.7), 0.7);
    }

    #[test]
    fn soft_totals_widen_the_tie_window() {
        let matrix =
            StationaryMatrix::derive(OpponentPolicy::DRAW_BELOW_SEVENTEEN, 22, &Deck::full())
                .unwrap();
        let matrix = Arc::new(matrix);
        let adjacent =
            PolicyEvaluator::new(matrix.clone(), Card::Two.points(), SoftTieRule::Adjacent);
        let exact = PolicyEvaluator::new(matrix, Card::Two.points(), SoftTieRule::Exact);

        assert_eq!(adjacent.tie_window(Points::soft(18)).unwrap(), Some((1, 2)));
        assert_eq!(exact.tie_window(Points::soft(18)).unwrap(), Some((1, 1)));
        // soft 21 clips to the last standing column
        assert_eq!(adjacent.tie_window(Points::soft(21)).unwrap(), Some((4, 4)));
        assert_eq!(adjacent.tie_window(Points::whole(12)).unwrap(), None);
        assert_eq!(adjacent.tie_window(Points::soft(16)).unwrap(), Some((0, 0)));
    }

    #[test]
    fn two_column_window_sums_both_ties() {
        let row = [0.05, 0.1, 0.2, 0.25, 0.15, 0.25];
        let (loss, draw, win) = score_row(&row, 5, Some((1, 2)));
        assert!((loss - 0.4).abs() < 1e-12);
        assert!((draw - 0.3).abs() < 1e-12);
        assert!((win - 0.3).abs() < 1e-12);
    }

    #[test]
    fn soft_eighteen_ties_two_totals_only_when_adjacent() {
        // columns: 17..=21, BUST
        let matrix =
            StationaryMatrix::new(17, 22, 2, vec![vec![0.1, 0.2, 0.3, 0.15, 0.05, 0.2]]).unwrap();
        let matrix = Arc::new(matrix);
        let adjacent =
            PolicyEvaluator::new(matrix.clone(), Points::whole(1), SoftTieRule::Adjacent);
        let exact = PolicyEvaluator::new(matrix, Points::whole(1), SoftTieRule::Exact);

        let wide = adjacent.evaluate(Points::whole(1), Points::soft(18)).unwrap();
        let narrow = exact.evaluate(Points::whole(1), Points::soft(18)).unwrap();

        assert!((wide.rows[0].draw - 0.5).abs() < 1e-12);
        assert!((wide.rows[0].loss - 0.2).abs() < 1e-12);
        assert!((wide.rows[0].win - 0.3).abs() < 1e-12);
        assert!((wide.rating - 0.5).abs() < 1e-12);
        assert_eq!(wide.decision, Decision::Stop);

        assert!((narrow.rows[0].draw - 0.2).abs() < 1e-12);
        assert!((narrow.rows[0].loss - 0.5).abs() < 1e-12);
        assert!((narrow.rows[0].win - 0.3).abs() < 1e-12);
        assert!((narrow.rating + 0.5).abs() < 1e-12);
        assert_eq!(narrow.decision, Decision::Draw);
    }

    #[test]
    fn below_the_stand_band_never_ties() {
        let row = [0.1, 0.2, 0.3, 0.4];
        let (loss, draw, win) = score_row(&row, 3, None);
        assert!((loss - 0.6).abs() < 1e-12);
        assert_eq!(draw, 0.0);
        assert_eq!(win, 0.4);
    }

    #[test]
    fn stands_on_twenty_against_a_six() {
        let matrix =
            StationaryMatrix::derive(OpponentPolicy::DRAW_BELOW_SEVENTEEN, 22, &Deck::full())
                .unwrap();
        let evaluator =
            PolicyEvaluator::new(Arc::new(matrix), Card::Two.points(), SoftTieRule::Adjacent);
        let decision = evaluator
            .decide(Card::Six.points(), Points::whole(20))
            .unwrap();
        assert_eq!(decision, Decision::Stop);
    }

    #[test]
    fn busted_total_is_rejected() {
        let evaluator = single_row(vec![0.1, 0.2, 0.7]);
        assert_eq!(
            evaluator.decide(Points::whole(1), Points::whole(5)),
            Err(EvalError::BustedTotal {
                total: Points::whole(5),
                bust: 5
            })
        );
    }

    #[test]
    fn visible_card_past_the_matrix_is_rejected() {
        let evaluator = single_row(vec![0.1, 0.2, 0.7]);
        assert_eq!(
            evaluator.decide(Points::whole(3), Points::whole(3)),
            Err(EvalError::RowOutOfRange { row: 2, rows: 1 })
        );
    }
}
