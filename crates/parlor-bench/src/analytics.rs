use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use parlor_bot::Agent;
use parlor_core::AppInfo;
use parlor_core::learn::{NormalizedWeights, WeightsRow};
use parlor_core::model::player::SeatResult;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig, GameKind};

/// Two-sided 95% quantile, used if the normal distribution cannot be built.
const CONFIDENCE_Z: f64 = 1.96;
const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Tallies per-agent results as hands finish.
pub struct AnalyticsCollector {
    run_id: String,
    game: GameKind,
    agents: Vec<AgentAccumulator>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            run_id: config.run_id.clone(),
            game: config.game,
            agents: config
                .agents
                .iter()
                .map(|agent| AgentAccumulator::new(agent.name.clone(), agent.kind))
                .collect(),
        }
    }

    pub fn record(&mut self, agent: &str, result: SeatResult) -> Result<(), AnalyticsError> {
        let accumulator = self
            .agents
            .iter_mut()
            .find(|acc| acc.name == agent)
            .ok_or_else(|| AnalyticsError::UnknownAgent(agent.to_string()))?;
        accumulator.record(result);
        Ok(())
    }

    /// Closes the tally and snapshots every agent's learned tables.
    pub fn finalize(self, agents: &[Agent]) -> AnalyticsSummary {
        let z = confidence_z();
        let reports = self
            .agents
            .into_iter()
            .map(|acc| acc.into_report(z))
            .collect();
        let tables = agents
            .iter()
            .map(|agent| LearnedTables::capture(agent, self.game))
            .collect();
        AnalyticsSummary {
            run_id: self.run_id,
            game: self.game,
            agents: reports,
            tables,
        }
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    wins: usize,
    draws: usize,
    losses: usize,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            wins: 0,
            draws: 0,
            losses: 0,
        }
    }

    fn record(&mut self, result: SeatResult) {
        match result {
            SeatResult::Won => self.wins += 1,
            SeatResult::Drew => self.draws += 1,
            SeatResult::Lost => self.losses += 1,
        }
    }

    fn into_report(self, z: f64) -> AgentReport {
        let hands = self.wins + self.draws + self.losses;
        let win_rate = if hands == 0 {
            0.0
        } else {
            self.wins as f64 / hands as f64
        };
        AgentReport {
            ci95: proportion_interval(win_rate, hands, z),
            name: self.name,
            kind: self.kind,
            hands,
            wins: self.wins,
            draws: self.draws,
            losses: self.losses,
            win_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub hands: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
}

/// What one agent learned over the run.
#[derive(Debug, Clone, Serialize)]
pub struct LearnedTables {
    pub agent: String,
    pub transitions: Option<NormalizedWeights>,
    pub outcomes: Vec<(Vec<u8>, f64)>,
}

impl LearnedTables {
    fn capture(agent: &Agent, game: GameKind) -> Self {
        let transitions = game
            .jack_rules()
            .map(|_| agent.transitions().snapshot());
        let mut outcomes: Vec<(Vec<u8>, f64)> = agent
            .outcomes()
            .weights()
            .map(|(key, weight)| (key.values().to_vec(), weight))
            .collect();
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            agent: agent.name().to_string(),
            transitions,
            outcomes,
        }
    }
}

pub struct AnalyticsSummary {
    pub run_id: String,
    pub game: GameKind,
    pub agents: Vec<AgentReport>,
    pub tables: Vec<LearnedTables>,
}

impl AnalyticsSummary {
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Run Summary: {}\n", self.run_id);
        let _ = writeln!(out, "Game: {}\n", self.game.as_str());
        out.push_str("| Agent | Kind | Hands | Wins | Draws | Losses | Win % | 95% CI |\n");
        out.push_str("|-------|------|-------|------|-------|--------|-------|--------|\n");
        for agent in &self.agents {
            let _ = writeln!(
                out,
                "| {name} | {kind:?} | {hands} | {wins} | {draws} | {losses} | {win:.1}% | [{low:.3}, {high:.3}] |",
                name = agent.name,
                kind = agent.kind,
                hands = agent.hands,
                wins = agent.wins,
                draws = agent.draws,
                losses = agent.losses,
                win = agent.win_rate * 100.0,
                low = agent.ci95.0,
                high = agent.ci95.1,
            );
        }

        for table in &self.tables {
            if let Some(weights) = table.transitions.as_ref() {
                let _ = writeln!(out, "\n## Transitions learned by {}\n", table.agent);
                render_transitions(&mut out, weights);
            }
            if !table.outcomes.is_empty() {
                let _ = writeln!(out, "\n## Hand weights learned by {}\n", table.agent);
                out.push_str("| Hand | Weight |\n|------|--------|\n");
                for (values, weight) in &table.outcomes {
                    let hand = values
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    let _ = writeln!(out, "| ({hand}) | {weight:.4} |");
                }
            }
        }
        let _ = writeln!(
            out,
            "\n_{} {}: {}_",
            AppInfo::name(),
            AppInfo::version(),
            AppInfo::tagline()
        );
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

fn state_label(weights: &NormalizedWeights, value: u8) -> String {
    match value {
        0 => "START".to_string(),
        v if v == weights.bust_threshold => "BUST".to_string(),
        v => v.to_string(),
    }
}

fn render_transitions(out: &mut String, weights: &NormalizedWeights) {
    let labels: Vec<String> = weights
        .rows
        .iter()
        .map(|row| state_label(weights, row.state.value()))
        .chain(["Loss".to_string(), "Win".to_string()])
        .collect();

    out.push_str("| State | Samples |");
    for label in &labels {
        let _ = write!(out, " {label} |");
    }
    out.push_str("\n|-------|---------|");
    for _ in &labels {
        out.push_str("---|");
    }
    out.push('\n');

    for row in &weights.rows {
        let _ = write!(
            out,
            "| {} | {} |",
            state_label(weights, row.state.value()),
            row.samples
        );
        render_cells(out, row);
        out.push('\n');
    }
}

/// Normalised rows print `decimal (exact)`; rows never normalised print
/// their raw counts.
fn render_cells(out: &mut String, row: &WeightsRow) {
    match row.probabilities.as_ref() {
        Some(probabilities) => {
            for p in probabilities {
                if p.numer() == 0 {
                    out.push_str(" 0 |");
                } else {
                    let _ = write!(out, " {:.3} ({p}) |", p.to_f64());
                }
            }
        }
        None => {
            for count in &row.counts {
                let _ = write!(out, " #{count} |");
            }
        }
    }
}

fn confidence_z() -> f64 {
    Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0))
        .unwrap_or(CONFIDENCE_Z)
}

/// Normal-approximation interval for a proportion, clipped to `[0, 1]`.
fn proportion_interval(rate: f64, samples: usize, z: f64) -> (f64, f64) {
    if samples == 0 {
        return (0.0, 0.0);
    }
    let std_error = (rate * (1.0 - rate) / samples as f64).sqrt();
    let margin = z * std_error;
    ((rate - margin).max(0.0), (rate + margin).min(1.0))
}
