mod order;
mod sampling;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parlor_bot::{Agent, PolicyError};
use parlor_core::game::{JackRound, JackRules, PokerRound, PokerRules, RoundError};
use parlor_core::learn::LearnError;
use parlor_core::model::action::Decision;
use parlor_core::model::hand::Hand;
use parlor_core::model::player::{Seat, SeatResult};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, GameKind, ModeConfig, ResolvedOutputs};
use crate::roster::{AgentError, policy_kind};

pub use order::SeatOrder;
pub use sampling::compose_start;

/// Plays the configured hands and feeds every agent's learners.
pub struct TrialRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<Agent>,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub hands_played: usize,
    pub states_skipped: Vec<u8>,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

/// What one finished hand looked like from both seats.
struct HandRecord {
    order: SeatOrder,
    rigged: Option<u8>,
    hands: [Hand; 2],
    totals: [String; 2],
    results: [SeatResult; 2],
    decisions: [u32; 2],
}

impl TrialRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.agents.len() != 2 {
            return Err(RunnerError::SeatCount {
                found: config.agents.len(),
            });
        }

        let space = config
            .game
            .jack_rules()
            .map(|rules| rules.state_space())
            .unwrap_or(JackRules::whitejack().state_space());
        let mut seeds = StdRng::seed_from_u64(config.seed.unwrap_or(0));
        let agents = config
            .agents
            .iter()
            .map(|agent| {
                let kind = policy_kind(agent, config.game)?;
                Ok(Agent::new(
                    agent.name.clone(),
                    kind,
                    space,
                    config.learning_rate,
                    seeds.next_u64(),
                )?)
            })
            .collect::<Result<Vec<_>, RunnerError>>()?;

        Ok(Self {
            config,
            outputs,
            agents,
        })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Execute the run, streaming JSONL rows to disk. Learners start empty
    /// on every call.
    pub fn run(&mut self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        for agent in &mut self.agents {
            agent.reset();
        }
        let mut rng = StdRng::seed_from_u64(self.config.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut hands_played = 0usize;
        let mut states_skipped = Vec::new();

        match self.config.mode.clone() {
            ModeConfig::Trials => {
                for hand_index in 0..self.config.trials {
                    let hand_seed = rng.next_u64();
                    let order = SeatOrder::for_hand(hand_index);
                    let record = self.play(hand_seed, order, None)?;
                    for agent in &mut self.agents {
                        agent.normalize()?;
                    }
                    self.log_hand(&mut writer, &mut analytics, hand_index, hand_seed, &record)?;
                    hands_played += 1;
                }
            }
            ModeConfig::Sampling {
                samples_per_state,
                rigged,
            } => {
                let rules = self.jack_rules()?;
                let rigged_index = self
                    .agents
                    .iter()
                    .position(|agent| agent.name() == rigged)
                    .ok_or_else(|| RunnerError::UnknownAgent(rigged.clone()))?;
                let space = rules.state_space();

                for state in space.playable() {
                    let Some(start) = compose_start(rules.deck(), rules.bust(), state.value())
                    else {
                        event!(
                            target: "parlor_bench::sampling",
                            Level::WARN,
                            state = state.value(),
                            game = self.config.game.as_str(),
                            "no starting hand reaches this total; state skipped"
                        );
                        states_skipped.push(state.value());
                        continue;
                    };

                    for sample in 0..samples_per_state {
                        let hand_seed = rng.next_u64();
                        let seat = if sample % 2 == 0 {
                            Seat::First
                        } else {
                            Seat::Second
                        };
                        let order = SeatOrder::placing(rigged_index, seat);
                        let record = self.play(hand_seed, order, Some((seat, start.clone())))?;
                        self.log_hand(
                            &mut writer,
                            &mut analytics,
                            hands_played,
                            hand_seed,
                            &record,
                        )?;
                        hands_played += 1;
                    }
                    for agent in &mut self.agents {
                        agent.transitions_mut().normalize(Some(state))?;
                    }
                }

                for agent in &mut self.agents {
                    let learner = agent.transitions_mut();
                    learner.normalize(Some(space.start()))?;
                    learner.normalize(Some(space.bust()))?;
                }
            }
        }

        writer.flush()?;

        let summary = analytics.finalize(&self.agents);
        summary.write_markdown(&self.outputs.summary_md)?;

        event!(
            target: "parlor_bench::run",
            Level::INFO,
            run_id = %self.config.run_id,
            game = self.config.game.as_str(),
            hands = hands_played,
            skipped = states_skipped.len(),
        );

        Ok(RunSummary {
            hands_played,
            states_skipped,
            rows_written: hands_played,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn jack_rules(&self) -> Result<JackRules, RunnerError> {
        self.config
            .game
            .jack_rules()
            .ok_or(RunnerError::NotJack(self.config.game.as_str()))
    }

    fn play(
        &mut self,
        seed: u64,
        order: SeatOrder,
        rigged: Option<(Seat, Hand)>,
    ) -> Result<HandRecord, RunnerError> {
        match self.config.game {
            GameKind::Whitejack | GameKind::Greyjack | GameKind::Blackjack => {
                let rules = self.jack_rules()?;
                self.play_jack(rules, seed, order, rigged)
            }
            GameKind::StudPoker | GameKind::DrawOnePoker => {
                let rules = self
                    .config
                    .game
                    .poker_rules()
                    .ok_or(RunnerError::NotPoker(self.config.game.as_str()))?;
                self.play_poker(rules, seed, order)
            }
        }
    }

    fn play_jack(
        &mut self,
        rules: JackRules,
        seed: u64,
        order: SeatOrder,
        rigged: Option<(Seat, Hand)>,
    ) -> Result<HandRecord, RunnerError> {
        let rigged_total = rigged
            .as_ref()
            .map(|(_, hand)| hand.jack_total(rules.bust()).floor());
        let mut rigs = [None, None];
        if let Some((seat, hand)) = rigged {
            rigs[seat.index()] = Some(hand);
        }
        let mut round = JackRound::deal(rules, seed, rigs)?;

        for seat in Seat::BOTH {
            self.agents[order.agent(seat)].record_deal(round.total(seat))?;
        }

        let mut decisions = [0u32; 2];
        while let Some(seat) = round.to_act() {
            let agent = &mut self.agents[order.agent(seat)];
            let decision = agent.decide_jack(&round, seat)?;
            let step = round.apply(seat, decision)?;
            decisions[seat.index()] += 1;
            if step.decision == Decision::Draw {
                agent.record_transition(step.from, step.to)?;
            }
            event!(
                target: "parlor_bench::jack",
                Level::TRACE,
                agent = agent.name(),
                seat = %seat,
                decision = step.decision.as_str(),
                from = %step.from,
                to = %step.to,
                status = ?step.status,
            );
        }

        let showdown = round.outcome()?;
        let results = SeatResult::pair(showdown.winner);
        for seat in Seat::BOTH {
            self.agents[order.agent(seat)]
                .record_jack_result(round.total(seat), results[seat.index()].is_win())?;
        }

        Ok(HandRecord {
            order,
            rigged: rigged_total,
            hands: [round.hand(Seat::First).clone(), round.hand(Seat::Second).clone()],
            totals: showdown.totals.map(|total| total.to_string()),
            results,
            decisions,
        })
    }

    fn play_poker(
        &mut self,
        rules: PokerRules,
        seed: u64,
        order: SeatOrder,
    ) -> Result<HandRecord, RunnerError> {
        let mut round = PokerRound::deal(rules, seed)?;
        let mut decisions = [0u32; 2];
        while let Some(seat) = round.to_act() {
            let agent = &mut self.agents[order.agent(seat)];
            let chosen = agent.choose_poker(&round, seat)?;
            let exchange = round.apply(seat, chosen)?;
            decisions[seat.index()] += 1;
            event!(
                target: "parlor_bench::poker",
                Level::TRACE,
                agent = agent.name(),
                seat = %seat,
                chosen = %chosen,
                discarded = ?exchange.discarded,
                drawn = ?exchange.drawn,
            );
        }

        let showdown = round.showdown()?;
        let results = SeatResult::pair(showdown.winner);
        for seat in Seat::BOTH {
            self.agents[order.agent(seat)]
                .record_poker_result(round.hand(seat), results[seat.index()].is_win());
        }

        Ok(HandRecord {
            order,
            rigged: None,
            hands: [round.hand(Seat::First).clone(), round.hand(Seat::Second).clone()],
            totals: showdown.ranks.map(|rank| rank.to_string()),
            results,
            decisions,
        })
    }

    fn log_hand(
        &self,
        writer: &mut BufWriter<File>,
        analytics: &mut AnalyticsCollector,
        hand_index: usize,
        hand_seed: u64,
        record: &HandRecord,
    ) -> Result<(), RunnerError> {
        let seats = Seat::BOTH.map(|seat| {
            let agent = &self.agents[record.order.agent(seat)];
            SeatRow {
                seat: seat.to_string(),
                agent: agent.name().to_string(),
                cards: record.hands[seat.index()]
                    .iter()
                    .map(|card| card.to_string())
                    .collect(),
                total: record.totals[seat.index()].clone(),
                result: record.results[seat.index()],
                decisions: record.decisions[seat.index()],
            }
        });

        for row in &seats {
            analytics.record(&row.agent, row.result)?;
        }

        let row = HandLogRow {
            run_id: &self.config.run_id,
            game: self.config.game.as_str(),
            hand_id: format!("H{hand_index:05}_O{}", record.order.index()),
            hand_index,
            hand_seed,
            rigged_total: record.rigged,
            seats,
        };
        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct SeatRow {
    seat: String,
    agent: String,
    cards: Vec<String>,
    total: String,
    result: SeatResult,
    decisions: u32,
}

#[derive(Serialize)]
struct HandLogRow<'a> {
    run_id: &'a str,
    game: &'static str,
    hand_id: String,
    hand_index: usize,
    hand_seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    rigged_total: Option<u8>,
    seats: [SeatRow; 2],
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("round failed: {0}")]
    Round(#[from] RoundError),
    #[error("policy failed: {0}")]
    Policy(#[from] PolicyError),
    #[error("learner rejected an update: {0}")]
    Learn(#[from] LearnError),
    #[error("configuration requires exactly 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("rigged agent '{0}' is not seated")]
    UnknownAgent(String),
    #[error("{0} is not a jack game")]
    NotJack(&'static str),
    #[error("{0} is not a poker game")]
    NotPoker(&'static str),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
