use parlor_bot::GameFamily;
use parlor_core::eval::SoftTieRule;
use parlor_core::game::{JackRules, JackVariant, PokerRules, PokerVariant};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_LEARNING_RATE: f64 = 0.1;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root run configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub game: GameKind,
    pub trials: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub mode: ModeConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(invalid(
                "learning_rate",
                format!("{} is outside [0, 1]", self.learning_rate),
            ));
        }
        self.mode.validate(self.game, self.trials, &self.agents)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_agents(&mut self.agents, self.game)?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Whitejack,
    Greyjack,
    Blackjack,
    StudPoker,
    DrawOnePoker,
}

impl GameKind {
    pub fn family(self) -> GameFamily {
        match self {
            GameKind::Whitejack | GameKind::Greyjack | GameKind::Blackjack => GameFamily::Jack,
            GameKind::StudPoker | GameKind::DrawOnePoker => GameFamily::Poker,
        }
    }

    /// Round rules for the jack family; `None` for poker.
    pub fn jack_rules(self) -> Option<JackRules> {
        let variant = match self {
            GameKind::Whitejack => JackVariant::Whitejack,
            GameKind::Greyjack => JackVariant::Greyjack,
            GameKind::Blackjack => JackVariant::Blackjack,
            GameKind::StudPoker | GameKind::DrawOnePoker => return None,
        };
        Some(JackRules::for_variant(variant))
    }

    pub fn poker_rules(self) -> Option<PokerRules> {
        match self {
            GameKind::StudPoker => Some(PokerRules::for_variant(PokerVariant::Stud)),
            GameKind::DrawOnePoker => Some(PokerRules::for_variant(PokerVariant::DrawOne)),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Whitejack => "whitejack",
            GameKind::Greyjack => "greyjack",
            GameKind::Blackjack => "blackjack",
            GameKind::StudPoker => "stud_poker",
            GameKind::DrawOnePoker => "draw_one_poker",
        }
    }
}

/// How hands are generated.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModeConfig {
    /// `trials` self-play hands, seat order swapping after each.
    #[default]
    Trials,
    /// Rigged starts: `samples_per_state` hands from every playable total.
    Sampling {
        samples_per_state: usize,
        rigged: String,
    },
}

impl ModeConfig {
    fn validate(
        &self,
        game: GameKind,
        trials: usize,
        agents: &[AgentConfig],
    ) -> Result<(), ValidationError> {
        match self {
            ModeConfig::Trials => {
                if trials == 0 {
                    return Err(invalid("trials", "number of trials must be greater than zero"));
                }
            }
            ModeConfig::Sampling {
                samples_per_state,
                rigged,
            } => {
                if game.family() != GameFamily::Jack {
                    return Err(invalid(
                        "mode.kind",
                        format!("sampling needs a jack game, not {}", game.as_str()),
                    ));
                }
                if *samples_per_state == 0 {
                    return Err(invalid(
                        "mode.samples_per_state",
                        "samples per state must be greater than zero",
                    ));
                }
                if !agents.iter().any(|agent| &agent.name == rigged) {
                    return Err(invalid(
                        "mode.rigged",
                        format!("rigged agent '{rigged}' is not defined in agents list"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Definition of a seat occupant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Random,
    LowestOddDiscard,
    PairPreserving,
    FixedThreshold,
    LearnedThreshold,
    LearnedHand,
    MatrixEvaluator,
}

impl AgentKind {
    pub fn family(self) -> Option<GameFamily> {
        match self {
            AgentKind::Random => None,
            AgentKind::LowestOddDiscard | AgentKind::PairPreserving | AgentKind::LearnedHand => {
                Some(GameFamily::Poker)
            }
            AgentKind::FixedThreshold
            | AgentKind::LearnedThreshold
            | AgentKind::MatrixEvaluator => Some(GameFamily::Jack),
        }
    }
}

/// Optional knobs an agent's `params` mapping may carry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgentParams {
    /// Stand threshold for `fixed_threshold`.
    #[serde(default)]
    pub threshold: Option<u8>,
    /// Registered opponent policy name, e.g. `draw_below_seventeen`.
    #[serde(default)]
    pub policy: Option<String>,
    /// JSON stationary matrix for `matrix_evaluator`; derived when absent.
    #[serde(default)]
    pub matrix: Option<PathBuf>,
    #[serde(default)]
    pub soft_tie: Option<SoftTieRule>,
}

impl AgentConfig {
    pub fn params(&self) -> Result<AgentParams, ValidationError> {
        if self.params.is_null() {
            return Ok(AgentParams::default());
        }
        serde_yaml::from_value(self.params.clone()).map_err(|err| {
            invalid(format!("agents[{}].params", self.name), err.to_string())
        })
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(label, "path must not be empty"));
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(invalid("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig], game: GameKind) -> Result<(), ValidationError> {
    if agents.len() != 2 {
        return Err(invalid(
            "agents",
            format!("exactly two agents are required, found {}", agents.len()),
        ));
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        if agent.name.trim().is_empty() {
            return Err(invalid("agents.name", "agent name must not be empty"));
        }

        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(invalid(
                format!("agents[{}].name", agent.name),
                "agent name contains invalid characters",
            ));
        }

        if !seen.insert(agent.name.clone()) {
            return Err(invalid(
                "agents",
                format!("agent name '{}' defined more than once", agent.name),
            ));
        }

        if let Some(family) = agent.kind.family()
            && family != game.family()
        {
            return Err(invalid(
                format!("agents[{}].kind", agent.name),
                format!("{:?} agents cannot play {}", agent.kind, game.as_str()),
            ));
        }

        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }
        agent.params()?;
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
