use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};

use parlor_bench::config::{BenchmarkConfig, ModeConfig, ResolvedOutputs};
use parlor_bench::logging::init_logging;
use parlor_bench::policy_table::policy_table;
use parlor_bench::roster::build_evaluator;
use parlor_bench::trials::TrialRunner;
use parlor_core::eval::{OpponentPolicy, SoftTieRule};
use parlor_core::game::JackRules;

/// Trial harness for the parlor card-table learners.
#[derive(Debug, Parser)]
#[command(
    name = "parlor",
    author,
    version,
    about = "Deterministic trial runs for card-table learners"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a configured run and write JSONL rows plus a markdown summary.
    Run(RunArgs),
    /// Print the matrix evaluator's blackjack decisions.
    PolicyTable(TableArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of trial hands.
    #[arg(long, value_name = "TRIALS")]
    trials: Option<usize>,

    /// Override the RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (nothing is played).
    #[arg(long)]
    validate_only: bool,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Registered opponent policy the matrix describes.
    #[arg(long, value_name = "NAME", default_value = "draw_below_seventeen")]
    policy: String,

    /// JSON stationary matrix; derived from the full deck when omitted.
    #[arg(long, value_name = "FILE")]
    matrix: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = TieArg::Adjacent)]
    soft_tie: TieArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TieArg {
    Adjacent,
    Exact,
}

impl From<TieArg> for SoftTieRule {
    fn from(arg: TieArg) -> Self {
        match arg {
            TieArg::Adjacent => SoftTieRule::Adjacent,
            TieArg::Exact => SoftTieRule::Exact,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::PolicyTable(args) => print_policy_table(args),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = BenchmarkConfig::from_path(&args.config)?;

    if let Some(run_id) = args.run_id {
        config.run_id = run_id;
    }

    if let Some(trials) = args.trials {
        config.trials = trials;
    }

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let game = config.game.as_str();
    let plan = match &config.mode {
        ModeConfig::Trials => format!("{} trials", config.trials),
        ModeConfig::Sampling {
            samples_per_state,
            rigged,
        } => format!("{samples_per_state} samples per state rigged for '{rigged}'"),
    };

    println!("Loaded configuration '{run_id}' for {game} ({plan})");

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let mut runner = TrialRunner::new(config, outputs)?;

    if args.validate_only {
        println!("Validation-only mode: nothing was played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} hands → {} rows at {}",
        summary.hands_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if !summary.states_skipped.is_empty() {
        println!("Skipped unreachable states: {:?}", summary.states_skipped);
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}

fn print_policy_table(args: TableArgs) -> anyhow::Result<()> {
    let policy = OpponentPolicy::named(&args.policy)
        .ok_or_else(|| anyhow!("unknown opponent policy '{}'", args.policy))?;
    let evaluator = build_evaluator(
        "policy-table",
        policy,
        args.matrix.as_deref(),
        &JackRules::blackjack(),
        args.soft_tie.into(),
    )?;
    let rows = policy_table(&evaluator).context("evaluating the policy table")?;
    for row in rows {
        println!("{row}");
    }
    Ok(())
}
