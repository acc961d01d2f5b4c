use std::fs;
use std::path::Path;

use parlor_bench::config::BenchmarkConfig;
use parlor_bench::trials::{RunSummary, TrialRunner};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path, body: &str) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
seed: 4242
{body}
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("hands.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

const WHITEJACK: &str = r#"
game: "whitejack"
trials: 40
agents:
  - name: "learner"
    kind: "learned_threshold"
  - name: "dealer"
    kind: "fixed_threshold"
"#;

fn run(dir: &Path, body: &str) -> (RunSummary, TrialRunner) {
    let config = load_config(dir, body);
    let outputs = config.resolved_outputs();
    let mut runner = TrialRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("run completes");
    (summary, runner)
}

fn digest(path: &Path) -> String {
    let jsonl = fs::read_to_string(path).expect("jsonl readable");
    let mut hasher = Sha256::new();
    hasher.update(jsonl.as_bytes());
    hex::encode(hasher.finalize())
}

#[test]
fn same_seed_runs_produce_identical_jsonl() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");
    let (first, _) = run(first_dir.path(), WHITEJACK);
    let (second, _) = run(second_dir.path(), WHITEJACK);

    assert_eq!(first.hands_played, 40);
    assert_eq!(first.rows_written, 40);
    assert_eq!(digest(&first.jsonl_path), digest(&second.jsonl_path));
}

#[test]
fn rerunning_starts_from_empty_learners() {
    let dir = tempdir().expect("temp dir");
    let (first, mut runner) = run(dir.path(), WHITEJACK);
    let learned = runner.agents()[0].transitions().snapshot();
    let first_digest = digest(&first.jsonl_path);

    let second = runner.run().expect("second run completes");
    assert_eq!(runner.agents()[0].transitions().snapshot(), learned);
    assert_eq!(digest(&second.jsonl_path), first_digest);
}

#[test]
fn rows_decode_and_seats_alternate() {
    let dir = tempdir().expect("temp dir");
    let (summary, _) = run(dir.path(), WHITEJACK);

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    let rows: Vec<serde_json::Value> = jsonl
        .lines()
        .map(|line| serde_json::from_str(line).expect("row decodes to JSON"))
        .collect();
    assert_eq!(rows.len(), 40);
    assert_eq!(rows[0]["seats"][0]["agent"], "learner");
    assert_eq!(rows[1]["seats"][0]["agent"], "dealer");
    for row in &rows {
        let results: Vec<&str> = row["seats"]
            .as_array()
            .expect("seats")
            .iter()
            .map(|seat| seat["result"].as_str().expect("result"))
            .collect();
        assert!(matches!(
            results.as_slice(),
            ["won", "lost"] | ["lost", "won"] | ["drew", "drew"]
        ));
    }
}

#[test]
fn learners_keep_stochastic_rows() {
    let dir = tempdir().expect("temp dir");
    let (summary, runner) = run(dir.path(), WHITEJACK);

    for agent in runner.agents() {
        let snapshot = agent.transitions().snapshot();
        for row in snapshot.rows.iter().filter(|row| row.samples > 0) {
            let probabilities = row.probabilities.as_ref().expect("normalized");
            let total = parlor_core::learn::Fraction::sum(probabilities.iter().copied())
                .expect("no overflow");
            assert_eq!(total, parlor_core::learn::Fraction::ONE);
        }
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("| learner | LearnedThreshold | 40 |"));
    assert!(markdown.contains("## Transitions learned by dealer"));
}

#[test]
fn sampling_skips_unreachable_blackjack_one() {
    let dir = tempdir().expect("temp dir");
    let body = r#"
game: "blackjack"
trials: 1
mode:
  kind: "sampling"
  samples_per_state: 3
  rigged: "learner"
agents:
  - name: "learner"
    kind: "learned_threshold"
  - name: "dealer"
    kind: "fixed_threshold"
"#;
    let (summary, runner) = run(dir.path(), body);

    assert_eq!(summary.states_skipped, vec![1]);
    assert_eq!(summary.hands_played, 20 * 3);

    let learner = runner.agents()[0].transitions();
    let space = learner.space();
    for value in 2..22 {
        let state = space.state(value).expect("state");
        assert!(learner.is_normalized(state).expect("valid"), "state {value}");
    }
    assert!(learner.is_normalized(space.start()).expect("valid"));
}

#[test]
fn sampling_normalizes_both_learners() {
    let dir = tempdir().expect("temp dir");
    let body = r#"
game: "whitejack"
trials: 1
mode:
  kind: "sampling"
  samples_per_state: 50
  rigged: "a"
agents:
  - name: "a"
    kind: "learned_threshold"
  - name: "b"
    kind: "learned_threshold"
"#;
    let (summary, runner) = run(dir.path(), body);
    assert!(summary.states_skipped.is_empty());

    for agent in runner.agents() {
        let learner = agent.transitions();
        assert!(learner.is_normalized(learner.space().start()).expect("valid"));
        for row in &learner.snapshot().rows {
            if row.samples > 0 {
                assert!(
                    row.probabilities.is_some(),
                    "{} left state {} raw with {} samples",
                    agent.name(),
                    row.state.value(),
                    row.samples
                );
            }
        }
    }
}

#[test]
fn poker_runs_feed_hand_weights() {
    let dir = tempdir().expect("temp dir");
    let body = r#"
game: "draw_one_poker"
trials: 30
agents:
  - name: "hand"
    kind: "learned_hand"
  - name: "pairs"
    kind: "pair_preserving"
"#;
    let (summary, runner) = run(dir.path(), body);

    assert_eq!(summary.hands_played, 30);
    assert!(!runner.agents()[0].outcomes().is_empty());
    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("## Hand weights learned by hand"));
    assert!(!markdown.contains("## Transitions learned by"));
}
