use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use labyrinth_engine::constants::{PICKUP_SCORE, TICK_MS};
use labyrinth_engine::engine::{RoundConfig, RoundEngine};
use labyrinth_engine::pathfind::shortest_first_step;
use labyrinth_engine::types::{
    AdversaryPhase, Direction, RoundState, RuntimeEvent, Snapshot, TileCoord,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    policy: Option<String>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Policy {
    Greedy,
    Idle,
}

impl Policy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "greedy" => Some(Self::Greedy),
            "idle" => Some(Self::Idle),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    policy: Policy,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    policy: Policy,
    outcome: RoundState,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    score: i32,
    #[serde(rename = "pickupsCollected")]
    pickups_collected: usize,
    #[serde(rename = "pickupsRemaining")]
    pickups_remaining: usize,
    #[serde(rename = "wanderersSurviving")]
    wanderers_surviving: usize,
    #[serde(rename = "adversaryDefeated")]
    adversary_defeated: bool,
    #[serde(rename = "fleeTick", skip_serializing_if = "Option::is_none")]
    flee_tick: Option<u64>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageTicks")]
    average_ticks: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli)?;
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_ticks = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "policy": scenario.policy,
                "maxTicks": scenario.max_ticks,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_ticks += scenario_run.result.ticks;
        *outcome_counts
            .entry(outcome_key(scenario_run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.result.ticks),
            json!({
                "outcome": scenario_run.result.outcome,
                "score": scenario_run.result.score,
                "pickupsRemaining": scenario_run.result.pickups_remaining,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        outcome_counts,
        total_anomalies,
        total_ticks,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageTicks": summary.average_ticks,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
    Ok(())
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut engine = RoundEngine::new(RoundConfig::with_seed(scenario.seed))
        .expect("bundled layout should be valid");

    let mut flee_tick = None;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut previous_pickups = engine.pickups_remaining();

    while engine.round_state() == RoundState::Active && engine.tick() < scenario.max_ticks {
        if scenario.policy == Policy::Greedy {
            let dir = greedy_direction(&engine);
            engine.set_player_direction(dir);
        }
        engine.step();

        let snapshot = engine.snapshot(true);
        if snapshot.events.contains(&RuntimeEvent::FleeStarted) {
            flee_tick.get_or_insert(snapshot.tick);
        }
        for message in collect_snapshot_anomalies(&snapshot, previous_pickups) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        previous_pickups = snapshot.pickups.len();
    }

    let summary = engine.summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            policy: scenario.policy,
            outcome: summary.outcome,
            ticks: summary.ticks,
            duration_ms: summary.ticks * TICK_MS,
            score: summary.score,
            pickups_collected: summary.pickups_collected,
            pickups_remaining: summary.pickups_remaining,
            wanderers_surviving: summary.wanderers_surviving,
            adversary_defeated: summary.adversary_defeated,
            flee_tick,
            anomalies,
        },
        anomaly_records,
    }
}

/// Always head for the nearest open objective: remaining pickups first, then
/// the fleeing adversary, then an open gate.
fn greedy_direction(engine: &RoundEngine) -> Direction {
    let gates_open = engine.gates_open();
    let map = engine.map();
    let goals: Vec<TileCoord> = if engine.pickups_remaining() > 0 {
        engine.remaining_pickup_tiles()
    } else if engine.adversary_phase() == AdversaryPhase::Fleeing {
        vec![engine.adversary_tile()]
    } else if gates_open {
        map.gate_tiles().to_vec()
    } else {
        Vec::new()
    };
    shortest_first_step(engine.player_tile(), &goals, |x, y| {
        map.is_passable(x, y, gates_open)
    })
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, previous_pickups: usize) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !snapshot.player.x.is_finite() || !snapshot.player.y.is_finite() {
        anomalies.push(format!(
            "player position is not finite: ({}, {})",
            snapshot.player.x, snapshot.player.y
        ));
    }
    if !snapshot.adversary.x.is_finite() || !snapshot.adversary.y.is_finite() {
        anomalies.push(format!(
            "adversary position is not finite: ({}, {})",
            snapshot.adversary.x, snapshot.adversary.y
        ));
    }
    for wanderer in &snapshot.wanderers {
        if !wanderer.x.is_finite() || !wanderer.y.is_finite() {
            anomalies.push(format!("wanderer {} position is not finite", wanderer.id));
        }
    }

    if snapshot.score < 0 || snapshot.score % PICKUP_SCORE != 0 {
        anomalies.push(format!("score is not a pickup multiple: {}", snapshot.score));
    }
    if snapshot.pickups.len() > previous_pickups {
        anomalies.push(format!(
            "pickup count increased: {} -> {}",
            previous_pickups,
            snapshot.pickups.len()
        ));
    }
    if snapshot.adversary.phase == AdversaryPhase::Defeated && !snapshot.gates_open {
        anomalies.push("adversary defeated but gates remain closed".to_string());
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> anyhow::Result<Vec<Scenario>> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));
    let policy = match cli.policy.as_deref() {
        Some(value) => match Policy::parse(value) {
            Some(policy) => policy,
            None => bail!("unknown policy: {value}"),
        },
        None => Policy::Greedy,
    };

    if cli.single || cli.policy.is_some() || cli.ticks.is_some() {
        let max_ticks = cli.ticks.unwrap_or(20_000).clamp(1, 1_000_000);
        return Ok(vec![Scenario {
            name: format!("custom-{}", policy_key(policy)),
            seed,
            policy,
            max_ticks,
        }]);
    }

    Ok(vec![
        Scenario {
            name: "greedy-full-clear".to_string(),
            seed,
            policy: Policy::Greedy,
            max_ticks: 20_000,
        },
        Scenario {
            name: "idle-baseline".to_string(),
            seed: normalize_seed(seed as u64 + 1),
            policy: Policy::Idle,
            max_ticks: 3_600,
        },
    ])
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_ticks: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_ticks = if scenario_count == 0 {
        0
    } else {
        total_ticks / scenario_count as u64
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_ticks,
        outcome_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn outcome_key(outcome: RoundState) -> String {
    match outcome {
        RoundState::Active => "active",
        RoundState::PlayerDefeated => "player_defeated",
        RoundState::PlayerEscaped => "player_escaped",
    }
    .to_string()
}

fn policy_key(policy: Policy) -> &'static str {
    match policy {
        Policy::Greedy => "greedy",
        Policy::Idle => "idle",
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
