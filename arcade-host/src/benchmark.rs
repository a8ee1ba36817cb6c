use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::autopilot::{run_bot, RunMetrics};
use crate::util::seed_to_hex;

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub max_frames: u32,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunRecord {
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_phase: u32,
    pub game_over: bool,
    pub enemies_destroyed: u32,
    pub bosses_defeated: u32,
}

impl From<&RunMetrics> for RunRecord {
    fn from(metrics: &RunMetrics) -> Self {
        Self {
            bot_id: metrics.bot_id.clone(),
            seed: metrics.seed,
            seed_hex: seed_to_hex(metrics.seed),
            frame_count: metrics.frame_count,
            final_score: metrics.final_score,
            final_phase: metrics.final_phase,
            game_over: metrics.game_over,
            enemies_destroyed: metrics.enemies_destroyed,
            bosses_defeated: metrics.bosses_defeated,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BotAggregate {
    pub bot_id: String,
    pub runs: usize,
    pub avg_score: f64,
    pub max_score: u32,
    pub avg_frames: f64,
    pub max_phase: u32,
    pub survived: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkSummary {
    pub max_frames: u32,
    pub seeds: Vec<String>,
    /// Best average score first.
    pub rankings: Vec<BotAggregate>,
    pub runs: Vec<RunRecord>,
}

pub fn run_benchmark(config: &BenchmarkConfig) -> Result<BenchmarkSummary> {
    if config.bots.is_empty() {
        return Err(anyhow!("benchmark needs at least one bot"));
    }
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark needs at least one seed"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }

    let run_jobs: Vec<(String, u32)> = config
        .bots
        .iter()
        .flat_map(|bot| config.seeds.iter().map(move |seed| (bot.clone(), *seed)))
        .collect();

    let run_one = |(bot_id, seed): &(String, u32)| -> Result<RunMetrics> {
        run_bot(bot_id, *seed, config.max_frames)
            .map(|artifact| artifact.metrics)
            .with_context(|| format!("benchmark run failed for bot={bot_id} seed={seed:#x}"))
    };

    let run_results: Vec<Result<RunMetrics>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };
    let runs = run_results.into_iter().collect::<Result<Vec<_>>>()?;

    let mut grouped: BTreeMap<&str, Vec<&RunMetrics>> = BTreeMap::new();
    for run in &runs {
        grouped.entry(run.bot_id.as_str()).or_default().push(run);
    }

    let mut rankings: Vec<BotAggregate> = grouped
        .into_iter()
        .map(|(bot_id, bot_runs)| {
            let count = bot_runs.len();
            let sum_score: u64 = bot_runs.iter().map(|r| u64::from(r.final_score)).sum();
            let sum_frames: u64 = bot_runs.iter().map(|r| u64::from(r.frame_count)).sum();
            BotAggregate {
                bot_id: bot_id.to_string(),
                runs: count,
                avg_score: sum_score as f64 / count as f64,
                max_score: bot_runs.iter().map(|r| r.final_score).max().unwrap_or_default(),
                avg_frames: sum_frames as f64 / count as f64,
                max_phase: bot_runs.iter().map(|r| r.final_phase).max().unwrap_or_default(),
                survived: bot_runs.iter().filter(|r| !r.game_over).count(),
            }
        })
        .collect();
    rankings.sort_by(|a, b| {
        b.avg_score
            .total_cmp(&a.avg_score)
            .then_with(|| a.bot_id.cmp(&b.bot_id))
    });

    Ok(BenchmarkSummary {
        max_frames: config.max_frames,
        seeds: config.seeds.iter().copied().map(seed_to_hex).collect(),
        rankings,
        runs: runs.iter().map(RunRecord::from).collect(),
    })
}
