//! Batch match simulation with rayon parallelism.
//!
//! Runs N complete matches in parallel on a dedicated rayon ThreadPool.
//! Each match gets its own seed from the session seed and its index, so a
//! batch is reproducible regardless of thread count.

use anyhow::Context;
use hkmj_engine::GameOutcome;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game_loop::{ActionSelector, FirstActionSelector, GameRunner, MatchConfig, RandomSelector};
use crate::seeding::{match_seed, seed_from_u64};

/// Which built-in policy drives every seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Policy {
    #[default]
    First,
    Random,
}

/// Configuration for a batch simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to simulate.
    pub num_games: usize,
    /// Session seed. Match `i` plays with `SHA-256(seed || i)`. None = random.
    pub base_seed: Option<u64>,
    /// Number of threads in the rayon pool. None = rayon default (num CPUs).
    pub num_threads: Option<usize>,
    pub policy: Policy,
    pub match_config: MatchConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_games: 100,
            base_seed: None,
            num_threads: None,
            policy: Policy::First,
            match_config: MatchConfig::default(),
        }
    }
}

/// Result from a single completed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub scores: [i32; 4],
    pub rounds_played: u32,
    pub total_actions: u32,
    pub discard_wins: u32,
    pub self_draw_wins: u32,
    pub exhaustive_draws: u32,
    pub match_seed: [u8; 32],
}

/// Play one match to completion with the given policy.
pub fn simulate_single_game(
    match_seed: [u8; 32],
    policy: Policy,
    config: &MatchConfig,
) -> anyhow::Result<GameResult> {
    let mut runner = GameRunner::with_match_seed(match_seed, config.clone())?;
    let mut selector: Box<dyn ActionSelector> = match policy {
        Policy::First => Box::new(FirstActionSelector),
        Policy::Random => Box::new(RandomSelector::new(&match_seed)),
    };
    runner.run_to_completion(selector.as_mut())?;

    let mut result = GameResult {
        scores: runner.scores(),
        rounds_played: runner.rounds_played(),
        total_actions: runner.total_actions(),
        discard_wins: 0,
        self_draw_wins: 0,
        exhaustive_draws: 0,
        match_seed,
    };
    for round in runner.history() {
        match &round.outcome {
            Some(GameOutcome::Win(w)) if w.discarder.is_some() => result.discard_wins += 1,
            Some(GameOutcome::Win(_)) => result.self_draw_wins += 1,
            Some(GameOutcome::ExhaustiveDraw(_)) => result.exhaustive_draws += 1,
            None => {}
        }
    }
    Ok(result)
}

fn seed_for(base_seed: Option<u64>, index: usize) -> [u8; 32] {
    match base_seed {
        Some(s) => match_seed(&seed_from_u64(s), index as u64),
        None => rand::random(),
    }
}

fn run_indexed(config: &BatchConfig) -> anyhow::Result<Vec<GameResult>> {
    (0..config.num_games)
        .into_par_iter()
        .map(|i| {
            simulate_single_game(seed_for(config.base_seed, i), config.policy, &config.match_config)
                .with_context(|| format!("match {} failed", i))
        })
        .collect()
}

/// Parallel batch simulator using a dedicated rayon ThreadPool.
pub struct BatchSimulator {
    pool: rayon::ThreadPool,
}

impl BatchSimulator {
    /// Create a new batch simulator with the given thread count.
    pub fn new(num_threads: Option<usize>) -> anyhow::Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))?;
        Ok(Self { pool })
    }

    /// Run a batch of matches in parallel. Results come back in match order.
    pub fn run_batch(&self, config: &BatchConfig) -> anyhow::Result<Vec<GameResult>> {
        self.pool.install(|| run_indexed(config))
    }
}

/// Convenience: run a batch on rayon's global thread pool.
pub fn run_batch_simple(config: &BatchConfig) -> anyhow::Result<Vec<GameResult>> {
    run_indexed(config)
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub games: usize,
    pub rounds: u64,
    pub actions: u64,
    pub discard_wins: u64,
    pub self_draw_wins: u64,
    pub exhaustive_draws: u64,
}

impl BatchSummary {
    pub fn from_results(results: &[GameResult]) -> Self {
        results.iter().fold(
            Self {
                games: results.len(),
                ..Self::default()
            },
            |mut acc, r| {
                acc.rounds += r.rounds_played as u64;
                acc.actions += r.total_actions as u64;
                acc.discard_wins += r.discard_wins as u64;
                acc.self_draw_wins += r.self_draw_wins as u64;
                acc.exhaustive_draws += r.exhaustive_draws as u64;
                acc
            },
        )
    }

    /// Share of rounds that ended in a win.
    pub fn win_rate(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        (self.discard_wins + self.self_draw_wins) as f64 / self.rounds as f64
    }
}
