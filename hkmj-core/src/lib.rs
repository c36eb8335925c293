//! Hong Kong mahjong match harness.
//!
//! Plays seeded multi-round matches on top of `hkmj-engine` with pluggable
//! action policies, and runs batches of them in parallel.

pub mod game_loop;
pub mod seeding;
pub mod simulator;

pub use game_loop::{ActionSelector, FirstActionSelector, GameRunner, MatchConfig, RandomSelector};
pub use simulator::{BatchConfig, BatchSimulator, GameResult, Policy};
