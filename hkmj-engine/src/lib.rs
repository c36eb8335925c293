#[macro_use]
pub mod event;
pub mod agari;
pub mod errors;
pub mod furiten;
pub mod hand;
pub mod hand_evaluator;
pub mod score;
mod tests;

pub mod action;
pub mod claims;
pub mod observation;
pub mod parser;
pub mod rule;
pub mod seeding;
pub mod state;
pub mod tile;

pub use action::{Action, ActionType, Phase, TurnStage};
pub use claims::{Claim, ClaimKind, ClaimRequest};
pub use errors::{EngineError, EngineResult, InvalidMoveReason, RuleViolationReason};
pub use hand::{Hand, Meld, MeldKind};
pub use hand_evaluator::{HandEvaluator, WinEvaluation};
pub use rule::GameRule;
pub use score::{faan_to_points, score_hand, ScoreResult, WinContext};
pub use state::player::PlayerSetup;
pub use state::{ClaimWinner, DrawOutcome, GameOutcome, GameState, KongOutcome, RoundSetup, WinRecord};
pub use tile::{Tile, TileKind, Wind};
