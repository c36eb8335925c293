//! Serializable views of a game.
//!
//! [`PublicState`] is what every seat may see: concealed hands appear only
//! as tile counts. [`PrivateState`] adds one seat's own tiles and options.

use serde::{Deserialize, Serialize};

use crate::action::{Action, Phase, TurnStage};
use crate::furiten::FuritenState;
use crate::hand::Meld;
use crate::state::wall::WallAudit;
use crate::state::{GameOutcome, GameState};
use crate::tile::{Tile, Wind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPlayer {
    pub seat: u8,
    pub name: String,
    pub wind: Wind,
    pub score: i32,
    pub concealed_count: usize,
    pub melds: Vec<Meld>,
    pub discards: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub phase: Phase,
    pub stage: TurnStage,
    pub current_seat: u8,
    pub dealer: u8,
    pub prevailing_wind: Wind,
    pub round: u8,
    pub turn: u32,
    pub last_discard: Option<(u8, Tile)>,
    pub live_remaining: usize,
    pub dead_remaining: usize,
    pub wall_digest: String,
    pub players: [PublicPlayer; 4],
    pub outcome: Option<GameOutcome>,
    /// Revealed once the round has ended.
    pub wall_audit: Option<WallAudit>,
}

impl PublicState {
    pub fn from_game(game: &GameState) -> Self {
        let players = std::array::from_fn(|i| {
            let p = &game.players[i];
            PublicPlayer {
                seat: p.seat,
                name: p.name.clone(),
                wind: p.wind,
                score: p.score,
                concealed_count: p.hand.concealed.len(),
                melds: p.hand.melds.clone(),
                discards: p.discards.clone(),
            }
        });
        Self {
            phase: game.phase,
            stage: game.stage,
            current_seat: game.current_seat,
            dealer: game.dealer,
            prevailing_wind: game.prevailing_wind,
            round: game.round,
            turn: game.turn,
            last_discard: game.last_discard,
            live_remaining: game.wall().live_remaining(),
            dead_remaining: game.wall().dead_remaining(),
            wall_digest: game.wall().wall_digest().to_string(),
            players,
            outcome: game.outcome.clone(),
            wall_audit: game.wall_audit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateState {
    pub seat: u8,
    pub concealed: Vec<Tile>,
    /// Set only on this seat's own turn after a draw.
    pub drawn_tile: Option<Tile>,
    pub furiten: FuritenState,
    pub legal_actions: Vec<Action>,
    pub public: PublicState,
}

impl PrivateState {
    pub fn from_game(game: &GameState, seat: u8) -> Self {
        let p = &game.players[seat as usize];
        let drawn_tile = if game.current_seat == seat {
            game.drawn_tile
        } else {
            None
        };
        Self {
            seat,
            concealed: p.hand.concealed.clone(),
            drawn_tile,
            furiten: p.furiten.clone(),
            legal_actions: game.legal_actions(seat),
            public: PublicState::from_game(game),
        }
    }
}
