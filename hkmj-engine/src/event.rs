//! Typed game event log.
//!
//! Events are plain enums pushed onto the game during play. JSON is only
//! produced on demand (`GameState::events_json`).

use serde::{Deserialize, Serialize};

use crate::claims::ClaimKind;
use crate::state::wall::WallKind;
use crate::tile::{Tile, Wind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Round start, before the deal.
    StartRound {
        dealer: u8,
        prevailing_wind: Wind,
        wall_digest: String,
        scores: [i32; 4],
    },
    /// Initial 13 tiles per seat (the dealer's 14th is a separate `Draw`).
    Deal { hands: [Vec<Tile>; 4] },
    Draw { seat: u8, tile: Tile },
    ReplacementDraw { seat: u8, tile: Tile },
    Discard { seat: u8, tile: Tile },
    Claim {
        seat: u8,
        kind: ClaimKind,
        target: u8,
        tile: Tile,
        consumed: Vec<Tile>,
    },
    ConcealedKong { seat: u8, tiles: [Tile; 4] },
    PromotedKong { seat: u8, tile: Tile },
    Furiten { seat: u8, tile: Tile, turn: u32 },
    Win {
        seat: u8,
        /// Discarder, `None` on self-draw.
        target: Option<u8>,
        tile: Tile,
        faan: u32,
        points: u32,
    },
    ExhaustiveDraw { wall: WallKind },
    EndRound { deltas: [i32; 4], scores: [i32; 4] },
}

/// Record an event on a game.
///
/// Arguments are not evaluated when `skip_event_log` is set. Without the
/// `event-log` feature the macro compiles to nothing.
#[cfg(feature = "event-log")]
macro_rules! game_event {
    ($game:expr, $event:expr) => {
        if !$game.skip_event_log {
            $game.events.push($event);
        }
    };
}

#[cfg(not(feature = "event-log"))]
macro_rules! game_event {
    ($game:expr, $event:expr) => {};
}
