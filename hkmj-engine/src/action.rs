use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claims::{ClaimKind, ClaimRequest};
use crate::tile::Tile;

/// Top-level game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Waiting,
    Dealing,
    Playing,
    Claiming,
    Ended,
}

/// Where the current seat is within its turn while `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TurnStage {
    #[default]
    NeedsDraw,
    NeedsDiscard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Draw,
    Discard,
    ConcealedKong,
    PromotedKong,
    SelfWin,
    Win,
    Pung,
    Kong,
    Chow,
    Pass,
}

impl ActionType {
    pub fn claim_kind(self) -> Option<ClaimKind> {
        match self {
            ActionType::Win => Some(ClaimKind::Win),
            ActionType::Pung => Some(ClaimKind::Pung),
            ActionType::Kong => Some(ClaimKind::Kong),
            ActionType::Chow => Some(ClaimKind::Chow),
            _ => None,
        }
    }
}

impl From<ClaimKind> for ActionType {
    fn from(kind: ClaimKind) -> Self {
        match kind {
            ClaimKind::Win => ActionType::Win,
            ClaimKind::Pung => ActionType::Pung,
            ClaimKind::Kong => ActionType::Kong,
            ClaimKind::Chow => ActionType::Chow,
        }
    }
}

/// A move a seat may make, as listed by `legal_actions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    /// Discarded tile, promoted-kong tile, or the tile being claimed.
    pub tile: Option<Tile>,
    /// Concealed tiles used by kongs and claims, sorted.
    pub consume_tiles: Vec<Tile>,
    pub actor: u8,
}

impl Action {
    pub fn new(action_type: ActionType, tile: Option<Tile>, consume: &[Tile], actor: u8) -> Self {
        let mut consume_tiles = consume.to_vec();
        consume_tiles.sort();
        Self {
            action_type,
            tile,
            consume_tiles,
            actor,
        }
    }

    pub fn from_claim(request: &ClaimRequest, tile: Tile, actor: u8) -> Self {
        Self::new(request.kind.into(), Some(tile), &request.consumed, actor)
    }

    /// The claim this action submits, for the four claim types.
    pub fn to_claim_request(&self) -> Option<ClaimRequest> {
        self.action_type.claim_kind().map(|kind| ClaimRequest {
            kind,
            consumed: self.consume_tiles.clone(),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {} {:?}", self.actor, self.action_type)?;
        if let Some(t) = self.tile {
            write!(f, " {}", t)?;
        }
        if !self.consume_tiles.is_empty() {
            let names: Vec<String> = self.consume_tiles.iter().map(|t| t.to_string()).collect();
            write!(f, " [{}]", names.join(" "))?;
        }
        Ok(())
    }
}
