use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::tile::Tile;

/// Inputs that move the furiten flag. Nothing else touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuritenAction {
    /// The seat could have won on `tile` and did not.
    DeclineWin { tile: Tile, turn: u32 },
    /// The seat discarded.
    Discard,
}

/// A declined winning tile, kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclinedWin {
    pub tile: Tile,
    pub turn: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuritenState {
    pub is_furiten: bool,
    /// Most recent last.
    pub history: VecDeque<DeclinedWin>,
}

impl FuritenState {
    /// Next state after `action`. History keeps at most `history_len` entries.
    pub fn transition(&self, action: FuritenAction, history_len: usize) -> FuritenState {
        let mut next = self.clone();
        match action {
            FuritenAction::DeclineWin { tile, turn } => {
                next.is_furiten = true;
                if history_len > 0 {
                    if next.history.len() >= history_len {
                        next.history.pop_front();
                    }
                    next.history.push_back(DeclinedWin { tile, turn });
                }
            }
            FuritenAction::Discard => next.is_furiten = false,
        }
        next
    }

    pub fn apply(&mut self, action: FuritenAction, history_len: usize) {
        *self = self.transition(action, history_len);
    }
}
