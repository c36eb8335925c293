use serde::{Deserialize, Serialize};

use crate::furiten::FuritenState;
use crate::hand::Hand;
use crate::tile::{Tile, Wind};

/// Who sits where at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    pub score: i32,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>, score: i32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub seat: u8,
    pub name: String,
    pub wind: Wind,
    pub score: i32,
    pub hand: Hand,
    pub discards: Vec<Tile>,
    pub furiten: FuritenState,
}

impl PlayerState {
    pub fn new(seat: u8, dealer: u8, setup: PlayerSetup) -> Self {
        Self {
            seat,
            name: setup.name,
            wind: seat_wind(seat, dealer),
            score: setup.score,
            hand: Hand::default(),
            discards: Vec::new(),
            furiten: FuritenState::default(),
        }
    }

    #[inline]
    pub fn is_furiten(&self) -> bool {
        self.furiten.is_furiten
    }
}

/// East sits at the dealer; the rest follow in turn order.
#[inline]
pub fn seat_wind(seat: u8, dealer: u8) -> Wind {
    Wind::from((seat + 4 - dealer) % 4)
}
