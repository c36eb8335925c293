use serde::{Deserialize, Serialize};

use crate::agari::{self, Division};
use crate::errors::EngineResult;
use crate::hand::Hand;
use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialHand {
    ThirteenOrphans,
    SevenPairs,
}

/// Shape verdict for a hand at the instant of a win claim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinEvaluation {
    pub is_structurally_complete: bool,
    pub is_special_hand: bool,
    pub special: Option<SpecialHand>,
    /// Every regular decomposition of the concealed tiles.
    pub divisions: Vec<Division>,
}

impl WinEvaluation {
    fn incomplete() -> Self {
        Self::default()
    }
}

/// Decides whether a hand plus an optional candidate tile forms a
/// complete winning shape.
pub struct HandEvaluator {
    pub hand: Hand,
}

impl HandEvaluator {
    pub fn hand_from_text(text: &str) -> EngineResult<Self> {
        Ok(Self::new(&crate::parser::parse_hand(text)?))
    }

    pub fn new(hand: &Hand) -> Self {
        Self { hand: hand.clone() }
    }

    /// Evaluate with `candidate` added to the concealed tiles. Pass `None`
    /// when the hand already holds its winning tile (self-draw).
    pub fn evaluate(&self, candidate: Option<Tile>) -> WinEvaluation {
        let full = match candidate {
            Some(tile) => self.hand.with_tile(tile),
            None => self.hand.clone(),
        };
        evaluate_complete(&full)
    }
}

/// Evaluate a hand that should already hold `14 + kongs` tiles.
pub fn evaluate_complete(hand: &Hand) -> WinEvaluation {
    if hand.tile_count() != hand.winning_size() {
        return WinEvaluation::incomplete();
    }

    let counts = hand.concealed_counts();

    // Special hands take the whole 14 tiles concealed.
    if hand.melds.is_empty() {
        if agari::is_thirteen_orphans(&counts) {
            return special(SpecialHand::ThirteenOrphans);
        }
        if agari::is_seven_pairs(&counts) {
            return special(SpecialHand::SevenPairs);
        }
    }

    let divisions = agari::find_divisions(&counts);
    WinEvaluation {
        is_structurally_complete: !divisions.is_empty(),
        is_special_hand: false,
        special: None,
        divisions,
    }
}

fn special(kind: SpecialHand) -> WinEvaluation {
    WinEvaluation {
        is_structurally_complete: true,
        is_special_hand: true,
        special: Some(kind),
        divisions: Vec::new(),
    }
}
