use crate::action::{Action, ActionType, Phase, TurnStage};
use crate::hand::MeldKind;
use crate::state::GameState;
use crate::tile::{Tile, COPIES_PER_KIND};

pub trait GameStateLegalActions {
    fn collect_legal_actions(&self, seat: u8) -> Vec<Action>;
}

impl GameStateLegalActions for GameState {
    fn collect_legal_actions(&self, seat: u8) -> Vec<Action> {
        let mut legals = Vec::new();
        if seat as usize >= self.np() {
            return legals;
        }

        match self.phase {
            Phase::Playing if seat == self.current_seat => match self.stage {
                TurnStage::NeedsDraw => legals.push(Action::new(ActionType::Draw, None, &[], seat)),
                TurnStage::NeedsDiscard => self.turn_actions(seat, &mut legals),
            },
            Phase::Claiming => {
                if let Some(window) = &self.claim_window {
                    if seat != window.discarder && !window.has_responded(seat) {
                        for offer in &window.offers[seat as usize] {
                            legals.push(Action::from_claim(offer, window.tile, seat));
                        }
                        legals.push(Action::new(ActionType::Pass, None, &[], seat));
                    }
                }
            }
            _ => {}
        }
        legals
    }
}

impl GameState {
    fn turn_actions(&self, seat: u8, legals: &mut Vec<Action>) {
        let hand = &self.players[seat as usize].hand;

        if self.self_win_score(seat).is_some() {
            legals.push(Action::new(ActionType::SelfWin, self.drawn_tile, &[], seat));
        }

        let counts = hand.concealed_counts();
        let mut last: Option<Tile> = None;
        for &tile in &hand.concealed {
            legals.push(Action::new(ActionType::Discard, Some(tile), &[], seat));

            // One kong option per kind.
            if last.map(|t| t.kind()) == Some(tile.kind()) {
                continue;
            }
            last = Some(tile);
            if counts[tile.kind().id() as usize] == COPIES_PER_KIND {
                let tiles = hand.tiles_of_kind(tile.kind());
                legals.push(Action::new(ActionType::ConcealedKong, None, &tiles, seat));
            }
            let promotes = hand
                .melds
                .iter()
                .any(|m| m.kind == MeldKind::Pung && m.base_kind() == tile.kind());
            if promotes {
                legals.push(Action::new(ActionType::PromotedKong, Some(tile), &[], seat));
            }
        }
    }
}
