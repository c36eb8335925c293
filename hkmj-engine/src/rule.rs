use serde::{Deserialize, Serialize};

/// Table rules. Everything the engine treats as a tunable constant lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRule {
    /// A hand below this many faan is not a legal win.
    pub min_faan: u32,
    /// Faan at which the payout is capped.
    pub limit_faan: u32,
    /// Payout once `limit_faan` is reached.
    pub limit_points: u32,
    pub starting_score: i32,
    /// Stake doubles when the winner or the paying loser is the dealer.
    pub dealer_pays_double: bool,
    /// Undeclined-win tiles kept per player for audit.
    pub furiten_history_len: usize,
}

impl Default for GameRule {
    fn default() -> Self {
        Self::default_hk()
    }
}

impl GameRule {
    /// Hong Kong old style: 3 faan minimum, 13 faan limit paying 32.
    pub fn default_hk() -> Self {
        Self {
            min_faan: 3,
            limit_faan: 13,
            limit_points: 32,
            starting_score: 500,
            dealer_pays_double: true,
            furiten_history_len: 8,
        }
    }

    /// Same table with no dealer doubling, for simpler settlement checks.
    pub fn flat_stakes() -> Self {
        Self {
            dealer_pays_double: false,
            ..Self::default_hk()
        }
    }
}
