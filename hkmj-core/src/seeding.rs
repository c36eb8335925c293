//! Seed hierarchy for matches and batches.
//!
//! A batch owns one 32-byte session seed. Each match derives its own seed
//! via `SHA-256(session_seed || match_index_le)`, and each round of a match
//! derives the `u64` wall seed handed to [`hkmj_engine::GameState`]. The
//! wall shuffle itself lives in [`hkmj_engine::seeding`].

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

pub use hkmj_engine::seeding::seed_from_u64;

/// Deterministic session RNG that produces per-match seeds.
///
/// ```
/// use hkmj_core::seeding::SessionRng;
///
/// let mut session = SessionRng::new([0u8; 32]);
/// let seed_0 = session.next_match_seed();
/// let seed_1 = session.next_match_seed();
/// assert_ne!(seed_0, seed_1);
/// ```
#[derive(Debug, Clone)]
pub struct SessionRng {
    seed: [u8; 32],
    match_index: u64,
}

impl SessionRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            match_index: 0,
        }
    }

    /// Session keyed by a plain integer.
    pub fn from_u64(seed: u64) -> Self {
        Self::new(seed_from_u64(seed))
    }

    /// Number of seeds handed out so far.
    pub fn match_index(&self) -> u64 {
        self.match_index
    }

    /// Seed for the next match; advances the counter.
    pub fn next_match_seed(&mut self) -> [u8; 32] {
        let seed = match_seed(&self.seed, self.match_index);
        self.match_index += 1;
        seed
    }
}

/// `SHA-256(session_seed || index_le)`.
pub fn match_seed(session_seed: &[u8; 32], index: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(session_seed);
    hasher.update(index.to_le_bytes());
    hasher.finalize().into()
}

/// Wall seed for one round of a match.
///
/// Folds the first eight bytes of `SHA-256(match_seed || "wall" || round_index_le)`
/// into a `u64`.
pub fn round_wall_seed(match_seed: &[u8; 32], round_index: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(match_seed);
    hasher.update(b"wall");
    hasher.update(round_index.to_le_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

/// RNG for a seat's action policy, independent of the wall stream.
pub fn policy_rng(match_seed: &[u8; 32], seat: u8) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(match_seed);
    hasher.update(b"policy");
    hasher.update([seat]);
    ChaCha8Rng::from_seed(hasher.finalize().into())
}
