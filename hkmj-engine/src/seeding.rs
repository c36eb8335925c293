//! Deterministic wall shuffle.
//!
//! - Per-round seed via SHA-256 KDF over a 32-byte game seed
//! - Vendored Fisher-Yates shuffle for cross-version determinism
//! - Deterministic 136-tile wall generation
//!
//! Given the same `(seed, nonce, round, dealer)` tuple, [`generate_wall`]
//! produces an identical wall on any platform and any Rust version.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::tile::{full_set, Tile, NUM_TILES};

/// Vendored Fisher-Yates shuffle.
///
/// Does not depend on `rand::seq::SliceRandom`, whose internal algorithm may
/// change across rand versions. Each of the `n!` orderings is equally likely
/// given a uniform `random_range`.
pub fn fisher_yates_shuffle<T>(slice: &mut [T], rng: &mut impl Rng) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// `SHA-256(game_seed || nonce_le || round || dealer)`, suitable for
/// `ChaCha8Rng::from_seed`.
pub fn derive_round_seed(game_seed: &[u8; 32], nonce: u64, round: u8, dealer: u8) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(game_seed);
    hasher.update(nonce.to_le_bytes());
    hasher.update([round]);
    hasher.update([dealer]);
    hasher.finalize().into()
}

/// Expand a `u64` into a 32-byte game seed.
pub fn seed_from_u64(seed: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.finalize().into()
}

/// Fresh `ChaCha8Rng` for one round.
pub fn round_rng(game_seed: &[u8; 32], nonce: u64, round: u8, dealer: u8) -> ChaCha8Rng {
    ChaCha8Rng::from_seed(derive_round_seed(game_seed, nonce, round, dealer))
}

/// Deterministic shuffled wall for one round, in play order.
pub fn generate_wall(game_seed: &[u8; 32], nonce: u64, round: u8, dealer: u8) -> [Tile; NUM_TILES] {
    let mut rng = round_rng(game_seed, nonce, round, dealer);
    let mut wall = full_set();
    fisher_yates_shuffle(&mut wall, &mut rng);
    wall
}
