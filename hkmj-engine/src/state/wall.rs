use std::fmt;

use log::{debug, warn};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{EngineError, EngineResult};
use crate::seeding::{fisher_yates_shuffle, round_rng, seed_from_u64};
use crate::tile::{full_set, Tile, NUM_TILES};

/// Tiles drawn during normal turns.
pub const LIVE_WALL_SIZE: usize = 120;
/// Tiles reserved for kong replacements.
pub const DEAD_WALL_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    Live,
    Dead,
}

/// Rejects any read at or beyond `pointer`. Only drawn positions may be read.
#[inline]
pub fn check_access(index: usize, pointer: usize) -> EngineResult<()> {
    if index >= pointer {
        warn!("blocked wall read at index {} (pointer {})", index, pointer);
        return Err(EngineError::InformationLeak { index, pointer });
    }
    Ok(())
}

/// Salt and tile order, revealed once a round is over so the published
/// digest can be checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallAudit {
    pub salt: String,
    pub digest: String,
    pub tiles: Vec<Tile>,
}

/// Live and dead walls for one round.
///
/// `tiles[0..120)` is the live wall in draw order. `tiles[120..136)` is the
/// dead wall, consumed back-to-front. Both pointers only move forward.
///
/// Callers outside the engine get a shared reference only: draws, shuffles
/// and the seed stay inside the crate, and `Debug` omits the tile order.
pub struct WallState {
    tiles: Vec<Tile>,
    live_pointer: usize,
    dead_pointer: usize,
    wall_digest: String,
    salt: String,
    seed: Option<u64>,
    round_index: u64,
}

impl fmt::Debug for WallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WallState")
            .field("live_pointer", &self.live_pointer)
            .field("dead_pointer", &self.dead_pointer)
            .field("wall_digest", &self.wall_digest)
            .finish_non_exhaustive()
    }
}

impl WallState {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        Self {
            tiles: Vec::new(),
            live_pointer: 0,
            dead_pointer: 0,
            wall_digest: String::new(),
            salt: String::new(),
            seed,
            round_index: 0,
        }
    }

    /// Shuffle a fresh 136-tile set and split it. Seeded walls are a pure
    /// function of `(seed, round_index, round, dealer)`.
    pub(crate) fn shuffle(&mut self, round: u8, dealer: u8) {
        let game_seed = match self.seed {
            Some(seed) => seed_from_u64(seed),
            None => rand::rng().random::<[u8; 32]>(),
        };
        let mut rng = round_rng(&game_seed, self.round_index, round, dealer);
        self.round_index = self.round_index.wrapping_add(1);

        let mut w = full_set();
        fisher_yates_shuffle(&mut w, &mut rng);
        self.salt = format!("{:016x}", rng.next_u64());
        self.install(w.to_vec());
        debug!(
            "wall shuffled for round {} dealer {} digest {}",
            round, dealer, self.wall_digest
        );
    }

    /// Install an explicit tile order (replays, tests). The order must be a
    /// permutation of the full set.
    pub(crate) fn load_wall(&mut self, tiles: Vec<Tile>) -> EngineResult<()> {
        let mut seen = [false; NUM_TILES];
        for t in &tiles {
            if std::mem::replace(&mut seen[t.id() as usize], true) {
                return Err(EngineError::Parse {
                    input: format!("{:?}", t),
                    message: "duplicate tile in wall".to_string(),
                });
            }
        }
        if tiles.len() != NUM_TILES {
            return Err(EngineError::Parse {
                input: format!("{} tiles", tiles.len()),
                message: format!("wall must hold exactly {} tiles", NUM_TILES),
            });
        }
        self.salt = String::new();
        self.install(tiles);
        Ok(())
    }

    fn install(&mut self, tiles: Vec<Tile>) {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        for t in &tiles {
            hasher.update([t.id()]);
        }
        self.wall_digest = format!("{:x}", hasher.finalize());
        self.tiles = tiles;
        self.live_pointer = 0;
        self.dead_pointer = 0;
    }

    /// Next tile from the live wall.
    pub(crate) fn draw(&mut self) -> EngineResult<Tile> {
        if self.live_pointer >= LIVE_WALL_SIZE || self.tiles.len() != NUM_TILES {
            return Err(EngineError::WallExhausted(WallKind::Live));
        }
        let tile = self.tiles[self.live_pointer];
        self.live_pointer += 1;
        Ok(tile)
    }

    /// Next kong replacement from the back of the dead wall.
    pub(crate) fn draw_replacement(&mut self) -> EngineResult<Tile> {
        if self.dead_pointer >= DEAD_WALL_SIZE || self.tiles.len() != NUM_TILES {
            return Err(EngineError::WallExhausted(WallKind::Dead));
        }
        let tile = self.tiles[Self::dead_position(self.dead_pointer)];
        self.dead_pointer += 1;
        Ok(tile)
    }

    /// Live-wall tile at `index`, only if it has already been drawn.
    pub fn drawn_live(&self, index: usize) -> EngineResult<Tile> {
        check_access(index, self.live_pointer)?;
        Ok(self.tiles[index])
    }

    /// The `index`-th replacement tile, only if it has already been drawn.
    pub fn drawn_replacement(&self, index: usize) -> EngineResult<Tile> {
        check_access(index, self.dead_pointer)?;
        Ok(self.tiles[Self::dead_position(index)])
    }

    #[inline]
    fn dead_position(index: usize) -> usize {
        NUM_TILES - 1 - index
    }

    /// SHA-256 over salt and tile order, published at the start of a round.
    pub fn wall_digest(&self) -> &str {
        &self.wall_digest
    }

    pub fn live_pointer(&self) -> usize {
        self.live_pointer
    }

    pub fn dead_pointer(&self) -> usize {
        self.dead_pointer
    }

    pub fn live_remaining(&self) -> usize {
        LIVE_WALL_SIZE - self.live_pointer
    }

    pub fn dead_remaining(&self) -> usize {
        DEAD_WALL_SIZE - self.dead_pointer
    }

    /// Number of tiles in each wall as split.
    pub fn sizes(&self) -> (usize, usize) {
        let live = self.tiles.len().min(LIVE_WALL_SIZE);
        (live, self.tiles.len() - live)
    }

    /// Tiles not yet drawn from either wall. Used for conservation checks
    /// inside the crate only; never exposed to callers.
    pub(crate) fn undrawn(&self) -> impl Iterator<Item = Tile> + '_ {
        let live = self.tiles.get(self.live_pointer..LIVE_WALL_SIZE).unwrap_or(&[]);
        let dead = self
            .tiles
            .get(LIVE_WALL_SIZE..NUM_TILES - self.dead_pointer)
            .unwrap_or(&[]);
        live.iter().chain(dead.iter()).copied()
    }

    pub(crate) fn audit(&self) -> WallAudit {
        WallAudit {
            salt: self.salt.clone(),
            digest: self.wall_digest.clone(),
            tiles: self.tiles.clone(),
        }
    }
}

/// Recompute a wall digest from an audit record.
pub fn verify_audit(audit: &WallAudit) -> bool {
    let mut hasher = Sha256::new();
    hasher.update(audit.salt.as_bytes());
    for t in &audit.tiles {
        hasher.update([t.id()]);
    }
    format!("{:x}", hasher.finalize()) == audit.digest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_wall(seed: u64) -> WallState {
        let mut w = WallState::new(Some(seed));
        w.shuffle(0, 0);
        w
    }

    #[test]
    fn split_sizes_sum_to_full_set() {
        let w = seeded_wall(1);
        assert_eq!(w.sizes(), (LIVE_WALL_SIZE, DEAD_WALL_SIZE));
        assert_eq!(w.undrawn().count(), NUM_TILES);
    }

    #[test]
    fn same_seed_same_wall() {
        let mut a = seeded_wall(9);
        let mut b = seeded_wall(9);
        for _ in 0..LIVE_WALL_SIZE {
            assert_eq!(a.draw().unwrap(), b.draw().unwrap());
        }
        assert_eq!(a.wall_digest, b.wall_digest);
    }

    #[test]
    fn live_draws_exhaust_at_120() {
        let mut w = seeded_wall(3);
        for _ in 0..LIVE_WALL_SIZE {
            w.draw().unwrap();
        }
        assert_eq!(w.draw(), Err(EngineError::WallExhausted(WallKind::Live)));
        assert_eq!(w.draw(), Err(EngineError::WallExhausted(WallKind::Live)));
        assert_eq!(w.live_pointer(), LIVE_WALL_SIZE);
    }

    #[test]
    fn replacements_come_from_the_back_and_leave_live_wall_alone() {
        let order: Vec<Tile> = full_set().to_vec();
        let mut w = WallState::new(None);
        w.load_wall(order).unwrap();
        assert_eq!(w.draw_replacement().unwrap().id(), 135);
        assert_eq!(w.draw_replacement().unwrap().id(), 134);
        assert_eq!(w.live_remaining(), LIVE_WALL_SIZE);
        assert_eq!(w.dead_remaining(), DEAD_WALL_SIZE - 2);
        for _ in 2..DEAD_WALL_SIZE {
            w.draw_replacement().unwrap();
        }
        assert_eq!(
            w.draw_replacement(),
            Err(EngineError::WallExhausted(WallKind::Dead))
        );
    }

    #[test]
    fn reads_beyond_pointer_are_blocked() {
        let mut w = seeded_wall(5);
        assert_eq!(
            w.drawn_live(0),
            Err(EngineError::InformationLeak { index: 0, pointer: 0 })
        );
        let first = w.draw().unwrap();
        assert_eq!(w.drawn_live(0), Ok(first));
        assert!(w.drawn_live(1).unwrap_err().is_fatal());
        assert!(w.drawn_replacement(0).unwrap_err().is_fatal());
        let rep = w.draw_replacement().unwrap();
        assert_eq!(w.drawn_replacement(0), Ok(rep));
    }

    #[test]
    fn load_rejects_non_permutations() {
        let mut w = WallState::new(None);
        let mut tiles = full_set().to_vec();
        tiles[1] = tiles[0];
        assert!(matches!(w.load_wall(tiles), Err(EngineError::Parse { .. })));
        assert!(matches!(
            w.load_wall(full_set()[..100].to_vec()),
            Err(EngineError::Parse { .. })
        ));
    }

    #[test]
    fn audit_matches_digest() {
        let w = seeded_wall(11);
        let audit = w.audit();
        assert!(verify_audit(&audit));
        assert_eq!(audit.digest, w.wall_digest());
        let mut tampered = audit.clone();
        tampered.tiles.swap(0, 1);
        assert!(!verify_audit(&tampered));
    }

    #[test]
    fn debug_output_hides_tile_order() {
        let mut w = seeded_wall(42);
        for _ in 0..53 {
            w.draw().unwrap();
        }
        let printed = format!("{:?}", w);
        assert!(printed.contains("live_pointer: 53"));
        assert!(printed.contains(w.wall_digest()));
        let next = w.tiles[w.live_pointer()];
        assert!(!printed.contains("tiles"));
        assert!(!printed.contains(&format!("{:?}", next)));
        assert!(w.drawn_live(w.live_pointer()).unwrap_err().is_fatal());
    }
}
