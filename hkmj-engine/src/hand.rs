use serde::{Deserialize, Serialize};

use crate::errors::{EngineResult, InvalidMoveReason, RuleViolationReason};
use crate::tile::{kind_counts, KindCounts, Tile, TileKind};

/// Insert `tile` into a sorted tile list, maintaining sort order.
#[inline]
pub(crate) fn sorted_insert(tiles: &mut Vec<Tile>, tile: Tile) {
    let pos = tiles.partition_point(|&t| t < tile);
    tiles.insert(pos, tile);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    Chow,
    Pung,
    Kong,
    ConcealedKong,
}

impl MeldKind {
    pub const fn size(self) -> usize {
        match self {
            MeldKind::Chow | MeldKind::Pung => 3,
            MeldKind::Kong | MeldKind::ConcealedKong => 4,
        }
    }
}

/// A committed group of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    /// Sorted by tile id.
    pub tiles: Vec<Tile>,
    /// Seat the claimed tile came from. `None` for concealed kongs.
    pub claimed_from: Option<u8>,
    /// The discard that was claimed to form this meld, if any.
    pub called_tile: Option<Tile>,
}

impl Meld {
    /// Build a meld, checking the shape invariant for its kind.
    pub fn new(
        kind: MeldKind,
        mut tiles: Vec<Tile>,
        claimed_from: Option<u8>,
        called_tile: Option<Tile>,
    ) -> EngineResult<Self> {
        tiles.sort();
        if !is_valid_shape(kind, &tiles) {
            return Err(RuleViolationReason::MalformedMeld.into());
        }
        Ok(Self {
            kind,
            tiles,
            claimed_from,
            called_tile,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.tiles.len()
    }

    /// Lowest kind in the meld (the only kind for sets).
    #[inline]
    pub fn base_kind(&self) -> TileKind {
        self.tiles[0].kind()
    }

    #[inline]
    pub fn is_kong(&self) -> bool {
        matches!(self.kind, MeldKind::Kong | MeldKind::ConcealedKong)
    }

    /// Pung, Kong or ConcealedKong.
    #[inline]
    pub fn is_set(&self) -> bool {
        !matches!(self.kind, MeldKind::Chow)
    }

    #[inline]
    pub fn is_exposed(&self) -> bool {
        !matches!(self.kind, MeldKind::ConcealedKong)
    }
}

fn is_valid_shape(kind: MeldKind, sorted: &[Tile]) -> bool {
    if sorted.len() != kind.size() {
        return false;
    }
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return false;
    }
    let first = sorted[0].kind();
    match kind {
        MeldKind::Chow => {
            first.is_numbered()
                && sorted
                    .iter()
                    .enumerate()
                    .all(|(i, t)| first.offset(i as i8) == Some(t.kind()))
        }
        MeldKind::Pung | MeldKind::Kong | MeldKind::ConcealedKong => {
            sorted.iter().all(|t| t.kind() == first)
        }
    }
}

/// One player's concealed tiles and committed melds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    /// Sorted by tile id.
    pub concealed: Vec<Tile>,
    pub melds: Vec<Meld>,
}

impl Hand {
    pub fn new(mut concealed: Vec<Tile>, melds: Vec<Meld>) -> Self {
        concealed.sort();
        Self { concealed, melds }
    }

    pub fn add(&mut self, tile: Tile) {
        sorted_insert(&mut self.concealed, tile);
    }

    pub fn remove(&mut self, tile: Tile) -> EngineResult<()> {
        match self.concealed.iter().position(|&t| t == tile) {
            Some(idx) => {
                self.concealed.remove(idx);
                Ok(())
            }
            None => Err(InvalidMoveReason::TileNotInHand.into()),
        }
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.concealed.binary_search(&tile).is_ok()
    }

    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.concealed.iter().filter(|t| t.kind() == kind).count()
    }

    /// Concealed tiles of `kind`, lowest ids first.
    pub fn tiles_of_kind(&self, kind: TileKind) -> Vec<Tile> {
        self.concealed
            .iter()
            .copied()
            .filter(|t| t.kind() == kind)
            .collect()
    }

    pub fn concealed_counts(&self) -> KindCounts {
        kind_counts(&self.concealed)
    }

    pub fn kong_count(&self) -> usize {
        self.melds.iter().filter(|m| m.is_kong()).count()
    }

    /// Concealed tiles plus every tile in every meld.
    pub fn tile_count(&self) -> usize {
        self.concealed.len() + self.melds.iter().map(Meld::size).sum::<usize>()
    }

    /// True when no meld was claimed from a discard.
    pub fn is_fully_concealed(&self) -> bool {
        self.melds.iter().all(|m| !m.is_exposed())
    }

    /// Size the hand must have between turns.
    pub fn waiting_size(&self) -> usize {
        13 + self.kong_count()
    }

    /// Size the hand must have at the instant of a win.
    pub fn winning_size(&self) -> usize {
        14 + self.kong_count()
    }

    pub fn all_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.concealed
            .iter()
            .copied()
            .chain(self.melds.iter().flat_map(|m| m.tiles.iter().copied()))
    }

    /// Copy of this hand with `tile` added to the concealed part.
    pub fn with_tile(&self, tile: Tile) -> Hand {
        let mut h = self.clone();
        h.add(tile);
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(kind: u8, copy: u8) -> Tile {
        Tile::from_kind(TileKind::new(kind).unwrap(), copy)
    }

    #[test]
    fn chow_must_be_consecutive_same_suit() {
        assert!(Meld::new(MeldKind::Chow, vec![t(2, 0), t(0, 0), t(1, 3)], Some(0), None).is_ok());
        // 8B 9B 1C crosses a suit boundary
        assert!(Meld::new(MeldKind::Chow, vec![t(7, 0), t(8, 0), t(9, 0)], None, None).is_err());
        // honors never chow
        assert!(Meld::new(MeldKind::Chow, vec![t(27, 0), t(28, 0), t(29, 0)], None, None).is_err());
        assert!(Meld::new(MeldKind::Chow, vec![t(0, 0), t(0, 1), t(1, 0)], None, None).is_err());
    }

    #[test]
    fn sets_must_be_identical_kinds() {
        assert!(Meld::new(MeldKind::Pung, vec![t(31, 0), t(31, 1), t(31, 2)], Some(1), None).is_ok());
        assert!(Meld::new(MeldKind::Pung, vec![t(31, 0), t(31, 1), t(32, 2)], None, None).is_err());
        assert!(Meld::new(MeldKind::Pung, vec![t(31, 0), t(31, 0), t(31, 2)], None, None).is_err());
        let kong = Meld::new(
            MeldKind::ConcealedKong,
            vec![t(5, 0), t(5, 1), t(5, 2), t(5, 3)],
            None,
            None,
        )
        .unwrap();
        assert!(kong.is_kong() && kong.is_set() && !kong.is_exposed());
        assert!(Meld::new(MeldKind::Kong, vec![t(5, 0), t(5, 1), t(5, 2)], None, None).is_err());
    }

    #[test]
    fn hand_counts_include_kongs() {
        let kong =
            Meld::new(MeldKind::Kong, vec![t(5, 0), t(5, 1), t(5, 2), t(5, 3)], Some(2), None).unwrap();
        let concealed: Vec<Tile> = (0..10u8).map(|k| t(k + 9, 0)).collect();
        let hand = Hand::new(concealed, vec![kong]);
        assert_eq!(hand.kong_count(), 1);
        assert_eq!(hand.tile_count(), 14);
        assert_eq!(hand.waiting_size(), 14);
        assert_eq!(hand.winning_size(), 15);
        assert!(!hand.is_fully_concealed());
    }

    #[test]
    fn add_keeps_order_and_remove_reports_missing() {
        let mut hand = Hand::new(vec![t(3, 0), t(1, 0)], vec![]);
        hand.add(t(2, 0));
        assert_eq!(hand.concealed, vec![t(1, 0), t(2, 0), t(3, 0)]);
        assert!(hand.contains(t(2, 0)));
        hand.remove(t(2, 0)).unwrap();
        assert!(hand.remove(t(2, 0)).is_err());
        assert_eq!(hand.count_kind(TileKind::new(1).unwrap()), 1);
    }
}
