//! Tile representation.
//!
//! A physical tile is a `Tile` id in 0..136. Its kind is `id / 4` (34 kinds)
//! and its copy index is `id % 4`, which distinguishes the four duplicates.
//! Tiles are plain `Copy` values and never mutate after the set is built.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Distinct tile kinds (0-33).
pub const NUM_TILE_KINDS: usize = 34;

/// Physical tiles in a full set.
pub const NUM_TILES: usize = 136;

/// Copies of each kind.
pub const COPIES_PER_KIND: u8 = 4;

/// Ranks per numbered suit.
pub const NUM_SUIT_RANKS: u8 = 9;

// Kind range starts.
pub const BAMBOO_START: u8 = 0;
pub const CIRCLE_START: u8 = 9;
pub const CHARACTER_START: u8 = 18;
pub const WIND_START: u8 = 27;
pub const DRAGON_START: u8 = 31;

// Named honor kinds.
pub const EAST: u8 = 27;
pub const SOUTH: u8 = 28;
pub const WEST: u8 = 29;
pub const NORTH: u8 = 30;
pub const RED: u8 = 31;
pub const GREEN: u8 = 32;
pub const WHITE: u8 = 33;

/// The thirteen kinds that make up Thirteen Orphans.
pub const ORPHAN_KINDS: [u8; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];

// ---------------------------------------------------------------------------
// Suit / Wind / Dragon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Bamboo,
    Circle,
    Character,
    Wind,
    Dragon,
}

impl Suit {
    /// True for the three numbered suits.
    #[inline]
    pub const fn is_numbered(self) -> bool {
        matches!(self, Suit::Bamboo | Suit::Circle | Suit::Character)
    }
}

/// Seat and prevailing winds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Wind {
    #[default]
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Wind {
    /// The tile kind that depicts this wind.
    #[inline]
    pub const fn kind(self) -> TileKind {
        TileKind(WIND_START + self as u8)
    }

    #[inline]
    pub fn next(self) -> Wind {
        Wind::from(self as u8 + 1)
    }
}

impl From<u8> for Wind {
    fn from(val: u8) -> Self {
        match val % 4 {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            3 => Wind::North,
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dragon {
    Red = 0,
    Green = 1,
    White = 2,
}

/// Rank of a tile within its suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Number(u8),
    Wind(Wind),
    Dragon(Dragon),
}

// ---------------------------------------------------------------------------
// TileKind
// ---------------------------------------------------------------------------

/// A tile kind in the range 0-33.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TileKind(u8);

impl TileKind {
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if id < NUM_TILE_KINDS as u8 {
            Some(TileKind(id))
        } else {
            None
        }
    }

    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn suit(self) -> Suit {
        match self.0 {
            0..9 => Suit::Bamboo,
            9..18 => Suit::Circle,
            18..27 => Suit::Character,
            27..31 => Suit::Wind,
            _ => Suit::Dragon,
        }
    }

    pub fn rank(self) -> Rank {
        match self.suit() {
            Suit::Wind => Rank::Wind(Wind::from(self.0 - WIND_START)),
            Suit::Dragon => Rank::Dragon(match self.0 {
                RED => Dragon::Red,
                GREEN => Dragon::Green,
                _ => Dragon::White,
            }),
            _ => Rank::Number(self.0 % NUM_SUIT_RANKS + 1),
        }
    }

    /// 1-based number within a numbered suit, `None` for honors.
    #[inline]
    pub const fn number(self) -> Option<u8> {
        if self.0 < WIND_START {
            Some(self.0 % NUM_SUIT_RANKS + 1)
        } else {
            None
        }
    }

    /// True for 1 or 9 of a numbered suit.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        if self.0 >= WIND_START {
            return false;
        }
        let num = self.0 % NUM_SUIT_RANKS;
        num == 0 || num == 8
    }

    #[inline]
    pub const fn is_honor(self) -> bool {
        self.0 >= WIND_START
    }

    #[inline]
    pub const fn is_terminal_or_honor(self) -> bool {
        self.is_terminal() || self.is_honor()
    }

    #[inline]
    pub const fn is_numbered(self) -> bool {
        self.0 < WIND_START
    }

    #[inline]
    pub const fn is_wind(self) -> bool {
        self.0 >= WIND_START && self.0 < DRAGON_START
    }

    #[inline]
    pub const fn is_dragon(self) -> bool {
        self.0 >= DRAGON_START && self.0 < NUM_TILE_KINDS as u8
    }

    /// The kind `offset` ranks above this one in the same numbered suit.
    pub fn offset(self, offset: i8) -> Option<TileKind> {
        let num = self.number()? as i8 + offset;
        if !(1..=NUM_SUIT_RANKS as i8).contains(&num) {
            return None;
        }
        Some(TileKind((self.0 as i8 + offset) as u8))
    }

    #[inline]
    pub fn name(self) -> &'static str {
        kind_name(self.0)
    }
}

impl TryFrom<u8> for TileKind {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        TileKind::new(id).ok_or_else(|| format!("tile kind {} out of range", id))
    }
}

impl From<TileKind> for u8 {
    fn from(kind: TileKind) -> u8 {
        kind.0
    }
}

impl fmt::Debug for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileKind({}={})", self.0, self.name())
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One physical tile, id 0..136.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tile(u8);

impl Tile {
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if id < NUM_TILES as u8 {
            Some(Tile(id))
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_kind(kind: TileKind, copy: u8) -> Self {
        Tile(kind.0 * COPIES_PER_KIND + copy % COPIES_PER_KIND)
    }

    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn kind(self) -> TileKind {
        TileKind(self.0 / COPIES_PER_KIND)
    }

    /// Which of the four duplicates this is.
    #[inline]
    pub const fn copy(self) -> u8 {
        self.0 % COPIES_PER_KIND
    }

    #[inline]
    pub const fn suit(self) -> Suit {
        self.kind().suit()
    }

    #[inline]
    pub fn rank(self) -> Rank {
        self.kind().rank()
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        self.kind().is_terminal()
    }

    #[inline]
    pub const fn is_honor(self) -> bool {
        self.kind().is_honor()
    }
}

impl TryFrom<u8> for Tile {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Tile::new(id).ok_or_else(|| format!("tile id {} out of range", id))
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> u8 {
        tile.0
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tile({}={}#{})", self.0, self.kind().name(), self.copy())
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().name())
    }
}

/// The full 136-tile set in id order. Built once per round.
pub fn full_set() -> [Tile; NUM_TILES] {
    std::array::from_fn(|i| Tile(i as u8))
}

// ---------------------------------------------------------------------------
// Counting helpers
// ---------------------------------------------------------------------------

/// Histogram of tile kinds.
pub type KindCounts = [u8; NUM_TILE_KINDS];

pub fn kind_counts(tiles: &[Tile]) -> KindCounts {
    let mut counts = [0u8; NUM_TILE_KINDS];
    for t in tiles {
        counts[t.kind().id() as usize] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

const KIND_NAMES: [&str; NUM_TILE_KINDS] = [
    "1B", "2B", "3B", "4B", "5B", "6B", "7B", "8B", "9B", "1C", "2C", "3C", "4C", "5C", "6C", "7C",
    "8C", "9C", "1D", "2D", "3D", "4D", "5D", "6D", "7D", "8D", "9D", "E", "S", "W", "N", "RED",
    "GREEN", "WHITE",
];

/// Short name of a kind (0-33). Out-of-range values return "??".
#[inline]
pub fn kind_name(kind: u8) -> &'static str {
    KIND_NAMES.get(kind as usize).copied().unwrap_or("??")
}

/// Reverse of [`kind_name`], case-insensitive.
pub fn kind_from_name(name: &str) -> Option<TileKind> {
    KIND_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .map(|i| TileKind(i as u8))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
