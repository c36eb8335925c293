//! Tile notation.
//!
//! Tokens are separated by whitespace or commas:
//!
//! - single tiles by name: `1B`..`9B` (bamboo), `1C`..`9C` (circle),
//!   `1D`..`9D` (character), `E S W N`, `RED GREEN WHITE`
//! - compact runs within one numbered suit: `123b 789c 55d`
//! - `( ... )` an exposed meld (chow, pung or kong inferred from the tiles)
//! - `[ ... ]` a concealed kong
//!
//! Copies are handed out lowest-id first, so `"E E"` yields two distinct
//! physical East tiles.

use crate::errors::{EngineError, EngineResult};
use crate::hand::{Hand, Meld, MeldKind};
use crate::tile::{kind_from_name, Tile, TileKind, CHARACTER_START, CIRCLE_START, NUM_TILE_KINDS};

struct TileManager {
    used: [[bool; 4]; NUM_TILE_KINDS],
}

impl TileManager {
    fn new() -> Self {
        Self {
            used: [[false; 4]; NUM_TILE_KINDS],
        }
    }

    fn take(&mut self, kind: TileKind) -> Result<Tile, String> {
        let copy = (0..4u8)
            .find(|&c| !self.used[kind.id() as usize][c as usize])
            .ok_or_else(|| format!("no more copies of {}", kind))?;
        self.used[kind.id() as usize][copy as usize] = true;
        Ok(Tile::from_kind(kind, copy))
    }
}

fn parse_error(input: &str, message: impl Into<String>) -> EngineError {
    EngineError::Parse {
        input: input.to_string(),
        message: message.into(),
    }
}

fn parse_token(token: &str, tm: &mut TileManager, out: &mut Vec<Tile>) -> EngineResult<()> {
    if let Some(kind) = kind_from_name(token) {
        out.push(tm.take(kind).map_err(|e| parse_error(token, e))?);
        return Ok(());
    }

    if !token.is_ascii() {
        return Err(parse_error(token, "unknown tile"));
    }
    let (digits, suit) = token.split_at(token.len().saturating_sub(1));
    let start = match suit {
        "b" | "B" => 0,
        "c" | "C" => CIRCLE_START,
        "d" | "D" => CHARACTER_START,
        _ => return Err(parse_error(token, "unknown tile")),
    };
    if digits.is_empty() {
        return Err(parse_error(token, "suit without ranks"));
    }
    for d in digits.chars() {
        let rank = match d.to_digit(10) {
            Some(r @ 1..=9) => r as u8,
            _ => return Err(parse_error(token, format!("invalid rank '{}'", d))),
        };
        let kind = TileKind::new(start + rank - 1).ok_or_else(|| parse_error(token, "bad kind"))?;
        out.push(tm.take(kind).map_err(|e| parse_error(token, e))?);
    }
    Ok(())
}

fn parse_group(group: &str, tm: &mut TileManager) -> EngineResult<Vec<Tile>> {
    let mut tiles = Vec::new();
    for token in group
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
    {
        parse_token(token, tm, &mut tiles)?;
    }
    Ok(tiles)
}

fn infer_meld(group: &str, tiles: Vec<Tile>, concealed: bool) -> EngineResult<Meld> {
    let all_same = tiles.iter().all(|t| t.kind() == tiles[0].kind());
    let kind = match (tiles.len(), all_same, concealed) {
        (4, true, true) => MeldKind::ConcealedKong,
        (4, true, false) => MeldKind::Kong,
        (3, true, false) => MeldKind::Pung,
        (3, false, false) => MeldKind::Chow,
        _ => return Err(parse_error(group, "cannot infer meld kind")),
    };
    Meld::new(kind, tiles, None, None).map_err(|_| parse_error(group, "malformed meld"))
}

/// Parse concealed tiles and bracketed melds into a [`Hand`].
pub fn parse_hand(text: &str) -> EngineResult<Hand> {
    let mut tm = TileManager::new();
    let mut concealed = Vec::new();
    let mut melds = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(['(', '[']) {
        concealed.extend(parse_group(&rest[..open], &mut tm)?);
        let is_concealed = rest[open..].starts_with('[');
        let close_char = if is_concealed { ']' } else { ')' };
        let close = rest[open..]
            .find(close_char)
            .map(|i| open + i)
            .ok_or_else(|| parse_error(text, format!("missing '{}'", close_char)))?;
        let inner = &rest[open + 1..close];
        let tiles = parse_group(inner, &mut tm)?;
        melds.push(infer_meld(inner, tiles, is_concealed)?);
        rest = &rest[close + 1..];
    }
    concealed.extend(parse_group(rest, &mut tm)?);

    Ok(Hand::new(concealed, melds))
}

/// Parse a flat list of tiles (no meld syntax).
pub fn parse_tiles(text: &str) -> EngineResult<Vec<Tile>> {
    if text.contains(['(', '[']) {
        return Err(parse_error(text, "meld syntax not allowed here"));
    }
    parse_group(text, &mut TileManager::new())
}

/// Parse exactly one tile.
pub fn parse_tile(text: &str) -> EngineResult<Tile> {
    let tiles = parse_tiles(text)?;
    match tiles.as_slice() {
        [t] => Ok(*t),
        _ => Err(parse_error(
            text,
            format!("expected exactly one tile, found {}", tiles.len()),
        )),
    }
}
