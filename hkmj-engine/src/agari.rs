//! Shape checks over kind histograms: the two special hands and the
//! pair-plus-groups decomposition of a concealed tile multiset.

use serde::{Deserialize, Serialize};

use crate::tile::{KindCounts, TileKind, NUM_TILE_KINDS, ORPHAN_KINDS, WIND_START};

/// A group found inside the concealed part of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Pung(TileKind),
    /// Identified by its lowest kind.
    Chow(TileKind),
}

/// One way to split concealed tiles into a pair plus groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub pair: TileKind,
    pub groups: Vec<Group>,
}

#[inline]
fn total(counts: &KindCounts) -> u32 {
    counts.iter().map(|&c| c as u32).sum()
}

/// All 13 terminal/honor kinds present, exactly one of them twice, nothing else.
pub fn is_thirteen_orphans(counts: &KindCounts) -> bool {
    if total(counts) != 14 {
        return false;
    }
    let mut pairs = 0;
    for (kind, &c) in counts.iter().enumerate() {
        let is_orphan = ORPHAN_KINDS.contains(&(kind as u8));
        match (is_orphan, c) {
            (true, 1) => {}
            (true, 2) => pairs += 1,
            (false, 0) => {}
            _ => return false,
        }
    }
    pairs == 1
}

/// Seven distinct kinds, each exactly twice. A quad is not two pairs.
pub fn is_seven_pairs(counts: &KindCounts) -> bool {
    if total(counts) != 14 {
        return false;
    }
    counts.iter().all(|&c| c == 0 || c == 2) && counts.iter().filter(|&&c| c == 2).count() == 7
}

/// Every split of `counts` into one pair plus groups that consumes all tiles.
pub fn find_divisions(counts: &KindCounts) -> Vec<Division> {
    let mut divisions = Vec::new();
    if total(counts) % 3 != 2 {
        return divisions;
    }
    for i in 0..NUM_TILE_KINDS {
        if counts[i] >= 2 {
            let mut rest = *counts;
            rest[i] -= 2;
            let mut bodies = Vec::new();
            let mut current = Vec::new();
            decompose_all(&mut rest, 0, &mut current, &mut bodies);
            for groups in bodies {
                divisions.push(Division {
                    pair: TileKind::new(i as u8).unwrap_or_else(|| unreachable!()),
                    groups,
                });
            }
        }
    }
    divisions
}

/// True when at least one pair-plus-groups split exists.
pub fn is_regular_win(counts: &KindCounts) -> bool {
    !find_divisions(counts).is_empty()
}

/// Consume the lowest remaining kind as a pung or as the start of a chow,
/// backtracking over both choices.
fn decompose_all(
    counts: &mut KindCounts,
    start: usize,
    current: &mut Vec<Group>,
    results: &mut Vec<Vec<Group>>,
) {
    let mut i = start;
    while i < NUM_TILE_KINDS && counts[i] == 0 {
        i += 1;
    }
    if i == NUM_TILE_KINDS {
        results.push(current.clone());
        return;
    }
    let kind = TileKind::new(i as u8).unwrap_or_else(|| unreachable!());

    if counts[i] >= 3 {
        counts[i] -= 3;
        current.push(Group::Pung(kind));
        decompose_all(counts, i, current, results);
        current.pop();
        counts[i] += 3;
    }

    // A chow starts at ranks 1-7 of a numbered suit.
    if i < WIND_START as usize && i % 9 <= 6 && counts[i + 1] > 0 && counts[i + 2] > 0 {
        counts[i] -= 1;
        counts[i + 1] -= 1;
        counts[i + 2] -= 1;
        current.push(Group::Chow(kind));
        decompose_all(counts, i, current, results);
        current.pop();
        counts[i] += 1;
        counts[i + 1] += 1;
        counts[i + 2] += 1;
    }
}
