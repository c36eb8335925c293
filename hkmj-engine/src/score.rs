use serde::{Deserialize, Serialize};

use crate::agari::{Division, Group};
use crate::errors::{EngineResult, RuleViolationReason};
use crate::hand::{Hand, MeldKind};
use crate::hand_evaluator::{evaluate_complete, SpecialHand};
use crate::rule::GameRule;
use crate::tile::{Suit, TileKind, Wind};

/// Circumstances of a win that are not visible in the tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinContext {
    pub is_self_draw: bool,
    pub seat_wind: Wind,
    pub prevailing_wind: Wind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaanPattern {
    ThirteenOrphans,
    SevenPairs,
    FullFlush,
    DragonSet,
    WindSet,
    AllChows,
    TerminalSet,
    SelfDraw,
}

impl FaanPattern {
    pub fn name(self) -> &'static str {
        match self {
            FaanPattern::ThirteenOrphans => "Thirteen Orphans",
            FaanPattern::SevenPairs => "Seven Pairs",
            FaanPattern::FullFlush => "Full Flush",
            FaanPattern::DragonSet => "Dragon Pung",
            FaanPattern::WindSet => "Wind Pung",
            FaanPattern::AllChows => "All Chows",
            FaanPattern::TerminalSet => "Terminal Pung",
            FaanPattern::SelfDraw => "Self Draw",
        }
    }
}

/// One scoring line. Per-set patterns carry the kind of the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaanItem {
    pub pattern: FaanPattern,
    pub kind: Option<TileKind>,
    pub faan: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_faan: u32,
    pub points: u32,
    pub breakdown: Vec<FaanItem>,
    /// Meets the table minimum.
    pub is_valid: bool,
}

/// Exponential faan curve with a flat limit.
///
/// Below the minimum pays nothing; at or above the limit pays the limit.
/// The limit is deliberately lower than the uncapped values just under it.
pub fn faan_to_points(faan: u32, rule: &GameRule) -> u32 {
    if faan < rule.min_faan {
        0
    } else if faan >= rule.limit_faan {
        rule.limit_points
    } else {
        2u32.saturating_pow(faan - rule.min_faan)
    }
}

/// Score a hand that holds its winning tile. Fails with `NotAWinningHand`
/// when the shape is incomplete; a complete hand below the minimum comes
/// back with `is_valid == false`.
pub fn score_hand(hand: &Hand, ctx: &WinContext, rule: &GameRule) -> EngineResult<ScoreResult> {
    let eval = evaluate_complete(hand);
    if !eval.is_structurally_complete {
        return Err(RuleViolationReason::NotAWinningHand.into());
    }

    let breakdown = match eval.special {
        Some(SpecialHand::ThirteenOrphans) => vec![item(FaanPattern::ThirteenOrphans, None, 13)],
        Some(SpecialHand::SevenPairs) => vec![item(FaanPattern::SevenPairs, None, 4)],
        None => eval
            .divisions
            .iter()
            .map(|d| regular_breakdown(hand, d, ctx))
            .max_by_key(|items| total(items))
            .unwrap_or_default(),
    };

    Ok(finish(breakdown, rule))
}

fn finish(breakdown: Vec<FaanItem>, rule: &GameRule) -> ScoreResult {
    let total_faan = total(&breakdown);
    ScoreResult {
        total_faan,
        points: faan_to_points(total_faan, rule),
        breakdown,
        is_valid: total_faan >= rule.min_faan,
    }
}

#[inline]
fn item(pattern: FaanPattern, kind: Option<TileKind>, faan: u32) -> FaanItem {
    FaanItem { pattern, kind, faan }
}

fn total(items: &[FaanItem]) -> u32 {
    items.iter().map(|i| i.faan).sum()
}

fn regular_breakdown(hand: &Hand, division: &Division, ctx: &WinContext) -> Vec<FaanItem> {
    let mut items = Vec::new();

    let mut suits = hand.all_tiles().map(|t| t.suit());
    if let Some(first) = suits.next() {
        if first.is_numbered() && suits.all(|s| s == first) {
            items.push(item(FaanPattern::FullFlush, None, 7));
        }
    }

    // Set patterns look at committed melds only.
    for meld in hand.melds.iter().filter(|m| m.is_set()) {
        let kind = meld.base_kind();
        match kind.suit() {
            Suit::Dragon => items.push(item(FaanPattern::DragonSet, Some(kind), 1)),
            Suit::Wind => {
                let faan = u32::from(kind == ctx.seat_wind.kind())
                    + u32::from(kind == ctx.prevailing_wind.kind());
                if faan > 0 {
                    items.push(item(FaanPattern::WindSet, Some(kind), faan));
                }
            }
            _ if kind.is_terminal() => items.push(item(FaanPattern::TerminalSet, Some(kind), 1)),
            _ => {}
        }
    }

    let group_count = hand.melds.len() + division.groups.len();
    let all_chows = group_count > 0
        && hand.melds.iter().all(|m| m.kind == MeldKind::Chow)
        && division.groups.iter().all(|g| matches!(g, Group::Chow(_)))
        && hand.all_tiles().all(|t| !t.kind().is_terminal_or_honor());
    if all_chows {
        items.push(item(FaanPattern::AllChows, None, 1));
    }

    if ctx.is_self_draw {
        items.push(item(FaanPattern::SelfDraw, None, 1));
    }
    items
}

/// Per-seat score changes for one win. `payer` is the discarder, or `None`
/// for a self-draw where every other seat pays.
pub fn settle(winner: u8, payer: Option<u8>, dealer: u8, points: u32, rule: &GameRule) -> [i32; 4] {
    let stake = |loser: u8| -> i32 {
        let doubled = rule.dealer_pays_double && (winner == dealer || loser == dealer);
        let base = points as i32;
        if doubled {
            base.saturating_mul(2)
        } else {
            base
        }
    };

    let mut deltas = [0i32; 4];
    let losers: Vec<u8> = match payer {
        Some(p) => vec![p],
        None => (0..4u8).filter(|&s| s != winner).collect(),
    };
    for loser in losers {
        let amount = stake(loser);
        deltas[loser as usize] -= amount;
        deltas[winner as usize] += amount;
    }
    deltas
}
