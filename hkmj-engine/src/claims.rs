//! Claims on a discarded tile and their arbitration.
//!
//! Every seat other than the discarder answers once, with a claim or a pass.
//! Nothing is committed while the window is open. Resolution is a pure
//! function of the collected claims: lowest priority number wins, then the
//! seat closest to the discarder in turn order.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineResult, InvalidMoveReason, RuleViolationReason};
use crate::hand::{Hand, Meld, MeldKind};
use crate::rule::GameRule;
use crate::score::{score_hand, ScoreResult, WinContext};
use crate::tile::{Tile, TileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimKind {
    Win,
    Pung,
    Kong,
    Chow,
}

impl ClaimKind {
    /// Smaller wins.
    pub const fn priority(self) -> u8 {
        match self {
            ClaimKind::Win => 1,
            ClaimKind::Pung | ClaimKind::Kong => 2,
            ClaimKind::Chow => 3,
        }
    }

    /// Concealed tiles the claim takes out of the hand.
    pub const fn consumed_len(self) -> usize {
        match self {
            ClaimKind::Win => 0,
            ClaimKind::Pung | ClaimKind::Chow => 2,
            ClaimKind::Kong => 3,
        }
    }
}

/// What a seat asks for on a discard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub kind: ClaimKind,
    pub consumed: Vec<Tile>,
}

impl ClaimRequest {
    pub fn win() -> Self {
        Self {
            kind: ClaimKind::Win,
            consumed: Vec::new(),
        }
    }

    pub fn pung(consumed: [Tile; 2]) -> Self {
        Self {
            kind: ClaimKind::Pung,
            consumed: consumed.to_vec(),
        }
    }

    pub fn kong(consumed: [Tile; 3]) -> Self {
        Self {
            kind: ClaimKind::Kong,
            consumed: consumed.to_vec(),
        }
    }

    pub fn chow(consumed: [Tile; 2]) -> Self {
        Self {
            kind: ClaimKind::Chow,
            consumed: consumed.to_vec(),
        }
    }
}

/// A validated claim waiting for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub kind: ClaimKind,
    pub seat: u8,
    pub tile: Tile,
    pub priority: u8,
    pub distance: u8,
    pub consumed: Vec<Tile>,
}

impl Claim {
    /// The meld this claim commits. `None` for a win.
    pub fn to_meld(&self, discarder: u8) -> EngineResult<Option<Meld>> {
        let kind = match self.kind {
            ClaimKind::Win => return Ok(None),
            ClaimKind::Pung => MeldKind::Pung,
            ClaimKind::Kong => MeldKind::Kong,
            ClaimKind::Chow => MeldKind::Chow,
        };
        let mut tiles = self.consumed.clone();
        tiles.push(self.tile);
        Meld::new(kind, tiles, Some(discarder), Some(self.tile)).map(Some)
    }
}

/// Seats counted counter-clockwise from the discarder. The next seat is 1.
#[inline]
pub fn seat_distance(discarder: u8, seat: u8) -> u8 {
    (seat + 4 - discarder) % 4
}

/// Pick the single surviving claim, if any.
pub fn resolve(claims: &[Claim]) -> Option<&Claim> {
    claims.iter().min_by_key(|c| (c.priority, c.distance))
}

/// Everything `seat` could legally claim on `tile`, every chow shape
/// listed separately.
pub fn legal_claims(
    hand: &Hand,
    seat: u8,
    discarder: u8,
    tile: Tile,
    is_furiten: bool,
    ctx: &WinContext,
    rule: &GameRule,
) -> Vec<ClaimRequest> {
    let mut out = Vec::new();
    if seat == discarder {
        return out;
    }
    let kind = tile.kind();

    if !is_furiten {
        if let Ok(score) = score_hand(&hand.with_tile(tile), ctx, rule) {
            if score.is_valid {
                out.push(ClaimRequest::win());
            }
        }
    }

    let same = hand.tiles_of_kind(kind);
    if let [a, b, ..] = same[..] {
        out.push(ClaimRequest::pung([a, b]));
    }
    if let [a, b, c, ..] = same[..] {
        out.push(ClaimRequest::kong([a, b, c]));
    }

    if seat_distance(discarder, seat) == 1 && kind.is_numbered() {
        for (lo, hi) in [(-2, -1), (-1, 1), (1, 2)] {
            if let (Some(x), Some(y)) = (
                lowest_of(hand, kind.offset(lo)),
                lowest_of(hand, kind.offset(hi)),
            ) {
                out.push(ClaimRequest::chow([x, y]));
            }
        }
    }
    out
}

fn lowest_of(hand: &Hand, kind: Option<TileKind>) -> Option<Tile> {
    let kind = kind?;
    hand.concealed.iter().copied().find(|t| t.kind() == kind)
}

/// Check a claim against the claimant's actual hand. Nothing is mutated.
/// A valid win returns its score alongside the claim.
#[allow(clippy::too_many_arguments)]
pub fn validate_claim(
    hand: &Hand,
    seat: u8,
    discarder: u8,
    tile: Tile,
    request: &ClaimRequest,
    is_furiten: bool,
    ctx: &WinContext,
    rule: &GameRule,
) -> EngineResult<(Claim, Option<ScoreResult>)> {
    if seat == discarder {
        return Err(InvalidMoveReason::OwnDiscard.into());
    }
    if request.consumed.len() != request.kind.consumed_len() {
        return Err(RuleViolationReason::MalformedMeld.into());
    }
    let mut consumed = request.consumed.clone();
    consumed.sort();
    if consumed.windows(2).any(|w| w[0] == w[1]) || !consumed.iter().all(|&t| hand.contains(t)) {
        return Err(InvalidMoveReason::ClaimNotHeld.into());
    }

    let mut score = None;
    match request.kind {
        ClaimKind::Win => {
            if is_furiten {
                return Err(RuleViolationReason::Furiten.into());
            }
            let result = score_hand(&hand.with_tile(tile), ctx, rule)?;
            if !result.is_valid {
                return Err(RuleViolationReason::BelowMinimumFaan {
                    faan: result.total_faan,
                    minimum: rule.min_faan,
                }
                .into());
            }
            score = Some(result);
        }
        ClaimKind::Chow if seat_distance(discarder, seat) != 1 => {
            return Err(RuleViolationReason::ChowNotFromPreviousSeat.into());
        }
        ClaimKind::Pung | ClaimKind::Kong | ClaimKind::Chow => {}
    }

    let claim = Claim {
        kind: request.kind,
        seat,
        tile,
        priority: request.kind.priority(),
        distance: seat_distance(discarder, seat),
        consumed,
    };
    // Shape check for meld claims.
    claim.to_meld(discarder)?;
    Ok((claim, score))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimResponse {
    Claim(Claim),
    Pass,
}

/// Responses collected for one discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimWindow {
    pub discarder: u8,
    pub tile: Tile,
    pub turn: u32,
    /// Legal claims per seat, computed when the window opened.
    pub offers: [Vec<ClaimRequest>; 4],
    responses: [Option<ClaimResponse>; 4],
}

impl ClaimWindow {
    pub fn new(discarder: u8, tile: Tile, turn: u32, offers: [Vec<ClaimRequest>; 4]) -> Self {
        Self {
            discarder,
            tile,
            turn,
            offers,
            responses: Default::default(),
        }
    }

    pub fn has_responded(&self, seat: u8) -> bool {
        self.responses[seat as usize].is_some()
    }

    /// Fails without recording if the seat is the discarder or already answered.
    pub fn check_can_respond(&self, seat: u8) -> EngineResult<()> {
        if seat == self.discarder {
            return Err(InvalidMoveReason::OwnDiscard.into());
        }
        if self.has_responded(seat) {
            return Err(InvalidMoveReason::AlreadyResponded.into());
        }
        Ok(())
    }

    pub fn record(&mut self, seat: u8, response: ClaimResponse) -> EngineResult<()> {
        self.check_can_respond(seat)?;
        debug!("seat {} responded to discard {}: {:?}", seat, self.tile, response);
        self.responses[seat as usize] = Some(response);
        Ok(())
    }

    /// Every seat except the discarder has answered.
    pub fn is_complete(&self) -> bool {
        (0..4u8)
            .filter(|&s| s != self.discarder)
            .all(|s| self.has_responded(s))
    }

    pub fn claims(&self) -> Vec<Claim> {
        self.responses
            .iter()
            .filter_map(|r| match r {
                Some(ClaimResponse::Claim(c)) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    /// The surviving claim. Seats that never answered count as passes.
    pub fn resolve(&self) -> Option<Claim> {
        resolve(&self.claims()).cloned()
    }

    /// Seats that were offered a win on this discard.
    pub fn win_eligible(&self) -> impl Iterator<Item = u8> + '_ {
        (0..4u8).filter(|&s| {
            self.offers[s as usize]
                .iter()
                .any(|o| o.kind == ClaimKind::Win)
        })
    }
}
