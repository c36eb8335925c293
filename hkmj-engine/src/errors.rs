use std::fmt;

use crate::state::wall::WallKind;

/// Why a move was rejected before any rule was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMoveReason {
    NotYourTurn,
    TileNotInHand,
    WrongPhase,
    MustDrawFirst,
    AlreadyDrawn,
    AlreadyResponded,
    OwnDiscard,
    ClaimNotHeld,
    GameEnded,
    /// Seat or dealer index outside 0..4.
    InvalidSeat,
}

impl fmt::Display for InvalidMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvalidMoveReason::NotYourTurn => "not your turn",
            InvalidMoveReason::TileNotInHand => "tile not in hand",
            InvalidMoveReason::WrongPhase => "action not allowed in the current phase",
            InvalidMoveReason::MustDrawFirst => "must draw before discarding",
            InvalidMoveReason::AlreadyDrawn => "already drew this turn",
            InvalidMoveReason::AlreadyResponded => "already responded to this discard",
            InvalidMoveReason::OwnDiscard => "cannot claim your own discard",
            InvalidMoveReason::ClaimNotHeld => "required tiles for the claim are not held",
            InvalidMoveReason::GameEnded => "game has ended",
            InvalidMoveReason::InvalidSeat => "seat index out of range",
        };
        f.write_str(s)
    }
}

/// Why a move that was well-formed still breaks a rule of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolationReason {
    BelowMinimumFaan { faan: u32, minimum: u32 },
    Furiten,
    MalformedMeld,
    NotAWinningHand,
    ChowNotFromPreviousSeat,
}

impl fmt::Display for RuleViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolationReason::BelowMinimumFaan { faan, minimum } => {
                write!(f, "hand scores {} faan, minimum is {}", faan, minimum)
            }
            RuleViolationReason::Furiten => f.write_str("player is furiten"),
            RuleViolationReason::MalformedMeld => f.write_str("malformed meld"),
            RuleViolationReason::NotAWinningHand => f.write_str("not a complete winning hand"),
            RuleViolationReason::ChowNotFromPreviousSeat => {
                f.write_str("chow may only be claimed from the previous seat's discard")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Wrong turn, tile not held, wrong phase. State is unchanged.
    InvalidMove(InvalidMoveReason),
    /// Below minimum faan, furiten, malformed meld. State is unchanged.
    RuleViolation(RuleViolationReason),
    /// A wall ran out. The state machine turns this into an exhaustive draw.
    WallExhausted(WallKind),
    /// A read at or beyond the draw pointer. Fatal for the request.
    InformationLeak { index: usize, pointer: usize },
    /// Tile notation could not be parsed.
    Parse { input: String, message: String },
}

impl EngineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InformationLeak { .. })
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidMove(reason) => write!(f, "Invalid move: {}", reason),
            EngineError::RuleViolation(reason) => write!(f, "Rule violation: {}", reason),
            EngineError::WallExhausted(wall) => write!(f, "Wall exhausted: {:?}", wall),
            EngineError::InformationLeak { index, pointer } => write!(
                f,
                "Information leak: read of index {} at or beyond pointer {}",
                index, pointer
            ),
            EngineError::Parse { input, message } => {
                write!(f, "Parse error on '{}': {}", input, message)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<InvalidMoveReason> for EngineError {
    fn from(reason: InvalidMoveReason) -> Self {
        EngineError::InvalidMove(reason)
    }
}

impl From<RuleViolationReason> for EngineError {
    fn from(reason: RuleViolationReason) -> Self {
        EngineError::RuleViolation(reason)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
