//! Match runner.
//!
//! [`GameRunner`] plays a full match of several rounds on top of
//! [`hkmj_engine::GameState`]: it asks an [`ActionSelector`] for each
//! seat's choice, collects every seat's answer to a claim window before
//! resolving it, and rotates the deal between rounds.

use hkmj_engine::{
    Action, ActionType, EngineError, EngineResult, GameOutcome, GameRule, GameState, Phase,
    PlayerSetup, RoundSetup, Wind,
};
use log::{debug, info, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::seeding::{policy_rng, round_wall_seed, seed_from_u64, SessionRng};

/// Trait for action selection policies.
pub trait ActionSelector {
    /// Select one of `legal_actions` for `seat`. The runner never calls this
    /// with an empty slice.
    fn select_action(&mut self, seat: u8, legal_actions: &[Action]) -> Action;
}

/// Always picks the first legal action: wins when offered, claims whatever
/// it can, otherwise discards its lowest tile.
pub struct FirstActionSelector;

impl ActionSelector for FirstActionSelector {
    fn select_action(&mut self, _seat: u8, legal_actions: &[Action]) -> Action {
        legal_actions[0].clone()
    }
}

/// Uniform choice among the legal actions, one RNG per seat.
pub struct RandomSelector {
    rngs: [ChaCha8Rng; 4],
}

impl RandomSelector {
    pub fn new(match_seed: &[u8; 32]) -> Self {
        Self {
            rngs: std::array::from_fn(|seat| policy_rng(match_seed, seat as u8)),
        }
    }

    pub fn from_u64(seed: u64) -> Self {
        Self::new(&seed_from_u64(seed))
    }
}

impl ActionSelector for RandomSelector {
    fn select_action(&mut self, seat: u8, legal_actions: &[Action]) -> Action {
        let rng = &mut self.rngs[seat as usize % 4];
        legal_actions[rng.random_range(0..legal_actions.len())].clone()
    }
}

/// How long a match runs and who sits at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub rule: GameRule,
    pub names: [String; 4],
    /// Prevailing winds to play through: 1 is an East-only match, 4 a full one.
    pub winds: u8,
    /// Cap on rounds, dealer repeats included.
    pub max_rounds: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rule: GameRule::default_hk(),
            names: ["East", "South", "West", "North"].map(String::from),
            winds: 1,
            max_rounds: 16,
        }
    }
}

/// Result of one finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub index: u32,
    pub dealer: u8,
    pub prevailing_wind: Wind,
    pub outcome: Option<GameOutcome>,
    pub deltas: [i32; 4],
    pub scores: [i32; 4],
    pub actions: u32,
}

pub const MAX_STEPS: u32 = 50_000;

/// Runs a complete match with proper phase handling.
pub struct GameRunner {
    state: GameState,
    config: MatchConfig,
    match_seed: [u8; 32],
    history: Vec<RoundSummary>,
    total_actions: u32,
    round_actions: u32,
    rounds_played: u32,
    /// Times the deal has passed to the next seat.
    deal_passes: u32,
    finished: bool,
}

impl GameRunner {
    /// Create a runner and deal the first round. `None` draws a seed from
    /// the thread RNG.
    pub fn new(seed: Option<u64>, config: MatchConfig) -> EngineResult<Self> {
        let match_seed = match seed {
            Some(seed) => seed_from_u64(seed),
            None => rand::rng().random(),
        };
        Self::with_match_seed(match_seed, config)
    }

    /// Create a runner seeded from the next match of a session.
    pub fn new_with_session(session: &mut SessionRng, config: MatchConfig) -> EngineResult<Self> {
        Self::with_match_seed(session.next_match_seed(), config)
    }

    pub fn with_match_seed(match_seed: [u8; 32], config: MatchConfig) -> EngineResult<Self> {
        let players = std::array::from_fn(|i| {
            PlayerSetup::new(config.names[i].clone(), config.rule.starting_score)
        });
        let state = Self::deal_round(&match_seed, &config, players, 0, RoundSetup::default(), false)?;
        Ok(Self {
            state,
            config,
            match_seed,
            history: Vec::new(),
            total_actions: 0,
            round_actions: 0,
            rounds_played: 1,
            deal_passes: 0,
            finished: false,
        })
    }

    fn deal_round(
        match_seed: &[u8; 32],
        config: &MatchConfig,
        players: [PlayerSetup; 4],
        index: u32,
        setup: RoundSetup,
        log_events: bool,
    ) -> EngineResult<GameState> {
        let mut state = GameState::start_round(
            players,
            config.rule,
            Some(round_wall_seed(match_seed, index)),
            setup,
        )?;
        if !log_events {
            state.skip_event_log = true;
            state.events.clear();
        }
        Ok(state)
    }

    pub fn is_done(&self) -> bool {
        self.finished
    }

    pub fn total_actions(&self) -> u32 {
        self.total_actions
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn scores(&self) -> [i32; 4] {
        self.state.scores()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[RoundSummary] {
        &self.history
    }

    pub fn match_seed(&self) -> &[u8; 32] {
        &self.match_seed
    }

    /// Record every round's events from here on.
    pub fn enable_event_log(&mut self) {
        self.state.skip_event_log = false;
    }
}

impl GameRunner {
    /// Advance the match by one step. Returns false once the match is over.
    pub fn step_once(&mut self, selector: &mut dyn ActionSelector) -> EngineResult<bool> {
        if self.finished {
            return Ok(false);
        }
        if self.total_actions >= MAX_STEPS {
            warn!("match stopped after {} actions", self.total_actions);
            self.finished = true;
            return Ok(false);
        }

        match self.state.phase {
            Phase::Ended => {
                self.next_round()?;
                return Ok(!self.finished);
            }
            Phase::Playing => {
                let seat = self.state.current_seat;
                let legal = self.state.legal_actions(seat);
                if legal.is_empty() {
                    warn!("seat {} has no legal action while playing", seat);
                    self.finished = true;
                    return Ok(false);
                }
                let chosen = selector.select_action(seat, &legal);
                self.apply(&chosen)?;
            }
            Phase::Claiming => {
                for seat in 0..4u8 {
                    let legal = self.state.legal_actions(seat);
                    if legal.is_empty() {
                        continue;
                    }
                    let chosen = selector.select_action(seat, &legal);
                    self.apply(&chosen)?;
                }
                self.state.resolve_claims()?;
            }
            Phase::Waiting | Phase::Dealing => {
                return Err(hkmj_engine::InvalidMoveReason::WrongPhase.into());
            }
        }
        self.total_actions += 1;
        self.round_actions += 1;
        Ok(true)
    }

    /// Play until the match ends.
    pub fn run_to_completion(&mut self, selector: &mut dyn ActionSelector) -> EngineResult<()> {
        while self.step_once(selector)? {}
        Ok(())
    }

    /// Hand one chosen action to the engine. A wall running out ends the
    /// round inside the engine and is not an error here.
    fn apply(&mut self, action: &Action) -> EngineResult<()> {
        let seat = action.actor;
        let result = match action.action_type {
            ActionType::Draw => self.state.draw().map(drop),
            ActionType::Discard => match action.tile {
                Some(tile) => self.state.discard(seat, tile),
                None => Err(hkmj_engine::InvalidMoveReason::TileNotInHand.into()),
            },
            ActionType::ConcealedKong => self.state.declare_kong(seat, &action.consume_tiles).map(drop),
            ActionType::PromotedKong => match action.tile {
                Some(tile) => self.state.declare_kong(seat, &[tile]).map(drop),
                None => Err(hkmj_engine::InvalidMoveReason::TileNotInHand.into()),
            },
            ActionType::SelfWin => self.state.declare_self_win(seat).map(drop),
            ActionType::Pass => self.state.pass_claim(seat),
            ActionType::Win | ActionType::Pung | ActionType::Kong | ActionType::Chow => {
                match action.to_claim_request() {
                    Some(request) => self.state.submit_claim(seat, request),
                    None => Err(hkmj_engine::InvalidMoveReason::WrongPhase.into()),
                }
            }
        };
        match result {
            Err(EngineError::WallExhausted(wall)) if self.state.is_done() => {
                debug!("round {} ran out of {:?} wall", self.rounds_played, wall);
                Ok(())
            }
            other => other,
        }
    }

    /// Close the finished round, rotate the deal and start the next one,
    /// or mark the match finished.
    fn next_round(&mut self) -> EngineResult<()> {
        let outcome = self.state.outcome.clone();
        let deltas = match &outcome {
            Some(GameOutcome::Win(record)) => record.deltas,
            _ => [0; 4],
        };
        self.history.push(RoundSummary {
            index: self.rounds_played - 1,
            dealer: self.state.dealer,
            prevailing_wind: self.state.prevailing_wind,
            outcome: outcome.clone(),
            deltas,
            scores: self.state.scores(),
            actions: self.round_actions,
        });
        self.round_actions = 0;

        let mut dealer = self.state.dealer;
        let dealer_keeps = match &outcome {
            Some(GameOutcome::Win(record)) => record.winner == dealer,
            _ => true,
        };
        if !dealer_keeps {
            dealer = (dealer + 1) % 4;
            self.deal_passes += 1;
        }

        let winds_done = self.deal_passes / 4;
        if winds_done >= self.config.winds as u32 || self.rounds_played >= self.config.max_rounds {
            info!(
                "match over after {} rounds, scores {:?}",
                self.rounds_played,
                self.state.scores()
            );
            self.finished = true;
            return Ok(());
        }

        let setup = RoundSetup {
            dealer,
            prevailing_wind: Wind::from(winds_done as u8),
            round: u8::try_from(self.rounds_played).unwrap_or(u8::MAX),
        };
        let players = std::array::from_fn(|i| {
            let p = &self.state.players[i];
            PlayerSetup::new(p.name.clone(), p.score)
        });
        let log_events = !self.state.skip_event_log;
        self.state = Self::deal_round(
            &self.match_seed,
            &self.config,
            players,
            self.rounds_played,
            setup,
            log_events,
        )?;
        self.rounds_played += 1;
        debug!(
            "round {} dealt, dealer {} prevailing {:?}",
            self.rounds_played, dealer, setup.prevailing_wind
        );
        Ok(())
    }
}
