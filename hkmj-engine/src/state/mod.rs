use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::action::{Action, Phase, TurnStage};
use crate::claims::{legal_claims, validate_claim, ClaimKind, ClaimRequest, ClaimResponse, ClaimWindow};
use crate::errors::{EngineError, EngineResult, InvalidMoveReason, RuleViolationReason};
use crate::event::GameEvent;
use crate::furiten::FuritenAction;
use crate::hand::{Hand, Meld, MeldKind};
use crate::observation::{PrivateState, PublicState};
use crate::rule::GameRule;
use crate::score::{score_hand, settle, ScoreResult, WinContext};
use crate::tile::{Tile, Wind, NUM_TILES};

pub mod legal_actions;
pub mod player;
pub mod wall;
use legal_actions::GameStateLegalActions;
use player::{PlayerSetup, PlayerState};
use wall::{WallAudit, WallKind, WallState};

const NP: usize = 4;
const DEAL_SIZE: usize = 13;

/// Seating and wind for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundSetup {
    pub dealer: u8,
    pub prevailing_wind: Wind,
    /// Round number within a match, mixed into the wall seed.
    pub round: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub tile: Tile,
    /// Set when the drawn tile completes a hand worth at least the minimum.
    pub self_win_offer: Option<ScoreResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KongOutcome {
    pub meld: Meld,
    pub replacement_tile: Tile,
    pub can_win_on_replacement: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    pub winner: u8,
    /// The discarder, `None` on self-draw.
    pub discarder: Option<u8>,
    pub tile: Tile,
    pub score: ScoreResult,
    pub deltas: [i32; 4],
    pub hand: Hand,
}

/// The claim that survived resolution and what it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimWinner {
    pub seat: u8,
    pub kind: ClaimKind,
    pub tile: Tile,
    pub meld: Option<Meld>,
    /// Dead-wall tile drawn after a claimed kong. `None` if the dead wall ran out.
    pub replacement_tile: Option<Tile>,
    pub can_win_on_replacement: bool,
    pub win: Option<WinRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(WinRecord),
    ExhaustiveDraw(WallKind),
}

/// One round of Hong Kong mahjong. Every mutator validates before it
/// changes anything, so a rejected call leaves the state as it was.
#[derive(Debug)]
pub struct GameState {
    pub(crate) wall: WallState,
    pub players: [PlayerState; 4],
    pub rule: GameRule,

    pub phase: Phase,
    pub stage: TurnStage,
    pub current_seat: u8,
    pub dealer: u8,
    pub prevailing_wind: Wind,
    pub round: u8,
    /// Discards so far this round.
    pub turn: u32,

    pub last_discard: Option<(u8, Tile)>,
    pub claim_window: Option<ClaimWindow>,
    /// Tile taken this turn from either wall, if any.
    pub drawn_tile: Option<Tile>,
    pub outcome: Option<GameOutcome>,

    pub events: Vec<GameEvent>,
    pub skip_event_log: bool,
}

impl GameState {
    pub fn np(&self) -> usize {
        NP
    }

    /// Read-only view of the walls. Undrawn tiles stay behind the access barrier.
    pub fn wall(&self) -> &WallState {
        &self.wall
    }

    fn new(players: [PlayerSetup; 4], rule: GameRule, seed: Option<u64>, setup: RoundSetup) -> Self {
        let mut seat = 0u8;
        let players = players.map(|p| {
            let s = PlayerState::new(seat, setup.dealer, p);
            seat += 1;
            s
        });
        Self {
            wall: WallState::new(seed),
            players,
            rule,
            phase: Phase::Waiting,
            stage: TurnStage::NeedsDraw,
            current_seat: setup.dealer,
            dealer: setup.dealer,
            prevailing_wind: setup.prevailing_wind,
            round: setup.round,
            turn: 0,
            last_discard: None,
            claim_window: None,
            drawn_tile: None,
            outcome: None,
            events: Vec::with_capacity(256),
            skip_event_log: false,
        }
    }

    /// First round of a match: seat 0 deals, East prevailing, starting scores.
    pub fn start_game(names: [&str; 4], rule: GameRule, seed: Option<u64>) -> EngineResult<Self> {
        let players = names.map(|n| PlayerSetup::new(n, rule.starting_score));
        Self::start_round(players, rule, seed, RoundSetup::default())
    }

    /// Shuffle, split and deal a round.
    pub fn start_round(
        players: [PlayerSetup; 4],
        rule: GameRule,
        seed: Option<u64>,
        setup: RoundSetup,
    ) -> EngineResult<Self> {
        Self::seat_index(setup.dealer)?;
        let mut state = Self::new(players, rule, seed, setup);
        state.phase = Phase::Dealing;
        state.wall.shuffle(setup.round, setup.dealer);
        state.deal()?;
        Ok(state)
    }

    /// Deal from an explicit wall order instead of a shuffle.
    pub fn start_with_wall(
        players: [PlayerSetup; 4],
        rule: GameRule,
        setup: RoundSetup,
        tiles: Vec<Tile>,
    ) -> EngineResult<Self> {
        Self::seat_index(setup.dealer)?;
        let mut state = Self::new(players, rule, None, setup);
        state.phase = Phase::Dealing;
        state.wall.load_wall(tiles)?;
        state.deal()?;
        Ok(state)
    }

    fn deal(&mut self) -> EngineResult<()> {
        game_event!(
            self,
            GameEvent::StartRound {
                dealer: self.dealer,
                prevailing_wind: self.prevailing_wind,
                wall_digest: self.wall.wall_digest().to_string(),
                scores: self.scores(),
            }
        );

        for _ in 0..DEAL_SIZE {
            for i in 0..NP as u8 {
                let seat = (self.dealer + i) % NP as u8;
                let tile = self.wall.draw()?;
                self.players[seat as usize].hand.add(tile);
            }
        }
        game_event!(
            self,
            GameEvent::Deal {
                hands: std::array::from_fn(|i| self.players[i].hand.concealed.clone()),
            }
        );

        self.phase = Phase::Playing;
        self.current_seat = self.dealer;
        self.stage = TurnStage::NeedsDraw;
        let tile = self.wall.draw()?;
        self.take_drawn(self.dealer, tile);
        game_event!(self, GameEvent::Draw { seat: self.dealer, tile });

        info!(
            "round {} dealt, dealer {} prevailing {:?} digest {}",
            self.round, self.dealer, self.prevailing_wind, self.wall.wall_digest()
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Guards
    // -----------------------------------------------------------------------

    fn ensure_phase(&self, phase: Phase) -> EngineResult<()> {
        if self.phase == Phase::Ended {
            return Err(InvalidMoveReason::GameEnded.into());
        }
        if self.phase != phase {
            return Err(InvalidMoveReason::WrongPhase.into());
        }
        Ok(())
    }

    fn ensure_turn(&self, seat: u8, stage: TurnStage) -> EngineResult<()> {
        self.ensure_phase(Phase::Playing)?;
        if seat != self.current_seat {
            return Err(InvalidMoveReason::NotYourTurn.into());
        }
        if self.stage != stage {
            return Err(match stage {
                TurnStage::NeedsDraw => InvalidMoveReason::AlreadyDrawn,
                TurnStage::NeedsDiscard => InvalidMoveReason::MustDrawFirst,
            }
            .into());
        }
        Ok(())
    }

    fn seat_index(seat: u8) -> EngineResult<usize> {
        if (seat as usize) < NP {
            Ok(seat as usize)
        } else {
            Err(InvalidMoveReason::InvalidSeat.into())
        }
    }

    pub(crate) fn win_context(&self, seat: u8, is_self_draw: bool) -> WinContext {
        WinContext {
            is_self_draw,
            seat_wind: self.players[seat as usize].wind,
            prevailing_wind: self.prevailing_wind,
        }
    }

    // -----------------------------------------------------------------------
    // Turn actions
    // -----------------------------------------------------------------------

    /// Current seat draws from the live wall. An empty live wall ends the
    /// round as an exhaustive draw and reports `WallExhausted`.
    pub fn draw(&mut self) -> EngineResult<DrawOutcome> {
        let seat = self.current_seat;
        self.ensure_turn(seat, TurnStage::NeedsDraw)?;

        let tile = match self.wall.draw() {
            Ok(t) => t,
            Err(EngineError::WallExhausted(kind)) => {
                self.end_exhaustive(kind);
                return Err(EngineError::WallExhausted(kind));
            }
            Err(e) => return Err(e),
        };
        self.take_drawn(seat, tile);
        game_event!(self, GameEvent::Draw { seat, tile });
        debug!("seat {} drew {} ({} live left)", seat, tile, self.wall.live_remaining());

        Ok(DrawOutcome {
            tile,
            self_win_offer: self.self_win_score(seat),
        })
    }

    fn take_drawn(&mut self, seat: u8, tile: Tile) {
        self.players[seat as usize].hand.add(tile);
        self.drawn_tile = Some(tile);
        self.stage = TurnStage::NeedsDiscard;
    }

    /// Score of a self-draw win on the tile just drawn, if it is a legal win.
    pub fn self_win_score(&self, seat: u8) -> Option<ScoreResult> {
        self.drawn_tile?;
        let ctx = self.win_context(seat, true);
        score_hand(&self.players[seat as usize].hand, &ctx, &self.rule)
            .ok()
            .filter(|s| s.is_valid)
    }

    /// Discard `tile` and open the claim window. When nobody can claim
    /// anything the turn passes straight to the next seat.
    pub fn discard(&mut self, seat: u8, tile: Tile) -> EngineResult<()> {
        Self::seat_index(seat)?;
        self.ensure_turn(seat, TurnStage::NeedsDiscard)?;
        if !self.players[seat as usize].hand.contains(tile) {
            return Err(InvalidMoveReason::TileNotInHand.into());
        }

        let history_len = self.rule.furiten_history_len;
        let player = &mut self.players[seat as usize];
        player.hand.remove(tile)?;
        player.discards.push(tile);
        player.furiten.apply(FuritenAction::Discard, history_len);

        self.last_discard = Some((seat, tile));
        self.drawn_tile = None;
        game_event!(self, GameEvent::Discard { seat, tile });
        debug!("seat {} discarded {}", seat, tile);

        let offers: [Vec<ClaimRequest>; 4] = std::array::from_fn(|s| {
            let p = &self.players[s];
            legal_claims(
                &p.hand,
                s as u8,
                seat,
                tile,
                p.is_furiten(),
                &self.win_context(s as u8, false),
                &self.rule,
            )
        });
        let window = ClaimWindow::new(seat, tile, self.turn, offers);
        self.turn += 1;

        if window.offers.iter().all(Vec::is_empty) {
            self.advance_from(seat);
        } else {
            self.claim_window = Some(window);
            self.phase = Phase::Claiming;
        }
        Ok(())
    }

    fn advance_from(&mut self, discarder: u8) {
        self.claim_window = None;
        self.phase = Phase::Playing;
        self.current_seat = (discarder + 1) % NP as u8;
        self.stage = TurnStage::NeedsDraw;
    }

    // -----------------------------------------------------------------------
    // Claims
    // -----------------------------------------------------------------------

    fn open_window(&self) -> EngineResult<&ClaimWindow> {
        self.ensure_phase(Phase::Claiming)?;
        self.claim_window
            .as_ref()
            .ok_or_else(|| InvalidMoveReason::WrongPhase.into())
    }

    /// Register a claim on the current discard. Validated against the
    /// seat's actual hand; not committed until `resolve_claims`.
    pub fn submit_claim(&mut self, seat: u8, request: ClaimRequest) -> EngineResult<()> {
        Self::seat_index(seat)?;
        let window = self.open_window()?;
        window.check_can_respond(seat)?;
        let player = &self.players[seat as usize];
        let (claim, _) = validate_claim(
            &player.hand,
            seat,
            window.discarder,
            window.tile,
            &request,
            player.is_furiten(),
            &self.win_context(seat, false),
            &self.rule,
        )?;
        if let Some(w) = self.claim_window.as_mut() {
            w.record(seat, ClaimResponse::Claim(claim))?;
        }
        Ok(())
    }

    pub fn pass_claim(&mut self, seat: u8) -> EngineResult<()> {
        Self::seat_index(seat)?;
        self.open_window()?.check_can_respond(seat)?;
        if let Some(w) = self.claim_window.as_mut() {
            w.record(seat, ClaimResponse::Pass)?;
        }
        Ok(())
    }

    /// Every seat except the discarder has answered.
    pub fn claims_complete(&self) -> bool {
        self.claim_window.as_ref().is_some_and(ClaimWindow::is_complete)
    }

    /// Settle the claim window. Seats that have not answered count as
    /// passes. Returns the surviving claim, or `None` when play moves on
    /// to the seat after the discarder.
    pub fn resolve_claims(&mut self) -> EngineResult<Option<ClaimWinner>> {
        let window = self.open_window()?.clone();
        let survivor = window.resolve();
        let discarder = window.discarder;
        let tile = window.tile;

        // Everything fallible is computed before the state changes.
        let plan = match &survivor {
            None => None,
            Some(claim) => {
                let seat = claim.seat;
                let mut hand = self.players[seat as usize].hand.clone();
                let score = match claim.kind {
                    ClaimKind::Win => {
                        hand.add(tile);
                        Some(score_hand(&hand, &self.win_context(seat, false), &self.rule)?)
                    }
                    _ => {
                        for &t in &claim.consumed {
                            hand.remove(t)?;
                        }
                        None
                    }
                };
                let meld = claim.to_meld(discarder)?;
                if let Some(m) = &meld {
                    hand.melds.push(m.clone());
                }
                Some((claim.clone(), hand, meld, score))
            }
        };

        let history_len = self.rule.furiten_history_len;
        let winning_seat = survivor
            .as_ref()
            .filter(|c| c.kind == ClaimKind::Win)
            .map(|c| c.seat);
        for seat in window.win_eligible().filter(|&s| Some(s) != winning_seat) {
            self.players[seat as usize].furiten.apply(
                FuritenAction::DeclineWin {
                    tile,
                    turn: window.turn,
                },
                history_len,
            );
            game_event!(
                self,
                GameEvent::Furiten {
                    seat,
                    tile,
                    turn: window.turn
                }
            );
            debug!("seat {} is furiten after passing on {}", seat, tile);
        }
        self.claim_window = None;

        let Some((claim, hand, meld, score)) = plan else {
            self.advance_from(discarder);
            return Ok(None);
        };

        let seat = claim.seat;
        debug!("seat {} takes {} with {:?}", seat, tile, claim.kind);
        self.players[discarder as usize].discards.pop();
        self.last_discard = None;
        self.players[seat as usize].hand = hand;
        game_event!(
            self,
            GameEvent::Claim {
                seat,
                kind: claim.kind,
                target: discarder,
                tile,
                consumed: claim.consumed.clone(),
            }
        );

        let mut winner = ClaimWinner {
            seat,
            kind: claim.kind,
            tile,
            meld,
            replacement_tile: None,
            can_win_on_replacement: false,
            win: None,
        };

        if let Some(score) = score {
            winner.win = Some(self.finish_win(seat, Some(discarder), tile, score));
            return Ok(Some(winner));
        }

        self.phase = Phase::Playing;
        self.current_seat = seat;
        self.drawn_tile = None;
        self.stage = TurnStage::NeedsDiscard;

        if claim.kind == ClaimKind::Kong {
            winner.replacement_tile = self.draw_replacement(seat).ok();
            winner.can_win_on_replacement =
                winner.replacement_tile.is_some() && self.self_win_score(seat).is_some();
        }
        Ok(Some(winner))
    }

    // -----------------------------------------------------------------------
    // Kongs and self-draw wins
    // -----------------------------------------------------------------------

    /// Declare a kong on your own turn. Four concealed tiles make a
    /// concealed kong; a single tile matching one of your exposed pungs
    /// promotes it. Either way a replacement is drawn from the dead wall.
    pub fn declare_kong(&mut self, seat: u8, tiles: &[Tile]) -> EngineResult<KongOutcome> {
        Self::seat_index(seat)?;
        self.ensure_turn(seat, TurnStage::NeedsDiscard)?;
        if !tiles.iter().all(|&t| self.players[seat as usize].hand.contains(t)) {
            return Err(InvalidMoveReason::TileNotInHand.into());
        }

        let mut hand = self.players[seat as usize].hand.clone();
        let meld = match tiles {
            [_, _, _, _] => {
                let meld = Meld::new(MeldKind::ConcealedKong, tiles.to_vec(), None, None)?;
                for &t in tiles {
                    hand.remove(t)?;
                }
                hand.melds.push(meld.clone());
                meld
            }
            [tile] => {
                let idx = hand
                    .melds
                    .iter()
                    .position(|m| m.kind == MeldKind::Pung && m.base_kind() == tile.kind())
                    .ok_or(EngineError::RuleViolation(RuleViolationReason::MalformedMeld))?;
                let pung = &hand.melds[idx];
                let mut kong_tiles = pung.tiles.clone();
                kong_tiles.push(*tile);
                let meld = Meld::new(MeldKind::Kong, kong_tiles, pung.claimed_from, pung.called_tile)?;
                hand.remove(*tile)?;
                hand.melds[idx] = meld.clone();
                meld
            }
            _ => return Err(RuleViolationReason::MalformedMeld.into()),
        };

        self.players[seat as usize].hand = hand;
        match meld.kind {
            MeldKind::ConcealedKong => {
                let t = [meld.tiles[0], meld.tiles[1], meld.tiles[2], meld.tiles[3]];
                game_event!(self, GameEvent::ConcealedKong { seat, tiles: t });
            }
            _ => {
                let tile = tiles[0];
                game_event!(self, GameEvent::PromotedKong { seat, tile });
            }
        }
        debug!("seat {} declared {:?} of {}", seat, meld.kind, meld.base_kind());

        let replacement_tile = self.draw_replacement(seat)?;
        Ok(KongOutcome {
            meld,
            replacement_tile,
            can_win_on_replacement: self.self_win_score(seat).is_some(),
        })
    }

    /// Draw from the back of the dead wall. Exhaustion ends the round.
    fn draw_replacement(&mut self, seat: u8) -> EngineResult<Tile> {
        match self.wall.draw_replacement() {
            Ok(tile) => {
                self.take_drawn(seat, tile);
                game_event!(self, GameEvent::ReplacementDraw { seat, tile });
                Ok(tile)
            }
            Err(EngineError::WallExhausted(kind)) => {
                self.end_exhaustive(kind);
                Err(EngineError::WallExhausted(kind))
            }
            Err(e) => Err(e),
        }
    }

    /// Win on the tile just drawn (live or replacement). Furiten does not apply.
    pub fn declare_self_win(&mut self, seat: u8) -> EngineResult<WinRecord> {
        Self::seat_index(seat)?;
        self.ensure_turn(seat, TurnStage::NeedsDiscard)?;
        let tile = self
            .drawn_tile
            .ok_or(EngineError::InvalidMove(InvalidMoveReason::MustDrawFirst))?;
        let ctx = self.win_context(seat, true);
        let score = score_hand(&self.players[seat as usize].hand, &ctx, &self.rule)?;
        if !score.is_valid {
            return Err(RuleViolationReason::BelowMinimumFaan {
                faan: score.total_faan,
                minimum: self.rule.min_faan,
            }
            .into());
        }
        Ok(self.finish_win(seat, None, tile, score))
    }

    // -----------------------------------------------------------------------
    // Round end
    // -----------------------------------------------------------------------

    fn finish_win(&mut self, winner: u8, discarder: Option<u8>, tile: Tile, score: ScoreResult) -> WinRecord {
        let deltas = settle(winner, discarder, self.dealer, score.points, &self.rule);
        for (p, d) in self.players.iter_mut().zip(deltas) {
            p.score += d;
        }
        let record = WinRecord {
            winner,
            discarder,
            tile,
            score,
            deltas,
            hand: self.players[winner as usize].hand.clone(),
        };
        game_event!(
            self,
            GameEvent::Win {
                seat: winner,
                target: discarder,
                tile,
                faan: record.score.total_faan,
                points: record.score.points,
            }
        );
        game_event!(
            self,
            GameEvent::EndRound {
                deltas,
                scores: self.scores(),
            }
        );
        info!(
            "seat {} wins on {} ({} faan, {} points) deltas {:?}",
            winner, tile, record.score.total_faan, record.score.points, deltas
        );
        self.outcome = Some(GameOutcome::Win(record.clone()));
        self.phase = Phase::Ended;
        self.claim_window = None;
        record
    }

    fn end_exhaustive(&mut self, wall: WallKind) {
        game_event!(self, GameEvent::ExhaustiveDraw { wall });
        game_event!(
            self,
            GameEvent::EndRound {
                deltas: [0; 4],
                scores: self.scores(),
            }
        );
        info!("round {} ends in an exhaustive draw ({:?} wall)", self.round, wall);
        self.outcome = Some(GameOutcome::ExhaustiveDraw(wall));
        self.phase = Phase::Ended;
        self.claim_window = None;
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn scores(&self) -> [i32; 4] {
        std::array::from_fn(|i| self.players[i].score)
    }

    pub fn public_state(&self) -> PublicState {
        PublicState::from_game(self)
    }

    pub fn private_state(&self, seat: u8) -> EngineResult<PrivateState> {
        Self::seat_index(seat)?;
        Ok(PrivateState::from_game(self, seat))
    }

    /// Actions `seat` may take right now.
    #[inline]
    pub fn legal_actions(&self, seat: u8) -> Vec<Action> {
        self.collect_legal_actions(seat)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn events_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }

    /// Salt and full tile order, available only once the round has ended.
    pub fn wall_audit(&self) -> Option<WallAudit> {
        self.is_done().then(|| self.wall.audit())
    }

    /// True when hands, melds, discards and the undrawn walls together hold
    /// each of the 136 tiles exactly once.
    pub fn check_tile_conservation(&self) -> bool {
        let mut seen = [false; NUM_TILES];
        let mut count = 0usize;
        let placed = self
            .players
            .iter()
            .flat_map(|p| p.hand.all_tiles().chain(p.discards.iter().copied()))
            .chain(self.wall.undrawn());
        for t in placed {
            if std::mem::replace(&mut seen[t.id() as usize], true) {
                return false;
            }
            count += 1;
        }
        count == NUM_TILES
    }
}
