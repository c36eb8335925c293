#[cfg(test)]
mod unit_tests {
    use crate::action::{ActionType, Phase, TurnStage};
    use crate::claims::{ClaimKind, ClaimRequest};
    use crate::errors::{EngineError, InvalidMoveReason, RuleViolationReason};
    use crate::event::GameEvent;
    use crate::hand::MeldKind;
    use crate::parser::parse_tiles;
    use crate::rule::GameRule;
    use crate::state::player::PlayerSetup;
    use crate::state::wall::{verify_audit, WallKind, DEAD_WALL_SIZE};
    use crate::state::ClaimWinner;
    use crate::state::{GameOutcome, GameState, RoundSetup};
    use crate::tile::{kind_from_name, Tile, NUM_TILES};

    /// Wall that deals `hands` (13 tiles each, by seat), then yields `draws`
    /// from the live wall (the first one is the dealer's 14th) and `dead`
    /// from the back of the dead wall. Unused tiles fill the gaps.
    fn scripted_wall(dealer: u8, hands: [&str; 4], draws: &str, dead: &str) -> Vec<Tile> {
        let text = format!(
            "{} {} {} {} {} {}",
            hands[0], hands[1], hands[2], hands[3], draws, dead
        );
        let all = parse_tiles(&text).unwrap();
        let draw_count = parse_tiles(draws).unwrap().len();
        let (dealt, rest) = all.split_at(52);
        let (draw_tiles, dead_tiles) = rest.split_at(draw_count);

        let mut slots: Vec<Option<Tile>> = vec![None; NUM_TILES];
        for r in 0..13 {
            for i in 0..4u8 {
                let seat = ((dealer + i) % 4) as usize;
                slots[r * 4 + i as usize] = Some(dealt[seat * 13 + r]);
            }
        }
        for (i, &t) in draw_tiles.iter().enumerate() {
            slots[52 + i] = Some(t);
        }
        for (i, &t) in dead_tiles.iter().enumerate() {
            slots[NUM_TILES - 1 - i] = Some(t);
        }
        let mut unused = (0..NUM_TILES as u8)
            .map(|id| Tile::new(id).unwrap())
            .filter(|t| !all.contains(t));
        slots
            .into_iter()
            .map(|s| s.unwrap_or_else(|| unused.next().unwrap()))
            .collect()
    }

    fn start(dealer: u8, hands: [&str; 4], draws: &str, dead: &str) -> GameState {
        let players = ["a", "b", "c", "d"].map(|n| PlayerSetup::new(n, 500));
        let setup = RoundSetup {
            dealer,
            ..RoundSetup::default()
        };
        let wall = scripted_wall(dealer, hands, draws, dead);
        GameState::start_with_wall(players, GameRule::default(), setup, wall).unwrap()
    }

    fn held(game: &GameState, seat: u8, name: &str) -> Tile {
        let kind = kind_from_name(name).unwrap();
        game.players[seat as usize].hand.tiles_of_kind(kind)[0]
    }

    /// Everyone still able to answer passes, then the window is resolved.
    fn pass_if_claiming(game: &mut GameState) {
        if game.phase != Phase::Claiming {
            return;
        }
        for seat in 0..4 {
            if game.legal_actions(seat).iter().any(|a| a.action_type == ActionType::Pass) {
                game.pass_claim(seat).unwrap();
            }
        }
        assert!(game.claims_complete());
        assert!(game.resolve_claims().unwrap().is_none());
    }

    fn draw_and_discard(game: &mut GameState) {
        let seat = game.current_seat;
        let drawn = game.draw().unwrap().tile;
        game.discard(seat, drawn).unwrap();
        pass_if_claiming(game);
    }

    // Seat 2 waits on 5B for a full flush; the dealer holds a 5B.
    const FLUSH_TABLE: [&str; 4] = [
        "5b E E S S W W N N RED RED GREEN GREEN",
        "1c 3c 5c 7c 9c 1d 3d 5d 7d 9d WHITE WHITE WHITE",
        "123b 456b 789b 234b 5b",
        "2c 4c 6c 8c 2d 4d 6d 8d 2c 4c 6c 8c 2d",
    ];

    #[test]
    fn furiten_set_on_pass_and_cleared_by_own_discard() {
        let mut game = start(0, FLUSH_TABLE, "WHITE 9c 1c", "");
        let five = held(&game, 0, "5B");
        game.discard(0, five).unwrap();
        assert_eq!(game.phase, Phase::Claiming);
        let window = game.claim_window.clone().unwrap();
        assert!(window.offers[2].iter().any(|o| o.kind == ClaimKind::Win));

        pass_if_claiming(&mut game);
        let p2 = &game.players[2];
        assert!(p2.is_furiten());
        assert_eq!(p2.furiten.history.back().map(|d| (d.tile, d.turn)), Some((five, 0)));
        assert!(game
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::Furiten { seat: 2, .. })));

        // Seat 1 draws 9C and throws it; nobody can use it.
        assert_eq!(game.current_seat, 1);
        draw_and_discard(&mut game);
        assert!(game.players[2].is_furiten());

        // Seat 2's own discard clears it.
        assert_eq!(game.current_seat, 2);
        draw_and_discard(&mut game);
        assert!(!game.players[2].is_furiten());
        assert_eq!(game.players[2].furiten.history.len(), 1);
    }

    #[test]
    fn furiten_seat_cannot_win_on_a_discard() {
        let mut game = start(0, FLUSH_TABLE, "WHITE 5b", "");
        let five = held(&game, 0, "5B");
        game.discard(0, five).unwrap();
        pass_if_claiming(&mut game);
        assert!(game.players[2].is_furiten());

        // Seat 1 draws the third 5B and discards it.
        let drawn = game.draw().unwrap().tile;
        game.discard(1, drawn).unwrap();
        assert_eq!(game.phase, Phase::Claiming);
        let offers = &game.claim_window.as_ref().unwrap().offers[2];
        assert!(offers.iter().all(|o| o.kind != ClaimKind::Win));
        assert!(offers.iter().any(|o| o.kind == ClaimKind::Chow));

        let before = game.public_state();
        assert_eq!(
            game.submit_claim(2, ClaimRequest::win()),
            Err(EngineError::from(RuleViolationReason::Furiten))
        );
        assert_eq!(game.public_state(), before);
    }

    #[test]
    fn win_beats_pung_from_a_closer_seat() {
        let mut hands = FLUSH_TABLE;
        hands[1] = "55b 1c 3c 5c 7c 9c 1d 3d 5d 7d WHITE WHITE";
        hands[0] = "5b E E S S W W N N RED RED GREEN WHITE";
        let mut game = start(0, hands, "GREEN", "");
        let five = held(&game, 0, "5B");
        game.discard(0, five).unwrap();

        let pung = game
            .legal_actions(1)
            .into_iter()
            .find(|a| a.action_type == ActionType::Pung)
            .and_then(|a| a.to_claim_request())
            .unwrap();
        game.submit_claim(1, pung).unwrap();
        game.submit_claim(2, ClaimRequest::win()).unwrap();
        assert_eq!(
            game.pass_claim(2),
            Err(EngineError::from(InvalidMoveReason::AlreadyResponded))
        );
        game.pass_claim(3).unwrap();

        let winner = game.resolve_claims().unwrap().unwrap();
        assert_eq!((winner.seat, winner.kind), (2, ClaimKind::Win));
        let record = winner.win.unwrap();
        assert_eq!(record.score.total_faan, 7);
        assert_eq!(record.score.points, 16);
        // Dealer discarded, so the stake doubles.
        assert_eq!(record.deltas, [-32, 0, 32, 0]);
        assert_eq!(game.scores(), [468, 500, 532, 500]);
        assert_eq!(record.hand.tile_count(), record.hand.winning_size());

        assert_eq!(game.phase, Phase::Ended);
        assert!(matches!(game.outcome, Some(GameOutcome::Win(_))));
        assert!(!game.players[1].is_furiten());
        let audit = game.wall_audit().unwrap();
        assert!(verify_audit(&audit));
        assert_eq!(
            game.draw(),
            Err(EngineError::from(InvalidMoveReason::GameEnded))
        );
        assert!(game.check_tile_conservation());
    }

    #[test]
    fn dealer_self_draw_is_paid_double_by_everyone() {
        let hands = [
            "123b 456b 789b 234b 5b",
            "1c 3c 5c 7c 9c 1d 3d 5d 7d 9d WHITE WHITE WHITE",
            "E E E S S S W W W N N N RED",
            "2c 4c 6c 8c 2d 4d 6d 8d 2c 4c 6c 8c 2d",
        ];
        let mut game = start(0, hands, "5b", "");
        assert!(game
            .legal_actions(0)
            .iter()
            .any(|a| a.action_type == ActionType::SelfWin));
        let record = game.declare_self_win(0).unwrap();
        assert_eq!(record.discarder, None);
        assert_eq!(record.score.total_faan, 8);
        assert_eq!(record.score.points, 32);
        assert_eq!(record.deltas, [192, -64, -64, -64]);
        assert_eq!(game.scores().iter().sum::<i32>(), 2000);
    }

    #[test]
    fn below_minimum_self_draw_is_rejected_without_change() {
        let hands = [
            "123b 456c 789d 234b 5c",
            "1c 3c 5c 7c 9c 1d 3d 5d 7d 9d WHITE WHITE WHITE",
            "E E E S S S W W W N N N RED",
            "2c 4c 6c 8c 2d 4d 6d 8d 2c 4c 6c 8c 2d",
        ];
        let mut game = start(0, hands, "5c", "");
        let before = game.public_state();
        assert_eq!(
            game.declare_self_win(0),
            Err(EngineError::from(RuleViolationReason::BelowMinimumFaan {
                faan: 1,
                minimum: 3
            }))
        );
        assert_eq!(game.public_state(), before);
        assert_eq!(game.phase, Phase::Playing);
    }

    #[test]
    fn concealed_kong_draws_from_the_dead_wall_only() {
        let hands = [
            "E E E E S S W W N N RED RED GREEN",
            "1c 3c 5c 7c 9c 1d 3d 5d 7d 9d WHITE WHITE WHITE",
            "123b 456b 789b 234b 5b",
            "2c 4c 6c 8c 2d 4d 6d 8d 2c 4c 6c 8c 2d",
        ];
        let mut game = start(0, hands, "GREEN", "WHITE");
        let live_before = game.wall.live_pointer();
        let easts = game.players[0]
            .hand
            .tiles_of_kind(kind_from_name("E").unwrap());
        assert!(game
            .legal_actions(0)
            .iter()
            .any(|a| a.action_type == ActionType::ConcealedKong));

        let outcome = game.declare_kong(0, &easts).unwrap();
        assert_eq!(outcome.meld.kind, MeldKind::ConcealedKong);
        assert_eq!(outcome.replacement_tile.kind(), kind_from_name("WHITE").unwrap());
        assert!(!outcome.can_win_on_replacement);
        assert_eq!(game.wall.live_pointer(), live_before);
        assert_eq!(game.wall.dead_pointer(), 1);
        assert_eq!(game.wall.dead_remaining(), DEAD_WALL_SIZE - 1);
        let hand = &game.players[0].hand;
        assert_eq!(hand.tile_count(), hand.winning_size());
        assert_eq!(game.stage, TurnStage::NeedsDiscard);
        assert!(game.check_tile_conservation());
    }

    #[test]
    fn claimed_pung_skips_seats_and_can_be_promoted() {
        let hands = [
            "RED 1c 2c 3c 4c 5c 6c 7c 8c 9c 1d 2d 3d",
            "1b 2b 3b 4b 5b 6b 7b 8b 9b E E E S",
            "RED RED 1b 2b 3b 4b 5b 6b 7b 8b 9b S S",
            "1b 2b 3b 4b 5b 6b 7b 8b 9b W W W N",
        ];
        let mut game = start(0, hands, "4d 5d 6d 7d RED", "GREEN");
        let red = held(&game, 0, "RED");
        game.discard(0, red).unwrap();
        let live = game.wall.live_pointer();

        let reds = game.players[2]
            .hand
            .tiles_of_kind(kind_from_name("RED").unwrap());
        game.submit_claim(2, ClaimRequest::pung([reds[0], reds[1]])).unwrap();
        let winner = game.resolve_claims().unwrap().unwrap();
        assert_eq!(winner.kind, ClaimKind::Pung);
        assert_eq!(game.current_seat, 2);
        assert_eq!(game.stage, TurnStage::NeedsDiscard);
        assert_eq!(game.wall.live_pointer(), live);
        assert!(game.players[0].discards.is_empty());
        assert_eq!(
            game.declare_self_win(2),
            Err(EngineError::from(InvalidMoveReason::MustDrawFirst))
        );
        assert!(game.check_tile_conservation());

        let south = held(&game, 2, "S");
        game.discard(2, south).unwrap();
        pass_if_claiming(&mut game);
        for _ in 0..3 {
            draw_and_discard(&mut game);
        }

        assert_eq!(game.current_seat, 2);
        let drawn = game.draw().unwrap().tile;
        assert_eq!(drawn.kind(), kind_from_name("RED").unwrap());
        assert!(game
            .legal_actions(2)
            .iter()
            .any(|a| a.action_type == ActionType::PromotedKong));
        let outcome = game.declare_kong(2, &[drawn]).unwrap();
        assert_eq!(outcome.meld.kind, MeldKind::Kong);
        assert_eq!(outcome.meld.claimed_from, Some(0));
        assert_eq!(game.players[2].hand.melds.len(), 1);
        assert_eq!(game.wall.dead_pointer(), 1);
        assert!(game.check_tile_conservation());
    }

    #[test]
    fn chow_is_only_offered_to_the_next_seat() {
        let hands = [
            "5b E E S S W W N N RED RED GREEN GREEN",
            "34b 67b 1c 3c 5c 7c 9c 1d 3d WHITE WHITE",
            "34b 67b 1d 3d 5d 7d 9d S W N WHITE",
            "2c 4c 6c 8c 2d 4d 6d 8d 2c 4c 6c 8c 2d",
        ];
        let mut game = start(0, hands, "GREEN", "");
        let five = held(&game, 0, "5B");
        game.discard(0, five).unwrap();
        let window = game.claim_window.clone().unwrap();
        assert_eq!(
            window.offers[1].iter().filter(|o| o.kind == ClaimKind::Chow).count(),
            3
        );
        assert!(window.offers[2].is_empty());

        let chow = ClaimRequest::chow([held(&game, 2, "3B"), held(&game, 2, "4B")]);
        assert_eq!(
            game.submit_claim(2, chow),
            Err(EngineError::from(RuleViolationReason::ChowNotFromPreviousSeat))
        );
    }

    #[test]
    fn exhaustive_draw_when_the_live_wall_runs_out() {
        let mut game = GameState::start_game(["a", "b", "c", "d"], GameRule::default(), Some(2024)).unwrap();
        let dealer = game.current_seat;
        let first = game.players[dealer as usize].hand.concealed[0];
        game.discard(dealer, first).unwrap();
        pass_if_claiming(&mut game);

        loop {
            let seat = game.current_seat;
            match game.draw() {
                Ok(outcome) => {
                    game.discard(seat, outcome.tile).unwrap();
                    pass_if_claiming(&mut game);
                }
                Err(e) => {
                    assert_eq!(e, EngineError::WallExhausted(WallKind::Live));
                    break;
                }
            }
        }
        assert_eq!(game.outcome, Some(GameOutcome::ExhaustiveDraw(WallKind::Live)));
        assert_eq!(game.wall.live_remaining(), 0);
        assert_eq!(game.scores(), [500; 4]);
        assert!(game.check_tile_conservation());
        assert!(game.legal_actions(game.current_seat).is_empty());
        assert!(matches!(
            game.events().last(),
            Some(GameEvent::EndRound { .. })
        ));
        assert!(game.events_json().unwrap().contains("exhaustive_draw"));
    }

    #[test]
    fn early_resolution_treats_silence_as_pass() {
        let mut game = start(0, FLUSH_TABLE, "WHITE", "");
        let five = held(&game, 0, "5B");
        game.discard(0, five).unwrap();
        assert!(!game.claims_complete());
        assert!(game.resolve_claims().unwrap().is_none());
        assert_eq!(game.current_seat, 1);
        assert_eq!(game.stage, TurnStage::NeedsDraw);
        // Seat 2 never answered but was offered the win.
        assert!(game.players[2].is_furiten());
    }

    // Seat 2 holds three REDs; the dealer throws the fourth.
    const RED_KONG_TABLE: [&str; 4] = [
        "RED 1c 2c 3c 4c 5c 6c 7c 8c 9c 1d 2d 3d",
        "1b 2b 3b 4b 5b 6b 7b 8b 9b E E E S",
        "RED RED RED 1b 2b 3b 4b 5b 6b 7b 8b 9b S",
        "1b 2b 3b 4b 5b 6b 7b 8b 9b W W W N",
    ];

    fn claim_red_kong(game: &mut GameState) -> ClaimWinner {
        let red = held(game, 0, "RED");
        game.discard(0, red).unwrap();
        let reds = game.players[2]
            .hand
            .tiles_of_kind(kind_from_name("RED").unwrap());
        game.submit_claim(2, ClaimRequest::kong([reds[0], reds[1], reds[2]]))
            .unwrap();
        game.resolve_claims().unwrap().unwrap()
    }

    #[test]
    fn claimed_kong_replaces_from_the_dead_wall() {
        let mut game = start(0, RED_KONG_TABLE, "4d", "GREEN");
        let live = game.wall.live_pointer();
        let winner = claim_red_kong(&mut game);

        assert_eq!(winner.kind, ClaimKind::Kong);
        assert_eq!(winner.meld.as_ref().map(|m| m.kind), Some(MeldKind::Kong));
        assert_eq!(winner.meld.as_ref().and_then(|m| m.claimed_from), Some(0));
        let replacement = winner.replacement_tile.unwrap();
        assert_eq!(replacement.kind(), kind_from_name("GREEN").unwrap());
        assert!(!winner.can_win_on_replacement);

        assert_eq!(game.wall.live_pointer(), live);
        assert_eq!(game.wall.dead_pointer(), 1);
        assert_eq!((game.current_seat, game.stage), (2, TurnStage::NeedsDiscard));
        assert_eq!(game.drawn_tile, Some(replacement));
        let hand = &game.players[2].hand;
        assert_eq!(hand.tile_count(), 15);
        assert_eq!(hand.tile_count(), hand.winning_size());
        assert!(game.check_tile_conservation());
    }

    #[test]
    fn claimed_tile_is_no_longer_the_last_discard() {
        let mut game = start(0, RED_KONG_TABLE, "4d", "GREEN");
        let red = held(&game, 0, "RED");
        game.discard(0, red).unwrap();
        assert_eq!(game.public_state().last_discard, Some((0, red)));

        let reds = game.players[2]
            .hand
            .tiles_of_kind(kind_from_name("RED").unwrap());
        game.submit_claim(2, ClaimRequest::pung([reds[0], reds[1]])).unwrap();
        game.resolve_claims().unwrap().unwrap();
        assert_eq!(game.public_state().last_discard, None);
        assert!(game.public_state().players[0].discards.is_empty());
    }

    #[test]
    fn successful_chow_hands_the_turn_to_the_claimant() {
        let hands = [
            "5b E E S S W W N N RED RED GREEN GREEN",
            "34b 67b 1c 3c 5c 7c 9c 1d 3d WHITE WHITE",
            "34b 67b 1d 3d 5d 7d 9d S W N WHITE",
            "2c 4c 6c 8c 2d 4d 6d 8d 2c 4c 6c 8c 2d",
        ];
        let mut game = start(0, hands, "GREEN", "");
        let live = game.wall.live_pointer();
        let five = held(&game, 0, "5B");
        game.discard(0, five).unwrap();

        let chow = ClaimRequest::chow([held(&game, 1, "3B"), held(&game, 1, "4B")]);
        game.submit_claim(1, chow).unwrap();
        let winner = game.resolve_claims().unwrap().unwrap();
        assert_eq!((winner.seat, winner.kind), (1, ClaimKind::Chow));
        let meld = winner.meld.unwrap();
        assert_eq!(meld.kind, MeldKind::Chow);
        assert_eq!(meld.base_kind(), kind_from_name("3B").unwrap());
        assert_eq!(winner.replacement_tile, None);

        assert_eq!((game.current_seat, game.stage), (1, TurnStage::NeedsDiscard));
        assert_eq!(game.wall.live_pointer(), live);
        assert_eq!(game.drawn_tile, None);
        assert!(game.legal_actions(1).iter().all(|a| a.action_type != ActionType::Draw));
        let hand = &game.players[1].hand;
        assert_eq!(hand.tile_count(), hand.winning_size());

        let one = held(&game, 1, "1C");
        game.discard(1, one).unwrap();
        pass_if_claiming(&mut game);
        assert_eq!((game.current_seat, game.stage), (2, TurnStage::NeedsDraw));
        assert!(game.check_tile_conservation());
    }

    #[test]
    fn kong_on_an_empty_dead_wall_ends_the_round() {
        let hands = [
            "E E E E S S W W N N RED RED GREEN",
            "1c 3c 5c 7c 9c 1d 3d 5d 7d 9d WHITE WHITE WHITE",
            "123b 456b 789b 234b 5b",
            "2c 4c 6c 8c 2d 4d 6d 8d 2c 4c 6c 8c 2d",
        ];
        let mut game = start(0, hands, "GREEN", "");
        for _ in 0..DEAD_WALL_SIZE {
            game.wall.draw_replacement().unwrap();
        }
        let easts = game.players[0]
            .hand
            .tiles_of_kind(kind_from_name("E").unwrap());

        assert_eq!(
            game.declare_kong(0, &easts),
            Err(EngineError::WallExhausted(WallKind::Dead))
        );
        assert_eq!(game.outcome, Some(GameOutcome::ExhaustiveDraw(WallKind::Dead)));
        assert!(game.is_done());
        assert_eq!(game.scores(), [500; 4]);
        assert!(matches!(game.events().last(), Some(GameEvent::EndRound { .. })));
    }

    #[test]
    fn claimed_kong_on_an_empty_dead_wall_ends_the_round() {
        let mut game = start(0, RED_KONG_TABLE, "4d", "");
        for _ in 0..DEAD_WALL_SIZE {
            game.wall.draw_replacement().unwrap();
        }
        let winner = claim_red_kong(&mut game);
        assert_eq!(winner.kind, ClaimKind::Kong);
        assert_eq!(winner.replacement_tile, None);
        assert!(!winner.can_win_on_replacement);
        assert_eq!(game.outcome, Some(GameOutcome::ExhaustiveDraw(WallKind::Dead)));
        assert_eq!(game.phase, Phase::Ended);
        assert!(game.legal_actions(2).is_empty());
    }

    #[test]
    fn out_of_range_dealer_is_rejected() {
        let players = || ["a", "b", "c", "d"].map(|n| PlayerSetup::new(n, 500));
        let setup = RoundSetup {
            dealer: 4,
            ..RoundSetup::default()
        };
        assert_eq!(
            GameState::start_round(players(), GameRule::default(), Some(1), setup).err(),
            Some(EngineError::from(InvalidMoveReason::InvalidSeat))
        );
        let wall = crate::tile::full_set().to_vec();
        assert_eq!(
            GameState::start_with_wall(players(), GameRule::default(), setup, wall).err(),
            Some(EngineError::from(InvalidMoveReason::InvalidSeat))
        );
    }

    #[test]
    fn shared_view_never_reveals_the_next_tile() {
        let mut game = GameState::start_game(["a", "b", "c", "d"], GameRule::default(), Some(42)).unwrap();
        let first = game.players[0].hand.concealed[0];
        game.discard(0, first).unwrap();
        pass_if_claiming(&mut game);

        let next = game.wall.undrawn().next().unwrap();
        let view = game.wall();
        assert!(view.drawn_live(view.live_pointer()).unwrap_err().is_fatal());
        assert!(view.drawn_replacement(view.dead_pointer()).unwrap_err().is_fatal());

        let printed = format!("{:?}", game);
        assert!(printed.contains(view.wall_digest()));
        assert!(!printed.contains(&format!("{:?}", next)));

        assert_eq!(game.draw().unwrap().tile, next);
    }
}
