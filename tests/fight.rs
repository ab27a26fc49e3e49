use std::sync::Arc;

use versus::assets::Assets;
use versus::fight::{END_DELAY_MS, Fight, MatchOutcome};
use versus::fighter::{Pose, Status};
use versus::geometry::{Mask, Rect};
use versus::input::{ActionMap, InputState};

fn new_fight() -> Fight {
    let assets = Assets::placeholder();
    let id = assets.roster().next().map(|art| art.id.clone()).expect("placeholder roster");
    Fight::new(&assets, [&id, &id], [ActionMap::player_one(), ActionMap::player_two()], 0).unwrap()
}

fn place(fight: &mut Fight, player: u8, rect: Rect) {
    fight.player_mut(player).character.body.pose = Some(Pose {
        sprite: "test".into(),
        rect,
        flipped: false,
        mask: Arc::new(Mask::filled(rect.w as u32, rect.h as u32)),
    });
}

fn arm(fight: &mut Fight, player: u8, dmg: i32, at: u64) {
    let body = &mut fight.player_mut(player).character.body;
    body.status = Status::Attack;
    body.dmg = dmg;
    body.attack_time = Some(at);
}

const SPOT: Rect = Rect::new(500, 500, 50, 50);

#[test]
fn a_landed_hit_can_end_the_match() {
    let mut fight = new_fight();
    fight.player_mut(1).character.body.hp = 50;
    arm(&mut fight, 2, 60, 0);
    place(&mut fight, 1, SPOT);
    place(&mut fight, 2, SPOT);

    assert_eq!(fight.resolve_collisions(), Some(1));
    assert_eq!(fight.player(1).character.body.hp, -10);
    assert_eq!(fight.player(1).character.body.hit_count, 1);

    assert!(fight.check_end(100));
    assert!(fight.is_over());
    assert_eq!(fight.winner(), Some(2));
    assert_eq!(fight.loser(), Some(1));
    assert!(fight.player(2).has_won);
}

#[test]
fn earlier_attacker_wins_a_trade() {
    let mut fight = new_fight();
    arm(&mut fight, 1, 100, 10);
    arm(&mut fight, 2, 100, 20);
    place(&mut fight, 1, SPOT);
    place(&mut fight, 2, SPOT);

    assert_eq!(fight.resolve_collisions(), Some(2));
    assert_eq!(fight.player(2).character.body.hp, 900);
    assert_eq!(fight.player(1).character.body.hp, 1000);
}

#[test]
fn simultaneous_attacks_cancel_out() {
    let mut fight = new_fight();
    arm(&mut fight, 1, 100, 10);
    arm(&mut fight, 2, 100, 10);
    place(&mut fight, 1, SPOT);
    place(&mut fight, 2, SPOT);
    assert_eq!(fight.resolve_collisions(), None);
}

#[test]
fn guarding_blocks_the_hit() {
    let mut fight = new_fight();
    arm(&mut fight, 1, 100, 10);
    fight.player_mut(2).character.body.status = Status::Guard;
    place(&mut fight, 1, SPOT);
    place(&mut fight, 2, SPOT);
    assert_eq!(fight.resolve_collisions(), None);
    assert_eq!(fight.player(2).character.body.hp, 1000);
}

#[test]
fn attacks_need_overlapping_poses() {
    let mut fight = new_fight();
    arm(&mut fight, 1, 100, 10);
    place(&mut fight, 1, SPOT);
    place(&mut fight, 2, Rect::new(800, 500, 50, 50));
    assert_eq!(fight.resolve_collisions(), None);
}

#[test]
fn combo_feeds_the_score() {
    let mut fight = new_fight();
    fight.player_mut(2).character.body.hit_count = 2;
    for _ in 0..3 {
        fight.update_scores();
    }
    let p1 = fight.player(1);
    assert_eq!(p1.combo, 2);
    assert_eq!(p1.max_combo, 2);
    // 3 * 0.2 * 2 = 1.2
    assert_eq!(p1.score(), 1);
    assert_eq!(fight.player(2).score(), 0);

    fight.player_mut(2).character.body.hit_count = 0;
    fight.update_scores();
    assert_eq!(fight.player(1).combo, 0);
    assert_eq!(fight.player(1).max_combo, 2);
}

#[test]
fn small_combos_add_up_between_ticks() {
    let mut fight = new_fight();
    fight.player_mut(2).character.body.hit_count = 1;
    for _ in 0..10 {
        fight.update_scores();
    }
    // 10 * 0.2 * 1 = 2
    assert_eq!(fight.player(1).score(), 2);
}

#[test]
fn player_two_is_checked_first_on_a_double_knockout() {
    let mut fight = new_fight();
    fight.player_mut(1).character.body.hp = 0;
    fight.player_mut(2).character.body.hp = -5;
    assert!(fight.check_end(0));
    assert_eq!(fight.winner(), Some(1));
}

#[test]
fn the_end_banner_holds_before_leaving() {
    let mut fight = new_fight();
    assert!(!fight.ready_to_leave(10_000));
    fight.player_mut(2).character.body.hp = 0;
    assert!(fight.check_end(100));
    assert!(!fight.ready_to_leave(100 + END_DELAY_MS));
    assert!(fight.ready_to_leave(100 + END_DELAY_MS + 1));
}

#[test]
fn fighters_stay_on_stage() {
    let mut fight = new_fight();
    fight.player_mut(1).character.body.pos.x = -50.0;
    fight.clamp_positions();
    assert_eq!(fight.player(1).character.body.pos.x, 0.0);
}

#[test]
fn quiet_ticks_leave_the_match_running() {
    let mut fight = new_fight();
    let input = InputState::new();
    for t in 0..10 {
        assert_eq!(fight.tick(&input, t * 16).unwrap(), None);
    }
    assert!(!fight.is_over());
    assert!(fight.player(1).character.pose().is_some());
    assert!(fight.player(2).character.pose().is_some());
}

#[test]
fn outcome_survives_the_persist_map() {
    let mut fight = new_fight();
    fight.player_mut(1).character.body.hp = 0;
    fight.check_end(0);
    let outcome = fight.outcome();
    assert_eq!(outcome.players.len(), 2);
    assert_eq!(outcome.players[0].player, 1);
    assert_eq!(outcome.winner, Some(2));
    assert_eq!(outcome.loser(), Some(1));
    assert!(outcome.player(2).is_some_and(|p| p.won));

    let value = serde_json::to_value(&outcome).unwrap();
    let back: MatchOutcome = serde_json::from_value(value).unwrap();
    assert_eq!(back, outcome);
}
