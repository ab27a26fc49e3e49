use serde_json::Value;
use versus::Context;
use versus::fight::{MatchOutcome, PlayerResult};
use versus::input::{InputState, KeyCode};
use versus::renderer::DrawList;
use versus::screens::{CHAR1, CHAR2, PLAYERS, ScreenFlow, ScreenKind, UUID};
use versus::stack::{Millis, Persist};
use versus::store::UserId;

const STEP: Millis = 16;

struct Harness {
    ctx: Context,
    flow: ScreenFlow,
    input: InputState,
    now: Millis,
}

impl Harness {
    fn new() -> Self {
        let mut ctx = Context::headless();
        let flow = ScreenFlow::new(&mut ctx, 0).unwrap();
        Self { ctx, flow, input: InputState::new(), now: 0 }
    }

    fn at(root: ScreenKind, persist: Persist, mut ctx: Context) -> Self {
        let flow = ScreenFlow::starting_at(&mut ctx, root, persist, 0).unwrap();
        Self { ctx, flow, input: InputState::new(), now: 0 }
    }

    fn tick(&mut self) {
        self.now += STEP;
        self.flow.tick(&mut self.ctx, &self.input, self.now, STEP).unwrap();
        self.input.clear_frame_state();
    }

    fn settle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Tick until `kind` is on top. Returns the ticks it took.
    fn run_until(&mut self, kind: ScreenKind, limit: usize) -> Option<usize> {
        for n in 1..=limit {
            self.tick();
            if self.flow.active().unwrap() == kind {
                return Some(n);
            }
        }
        None
    }

    /// Press on one tick, release on the next.
    fn tap(&mut self, key: KeyCode) {
        self.input.press(key);
        self.tick();
        self.input.release(key);
        self.tick();
    }

    fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.input.type_char(ch);
        }
        self.tick();
    }

    fn sign_in(&mut self, username: &str, password: &str) {
        self.type_text(username);
        self.tap(KeyCode::Tab);
        self.type_text(password);
        self.tap(KeyCode::Tab);
        self.tap(KeyCode::KeyU);
    }

    fn persist(&self, kind: ScreenKind) -> &Persist {
        &self.flow.core(kind).unwrap().persist
    }
}

fn with_user(username: &str, password: &str) -> (Context, UserId) {
    let mut ctx = Context::headless();
    let id = ctx.store.create_user(username, password).unwrap();
    (ctx, id)
}

fn outcome() -> MatchOutcome {
    let result = |player: u8, won: bool| PlayerResult {
        player,
        char_id: "dangai".into(),
        name: "Ichigo".into(),
        score: if won { 12 } else { 3 },
        combo: 0,
        max_combo: if won { 3 } else { 1 },
        won,
    };
    MatchOutcome { players: vec![result(1, true), result(2, false)], winner: Some(1) }
}

#[test]
fn title_fades_into_the_main_menu() {
    let mut h = Harness::new();
    assert_eq!(h.flow.stack(), &[ScreenKind::Title]);

    h.input.release(KeyCode::Enter);
    h.tick();
    let ticks = h.run_until(ScreenKind::MainMenu, 12);
    assert!(ticks.is_some(), "main menu never reached");
    assert_eq!(h.flow.stack(), &[ScreenKind::MainMenu]);
    assert!(h.persist(ScreenKind::MainMenu).is_empty());
}

#[test]
fn other_keys_leave_the_title_alone() {
    let mut h = Harness::new();
    h.tap(KeyCode::KeyU);
    h.settle(20);
    assert_eq!(h.flow.active().unwrap(), ScreenKind::Title);
}

#[test]
fn main_menu_play_opens_character_select() {
    let mut h = Harness::at(ScreenKind::MainMenu, Persist::new(), Context::headless());
    h.settle(30);
    h.tap(KeyCode::KeyU);
    assert!(h.run_until(ScreenKind::CharSelect, 12).is_some());
}

#[test]
fn main_menu_quit_stops_the_flow() {
    let mut h = Harness::at(ScreenKind::MainMenu, Persist::new(), Context::headless());
    h.settle(30);
    h.tap(KeyCode::KeyS);
    h.tap(KeyCode::KeyS);
    h.tap(KeyCode::KeyU);
    h.tick();
    assert!(h.flow.is_quit());
}

#[test]
fn character_select_hands_both_picks_to_the_match() {
    let mut h = Harness::at(ScreenKind::CharSelect, Persist::new(), Context::headless());
    h.settle(10);
    h.input.press(KeyCode::KeyU);
    h.input.press(KeyCode::Digit1);
    h.tick();
    h.input.press(KeyCode::Enter);
    h.tick();
    h.input.release(KeyCode::KeyU);
    h.input.release(KeyCode::Digit1);
    h.input.release(KeyCode::Enter);

    assert!(h.run_until(ScreenKind::Match, 12).is_some());
    let persist = h.persist(ScreenKind::Match);
    assert_eq!(persist.get(CHAR1), Some(&Value::from("dangai")));
    assert_eq!(persist.get(CHAR2), Some(&Value::from("dangai")));
}

#[test]
fn exiting_from_pause_abandons_the_match() {
    let mut h = Harness::at(ScreenKind::Match, Persist::new(), Context::headless());
    h.settle(10);
    h.tap(KeyCode::Escape);
    h.tick();
    assert_eq!(h.flow.stack(), &[ScreenKind::Match, ScreenKind::Pause]);

    h.tap(KeyCode::KeyS);
    h.tap(KeyCode::KeyU);
    assert!(h.run_until(ScreenKind::MainMenu, 15).is_some());
    assert!(h.persist(ScreenKind::MainMenu).get(PLAYERS).is_none());
}

#[test]
fn back_from_pause_keeps_playing() {
    let mut h = Harness::at(ScreenKind::Match, Persist::new(), Context::headless());
    h.settle(10);
    h.tap(KeyCode::Backspace);
    h.tick();
    assert_eq!(h.flow.active().unwrap(), ScreenKind::Pause);

    h.tap(KeyCode::KeyU);
    h.settle(20);
    assert_eq!(h.flow.stack(), &[ScreenKind::Match]);
}

#[test]
fn stats_signs_in_through_the_login_overlay() {
    let (ctx, id) = with_user("ryuu", "hadouken1");
    let mut h = Harness::at(ScreenKind::Stats, Persist::new(), ctx);
    assert!(h.run_until(ScreenKind::Login, 20).is_some());
    assert_eq!(h.flow.stack(), &[ScreenKind::Stats, ScreenKind::Login]);

    h.sign_in("ryuu", "hadouken1");
    assert!(h.run_until(ScreenKind::Stats, 3).is_some());
    assert_eq!(h.flow.stack(), &[ScreenKind::Stats]);
    assert_eq!(h.persist(ScreenKind::Stats).get(UUID), Some(&Value::from(id)));

    let mut out = DrawList::new();
    h.flow.draw(&h.ctx, &mut out);
    assert!(out.contains_text("LEADERBOARD"));
    assert!(out.contains_text("WINS: 0"));
}

#[test]
fn wrong_password_keeps_the_overlay_open() {
    let (ctx, _) = with_user("ryuu", "hadouken1");
    let mut h = Harness::at(ScreenKind::Stats, Persist::new(), ctx);
    assert!(h.run_until(ScreenKind::Login, 20).is_some());

    h.sign_in("ryuu", "shoryuken1");
    h.settle(3);
    assert_eq!(h.flow.active().unwrap(), ScreenKind::Login);

    let mut out = DrawList::new();
    h.flow.draw(&h.ctx, &mut out);
    assert!(out.contains_text("INVALID CREDENTIALS"));
}

#[test]
fn cancelled_login_returns_to_the_main_menu() {
    let mut h = Harness::at(ScreenKind::Stats, Persist::new(), Context::headless());
    assert!(h.run_until(ScreenKind::Login, 20).is_some());
    h.tap(KeyCode::Escape);
    assert!(h.run_until(ScreenKind::MainMenu, 15).is_some());
}

#[test]
fn results_are_saved_once_per_signed_in_player() {
    let (ctx, id) = with_user("ryuu", "hadouken1");
    let mut persist = Persist::new();
    persist.insert(PLAYERS.into(), serde_json::to_value(outcome()).unwrap());
    let mut h = Harness::at(ScreenKind::End, persist, ctx);
    h.settle(10);

    // Player 1 is not signed in yet, so saving asks for a login first.
    h.tap(KeyCode::KeyU);
    assert!(h.run_until(ScreenKind::Login, 3).is_some());
    h.sign_in("ryuu", "hadouken1");
    assert!(h.run_until(ScreenKind::End, 3).is_some());

    h.tap(KeyCode::KeyU);
    let stats = h.ctx.store.get_stats(id).unwrap();
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.high_score, 12);
    assert_eq!(stats.max_combo, 3);
    assert_eq!(stats.games_played, 1);

    h.tap(KeyCode::KeyU);
    assert_eq!(h.ctx.store.get_stats(id).unwrap().games_played, 1);
}

#[test]
fn results_exit_returns_to_the_main_menu() {
    let mut persist = Persist::new();
    persist.insert(PLAYERS.into(), serde_json::to_value(outcome()).unwrap());
    let mut h = Harness::at(ScreenKind::End, persist, Context::headless());
    h.settle(10);
    h.tap(KeyCode::KeyS);
    h.tap(KeyCode::KeyU);
    assert!(h.run_until(ScreenKind::MainMenu, 12).is_some());
    assert!(h.persist(ScreenKind::MainMenu).get(PLAYERS).is_none());
}
