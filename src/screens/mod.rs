//! Screen flow: every screen is registered once, the stack machine moves
//! between them, and the controller turns each screen's flags into stack
//! transitions once per tick.

mod charselect;
mod end;
mod login;
mod mainmenu;
mod matchscreen;
mod pause;
mod stats;
mod title;

pub use charselect::CharSelect;
pub use end::End;
pub use login::Login;
pub use mainmenu::MainMenu;
pub use matchscreen::MatchScreen;
pub use pause::Pause;
pub use stats::Stats;
pub use title::Title;

use serde_json::Value;
use tracing::debug;

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::engine::Context;
use crate::error::StackError;
use crate::fade::{Progress, Transitioner};
use crate::geometry::Rect;
use crate::input::{Control, InputState, KeyEvent};
use crate::renderer::DrawList;
use crate::stack::{Millis, Persist, StackState, StateCore, StateMachine, Transition};

// ── Persistent data keys ─────────────────────────────────────────────────────

pub const CHAR1: &str = "CHAR1";
pub const CHAR2: &str = "CHAR2";
pub const PLAYERS: &str = "PLAYERS";
pub const EXIT_NOSAVE: &str = "EXIT_NOSAVE";
pub const UUID: &str = "UUID";
pub const PLAYER_NUMBER: &str = "P#";

// ── ScreenKind ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Title,
    MainMenu,
    CharSelect,
    Match,
    Pause,
    End,
    Login,
    Stats,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 8] = [
        ScreenKind::Title,
        ScreenKind::MainMenu,
        ScreenKind::CharSelect,
        ScreenKind::Match,
        ScreenKind::Pause,
        ScreenKind::End,
        ScreenKind::Login,
        ScreenKind::Stats,
    ];
}

/// Build the single instance of a screen.
pub fn build(kind: ScreenKind) -> Box<dyn Screen> {
    match kind {
        ScreenKind::Title => Box::new(Title::new()),
        ScreenKind::MainMenu => Box::new(MainMenu::new()),
        ScreenKind::CharSelect => Box::new(CharSelect::new()),
        ScreenKind::Match => Box::new(MatchScreen::new()),
        ScreenKind::Pause => Box::new(Pause::new()),
        ScreenKind::End => Box::new(End::new()),
        ScreenKind::Login => Box::new(Login::new()),
        ScreenKind::Stats => Box::new(Stats::new()),
    }
}

// ── Screen ───────────────────────────────────────────────────────────────────

pub trait Screen: StackState<ScreenKind, Context> {
    fn kind(&self) -> ScreenKind;

    /// One discrete key press or release, delivered before `update`.
    fn handle_event(&mut self, _ctx: &mut Context, _event: KeyEvent) -> Result<(), StackError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context, input: &InputState, now: Millis, dt: Millis) -> Result<(), StackError>;

    fn draw(&self, ctx: &Context, out: &mut DrawList);

    /// Overlays draw on top of the screen beneath them.
    fn is_overlay(&self) -> bool {
        false
    }
}

// ── ScreenFlow ───────────────────────────────────────────────────────────────

pub struct ScreenFlow {
    screens: StateMachine<ScreenKind, Box<dyn Screen>>,
    quit: bool,
}

impl ScreenFlow {
    /// Register every screen and start on the title.
    pub fn new(ctx: &mut Context, now: Millis) -> Result<Self, StackError> {
        Self::starting_at(ctx, ScreenKind::Title, Persist::new(), now)
    }

    pub fn starting_at(ctx: &mut Context, root: ScreenKind, persist: Persist, now: Millis) -> Result<Self, StackError> {
        let mut screens = StateMachine::from_factory(&ScreenKind::ALL, build);
        screens.start(ctx, root, persist, now)?;
        Ok(Self { screens, quit: false })
    }

    /// Events, then the requested transition, then the active screen's update.
    pub fn tick(&mut self, ctx: &mut Context, input: &InputState, now: Millis, dt: Millis) -> Result<(), StackError> {
        if self.quit {
            return Ok(());
        }
        for &event in &input.events {
            self.screens.top_mut()?.handle_event(ctx, event)?;
        }

        let request = self.screens.top()?.core().screen_request()?;
        match request {
            Transition::Quit => {
                debug!("quit requested");
                self.quit = true;
                return Ok(());
            }
            Transition::Stay => {}
            other => {
                let from = self.screens.peek()?;
                self.screens.apply(ctx, other, now)?;
                debug!(?from, to = ?self.screens.peek()?, stack = ?self.screens.keys(), "screen transition");
            }
        }

        self.screens.top_mut()?.update(ctx, input, now, dt)
    }

    /// Draw from the topmost opaque screen upward.
    pub fn draw(&self, ctx: &Context, out: &mut DrawList) {
        let keys = self.screens.keys();
        let opaque = keys
            .iter()
            .rposition(|&k| self.screens.get(k).is_some_and(|s| !s.is_overlay()))
            .unwrap_or(0);
        for &key in &keys[opaque..] {
            if let Some(screen) = self.screens.get(key) {
                screen.draw(ctx, out);
            }
        }
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn active(&self) -> Result<ScreenKind, StackError> {
        self.screens.peek()
    }

    /// Screen keys, bottom first.
    pub fn stack(&self) -> &[ScreenKind] {
        self.screens.keys()
    }

    pub fn screen(&self, kind: ScreenKind) -> Option<&dyn Screen> {
        self.screens.get(kind).map(|s| s.as_ref())
    }

    pub fn core(&self, kind: ScreenKind) -> Option<&StateCore<ScreenKind>> {
        self.screens.get(kind).map(|s| s.core())
    }

    /// Release every screen, top first.
    pub fn shutdown(&mut self, ctx: &mut Context) {
        self.screens.clear(ctx);
    }
}

// ── Shared screen helpers ────────────────────────────────────────────────────

/// Advance the screen's transition. Returns `true` when the animation used up
/// this tick; a finished exit raises `done`.
pub(crate) fn run_transition(core: &mut StateCore<ScreenKind>, fade: &mut Transitioner) -> bool {
    match fade.tick() {
        None => false,
        Some(Progress::Exited) => {
            core.done = true;
            true
        }
        Some(Progress::Running | Progress::Entered) => true,
    }
}

/// Fade out, then switch to `next`. Ignored while another animation runs.
pub(crate) fn leave_to(core: &mut StateCore<ScreenKind>, fade: &mut Transitioner, next: ScreenKind) {
    if fade.exit() {
        core.next = Some(next);
    }
}

/// Which player's control a key maps to, if any.
pub(crate) fn control_for(ctx: &Context, player: u8, event: KeyEvent) -> Option<Control> {
    ctx.config.controls(player).action_for(event.key)
}

pub(crate) fn screen_rect() -> Rect {
    Rect::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT)
}

/// A transition is running or has left the screen blacked out.
pub(crate) fn in_transition(fade: &Transitioner) -> bool {
    fade.is_active() || fade.overlay() > 0
}

/// Plain backdrop shown while a transition runs.
pub(crate) fn draw_transition(fade: &Transitioner, out: &mut DrawList) {
    out.sprite("bg", screen_rect());
    out.overlay(fade.overlay(), SCREEN_WIDTH, SCREEN_HEIGHT);
}

/// Natural size of a loaded image, zero when missing.
pub(crate) fn image_size(ctx: &Context, name: &str) -> (i32, i32) {
    ctx.assets.image(name).map_or((0, 0), |img| (img.width() as i32, img.height() as i32))
}

pub(crate) fn persist_u64(persist: &Persist, key: &str) -> Option<u64> {
    persist.get(key).and_then(Value::as_u64)
}

pub(crate) fn persist_str<'a>(persist: &'a Persist, key: &str) -> Option<&'a str> {
    persist.get(key).and_then(Value::as_str)
}
