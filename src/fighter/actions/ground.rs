use crate::assets::CharacterArt;
use crate::input::Control;
use crate::stack::{Millis, Persist, StackState, StateCore};

use super::{elapsed, show, strip, Strip};
use crate::fighter::{Action, ActionKind, Body, Facing, Status, MAX_SPEED};

pub const DASH_SPEED: f32 = 40.0;
pub const DASH_MS: Millis = 300;
pub const HURT_MS: Millis = 1000;
/// Sink per tick while hurt in mid-air.
pub const HURT_SINK: f32 = 3.0;

// ── Idle ─────────────────────────────────────────────────────────────────────

pub struct Idle {
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl Idle {
    pub fn new() -> Self {
        Self { core: StateCore::new(), frame: 0, strip: strip("stand", 0, 4, 4) }
    }
}

impl StackState<ActionKind, Body> for Idle {
    core_access!();

    fn startup(&mut self, body: &mut Body, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        body.status = Status::Ground;
    }

    fn resume(&mut self, body: &mut Body, persist: Persist, now: Millis) {
        self.core.reenter(persist, now);
        body.status = Status::Ground;
    }
}

impl Action for Idle {
    fn kind(&self) -> ActionKind {
        ActionKind::Idle
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn update(&mut self, body: &mut Body) {
        // Later checks take priority.
        let mut next = None;
        if body.is_held(Control::Left) || body.is_held(Control::Right) {
            next = Some(ActionKind::Walking);
        }
        if body.is_held(Control::Jump) {
            next = Some(ActionKind::Jumping);
        }
        if body.is_held(Control::Down) {
            next = Some(ActionKind::Guarding);
        }
        if body.is_held(Control::Dash) {
            next = Some(ActionKind::Dash);
        }
        if body.is_held(Control::Light) {
            next = Some(ActionKind::LightNeutral);
        }
        if let Some(next) = next {
            self.core.suspend(next);
        }
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        self.frame %= self.strip.len();
        show(body, art, &self.strip, self.frame);
        self.frame += 1;
    }
}

// ── Walking ──────────────────────────────────────────────────────────────────

pub struct Walking {
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl Walking {
    pub fn new() -> Self {
        Self { core: StateCore::new(), frame: 0, strip: strip("run", 0, 8, 2) }
    }
}

impl StackState<ActionKind, Body> for Walking {
    core_access!();

    fn cleanup(&mut self, _body: &mut Body) -> Persist {
        self.frame = 0;
        self.core.take_persist()
    }
}

impl Action for Walking {
    fn kind(&self) -> ActionKind {
        ActionKind::Walking
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn update(&mut self, body: &mut Body) {
        for (control, next) in [
            (Control::Jump, ActionKind::Jumping),
            (Control::Dash, ActionKind::Dash),
            (Control::Light, ActionKind::LightNeutral),
        ] {
            if body.is_held(control) {
                self.core.finish(next);
            }
        }

        let right = body.is_held(Control::Right);
        let left = body.is_held(Control::Left);
        if right {
            body.facing = Facing::Right;
            body.vel.x = MAX_SPEED;
        }
        if left {
            body.facing = Facing::Left;
            body.vel.x = -MAX_SPEED;
        }
        if !left && !right {
            body.vel.x = 0.0;
            self.core.withdraw();
        }
        body.pos.x += body.vel.x;
        self.frame += 1;
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        self.frame %= self.strip.len();
        show(body, art, &self.strip, self.frame);
    }
}

// ── Guarding ─────────────────────────────────────────────────────────────────

pub struct Guarding {
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl Guarding {
    pub fn new() -> Self {
        Self { core: StateCore::new(), frame: 0, strip: strip("guard", 0, 3, 1) }
    }
}

impl StackState<ActionKind, Body> for Guarding {
    core_access!();

    fn cleanup(&mut self, body: &mut Body) -> Persist {
        self.frame = 0;
        if body.status == Status::Guard {
            body.status = Status::Ground;
        }
        self.core.take_persist()
    }
}

impl Action for Guarding {
    fn kind(&self) -> ActionKind {
        ActionKind::Guarding
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn update(&mut self, body: &mut Body) {
        let down = body.is_held(Control::Down);
        if down && self.frame == 1 {
            body.status = Status::Guard;
        } else if !down {
            body.status = Status::Ground;
            if self.frame == 2 {
                self.core.withdraw();
            }
        }
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        self.frame %= self.strip.len();
        show(body, art, &self.strip, self.frame);
        if body.status == Status::Guard {
            self.frame = 1;
        } else {
            self.frame += 1;
        }
    }
}

// ── Dash ─────────────────────────────────────────────────────────────────────

pub struct Dash {
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl Dash {
    pub fn new() -> Self {
        Self { core: StateCore::new(), frame: 0, strip: strip("dash", 0, 3, 1) }
    }
}

impl StackState<ActionKind, Body> for Dash {
    core_access!();

    fn cleanup(&mut self, _body: &mut Body) -> Persist {
        self.frame = 0;
        self.core.take_persist()
    }
}

impl Action for Dash {
    fn kind(&self) -> ActionKind {
        ActionKind::Dash
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn update(&mut self, body: &mut Body) {
        match self.frame {
            0 => self.frame = 1,
            1 if elapsed(&self.core, body) < DASH_MS => body.step_forward(DASH_SPEED),
            1 => self.frame = 2,
            _ => self.core.withdraw(),
        }
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        show(body, art, &self.strip, self.frame);
    }
}

// ── Hurt ─────────────────────────────────────────────────────────────────────

pub struct Hurt {
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl Hurt {
    pub fn new() -> Self {
        Self { core: StateCore::new(), frame: 0, strip: strip("hit", 0, 3, 1) }
    }
}

impl StackState<ActionKind, Body> for Hurt {
    core_access!();

    fn startup(&mut self, body: &mut Body, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        body.status = Status::Hit;
    }

    fn cleanup(&mut self, _body: &mut Body) -> Persist {
        self.frame = 0;
        self.core.take_persist()
    }
}

impl Action for Hurt {
    fn kind(&self) -> ActionKind {
        ActionKind::Hurt
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn update(&mut self, body: &mut Body) {
        // A fourth hit wraps the counter to zero, which also ends the stun.
        if body.hit_count == 0 || elapsed(&self.core, body) > HURT_MS {
            body.hit_count = 0;
            self.core.withdraw();
            return;
        }
        self.frame = usize::from(body.hit_count - 1);
        let over_fall = matches!(body.beneath, Some(ActionKind::Falling | ActionKind::VulFall));
        if over_fall && body.is_airborne() {
            body.pos.y = (body.pos.y + HURT_SINK).min(body.floor);
        }
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        show(body, art, &self.strip, self.frame);
    }
}
