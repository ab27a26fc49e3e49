use crate::assets::CharacterArt;
use crate::input::{Control, KeyState};
use crate::stack::{Millis, Persist, StackState, StateCore};

use super::{show, strip, Strip};
use crate::fighter::{Action, ActionKind, Body, Status, JUMP_VELOCITY, MAX_SPEED};

/// Horizontal air control shared by every airborne action.
fn steer(body: &mut Body) {
    let right = body.is_held(Control::Right);
    let left = body.is_held(Control::Left);
    if right {
        body.vel.x = MAX_SPEED;
    }
    if left {
        body.vel.x = -MAX_SPEED;
    }
    if !left && !right {
        body.vel.x = 0.0;
    }
}

/// Dash and light attack can be started in mid-air.
fn air_cancel(core: &mut StateCore<ActionKind>, control: Control, state: KeyState) {
    if state != KeyState::Down {
        return;
    }
    match control {
        Control::Dash => core.suspend(ActionKind::Dash),
        Control::Light => core.suspend(ActionKind::LightAerial),
        _ => {}
    }
}

// ── Jumping ──────────────────────────────────────────────────────────────────

/// Take-off and ascent. Hands over to `Falling` at the apex.
pub struct Jumping {
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl Jumping {
    pub fn new() -> Self {
        Self { core: StateCore::new(), frame: 0, strip: strip("jump", 0, 5, 1) }
    }
}

impl StackState<ActionKind, Body> for Jumping {
    core_access!();

    fn startup(&mut self, body: &mut Body, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        body.vel.x = 0.0;
        body.vel.y = JUMP_VELOCITY;
    }

    fn cleanup(&mut self, _body: &mut Body) -> Persist {
        self.frame = 0;
        self.core.take_persist()
    }

    /// Coming back from an air action loses the controlled descent.
    fn resume(&mut self, _body: &mut Body, persist: Persist, now: Millis) {
        self.core.reenter(persist, now);
        self.core.finish(ActionKind::VulFall);
    }
}

impl Action for Jumping {
    fn kind(&self) -> ActionKind {
        ActionKind::Jumping
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn handle_event(&mut self, _body: &mut Body, control: Control, state: KeyState) {
        air_cancel(&mut self.core, control, state);
    }

    fn update(&mut self, body: &mut Body) {
        steer(body);
        if self.frame == 4 {
            body.status = Status::Aerial;
            if body.vel.y > 0.0 {
                body.vel.y -= body.acc.y;
                body.pos.y -= body.vel.y;
            } else {
                self.core.finish(ActionKind::Falling);
            }
        } else {
            self.frame += 1;
        }
        body.pos.x += body.vel.x;
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        self.frame %= self.strip.len();
        show(body, art, &self.strip, self.frame);
    }
}

// ── Falling / VulFall ────────────────────────────────────────────────────────

/// Descent to the floor followed by the landing frames. The vulnerable
/// variant ignores air inputs.
pub struct Fall {
    kind: ActionKind,
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl Fall {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind, core: StateCore::new(), frame: 0, strip: strip("jump", 4, 9, 1) }
    }
}

impl StackState<ActionKind, Body> for Fall {
    core_access!();

    fn cleanup(&mut self, _body: &mut Body) -> Persist {
        self.frame = 0;
        self.core.take_persist()
    }

    fn resume(&mut self, body: &mut Body, persist: Persist, now: Millis) {
        self.core.reenter(persist, now);
        body.status = Status::Aerial;
    }
}

impl Action for Fall {
    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn handle_event(&mut self, _body: &mut Body, control: Control, state: KeyState) {
        if self.kind == ActionKind::Falling {
            air_cancel(&mut self.core, control, state);
        }
    }

    fn update(&mut self, body: &mut Body) {
        steer(body);
        if body.status == Status::Aerial {
            if body.is_airborne() {
                body.pos.y = (body.pos.y + body.vel.y).min(body.floor);
                body.vel.y += body.acc.y;
            } else {
                body.status = Status::Ground;
            }
        }
        body.pos.x += body.vel.x;

        if self.frame == 4 && body.status == Status::Ground {
            self.core.withdraw();
        }
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        self.frame %= self.strip.len();
        show(body, art, &self.strip, self.frame);
        if body.status == Status::Aerial {
            self.frame = 0;
        } else {
            self.frame += 1;
        }
    }
}
