use crate::assets::CharacterArt;
use crate::input::Control;
use crate::stack::{Millis, Persist, StackState, StateCore};

use super::{elapsed, show, strip, Strip};
use crate::fighter::{Action, ActionKind, Body, Status};

pub const LIGHT_AERIAL_DMG: i32 = 25;
pub const LIGHT_NEUTRAL_DMG: i32 = 250;

// Recovery timings. Tunable.
pub const LIGHT_AERIAL_HOLD_MS: Millis = 400;
pub const PART_ONE_RECOVERY_MS: Millis = 600;
pub const PART_TWO_RECOVERY_MS: Millis = 600;
pub const PART_THREE_RECOVERY_MS: Millis = 500;
pub const FINISHER_HOLD_MS: Millis = 150;

fn open_window(body: &mut Body, dmg: i32) {
    body.status = Status::Attack;
    body.dmg = dmg;
}

fn close_window(body: &mut Body, status: Status) {
    body.status = status;
    body.dmg = 0;
}

// ── LightAerial ──────────────────────────────────────────────────────────────

pub struct LightAerial {
    core: StateCore<ActionKind>,
    frame: usize,
    strip: Strip,
}

impl LightAerial {
    pub fn new() -> Self {
        let mut frames = strip("lightA", 0, 3, 5);
        frames.push(("lightA", 3));
        frames.push(("lightA", 4));
        Self { core: StateCore::new(), frame: 0, strip: frames }
    }
}

impl StackState<ActionKind, Body> for LightAerial {
    core_access!();

    fn startup(&mut self, body: &mut Body, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        body.attack_time = Some(now);
    }

    fn cleanup(&mut self, body: &mut Body) -> Persist {
        self.frame = 0;
        body.dmg = 0;
        body.attack_time = None;
        if body.status == Status::Attack {
            body.status = Status::Aerial;
        }
        self.core.take_persist()
    }
}

impl Action for LightAerial {
    fn kind(&self) -> ActionKind {
        ActionKind::LightAerial
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn update(&mut self, body: &mut Body) {
        if self.frame == 4 {
            open_window(body, LIGHT_AERIAL_DMG);
        }
        if self.frame == 5 {
            close_window(body, Status::Aerial);
        }

        match self.frame {
            14 => {
                if elapsed(&self.core, body) > LIGHT_AERIAL_HOLD_MS {
                    self.frame = 15;
                }
            }
            16 => self.core.withdraw(),
            _ => self.frame += 1,
        }
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        show(body, art, &self.strip, self.frame);
    }
}

// ── LightNeutral ─────────────────────────────────────────────────────────────

/// Three-part ground string. Holding light during a part's recovery chains
/// into the next part until the recovery runs out. The parts are evaluated in sequence so a chain takes
/// its first step on the same tick.
pub struct LightNeutral {
    core: StateCore<ActionKind>,
    frame: usize,
    part: usize,
    strips: [Strip; 3],
}

impl LightNeutral {
    pub fn new() -> Self {
        let mut one = strip("lightNa", 0, 3, 4);
        one.push(("lightNa", 3));
        let mut two = strip("lightNb", 0, 4, 4);
        two.extend([("lightNb", 4), ("lightNb", 5)]);
        let mut three = strip("lightNc", 0, 4, 4);
        three.push(("lightNc", 4));
        Self { core: StateCore::new(), frame: 0, part: 1, strips: [one, two, three] }
    }

    fn chain(&mut self, body: &mut Body, part: usize) {
        self.part = part;
        self.frame = 0;
        self.core.start_time = body.now;
    }
}

impl StackState<ActionKind, Body> for LightNeutral {
    core_access!();

    fn startup(&mut self, body: &mut Body, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        body.attack_time = Some(now);
    }

    fn cleanup(&mut self, body: &mut Body) -> Persist {
        self.part = 1;
        self.frame = 0;
        body.dmg = 0;
        body.attack_time = None;
        if body.status == Status::Attack {
            body.status = Status::Ground;
        }
        self.core.take_persist()
    }
}

impl Action for LightNeutral {
    fn kind(&self) -> ActionKind {
        ActionKind::LightNeutral
    }

    fn frame(&self) -> usize {
        self.frame
    }

    fn part(&self) -> usize {
        self.part
    }

    fn update(&mut self, body: &mut Body) {
        let light = body.is_held(Control::Light);

        if self.part == 1 {
            if self.frame == 11 {
                open_window(body, LIGHT_NEUTRAL_DMG);
            }
            if self.frame == 12 {
                close_window(body, Status::Ground);
                if elapsed(&self.core, body) > PART_ONE_RECOVERY_MS {
                    self.core.withdraw();
                } else if light {
                    self.chain(body, 2);
                    body.step_forward(20.0);
                }
            } else {
                self.frame += 1;
            }
        }

        if self.part == 2 {
            if self.frame == 15 {
                open_window(body, LIGHT_NEUTRAL_DMG);
            }
            match self.frame {
                16 => {
                    close_window(body, Status::Ground);
                    if elapsed(&self.core, body) > PART_TWO_RECOVERY_MS {
                        self.frame = 17;
                    } else if light {
                        self.chain(body, 3);
                    }
                }
                17 => self.core.withdraw(),
                _ => {
                    self.frame += 1;
                    if self.frame % 4 == 0 {
                        body.step_forward(4.0);
                    }
                }
            }
        }

        if self.part == 3 {
            if self.frame == 14 {
                open_window(body, LIGHT_NEUTRAL_DMG);
            }
            match self.frame {
                15 => {
                    close_window(body, Status::Ground);
                    if elapsed(&self.core, body) > PART_THREE_RECOVERY_MS {
                        self.frame = 16;
                        self.core.start_time = body.now;
                        body.step_forward(50.0);
                    }
                }
                16 => {
                    if elapsed(&self.core, body) > FINISHER_HOLD_MS {
                        self.core.withdraw();
                    }
                }
                _ => self.frame += 1,
            }
        }
    }

    fn draw(&mut self, body: &mut Body, art: &CharacterArt) {
        show(body, art, &self.strips[self.part - 1], self.frame);
    }
}
