use serde_json::Value;

use crate::audio::{SoundConfig, cue};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::engine::Context;
use crate::error::StackError;
use crate::geometry::Rect;
use crate::input::{Control, InputState, KeyEvent};
use crate::renderer::{Align, Color, DrawList};
use crate::stack::{Millis, Persist, StackState, StateCore};
use crate::ui::{Button, MenuPointer};

use super::{EXIT_NOSAVE, Screen, ScreenKind, control_for};

const PANEL_W: i32 = 500;
const PANEL_H: i32 = 350;

/// Overlay pushed over a running match.
pub struct Pause {
    core: StateCore<ScreenKind>,
    pointer: MenuPointer,
}

impl Pause {
    pub fn new() -> Self {
        let (cx, top) = (SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2 - 175);
        let buttons = [("BACK", 1), ("EXIT", 2)]
            .into_iter()
            .map(|(name, i)| Button::new(name, name, cx, top + i * 120 + 35, PANEL_W))
            .collect();
        Self { core: StateCore::new(), pointer: MenuPointer::column(buttons) }
    }
}

impl Default for Pause {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for Pause {
    fn core(&self) -> &StateCore<ScreenKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<ScreenKind> {
        &mut self.core
    }

    fn startup(&mut self, _ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        self.pointer.reset();
    }
}

impl Screen for Pause {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Pause
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        let Some(control) = control_for(ctx, 1, event) else { return Ok(()) };
        if event.is_up() && control == Control::Light {
            let abandon = match self.pointer.click() {
                Some("BACK") => false,
                Some("EXIT") => true,
                _ => return Ok(()),
            };
            ctx.audio.play(cue::CONFIRM, SoundConfig::default());
            self.core.persist.insert(EXIT_NOSAVE.into(), Value::Bool(abandon));
            self.core.withdraw();
        } else if event.is_down() {
            match control {
                Control::Up => self.pointer.move_by(-1, 0),
                Control::Down => self.pointer.move_by(1, 0),
                _ => return Ok(()),
            }
            ctx.audio.play(cue::MENU_MOVE, SoundConfig::default());
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &mut Context, _input: &InputState, _now: Millis, _dt: Millis) -> Result<(), StackError> {
        self.pointer.update();
        Ok(())
    }

    fn draw(&self, _ctx: &Context, out: &mut DrawList) {
        out.overlay(50, SCREEN_WIDTH, SCREEN_HEIGHT);
        let panel = Rect::from_center(SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2, PANEL_W, PANEL_H);
        out.fill(panel, Color::BLACK.alpha8(200));
        out.text("PAUSED", panel.center_x(), panel.y + 20, 5, Color::SPACE_GREY, Align::Center);
        out.fill(Rect::new(panel.x + 125, panel.y + 70, 250, 2), Color::SPACE_GREY);
        self.pointer.draw(out);
    }

    fn is_overlay(&self) -> bool {
        true
    }
}
