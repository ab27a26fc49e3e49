use crate::audio::{SoundConfig, cue};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::engine::Context;
use crate::error::StackError;
use crate::fade::Transitioner;
use crate::geometry::Rect;
use crate::input::{InputState, KeyCode, KeyEvent};
use crate::renderer::{Color, DrawList};
use crate::stack::{Millis, Persist, StackState, StateCore};
use crate::ui::Label;

use super::{Screen, ScreenKind, draw_transition, image_size, in_transition, leave_to, run_transition, screen_rect};

pub struct Title {
    core: StateCore<ScreenKind>,
    fade: Transitioner,
    prompt: Label,
}

impl Title {
    pub fn new() -> Self {
        Self {
            core: StateCore::with_targets(Some(ScreenKind::MainMenu), None),
            fade: Transitioner::new(),
            prompt: Label::new("GAME START", SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2 + 150, 5, Color::SPACE_GREY)
                .blinking(),
        }
    }
}

impl Default for Title {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for Title {
    fn core(&self) -> &StateCore<ScreenKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<ScreenKind> {
        &mut self.core
    }

    fn startup(&mut self, ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        self.fade.reset();
        ctx.audio.play_music(cue::MENU_MUSIC, 1.0);
    }
}

impl Screen for Title {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Title
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        if event.is_up() && matches!(event.key, KeyCode::Enter | KeyCode::NumpadEnter) && !self.fade.is_active() {
            ctx.audio.play(cue::CONFIRM, SoundConfig::default());
            leave_to(&mut self.core, &mut self.fade, ScreenKind::MainMenu);
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &mut Context, _input: &InputState, _now: Millis, _dt: Millis) -> Result<(), StackError> {
        if !run_transition(&mut self.core, &mut self.fade) {
            self.prompt.update();
        }
        Ok(())
    }

    fn draw(&self, ctx: &Context, out: &mut DrawList) {
        if in_transition(&self.fade) {
            draw_transition(&self.fade, out);
            return;
        }
        let (w, h) = image_size(ctx, "logo");
        out.sprite("bg", screen_rect());
        out.sprite("logo", Rect::from_center(SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2, w, h));
        self.prompt.draw(out);
    }
}
