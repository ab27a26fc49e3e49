use tracing::info;

use crate::audio::{SoundConfig, cue};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::engine::Context;
use crate::error::StackError;
use crate::fade::{Fade, Finish, Segment, Sequence, Slide, Transitioner};
use crate::geometry::Rect;
use crate::input::{Control, InputState, KeyEvent};
use crate::renderer::{Color, DrawList};
use crate::stack::{Millis, Persist, StackState, StateCore};
use crate::ui::{Button, MenuPointer};

use super::{Screen, ScreenKind, control_for, image_size, leave_to, run_transition, screen_rect};

const CHOICES: [(&str, &str); 3] = [("play", "PLAY"), ("stats", "STATS"), ("quit", "QUIT")];

pub struct MainMenu {
    core: StateCore<ScreenKind>,
    fade: Transitioner,
    pointer: MenuPointer,
}

impl MainMenu {
    pub fn new() -> Self {
        let (cx, cy) = (SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2);
        let buttons = CHOICES
            .iter()
            .zip(1..)
            .map(|(&(name, label), i)| Button::new(name, label, cx, cy + i * 70, SCREEN_WIDTH))
            .collect();
        Self {
            core: StateCore::with_targets(Some(ScreenKind::CharSelect), None),
            fade: Transitioner::new(),
            pointer: MenuPointer::column(buttons),
        }
    }
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for MainMenu {
    fn core(&self) -> &StateCore<ScreenKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<ScreenKind> {
        &mut self.core
    }

    fn startup(&mut self, ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        self.fade.reset();
        self.fade.start(Sequence::new(
            [Segment::Fade(Fade::fade_in()), Segment::Slide(Slide::new())],
            Finish::Enter,
        ));
        self.pointer.reset();
        ctx.audio.play_music(cue::MENU_MUSIC, 1.0);
    }
}

impl Screen for MainMenu {
    fn kind(&self) -> ScreenKind {
        ScreenKind::MainMenu
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        if self.fade.is_active() {
            return Ok(());
        }
        let Some(control) = control_for(ctx, 1, event) else { return Ok(()) };

        if event.is_up() && control == Control::Light {
            ctx.audio.play(cue::CONFIRM, SoundConfig::default());
            match self.pointer.click() {
                Some("play") => leave_to(&mut self.core, &mut self.fade, ScreenKind::CharSelect),
                Some("stats") => leave_to(&mut self.core, &mut self.fade, ScreenKind::Stats),
                Some("quit") => {
                    info!("quit from main menu");
                    self.core.quit = true;
                }
                _ => {}
            }
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
        if !run_transition(&mut self.core, &mut self.fade) {
            self.pointer.update();
        }
        Ok(())
    }

    fn draw(&self, ctx: &Context, out: &mut DrawList) {
        let (w, h) = image_size(ctx, "logo");
        let logo = Rect::from_center(SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2 + self.fade.logo_offset(), w, h);
        out.sprite("bg", screen_rect());
        out.sprite("logo", logo);

        // Entry shows only the backdrop and the rising logo.
        if self.fade.is_active() && !self.fade.is_exiting() {
            out.overlay(self.fade.overlay(), SCREEN_WIDTH, SCREEN_HEIGHT);
            return;
        }
        out.fill(Rect::new(0, SCREEN_HEIGHT / 2 - 15, SCREEN_WIDTH, 300), Color::BLACK.alpha8(116));
        self.pointer.draw(out);
        out.overlay(self.fade.overlay(), SCREEN_WIDTH, SCREEN_HEIGHT);
    }
}
