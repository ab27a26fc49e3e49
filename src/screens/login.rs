use serde_json::Value;
use tracing::{info, warn};

use crate::audio::{SoundConfig, cue};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::engine::Context;
use crate::error::StackError;
use crate::geometry::Rect;
use crate::input::{Control, InputState, KeyCode, KeyEvent};
use crate::renderer::{Align, Color, DrawList};
use crate::stack::{Millis, Persist, StackState, StateCore};
use crate::store::UserId;
use crate::ui::{Button, MenuPointer, TextField};

use super::{PLAYER_NUMBER, Screen, ScreenKind, UUID, control_for, persist_u64};

const FIELD_W: i32 = 300;
const FIELD_H: i32 = 50;
const MAX_CHARS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    User,
    Pass,
    Buttons,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::User => Focus::Pass,
            Focus::Pass => Focus::Buttons,
            Focus::Buttons => Focus::User,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Notice {
    LoginFailed,
    RegisterFailed,
    Registered,
}

impl Notice {
    fn text(self) -> &'static str {
        match self {
            Notice::LoginFailed => "INVALID CREDENTIALS",
            Notice::RegisterFailed => "USER ALREADY EXISTS OR INVALID CREDENTIALS",
            Notice::Registered => "SUCCESSFULLY REGISTERED USER",
        }
    }

    fn color(self) -> Color {
        match self {
            Notice::Registered => Color::SUCCESS,
            _ => Color::ERROR,
        }
    }
}

/// Sign-in overlay. Pushed by screens that need a user id; it hands back
/// `UUID` and `P#` through the persistent data when a user signs in.
pub struct Login {
    core: StateCore<ScreenKind>,
    user: TextField,
    pass: TextField,
    pointer: MenuPointer,
    focus: Focus,
    player: u8,
    found: Option<UserId>,
    notice: Option<Notice>,
}

impl Login {
    pub fn new() -> Self {
        let (cx, cy) = (SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2);
        let buttons = vec![
            Button::sized("login", "LOGIN", cx - 190, cy + 150, 120, 3),
            Button::sized("register", "REGISTER", cx + 190, cy + 150, 120, 3),
        ];
        Self {
            core: StateCore::new(),
            user: TextField::new("USERNAME", Rect::new(cx - FIELD_W / 2, cy - 45, FIELD_W, FIELD_H), MAX_CHARS),
            pass: TextField::new("PASSWORD", Rect::new(cx - FIELD_W / 2, cy + 5, FIELD_W, FIELD_H), MAX_CHARS)
                .masked(),
            pointer: MenuPointer::column(buttons),
            focus: Focus::User,
            player: 1,
            found: None,
            notice: None,
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.user.focused = focus == Focus::User;
        self.pass.focused = focus == Focus::Pass;
    }

    fn cancel(&mut self) {
        info!(player = self.player, "login cancelled");
        self.core.withdraw();
    }

    fn submit(&mut self, ctx: &mut Context, action: &str) {
        self.notice = None;
        let (username, password) = (self.user.value.as_str(), self.pass.value.as_str());
        match action {
            "login" => match ctx.store.authenticate(username, password) {
                Some(id) => {
                    info!(player = self.player, username, "signed in");
                    self.found = Some(id);
                }
                None => self.notice = Some(Notice::LoginFailed),
            },
            "register" => match ctx.store.create_user(username, password) {
                Ok(id) => {
                    info!(player = self.player, username, id, "user registered");
                    self.notice = Some(Notice::Registered);
                }
                Err(e) => {
                    warn!(username, error = %e, "registration refused");
                    self.notice = Some(Notice::RegisterFailed);
                }
            },
            _ => {}
        }
    }

    fn button_event(&mut self, ctx: &mut Context, event: KeyEvent) {
        let Some(control) = control_for(ctx, self.player, event) else { return };
        if event.is_up() {
            match control {
                Control::Pause => self.cancel(),
                Control::Light => {
                    if let Some(action) = self.pointer.click() {
                        ctx.audio.play(cue::CONFIRM, SoundConfig::default());
                        self.submit(ctx, action);
                    }
                }
                _ => {}
            }
        } else {
            match control {
                Control::Left => self.pointer.move_by(-1, 0),
                Control::Right => self.pointer.move_by(1, 0),
                _ => return,
            }
            ctx.audio.play(cue::MENU_MOVE, SoundConfig::default());
        }
    }
}

impl Default for Login {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for Login {
    fn core(&self) -> &StateCore<ScreenKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<ScreenKind> {
        &mut self.core
    }

    fn startup(&mut self, _ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        self.core.persist.remove(UUID);
        self.player = match persist_u64(&self.core.persist, PLAYER_NUMBER) {
            Some(2) => 2,
            _ => 1,
        };
        self.pointer.reset();
        self.found = None;
        self.notice = None;
        self.set_focus(Focus::User);
    }

    fn cleanup(&mut self, _ctx: &mut Context) -> Persist {
        self.user.clear();
        self.pass.clear();
        self.found = None;
        self.notice = None;
        self.core.take_persist()
    }
}

impl Screen for Login {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Login
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        if self.found.is_some() || self.core.withdrawn {
            return Ok(());
        }
        // Text entry owns the keyboard while a field is focused.
        match event.key {
            KeyCode::Tab | KeyCode::Enter | KeyCode::NumpadEnter => {
                if event.is_down() {
                    self.set_focus(self.focus.next());
                }
            }
            KeyCode::Escape => {
                if event.is_up() {
                    self.cancel();
                }
            }
            _ if self.focus == Focus::Buttons => self.button_event(ctx, event),
            _ => {}
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &mut Context, input: &InputState, _now: Millis, _dt: Millis) -> Result<(), StackError> {
        if let Some(id) = self.found {
            self.core.persist.insert(UUID.into(), Value::from(id));
            self.core.persist.insert(PLAYER_NUMBER.into(), Value::from(self.player));
            self.core.withdraw();
            return Ok(());
        }
        let typed = self.user.feed(input) | self.pass.feed(input);
        if typed {
            self.notice = None;
        }
        self.pointer.update();
        Ok(())
    }

    fn draw(&self, _ctx: &Context, out: &mut DrawList) {
        let (cx, cy) = (SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2);
        out.overlay(50, SCREEN_WIDTH, SCREEN_HEIGHT);
        let panel = Rect::from_center(cx, cy, 600, 400);
        out.fill(panel, Color::BLACK.alpha8(150));
        out.text("LOGIN", cx, panel.y + 20, 5, Color::SPACE_GREY, Align::Center);
        out.text(&format!("P{}", self.player), panel.x + 20, panel.y + 20, 3, Color::player(self.player), Align::Left);

        self.user.draw(out);
        self.pass.draw(out);

        if self.focus == Focus::Buttons {
            self.pointer.draw(out);
        } else {
            for button in self.pointer.buttons() {
                button.draw(out);
            }
        }
        if let Some(notice) = self.notice {
            out.text(notice.text(), cx, cy + 80, 2, notice.color(), Align::Center);
        }
    }

    fn is_overlay(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_through_fields_then_buttons() {
        let mut focus = Focus::User;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(focus);
            focus = focus.next();
        }
        assert_eq!(seen, [Focus::User, Focus::Pass, Focus::Buttons, Focus::User]);
    }

    #[test]
    fn only_registration_success_is_good_news() {
        assert_eq!(Notice::Registered.color(), Color::SUCCESS);
        assert_eq!(Notice::LoginFailed.color(), Color::ERROR);
        assert_eq!(Notice::RegisterFailed.color(), Color::ERROR);
    }
}
