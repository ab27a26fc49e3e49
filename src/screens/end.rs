use chrono::Local;
use tracing::{info, warn};

use crate::audio::{SoundConfig, cue};
use crate::config::SCREEN_WIDTH;
use crate::engine::Context;
use crate::error::StackError;
use crate::fade::{Sequence, Transitioner};
use crate::fight::{MatchOutcome, PlayerResult};
use crate::geometry::Rect;
use crate::input::{Control, InputState, KeyEvent};
use crate::renderer::{Align, Color, DrawList};
use crate::stack::{Millis, Persist, StackState, StateCore};
use crate::store::{StatsUpdate, UserId};
use crate::ui::{Button, MenuPointer};

use super::{
    PLAYERS, PLAYER_NUMBER, Screen, ScreenKind, UUID, control_for, draw_transition, image_size, in_transition,
    leave_to, persist_u64, run_transition, screen_rect,
};

const PANEL_W: i32 = 500;
const PANEL_H: i32 = 650;
const PANEL_X: [i32; 2] = [40, SCREEN_WIDTH - 40 - PANEL_W];

/// Results of the last match with per-player saving.
pub struct End {
    core: StateCore<ScreenKind>,
    fade: Transitioner,
    pointer: MenuPointer,
    outcome: Option<MatchOutcome>,
    users: [Option<UserId>; 2],
    saved: [bool; 2],
    notice: Option<(String, Color)>,
}

impl End {
    pub fn new() -> Self {
        let rows = vec![
            vec![
                Button::sized("save1", "SAVE", 250 + 40, 650, PANEL_W, 3),
                Button::sized("save2", "SAVE", SCREEN_WIDTH - 250 - 40, 650, PANEL_W, 3),
            ],
            vec![Button::sized("exit", "EXIT", 80, 900, 100, 3)],
        ];
        Self {
            core: StateCore::with_targets(Some(ScreenKind::MainMenu), Some(ScreenKind::Login)),
            fade: Transitioner::new(),
            pointer: MenuPointer::new(rows),
            outcome: None,
            users: [None, None],
            saved: [false, false],
            notice: None,
        }
    }

    fn request_save(&mut self, ctx: &mut Context, player: u8) {
        let idx = usize::from(player - 1);
        match self.users[idx] {
            None => {
                self.core.persist.insert(PLAYER_NUMBER.into(), player.into());
                self.core.suspend(ScreenKind::Login);
            }
            Some(user) => self.save(ctx, player, user),
        }
    }

    fn save(&mut self, ctx: &mut Context, player: u8, user: UserId) {
        let idx = usize::from(player - 1);
        if self.saved[idx] {
            self.notice = Some((format!("P{player} ALREADY SAVED"), Color::SPACE_GREY));
            return;
        }
        let Some(result) = self.outcome.as_ref().and_then(|o| o.player(player)) else {
            warn!(player, "no match result to save");
            return;
        };
        let update = StatsUpdate {
            won: result.won,
            score: result.score,
            max_combo: result.max_combo,
            date: Local::now().date_naive(),
        };
        match ctx.store.update_stats(user, &update) {
            Ok(()) => {
                info!(player, user, score = update.score, won = update.won, "stats saved");
                self.saved[idx] = true;
                self.notice = Some((format!("P{player} SAVED"), Color::SUCCESS));
            }
            Err(e) => {
                warn!(player, user, error = %e, "could not save stats");
                self.notice = Some((format!("P{player} SAVE FAILED"), Color::ERROR));
            }
        }
    }
}

impl Default for End {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for End {
    fn core(&self) -> &StateCore<ScreenKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<ScreenKind> {
        &mut self.core
    }

    fn startup(&mut self, _ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        self.fade.reset();
        self.fade.start(Sequence::fade_in());
        self.pointer.reset();
        self.users = [None, None];
        self.saved = [false, false];
        self.notice = None;
        self.outcome = match self.core.persist.get(PLAYERS).cloned().map(serde_json::from_value) {
            Some(Ok(outcome)) => Some(outcome),
            Some(Err(e)) => {
                warn!(error = %e, "match outcome is malformed");
                None
            }
            None => {
                warn!("results screen entered without a match outcome");
                None
            }
        };
    }

    fn resume(&mut self, _ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.reenter(persist, now);
        let user = persist_u64(&self.core.persist, UUID).and_then(|id| UserId::try_from(id).ok());
        let player = persist_u64(&self.core.persist, PLAYER_NUMBER);
        if let (Some(user), Some(player @ 1..=2)) = (user, player) {
            info!(player, user, "player signed in on results screen");
            self.users[player as usize - 1] = Some(user);
            self.notice = Some((format!("P{player} SIGNED IN"), Color::SUCCESS));
        }
    }

    fn cleanup(&mut self, _ctx: &mut Context) -> Persist {
        for key in [PLAYERS, UUID, PLAYER_NUMBER] {
            self.core.persist.remove(key);
        }
        self.outcome = None;
        self.core.take_persist()
    }
}

impl Screen for End {
    fn kind(&self) -> ScreenKind {
        ScreenKind::End
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        if self.fade.is_active() {
            return Ok(());
        }
        let Some(control) = control_for(ctx, 1, event) else { return Ok(()) };

        if event.is_up() && control == Control::Light {
            ctx.audio.play(cue::CONFIRM, SoundConfig::default());
            self.notice = None;
            match self.pointer.click() {
                Some("exit") => leave_to(&mut self.core, &mut self.fade, ScreenKind::MainMenu),
                Some("save1") => self.request_save(ctx, 1),
                Some("save2") => self.request_save(ctx, 2),
                _ => {}
            }
        } else if event.is_down() {
            match control {
                Control::Up => self.pointer.move_by(0, -1),
                Control::Down => self.pointer.move_by(0, 1),
                Control::Left => self.pointer.move_by(-1, 0),
                Control::Right => self.pointer.move_by(1, 0),
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
        if in_transition(&self.fade) {
            draw_transition(&self.fade, out);
            return;
        }
        out.sprite("bg", screen_rect());

        match &self.outcome {
            Some(outcome) => {
                for result in &outcome.players {
                    let idx = usize::from(result.player.saturating_sub(1)).min(1);
                    draw_panel(ctx, out, result, PANEL_X[idx], self.users[idx].is_some(), self.saved[idx]);
                }
            }
            None => out.text("NO RESULT", SCREEN_WIDTH / 2, 300, 4, Color::SPACE_GREY, Align::Center),
        }

        self.pointer.draw(out);
        if let Some((text, color)) = &self.notice {
            out.text(text, SCREEN_WIDTH / 2, 760, 3, *color, Align::Center);
        }
    }
}

fn draw_panel(ctx: &Context, out: &mut DrawList, result: &PlayerResult, x: i32, signed_in: bool, saved: bool) {
    let y = 40;
    out.fill(Rect::new(x, y, PANEL_W, PANEL_H), Color::BLACK.alpha8(150));
    if result.won {
        out.text("WINNER", x + PANEL_W / 2, y + 10, 5, Color::SPACE_GREY, Align::Center);
    }

    let portrait = ctx.assets.character(&result.char_id).map(|art| art.portrait.as_str());
    let (pw, ph) = portrait.map_or((0, 0), |name| image_size(ctx, name));
    if let Some(name) = portrait {
        // The loser's portrait faces away.
        out.sprite_ex(name, Rect::new(x + PANEL_W / 2 - pw / 2, y + 50, pw, ph), !result.won, Color::WHITE);
    }

    let tx = x + 40;
    let ty = y + ph + 60;
    out.text(&result.name, tx, ty, 2, Color::SPACE_GREY, Align::Left);
    out.text(&format!("SCORE: {}", result.score), tx, ty + 40, 2, Color::SPACE_GREY, Align::Left);
    out.text(&format!("COMBO: {}", result.max_combo), tx, ty + 60, 2, Color::SPACE_GREY, Align::Left);
    let status = match (signed_in, saved) {
        (_, true) => "SAVED",
        (true, false) => "SIGNED IN",
        (false, false) => "NOT SIGNED IN",
    };
    out.text(status, tx, ty + 100, 2, Color::NICE_GREY, Align::Left);
}
