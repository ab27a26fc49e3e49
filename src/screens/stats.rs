use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::Context;
use crate::error::StackError;
use crate::fade::{Sequence, Transitioner};
use crate::geometry::Rect;
use crate::input::{Control, InputState, KeyEvent};
use crate::renderer::{Align, Color, DrawList, font};
use crate::stack::{Millis, Persist, StackState, StateCore};
use crate::store::{LeaderboardEntry, StatsRecord, UserId};

use super::{
    PLAYER_NUMBER, Screen, ScreenKind, UUID, control_for, draw_transition, in_transition, leave_to, persist_u64,
    run_transition, screen_rect,
};

const LEADERBOARD_ROWS: usize = 25;

/// Signed-in user's record next to the leaderboard.
pub struct Stats {
    core: StateCore<ScreenKind>,
    fade: Transitioner,
    user: Option<UserId>,
    login_requested: bool,
    record: Option<StatsRecord>,
    board: Vec<LeaderboardEntry>,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            core: StateCore::with_targets(Some(ScreenKind::MainMenu), Some(ScreenKind::Login)),
            fade: Transitioner::new(),
            user: None,
            login_requested: false,
            record: None,
            board: Vec::new(),
        }
    }

    fn load(&mut self, ctx: &Context, user: UserId) {
        match ctx.store.get_stats(user) {
            Ok(record) => {
                debug!(user, username = %record.username, "stats loaded");
                self.record = Some(record);
            }
            Err(e) => warn!(user, error = %e, "could not load stats"),
        }
        self.board = ctx.store.get_leaderboard();
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for Stats {
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
        self.user = None;
        self.login_requested = false;
        self.record = None;
        self.board.clear();
    }

    fn resume(&mut self, ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.reenter(persist, now);
        match persist_u64(&self.core.persist, UUID).and_then(|id| UserId::try_from(id).ok()) {
            Some(user) => {
                self.user = Some(user);
                self.load(ctx, user);
            }
            None => leave_to(&mut self.core, &mut self.fade, ScreenKind::MainMenu),
        }
    }

    fn cleanup(&mut self, _ctx: &mut Context) -> Persist {
        self.core.persist.remove(UUID);
        self.core.persist.remove(PLAYER_NUMBER);
        self.record = None;
        self.board.clear();
        self.core.take_persist()
    }
}

impl Screen for Stats {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Stats
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        if self.fade.is_active() {
            return Ok(());
        }
        if event.is_up() && control_for(ctx, 1, event) == Some(Control::Jump) {
            leave_to(&mut self.core, &mut self.fade, ScreenKind::MainMenu);
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &mut Context, _input: &InputState, _now: Millis, _dt: Millis) -> Result<(), StackError> {
        if run_transition(&mut self.core, &mut self.fade) {
            return Ok(());
        }
        if self.user.is_none() && !self.login_requested {
            self.login_requested = true;
            self.core.persist.insert(PLAYER_NUMBER.into(), Value::from(1u8));
            self.core.suspend(ScreenKind::Login);
        }
        Ok(())
    }

    fn draw(&self, _ctx: &Context, out: &mut DrawList) {
        if in_transition(&self.fade) {
            draw_transition(&self.fade, out);
            return;
        }
        out.sprite("bg", screen_rect());

        let panel = Rect::new(40, 40, 400, 800);
        out.fill(panel, Color::BLACK.alpha8(150));
        out.text("STATS", panel.center_x(), panel.y + 20, 5, Color::SPACE_GREY, Align::Center);
        if let Some(record) = &self.record {
            out.text(&record.username, panel.x + 20, panel.y + 90, 3, Color::SPACE_GREY, Align::Left);
            for (i, line) in record_lines(record).iter().enumerate() {
                let y = panel.y + 150 + i as i32 * 40;
                out.text(line, panel.x + 20, y, 2, Color::SPACE_GREY, Align::Left);
            }
        }

        let board = Rect::new(640, 40, 600, 880);
        out.fill(board, Color::BLACK.alpha8(150));
        out.text("LEADERBOARD", board.center_x(), board.y + 20, 5, Color::SPACE_GREY, Align::Center);
        for (i, entry) in self.board.iter().take(LEADERBOARD_ROWS).enumerate() {
            let y = board.y + 100 + i as i32 * 30;
            let own = self.record.as_ref().is_some_and(|r| r.username == entry.username);
            let color = if own { Color::PLAYER_ONE } else { Color::SPACE_GREY };
            out.text(&format!("{}: {}", entry.username, entry.high_score), board.x + 20, y, 2, color, Align::Left);
            if let Some(date) = entry.date {
                let date = date.format("%Y-%m-%d").to_string();
                let x = board.right() - 20 - font::text_width(&date, 2);
                out.text(&date, x, y, 2, color, Align::Left);
            }
        }

        out.text("SPACE: BACK", 40, 860, 2, Color::NICE_GREY, Align::Left);
    }
}

fn record_lines(record: &StatsRecord) -> Vec<String> {
    let high_date = record.high_score_date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    vec![
        format!("WINS: {}", record.wins),
        format!("LOSSES: {}", record.losses),
        format!("DRAWS: {}", record.draws),
        format!("GAMES: {}", record.games_played),
        format!("HIGH SCORE: {}", record.high_score),
        format!("ON: {high_date}"),
        format!("MAX COMBO: {}", record.max_combo),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_lines_list_every_counter() {
        let record = StatsRecord {
            username: "ryuu".into(),
            wins: 3,
            losses: 1,
            draws: 0,
            high_score: 140,
            high_score_date: None,
            max_combo: 4,
            games_played: 4,
        };
        let lines = record_lines(&record);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "WINS: 3");
        assert_eq!(lines[5], "ON: -");
    }
}
