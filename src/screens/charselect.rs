use serde_json::Value;
use tracing::info;

use crate::audio::{SoundConfig, cue};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::engine::Context;
use crate::error::StackError;
use crate::fade::{Sequence, Transitioner};
use crate::geometry::Rect;
use crate::input::{Control, InputState, KeyCode, KeyEvent};
use crate::renderer::{Align, Color, DrawList, font};
use crate::stack::{Millis, Persist, StackState, StateCore};
use crate::ui::banner;

use super::{
    CHAR1, CHAR2, Screen, ScreenKind, control_for, draw_transition, image_size, in_transition, leave_to,
    run_transition, screen_rect,
};

pub const GRID_COLS: i32 = 10;
pub const GRID_ROWS: i32 = 2;
const SLOT: i32 = 90;
const GAP: i32 = 10;
const POINTER_BORDER: i32 = 9;

// ── Slot cursor ──────────────────────────────────────────────────────────────

/// One player's cursor over the character grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub col: i32,
    pub row: i32,
    pub ready: bool,
}

impl Cursor {
    /// Grid slot index, wrapped onto the grid.
    pub fn slot(&self) -> usize {
        let row = self.row.rem_euclid(GRID_ROWS);
        let col = self.col.rem_euclid(GRID_COLS);
        (row * GRID_COLS + col) as usize
    }

    fn steer(&mut self, control: Control) -> bool {
        match control {
            Control::Up => self.row -= 1,
            Control::Down => self.row += 1,
            Control::Left => self.col -= 1,
            Control::Right => self.col += 1,
            _ => return false,
        }
        true
    }
}

fn slot_origin(slot: usize) -> (i32, i32) {
    let grid_w = GRID_COLS * SLOT + (GRID_COLS - 1) * GAP;
    let grid_h = GRID_ROWS * SLOT + (GRID_ROWS - 1) * GAP;
    let left = SCREEN_WIDTH / 2 - grid_w / 2;
    let top = SCREEN_HEIGHT / 2 + 200 - grid_h / 2;
    let (col, row) = (slot as i32 % GRID_COLS, slot as i32 / GRID_COLS);
    (left + col * (SLOT + GAP), top + row * (SLOT + GAP))
}

// ── CharSelect ───────────────────────────────────────────────────────────────

pub struct CharSelect {
    core: StateCore<ScreenKind>,
    fade: Transitioner,
    /// Character ids by grid slot, in roster order.
    slots: Vec<Option<String>>,
    cursors: [Cursor; 2],
    /// Both players confirmed and the match was requested.
    start: bool,
    chosen: [Option<String>; 2],
}

impl CharSelect {
    pub fn new() -> Self {
        Self {
            core: StateCore::with_targets(Some(ScreenKind::Match), None),
            fade: Transitioner::new(),
            slots: Vec::new(),
            cursors: [Cursor::default(); 2],
            start: false,
            chosen: [None, None],
        }
    }

    fn character_at(&self, player: usize) -> Option<&str> {
        self.slots.get(self.cursors[player].slot()).and_then(|s| s.as_deref())
    }

    fn both_ready(&self) -> bool {
        self.cursors[0].ready && self.cursors[1].ready
    }

    fn player_event(&mut self, ctx: &mut Context, player: usize, control: Control, event: KeyEvent) {
        if event.is_up() && control == Control::Jump {
            if self.cursors[player].ready {
                self.cursors[player].ready = false;
                ctx.audio.play(cue::BACK, SoundConfig::default());
            } else if player == 0 {
                leave_to(&mut self.core, &mut self.fade, ScreenKind::MainMenu);
            }
            return;
        }
        if !event.is_down() || self.cursors[player].ready {
            return;
        }
        if control == Control::Light {
            if self.character_at(player).is_some() {
                self.cursors[player].ready = true;
                ctx.audio.play(cue::CONFIRM, SoundConfig::default());
            }
        } else if self.cursors[player].steer(control) {
            ctx.audio.play(cue::MENU_MOVE, SoundConfig::default());
        }
    }
}

impl Default for CharSelect {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for CharSelect {
    fn core(&self) -> &StateCore<ScreenKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<ScreenKind> {
        &mut self.core
    }

    fn startup(&mut self, ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        self.fade.reset();
        self.fade.start(Sequence::fade_in());

        let capacity = (GRID_COLS * GRID_ROWS) as usize;
        self.slots = ctx.assets.roster().take(capacity).map(|art| Some(art.id.clone())).collect();
        self.slots.resize(capacity, None);

        for cursor in &mut self.cursors {
            cursor.ready = false;
        }
        self.start = false;
        self.chosen = [None, None];
    }

    fn cleanup(&mut self, _ctx: &mut Context) -> Persist {
        if self.start {
            let [c1, c2] = std::mem::take(&mut self.chosen);
            if let (Some(c1), Some(c2)) = (c1, c2) {
                info!(p1 = %c1, p2 = %c2, "characters chosen");
                self.core.persist.insert(CHAR1.into(), Value::String(c1));
                self.core.persist.insert(CHAR2.into(), Value::String(c2));
            }
        }
        self.core.take_persist()
    }
}

impl Screen for CharSelect {
    fn kind(&self) -> ScreenKind {
        ScreenKind::CharSelect
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        if self.fade.is_active() {
            return Ok(());
        }
        for player in 0..2 {
            if let Some(control) = control_for(ctx, player as u8 + 1, event) {
                self.player_event(ctx, player, control, event);
            }
        }
        if event.is_down() && matches!(event.key, KeyCode::Enter | KeyCode::NumpadEnter) && self.both_ready() {
            self.start = true;
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &mut Context, _input: &InputState, _now: Millis, _dt: Millis) -> Result<(), StackError> {
        if run_transition(&mut self.core, &mut self.fade) {
            return Ok(());
        }
        for player in 0..2 {
            if self.cursors[player].ready {
                self.chosen[player] = self.character_at(player).map(str::to_string);
            }
        }
        if self.start {
            leave_to(&mut self.core, &mut self.fade, ScreenKind::Match);
        }
        Ok(())
    }

    fn draw(&self, ctx: &Context, out: &mut DrawList) {
        if in_transition(&self.fade) {
            draw_transition(&self.fade, out);
            return;
        }
        out.sprite("bg", screen_rect());

        let (left, top) = slot_origin(0);
        let grid_w = GRID_COLS * SLOT + (GRID_COLS - 1) * GAP;
        let grid_h = GRID_ROWS * SLOT + (GRID_ROWS - 1) * GAP;
        out.fill(Rect::new(left, top, grid_w, grid_h), Color::BLACK.alpha8(50));
        for (i, slot) in self.slots.iter().enumerate() {
            let (x, y) = slot_origin(i);
            outline(out, Rect::new(x, y, SLOT, SLOT), 4, Color::SPACE_GREY, Color::BLACK);
            if let Some(art) = slot.as_deref().and_then(|id| ctx.assets.character(id)) {
                let (w, h) = image_size(ctx, &art.thumb);
                out.sprite(&art.thumb, Rect::from_center(x + SLOT / 2, y + SLOT / 2, w, h));
            }
        }

        for (player, cursor) in self.cursors.iter().enumerate() {
            if !cursor.ready {
                draw_cursor(out, player, cursor.slot());
            }
        }

        // Hovered character portraits with their names underneath.
        for (player, (px, band_x)) in [(40, 0), (915, 815)].into_iter().enumerate() {
            out.fill(Rect::new(band_x, 375, 465, 40), Color::BLACK.alpha8(150));
            if let Some(art) = self.character_at(player).and_then(|id| ctx.assets.character(id)) {
                let (w, h) = image_size(ctx, &art.portrait);
                out.sprite(&art.portrait, Rect::new(px, 370 - h.min(330), w, h.min(330)));
                out.text(&art.name, band_x + 10, 385, 2, Color::SPACE_GREY, Align::Left);
            }
        }

        if self.both_ready() && !self.start {
            banner(out, "READY!", SCREEN_HEIGHT / 2, SCREEN_WIDTH, 6);
        }
    }
}

/// Filled box with an inset border.
fn outline(out: &mut DrawList, r: Rect, width: i32, border: Color, fill: Color) {
    out.fill(r, border);
    out.fill(Rect::new(r.x + width, r.y + width, r.w - 2 * width, r.h - 2 * width), fill);
}

fn draw_cursor(out: &mut DrawList, player: usize, slot: usize) {
    let color = Color::player(player as u8 + 1);
    let (x, y) = slot_origin(slot);
    let r = Rect::new(x - 4, y - 4, SLOT + 8, SLOT + 8);
    let b = POINTER_BORDER;
    out.fill(Rect::new(r.x, r.y, r.w, b), color);
    out.fill(Rect::new(r.x, r.bottom() - b, r.w, b), color);
    out.fill(Rect::new(r.x, r.y, b, r.h), color);
    out.fill(Rect::new(r.right() - b, r.y, b, r.h), color);

    let tag = if player == 0 { "P1" } else { "P2" };
    let tx = if player == 0 { r.x } else { r.right() + 5 - font::text_width(tag, 2) };
    out.text(tag, tx, r.y - 24, 2, color, Align::Left);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_around_the_grid() {
        let mut c = Cursor::default();
        c.steer(Control::Left);
        assert_eq!(c.slot(), 9);
        c.steer(Control::Up);
        assert_eq!(c.slot(), 19);
        c.steer(Control::Down);
        c.steer(Control::Down);
        assert_eq!(c.slot(), 9);
    }

    #[test]
    fn slots_are_laid_out_row_major() {
        let (x0, y0) = slot_origin(0);
        assert_eq!(slot_origin(1), (x0 + SLOT + GAP, y0));
        assert_eq!(slot_origin(10), (x0, y0 + SLOT + GAP));
    }
}
