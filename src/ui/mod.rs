//! Keyboard-driven menu helpers shared by the screens: named buttons laid out
//! in rows, the blinking pointer that walks them, and blinking labels.

pub mod widgets;

pub use widgets::TextField;

use crate::geometry::Rect;
use crate::renderer::{Align, Color, DrawList, font};

pub const BUTTON_TEXT_SCALE: u32 = 4;

// ── Button ───────────────────────────────────────────────────────────────────

/// A menu entry that answers with its name when clicked.
#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    pub name: &'static str,
    pub label: String,
    /// Centred on the layout position.
    pub rect: Rect,
    pub scale: u32,
}

impl Button {
    pub fn new(name: &'static str, label: &str, cx: i32, cy: i32, w: i32) -> Self {
        Self::sized(name, label, cx, cy, w, BUTTON_TEXT_SCALE)
    }

    /// Height follows the text scale.
    pub fn sized(name: &'static str, label: &str, cx: i32, cy: i32, w: i32, scale: u32) -> Self {
        let h = (font::GLYPH_H * scale) as i32 + 16;
        let w = w.max(font::text_width(label, scale) + 16);
        Self { name, label: label.to_string(), rect: Rect::from_center(cx, cy, w, h), scale }
    }

    pub fn draw(&self, out: &mut DrawList) {
        let text_y = self.rect.center_y() - (font::GLYPH_H * self.scale) as i32 / 2;
        out.text(&self.label, self.rect.center_x(), text_y, self.scale, Color::SPACE_GREY, Align::Center);
    }
}

// ── MenuPointer ──────────────────────────────────────────────────────────────

const POINTER_ALPHA_LOW: i16 = 15;
const POINTER_ALPHA_HIGH: i16 = 75;
const POINTER_ALPHA_STEP: i16 = 15;

/// Highlight over one button of a grid of rows.
///
/// The index is unbounded; it wraps when resolved, first the row against the
/// number of rows, then the column against that row's length.
#[derive(Clone, Debug)]
pub struct MenuPointer {
    rows: Vec<Vec<Button>>,
    pub col: i32,
    pub row: i32,
    alpha: i16,
    dalpha: i16,
}

impl MenuPointer {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows, col: 0, row: 0, alpha: 0, dalpha: POINTER_ALPHA_STEP }
    }

    /// Single row, the common vertical menu.
    pub fn column(buttons: Vec<Button>) -> Self {
        Self::new(vec![buttons])
    }

    pub fn reset(&mut self) {
        self.col = 0;
        self.row = 0;
    }

    pub fn move_by(&mut self, dcol: i32, drow: i32) {
        self.col += dcol;
        self.row += drow;
    }

    pub fn current(&self) -> Option<&Button> {
        let rows = self.rows.len() as i32;
        if rows == 0 {
            return None;
        }
        let row = &self.rows[self.row.rem_euclid(rows) as usize];
        if row.is_empty() {
            return None;
        }
        row.get(self.col.rem_euclid(row.len() as i32) as usize)
    }

    /// Name of the highlighted button.
    pub fn click(&self) -> Option<&'static str> {
        self.current().map(|b| b.name)
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn alpha(&self) -> u8 {
        self.alpha.clamp(0, 255) as u8
    }

    /// Advance the blink by one tick.
    pub fn update(&mut self) {
        if self.alpha > POINTER_ALPHA_HIGH {
            self.dalpha = -POINTER_ALPHA_STEP;
        } else if self.alpha < POINTER_ALPHA_LOW {
            self.dalpha = POINTER_ALPHA_STEP;
        }
        self.alpha += self.dalpha;
    }

    /// Buttons first, then the translucent highlight over the current one.
    pub fn draw(&self, out: &mut DrawList) {
        for button in self.buttons() {
            button.draw(out);
        }
        if let Some(current) = self.current() {
            out.fill(current.rect, Color::SPACE_GREY.alpha8(self.alpha()));
        }
    }
}

// ── Label ────────────────────────────────────────────────────────────────────

/// Centred text that can pulse its opacity.
#[derive(Clone, Debug)]
pub struct Label {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub scale: u32,
    pub color: Color,
    pub show: bool,
    blink: bool,
    alpha: i16,
    dalpha: i16,
}

impl Label {
    pub fn new(text: &str, x: i32, y: i32, scale: u32, color: Color) -> Self {
        Self { text: text.to_string(), x, y, scale, color, show: true, blink: false, alpha: 255, dalpha: 5 }
    }

    pub fn blinking(mut self) -> Self {
        self.blink = true;
        self
    }

    pub fn alpha(&self) -> u8 {
        self.alpha.clamp(0, 255) as u8
    }

    pub fn update(&mut self) {
        if !self.blink {
            return;
        }
        if self.alpha < 5 {
            self.dalpha = 5;
        } else if self.alpha > 250 {
            self.dalpha = -5;
        }
        self.alpha += self.dalpha;
    }

    pub fn draw(&self, out: &mut DrawList) {
        if self.show {
            let y = self.y - (font::GLYPH_H * self.scale) as i32 / 2;
            out.text(&self.text, self.x, y, self.scale, self.color.alpha8(self.alpha()), Align::Center);
        }
    }
}

/// Full-width translucent band with centred text, used for banners.
pub fn banner(out: &mut DrawList, text: &str, cy: i32, width: i32, scale: u32) {
    let h = (font::GLYPH_H * scale) as i32 + 22;
    out.fill(Rect::new(0, cy - h / 2, width, h), Color::BLACK.alpha8(150));
    out.text(text, width / 2, cy - (font::GLYPH_H * scale) as i32 / 2, scale, Color::SPACE_GREY, Align::Center);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> MenuPointer {
        MenuPointer::new(vec![
            vec![Button::new("a", "A", 100, 100, 50), Button::new("b", "B", 200, 100, 50)],
            vec![Button::new("exit", "EXIT", 100, 200, 50)],
        ])
    }

    #[test]
    fn pointer_wraps_both_axes() {
        let mut p = menu();
        assert_eq!(p.click(), Some("a"));
        p.move_by(-1, 0);
        assert_eq!(p.click(), Some("b"));
        p.move_by(0, 1);
        // Short row: any column lands on its only button.
        assert_eq!(p.click(), Some("exit"));
        p.move_by(0, 1);
        assert_eq!(p.click(), Some("b"));
    }

    #[test]
    fn pointer_alpha_bounces() {
        let mut p = menu();
        let alphas: Vec<u8> = (0..12)
            .map(|_| {
                p.update();
                p.alpha()
            })
            .collect();
        assert_eq!(alphas[..7], [15, 30, 45, 60, 75, 90, 75]);
        assert!(alphas.iter().all(|a| *a <= 90));
    }

    #[test]
    fn label_blink_stays_in_range() {
        let mut label = Label::new("GAME START", 0, 0, 3, Color::WHITE).blinking();
        for _ in 0..200 {
            label.update();
            assert!(label.alpha() <= 255);
        }
        let mut still = Label::new("X", 0, 0, 1, Color::WHITE);
        still.update();
        assert_eq!(still.alpha(), 255);
    }
}
