use crate::geometry::Rect;
use crate::input::{InputState, KeyCode};
use crate::renderer::{Align, Color, DrawList, font};

const FIELD_TEXT_SCALE: u32 = 3;
/// Ticks per caret blink phase.
const CARET_PERIOD: u32 = 30;

/// Single-line text entry for the login overlay.
///
/// While focused it consumes the tick's typed characters and `Backspace`
/// removes the last one. A masked field draws `*` in place of each character.
#[derive(Clone, Debug)]
pub struct TextField {
    pub value: String,
    pub placeholder: String,
    pub max_chars: usize,
    pub focused: bool,
    pub masked: bool,
    pub rect: Rect,
    blink: u32,
}

impl TextField {
    pub fn new(placeholder: &str, rect: Rect, max_chars: usize) -> Self {
        Self {
            value: String::new(),
            placeholder: placeholder.to_string(),
            max_chars: max_chars.max(1),
            focused: false,
            masked: false,
            rect,
            blink: 0,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.focused = false;
        self.blink = 0;
    }

    /// Apply this tick's typing. Returns `true` if the value changed.
    pub fn feed(&mut self, input: &InputState) -> bool {
        if !self.focused {
            self.blink = 0;
            return false;
        }
        self.blink = self.blink.wrapping_add(1);

        let mut changed = false;
        for &ch in &input.chars_typed {
            if self.value.chars().count() < self.max_chars {
                self.value.push(ch);
                changed = true;
            }
        }
        if input.is_key_pressed(KeyCode::Backspace) && self.value.pop().is_some() {
            changed = true;
        }
        changed
    }

    fn caret_visible(&self) -> bool {
        self.focused && (self.blink / CARET_PERIOD) % 2 == 0
    }

    pub fn display_text(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    pub fn draw(&self, out: &mut DrawList) {
        let border = if self.focused { Color::SPACE_GREY } else { Color::NICE_GREY };
        let r = self.rect;
        out.fill(r, border);
        out.fill(Rect::new(r.x + 2, r.y + 2, r.w - 4, r.h - 4), Color::BLACK.alpha8(220));

        let text_y = r.center_y() - (font::GLYPH_H * FIELD_TEXT_SCALE) as i32 / 2;
        if self.value.is_empty() && !self.focused {
            out.text(&self.placeholder, r.x + 12, text_y, FIELD_TEXT_SCALE, Color::NICE_GREY, Align::Left);
            return;
        }
        let mut shown = self.display_text();
        if self.caret_visible() {
            shown.push('_');
        }
        out.text(&shown, r.x + 12, text_y, FIELD_TEXT_SCALE, Color::SPACE_GREY, Align::Left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::new();
        for ch in text.chars() {
            input.type_char(ch);
        }
        input
    }

    #[test]
    fn unfocused_field_ignores_typing() {
        let mut field = TextField::new("USER", Rect::new(0, 0, 300, 50), 16);
        assert!(!field.feed(&typed("abc")));
        assert!(field.value.is_empty());
    }

    #[test]
    fn typing_respects_limit_and_backspace() {
        let mut field = TextField::new("USER", Rect::new(0, 0, 300, 50), 4);
        field.focused = true;
        assert!(field.feed(&typed("abcdef")));
        assert_eq!(field.value, "abcd");

        let mut input = InputState::new();
        input.press(KeyCode::Backspace);
        assert!(field.feed(&input));
        assert_eq!(field.value, "abc");
    }

    #[test]
    fn masked_field_hides_characters() {
        let mut field = TextField::new("PASS", Rect::new(0, 0, 300, 50), 16).masked();
        field.value = "secret1".into();
        assert_eq!(field.display_text(), "*******");
    }
}
