//! Backend-independent draw commands. Screens fill a [`DrawList`] each frame;
//! the wgpu renderer turns it into quads and tests inspect it directly.

use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Color = Color([0.0, 0.0, 0.0, 1.0]);
    pub const SPACE_GREY: Color = Color::rgb8(218, 218, 218);
    pub const NICE_GREY: Color = Color::rgb8(69, 69, 69);
    pub const PLAYER_ONE: Color = Color::rgb8(0, 154, 255);
    pub const PLAYER_TWO: Color = Color::rgb8(255, 81, 163);
    pub const STAGE_FLOOR: Color = Color::rgb8(231, 206, 82);
    pub const HP_BACK: Color = Color::rgb8(75, 75, 75);
    pub const HP_FILL: Color = Color::rgb8(0, 128, 0);
    pub const ERROR: Color = Color::rgb8(220, 40, 40);
    pub const SUCCESS: Color = Color::rgb8(40, 180, 60);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
    }

    /// Same colour with an 8-bit alpha.
    pub fn alpha8(self, a: u8) -> Self {
        self.with_alpha(a as f32 / 255.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        let [r, g, b, _] = self.0;
        Color([r, g, b, a])
    }

    pub fn player(number: u8) -> Self {
        if number == 1 { Color::PLAYER_ONE } else { Color::PLAYER_TWO }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    /// `x` is the horizontal centre of the text.
    Center,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Sprite { name: String, rect: Rect, flip_x: bool, tint: Color },
    Fill { rect: Rect, color: Color },
    /// Built-in bitmap font; `scale` multiplies the 5×7 glyph cell.
    Text { text: String, x: i32, y: i32, scale: u32, color: Color, align: Align },
}

#[derive(Clone, Debug, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprite(&mut self, name: &str, rect: Rect) {
        self.sprite_ex(name, rect, false, Color::WHITE);
    }

    pub fn sprite_ex(&mut self, name: &str, rect: Rect, flip_x: bool, tint: Color) {
        self.cmds.push(DrawCmd::Sprite { name: name.to_string(), rect, flip_x, tint });
    }

    pub fn fill(&mut self, rect: Rect, color: Color) {
        self.cmds.push(DrawCmd::Fill { rect, color });
    }

    pub fn text(&mut self, text: &str, x: i32, y: i32, scale: u32, color: Color, align: Align) {
        self.cmds.push(DrawCmd::Text { text: text.to_string(), x, y, scale, color, align });
    }

    /// Full-screen black overlay, skipped when fully transparent.
    pub fn overlay(&mut self, alpha: u8, width: i32, height: i32) {
        if alpha > 0 {
            self.fill(Rect::new(0, 0, width, height), Color::BLACK.alpha8(alpha));
        }
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    /// Every string drawn, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    pub fn sprites(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Sprite { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}
