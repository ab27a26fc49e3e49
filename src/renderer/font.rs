//! Built-in 5×7 bitmap font. Glyphs are baked into the sprite atlas as
//! `glyph:<CH>` images; lowercase letters share the uppercase shapes.

use image::{Rgba, RgbaImage};

use super::draw::Align;
use crate::geometry::Rect;

pub const GLYPH_W: u32 = 5;
pub const GLYPH_H: u32 = 7;
/// Horizontal cell size including one column of spacing.
pub const ADVANCE: u32 = 6;

#[rustfmt::skip]
const GLYPHS: &[(char, [u8; 7])] = &[
    ('A', [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('B', [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('D', [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('F', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('G', [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
    ('H', [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('I', [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('J', [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
    ('K', [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
    ('L', [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
    ('M', [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
    ('N', [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001]),
    ('O', [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('Q', [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
    ('R', [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
    ('S', [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('U', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('V', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
    ('W', [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
    ('X', [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
    ('Y', [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100]),
    ('Z', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    ('!', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    (',', [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('?', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100]),
    ('\'', [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('/', [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000]),
    ('(', [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010]),
    (')', [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000]),
    ('_', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111]),
    ('>', [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000]),
    ('<', [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010]),
    ('*', [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000]),
    ('#', [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010]),
];

fn normalize(ch: char) -> char {
    ch.to_ascii_uppercase()
}

pub fn glyph_rows(ch: char) -> Option<[u8; 7]> {
    let ch = normalize(ch);
    GLYPHS.iter().find(|(c, _)| *c == ch).map(|(_, rows)| *rows)
}

pub fn glyph_name(ch: char) -> String {
    format!("glyph:{}", normalize(ch))
}

/// One white-on-transparent image per glyph, for baking into the atlas.
pub fn glyph_images() -> Vec<(String, RgbaImage)> {
    GLYPHS
        .iter()
        .map(|&(ch, rows)| {
            let mut img = RgbaImage::new(GLYPH_W, GLYPH_H);
            for (y, row) in rows.iter().enumerate() {
                for x in 0..GLYPH_W {
                    if row & (1 << (GLYPH_W - 1 - x)) != 0 {
                        img.put_pixel(x, y as u32, Rgba([255, 255, 255, 255]));
                    }
                }
            }
            (glyph_name(ch), img)
        })
        .collect()
}

/// Rendered width in pixels.
pub fn text_width(text: &str, scale: u32) -> i32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    ((n * ADVANCE - 1) * scale) as i32
}

/// Glyph quads for `text` with its top edge at `y`. Spaces advance without a
/// quad; characters the font lacks render as `?`.
pub fn layout(text: &str, x: i32, y: i32, scale: u32, align: Align) -> Vec<(String, Rect)> {
    let start = match align {
        Align::Left => x,
        Align::Center => x - text_width(text, scale) / 2,
    };
    let step = (ADVANCE * scale) as i32;
    let (w, h) = ((GLYPH_W * scale) as i32, (GLYPH_H * scale) as i32);
    text.chars()
        .enumerate()
        .filter(|(_, ch)| !ch.is_whitespace())
        .map(|(i, ch)| {
            let ch = if glyph_rows(ch).is_some() { ch } else { '?' };
            (glyph_name(ch), Rect::new(start + i as i32 * step, y, w, h))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_shares_uppercase_glyph() {
        assert_eq!(glyph_rows('a'), glyph_rows('A'));
        assert_eq!(glyph_name('q'), "glyph:Q");
    }

    #[test]
    fn glyph_table_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        assert!(GLYPHS.iter().all(|(c, _)| seen.insert(*c)));
    }

    #[test]
    fn rows_fit_in_five_columns() {
        assert!(GLYPHS.iter().all(|(_, rows)| rows.iter().all(|r| *r < 32)));
    }

    #[test]
    fn centred_layout_straddles_x() {
        let quads = layout("AB", 100, 0, 2, Align::Center);
        let left = quads[0].1.x;
        let right = quads[1].1.right();
        assert_eq!(100 - left, right - 100);
    }

    #[test]
    fn spaces_take_room_but_no_quad() {
        let quads = layout("A B", 0, 0, 1, Align::Left);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].1.x, 12);
    }
}
