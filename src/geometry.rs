// =============================================================================
// GEOMETRY.RS: Screen rectangles and per-pixel collision masks
//
// Fighters collide on the opaque pixels of their current animation frame, not
// on their bounding boxes. A mask is built once per frame image at load time;
// collision tests only walk the intersection of the two rectangles.
// =============================================================================

use image::RgbaImage;

/// Alpha values above this count as solid, matching the sprite loader.
pub const MASK_ALPHA_THRESHOLD: u8 = 127;

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in screen pixels (y grows downward).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle whose bottom-left corner sits at `(x, y)`.
    pub fn from_bottom_left(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y - h, w, h)
    }

    /// Rectangle whose bottom-right corner sits at `(x, y)`.
    pub fn from_bottom_right(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x - w, y - h, w, h)
    }

    pub fn from_center(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Self::new(cx - w / 2, cy - h / 2, w, h)
    }

    pub fn right(&self) -> i32 { self.x + self.w }
    pub fn bottom(&self) -> i32 { self.y + self.h }
    pub fn center_x(&self) -> i32 { self.x + self.w / 2 }
    pub fn center_y(&self) -> i32 { self.y + self.h / 2 }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        (x1 > x0 && y1 > y0).then(|| Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }
}

// ── Mask ──────────────────────────────────────────────────────────────────────

/// Solid/empty bitmap the size of a sprite frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self { width, height, bits: vec![false; (width * height) as usize] }
    }

    pub fn filled(width: u32, height: u32) -> Self {
        Self { width, height, bits: vec![true; (width * height) as usize] }
    }

    pub fn from_image(img: &RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let bits = img.pixels().map(|p| p.0[3] > MASK_ALPHA_THRESHOLD).collect();
        Self { width, height, bits }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        if x < self.width && y < self.height {
            self.bits[(y * self.width + x) as usize] = solid;
        }
    }

    /// Number of solid pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn flipped_horizontal(&self) -> Self {
        let mut out = Self::empty(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.bits[(y * self.width + x) as usize] =
                    self.bits[(y * self.width + (self.width - 1 - x)) as usize];
            }
        }
        out
    }

    /// True when any solid pixel of `other`, placed at `offset` relative to
    /// this mask's top-left corner, lands on a solid pixel of this mask.
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (ox, oy) = offset;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (self.width as i32).min(ox + other.width as i32);
        let y1 = (self.height as i32).min(oy + other.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - ox, y - oy) {
                    return true;
                }
            }
        }
        false
    }
}

/// Pixel-perfect test between two placed masks.
pub fn masks_collide(a_rect: &Rect, a_mask: &Mask, b_rect: &Rect, b_mask: &Mask) -> bool {
    a_rect.intersects(b_rect) && a_mask.overlaps(b_mask, (b_rect.x - a_rect.x, b_rect.y - a_rect.y))
}
