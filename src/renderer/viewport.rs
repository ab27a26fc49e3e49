// ── Letterbox viewport ────────────────────────────────────────────────────────
//
// The game always lays out against its fixed logical screen. The window may be
// any size, so the logical screen is scaled uniformly and centred, leaving bars
// on whichever axis has room to spare.

/// Target rectangle in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    const ZERO: Viewport = Viewport { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };
}

/// Largest centred rectangle with the logical aspect ratio that fits the window.
///
/// ```text
/// scale = min(physical_w / logical_w, physical_h / logical_h)
/// ```
pub fn letterbox(physical: (u32, u32), logical: (u32, u32)) -> Viewport {
    let (lw, lh) = logical;
    if lw == 0 || lh == 0 {
        return Viewport::ZERO;
    }
    let (pw, ph) = (physical.0 as f32, physical.1 as f32);
    let (lw, lh) = (lw as f32, lh as f32);

    let scale = (pw / lw).min(ph / lh);
    let width = lw * scale;
    let height = lh * scale;
    Viewport { x: (pw - width) / 2.0, y: (ph - height) / 2.0, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn exact_fit_has_no_bars() {
        let v = letterbox((1280, 960), (1280, 960));
        assert_eq!(v, Viewport { x: 0.0, y: 0.0, width: 1280.0, height: 960.0 });
    }

    #[test]
    fn widescreen_window_gets_side_bars() {
        // 4:3 game in a 1920x1080 window: scale 1.125, 1440 wide, 240 each side.
        let v = letterbox((1920, 1080), (1280, 960));
        assert!(close(v.x, 240.0) && close(v.y, 0.0));
        assert!(close(v.width, 1440.0) && close(v.height, 1080.0));
    }

    #[test]
    fn tall_window_gets_top_and_bottom_bars() {
        let v = letterbox((640, 960), (1280, 960));
        assert!(close(v.width, 640.0) && close(v.height, 480.0));
        assert!(close(v.y, 240.0));
    }

    #[test]
    fn degenerate_sizes_yield_empty_viewport() {
        assert_eq!(letterbox((1280, 960), (0, 960)), Viewport::ZERO);
        let v = letterbox((0, 0), (1280, 960));
        assert_eq!(v.width, 0.0);
        assert_eq!(v.height, 0.0);
    }
}
