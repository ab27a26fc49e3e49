//! Asset provider: named images, sliced fighter sprite sheets and the roster.
//!
//! Layout under the asset directory:
//!
//! ```text
//! graphics/**.png                 named by relative path ("bg", "stage/bg")
//! chars/<id>/sprites/<sheet>.png  sheet image
//! chars/<id>/sprites/<sheet>.json animation name -> list of frame rects
//! chars/<id>/gfx/<id>_thumb.png
//! chars/<id>/gfx/<id>_portrait.png
//! sound/*.ogg|wav, music/*.ogg|wav
//! ```
//!
//! Anything missing is replaced with generated placeholder art so the game and
//! the tests run without asset files.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::AssetError;
use crate::geometry::Mask;

/// Sheet metadata coordinates are stored at half resolution.
pub const SHEET_SCALE: i32 = 2;

pub struct RosterEntry {
    pub id: &'static str,
    pub name: &'static str,
}

pub const ROSTER: &[RosterEntry] = &[RosterEntry {
    id: "dangai",
    name: "Ichigo Kurosaki (Post Dangai Ver.)",
}];

/// Animations every fighter sheet provides, with their frame counts.
pub const ANIMATIONS: &[(&str, usize)] = &[
    ("stand", 4),
    ("jump", 9),
    ("run", 8),
    ("guard", 3),
    ("dash", 3),
    ("hit", 3),
    ("lightA", 5),
    ("lightNa", 4),
    ("lightNb", 6),
    ("lightNc", 5),
];

const PLACEHOLDER_FRAME: (u32, u32) = (120, 200);

// ── Frames ───────────────────────────────────────────────────────────────────

/// Offset of a trimmed frame inside its original untrimmed cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameMeta {
    pub dx: i32,
    pub dy: i32,
    pub off_w: i32,
    pub off_h: i32,
}

#[derive(Debug, Clone)]
pub struct Frame {
    /// Image name of this frame in [`Assets`].
    pub sprite: String,
    pub width: u32,
    pub height: u32,
    pub meta: FrameMeta,
    pub mask: Arc<Mask>,
    pub mask_flipped: Arc<Mask>,
}

impl Frame {
    fn new(sprite: String, img: &RgbaImage, meta: FrameMeta) -> Self {
        let mask = Mask::from_image(img);
        let mask_flipped = mask.flipped_horizontal();
        Self {
            sprite,
            width: img.width(),
            height: img.height(),
            meta,
            mask: Arc::new(mask),
            mask_flipped: Arc::new(mask_flipped),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct SheetRect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    ox: i32,
    oy: i32,
    ow: i32,
    oh: i32,
}

type SheetMeta = BTreeMap<String, Vec<SheetRect>>;

/// A sliced frame before it is registered: image plus offsets.
pub struct SlicedFrame {
    pub image: RgbaImage,
    pub meta: FrameMeta,
}

/// Scale one sheet up by `scale` and cut it into per-animation frames.
pub fn slice_sheet(
    sheet_name: &str,
    sheet: &RgbaImage,
    meta_json: &str,
    scale: i32,
) -> Result<BTreeMap<String, Vec<SlicedFrame>>, AssetError> {
    let meta: SheetMeta = serde_json::from_str(meta_json)
        .map_err(|source| AssetError::Metadata { path: sheet_name.to_string(), source })?;

    let factor = scale.max(1) as u32;
    let sheet = image::imageops::resize(
        sheet,
        sheet.width() * factor,
        sheet.height() * factor,
        image::imageops::FilterType::Nearest,
    );
    let (sw, sh) = (sheet.width() as i32, sheet.height() as i32);
    let mut out = BTreeMap::new();
    for (animation, rects) in meta {
        let mut frames = Vec::with_capacity(rects.len());
        for (index, r) in rects.iter().enumerate() {
            let (x, y, w, h) = (r.x * scale, r.y * scale, r.w * scale, r.h * scale);
            if x < 0 || y < 0 || w <= 0 || h <= 0 || x + w > sw || y + h > sh {
                return Err(AssetError::FrameOutOfBounds {
                    sheet: sheet_name.to_string(),
                    animation,
                    index,
                });
            }
            let image = image::imageops::crop_imm(&sheet, x as u32, y as u32, w as u32, h as u32).to_image();
            let meta = FrameMeta {
                dx: r.ox * scale - x,
                dy: r.oy * scale - y,
                off_w: r.ow * scale,
                off_h: r.oh * scale,
            };
            frames.push(SlicedFrame { image, meta });
        }
        out.insert(animation, frames);
    }
    Ok(out)
}

// ── CharacterArt ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CharacterArt {
    pub id: String,
    pub name: String,
    pub thumb: String,
    pub portrait: String,
    animations: HashMap<String, Vec<Frame>>,
}

impl CharacterArt {
    pub fn frame(&self, animation: &str, index: usize) -> Option<&Frame> {
        self.animations.get(animation).and_then(|frames| frames.get(index))
    }

    pub fn frame_count(&self, animation: &str) -> usize {
        self.animations.get(animation).map_or(0, Vec::len)
    }
}

// ── Assets ───────────────────────────────────────────────────────────────────

pub struct Assets {
    images: HashMap<String, RgbaImage>,
    characters: BTreeMap<String, CharacterArt>,
    sounds: HashMap<String, PathBuf>,
}

impl Assets {
    /// Fully generated asset set; touches no files.
    pub fn placeholder() -> Self {
        let mut assets = Self::empty();
        assets.fill_missing_graphics();
        for entry in ROSTER {
            assets.add_character(entry, BTreeMap::new(), None, None);
        }
        assets
    }

    /// Load everything under `dir`, substituting placeholders for what is missing.
    pub fn load(dir: &Path) -> Self {
        let mut assets = Self::empty();

        let gfx_dir = dir.join("graphics");
        if gfx_dir.is_dir() {
            for (name, path) in png_files(&gfx_dir) {
                match open_rgba(&path) {
                    Ok(img) => {
                        assets.images.insert(name, img);
                    }
                    Err(e) => warn!(error = %e, "skipping graphic"),
                }
            }
        } else {
            warn!(dir = %gfx_dir.display(), "graphics folder missing; using placeholders");
        }
        assets.fill_missing_graphics();

        for entry in ROSTER {
            let char_dir = dir.join("chars").join(entry.id);
            let sliced = load_sheets(&char_dir.join("sprites"));
            let gfx = char_dir.join("gfx");
            let thumb = open_rgba(&gfx.join(format!("{}_thumb.png", entry.id))).ok();
            let portrait = open_rgba(&gfx.join(format!("{}_portrait.png", entry.id))).ok();
            assets.add_character(entry, sliced, thumb, portrait);
        }

        for folder in ["sound", "music"] {
            let Ok(read) = fs::read_dir(dir.join(folder)) else { continue };
            for entry in read.filter_map(Result::ok) {
                let path = entry.path();
                let ext = path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
                if !matches!(ext.as_deref(), Some("ogg") | Some("wav")) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    assets.sounds.insert(stem.to_string(), path.clone());
                }
            }
        }

        info!(
            images = assets.images.len(),
            characters = assets.characters.len(),
            sounds = assets.sounds.len(),
            "assets loaded"
        );
        assets
    }

    fn empty() -> Self {
        Self { images: HashMap::new(), characters: BTreeMap::new(), sounds: HashMap::new() }
    }

    pub fn image(&self, name: &str) -> Option<&RgbaImage> {
        self.images.get(name)
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, &RgbaImage)> {
        self.images.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn character(&self, id: &str) -> Option<&CharacterArt> {
        self.characters.get(id)
    }

    /// Every playable character, ordered by id.
    pub fn roster(&self) -> impl Iterator<Item = &CharacterArt> {
        self.characters.values()
    }

    pub fn sounds(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.sounds.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    fn fill_missing_graphics(&mut self) {
        let defaults: [(&str, (u32, u32), [u8; 4]); 4] = [
            ("bg", (64, 48), [24, 20, 40, 255]),
            ("logo", (480, 180), [200, 40, 40, 255]),
            ("stage/bg", (64, 48), [70, 110, 160, 255]),
            ("stage/fg", (64, 27), [120, 100, 60, 255]),
        ];
        for (name, (w, h), color) in defaults {
            self.images
                .entry(name.to_string())
                .or_insert_with(|| RgbaImage::from_pixel(w, h, Rgba(color)));
        }
    }

    fn add_character(
        &mut self,
        entry: &RosterEntry,
        mut sliced: BTreeMap<String, Vec<SlicedFrame>>,
        thumb: Option<RgbaImage>,
        portrait: Option<RgbaImage>,
    ) {
        let mut animations = HashMap::new();
        for &(animation, count) in ANIMATIONS {
            let frames = match sliced.remove(animation) {
                Some(frames) if frames.len() >= count => frames,
                _ => {
                    debug!(character = entry.id, animation, "using placeholder frames");
                    placeholder_frames(animation, count)
                }
            };
            animations.insert(animation.to_string(), self.register_frames(entry.id, animation, frames));
        }
        for (animation, frames) in sliced {
            let frames = self.register_frames(entry.id, &animation, frames);
            animations.insert(animation, frames);
        }

        let thumb_name = format!("{}/thumb", entry.id);
        let portrait_name = format!("{}/portrait", entry.id);
        self.images.insert(
            thumb_name.clone(),
            thumb.unwrap_or_else(|| RgbaImage::from_pixel(70, 70, Rgba([230, 120, 40, 255]))),
        );
        self.images.insert(
            portrait_name.clone(),
            portrait.unwrap_or_else(|| RgbaImage::from_pixel(180, 160, Rgba([230, 120, 40, 255]))),
        );

        self.characters.insert(
            entry.id.to_string(),
            CharacterArt {
                id: entry.id.to_string(),
                name: entry.name.to_string(),
                thumb: thumb_name,
                portrait: portrait_name,
                animations,
            },
        );
    }

    fn register_frames(&mut self, id: &str, animation: &str, frames: Vec<SlicedFrame>) -> Vec<Frame> {
        frames
            .into_iter()
            .enumerate()
            .map(|(i, sliced)| {
                let sprite = format!("{id}/{animation}/{i}");
                let frame = Frame::new(sprite.clone(), &sliced.image, sliced.meta);
                self.images.insert(sprite, sliced.image);
                frame
            })
            .collect()
    }
}

fn open_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| AssetError::Image { path: path.display().to_string(), source })
}

/// `.png` files under `root`, named by their path relative to it.
fn png_files(root: &Path) -> Vec<(String, PathBuf)> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("png"))
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?.with_extension("");
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            (!name.is_empty() && !name.starts_with('.')).then(|| (name, e.path().to_path_buf()))
        })
        .collect()
}

fn load_sheets(dir: &Path) -> BTreeMap<String, Vec<SlicedFrame>> {
    let mut all = BTreeMap::new();
    if !dir.is_dir() {
        return all;
    }
    for (name, path) in png_files(dir) {
        let meta_path = path.with_extension("json");
        let result = fs::read_to_string(&meta_path)
            .map_err(|source| AssetError::Io { path: meta_path.display().to_string(), source })
            .and_then(|json| open_rgba(&path).map(|sheet| (json, sheet)))
            .and_then(|(json, sheet)| slice_sheet(&name, &sheet, &json, SHEET_SCALE));
        match result {
            Ok(animations) => all.extend(animations),
            Err(e) => warn!(error = %e, "skipping sprite sheet"),
        }
    }
    all
}

/// A flat silhouette; attack animations add a forward-reaching arm.
fn placeholder_frames(animation: &str, count: usize) -> Vec<SlicedFrame> {
    let (w, h) = PLACEHOLDER_FRAME;
    let attacking = animation.starts_with("light");
    let body = match animation {
        "hit" => Rgba([220, 60, 60, 255]),
        "guard" => Rgba([90, 160, 220, 255]),
        _ if attacking => Rgba([240, 200, 80, 255]),
        _ => Rgba([230, 120, 40, 255]),
    };
    (0..count)
        .map(|_| {
            let mut image = RgbaImage::new(w, h);
            for y in 20..h {
                for x in 20..80 {
                    image.put_pixel(x, y, body);
                }
            }
            if attacking {
                for y in 50..75 {
                    for x in 80..w {
                        image.put_pixel(x, y, body);
                    }
                }
            }
            SlicedFrame {
                image,
                meta: FrameMeta { dx: 0, dy: 0, off_w: w as i32, off_h: h as i32 },
            }
        })
        .collect()
}
