use std::collections::{HashMap, HashSet};

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

/// Atlas entry used for solid fills: a single opaque white texel.
pub const WHITE_TEXEL: &str = "__white";

// ── SpriteData ───────────────────────────────────────────────────────────────

/// UV rectangle of a single named image inside the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteData {
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

// ── Shelf packing (pure, GPU-free) ───────────────────────────────────────────

/// One sprite's position inside the packed atlas.
#[derive(Debug, PartialEq)]
pub(crate) struct PlacedSprite {
    pub name: String,
    pub atlas_x: u32,
    pub atlas_y: u32,
    pub pixel_w: u32,
    pub pixel_h: u32,
}

/// Shelf-pack `(name, w, h)` items into rows of at most `max_width` pixels.
///
/// Tallest items go first. Duplicate names keep only their first placement and
/// items wider than a row are skipped. Both returned atlas dimensions are
/// powers of two.
pub(crate) fn pack(items: &[(String, u32, u32)], max_width: u32) -> (Vec<PlacedSprite>, u32, u32) {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[b].2.cmp(&items[a].2));

    let mut placed_names: HashSet<&str> = HashSet::new();
    let mut placements: Vec<PlacedSprite> = Vec::new();
    let mut cur_x = 0u32;
    let mut cur_y = 0u32;
    let mut row_h = 0u32;

    for &i in &order {
        let (ref name, w, h) = items[i];
        if !placed_names.insert(name.as_str()) {
            continue;
        }
        if w > max_width {
            warn!(sprite = %name, width = w, max_width, "sprite wider than atlas; skipping");
            continue;
        }
        if cur_x + w > max_width {
            cur_y += row_h;
            cur_x = 0;
            row_h = 0;
        }

        placements.push(PlacedSprite {
            name: name.clone(),
            atlas_x: cur_x,
            atlas_y: cur_y,
            pixel_w: w,
            pixel_h: h,
        });
        cur_x += w;
        row_h = row_h.max(h);
    }

    let used_h = cur_y + row_h;
    let atlas_h = used_h.next_power_of_two().max(1);
    let atlas_w = max_width.next_power_of_two();
    (placements, atlas_w, atlas_h)
}

/// Composite named images into one RGBA page and compute each UV rectangle.
/// A [`WHITE_TEXEL`] entry is always added.
pub fn compose<'a>(
    images: impl IntoIterator<Item = (&'a str, &'a RgbaImage)>,
    max_width: u32,
) -> (RgbaImage, HashMap<String, SpriteData>) {
    let white = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
    let mut lookup: HashMap<&str, &RgbaImage> = HashMap::new();
    lookup.insert(WHITE_TEXEL, &white);
    for (name, img) in images {
        lookup.insert(name, img);
    }

    let dims: Vec<(String, u32, u32)> =
        lookup.iter().map(|(name, img)| (name.to_string(), img.width(), img.height())).collect();
    let (placements, atlas_w, atlas_h) = pack(&dims, max_width);

    let mut page = RgbaImage::new(atlas_w, atlas_h);
    let mut sprites = HashMap::with_capacity(placements.len());
    for p in &placements {
        let Some(img) = lookup.get(p.name.as_str()) else { continue };
        image::imageops::replace(&mut page, *img, i64::from(p.atlas_x), i64::from(p.atlas_y));
        let uv_min = [p.atlas_x as f32 / atlas_w as f32, p.atlas_y as f32 / atlas_h as f32];
        let uv_max = [
            (p.atlas_x + p.pixel_w) as f32 / atlas_w as f32,
            (p.atlas_y + p.pixel_h) as f32 / atlas_h as f32,
        ];
        sprites.insert(p.name.clone(), SpriteData { uv_min, uv_max });
    }
    debug!(sprites = sprites.len(), width = atlas_w, height = atlas_h, "atlas composed");
    (page, sprites)
}

// ── SpriteAtlas ──────────────────────────────────────────────────────────────

pub struct SpriteAtlas {
    pub sprites: HashMap<String, SpriteData>,
    pub texture_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl SpriteAtlas {
    /// Maximum row width of the packed atlas texture in pixels.
    pub const ATLAS_WIDTH: u32 = 4096;

    pub fn build<'a>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        images: impl IntoIterator<Item = (&'a str, &'a RgbaImage)>,
    ) -> Self {
        let (page, sprites) = compose(images, Self::ATLAS_WIDTH);
        let (texture_view, sampler) = Self::upload(device, queue, &page);
        Self { sprites, texture_view, sampler }
    }

    fn upload(device: &wgpu::Device, queue: &wgpu::Queue, img: &RgbaImage) -> (wgpu::TextureView, wgpu::Sampler) {
        use wgpu::util::DeviceExt;

        let (w, h) = img.dimensions();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("sprite_atlas_tex"),
                size: wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            img.as_raw(),
        );
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        (texture_view, sampler)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, w: u32, h: u32) -> (String, u32, u32) {
        (name.to_string(), w, h)
    }

    #[test]
    fn pack_empty_input_returns_no_placements() {
        let (placements, atlas_w, atlas_h) = pack(&[], 512);
        assert!(placements.is_empty());
        assert_eq!(atlas_h, 1);
        assert_eq!(atlas_w, 512);
    }

    #[test]
    fn pack_wraps_to_next_shelf_when_row_full() {
        let items = [item("a", 200, 32), item("b", 200, 32), item("c", 200, 32)];
        let (pl, _, _) = pack(&items, 512);
        let row1: Vec<_> = pl.iter().filter(|p| p.atlas_y > 0).collect();
        assert_eq!(row1.len(), 1, "third sprite wraps to row 1");
        assert_eq!(row1[0].atlas_y, 32);
    }

    #[test]
    fn pack_sorts_taller_sprites_first() {
        let items = [item("small", 32, 16), item("tall", 32, 64)];
        let (pl, _, _) = pack(&items, 512);
        let tall = pl.iter().find(|p| p.name == "tall").unwrap();
        let small = pl.iter().find(|p| p.name == "small").unwrap();
        assert!(tall.atlas_x < small.atlas_x);
    }

    #[test]
    fn pack_skips_sprite_wider_than_atlas() {
        let items = [item("stage", 600, 48), item("glyph:A", 5, 7)];
        let (pl, _, _) = pack(&items, 512);
        assert_eq!(pl.len(), 1);
        assert_eq!(pl[0].name, "glyph:A");
    }

    #[test]
    fn pack_never_overflows_atlas() {
        let items: Vec<_> = (0..10).map(|i| item(&format!("s{i}"), 100, 30)).collect();
        let (pl, atlas_w, atlas_h) = pack(&items, 256);
        for p in &pl {
            assert!(p.atlas_x + p.pixel_w <= atlas_w);
            assert!(p.atlas_y + p.pixel_h <= atlas_h);
        }
    }

    #[test]
    fn compose_adds_white_texel_and_copies_pixels() {
        let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let (page, sprites) = compose([("red", &red)], 64);
        assert!(sprites.contains_key(WHITE_TEXEL));
        let uv = sprites["red"];
        let x = (uv.uv_min[0] * page.width() as f32) as u32;
        let y = (uv.uv_min[1] * page.height() as f32) as u32;
        assert_eq!(page.get_pixel(x, y), &Rgba([255, 0, 0, 255]));
        assert!(uv.uv_min[0] < uv.uv_max[0] && uv.uv_min[1] < uv.uv_max[1]);
    }
}
