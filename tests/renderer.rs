use std::collections::HashMap;

use versus::geometry::Rect;
use versus::renderer::sprite_atlas::{SpriteData, WHITE_TEXEL};
use versus::renderer::{Align, Color, DrawList, build_vertices, font};

fn uv(u0: f32, u1: f32) -> SpriteData {
    SpriteData { uv_min: [u0, 0.0], uv_max: [u1, 1.0] }
}

fn atlas() -> HashMap<String, SpriteData> {
    let mut sprites = HashMap::new();
    sprites.insert("hero".to_string(), uv(0.0, 0.5));
    sprites.insert(WHITE_TEXEL.to_string(), uv(0.9, 1.0));
    sprites.insert(font::glyph_name('A'), uv(0.5, 0.6));
    sprites
}

#[test]
fn sprite_becomes_two_triangles() {
    let mut list = DrawList::new();
    list.sprite("hero", Rect::new(10, 20, 30, 40));
    let verts = build_vertices(&list, &atlas());
    assert_eq!(verts.len(), 6);
    assert_eq!(verts[0].position, [10.0, 20.0]);
    assert_eq!(verts[4].position, [40.0, 60.0]);
    assert_eq!(verts[0].uv, [0.0, 0.0]);
}

#[test]
fn flipped_sprite_swaps_u() {
    let mut list = DrawList::new();
    list.sprite_ex("hero", Rect::new(0, 0, 10, 10), true, Color::WHITE);
    let verts = build_vertices(&list, &atlas());
    assert_eq!(verts[0].uv[0], 0.5);
    assert_eq!(verts[1].uv[0], 0.0);
}

#[test]
fn missing_sprites_are_skipped() {
    let mut list = DrawList::new();
    list.sprite("ghost", Rect::new(0, 0, 10, 10));
    list.fill(Rect::new(0, 0, 5, 5), Color::BLACK);
    let verts = build_vertices(&list, &atlas());
    assert_eq!(verts.len(), 6);
    assert_eq!(verts[0].color, Color::BLACK.0);
}

#[test]
fn text_uses_glyph_quads() {
    let mut list = DrawList::new();
    list.text("A A", 0, 0, 2, Color::WHITE, Align::Left);
    assert!(list.contains_text("A A"));
    // Spaces take room but draw nothing.
    assert_eq!(build_vertices(&list, &atlas()).len(), 12);
}

#[test]
fn overlay_is_a_translucent_fill() {
    let mut list = DrawList::new();
    list.overlay(0, 100, 100);
    list.overlay(128, 100, 100);
    let verts = build_vertices(&list, &atlas());
    assert!(!verts.is_empty());
    let alpha = verts.last().map(|v| v.color[3]).unwrap_or_default();
    assert!((alpha - 128.0 / 255.0).abs() < 0.01);
}
