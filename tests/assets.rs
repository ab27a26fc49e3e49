use std::path::Path;

use image::{Rgba, RgbaImage};
use versus::assets::{ANIMATIONS, Assets, slice_sheet};
use versus::error::AssetError;

#[test]
fn placeholder_assets_cover_every_animation() {
    let assets = Assets::placeholder();
    let art = assets.roster().next().unwrap();
    for &(animation, count) in ANIMATIONS {
        assert_eq!(art.frame_count(animation), count, "{animation}");
    }
    let frame = art.frame("stand", 0).unwrap();
    assert!(assets.image(&frame.sprite).is_some());
    assert!(frame.mask.count() > 0);
    assert!(assets.image(&art.thumb).is_some());
    assert!(assets.image(&art.portrait).is_some());
}

#[test]
fn missing_asset_folder_falls_back_to_placeholders() {
    let assets = Assets::load(Path::new("/definitely/not/an/asset/dir"));
    for name in ["bg", "logo", "stage/bg", "stage/fg"] {
        assert!(assets.image(name).is_some(), "{name}");
    }
    assert!(assets.character("dangai").is_some());
    assert_eq!(assets.sounds().count(), 0);
}

#[test]
fn sheets_are_scaled_then_sliced() {
    let sheet = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
    let meta = r#"{ "stand": [ { "x": 2, "y": 0, "w": 4, "h": 5, "ox": 1, "oy": 0, "ow": 6, "oh": 5 } ] }"#;
    let frames = slice_sheet("test", &sheet, meta, 2).unwrap();
    let stand = &frames["stand"];
    assert_eq!(stand.len(), 1);
    assert_eq!(stand[0].image.dimensions(), (8, 10));
    assert_eq!(stand[0].meta.dx, 2 - 4);
    assert_eq!(stand[0].meta.off_w, 12);
}

#[test]
fn frames_outside_the_sheet_are_rejected() {
    let sheet = RgbaImage::new(8, 8);
    let meta = r#"{ "run": [ { "x": 6, "y": 0, "w": 4, "h": 4, "ox": 0, "oy": 0, "ow": 4, "oh": 4 } ] }"#;
    assert!(matches!(
        slice_sheet("test", &sheet, meta, 2),
        Err(AssetError::FrameOutOfBounds { index: 0, .. })
    ));
    assert!(matches!(slice_sheet("test", &sheet, "not json", 2), Err(AssetError::Metadata { .. })));
}
