use versus::geometry::*;

#[test]
fn rect_edges_and_centre() {
    let r = Rect::new(10, 20, 30, 40);
    assert_eq!(r.right(), 40);
    assert_eq!(r.bottom(), 60);
    assert_eq!((r.center_x(), r.center_y()), (25, 40));
}

#[test]
fn rect_anchors() {
    assert_eq!(Rect::from_bottom_left(0, 100, 10, 20), Rect::new(0, 80, 10, 20));
    assert_eq!(Rect::from_bottom_right(50, 100, 10, 20), Rect::new(40, 80, 10, 20));
    assert_eq!(Rect::from_center(50, 50, 20, 10), Rect::new(40, 45, 20, 10));
}

#[test]
fn touching_rects_do_not_intersect() {
    let a = Rect::new(0, 0, 10, 10);
    assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
    assert_eq!(a.intersection(&Rect::new(5, 5, 10, 10)), Some(Rect::new(5, 5, 5, 5)));
}

#[test]
fn mask_counts_and_bounds() {
    let mut m = Mask::empty(4, 3);
    m.set(1, 1, true);
    m.set(9, 9, true);
    assert_eq!(m.count(), 1);
    assert!(m.get(1, 1));
    assert!(!m.get(-1, 0));
    assert!(!m.get(4, 0));
}

#[test]
fn flipped_mask_mirrors_columns() {
    let mut m = Mask::empty(4, 1);
    m.set(0, 0, true);
    let f = m.flipped_horizontal();
    assert!(f.get(3, 0));
    assert!(!f.get(0, 0));
}

#[test]
fn overlapping_boxes_with_empty_pixels_do_not_collide() {
    // Two 4×4 masks solid only in opposite corners.
    let mut a = Mask::empty(4, 4);
    a.set(0, 0, true);
    let mut b = Mask::empty(4, 4);
    b.set(3, 3, true);
    let ra = Rect::new(0, 0, 4, 4);
    let rb = Rect::new(2, 2, 4, 4);
    assert!(ra.intersects(&rb));
    assert!(!masks_collide(&ra, &a, &rb, &b));
}

#[test]
fn solid_masks_collide_when_rects_overlap() {
    let a = Mask::filled(8, 8);
    let b = Mask::filled(8, 8);
    assert!(masks_collide(&Rect::new(0, 0, 8, 8), &a, &Rect::new(7, 7, 8, 8), &b));
    assert!(!masks_collide(&Rect::new(0, 0, 8, 8), &a, &Rect::new(8, 0, 8, 8), &b));
}
