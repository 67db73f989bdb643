use super::*;

use crate::prepare::pipeline::AlphaSource;
use crate::signature::cache::{ContentInput, signature_of};

fn mark(id: &str, kind: MarkKind, rect: Rect) -> Mark {
    Mark::from_rect(id, kind, rect)
}

fn sprite(w: u32, h: u32) -> PreparedOverlay {
    PreparedOverlay {
        raster: Raster::filled(w, h, [255, 0, 0, 255]),
        has_alpha: true,
        source: AlphaSource::BorderStrip,
        trimmed: true,
    }
}

fn sig(prompt: &str) -> Signature {
    signature_of(&ContentInput::Describe {
        prompt: prompt.to_string(),
    })
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn initial_placement_follows_mark_and_damping() {
    let mut engine = PlacementEngine::default();
    let m = mark("m1", MarkKind::Image, Rect::new(0.2, 0.3, 0.6, 0.5));
    let asset = engine
        .create(&m, sprite(20, 10), sig("fox"), OverlayOrigin::AiGenerated)
        .unwrap();

    assert!(approx(asset.placement.center.x, 0.4));
    assert!(approx(asset.placement.center.y, 0.4));
    assert!(approx(asset.placement.scale, 1.0));
    assert!(approx(asset.placement.base_width_percent, 40.0 * 0.85));
    assert!(approx(asset.aspect_ratio, 2.0));
}

#[test]
fn damping_depends_on_kind_and_origin() {
    let opts = PlacementOpts::default();
    let text = mark("t", MarkKind::Text, Rect::new(0.0, 0.0, 0.5, 0.1));
    let image = mark("i", MarkKind::Image, Rect::new(0.0, 0.0, 0.5, 0.1));
    assert!(approx(opts.initial_base_width(&text, OverlayOrigin::UserUpload), 37.5));
    assert!(approx(opts.initial_base_width(&image, OverlayOrigin::UserUpload), 47.5));
    assert!(approx(opts.initial_base_width(&image, OverlayOrigin::AiGenerated), 42.5));
}

#[test]
fn base_width_is_clamped_and_degenerate_marks_use_default() {
    let opts = PlacementOpts::default();
    let tiny = mark("a", MarkKind::Image, Rect::new(0.5, 0.5, 0.52, 0.6));
    assert!(approx(opts.initial_base_width(&tiny, OverlayOrigin::UserUpload), 5.0));

    let flat = mark("b", MarkKind::Text, Rect::new(0.5, 0.5, 0.505, 0.6));
    assert!(approx(opts.initial_base_width(&flat, OverlayOrigin::UserUpload), 22.5));
}

#[test]
fn center_is_clamped_into_unit_square() {
    let mut engine = PlacementEngine::default();
    let mut m = mark("m1", MarkKind::Image, Rect::new(0.2, 0.2, 0.4, 0.4));
    m.center_x = 1.3;
    m.center_y = -0.1;
    let asset = engine
        .create(&m, sprite(10, 10), sig("x"), OverlayOrigin::UserUpload)
        .unwrap();
    assert_eq!(asset.placement.center, Point::new(1.0, 0.0));
}

#[test]
fn assets_without_alpha_are_rejected() {
    let mut engine = PlacementEngine::default();
    let m = mark("m1", MarkKind::Image, Rect::new(0.2, 0.2, 0.4, 0.4));
    let mut flat = sprite(10, 10);
    flat.has_alpha = false;
    let err = engine
        .create(&m, flat, sig("x"), OverlayOrigin::UserUpload)
        .unwrap_err();
    assert!(matches!(err, OverlayerError::TransparencyUnattainable(_)));
    assert!(engine.assets().is_empty());
}

#[test]
fn displayed_size_is_aspect_locked_and_clamped() {
    let opts = PlacementOpts::default();
    let mut p = Placement {
        center: Point::new(0.5, 0.5),
        scale: 1.0,
        base_width_percent: 50.0,
        aspect_ratio: 2.0,
    };
    assert!(approx(p.width_percent(&opts), 50.0));
    assert!(approx(p.height_percent(&opts, 1.0), 25.0));
    assert!(approx(p.height_percent(&opts, 800.0 / 600.0), 100.0 / 3.0));

    p.scale = 100.0;
    assert!(approx(p.width_percent(&opts), 400.0));
    p.scale = 0.001;
    assert!(approx(p.width_percent(&opts), 2.0));
}

#[test]
fn drag_converts_pixels_to_normalized_delta() {
    let mut engine = PlacementEngine::default();
    let m = mark("m1", MarkKind::Image, Rect::new(0.4, 0.4, 0.6, 0.6));
    engine
        .create(&m, sprite(10, 10), sig("x"), OverlayOrigin::UserUpload)
        .unwrap();

    let container = Rect::new(100.0, 50.0, 500.0, 250.0);
    engine
        .begin_drag("m1", Point::new(300.0, 150.0), container)
        .unwrap();
    let c = engine.update_drag(Point::new(340.0, 130.0)).unwrap();
    assert!(approx(c.x, 0.6));
    assert!(approx(c.y, 0.4));

    // Deltas are measured from the gesture start, not accumulated.
    let c = engine.update_drag(Point::new(300.0, 150.0)).unwrap();
    assert!(approx(c.x, 0.5));
    assert!(approx(c.y, 0.5));

    assert!(engine.end_drag().is_some());
    assert!(engine.update_drag(Point::new(0.0, 0.0)).is_err());
}

#[test]
fn drag_clamps_bounding_box_to_boundary() {
    let mut engine = PlacementEngine::default();
    let m = mark("m1", MarkKind::Image, Rect::new(0.4, 0.4, 0.6, 0.6));
    let asset = engine
        .create(&m, sprite(20, 10), sig("x"), OverlayOrigin::UserUpload)
        .unwrap();
    // 0.2 * 100 * 0.95 = 19% wide, 9.5% tall on a square container.
    let half_w = asset.placement.base_width_percent / 200.0;
    let half_h = half_w / 2.0;

    let container = Rect::new(0.0, 0.0, 200.0, 200.0);
    engine
        .begin_drag("m1", Point::new(100.0, 100.0), container)
        .unwrap();
    let c = engine.update_drag(Point::new(1000.0, -1000.0)).unwrap();
    assert!(approx(c.x, 1.0 - half_w));
    assert!(approx(c.y, half_h));

    let c = engine.update_drag(Point::new(-1000.0, 1000.0)).unwrap();
    assert!(approx(c.x, half_w));
    assert!(approx(c.y, 1.0 - half_h));
}

#[test]
fn only_one_drag_at_a_time() {
    let mut engine = PlacementEngine::default();
    for id in ["a", "b"] {
        let m = mark(id, MarkKind::Image, Rect::new(0.1, 0.1, 0.3, 0.3));
        engine
            .create(&m, sprite(4, 4), sig(id), OverlayOrigin::UserUpload)
            .unwrap();
    }
    let container = Rect::new(0.0, 0.0, 100.0, 100.0);
    engine.begin_drag("a", Point::ZERO, container).unwrap();
    let err = engine.begin_drag("b", Point::ZERO, container).unwrap_err();
    assert!(matches!(err, OverlayerError::Gesture(_)));

    // Removing the dragged asset cancels the drag.
    engine.remove("a");
    assert!(engine.active_drag().is_none());
    engine.begin_drag("b", Point::ZERO, container).unwrap();
}

#[test]
fn scale_is_clamped_and_slider_maps_linearly() {
    let mut engine = PlacementEngine::default();
    let m = mark("m1", MarkKind::Image, Rect::new(0.1, 0.1, 0.3, 0.3));
    engine
        .create(&m, sprite(4, 4), sig("x"), OverlayOrigin::UserUpload)
        .unwrap();

    assert!(approx(engine.set_scale("m1", 5.0).unwrap(), 2.0));
    assert!(approx(engine.set_scale("m1", 0.1).unwrap(), 0.4));
    assert!(approx(engine.set_scale_from_slider("m1", 120.0).unwrap(), 1.2));
    assert!(approx(engine.set_scale_from_slider("m1", 10.0).unwrap(), 0.4));
    assert!(approx(engine.set_scale_from_slider("m1", 500.0).unwrap(), 1.6));
    assert!(matches!(
        engine.set_scale("nope", 1.0).unwrap_err(),
        OverlayerError::UnknownMark(_)
    ));
}

#[test]
fn reset_restores_mark_geometry() {
    let mut engine = PlacementEngine::default();
    let m = mark("m1", MarkKind::Image, Rect::new(0.1, 0.1, 0.3, 0.3));
    engine
        .create(&m, sprite(4, 4), sig("x"), OverlayOrigin::UserUpload)
        .unwrap();
    engine.set_scale("m1", 1.8).unwrap();
    engine
        .begin_drag("m1", Point::ZERO, Rect::new(0.0, 0.0, 10.0, 10.0))
        .unwrap();
    engine.update_drag(Point::new(5.0, 5.0)).unwrap();
    engine.end_drag();

    engine.reset("m1", &m).unwrap();
    let p = engine.get("m1").unwrap().placement;
    assert!(approx(p.center.x, 0.2));
    assert!(approx(p.center.y, 0.2));
    assert!(approx(p.scale, 1.0));
}

#[test]
fn replacing_an_overlay_keeps_paint_order() {
    let mut engine = PlacementEngine::default();
    for id in ["a", "b", "c"] {
        let m = mark(id, MarkKind::Image, Rect::new(0.1, 0.1, 0.3, 0.3));
        engine
            .create(&m, sprite(4, 4), sig(id), OverlayOrigin::UserUpload)
            .unwrap();
    }
    let b = mark("b", MarkKind::Image, Rect::new(0.5, 0.5, 0.7, 0.7));
    engine
        .create(&b, sprite(8, 4), sig("b2"), OverlayOrigin::AiGenerated)
        .unwrap();

    let ids: Vec<_> = engine.assets().iter().map(|a| a.mark_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(engine.get("b").unwrap().signature, sig("b2"));

    let layers = engine.layers(Size::new(800.0, 600.0));
    assert_eq!(layers.len(), 3);
    assert_eq!(layers[1].sprite.width, 8);
}

#[test]
fn set_center_uses_the_same_box_clamp() {
    let mut engine = PlacementEngine::default();
    let m = mark("m1", MarkKind::Image, Rect::new(0.4, 0.4, 0.6, 0.6));
    engine
        .create(&m, sprite(10, 10), sig("x"), OverlayOrigin::UserUpload)
        .unwrap();
    let c = engine.set_center("m1", Point::new(0.0, 0.5), 1.0).unwrap();
    assert!(approx(c.x, 0.095));
    assert!(approx(c.y, 0.5));
    assert!(engine.set_center("m1", Point::new(f64::NAN, 0.5), 1.0).is_err());
}
