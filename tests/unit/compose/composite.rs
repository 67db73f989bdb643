use super::*;
use crate::prepare::surface::ImageSurface;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_straight_half_alpha_mixes() {
    let out = over_straight([0, 0, 0, 255], [255, 255, 255, 128]);
    assert_eq!(out[3], 255);
    assert!((i16::from(out[0]) - 128).abs() <= 1);
}

#[test]
fn pixel_rect_for_centered_overlay() {
    // 50% of 800 wide with a 2:1 sprite gives a 400x200 box.
    let canvas = Size::new(800.0, 600.0);
    let height_percent = 50.0 / 2.0 * (800.0 / 600.0);
    let r = overlay_pixel_rect(Point::new(0.5, 0.5), 50.0, height_percent, canvas);
    assert!((r.width() - 400.0).abs() < 1e-9);
    assert!((r.height() - 200.0).abs() < 1e-9);
    assert!((r.x0 - 200.0).abs() < 1e-9);
    assert!((r.y0 - 200.0).abs() < 1e-9);
}

#[test]
fn pixel_rect_clamps_center() {
    let canvas = Size::new(100.0, 100.0);
    let r = overlay_pixel_rect(Point::new(1.7, -0.2), 20.0, 20.0, canvas);
    assert_eq!(r.center(), Point::new(100.0, 0.0));
}

#[test]
fn composite_matches_base_size_and_paints_in_order() {
    let base = Raster::filled(800, 600, [0, 0, 255, 255]);
    let red = Raster::filled(2, 1, [255, 0, 0, 255]);
    let green = Raster::filled(1, 1, [0, 255, 0, 255]);

    let layers = [
        CompositeLayer {
            sprite: &red,
            center: Point::new(0.5, 0.5),
            width_percent: 50.0,
            height_percent: 50.0 / 2.0 * (800.0 / 600.0),
        },
        CompositeLayer {
            sprite: &green,
            center: Point::new(0.5, 0.5),
            width_percent: 10.0,
            height_percent: 10.0 * (800.0 / 600.0),
        },
    ];

    let out = render_composite(&ImageSurface, &base, &layers).unwrap();
    assert_eq!((out.width, out.height), (800, 600));
    assert_eq!(out.pixel(199, 300), [0, 0, 255, 255]);
    assert_eq!(out.pixel(200, 300), [255, 0, 0, 255]);
    assert_eq!(out.pixel(599, 399), [255, 0, 0, 255]);
    assert_eq!(out.pixel(600, 300), [0, 0, 255, 255]);
    assert_eq!(out.pixel(400, 199), [0, 0, 255, 255]);
    assert_eq!(out.pixel(400, 200), [255, 0, 0, 255]);
    assert_eq!(out.pixel(400, 300), [0, 255, 0, 255]);

    // Reversing the order hides the small green layer under the red one.
    let reversed = [layers[1], layers[0]];
    let out = render_composite(&ImageSurface, &base, &reversed).unwrap();
    assert_eq!(out.pixel(400, 300), [255, 0, 0, 255]);
}

#[test]
fn composite_skips_zero_sized_layers_and_keeps_base() {
    let base = Raster::filled(10, 10, [9, 9, 9, 255]);
    let red = Raster::filled(1, 1, [255, 0, 0, 255]);
    let layers = [CompositeLayer {
        sprite: &red,
        center: Point::new(0.5, 0.5),
        width_percent: 0.0,
        height_percent: 20.0,
    }];
    let out = render_composite(&ImageSurface, &base, &layers).unwrap();
    assert_eq!(out, base);
}

#[test]
fn composite_rejects_empty_base() {
    let base = Raster::new(0, 0);
    assert!(render_composite(&ImageSurface, &base, &[]).is_err());
}
