use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_matches_rounded_product() {
    let mut px = [100u8, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        px,
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let src = [100u8, 50, 200, 128];
    let mut px = src;
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    for i in 0..3 {
        assert!((i16::from(px[i]) - i16::from(src[i])).abs() <= 1);
    }
    assert_eq!(px[3], 128);
}

#[test]
fn fully_transparent_pixels_zero_their_color() {
    let mut px = [9u8, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [0, 0, 0, 0]);
}

#[test]
fn clamp_helpers() {
    assert_eq!(clamp_unit(-0.5), 0.0);
    assert_eq!(clamp_unit(1.5), 1.0);
    assert_eq!(clamp_unit(f64::NAN), 0.0);
    assert_eq!(clamp_or_mid(0.9, 0.2, 0.8), 0.8);
    assert_eq!(clamp_or_mid(0.9, 0.7, 0.3), 0.5);
}

#[test]
fn rgb_distance_is_euclidean() {
    assert_eq!(rgb_distance([0, 0, 0], [3, 4, 0]), 5.0);
    assert_eq!(rgb_distance([255, 255, 255], [255, 255, 255]), 0.0);
}
