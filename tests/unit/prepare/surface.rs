use super::*;

#[test]
fn encode_decode_png_is_lossless() {
    let mut r = Raster::filled(3, 2, [10, 20, 30, 255]);
    r.set_pixel(2, 1, [200, 100, 50, 7]);

    let s = ImageSurface;
    let bytes = s.encode(&r).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    assert_eq!(s.decode(&bytes).unwrap(), r);
}

#[test]
fn decode_garbage_is_decode_error() {
    let err = ImageSurface.decode(b"definitely not an image").unwrap_err();
    assert!(matches!(err, OverlayerError::Decode(_)));
    assert!(err.is_user_visible());
}

#[test]
fn resample_keeps_uniform_color() {
    let r = Raster::filled(4, 4, [255, 0, 0, 255]);
    let out = ImageSurface.resample(&r, 9, 3).unwrap();
    assert_eq!((out.width, out.height), (9, 3));
    assert!(out.data.chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
    assert!(ImageSurface.resample(&r, 0, 3).is_err());
}

#[test]
fn draw_blends_at_rounded_origin_and_clips() {
    let mut dst = Raster::filled(4, 4, [0, 0, 255, 255]);
    let src = Raster::filled(2, 2, [255, 255, 255, 255]);

    ImageSurface
        .draw(&mut dst, &src, Rect::new(2.4, 2.6, 4.4, 4.6))
        .unwrap();
    assert_eq!(dst.pixel(2, 3), [255, 255, 255, 255]);
    assert_eq!(dst.pixel(3, 3), [255, 255, 255, 255]);
    assert_eq!(dst.pixel(2, 2), [0, 0, 255, 255]);
    assert_eq!(dst.pixel(1, 3), [0, 0, 255, 255]);
}

#[test]
fn draw_skips_transparent_source_pixels() {
    let mut dst = Raster::filled(2, 1, [1, 2, 3, 255]);
    let mut src = Raster::filled(2, 1, [255, 0, 0, 255]);
    src.set_pixel(1, 0, [255, 0, 0, 0]);

    ImageSurface
        .draw(&mut dst, &src, Rect::new(0.0, 0.0, 2.0, 1.0))
        .unwrap();
    assert_eq!(dst.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(1, 0), [1, 2, 3, 255]);
}

#[test]
fn get_pixels_reads_back_buffer() {
    let r = Raster::filled(1, 1, [4, 3, 2, 1]);
    assert_eq!(ImageSurface.get_pixels(&r), &[4, 3, 2, 1]);
}
