use super::*;

use crate::foundation::core::Rect;
use crate::prepare::surface::{ImageSurface, RasterSurface};
use crate::region::mark::MarkKind;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "overlayer_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(path: &Path, r: &Raster) {
    std::fs::write(path, ImageSurface.encode(r).unwrap()).unwrap();
}

fn overlay(mark_id: &str, source: &str) -> ProjectOverlay {
    ProjectOverlay {
        mark_id: mark_id.to_string(),
        source: PathBuf::from(source),
        origin: OverlayOrigin::UserUpload,
        enforce_transparency: true,
        center: None,
        scale: None,
    }
}

#[test]
fn project_json_uses_defaults() {
    let json = r#"{
        "base": "base.png",
        "marks": [
            {"id": "a", "kind": "image", "center_x": 0.5, "center_y": 0.5, "width": 0.5, "height": 0.5}
        ],
        "overlays": [{"mark_id": "a", "source": "logo.png"}],
        "prepare": {"border_tolerance": 30.0}
    }"#;
    let p = Project::from_reader(json.as_bytes()).unwrap();
    p.validate().unwrap();
    assert_eq!(p.overlays[0].origin, OverlayOrigin::UserUpload);
    assert!(p.overlays[0].enforce_transparency);
    assert_eq!(p.prepare.border_tolerance, 30.0);
    assert_eq!(p.prepare.trim_alpha, 4);
    assert_eq!(p.batch.threads, None);
}

#[test]
fn overlays_must_target_known_marks_once() {
    let mut p = Project {
        marks: vec![Mark::from_rect(
            "a",
            MarkKind::Image,
            Rect::new(0.1, 0.1, 0.4, 0.4),
        )],
        overlays: vec![overlay("ghost", "x.png")],
        ..Project::default()
    };
    assert!(matches!(
        p.validate().unwrap_err(),
        OverlayerError::UnknownMark(_)
    ));

    p.overlays = vec![overlay("a", "x.png"), overlay("a", "y.png")];
    assert!(matches!(
        p.validate().unwrap_err(),
        OverlayerError::Validation(_)
    ));
}

#[test]
fn compose_project_prepares_and_places_overlays() {
    let tmp = temp_dir("compose_project");
    std::fs::create_dir_all(&tmp).unwrap();

    write_png(&tmp.join("base.png"), &Raster::filled(200, 100, [0, 0, 255, 255]));
    let mut logo = Raster::filled(40, 40, [255, 255, 255, 255]);
    logo.fill_rect(10, 10, 20, 20, [255, 0, 0, 255]);
    write_png(&tmp.join("logo.png"), &logo);

    let mut placed = overlay("a", "logo.png");
    placed.center = Some([0.25, 0.5]);
    let project = Project {
        base: PathBuf::from("base.png"),
        marks: vec![Mark::from_rect(
            "a",
            MarkKind::Image,
            Rect::new(0.4, 0.3, 0.6, 0.7),
        )],
        overlays: vec![placed],
        ..Project::default()
    };

    let preparer = OverlayPreparer::new(PrepareOpts::default()).unwrap();
    let out = compose_project(&project, &tmp, &preparer).unwrap();
    assert_eq!((out.width, out.height), (200, 100));
    assert_eq!(out.pixel(50, 50), [255, 0, 0, 255]);
    assert_eq!(out.pixel(100, 50), [0, 0, 255, 255]);

    let png = encode_png(&preparer, &out).unwrap();
    assert_eq!(ImageSurface.decode(&png).unwrap(), out);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_overlay_file_is_an_error() {
    let tmp = temp_dir("compose_missing");
    std::fs::create_dir_all(&tmp).unwrap();
    write_png(&tmp.join("base.png"), &Raster::filled(10, 10, [0, 0, 0, 255]));

    let project = Project {
        base: PathBuf::from("base.png"),
        marks: vec![Mark::from_rect(
            "a",
            MarkKind::Image,
            Rect::new(0.1, 0.1, 0.4, 0.4),
        )],
        overlays: vec![overlay("a", "nope.png")],
        ..Project::default()
    };
    let preparer = OverlayPreparer::new(PrepareOpts::default()).unwrap();
    assert!(compose_project(&project, &tmp, &preparer).is_err());

    std::fs::remove_dir_all(&tmp).ok();
}
