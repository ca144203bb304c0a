use insta::assert_debug_snapshot;
use mapnik_rs::{
    set_engine_log_severity, Coord, EngineLogSeverity, Map, MapnikError, RenderOptions,
};
use std::path::PathBuf;

const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
const WGS84: &str = "+proj=longlat +datum=WGS84";

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn world_map() -> Map {
    let mut map = Map::new(256, 256);
    map.load(fixture_path("world.xml")).unwrap();
    map.zoom_to_min_max(-180.0, -90.0, 180.0, 90.0).unwrap();
    map
}

#[test]
fn create_and_release() {
    for (width, height) in [(1, 1), (256, 256), (512, 128), (4096, 4096)] {
        let mut map = Map::new(width, height);
        map.free();
        assert!(map.is_released());
    }
    let map = Map::new(256, 256);
    assert_eq!(map.width(), Ok(256));
}

#[test]
fn released_map_fails_fast() {
    let mut map = world_map();
    map.free();
    map.free();

    assert_eq!(map.load(fixture_path("world.xml")), Err(MapnikError::Released));
    assert_eq!(map.srs(), Err(MapnikError::Released));
    assert_eq!(map.resize(10, 10), Err(MapnikError::Released));
    assert_debug_snapshot!(map.render_to_memory_png(&RenderOptions::default()).unwrap_err(), @"Released");
    assert_debug_snapshot!(map, @r#"
    Map {
        released: true,
    }
    "#);
}

#[test]
fn render_world_to_memory() {
    let mut map = Map::new(256, 256);
    map.load_string(&format!(r#"<Map srs="{WGS84}" background-color="steelblue"/>"#))
        .unwrap();
    assert_eq!(map.srs().unwrap(), WGS84);
    map.zoom_to_min_max(-180.0, -90.0, 180.0, 90.0).unwrap();

    let image = map.render_to_memory_png(&RenderOptions::default()).unwrap();
    assert!(image.as_slice().len() > PNG_MAGIC.len());
    assert_eq!(image.as_slice()[..4], PNG_MAGIC);

    let decoded = image.decode().unwrap();
    assert_eq!((decoded.width(), decoded.height()), (256, 256));
}

#[test]
fn memory_render_ignores_format() {
    let mut map = world_map();
    for format in ["", "png8", "jpeg80", "tiff", "not-a-format"] {
        let opts = RenderOptions::new().with_format(format);
        let image = map.render_to_memory_png(&opts).unwrap();
        assert_eq!(image.as_slice()[..4], PNG_MAGIC, "format {format:?}");
    }
}

#[test]
fn memory_render_without_layers() {
    let mut map = Map::new(64, 64);
    match map.render_to_memory_png(&RenderOptions::default()) {
        Ok(image) => assert!(image.decode().is_ok()),
        Err(e) => assert!(!e.to_string().is_empty()),
    }
}

#[test]
fn empty_format_defaults_to_png8() {
    let dir = tempfile::tempdir().unwrap();
    let implicit = dir.path().join("implicit.png");
    let explicit = dir.path().join("explicit.png");

    let mut map = world_map();
    map.render_to_file(&implicit, &RenderOptions::new().with_format(""))
        .unwrap();
    map.render_to_file(&explicit, &RenderOptions::new().with_format("png8"))
        .unwrap();

    let implicit = std::fs::read(implicit).unwrap();
    let explicit = std::fs::read(explicit).unwrap();
    assert_eq!(implicit[..4], PNG_MAGIC);
    assert_eq!(implicit, explicit);
}

#[test]
fn zero_scale_factor_means_one() {
    let mut map = world_map();
    let zero = map
        .render_to_memory_png(&RenderOptions::new().with_scale_factor(0.0))
        .unwrap();
    let one = map
        .render_to_memory_png(&RenderOptions::new().with_scale_factor(1.0))
        .unwrap();
    assert_eq!(zero.as_slice(), one.as_slice());
}

#[test]
fn unknown_file_format_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut map = world_map();
    let err = map
        .render_to_file(
            dir.path().join("out.bin"),
            &RenderOptions::new().with_format("not-a-format"),
        )
        .unwrap_err();
    assert!(matches!(err, MapnikError::Engine(ref msg) if !msg.is_empty()));
}

#[test]
fn zoom_all_without_layers() {
    let mut map = Map::new(64, 64);
    map.load(fixture_path("world.xml")).unwrap();
    match map.zoom_all() {
        Ok(()) => {}
        Err(MapnikError::Engine(message)) => assert!(!message.is_empty()),
        Err(e) => panic!("unexpected error {e:?}"),
    }

    map.free();
    assert_eq!(map.zoom_all(), Err(MapnikError::Released));
}

#[test]
fn missing_stylesheet_file() {
    let mut map = Map::new(256, 256);
    let err = map.load(fixture_path("does-not-exist.xml")).unwrap_err();
    assert!(err.to_string().contains("mapnik: "), "{err}");
}

#[test]
fn invalid_stylesheets_report_distinct_errors() {
    let mut map = Map::new(256, 256);
    let unclosed = map.load_string("<Map").unwrap_err();
    let wrong_root = map.load_string("<NotAMap/>").unwrap_err();

    for err in [&unclosed, &wrong_root] {
        let MapnikError::Engine(message) = err else {
            panic!("unexpected error {err:?}");
        };
        assert!(!message.is_empty());
    }
    assert_ne!(unclosed, wrong_root);
}

#[test]
fn missing_datasource_is_reported() {
    let mut map = Map::new(256, 256);
    let err = map.load(fixture_path("missing-shapefile.xml")).unwrap_err();
    assert!(err.to_string().starts_with("mapnik: "), "{err}");
}

#[test]
fn interior_nul_is_rejected() {
    let mut map = Map::new(256, 256);
    assert_debug_snapshot!(map.load_string("<Map\0/>").unwrap_err(), @r#"
    InteriorNul(
        "stylesheet",
    )
    "#);
    assert_debug_snapshot!(map.set_srs("epsg:\x004326").unwrap_err(), @r#"
    InteriorNul(
        "srs",
    )
    "#);
}

#[test]
fn context_state_round_trips() {
    let mut map = Map::new(256, 256);
    map.set_srs("epsg:3857").unwrap();
    assert_eq!(map.srs().unwrap(), "epsg:3857");

    map.resize(800, 600).unwrap();
    assert_eq!((map.width().unwrap(), map.height().unwrap()), (800, 600));

    map.set_buffer_size(64).unwrap();
    assert_eq!(map.buffer_size().unwrap(), 64);
}

#[test]
fn stylesheet_attributes_are_applied() {
    let mut map = Map::new(256, 256);
    map.load(fixture_path("world-alt.xml")).unwrap();
    assert_eq!(map.buffer_size().unwrap(), 16);
    assert_eq!(map.srs().unwrap(), WGS84);
}

#[test]
fn identity_projection() {
    let mut map = world_map();
    let projection = map.projection().unwrap();
    for coord in [
        Coord::new(0.0, 0.0),
        Coord::new(13.4, 52.5),
        Coord::new(-122.42, 37.77),
        Coord::from((179.9, -89.9)),
    ] {
        let projected = projection.forward(coord).unwrap();
        assert!((projected.x - coord.x).abs() < 1e-9, "{projected:?}");
        assert!((projected.y - coord.y).abs() < 1e-9, "{projected:?}");
    }
}

#[test]
fn projection_outlives_map() {
    let mut map = world_map();
    let mut projection = map.projection().unwrap();
    map.free();

    assert!(projection.forward(Coord::new(1.0, 2.0)).is_ok());
    projection.free();
    projection.free();
    assert_eq!(
        projection.forward(Coord::new(1.0, 2.0)),
        Err(MapnikError::Released)
    );
}

#[test]
fn unprojectable_coordinate_is_an_error() {
    let mut map = Map::new(256, 256);
    map.set_srs("epsg:3857").unwrap();
    let projection = map.projection().unwrap();

    let web_mercator = projection.forward(Coord::new(13.4, 52.5)).unwrap();
    assert!(web_mercator.x.is_finite() && web_mercator.y.is_finite());

    let err = projection.forward(Coord::new(f64::NAN, 0.0)).unwrap_err();
    let MapnikError::Engine(message) = &err else {
        panic!("unexpected error {err:?}");
    };
    assert!(!message.is_empty());
    assert!(err.to_string().starts_with("mapnik: "), "{err}");
}

#[test]
fn invalid_srs_fails_on_projection() {
    let mut map = Map::new(256, 256);
    map.set_srs("+proj=does-not-exist").unwrap();
    let err = map.projection().unwrap_err();
    assert!(matches!(err, MapnikError::Engine(_)), "{err:?}");
}

#[test]
fn engine_log_severity_does_not_affect_rendering() {
    for severity in [
        EngineLogSeverity::Debug,
        EngineLogSeverity::Warn,
        EngineLogSeverity::None,
        EngineLogSeverity::Error,
    ] {
        set_engine_log_severity(severity);
        let image = world_map()
            .render_to_memory_png(&RenderOptions::default())
            .unwrap();
        assert_eq!(image.as_slice()[..4], PNG_MAGIC, "{severity:?}");
    }
}

#[test]
fn maps_on_distinct_threads() {
    let _ = env_logger::builder().is_test(true).try_init();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut map = world_map();
                map.resize(64 + i, 64).unwrap();
                map.render_to_memory_png(&RenderOptions::default()).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }
}
