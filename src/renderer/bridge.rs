/// Set the minimum severity of the engine's own diagnostic output
///
/// Mapnik writes its log to stderr; by default only errors are shown.
pub fn set_engine_log_severity(severity: ffi::EngineLogSeverity) {
    ffi::Logger_setSeverity(severity);
}

fn log_from_cpp(severity: ffi::BridgeSeverity, message: &str) {
    #[cfg(feature = "log")]
    match severity {
        ffi::BridgeSeverity::Debug => log::debug!("{message}"),
        ffi::BridgeSeverity::Info => log::info!("{message}"),
        ffi::BridgeSeverity::Warning => log::warn!("{message}"),
        ffi::BridgeSeverity::Error => log::error!("{message}"),
        ffi::BridgeSeverity { repr } => log::error!("(severity={repr}) {message}"),
    }
    #[cfg(not(feature = "log"))]
    let _ = (severity, message);
}

#[cxx::bridge(namespace = "mapnik_rs::bridge")]
pub mod ffi {
    /// A point in 2D planar space.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Coord {
        /// Horizontal component (longitude or easting)
        x: f64,
        /// Vertical component (latitude or northing)
        y: f64,
    }

    /// Verbosity of the engine's own logger.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum EngineLogSeverity {
        /// Everything, including per-feature debug output
        Debug = 0,
        /// Warnings and errors
        Warn = 1,
        /// Errors only
        Error = 2,
        /// Silence the engine
        None = 3,
    }

    /// Severity of messages emitted by the C++ side of the bridge
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum BridgeSeverity {
        Debug = 0,
        Info = 1,
        Warning = 2,
        Error = 3,
    }

    unsafe extern "C++" {
        include!("mapnik_bridge.h");

        type MapHandle;
        type ProjectionHandle;

        fn version_string() -> String;
        fn register_datasources(path: &[u8]) -> Result<()>;
        fn register_fonts(path: &[u8]) -> Result<()>;
        fn Logger_setSeverity(severity: EngineLogSeverity);

        fn Map_new(width: u32, height: u32) -> UniquePtr<MapHandle>;
        fn Map_lastError(map: &MapHandle) -> String;
        fn Map_load(map: Pin<&mut MapHandle>, path: &[u8]) -> i32;
        fn Map_loadString(map: Pin<&mut MapHandle>, stylesheet: &str) -> i32;
        fn Map_resize(map: Pin<&mut MapHandle>, width: u32, height: u32);
        fn Map_width(map: &MapHandle) -> u32;
        fn Map_height(map: &MapHandle) -> u32;
        fn Map_getSrs(map: &MapHandle) -> String;
        fn Map_setSrs(map: Pin<&mut MapHandle>, srs: &str);
        fn Map_zoomAll(map: Pin<&mut MapHandle>) -> i32;
        fn Map_zoomToBox(map: Pin<&mut MapHandle>, minx: f64, miny: f64, maxx: f64, maxy: f64);
        fn Map_setBufferSize(map: Pin<&mut MapHandle>, size: i32);
        fn Map_bufferSize(map: &MapHandle) -> i32;
        fn Map_renderToFile(
            map: Pin<&mut MapHandle>,
            path: &[u8],
            scale: f64,
            scale_factor: f64,
            format: &str,
        ) -> i32;
        fn Map_renderToPng(
            map: Pin<&mut MapHandle>,
            scale: f64,
            scale_factor: f64,
        ) -> UniquePtr<CxxString>;
        fn Map_projection(map: Pin<&mut MapHandle>) -> UniquePtr<ProjectionHandle>;

        fn Projection_forward(projection: &ProjectionHandle, coord: Coord) -> Result<Coord>;
    }

    extern "Rust" {
        /// Bridge logging from C++ to Rust log crate
        fn log_from_cpp(severity: BridgeSeverity, message: &str);
    }
}
