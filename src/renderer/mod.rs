mod bridge;
mod error;
mod map;
mod options;
mod projection;
mod registry;

pub use bridge::ffi::{Coord, EngineLogSeverity};
pub use bridge::set_engine_log_severity;
pub use error::{MapnikError, RegistrationKind};
pub use map::{Image, Map};
pub use options::{RenderOptions, DEFAULT_FORMAT};
pub use projection::Projection;
pub use registry::{
    register_datasources, register_fonts, version, DEFAULT_FONTS, DEFAULT_INPUT_PLUGINS,
};
