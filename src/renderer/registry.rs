//! Process-wide engine registries: datasource plugins and fonts

use std::path::Path;
use std::sync::Once;

use crate::renderer::bridge::ffi;
use crate::renderer::error::{ensure_no_nul, MapnikError, RegistrationKind};

/// Datasource plugin directory of the engine installation found at build time.
pub const DEFAULT_INPUT_PLUGINS: &str = env!("MAPNIK_DEFAULT_INPUT_PLUGINS");
/// Font directory of the engine installation found at build time.
pub const DEFAULT_FONTS: &str = env!("MAPNIK_DEFAULT_FONTS");

static DEFAULTS: Once = Once::new();

/// The engine version, e.g. `"Mapnik 3.1.0"`.
#[must_use]
pub fn version() -> String {
    format!("Mapnik {}", ffi::version_string())
}

/// Register all datasource plugins found in `path`.
///
/// Registering the same directory twice is harmless.
///
/// # Errors
/// Returns an error if `path` is not a directory or the engine fails to load the plugins.
pub fn register_datasources(path: impl AsRef<Path>) -> Result<(), MapnikError> {
    register(RegistrationKind::Datasources, path.as_ref())
}

/// Register all font faces found in `path`, recursing into subdirectories.
///
/// Registering the same directory twice is harmless.
///
/// # Errors
/// Returns an error if `path` is not a directory or the engine fails to read it.
pub fn register_fonts(path: impl AsRef<Path>) -> Result<(), MapnikError> {
    register(RegistrationKind::Fonts, path.as_ref())
}

fn register(kind: RegistrationKind, path: &Path) -> Result<(), MapnikError> {
    // cxx.rs does not support OsString, but going via &[u8] is close enough
    let bytes = path.as_os_str().as_encoded_bytes();
    ensure_no_nul("registration path", bytes)?;
    let result = match kind {
        RegistrationKind::Datasources => ffi::register_datasources(bytes),
        RegistrationKind::Fonts => ffi::register_fonts(bytes),
    };
    result.map_err(|e| MapnikError::Registration {
        kind,
        path: path.to_path_buf(),
        message: e.what().to_string(),
    })
}

/// Register the installation's default plugin and font directories once per process.
///
/// Failures are logged, not returned: a map that only uses in-memory
/// datasources does not need either directory.
pub(crate) fn ensure_defaults_registered() {
    DEFAULTS.call_once(|| {
        for (kind, dir) in [
            (RegistrationKind::Datasources, DEFAULT_INPUT_PLUGINS),
            (RegistrationKind::Fonts, DEFAULT_FONTS),
        ] {
            match register(kind, Path::new(dir)) {
                Ok(()) => {
                    #[cfg(feature = "log")]
                    log::debug!("Registered default {kind} from {dir}");
                }
                Err(e) => {
                    #[cfg(feature = "log")]
                    log::warn!("{e}");
                    #[cfg(not(feature = "log"))]
                    let _ = e;
                }
            }
        }
    });
}
