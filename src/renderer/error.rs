use std::path::PathBuf;

/// Errors reported by the rendering engine or by the bindings themselves.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MapnikError {
    /// The engine rejected a call; carries its last-error text for the context.
    #[error("mapnik: {0}")]
    Engine(String),

    /// A datasource plugin or font directory could not be registered.
    #[error("mapnik: failed to register {kind} from {}: {message}", path.display())]
    Registration {
        /// What was being registered
        kind: RegistrationKind,
        /// Directory handed to the engine
        path: PathBuf,
        /// Reason reported by the engine
        message: String,
    },

    /// The handle was already released with `free()`.
    #[error("mapnik: handle used after release")]
    Released,

    /// An argument contained a NUL byte and cannot be handed to the engine.
    #[error("mapnik: {0} contains an interior NUL byte")]
    InteriorNul(&'static str),
}

/// The global registry a directory is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    /// Input plugins (shape, postgis, gdal, ...)
    Datasources,
    /// Font faces
    Fonts,
}

impl std::fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Datasources => f.write_str("datasources"),
            Self::Fonts => f.write_str("fonts"),
        }
    }
}

/// Reject arguments the C++ side would silently truncate.
pub(crate) fn ensure_no_nul(what: &'static str, bytes: &[u8]) -> Result<(), MapnikError> {
    if bytes.contains(&0) {
        Err(MapnikError::InteriorNul(what))
    } else {
        Ok(())
    }
}
