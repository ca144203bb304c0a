use cxx::UniquePtr;

use crate::renderer::bridge::ffi;
use crate::renderer::error::MapnikError;
use crate::renderer::Coord;

impl Coord {
    /// Creates a coordinate from its planar components
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A coordinate transform from geographic coordinates into a map's SRS.
///
/// Obtained from [`Map::projection`](crate::Map::projection). Owned independently of the map.
pub struct Projection {
    instance: UniquePtr<ffi::ProjectionHandle>,
}

impl Projection {
    pub(crate) fn from_handle(instance: UniquePtr<ffi::ProjectionHandle>) -> Self {
        Self { instance }
    }

    /// Transform one longitude/latitude coordinate into the projected SRS.
    ///
    /// # Errors
    /// Fails if the projection was released or the engine cannot transform the coordinate.
    pub fn forward(&self, coord: Coord) -> Result<Coord, MapnikError> {
        let handle = self.instance.as_ref().ok_or(MapnikError::Released)?;
        ffi::Projection_forward(handle, coord).map_err(|e| MapnikError::Engine(e.what().to_string()))
    }

    /// Release the transform. Calling it again is a no-op.
    pub fn free(&mut self) {
        self.instance = UniquePtr::null();
    }

    /// Whether [`free`](Self::free) has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.instance.is_null()
    }
}

impl std::fmt::Debug for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projection")
            .field("released", &self.is_released())
            .finish()
    }
}
