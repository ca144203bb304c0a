//! Rust bindings to the [Mapnik](https://mapnik.org) cartography rendering engine.

mod renderer;
pub use renderer::*;

#[cfg(feature = "pool")]
pub mod pool;
#[cfg(feature = "pool")]
pub use pool::{PoolError, RenderJob, SingleThreadedRenderPool};
