//! Single-worker rendering pool for [Mapnik](https://mapnik.org) maps.
//!
//! One thread owns the [`Map`] and handles requests in order, so callers on
//! any thread or task can render without sharing a handle.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() {
//! use mapnik_rs::pool::{RenderJob, SingleThreadedRenderPool};
//!
//! // Get the global pool instance
//! let pool = SingleThreadedRenderPool::global_pool();
//!
//! // Render the whole world at 512x256
//! let job = RenderJob::new("path/to/style.xml", 512, 256).with_extent([-180.0, -90.0, 180.0, 90.0]);
//! let image = pool.render(job.clone()).await.unwrap();
//!
//! // The stylesheet stays loaded - the next job with the same path skips parsing it
//! let again = pool.render(job.with_extent([0.0, 0.0, 90.0, 45.0])).await.unwrap();
//! # }
//! ```

use std::path::PathBuf;
use std::sync::{mpsc, LazyLock};
use std::thread;

use tokio::sync::oneshot;

use crate::renderer::{Image, Map, MapnikError, RenderOptions};

/// What to render: a stylesheet, an output size and an extent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    /// Path to the Mapnik XML stylesheet
    pub stylesheet: PathBuf,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// `[minx, miny, maxx, maxy]` in map SRS units; `None` zooms to all layers
    pub extent: Option<[f64; 4]>,
    /// Scale and scale factor; the format is ignored, output is always PNG
    pub options: RenderOptions,
}

impl RenderJob {
    /// Creates a job that zooms to the extent of all layers
    #[must_use]
    pub fn new(stylesheet: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            width,
            height,
            extent: None,
            options: RenderOptions::default(),
        }
    }

    /// Render exactly this `[minx, miny, maxx, maxy]` box
    #[must_use]
    pub fn with_extent(mut self, extent: [f64; 4]) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Sets the rendering options
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Rendering request sent to the worker.
struct RenderRequest {
    job: RenderJob,
    response: oneshot::Sender<Result<Image, PoolError>>,
}

/// Worker state: the map and the stylesheet currently loaded into it.
///
/// No map exists until the first request names a stylesheet.
#[derive(Default)]
struct Worker {
    map: Option<Map>,
    current_style: Option<PathBuf>,
}

impl Worker {
    fn render(&mut self, job: &RenderJob) -> Result<Image, MapnikError> {
        let map = match self.map.as_mut() {
            Some(map) if self.current_style.as_ref() == Some(&job.stylesheet) => map,
            // Loading appends to the existing layers, so a new stylesheet needs a fresh map
            _ => {
                self.current_style = None;
                let map = self.map.insert(Map::new(job.width, job.height));
                map.load(&job.stylesheet)?;
                self.current_style = Some(job.stylesheet.clone());
                #[cfg(feature = "log")]
                log::debug!("Loaded stylesheet {}", job.stylesheet.display());
                map
            }
        };

        map.resize(job.width, job.height)?;
        match job.extent {
            Some([minx, miny, maxx, maxy]) => map.zoom_to_min_max(minx, miny, maxx, maxy)?,
            None => map.zoom_all()?,
        }
        map.render_to_memory_png(&job.options)
    }
}

/// A thread-safe rendering pool that serializes [Mapnik](https://mapnik.org) rendering
/// operations through a single worker thread.
///
/// The worker keeps the last stylesheet loaded and only reloads when a request names a different path.
///
/// Use [`SingleThreadedRenderPool::global_pool`] to access the shared instance.
#[derive(Debug)]
pub struct SingleThreadedRenderPool {
    rendering_requests: mpsc::Sender<RenderRequest>,
}

impl SingleThreadedRenderPool {
    /// Create a new rendering pool with its own worker thread
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<RenderRequest>();

        thread::spawn(move || {
            let mut worker = Worker::default();
            while let Ok(request) = rx.recv() {
                let result = worker.render(&request.job).map_err(PoolError::Mapnik);
                #[cfg(feature = "log")]
                if let Err(e) = &result {
                    log::debug!("Rendering {} failed: {e}", request.job.stylesheet.display());
                }
                let _ = request.response.send(result);
            }
        });

        Self {
            rendering_requests: tx,
        }
    }

    /// Render a PNG [`Image`] asynchronously on the worker thread
    ///
    /// # Errors
    ///
    /// If the rendering fails, the response channel is dropped, or the request fails to send.
    pub async fn render(&self, job: RenderJob) -> Result<Image, PoolError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.rendering_requests
            .send(RenderRequest {
                job,
                response: response_tx,
            })
            .map_err(|_| PoolError::FailedToSendRequest)?;

        response_rx
            .await
            .map_err(|_| PoolError::FailedToReceiveResponse)?
    }

    /// Get the global rendering pool instance.
    #[must_use]
    pub fn global_pool() -> &'static SingleThreadedRenderPool {
        static GLOBAL_POOL: LazyLock<SingleThreadedRenderPool> =
            LazyLock::new(SingleThreadedRenderPool::new);

        &GLOBAL_POOL
    }
}

impl Default for SingleThreadedRenderPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors returned by [`SingleThreadedRenderPool`]
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// The engine failed to load or render
    #[error(transparent)]
    Mapnik(#[from] MapnikError),

    /// The worker thread is gone
    #[error("Failed to send request to rendering thread")]
    FailedToSendRequest,

    /// The worker dropped the request without answering
    #[error("Failed to receive response from rendering thread")]
    FailedToReceiveResponse,
}
