use std::path::Path;
use std::pin::Pin;

use cxx::{CxxString, UniquePtr};

use crate::renderer::bridge::ffi;
use crate::renderer::error::{ensure_no_nul, MapnikError};
use crate::renderer::registry::ensure_defaults_registered;
use crate::renderer::{Projection, RenderOptions};

/// A rendered map image.
///
/// The image is stored as a PNG byte array in a buffer allocated by the C++ code.
pub struct Image(UniquePtr<CxxString>);

impl Image {
    /// The encoded PNG bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Decode the PNG into pixels.
    ///
    /// # Errors
    /// Returns an error if the engine produced bytes the `image` crate cannot decode.
    pub fn decode(&self) -> image::ImageResult<image::DynamicImage> {
        image::load_from_memory_with_format(self.as_slice(), image::ImageFormat::Png)
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("len", &self.as_slice().len())
            .finish()
    }
}

/// A Mapnik rendering context: stylesheet, layers, SRS and current extent.
///
/// The context lives on the C++ side. It is released on drop or explicitly
/// with [`free`](Self::free); any call after that returns [`MapnikError::Released`].
///
/// # Examples
///
/// ```no_run
/// use mapnik_rs::{Map, RenderOptions};
///
/// let mut map = Map::new(256, 256);
/// map.load("style.xml")?;
/// map.zoom_all()?;
/// map.render_to_file("out.png", &RenderOptions::default())?;
/// # Ok::<(), mapnik_rs::MapnikError>(())
/// ```
pub struct Map {
    instance: UniquePtr<ffi::MapHandle>,
}

impl Map {
    /// Creates a context of the given pixel size.
    ///
    /// The first call in a process registers the default datasource plugin and font directories.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        ensure_defaults_registered();
        Self {
            instance: ffi::Map_new(width, height),
        }
    }

    fn handle(&self) -> Result<&ffi::MapHandle, MapnikError> {
        self.instance.as_ref().ok_or(MapnikError::Released)
    }

    fn handle_mut(&mut self) -> Result<Pin<&mut ffi::MapHandle>, MapnikError> {
        self.instance.as_mut().ok_or(MapnikError::Released)
    }

    /// Wraps the diagnostic of the most recent failed call on this context.
    fn last_error(&self) -> MapnikError {
        match self.handle() {
            Ok(handle) => MapnikError::Engine(ffi::Map_lastError(handle)),
            Err(e) => e,
        }
    }

    fn check(&self, status: i32) -> Result<(), MapnikError> {
        if status == 0 {
            Ok(())
        } else {
            Err(self.last_error())
        }
    }

    /// Load the stylesheet (Mapnik XML) from `path` into this context.
    ///
    /// Styles and layers are added to whatever is already loaded.
    /// Relative datasource paths inside the stylesheet resolve against the stylesheet's directory.
    ///
    /// # Errors
    /// Returns the engine's diagnostic if the file is missing or cannot be parsed.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), MapnikError> {
        let path = path.as_ref().as_os_str().as_encoded_bytes();
        ensure_no_nul("stylesheet path", path)?;
        let status = ffi::Map_load(self.handle_mut()?, path);
        self.check(status)
    }

    /// Load the stylesheet from an in-memory XML document.
    ///
    /// # Errors
    /// Returns the engine's diagnostic if the document cannot be parsed.
    pub fn load_string(&mut self, stylesheet: &str) -> Result<(), MapnikError> {
        ensure_no_nul("stylesheet", stylesheet.as_bytes())?;
        let status = ffi::Map_loadString(self.handle_mut()?, stylesheet);
        self.check(status)
    }

    /// Change the output size in pixels.
    ///
    /// # Errors
    /// Only fails if the map was released.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), MapnikError> {
        ffi::Map_resize(self.handle_mut()?, width, height);
        Ok(())
    }

    /// Current output width in pixels
    ///
    /// # Errors
    /// Only fails if the map was released.
    pub fn width(&self) -> Result<u32, MapnikError> {
        Ok(ffi::Map_width(self.handle()?))
    }

    /// Current output height in pixels
    ///
    /// # Errors
    /// Only fails if the map was released.
    pub fn height(&self) -> Result<u32, MapnikError> {
        Ok(ffi::Map_height(self.handle()?))
    }

    /// The spatial reference system of the map, e.g. `"epsg:3857"`.
    ///
    /// # Errors
    /// Only fails if the map was released.
    pub fn srs(&self) -> Result<String, MapnikError> {
        Ok(ffi::Map_getSrs(self.handle()?))
    }

    /// Set the spatial reference system.
    ///
    /// The value is not validated here; an unknown SRS fails when rendering or projecting.
    ///
    /// # Errors
    /// Fails if the map was released or `srs` contains a NUL byte.
    pub fn set_srs(&mut self, srs: &str) -> Result<(), MapnikError> {
        ensure_no_nul("srs", srs.as_bytes())?;
        ffi::Map_setSrs(self.handle_mut()?, srs);
        Ok(())
    }

    /// Zoom to the combined extent of all layers.
    ///
    /// # Errors
    /// Returns the engine's diagnostic if no extent can be determined, e.g. a layer without data.
    pub fn zoom_all(&mut self) -> Result<(), MapnikError> {
        let status = ffi::Map_zoomAll(self.handle_mut()?);
        self.check(status)
    }

    /// Zoom to the given bounding box in map SRS units.
    ///
    /// The caller must ensure `minx < maxx` and `miny < maxy`.
    ///
    /// # Errors
    /// Only fails if the map was released.
    pub fn zoom_to_min_max(
        &mut self,
        minx: f64,
        miny: f64,
        maxx: f64,
        maxy: f64,
    ) -> Result<(), MapnikError> {
        ffi::Map_zoomToBox(self.handle_mut()?, minx, miny, maxx, maxy);
        Ok(())
    }

    /// Set the margin in pixels rendered around the visible extent.
    ///
    /// # Errors
    /// Only fails if the map was released.
    pub fn set_buffer_size(&mut self, pixels: i32) -> Result<(), MapnikError> {
        ffi::Map_setBufferSize(self.handle_mut()?, pixels);
        Ok(())
    }

    /// Current buffer margin in pixels
    ///
    /// # Errors
    /// Only fails if the map was released.
    pub fn buffer_size(&self) -> Result<i32, MapnikError> {
        Ok(ffi::Map_bufferSize(self.handle()?))
    }

    /// Render the current extent into an image file encoded as [`RenderOptions::format`].
    ///
    /// # Errors
    /// Returns the engine's diagnostic if rendering fails, the format is unknown or the file cannot be written.
    pub fn render_to_file(
        &mut self,
        path: impl AsRef<Path>,
        opts: &RenderOptions,
    ) -> Result<(), MapnikError> {
        let path = path.as_ref().as_os_str().as_encoded_bytes();
        ensure_no_nul("output path", path)?;
        let format = opts.effective_format();
        ensure_no_nul("format", format.as_bytes())?;
        let status = ffi::Map_renderToFile(
            self.handle_mut()?,
            path,
            opts.scale,
            opts.effective_scale_factor(),
            format,
        );
        self.check(status)
    }

    /// Render the current extent into an in-memory [`Image`].
    ///
    /// The result is always PNG; [`RenderOptions::format`] is ignored here.
    ///
    /// # Errors
    /// Returns the engine's diagnostic if rendering fails.
    pub fn render_to_memory_png(&mut self, opts: &RenderOptions) -> Result<Image, MapnikError> {
        let image = ffi::Map_renderToPng(
            self.handle_mut()?,
            opts.scale,
            opts.effective_scale_factor(),
        );
        if image.is_null() {
            return Err(self.last_error());
        }
        Ok(Image(image))
    }

    /// A new projection for the map's current SRS.
    ///
    /// The projection is independent of the map and may outlive it.
    ///
    /// # Errors
    /// Returns the engine's diagnostic if the SRS cannot be initialised.
    pub fn projection(&mut self) -> Result<Projection, MapnikError> {
        let projection = ffi::Map_projection(self.handle_mut()?);
        if projection.is_null() {
            return Err(self.last_error());
        }
        Ok(Projection::from_handle(projection))
    }

    /// Release the context. Calling it again is a no-op.
    pub fn free(&mut self) {
        self.instance = UniquePtr::null();
    }

    /// Whether [`free`](Self::free) has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.instance.is_null()
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Map");
        match self.handle() {
            Ok(handle) => s
                .field("width", &ffi::Map_width(handle))
                .field("height", &ffi::Map_height(handle))
                .field("srs", &ffi::Map_getSrs(handle)),
            Err(_) => s.field("released", &true),
        };
        s.finish()
    }
}
