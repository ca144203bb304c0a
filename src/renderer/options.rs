//! Rendering options shared by file and in-memory output

/// Output encoding used when [`RenderOptions::format`] is left empty.
pub const DEFAULT_FORMAT: &str = "png8";

/// Options for a single render call
///
/// # Examples
///
/// ```
/// use mapnik_rs::RenderOptions;
///
/// let opts = RenderOptions::new()
///     .with_scale_factor(2.0)
///     .with_format("jpeg80");
/// assert_eq!(opts.effective_format(), "jpeg80");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Render at a fixed scale denominator; `0.0` lets the engine derive it from the extent
    pub scale: f64,
    /// Magnifies fonts, line widths and symbols, e.g. for print or high-DPI output
    pub scale_factor: f64,
    /// Output encoding for file rendering (`png8`, `png32`, `jpeg80`, ...)
    ///
    /// Only honoured by [`Map::render_to_file`](crate::Map::render_to_file).
    pub format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 0.0,
            scale_factor: 1.0,
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl RenderOptions {
    /// Creates options with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scale denominator
    ///
    /// Default: `0.0` (derived from the current extent)
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the symbol and font magnification
    ///
    /// Default: `1.0`
    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Sets the file output encoding
    ///
    /// Default: `"png8"`
    #[must_use]
    #[allow(clippy::needless_pass_by_value, reason = "false positive")]
    pub fn with_format(mut self, format: impl ToString) -> Self {
        self.format = format.to_string();
        self
    }

    /// Scale factor handed to the engine; zero means `1.0`.
    #[must_use]
    #[allow(clippy::float_cmp, reason = "only an exact zero means unset")]
    pub fn effective_scale_factor(&self) -> f64 {
        if self.scale_factor == 0.0 {
            1.0
        } else {
            self.scale_factor
        }
    }

    /// Format handed to the engine; empty means [`DEFAULT_FORMAT`].
    #[must_use]
    pub fn effective_format(&self) -> &str {
        if self.format.is_empty() {
            DEFAULT_FORMAT
        } else {
            &self.format
        }
    }
}
