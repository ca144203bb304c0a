//! Command-line tool for rendering a Mapnik stylesheet to an image file.
//!
//! For example render the whole world with `cargo run -- -s world.xml --bbox=-180,-90,180,90`
//! or let the layers decide the extent with `cargo run -- -s city.xml --zoom-all -f jpeg80 -o city.jpg`

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use mapnik_rs::{EngineLogSeverity, Map, MapnikError, RenderOptions};

/// Command-line tool to render a map via [`mapnik`](https://mapnik.org)
#[derive(Parser, Debug)]
struct Args {
    /// Path to the Mapnik XML stylesheet
    #[arg(short = 's', long = "stylesheet")]
    stylesheet: PathBuf,

    /// Output file name
    #[arg(short = 'o', long = "output", default_value = "out.png")]
    output: PathBuf,

    /// Output encoding (png8, png32, jpeg80, webp, tiff, ...)
    #[arg(short = 'f', long = "format", default_value = "png8")]
    format: String,

    /// Image width
    #[arg(long = "width", default_value_t = 512)]
    width: u32,

    /// Image height
    #[arg(long = "height", default_value_t = 512)]
    height: u32,

    /// Extent as minx,miny,maxx,maxy in map SRS units
    #[arg(long, value_delimiter = ',', num_args = 4, allow_hyphen_values(true), conflicts_with = "zoom_all")]
    bbox: Option<Vec<f64>>,

    /// Zoom to the extent of all layers instead of an explicit bbox
    #[arg(long)]
    zoom_all: bool,

    /// Override the SRS declared by the stylesheet
    #[arg(long)]
    srs: Option<String>,

    /// Scale denominator (0 derives it from the extent)
    #[arg(long, default_value_t = 0.0)]
    scale: f64,

    /// Symbol and font magnification
    #[arg(short = 'r', long = "scale-factor", default_value_t = 1.0)]
    scale_factor: f64,

    /// Extra pixels rendered around the extent
    #[arg(long)]
    buffer_size: Option<i32>,

    /// Additional datasource plugin directory
    #[arg(long, env = "MAPNIK_INPUT_PLUGINS")]
    datasources: Option<PathBuf>,

    /// Additional font directory
    #[arg(long, env = "MAPNIK_FONTS")]
    fonts: Option<PathBuf>,

    /// Show the engine's own warnings
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_scale(self.scale)
            .with_scale_factor(self.scale_factor)
            .with_format(&self.format)
    }

    fn load(&self) -> Result<Map, MapnikError> {
        if self.verbose {
            mapnik_rs::set_engine_log_severity(EngineLogSeverity::Warn);
        }
        if let Some(dir) = &self.datasources {
            mapnik_rs::register_datasources(dir)?;
        }
        if let Some(dir) = &self.fonts {
            mapnik_rs::register_fonts(dir)?;
        }

        let mut map = Map::new(self.width, self.height);
        map.load(&self.stylesheet)?;
        if let Some(srs) = &self.srs {
            map.set_srs(srs)?;
        }
        if let Some(buffer_size) = self.buffer_size {
            map.set_buffer_size(buffer_size)?;
        }
        match self.bbox.as_deref() {
            Some(&[minx, miny, maxx, maxy]) => {
                if minx >= maxx || miny >= maxy {
                    log::warn!("bbox is empty or inverted: {minx},{miny},{maxx},{maxy}");
                }
                map.zoom_to_min_max(minx, miny, maxx, maxy)?;
            }
            _ => map.zoom_all()?,
        }
        Ok(map)
    }
}

fn main() -> Result<(), MapnikError> {
    env_logger::Builder::from_env(Env::new().default_filter_or("info")).init();
    log::info!("Starting {}", mapnik_rs::version());

    let args = Args::parse();
    log::debug!("Rendering arguments: {args:#?}");

    let before_initialisation = Instant::now();
    let mut map = args.load()?;
    log::info!(
        "Loaded {} in {:?}",
        args.stylesheet.display(),
        before_initialisation.elapsed()
    );

    let before_render = Instant::now();
    map.render_to_file(&args.output, &args.options())?;
    log::info!(
        "Rendered {}x{} {} to {} in {:?}",
        args.width,
        args.height,
        args.options().effective_format(),
        args.output.display(),
        before_render.elapsed()
    );
    Ok(())
}
