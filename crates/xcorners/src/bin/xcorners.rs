//! xcorners CLI: detect chessboard X-corners in an image.

use std::path::PathBuf;

use clap::Parser;
use log::{info, LevelFilter};
use xcorners::detect::{detect_xcorners, detect_xcorners_single_scale};
use xcorners::PyramidParams;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "xcorners")]
#[command(about = "Detect chessboard X-corners (saddle points) in a grayscale image")]
#[command(version)]
struct Cli {
    /// Path to the input image (any format `image` can decode).
    image: PathBuf,

    /// JSON file with `PyramidParams`; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the single-scale detector on the full-resolution image only.
    #[arg(long)]
    single_scale: bool,

    /// Log level for the stderr logger (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print corners as JSON instead of one line per corner.
    #[arg(long)]
    json: bool,

    /// Emit `tracing` spans (filtered by `RUST_LOG`) instead of plain logs.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    trace: bool,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let params = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let params: PyramidParams = serde_json::from_str(&text)?;
            params.validate()?;
            params
        }
        None => PyramidParams::default(),
    };

    let img = image::ImageReader::open(&cli.image)?.decode()?.to_luma8();
    info!(
        "{}: {}x{}",
        cli.image.display(),
        img.width(),
        img.height()
    );

    let corners = if cli.single_scale {
        detect_xcorners_single_scale(&img, &params.detector)?
    } else {
        detect_xcorners(&img, &params)?
    };
    info!("{} corners", corners.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&corners)?);
    } else {
        for c in &corners {
            println!(
                "{:9.3} {:9.3} {:7.4} {:10.4} {:6.3} {} {}",
                c.position.x, c.position.y, c.orientation, c.intensity, c.edge_ratio, c.level1, c.level2
            );
        }
    }
    Ok(())
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    if cli.trace {
        // Forward `log` records from the detector crates into the subscriber.
        let _ = tracing_log::LogTracer::init();
        xcorners::init_tracing(false);
        return Ok(());
    }

    let level: LevelFilter = cli
        .log_level
        .parse()
        .map_err(|e| format!("invalid --log-level '{}': {e}", cli.log_level))?;
    xcorners::init_with_level(level).map_err(|e| e.to_string())?;
    Ok(())
}
