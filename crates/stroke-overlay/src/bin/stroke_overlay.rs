use std::{
    error::Error,
    fs,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
};

use clap::{ArgAction, Parser, Subcommand};
use stroke_overlay::calib::{
    CalibrationProvider, CalibrationResult, ObservationSet, PlanarCalibrationParams,
    PlanarCalibrator,
};
use stroke_overlay::{
    run_session, AppConfig, DirectorySurface, GlyphLayout, LayoutVariant, OverlayApp,
    SlideshowHost, StrokeFont, WordProjector,
};

#[cfg(feature = "detect")]
use stroke_overlay::calib::PatternSize;

use stroke_overlay::core::level_for_verbosity;

#[cfg(feature = "tracing")]
use stroke_overlay::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use stroke_overlay::core::init_with_level;

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

/// Project stroke lettering onto calibrated chessboard images.
#[derive(Debug, Parser)]
#[command(author, version, about = "Stroke lettering on calibrated chessboard images")]
struct Args {
    /// More log output (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find chessboard corners in reference images and write an ObservationSet.
    #[cfg(feature = "detect")]
    Detect {
        /// Reference images, in view order.
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Inner corners along x.
        #[arg(long, default_value_t = 11)]
        cols: u32,
        /// Inner corners along y.
        #[arg(long, default_value_t = 8)]
        rows: u32,
        /// Printed to stdout if omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Calibrate a camera from chessboard corner observations.
    Calibrate {
        /// JSON ObservationSet.
        #[arg(long)]
        observations: PathBuf,
        /// Where to write the CalibrationResult; printed to stdout if omitted.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Optional JSON PlanarCalibrationParams. Defaults are used if omitted.
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Print the projected segments of a word for one view as JSON.
    Project {
        #[arg(long)]
        calibration: PathBuf,
        /// Defaults to the shipped font of `--variant`.
        #[arg(long)]
        font: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = LayoutVariant::OnBoard)]
        variant: LayoutVariant,
        #[arg(long)]
        word: String,
        /// Zero-based view index.
        #[arg(long, default_value_t = 0)]
        image: usize,
    },
    /// Render a word on every reference image and play the frames.
    Show {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, value_enum, default_value_t = LayoutVariant::OnBoard)]
        variant: LayoutVariant,
        /// Defaults to the word in the config.
        #[arg(long)]
        word: Option<String>,
        /// Defaults to `output_dir` from the config.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Keep reading `<variant> <word>` lines from stdin, one slideshow each.
        #[arg(long, conflicts_with = "word")]
        interactive: bool,
    },
    /// Write a config file populated with defaults.
    InitConfig {
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    match args.command {
        #[cfg(feature = "detect")]
        Command::Detect {
            images,
            cols,
            rows,
            output,
        } => detect(&images, PatternSize::new(cols, rows), output.as_deref()),
        Command::Calibrate {
            observations,
            output,
            params,
        } => calibrate(&observations, output.as_deref(), params.as_deref()),
        Command::Project {
            calibration,
            font,
            variant,
            word,
            image,
        } => {
            let font = font.unwrap_or_else(|| PathBuf::from(variant.default_font_path()));
            project(&calibration, &font, &word, image)
        }
        Command::Show {
            config,
            variant,
            word,
            out_dir,
            interval_ms,
            interactive,
        } => show(&config, variant, word, out_dir, interval_ms, interactive),
        Command::InitConfig { output } => {
            AppConfig::default().write_json(&output)?;
            log::info!("wrote default config to {}", output.display());
            Ok(())
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    init_with_level(level_for_verbosity(verbose))?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    init_tracing(false, level_for_verbosity(verbose));
    let _ = LogTracer::init();
    Ok(())
}

#[cfg(feature = "detect")]
fn detect(
    images: &[PathBuf],
    pattern: PatternSize,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let observations = ObservationSet::detect(images, pattern)?;
    let found = observations
        .views
        .iter()
        .filter(|view| view.corners.is_some())
        .count();
    match output {
        Some(path) => {
            observations.write_json(path)?;
            log::info!("wrote observations to {}", path.display());
            println!("chessboard found in {found}/{} images", observations.views.len());
        }
        None => println!("{}", serde_json::to_string_pretty(&observations)?),
    }
    Ok(())
}

fn calibrate(
    observations: &Path,
    output: Option<&Path>,
    params: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let observations = ObservationSet::load_json(observations)?;
    let params = match params {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => PlanarCalibrationParams::default(),
    };
    let result = PlanarCalibrator::new(params).calibrate(&observations)?;
    match output {
        Some(path) => {
            result.write_json(path)?;
            log::info!("wrote calibration to {}", path.display());
            println!("rms reprojection error: {:.4} px", result.rms_error);
        }
        None => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn project(
    calibration: &Path,
    font: &Path,
    word: &str,
    image: usize,
) -> Result<(), Box<dyn Error>> {
    let calibration = CalibrationResult::load_json(calibration)?;
    let font = StrokeFont::load_json(font)?;
    let layout = GlyphLayout::reference();
    let segments = WordProjector::new(&font, &layout, &calibration).project(word, image)?;
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

fn show(
    config_path: &Path,
    variant: LayoutVariant,
    word: Option<String>,
    out_dir: Option<PathBuf>,
    interval_ms: Option<u64>,
    interactive: bool,
) -> Result<(), Box<dyn Error>> {
    let mut config = AppConfig::load_json(config_path)?;
    if let Some(ms) = interval_ms {
        config.interval_ms = ms;
    }
    let app = OverlayApp::from_config(&config)?;

    let out_dir = out_dir.unwrap_or_else(|| config.output_dir());
    let display = config.display;
    let surface_dir = out_dir.clone();
    let mut host = SlideshowHost::new(move || DirectorySurface::create(&surface_dir, display));

    if interactive {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            eprintln!("enter `<variant> <word>` or `<word>` per line; end input to quit");
        }
        let summary = run_session(&app, &mut host, stdin.lock(), io::stderr(), variant)?;
        log::info!(
            "{} words shown, {} rejected, frames in {}",
            summary.shown,
            summary.rejected,
            out_dir.display()
        );
        return Ok(());
    }

    let word = word.unwrap_or_else(|| config.word.clone());
    app.show_word(variant, &word, &mut host)?;
    host.run_to_end()?;
    host.close()?;
    log::info!("slideshow of {word:?} finished, frames in {}", out_dir.display());
    Ok(())
}
