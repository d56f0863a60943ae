//! speedsign CLI: read speed-limit signs from still images.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use speedsign::{validate_digits, FrameReport, Reader, ReaderConfig, SignCandidate};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "speedsign")]
#[command(about = "Read the speed value and supplementary board of circular speed-limit signs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read sign candidates in one or more images.
    Read(CliReadArgs),

    /// Validate a digit sequence as a speed value.
    Validate {
        /// Comma-separated digits, left to right (e.g. 1,3,0).
        #[arg(long)]
        digits: String,

        /// Three-digit values above this are flagged.
        #[arg(long, default_value = "130")]
        max_speed: u32,
    },

    /// Print the default reader configuration as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CliReadArgs {
    /// Input images or directories (searched recursively).
    #[arg(long = "image", required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// JSON list of sign candidates: [{"polygon": [[x, y], ...]}, ...],
    /// used for every image. When omitted, each image reads the `.json`
    /// file with the same stem next to it.
    #[arg(long)]
    signs: Option<PathBuf>,

    /// MLP digit classifier weights (JSON).
    #[arg(long)]
    classifier: PathBuf,

    /// Reader configuration (JSON). Missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the frame reports (JSON array). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory to write each sign-plus-board crop to (PNG).
    #[arg(long)]
    board_dir: Option<PathBuf>,

    /// Equalize luma before edge detection.
    #[arg(long)]
    equalize: bool,

    /// Override the maximum frame dimension.
    #[arg(long)]
    max_dim: Option<u32>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Read(args) => run_read(&args),
        Commands::Validate { digits, max_speed } => run_validate(&digits, max_speed),
        Commands::DefaultConfig => run_default_config(),
    }
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&ReaderConfig::default())?);
    Ok(())
}

// ── validate ───────────────────────────────────────────────────────────

fn parse_digits(s: &str) -> CliResult<Vec<u8>> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| match t.parse::<u8>() {
            Ok(d) if d <= 9 => Ok(d),
            _ => Err(format!("invalid digit: {:?}", t).into()),
        })
        .collect()
}

fn run_validate(digits: &str, max_speed: u32) -> CliResult<()> {
    let digits = parse_digits(digits)?;
    let reading = validate_digits(&digits, max_speed)?;

    println!("Digits:     {:?}", reading.digits);
    println!("Speed:      {}", reading.speed);
    if reading.is_plausible() {
        println!("Plausible:  yes");
    } else {
        let flags: Vec<&str> = reading.implausible.iter().map(|f| f.code()).collect();
        println!("Plausible:  no ({})", flags.join(", "));
    }
    Ok(())
}

// ── read ───────────────────────────────────────────────────────────────

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// One entry of the batch report.
#[derive(Debug, serde::Serialize)]
struct ImageReport {
    image: PathBuf,
    elapsed_ms: f64,
    #[serde(flatten)]
    frame: FrameReport,
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Expand directories into the images below them; files are kept as given.
fn collect_images(inputs: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && has_image_extension(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            images.extend(found);
        } else if input.is_file() {
            images.push(input.clone());
        } else {
            return Err(format!("input not found: {}", input.display()).into());
        }
    }
    Ok(images)
}

fn candidates_path(image: &Path, signs: Option<&Path>) -> PathBuf {
    match signs {
        Some(p) => p.to_path_buf(),
        None => image.with_extension("json"),
    }
}

fn read_image(reader: &Reader, path: &Path, args: &CliReadArgs) -> CliResult<ImageReport> {
    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })?;
    let frame = img.to_rgb8();
    let candidates = SignCandidate::list_from_json_file(&candidates_path(path, args.signs.as_deref()))?;

    let start = Instant::now();
    let reading = reader.read_frame(&frame, &candidates);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;
    tracing::info!(
        "{}: {}x{}, {} of {} candidates read in {:.1} ms",
        path.display(),
        frame.width(),
        frame.height(),
        reading.signs.len(),
        candidates.len(),
        elapsed_ms,
    );
    for sign in &reading.signs {
        tracing::info!(
            "Speed {} at {:?} (digits from {} edges, board from {} edges)",
            sign.speed(),
            sign.digits.sign_rect,
            sign.digits.kind,
            sign.board.kind,
        );
    }

    if let Some(dir) = &args.board_dir {
        std::fs::create_dir_all(dir)?;
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
        for (i, sign) in reading.signs.iter().enumerate() {
            if sign.board.is_empty() {
                continue;
            }
            let out = dir.join(format!("{}_sign_{:02}_{}.png", stem, i, sign.speed()));
            sign.board.image.save(&out)?;
            tracing::info!("Board crop written to {}", out.display());
        }
    }

    Ok(ImageReport {
        image: path.to_path_buf(),
        elapsed_ms,
        frame: reading.report(),
    })
}

fn run_read(args: &CliReadArgs) -> CliResult<()> {
    let mut reader = Reader::from_files(args.config.as_deref(), &args.classifier)?;
    if args.equalize {
        reader.config_mut().preprocess.equalize_luma = true;
    }
    if let Some(max_dim) = args.max_dim {
        reader.config_mut().preprocess.max_dimension = max_dim;
    }

    let images = collect_images(&args.images)?;
    tracing::info!("{} images to read", images.len());

    let mut reports = Vec::with_capacity(images.len());
    for image in &images {
        match read_image(&reader, image, args) {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("{}: {}", image.display(), e),
        }
    }
    if !images.is_empty() {
        let total: f64 = reports.iter().map(|r| r.elapsed_ms).sum();
        tracing::info!(
            "{} of {} images read, {:.1} ms total",
            reports.len(),
            images.len(),
            total
        );
    }

    let json = serde_json::to_string_pretty(&reports)?;
    match &args.out {
        Some(out) => {
            std::fs::write(out, &json)?;
            tracing::info!("Results written to {}", out.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
