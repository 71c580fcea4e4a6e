//! termpix - Show images in the terminal
//!
//! Renders an image as character art, or encodes it for a terminal graphics
//! protocol (Sixel, Kitty, iTerm2, WezTerm, Terminology).

mod detect;

use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use termpix::{
    charset, charset_names, protocol_names, render, render_text, ConversionOptions,
    DitherAlgorithm, Protocol, SchedulerConfig,
};

#[derive(Parser)]
#[command(name = "termpix")]
#[command(version)]
#[command(about = "Show images in the terminal as text or inline graphics", long_about = None)]
struct Cli {
    /// Input image file (PNG, JPEG, GIF, WebP, BMP)
    #[arg(required_unless_present_any = ["list_charsets", "list_dithers"])]
    input: Option<PathBuf>,

    /// Output width in characters
    #[arg(short, long, default_value = "80")]
    width: usize,

    /// Output height in characters (0 = from aspect ratio)
    #[arg(long, default_value = "0")]
    height: usize,

    /// Character set name (see --list-charsets)
    #[arg(short, long, default_value = "standard")]
    charset: String,

    /// Use edge detection for a line-art look
    #[arg(short, long)]
    edge: bool,

    /// Preserve colors with 24-bit ANSI escapes
    #[arg(long)]
    color: bool,

    /// Invert brightness (for light backgrounds)
    #[arg(short, long)]
    invert: bool,

    /// Half-block mode: two pixels per character cell
    #[arg(short = 'b', long)]
    half_block: bool,

    /// Dithering algorithm (see --list-dithers)
    #[arg(short, long, default_value = "none")]
    dither: String,

    /// Output protocol: auto, ascii, sixel, kitty, iterm2, wezterm, terminology
    #[arg(short, long, default_value = "ascii")]
    protocol: String,

    /// Render worker threads (default: available cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Pixel count from which rendering is parallelized
    #[arg(long)]
    threshold: Option<usize>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List character sets and exit
    #[arg(long)]
    list_charsets: bool,

    /// List dithering algorithms and exit
    #[arg(long)]
    list_dithers: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .init();

    if cli.list_charsets || cli.list_dithers {
        let mut stdout = io::stdout().lock();
        if cli.list_charsets {
            for name in charset_names() {
                writeln!(stdout, "{:<10} {}", name, charset(name))?;
            }
        }
        if cli.list_dithers {
            for algo in DitherAlgorithm::ALL {
                writeln!(stdout, "{}", algo)?;
            }
        }
        return Ok(());
    }

    let input = cli.input.ok_or("no input file given")?;
    let img = image::open(&input)
        .map_err(|e| format!("Failed to open '{}': {}", input.display(), e))?;
    info!("loaded '{}' ({}x{})", input.display(), img.width(), img.height());

    let caps = detect::from_env();
    debug!("terminal capabilities: {:?}", caps);

    if !protocol_names().contains(&cli.protocol.to_ascii_lowercase().as_str()) {
        warn!("unknown protocol '{}', using ascii", cli.protocol);
    }
    let protocol = Protocol::parse(&cli.protocol, &caps);

    let rendered = if protocol == Protocol::Ascii {
        let dither = DitherAlgorithm::from_name(&cli.dither);
        if dither == DitherAlgorithm::None && cli.dither != "none" {
            warn!("unknown dither algorithm '{}', dithering disabled", cli.dither);
        }
        if cli.color && !caps.supports_truecolor() {
            debug!("terminal reports {:?}, emitting 24-bit color anyway", caps.color_level);
        }

        let opts = ConversionOptions {
            width: cli.width,
            height: cli.height,
            charset: charset(&cli.charset).to_string(),
            invert: cli.invert,
            edge_detect: cli.edge,
            color: cli.color,
            dither,
            half_block: cli.half_block,
        };
        let mut config = SchedulerConfig::default();
        if let Some(workers) = cli.workers {
            config = config.with_workers(workers);
        }
        if let Some(threshold) = cli.threshold {
            config = config.with_threshold(threshold);
        }
        render_text(&img, &opts, &config)?
    } else {
        debug!("encoding with {} protocol", protocol);
        render(&img, protocol, cli.width)?
    };

    match cli.output {
        Some(path) => {
            fs::write(&path, &rendered)?;
            eprintln!("Written {} bytes to '{}'", rendered.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
