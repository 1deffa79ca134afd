use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use ascii_live::{
    render_frame, FrameClock, LiveConfig, Palette, RenderLoop, Session, StillFrame,
    VideoConstraints, Viewport, OUTPUT_WIDTH_RANGE,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};

mod devices;
mod logging;
mod terminal;

use devices::{Feed, FeedDevices};
use terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a camera-like feed as live ASCII art")]
struct Cli {
    /// Log level written to stderr
    #[arg(long, global = true, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a feed in the terminal until it ends
    Run(RunArgs),
    /// Render a single frame to stdout
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Image, GIF or directory of frames to use as the camera
    #[arg(required_unless_present = "noise")]
    input: Option<PathBuf>,
    /// Use random noise as the camera instead of a file
    #[arg(long, conflicts_with = "input")]
    noise: bool,
    /// Seed for the noise feed
    #[arg(long, requires = "noise")]
    seed: Option<u64>,
    /// Play the input once instead of looping
    #[arg(long, default_value_t = false)]
    once: bool,
    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,
    /// Display refresh rate driving the loop
    #[arg(long, default_value_t = 60)]
    refresh_hz: u32,
    /// Viewport size in pixels used for font size hints, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_viewport)]
    viewport: Viewport,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image path
    input: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug, Clone)]
struct RenderSettings {
    /// TOML file with `output_width` and `palette`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Glyphs per row
    #[arg(long, value_parser = clap::value_parser!(u32).range(
        i64::from(*OUTPUT_WIDTH_RANGE.start())..=i64::from(*OUTPUT_WIDTH_RANGE.end())
    ))]
    width: Option<u32>,
    /// Palette preset mapping brightness to glyphs
    #[arg(long, value_enum, conflicts_with = "chars")]
    palette: Option<PalettePreset>,
    /// Custom palette, densest glyph first
    #[arg(long)]
    chars: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PalettePreset {
    Classic,
    Blocks,
    Detailed,
    Simple,
    Binary,
    Lines,
    Sketch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log_level).context("failed to install logger")?;
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Preview(args) => preview(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.settings.to_config()?;
    let feed = match args.input {
        Some(path) if !args.noise => Feed::Path { path, looping: !args.once },
        _ if args.noise => Feed::Noise { seed: args.seed },
        _ => bail!("an input path or --noise is required"),
    };

    if args.refresh_hz == 0 {
        bail!("--refresh-hz must be greater than zero");
    }
    let refresh = Duration::from_secs(1) / args.refresh_hz;
    let deadline = match args.duration {
        Some(secs) => Some(
            Instant::now()
                + Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("invalid duration {secs}"))?,
        ),
        None => None,
    };

    let mut devices = FeedDevices::new(feed);
    let mut surface = TerminalSurface::stdout(args.viewport);
    let mut session = Session::new(RenderLoop::new(FrameClock::new(refresh)), config);
    session
        .start(&mut devices, &VideoConstraints::default(), &mut surface)
        .context("failed to start video feed")?;

    while session.is_active() {
        let Some((id, due)) = session.render_loop().scheduler().peek_next() else {
            break;
        };
        if deadline.is_some_and(|deadline| due >= deadline) {
            break;
        }

        let now = Instant::now();
        if due > now {
            thread::sleep(due - now);
        }

        let clock = session.render_loop_mut().scheduler_mut();
        clock.pop_next();
        let now = Instant::now();
        clock.advance_to(now);
        session.fire(id, now, &mut surface);
    }

    info!("played {} frames", session.render_loop().published_frames());
    session.teardown();
    Ok(())
}

fn preview(args: PreviewArgs) -> Result<()> {
    let config = args.settings.to_config()?;
    let mut frames = devices::load_frames(&args.input)
        .with_context(|| format!("failed to load {:?}", args.input))?;
    if frames.is_empty() {
        bail!("no frames found in {:?}", args.input);
    }

    let mut source = StillFrame::new(frames.swap_remove(0).image);
    let frame = render_frame(&mut source, config.output_width(), config.palette())
        .with_context(|| format!("failed to render {:?}", args.input))?;

    for row in frame.rows() {
        println!("{}", row);
    }

    Ok(())
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let (width, height) =
        value.split_once(['x', 'X']).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let width: f32 = width.trim().parse().map_err(|err| format!("invalid width: {err}"))?;
    let height: f32 = height.trim().parse().map_err(|err| format!("invalid height: {err}"))?;
    if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
        return Err(format!("viewport must be positive, got {value}"));
    }
    Ok(Viewport::new(width, height))
}

impl RenderSettings {
    fn to_config(&self) -> Result<LiveConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {:?}", path))?;
                LiveConfig::from_toml(&source)
                    .with_context(|| format!("failed to parse {:?}", path))?
            },
            None => LiveConfig::default(),
        };

        if let Some(width) = self.width {
            config.set_output_width(width)?;
        }
        if let Some(chars) = &self.chars {
            config.set_palette(Palette::new(chars.as_str())?);
        } else if let Some(preset) = self.palette {
            config.set_palette(preset.to_palette());
        }

        Ok(config)
    }
}

impl PalettePreset {
    fn to_palette(self) -> Palette {
        match self {
            PalettePreset::Classic => Palette::classic(),
            PalettePreset::Blocks => Palette::blocks(),
            PalettePreset::Detailed => Palette::detailed(),
            PalettePreset::Simple => Palette::simple(),
            PalettePreset::Binary => Palette::binary(),
            PalettePreset::Lines => Palette::lines(),
            PalettePreset::Sketch => Palette::sketch(),
        }
    }
}
