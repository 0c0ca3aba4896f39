use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use canvas_ruler::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use canvas_ruler::render::export;
use canvas_ruler::{
    HeadlessHost, ModePreference, MountTarget, Ruler, RulerConfig, ScrollOffset, Size,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};

/// Mount target name the headless host measures
const WRAPPER: &str = "canvas-ruler-cli";
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "canvas-ruler", version, about = "Render canvas rulers to PNG")]
struct Cli {
    /// Where log output goes
    #[arg(long, global = true, default_value = "canvas-ruler.log")]
    log_file: PathBuf,
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Render both rulers and write <ruler-id>-x.png and <ruler-id>-y.png
    Render(RenderArgs),
    /// Print the default configuration as YAML
    Defaults,
}

#[derive(Args)]
struct RenderArgs {
    /// YAML, TOML or JSON ruler config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Content width
    #[arg(long)]
    width: Option<f32>,
    /// Content height
    #[arg(long)]
    height: Option<f32>,
    /// Visible wrapper size as WxH
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<Size>,
    /// Track thickness
    #[arg(long)]
    size: Option<f32>,
    #[arg(long)]
    gap: Option<f32>,
    #[arg(long)]
    scale: Option<f32>,
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f32,
    #[arg(long, default_value_t = 0.0)]
    scroll_left: f32,
    #[arg(long, default_value_t = 0.0)]
    scroll_top: f32,
    /// Output directory
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Auto,
    Screen,
    Offscreen,
    Infinite,
}

impl From<ModeArg> for ModePreference {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => ModePreference::Auto,
            ModeArg::Screen => ModePreference::Screen,
            ModeArg::Offscreen => ModePreference::Offscreen,
            ModeArg::Infinite => ModePreference::Infinite,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn parse_viewport(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {value:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("{v:?}: {e}"))
    };
    Ok(Size::new(parse(width)?, parse(height)?))
}

fn render(args: RenderArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RulerConfig::load(path)
            .with_context(|| format!("Failed to load ruler config {}", path.display()))?,
        None => RulerConfig::default(),
    };
    config.wrapper = Some(WRAPPER.to_string());
    config.mount_ref = None;
    config.scroll_selector = None;
    config.scroll_element = None;
    if let Some(width) = args.width {
        config.content_width = width;
    }
    if let Some(height) = args.height {
        config.content_height = height;
    }
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if args.size.is_some() {
        config.style.size = args.size;
    }
    if args.gap.is_some() {
        config.style.gap = args.gap;
    }
    if args.scale.is_some() {
        config.style.scale = args.scale;
    }
    canvas_ruler::config::log_config(&config);

    let viewport = args
        .viewport
        .unwrap_or(Size::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));
    let host = HeadlessHost::new(args.pixel_ratio);
    host.set_mount_size(MountTarget::Wrapper(WRAPPER.to_string()), viewport);

    let mut ruler = Ruler::new(config, Arc::new(host)).context("Failed to create ruler")?;
    let scroll = ScrollOffset::new(args.scroll_left, args.scroll_top);
    if scroll != ScrollOffset::default() {
        let dispatch = ruler.scroll_to(scroll)?;
        info!("Scrolled to {scroll:?}: {dispatch:?}");
    }
    let applied = ruler.flush(FLUSH_TIMEOUT)?;
    if applied == 0 && ruler.redraws() == 0 {
        warn!("No frame arrived from the render worker");
        bail!("ruler {} produced no frame", ruler.id());
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    let paths = export::export_surfaces(ruler.id(), ruler.surfaces(), &args.out)?;
    for path in &paths {
        println!("{}", path.display());
    }

    ruler.destroy()?;
    Ok(())
}

fn main() -> Result<()> {
    better_panic::install();
    let cli = Cli::parse();

    WriteLogger::init(
        cli.log_level.into(),
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?,
    )?;
    info!("Starting canvas-ruler");

    match cli.command {
        Cmd::Render(args) => render(args),
        Cmd::Defaults => {
            print!("{}", RulerConfig::defaults_yaml()?);
            Ok(())
        }
    }
}
