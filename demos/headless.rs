//! Headless run — drive the frame loop without a browser.
//!
//! Pumps a `FrameScheduler` over a `ManualHost` and a `RecordingSurface`,
//! logging per-frame stats and printing run totals at the end.
//!
//! ```text
//! RUST_LOG=neurofield=trace cargo run --example headless -- --frames 600 --seed 7
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use neurofield::{
    Engine, EngineConfig, EntropySource, FrameScheduler, ManualHost, RecordingSurface,
    RenderStyle, RunTotals, Viewport,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Style {
    Plain,
    Organic,
}

impl From<Style> for RenderStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Plain => RenderStyle::Plain,
            Style::Organic => RenderStyle::Organic,
        }
    }
}

#[derive(Parser)]
#[command(name = "headless")]
#[command(about = "Run the neural field without a display")]
struct Cli {
    /// Surface width in pixels
    #[arg(long, default_value = "1280")]
    width: f64,

    /// Surface height in pixels
    #[arg(long, default_value = "800")]
    height: f64,

    /// Frames to simulate
    #[arg(short, long, default_value = "600")]
    frames: u64,

    /// Rendering variant (overrides the config file)
    #[arg(long, value_enum)]
    style: Option<Style>,

    /// Seed for a reproducible run; OS entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// YAML file with engine config overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log stats every N frames
    #[arg(long, default_value = "60")]
    report_every: u64,

    /// Resize the surface to WIDTHxHEIGHT halfway through the run
    #[arg(long, value_parser = parse_size)]
    resize_to: Option<(f64, f64)>,
}

fn parse_size(s: &str) -> std::result::Result<(f64, f64), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let w = w.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((w, h))
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EngineConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,neurofield=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(style) = cli.style {
        config.render.style = style.into();
    }
    config.validate()?;

    let rng = match cli.seed {
        Some(seed) => EntropySource::seeded(seed),
        None => EntropySource::from_entropy(),
    };
    let viewport = Viewport::new(cli.width, cli.height);
    let engine = Engine::new(viewport, config, rng)?;
    info!(
        nodes = engine.nodes().len(),
        connection_distance = engine.connection_distance(),
        "engine ready"
    );

    let mut scheduler = FrameScheduler::new(ManualHost::new(), engine);
    let mut surface = RecordingSurface::new();
    let mut totals = RunTotals::default();

    scheduler.start()?;
    let frame_ms = 1000.0 / 60.0;
    for frame in 0..cli.frames {
        if scheduler.host_mut().take_due().is_none() {
            break;
        }
        if frame == cli.frames / 2 {
            if let Some((w, h)) = cli.resize_to {
                scheduler.resize(w, h);
            }
        }

        surface.reset();
        let Some(stats) = scheduler.tick(frame as f64 * frame_ms, &mut surface)? else {
            break;
        };
        totals.record(&stats);

        if cli.report_every > 0 && stats.frame % cli.report_every == 0 {
            info!(%stats, draw_calls = surface.commands.len(), "progress");
        } else {
            debug!(frame = stats.frame, spikes = stats.spikes(), "frame");
        }
    }
    scheduler.stop();

    print!("{totals}");
    Ok(())
}
