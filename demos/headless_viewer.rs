//! Headless Viewer
//!
//! Drives a viewer session without a window: load or generate a scene,
//! optionally follow a publisher for a while, pick at viewport pixels and
//! export the result. Every status line is logged.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use v3d_core::RandomSceneParams;
use v3d_visualization::{HeadlessBackend, ViewerConfig, ViewerSession};

#[derive(Parser)]
#[command(name = "headless_viewer")]
#[command(about = "Run a v3d viewer session without a window")]
struct Args {
    /// RON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene document to load
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Generate a random scene with this many points
    #[arg(long)]
    points: Option<usize>,

    /// Segments for the random scene
    #[arg(long, default_value = "10")]
    segments: usize,

    /// Publisher address to subscribe to
    #[arg(short, long)]
    subscribe: Option<String>,

    /// Seconds to follow the publisher
    #[arg(long, default_value = "5")]
    duration: u64,

    /// Viewport pixel to pick at, as `x,y`; repeat to extend the selection
    #[arg(long = "pick", value_parser = parse_pixel)]
    picks: Vec<(f32, f32)>,

    /// Write the final scene here
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn parse_pixel(s: &str) -> std::result::Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {}", e))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "headless_viewer=info,v3d=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ViewerConfig::load_or_default(path),
        None => ViewerConfig::default(),
    };

    let (width, height) = config.viewport;
    let mut session = ViewerSession::new(HeadlessBackend::new(width, height), config)?;

    if let Some(path) = &args.load {
        if !session.load_file(path) {
            bail!("{}", session.status());
        }
    }
    if let Some(n_points) = args.points {
        let params = RandomSceneParams {
            n_points,
            n_segments: args.segments,
            ..session.config().random_scene.clone()
        };
        session.generate_with(&params);
    }
    info!("{}", session.counts_text());

    if let Some(address) = &args.subscribe {
        if !session.start_subscription(address) {
            bail!("{}", session.status());
        }

        let deadline = Instant::now() + Duration::from_secs(args.duration);
        let mut last_counts = session.model().counts();
        while Instant::now() < deadline && session.is_subscribed() {
            session.pump_events();
            if session.model().counts() != last_counts {
                last_counts = session.model().counts();
                info!("{}", session.counts_text());
            }
            thread::sleep(Duration::from_millis(50));
        }
        session.stop_subscription();
    }

    for (i, &(x, y)) in args.picks.iter().enumerate() {
        session.pick(x, y, i > 0);
    }
    if !args.picks.is_empty() {
        info!(selected = ?session.renderer().selected(), "selection");
    }

    if let Some(path) = &args.export {
        if !session.export_file(path) {
            bail!("{}", session.status());
        }
    }

    info!("{}", session.counts_text());
    Ok(())
}
