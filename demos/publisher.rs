//! Demo Publisher
//!
//! Binds a ZeroMQ PUB socket and sends a slowly moving scene of ten points
//! and one segment at a fixed interval. Run `headless_viewer --subscribe`
//! against it to watch the scene update.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use v3d_core::{Point, SceneDocument, Segment};
use v3d_subscriber::ZmqPublisher;

#[derive(Parser)]
#[command(name = "publisher")]
#[command(about = "Publish a moving demo scene over ZeroMQ")]
struct Args {
    /// Address to bind the PUB socket to
    #[arg(short, long, default_value = "tcp://127.0.0.1:5556")]
    address: String,

    /// Topic prefix; empty sends bare JSON
    #[arg(short, long, default_value = "")]
    topic: String,

    /// Milliseconds between messages
    #[arg(short, long, default_value = "200")]
    interval_ms: u64,

    /// Stop after this many messages
    #[arg(short, long)]
    count: Option<u64>,
}

/// Scene for frame `t`: a 5x2 block of red points drifting along x, and a
/// green segment from the origin growing with time
fn frame(t: u64) -> SceneDocument {
    let drift = (t % 5) as f64 * 0.1;
    let points = (0..10)
        .map(|i| {
            Point::new(
                2.0 * (i % 5) as f64 + drift,
                (i / 5) as f64 * 1.5,
                (i % 3) as f64 * 0.7,
            )
            .with_size(6.0)
            .with_color([1.0, 0.0, 0.0, 1.0])
        })
        .collect();
    let segments = vec![Segment::new([0.0, 0.0, 0.0], [t as f64 * 0.05, 0.5, 0.2])
        .with_color([0.0, 1.0, 0.0, 1.0])
        .with_width(2.0)];
    SceneDocument::new(points, segments)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "publisher=info,v3d_subscriber=info".into()),
        )
        .init();

    let args = Args::parse();
    let publisher = ZmqPublisher::bind(&args.address)?;
    info!("Publisher bound to {}", args.address);

    // give subscribers time to connect
    thread::sleep(Duration::from_millis(200));

    let interval = Duration::from_millis(args.interval_ms);
    let mut t = 0u64;
    while args.count.map_or(true, |count| t < count) {
        let payload = serde_json::to_vec(&frame(t))?;
        publisher.send(args.topic.as_bytes(), &payload)?;
        t += 1;
        thread::sleep(interval);
    }

    info!(sent = t, "Stopping publisher");
    Ok(())
}
