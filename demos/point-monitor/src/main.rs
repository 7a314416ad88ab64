//! Prints the live point set of a tracking surface.
//!
//! ```text
//! point-monitor [config.json]
//! ```
//!
//! Without a config file the monitor listens on 0.0.0.0:3333. Send it
//! frames with any UDP tool, e.g.
//!
//! ```text
//! echo '{"messages":[{"kind":"Cursor","action":"Added","entity":{"id":1,"x":0.5,"y":0.5}}]}' \
//!     | nc -u -w0 127.0.0.1 3333
//! ```

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use tuio_bridge::prelude::*;

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn load_config() -> Result<BridgeConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(BridgeConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    let mut server = TuioServer::builder().config(config).build();
    server.open_default().await?;

    let mut dispatcher = Dispatcher::new(server.subscribe())
        .on_added(|p| tracing::info!(point = %p, "down"))
        .on_removed(|p| tracing::info!(point = %p, "up"));

    // Stand-in for a render loop: drain events, then read the point set.
    let mut frame = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = frame.tick() => {
                if dispatcher.pump() > 0 {
                    let points = server.points();
                    tracing::info!(count = points.len(), "active points");
                    for point in points {
                        tracing::debug!(%point);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    server.dispose();
    Ok(())
}
