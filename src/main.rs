//! SeatLink — seat telemetry streamer, main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  JsonConfigFile   SystemClock   WsConnector / WsLink           │
//! │  (ConfigPort)     (ClockPort)   (Connector / Link, ws-io thr)  │
//! │  MCP3008 / HC-SR04 drivers ──▶ HardwareRegistry                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  SessionDriver ──▶ TelemetryLoop (telemetry thread)    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Context, Result};
use log::{info, warn};

use seatlink::adapters::config_file::JsonConfigFile;
use seatlink::adapters::time::SystemClock;
use seatlink::adapters::ws_transport::WsConnector;
use seatlink::app::ports::ConfigPort;
use seatlink::config::TelemetryConfig;
use seatlink::drivers::hw_init::init_registry;
use seatlink::error::ConfigError;
use seatlink::session::SessionDriver;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("SeatLink v{} starting...", env!("CARGO_PKG_VERSION"));

    // ── 2. Interrupt: exit at once, nothing to drain ──────────
    ctrlc::set_handler(|| {
        info!("Received shutdown signal, exiting");
        std::process::exit(0);
    })
    .context("installing interrupt handler")?;

    // ── 3. Config (file or defaults) ──────────────────────────
    let source = JsonConfigFile::from_env();
    let config = match source.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound) => {
            info!("CONFIG | no config file, using defaults");
            TelemetryConfig::default()
        }
        Err(e) => {
            warn!("CONFIG | {}, using defaults", e);
            TelemetryConfig::default()
        }
    };
    info!(
        "CONFIG | endpoint={} cycle={:?} gap={:?} ping={:?}/{:?}",
        config.endpoint,
        config.cycle_interval(),
        config.packet_gap(),
        config.ping_interval(),
        config.pong_timeout()
    );

    // ── 4. Hardware ───────────────────────────────────────────
    let registry = init_registry(&config.hardware);

    // ── 5. Session driver (never returns) ─────────────────────
    let connector = WsConnector::from_config(&config);
    let mut driver = SessionDriver::new(connector, registry, SystemClock::new(), config);
    driver.run()
}
