//! System configuration parameters
//!
//! All tunable parameters for the SeatLink streamer.
//! Defaults match the deployed seat rig; a JSON file named by
//! `SEATLINK_CONFIG` may override any subset of them.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins;

/// Endpoint used when no config file overrides it.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8080";

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    // --- Network ---
    /// WebSocket endpoint (`ws://host:port/path`)
    pub endpoint: String,
    /// TCP connect + upgrade handshake timeout (milliseconds)
    pub connect_timeout_ms: u32,
    /// Liveness ping interval (seconds)
    pub ping_interval_secs: u32,
    /// Pong deadline after a ping (seconds)
    pub pong_timeout_secs: u32,
    /// Delay before a reconnect attempt (milliseconds)
    pub retry_delay_ms: u32,

    // --- Timing ---
    /// Delay between the end of one cycle and the start of the next (milliseconds)
    pub cycle_interval_ms: u32,
    /// Pause between the occupancy and pressure sends (milliseconds)
    pub packet_gap_ms: u32,

    // --- Thresholds ---
    /// Raw pressure values below this are reported as 0
    pub pressure_noise_floor: u16,
    /// Distance (cm) strictly below which the seat counts as occupied
    pub seat_threshold_cm: f32,

    // --- Hardware ---
    pub hardware: HardwareConfig,
}

/// Device paths and pin numbers for the Raspberry Pi bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// spidev node the MCP3008 is wired to
    pub spi_device: String,
    /// SPI clock (Hz)
    pub spi_clock_hz: u32,
    /// GPIO character device
    pub gpio_chip: String,
    /// HC-SR04 echo line
    pub echo_gpio: u32,
    /// HC-SR04 trigger line
    pub trigger_gpio: u32,
    /// Readings beyond this saturate (meters)
    pub max_distance_m: f32,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            spi_device: pins::SPI_DEVICE.to_owned(),
            spi_clock_hz: pins::SPI_CLOCK_HZ,
            gpio_chip: pins::GPIO_CHIP.to_owned(),
            echo_gpio: pins::ULTRASONIC_ECHO_GPIO,
            trigger_gpio: pins::ULTRASONIC_TRIGGER_GPIO,
            max_distance_m: 2.0,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            // Network
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            connect_timeout_ms: 5000,
            ping_interval_secs: 30,
            pong_timeout_secs: 10,
            retry_delay_ms: 3000,

            // Timing
            cycle_interval_ms: 3000,
            packet_gap_ms: 50,

            // Thresholds
            pressure_noise_floor: 20,
            seat_threshold_cm: 20.0,

            hardware: HardwareConfig::default(),
        }
    }
}

impl TelemetryConfig {
    /// Reject values the streamer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint.starts_with("ws://") {
            return Err(ConfigError::ValidationFailed("endpoint: must use the ws:// scheme"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("connect_timeout_ms: must be > 0"));
        }
        if self.ping_interval_secs == 0 || self.pong_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed("liveness: intervals must be > 0"));
        }
        if self.pong_timeout_secs >= self.ping_interval_secs {
            return Err(ConfigError::ValidationFailed(
                "pong_timeout_secs: must be shorter than ping_interval_secs",
            ));
        }
        if self.retry_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("retry_delay_ms: must be > 0"));
        }
        if self.cycle_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("cycle_interval_ms: must be > 0"));
        }
        if self.pressure_noise_floor > 1023 {
            return Err(ConfigError::ValidationFailed("pressure_noise_floor: must be <= 1023"));
        }
        if !(self.seat_threshold_cm > 0.0) {
            return Err(ConfigError::ValidationFailed("seat_threshold_cm: must be > 0"));
        }
        if !(self.hardware.max_distance_m > 0.0) {
            return Err(ConfigError::ValidationFailed("max_distance_m: must be > 0"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.connect_timeout_ms))
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.ping_interval_secs))
    }

    pub fn pong_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.pong_timeout_secs))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.retry_delay_ms))
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.cycle_interval_ms))
    }

    pub fn packet_gap(&self) -> Duration {
        Duration::from_millis(u64::from(self.packet_gap_ms))
    }
}
