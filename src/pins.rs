//! Device nodes and pin assignments for the seat rig.
//!
//! Single source of truth — the hardware bring-up code references this module
//! rather than hard-coding device paths or BCM line numbers.

// ---------------------------------------------------------------------------
// MCP3008 8-channel 10-bit ADC (pressure pads)
// ---------------------------------------------------------------------------

/// SPI0, chip-select 0.
pub const SPI_DEVICE: &str = "/dev/spidev0.0";
/// MCP3008 is rated to 1.35 MHz at 2.7 V; 1 MHz leaves margin.
pub const SPI_CLOCK_HZ: u32 = 1_000_000;
/// Number of ADC inputs, one pressure pad each.
pub const ADC_CHANNELS: usize = 8;

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic distance sensor (occupancy)
// ---------------------------------------------------------------------------

pub const GPIO_CHIP: &str = "/dev/gpiochip0";
/// Echo input (through a 5 V → 3.3 V divider).
pub const ULTRASONIC_ECHO_GPIO: u32 = 18;
/// Trigger output.
pub const ULTRASONIC_TRIGGER_GPIO: u32 = 16;
