//! Sensor drivers and one-shot hardware bring-up.

pub mod hcsr04;
pub mod hw_init;
pub mod mcp3008;
#[cfg(not(feature = "rpi"))]
pub mod sim;
