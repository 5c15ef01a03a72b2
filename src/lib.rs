//! SeatLink streamer library.
//!
//! Exposes the domain core, adapters and drivers for integration testing.
//! Raspberry Pi bindings are behind the `rpi` feature; without it the
//! drivers fall back to injectable simulated hardware.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod session;

pub mod adapters;
pub mod drivers;
pub mod sensors;
