//! Application core — pure domain logic, zero direct I/O.
//!
//! This module contains the packet shapes and the per-connection telemetry
//! loop. All interaction with hardware and the network happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals or a server.

pub mod packets;
pub mod ports;
pub mod telemetry;
