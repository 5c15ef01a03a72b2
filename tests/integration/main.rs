//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters or a loopback WebSocket peer. All tests run on
//! the host with no real hardware required.

mod mock_hw;
mod session_driver_tests;
mod telemetry_loop_tests;
mod transport_tests;
