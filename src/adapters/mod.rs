//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `config_file`  | ConfigPort         | JSON file (`SEATLINK_CONFIG`) |
//! | `time`         | ClockPort          | Host UTC clock              |
//! | `ws_transport` | Connector, Link    | `ws://` over TcpStream      |
//!
//! Sensor ports are implemented by [`crate::drivers`] and aggregated in
//! [`crate::sensors`].

pub mod config_file;
pub mod time;
pub mod ws_transport;
