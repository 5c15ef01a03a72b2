//! Outbound telemetry packets.
//!
//! Each cycle produces one [`SensorFrame`] and from it exactly two packets:
//! an occupancy event and a pressure snapshot. Both carry the same
//! [`Timestamp`], captured once before the sensors are read.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::sensors::pressure::PressureValues;

/// UTC instant rendered as ISO-8601 with millisecond precision and a `Z`
/// suffix, e.g. `2026-10-19T08:15:02.417Z`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything read during one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFrame {
    pub pressure: PressureValues,
    pub is_seated: bool,
    pub timestamp: Timestamp,
}

/// `{"isSeated": bool, "detectedAt": timestamp}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyPacket {
    pub is_seated: bool,
    pub detected_at: Timestamp,
}

/// `{"sensors": {pad: value, ...}, "timestamp": timestamp}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressurePacket {
    pub sensors: PressureValues,
    pub timestamp: Timestamp,
}

impl SensorFrame {
    pub fn occupancy_packet(&self) -> OccupancyPacket {
        OccupancyPacket {
            is_seated: self.is_seated,
            detected_at: self.timestamp.clone(),
        }
    }

    pub fn pressure_packet(&self) -> PressurePacket {
        PressurePacket {
            sensors: self.pressure,
            timestamp: self.timestamp.clone(),
        }
    }
}
