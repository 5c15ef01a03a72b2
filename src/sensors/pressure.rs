//! Pressure pad readings — channel layout, scaling and noise floor.
//!
//! Eight FSR pads sit behind the MCP3008 inputs. A normalised ADC reading is
//! scaled to the 10-bit integer range and anything under the noise floor is
//! reported as 0, so a resting seat does not register as a touch.

use core::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::SensorError;
use crate::pins::ADC_CHANNELS;

/// Full-scale integer reading.
pub const PRESSURE_MAX: u16 = 1023;

/// Pad names in ADC channel order.
pub const CHANNEL_NAMES: [&str; ADC_CHANNELS] = [
    "back_top_right",
    "back_top_left",
    "back_bottom_right",
    "back_bottom_left",
    "seat_bottom_right",
    "seat_bottom_left",
    "seat_top_right",
    "seat_top_left",
];

/// Scale a normalised reading to `0..=1023`, truncating like the ADC does.
pub fn scale_reading(value: f32) -> Result<u16, SensorError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SensorError::OutOfRange);
    }
    Ok((value * f32::from(PRESSURE_MAX)) as u16)
}

/// Values below `floor` read as 0; values at or above pass through.
pub fn apply_noise_floor(raw: u16, floor: u16) -> u16 {
    if raw < floor { 0 } else { raw }
}

/// One reading per pad, always all eight.
///
/// Serialises as a JSON object keyed by pad name, in channel order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressureValues([u16; ADC_CHANNELS]);

impl PressureValues {
    pub fn new(values: [u16; ADC_CHANNELS]) -> Self {
        Self(values)
    }

    /// Value for a pad by channel index.
    pub fn channel(&self, index: usize) -> Option<u16> {
        self.0.get(index).copied()
    }

    /// Value for a pad by name.
    pub fn get(&self, name: &str) -> Option<u16> {
        CHANNEL_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }

    pub fn set(&mut self, index: usize, value: u16) {
        self.0[index] = value;
    }

    /// `(name, value)` pairs in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u16)> + '_ {
        CHANNEL_NAMES.iter().copied().zip(self.0.iter().copied())
    }

    pub fn as_array(&self) -> &[u16; ADC_CHANNELS] {
        &self.0
    }
}

impl Serialize for PressureValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ADC_CHANNELS))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

impl fmt::Display for PressureValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{v:4}")?;
        }
        Ok(())
    }
}
