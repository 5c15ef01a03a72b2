//! Sensor subsystem — the [`HardwareRegistry`] and the aggregating [`SensorReader`].
//!
//! The registry is built once at startup and owns every device handle. A
//! channel whose initialisation failed is simply absent. The reader borrows
//! the registry for the lifetime of one connection and produces best-effort
//! values each cycle.

pub mod occupancy;
pub mod pressure;

use log::warn;

use crate::app::ports::{AnalogChannel, DistanceSensor, SensorPort};
use crate::error::SensorError;
use crate::pins::ADC_CHANNELS;
use pressure::{PressureValues, apply_noise_floor, scale_reading};

/// Process-wide device handles, initialised once.
pub struct HardwareRegistry {
    channels: [Option<Box<dyn AnalogChannel>>; ADC_CHANNELS],
    distance: Option<Box<dyn DistanceSensor>>,
}

impl Default for HardwareRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareRegistry {
    /// An empty registry: every read falls back to its default.
    pub fn new() -> Self {
        Self {
            channels: core::array::from_fn(|_| None),
            distance: None,
        }
    }

    /// Install the handle for pressure channel `index`. Indices past the
    /// last channel are logged and dropped.
    pub fn set_channel(&mut self, index: usize, channel: Box<dyn AnalogChannel>) {
        match self.channels.get_mut(index) {
            Some(slot) => *slot = Some(channel),
            None => warn!("SENSOR | no pressure channel {} (have {})", index, ADC_CHANNELS),
        }
    }

    pub fn set_distance(&mut self, sensor: Box<dyn DistanceSensor>) {
        self.distance = Some(sensor);
    }

    /// Builder-style [`set_channel`](Self::set_channel).
    #[must_use]
    pub fn with_channel(mut self, index: usize, channel: Box<dyn AnalogChannel>) -> Self {
        self.set_channel(index, channel);
        self
    }

    /// Builder-style [`set_distance`](Self::set_distance).
    #[must_use]
    pub fn with_distance(mut self, sensor: Box<dyn DistanceSensor>) -> Self {
        self.set_distance(sensor);
        self
    }

    /// Number of pressure channels that initialised.
    pub fn channels_present(&self) -> usize {
        self.channels.iter().filter(|c| c.is_some()).count()
    }

    pub fn has_distance(&self) -> bool {
        self.distance.is_some()
    }

    fn read_channel(&mut self, index: usize) -> Result<f32, SensorError> {
        match self.channels.get_mut(index).and_then(Option::as_mut) {
            Some(ch) => ch.read(),
            None => Err(SensorError::NotInitialized),
        }
    }

    fn read_distance(&mut self) -> Result<Option<f32>, SensorError> {
        match self.distance.as_mut() {
            Some(sensor) => sensor.distance_m(),
            None => Err(SensorError::NotInitialized),
        }
    }
}

/// Reads every sensor through a borrowed registry.
///
/// Individual read failures are logged and replaced with a safe default —
/// a single flaky pad must not take down the telemetry loop.
pub struct SensorReader<'a> {
    registry: &'a mut HardwareRegistry,
    noise_floor: u16,
    seat_threshold_cm: f32,
}

impl<'a> SensorReader<'a> {
    pub fn new(registry: &'a mut HardwareRegistry, noise_floor: u16, seat_threshold_cm: f32) -> Self {
        Self {
            registry,
            noise_floor,
            seat_threshold_cm,
        }
    }
}

impl SensorPort for SensorReader<'_> {
    fn read_pressure(&mut self) -> PressureValues {
        let mut values = PressureValues::default();
        for i in 0..ADC_CHANNELS {
            let value = self.registry.read_channel(i).and_then(scale_reading);
            match value {
                Ok(raw) => values.set(i, apply_noise_floor(raw, self.noise_floor)),
                Err(e) => {
                    warn!("SENSOR | pressure read failed ch={}: {}", i, e);
                    values.set(i, 0);
                }
            }
        }
        values
    }

    fn read_occupancy(&mut self) -> bool {
        match self.registry.read_distance() {
            Ok(distance) => occupancy::is_occupied(distance, self.seat_threshold_cm),
            Err(SensorError::NotInitialized) => false,
            Err(e) => {
                warn!("SENSOR | distance read failed: {}", e);
                false
            }
        }
    }
}
