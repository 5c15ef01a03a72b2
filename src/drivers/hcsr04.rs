//! HC-SR04 ultrasonic range finder.
//!
//! A 10µs trigger pulse starts a measurement; the echo line then stays high
//! for the round-trip time of the ping. Distance is half the round trip at
//! the speed of sound, saturated at `max_distance_m`.
//!
//! ```text
//!  TRIG  ──┐  ┌─────┐  ┌──────────────────────────────────
//!          └──┘10µs └──┘
//!  ECHO  ──────────────────┐         ┌─────────────────────
//!                          └─ t_rt ──┘  d = t_rt · c / 2
//! ```
//!
//! No echo within `echo_timeout` means "no reading" (`Ok(None)`), which the
//! occupancy logic treats as an empty seat.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::DistanceSensor;
use crate::error::SensorError;

/// Speed of sound at ~20°C (m/s).
pub const SPEED_OF_SOUND_M_S: f32 = 343.0;

/// Default wait for the echo line to rise after triggering.
pub const DEFAULT_ECHO_TIMEOUT: Duration = Duration::from_millis(30);

pub struct HcSr04<TRIG, ECHO, D> {
    trigger: TRIG,
    echo: ECHO,
    delay: D,
    max_distance_m: f32,
    echo_timeout: Duration,
}

impl<TRIG, ECHO, D> HcSr04<TRIG, ECHO, D>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    D: DelayNs,
{
    pub fn new(trigger: TRIG, echo: ECHO, delay: D, max_distance_m: f32) -> Self {
        Self {
            trigger,
            echo,
            delay,
            max_distance_m,
            echo_timeout: DEFAULT_ECHO_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_echo_timeout(mut self, timeout: Duration) -> Self {
        self.echo_timeout = timeout;
        self
    }

    /// Longest echo pulse still inside the measurable range.
    fn max_round_trip(&self) -> Duration {
        Duration::from_secs_f32(2.0 * self.max_distance_m / SPEED_OF_SOUND_M_S)
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::GpioFailed)
    }

    fn pulse_trigger(&mut self) -> Result<(), SensorError> {
        self.trigger.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(2);
        self.trigger.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(10);
        self.trigger.set_low().map_err(|_| SensorError::GpioFailed)
    }

    pub fn measure(&mut self) -> Result<Option<f32>, SensorError> {
        self.pulse_trigger()?;

        let armed = Instant::now();
        while !self.echo_high()? {
            if armed.elapsed() > self.echo_timeout {
                return Ok(None);
            }
        }

        let rise = Instant::now();
        let limit = self.max_round_trip();
        while self.echo_high()? {
            if rise.elapsed() > limit {
                return Ok(Some(self.max_distance_m));
            }
        }

        let round_trip = rise.elapsed().as_secs_f32();
        Ok(Some((round_trip * SPEED_OF_SOUND_M_S / 2.0).min(self.max_distance_m)))
    }
}

impl<TRIG, ECHO, D> DistanceSensor for HcSr04<TRIG, ECHO, D>
where
    TRIG: OutputPin + Send,
    ECHO: InputPin + Send,
    D: DelayNs + Send,
{
    fn distance_m(&mut self) -> Result<Option<f32>, SensorError> {
        self.measure()
    }
}
