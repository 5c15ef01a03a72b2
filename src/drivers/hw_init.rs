//! One-shot hardware bring-up.
//!
//! Builds the [`HardwareRegistry`] once at startup. Every device is
//! initialised independently: a failure is logged and that slot stays
//! empty, so the streamer still runs with partial hardware.
//!
//! - **`feature = "rpi"`** — MCP3008 on spidev, HC-SR04 on GPIO cdev lines.
//! - **otherwise** — [`sim`](super::sim) channels fed from injectable atomics.

use log::info;

use crate::config::HardwareConfig;
use crate::sensors::HardwareRegistry;

#[cfg(feature = "rpi")]
pub fn init_registry(hw: &HardwareConfig) -> HardwareRegistry {
    use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
    use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
    use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
    use log::error;

    use super::hcsr04::HcSr04;
    use super::mcp3008::Mcp3008;
    use crate::pins::ADC_CHANNELS;

    fn open_spi(hw: &HardwareConfig) -> Result<SpidevDevice, String> {
        let mut dev = SpidevDevice::open(&hw.spi_device).map_err(|e| e.to_string())?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(hw.spi_clock_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        dev.0.configure(&options).map_err(|e| e.to_string())?;
        Ok(dev)
    }

    const CONSUMER: &str = "seatlink";

    let mut registry = HardwareRegistry::new();

    // One spidev handle per channel, so a bad open only loses that pad.
    for i in 0..ADC_CHANNELS {
        match open_spi(hw) {
            Ok(dev) => registry.set_channel(i, Box::new(Mcp3008::new(dev).into_channel(i as u8))),
            Err(e) => error!("HW | MCP3008 ch={} init failed on {}: {}", i, hw.spi_device, e),
        }
    }
    info!("HW | MCP3008 on {} @ {} Hz", hw.spi_device, hw.spi_clock_hz);

    let ranger = Chip::new(&hw.gpio_chip).and_then(|mut chip| {
        let trigger = chip
            .get_line(hw.trigger_gpio)?
            .request(LineRequestFlags::OUTPUT, 0, CONSUMER)?;
        let echo = chip
            .get_line(hw.echo_gpio)?
            .request(LineRequestFlags::INPUT, 0, CONSUMER)?;
        Ok((CdevPin::new(trigger)?, CdevPin::new(echo)?))
    });
    match ranger {
        Ok((trigger, echo)) => {
            registry.set_distance(Box::new(HcSr04::new(trigger, echo, Delay, hw.max_distance_m)));
            info!(
                "HW | HC-SR04 trigger=GPIO{} echo=GPIO{} max={}m",
                hw.trigger_gpio, hw.echo_gpio, hw.max_distance_m
            );
        }
        Err(e) => error!("HW | HC-SR04 init failed: {}", e),
    }

    log_summary(&registry);
    registry
}

#[cfg(not(feature = "rpi"))]
pub fn init_registry(hw: &HardwareConfig) -> HardwareRegistry {
    use super::sim::{SimChannel, SimRangeFinder};
    use crate::pins::ADC_CHANNELS;

    let mut registry = HardwareRegistry::new();
    for i in 0..ADC_CHANNELS {
        registry.set_channel(i, Box::new(SimChannel::new(i)));
    }
    registry.set_distance(Box::new(SimRangeFinder::new(hw.max_distance_m)));
    info!("HW(sim) | simulated MCP3008 and HC-SR04");

    log_summary(&registry);
    registry
}

fn log_summary(registry: &HardwareRegistry) {
    info!(
        "HW | {}/{} pressure channels, range finder {}",
        registry.channels_present(),
        crate::pins::ADC_CHANNELS,
        if registry.has_distance() { "OK" } else { "MISSING" }
    );
}
