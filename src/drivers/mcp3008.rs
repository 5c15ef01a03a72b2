//! MCP3008 8-channel 10-bit ADC over SPI.
//!
//! Each [`Mcp3008Channel`] owns its own converter handle and a fixed
//! channel number, so a failed open or transfer on one channel never
//! touches the others.
//!
//! Single-ended conversion frame (3 bytes, SPI mode 0):
//!
//! ```text
//!   TX: 0000_0001  1ccc_0000  xxxx_xxxx      (start, single/diff=1, channel)
//!   RX: xxxx_xxxx  xxxx_x0BB  BBBB_BBBB      (10-bit result)
//! ```

use embedded_hal::spi::{Operation, SpiDevice};
use log::debug;

use crate::app::ports::AnalogChannel;
use crate::error::SensorError;
use crate::pins::ADC_CHANNELS;

/// Full-scale conversion result.
pub const ADC_FULL_SCALE: u16 = 1023;

const START_BIT: u8 = 0x01;
const SINGLE_ENDED: u8 = 0x08;

pub struct Mcp3008<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mcp3008<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Raw 10-bit conversion of `channel` (0–7).
    pub fn read_raw(&mut self, channel: u8) -> Result<u16, SensorError> {
        if usize::from(channel) >= ADC_CHANNELS {
            return Err(SensorError::OutOfRange);
        }
        let tx = [START_BIT, (SINGLE_ENDED | channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transaction(&mut [Operation::Transfer(&mut rx, &tx)])
            .map_err(|_| SensorError::AdcReadFailed)?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        debug!("MCP3008 | ch={} raw={}", channel, raw);
        Ok(raw)
    }

    /// A single-channel handle owning this converter.
    pub fn into_channel(self, channel: u8) -> Mcp3008Channel<SPI> {
        Mcp3008Channel {
            adc: self,
            channel,
        }
    }
}

/// One input of an [`Mcp3008`].
pub struct Mcp3008Channel<SPI> {
    adc: Mcp3008<SPI>,
    channel: u8,
}

impl<SPI> Mcp3008Channel<SPI> {
    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl<SPI: SpiDevice + Send> AnalogChannel for Mcp3008Channel<SPI> {
    fn read(&mut self) -> Result<f32, SensorError> {
        let raw = self.adc.read_raw(self.channel)?;
        Ok(f32::from(raw) / f32::from(ADC_FULL_SCALE))
    }
}
