//! BH1750 ambient light sensor

use embedded_hal_async::i2c::{Error as _, I2c};
use log::error;

use super::DriverError;
use crate::config::address;

const CMD_POWER_ON: u8 = 0x01;
/// Continuous high-resolution mode (1 lx, ~120 ms typical).
const CMD_CONTINUOUS_HIGH_RES: u8 = 0x10;

/// Counts per lux in high-resolution mode.
const COUNTS_PER_LUX: f32 = 1.2;

pub fn lux_from_raw(raw: u16) -> f32 {
    raw as f32 / COUNTS_PER_LUX
}

pub struct Bh1750<I> {
    i2c: I,
}

impl<I: I2c> Bh1750<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub async fn power_on(&mut self) -> Result<(), DriverError> {
        self.command(CMD_POWER_ON).await
    }

    /// Start a high-resolution conversion. The result is valid after the
    /// conversion time has elapsed.
    pub async fn start_measurement(&mut self) -> Result<(), DriverError> {
        self.command(CMD_CONTINUOUS_HIGH_RES).await
    }

    /// Read the last conversion result in lux.
    pub async fn read_lux(&mut self) -> Result<f32, DriverError> {
        let mut buf = [0u8; 2];
        self.i2c.read(address::BH1750, &mut buf).await.map_err(|e| {
            error!("BH1750: I2C read failed: {:?}", e);
            DriverError::Bus(e.kind())
        })?;
        Ok(lux_from_raw(u16::from_be_bytes(buf)))
    }

    async fn command(&mut self, opcode: u8) -> Result<(), DriverError> {
        self.i2c.write(address::BH1750, &[opcode]).await.map_err(|e| {
            error!("BH1750: command {:#04x} failed: {:?}", opcode, e);
            DriverError::Bus(e.kind())
        })
    }
}
