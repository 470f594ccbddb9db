//! SHT30 temperature and humidity sensor
//!
//! Runs in periodic acquisition mode; every fetch returns the latest
//! temperature and humidity words, each followed by a CRC-8.

use embedded_hal_async::i2c::{Error as _, I2c};
use log::error;

use super::DriverError;
use crate::config::address;

/// Periodic mode, 2 measurements per second, medium repeatability.
const CMD_PERIODIC_2MPS_MEDIUM: [u8; 2] = [0x22, 0x36];
/// Fetch the latest periodic result.
const CMD_FETCH_DATA: [u8; 2] = [0xE0, 0x00];

const CRC_POLYNOMIAL: u8 = 0x31;
const CRC_INIT: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sht30Measurement {
    pub temperature: f32,
    pub humidity: f32,
}

/// CRC-8 over one data word as the sensor computes it.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

pub fn temperature_from_raw(raw: u16) -> f32 {
    175.0 * raw as f32 / 65535.0 - 45.0
}

pub fn humidity_from_raw(raw: u16) -> f32 {
    100.0 * raw as f32 / 65535.0
}

/// Verify the CRC trailing a data word and return the word.
fn checked_word(chunk: &[u8]) -> Result<u16, DriverError> {
    let computed = crc8(&chunk[..2]);
    if computed != chunk[2] {
        error!("SHT30: CRC mismatch ({:#04x} != {:#04x})", chunk[2], computed);
        return Err(DriverError::Crc {
            received: chunk[2],
            computed,
        });
    }
    Ok(u16::from_be_bytes([chunk[0], chunk[1]]))
}

pub struct Sht30<I> {
    i2c: I,
}

impl<I: I2c> Sht30<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub async fn start_periodic(&mut self) -> Result<(), DriverError> {
        self.command(CMD_PERIODIC_2MPS_MEDIUM).await
    }

    pub async fn fetch(&mut self) -> Result<Sht30Measurement, DriverError> {
        self.command(CMD_FETCH_DATA).await?;

        let mut buf = [0u8; 6];
        self.i2c.read(address::SHT30, &mut buf).await.map_err(|e| {
            error!("SHT30: I2C read failed: {:?}", e);
            DriverError::Bus(e.kind())
        })?;

        let raw_temperature = checked_word(&buf[0..3])?;
        let raw_humidity = checked_word(&buf[3..6])?;

        Ok(Sht30Measurement {
            temperature: temperature_from_raw(raw_temperature),
            humidity: humidity_from_raw(raw_humidity),
        })
    }

    async fn command(&mut self, command: [u8; 2]) -> Result<(), DriverError> {
        self.i2c.write(address::SHT30, &command).await.map_err(|e| {
            error!("SHT30: command {:02x?} failed: {:?}", command, e);
            DriverError::Bus(e.kind())
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;

    #[test]
    fn test_crc_matches_datasheet_example() {
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn test_conversions_at_range_limits() {
        assert!((temperature_from_raw(0) + 45.0).abs() < 1e-4);
        assert!((temperature_from_raw(u16::MAX) - 130.0).abs() < 1e-3);
        assert_eq!(humidity_from_raw(0), 0.0);
        assert!((humidity_from_raw(u16::MAX) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_fetch_decodes_checked_words() {
        let t = [0x66, 0x66];
        let h = [0x80, 0x00];
        let frame = vec![t[0], t[1], crc8(&t), h[0], h[1], crc8(&h)];
        let expectations = [
            I2cTransaction::write(address::SHT30, vec![0xE0, 0x00]),
            I2cTransaction::read(address::SHT30, frame),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut sensor = Sht30::new(i2c.clone());
        let measurement = block_on(sensor.fetch()).unwrap();
        assert!((measurement.temperature - temperature_from_raw(0x6666)).abs() < 1e-4);
        assert!((measurement.humidity - 50.0).abs() < 0.01);
        i2c.done();
    }

    #[test]
    fn test_fetch_rejects_bad_crc() {
        let expectations = [
            I2cTransaction::write(address::SHT30, vec![0xE0, 0x00]),
            I2cTransaction::read(address::SHT30, vec![0xBE, 0xEF, 0x00, 0x00, 0x00, 0x81]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut sensor = Sht30::new(i2c.clone());
        let result = block_on(sensor.fetch());
        assert_eq!(
            result,
            Err(DriverError::Crc {
                received: 0x00,
                computed: 0x92
            })
        );
        i2c.done();
    }
}
