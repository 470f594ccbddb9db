pub mod bh1750;
pub mod mpu6050;
pub mod sht30;

use embedded_hal::i2c::ErrorKind;
use thiserror_no_std::Error;

pub use bh1750::Bh1750;
pub use mpu6050::{AxisReading, DeviceState, Mpu6050};
pub use sht30::{Sht30, Sht30Measurement};

/// Errors raised by the register-level chip drivers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    #[error("I2C transfer failed: {0}")]
    Bus(ErrorKind),
    #[error("payload of {len} bytes does not fit the {max} byte scratch buffer")]
    BufferTooLong { len: usize, max: usize },
    #[error("unexpected identity {found:#04x}, expected {expected:#04x}")]
    UnexpectedIdentity { expected: u8, found: u8 },
    #[error("CRC mismatch: received {received:#04x}, computed {computed:#04x}")]
    Crc { received: u8, computed: u8 },
}

/// Errors raised by board-level sensors, named after the chip and the step
/// that failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor}: initialization failed: {cause}")]
    InitializationFailed {
        sensor: &'static str,
        cause: DriverError,
    },
    #[error("{sensor}: {operation} failed: {cause}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        cause: DriverError,
    },
    #[error("{sensor}: trip input failed")]
    InputFailed { sensor: &'static str },
}

/// Trait for sensors that produce typed readings.
pub trait Sensor {
    /// The type of readings this sensor produces.
    type Readings;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> impl Future<Output = Result<Self::Readings, SensorError>>;
}
