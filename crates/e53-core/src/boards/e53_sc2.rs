//! E53_SC2 smart-cover board: MPU6050 on the I2C bus

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{error, info};

use crate::config::motion;
use crate::sensors::{AxisReading, DeviceState, Mpu6050, Sensor, SensorError};

const SENSOR: &str = "MPU6050";

/// One poll of the smart-cover board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sc2Reading {
    pub accel: AxisReading,
    /// Whole degrees Celsius, truncated toward zero.
    pub temperature: i16,
}

pub struct E53Sc2<I, D> {
    mpu: Mpu6050<I, D>,
}

impl<I: I2c, D: DelayNs> E53Sc2<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            mpu: Mpu6050::new(i2c, delay),
        }
    }

    /// Reset, configure and identify the MPU6050, then let it settle.
    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.mpu.init().await.map_err(|e| {
            error!("E53_SC2 init failed: {}", e);
            SensorError::InitializationFailed {
                sensor: SENSOR,
                cause: e,
            }
        })?;
        self.mpu.delay_ms(motion::SETTLE_DELAY_MS).await;
        info!("E53_SC2 ready");
        Ok(())
    }

    pub fn state(&self) -> DeviceState {
        self.mpu.state()
    }
}

impl<I: I2c, D: DelayNs> Sensor for E53Sc2<I, D> {
    type Readings = Sc2Reading;

    async fn read(&mut self) -> Result<Sc2Reading, SensorError> {
        // The identity is re-checked on every poll so a swapped or
        // unplugged board is not read as valid data.
        self.mpu
            .check_identity()
            .await
            .map_err(|cause| SensorError::ReadFailed {
                sensor: SENSOR,
                operation: "identity check",
                cause,
            })?;

        let accel = self
            .mpu
            .read_accel()
            .await
            .map_err(|cause| SensorError::ReadFailed {
                sensor: SENSOR,
                operation: "read acceleration",
                cause,
            })?;

        let temperature = self
            .mpu
            .read_temperature()
            .await
            .map_err(|cause| SensorError::ReadFailed {
                sensor: SENSOR,
                operation: "read temperature",
                cause,
            })?;

        self.mpu.delay_ms(motion::POST_READ_DELAY_MS).await;

        Ok(Sc2Reading {
            accel,
            temperature: temperature as i16,
        })
    }
}
