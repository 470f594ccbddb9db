//! Expansion-board header wiring
//!
//! | Signal | GPIO |
//! |--------|------|
//! | I2C SDA | 12 |
//! | I2C SCL | 11 |
//! | Output 1 (fill light, LED D1, buzzer) | 7 |
//! | Output 2 (motor, LED D2) | 8 |
//! | Infrared trip input | 9 |

use e53_core::config::I2C_FREQUENCY_KHZ;
use esp_hal::gpio::{Input, InputConfig, InputPin, Level, Output, OutputConfig, OutputPin, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal::{Async, peripherals};
use log::error;

use crate::FirmwareError;

/// Create the board's I2C bus on GPIO12 (SDA) and GPIO11 (SCL).
pub fn create_i2c_bus(
    i2c0: peripherals::I2C0<'static>,
    sda: peripherals::GPIO12<'static>,
    scl: peripherals::GPIO11<'static>,
) -> Result<I2c<'static, Async>, FirmwareError> {
    let config = I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ));
    let bus = I2c::new(i2c0, config).map_err(|e| {
        error!("I2C configuration failed: {:?}", e);
        FirmwareError::I2cConfig
    })?;

    Ok(bus.with_sda(sda).with_scl(scl).into_async())
}

/// Push-pull output starting low (off).
pub fn output(pin: impl OutputPin + 'static) -> Output<'static> {
    Output::new(pin, Level::Low, OutputConfig::default())
}

/// Trip input; the sensor pulls the line low when it fires.
pub fn trip_input(pin: impl InputPin + 'static) -> Input<'static> {
    Input::new(pin, InputConfig::default().with_pull(Pull::Up))
}
