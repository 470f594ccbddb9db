//! ESP32-S3 firmware-specific modules for the E53 examples
//!
//! This crate contains the hardware-specific code that cannot compile on
//! desktop targets: peripheral setup for the expansion-board header, Wi-Fi
//! and network stack bring-up, the MQTT report sink and the build-time
//! credentials. The application loops themselves live in `e53-core`.

#![no_std]

extern crate alloc;

pub mod credentials;
pub mod hardware;
pub mod mqtt;
pub mod network;

use core::fmt::Display;

use embassy_time::{Duration, Timer};
use log::error;
use thiserror_no_std::Error;

/// Failures while bringing up the board, the network or the broker session.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareError {
    #[error("I2C bus configuration rejected")]
    I2cConfig,
    #[error("radio initialisation failed")]
    Radio,
    #[error("Wi-Fi connection failed")]
    Wifi,
    #[error("task could not be spawned")]
    Spawn,
    #[error("broker address is not an IPv4 address")]
    BrokerAddress,
    #[error("TCP connection to the broker failed")]
    Tcp,
    #[error("broker refused the MQTT session")]
    Mqtt,
}

/// Log why the example stopped and idle forever.
pub async fn halt(reason: impl Display) -> ! {
    error!("Halted: {}", reason);
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
