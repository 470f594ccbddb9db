//! Board constants and runtime configuration
//!
//! Everything the example applications treat as fixed (bus speed, chip
//! addresses, thresholds, loop intervals) lives here. Network and cloud
//! credentials are carried by [`Config`], which the firmware fills from its
//! build environment.

use serde::{Deserialize, Serialize};

/// I2C bus speed used by every E53 board.
pub const I2C_FREQUENCY_KHZ: u32 = 400;

/// 7-bit I2C addresses of the chips on the boards.
pub mod address {
    pub const MPU6050: u8 = 0x68;
    pub const BH1750: u8 = 0x23;
    pub const SHT30: u8 = 0x44;
}

/// E53_IA1 (agriculture) thresholds and timing.
pub mod environment {
    /// Fill light turns on strictly below this illuminance (lux).
    pub const LUX_LIGHT_ON_BELOW: i32 = 20;
    /// Motor turns on strictly above this relative humidity (%).
    pub const HUMIDITY_MOTOR_ON_ABOVE: i32 = 70;
    /// Motor turns on strictly above this temperature (°C).
    pub const TEMPERATURE_MOTOR_ON_ABOVE: i32 = 35;
    /// Delay between polls.
    pub const POLL_INTERVAL_MS: u32 = 1000;
    /// BH1750 high-resolution conversion time.
    pub const LIGHT_CONVERSION_MS: u32 = 180;
}

/// E53_SC2 (smart cover) thresholds and timing.
pub mod motion {
    /// Raw accelerometer counts an axis may drift from the baseline
    /// before the cover counts as moved.
    pub const AXIS_DEVIATION_LIMIT: i32 = 100;
    /// Delay between polls.
    pub const POLL_INTERVAL_MS: u32 = 1000;
    /// PWR_MGMT_1 reset pulse width.
    pub const RESET_DELAY_MS: u32 = 20;
    /// Settle time after a successful init.
    pub const SETTLE_DELAY_MS: u32 = 100;
    /// Pause after every full data read.
    pub const POST_READ_DELAY_MS: u32 = 50;
}

/// E53_IS1 (infrared) timing.
pub mod intrusion {
    /// How long the buzzer sounds after a trip.
    pub const ALARM_DURATION_MS: u32 = 500;
    /// Cloud service the intrusion status is reported under.
    pub const SERVICE_ID: &str = "Infrared";
    /// Property key of the intrusion status.
    pub const STATUS_KEY: &str = "Infrared_Status";
}

pub const DEFAULT_WIFI_SSID: &str = "BearPi";
pub const DEFAULT_WIFI_PASSWORD: &str = "BearPi";
pub const DEFAULT_SERVER_ADDR: &str = "121.36.42.100";
pub const DEFAULT_SERVER_PORT: u16 = 1883;
pub const DEFAULT_DEVICE_ID: &str = "60154da604feea02d7f9ae8d_2354566786";
pub const DEFAULT_DEVICE_SECRET: &str = "123456789";
/// MQTT keep-alive, seconds.
pub const DEFAULT_LIFETIME_SECS: u16 = 60;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    #[serde(default)]
    pub internet: InternetConfig<'a>,
    #[serde(default)]
    pub cloud: CloudConfig<'a>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

impl Default for InternetConfig<'_> {
    fn default() -> Self {
        Self {
            ssid: DEFAULT_WIFI_SSID,
            password: DEFAULT_WIFI_PASSWORD,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudConfig<'a> {
    pub server_addr: &'a str,
    pub server_port: u16,
    pub device_id: &'a str,
    pub device_secret: &'a str,
    #[serde(default = "default_lifetime")]
    pub lifetime_secs: u16,
}

fn default_lifetime() -> u16 {
    DEFAULT_LIFETIME_SECS
}

impl Default for CloudConfig<'_> {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR,
            server_port: DEFAULT_SERVER_PORT,
            device_id: DEFAULT_DEVICE_ID,
            device_secret: DEFAULT_DEVICE_SECRET,
            lifetime_secs: DEFAULT_LIFETIME_SECS,
        }
    }
}
