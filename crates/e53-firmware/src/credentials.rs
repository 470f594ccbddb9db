//! Network and cloud settings baked in at build time.
//!
//! `build.rs` exports `E53_*` variables from the environment or a `.env`
//! file; anything unset keeps the board's sample value.

use e53_core::config::{
    CloudConfig, Config, DEFAULT_DEVICE_ID, DEFAULT_DEVICE_SECRET, DEFAULT_LIFETIME_SECS,
    DEFAULT_SERVER_ADDR, DEFAULT_SERVER_PORT, DEFAULT_WIFI_PASSWORD, DEFAULT_WIFI_SSID,
    InternetConfig,
};
use log::warn;

const fn or_default(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(value) => value,
        None => default,
    }
}

fn server_port() -> u16 {
    let Some(port) = option_env!("E53_SERVER_PORT") else {
        return DEFAULT_SERVER_PORT;
    };
    port.parse().unwrap_or_else(|_| {
        warn!(
            "E53_SERVER_PORT '{}' is not a port number, using {}",
            port, DEFAULT_SERVER_PORT
        );
        DEFAULT_SERVER_PORT
    })
}

pub fn config() -> Config<'static> {
    Config {
        internet: InternetConfig {
            ssid: or_default(option_env!("E53_WIFI_SSID"), DEFAULT_WIFI_SSID),
            password: or_default(option_env!("E53_WIFI_PASSWORD"), DEFAULT_WIFI_PASSWORD),
        },
        cloud: CloudConfig {
            server_addr: or_default(option_env!("E53_SERVER_ADDR"), DEFAULT_SERVER_ADDR),
            server_port: server_port(),
            device_id: or_default(option_env!("E53_DEVICE_ID"), DEFAULT_DEVICE_ID),
            device_secret: or_default(option_env!("E53_DEVICE_SECRET"), DEFAULT_DEVICE_SECRET),
            lifetime_secs: DEFAULT_LIFETIME_SECS,
        },
    }
}
