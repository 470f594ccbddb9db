//! Broker connection parameters derived from [`CloudConfig`].

use crate::config::CloudConfig;

/// What an MQTT client needs to open a session with the device cloud.
///
/// The client identifier and user name are both the device id; the
/// password is the device secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectParams<'a> {
    pub server_addr: &'a str,
    pub server_port: u16,
    pub client_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub keep_alive_secs: u16,
}

impl<'a> From<&CloudConfig<'a>> for ConnectParams<'a> {
    fn from(cloud: &CloudConfig<'a>) -> Self {
        Self {
            server_addr: cloud.server_addr,
            server_port: cloud.server_port,
            client_id: cloud.device_id,
            username: cloud.device_id,
            password: cloud.device_secret,
            keep_alive_secs: cloud.lifetime_secs,
        }
    }
}
