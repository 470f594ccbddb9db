//! MQTT report sink
//!
//! One plain-TCP MQTT v5 session to the device cloud. Reports are
//! published at QoS 0 without retain; the session is kept open with pings
//! while the device is idle.

use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, IpEndpoint, Ipv4Address, Stack};
use embassy_time::Duration;
use log::{debug, error, info};
use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;

use e53_core::cloud::{ConnectParams, ReportError, ReportSink};

use crate::FirmwareError;

/// Size of each socket and MQTT packet buffer.
pub const BUFFER_LEN: usize = 1024;
const MAX_PROPERTIES: usize = 5;

/// Backing storage for one session; must outlive the [`MqttSink`].
pub struct MqttBuffers {
    socket_rx: [u8; BUFFER_LEN],
    socket_tx: [u8; BUFFER_LEN],
    packet_tx: [u8; BUFFER_LEN],
    packet_rx: [u8; BUFFER_LEN],
}

impl MqttBuffers {
    pub const fn new() -> Self {
        Self {
            socket_rx: [0; BUFFER_LEN],
            socket_tx: [0; BUFFER_LEN],
            packet_tx: [0; BUFFER_LEN],
            packet_rx: [0; BUFFER_LEN],
        }
    }
}

impl Default for MqttBuffers {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MqttSink<'a> {
    client: MqttClient<'a, TcpSocket<'a>, MAX_PROPERTIES, CountingRng>,
}

impl<'a> MqttSink<'a> {
    /// Open the TCP connection and the MQTT session.
    pub async fn connect(
        stack: Stack<'a>,
        params: ConnectParams<'a>,
        buffers: &'a mut MqttBuffers,
    ) -> Result<Self, FirmwareError> {
        let address: Ipv4Address = params.server_addr.parse().map_err(|_| {
            error!("Broker address '{}' is not IPv4", params.server_addr);
            FirmwareError::BrokerAddress
        })?;
        let endpoint = IpEndpoint::new(IpAddress::Ipv4(address), params.server_port);

        let MqttBuffers {
            socket_rx,
            socket_tx,
            packet_tx,
            packet_rx,
        } = buffers;

        let mut socket = TcpSocket::new(stack, socket_rx, socket_tx);
        socket.set_timeout(Some(Duration::from_secs(
            u64::from(params.keep_alive_secs) * 2,
        )));

        info!("Connecting to {}:{}", params.server_addr, params.server_port);
        socket.connect(endpoint).await.map_err(|e| {
            error!("TCP connect failed: {:?}", e);
            FirmwareError::Tcp
        })?;

        let mut config = ClientConfig::new(MqttVersion::MQTTv5, CountingRng(20000));
        config.add_client_id(params.client_id);
        config.add_username(params.username);
        config.add_password(params.password);
        config.keep_alive = params.keep_alive_secs;
        config.max_packet_size = BUFFER_LEN as u32;

        let mut client = MqttClient::new(
            socket,
            packet_tx,
            BUFFER_LEN,
            packet_rx,
            BUFFER_LEN,
            config,
        );
        client.connect_to_broker().await.map_err(|e| {
            error!("MQTT connect failed: {:?}", e);
            FirmwareError::Mqtt
        })?;

        info!("MQTT session open as '{}'", params.client_id);
        Ok(Self { client })
    }
}

impl ReportSink for MqttSink<'_> {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ReportError> {
        self.client
            .send_message(topic, payload, QualityOfService::QoS0, false)
            .await
            .map_err(|e| {
                error!("MQTT publish to {} failed: {:?}", topic, e);
                ReportError::Transport
            })
    }

    async fn keep_alive(&mut self) -> Result<(), ReportError> {
        debug!("MQTT ping");
        self.client.send_ping().await.map_err(|e| {
            error!("MQTT ping failed: {:?}", e);
            ReportError::Transport
        })
    }
}

/// The device's cloud link: a live session, or nothing if bring-up failed.
pub enum CloudLink<'a> {
    Online(MqttSink<'a>),
    Offline,
}

impl ReportSink for CloudLink<'_> {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ReportError> {
        match self {
            Self::Online(sink) => sink.publish(topic, payload).await,
            Self::Offline => Err(ReportError::NotConnected),
        }
    }

    async fn keep_alive(&mut self) -> Result<(), ReportError> {
        match self {
            Self::Online(sink) => sink.keep_alive().await,
            Self::Offline => Err(ReportError::NotConnected),
        }
    }
}
