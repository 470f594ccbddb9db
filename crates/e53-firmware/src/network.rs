//! Wi-Fi station bring-up and the embassy-net stack
//!
//! ```text
//! 1. Initialise the radio and the Wi-Fi controller
//! 2. Create the network stack (DHCP) and spawn its runner
//! 3. Join the configured network
//! 4. Wait for an IPv4 address
//! ```
//!
//! A failed join is reported to the caller, which keeps running offline.

use alloc::string::String;

use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Runner, Stack, StackResources};
use esp_hal::peripherals;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};
use log::{error, info, warn};
use static_cell::StaticCell;

use e53_core::apps::CloudContext;
use e53_core::config::InternetConfig;

use crate::FirmwareError;

/// Sockets: DHCP, DNS and the broker connection, plus one spare.
const STACK_SOCKETS: usize = 4;

/// Bring up Wi-Fi and return the network stack once it has an address.
pub async fn connect(
    spawner: Spawner,
    wifi: peripherals::WIFI<'static>,
    internet: &InternetConfig<'_>,
    cloud: &'static CloudContext,
    seed: u64,
) -> Result<Stack<'static>, FirmwareError> {
    static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    let radio = esp_radio::init().map_err(|e| {
        error!("Radio initialisation failed: {:?}", e);
        FirmwareError::Radio
    })?;
    let radio = RADIO.init(radio);

    let (mut controller, interfaces) =
        esp_radio::wifi::new(radio, wifi, Default::default()).map_err(|e| {
            error!("Wi-Fi controller initialisation failed: {:?}", e);
            FirmwareError::Radio
        })?;

    static RESOURCES: StaticCell<StackResources<STACK_SOCKETS>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        NetConfig::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner).map_err(|_| FirmwareError::Spawn)?);

    let client = ClientConfig::default()
        .with_ssid(String::from(internet.ssid))
        .with_password(String::from(internet.password));
    controller
        .set_config(&ModeConfig::Client(client))
        .map_err(|e| {
            error!("Wi-Fi configuration rejected: {:?}", e);
            FirmwareError::Wifi
        })?;

    info!("Starting Wi-Fi");
    controller.start_async().await.map_err(|e| {
        error!("Wi-Fi start failed: {:?}", e);
        FirmwareError::Wifi
    })?;

    info!("Joining '{}'", internet.ssid);
    controller.connect_async().await.map_err(|e| {
        error!("Wi-Fi join failed: {:?}", e);
        FirmwareError::Wifi
    })?;

    spawner.spawn(link_watch_task(controller, cloud).map_err(|_| FirmwareError::Spawn)?);

    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("Got address {}", config.address);
    }
    Ok(stack)
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// Mark the cloud as unreachable when the access point drops us.
#[embassy_executor::task]
async fn link_watch_task(
    mut controller: WifiController<'static>,
    cloud: &'static CloudContext,
) -> ! {
    loop {
        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("Wi-Fi link lost");
        cloud.set_connected(false);
    }
}
