//! E53_IS1 infrared intrusion example: trip input on GPIO9, buzzer on
//! GPIO7, status reported to the device cloud over MQTT.

#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_time::Delay;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::Input;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info, warn};
use static_cell::StaticCell;

use e53_core::apps::{CloudContext, IntrusionApp};
use e53_core::boards::{E53Is1, TripSignal};
use e53_core::cloud::ConnectParams;
use e53_firmware::mqtt::{CloudLink, MqttBuffers, MqttSink};
use e53_firmware::{FirmwareError, credentials, halt, hardware, network};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

static CLOUD: CloudContext = CloudContext::new();
static TRIP: TripSignal = TripSignal::new();

#[embassy_executor::task]
async fn trip_watch_task(mut board: E53Is1<Input<'static>>) {
    let Err(e) = board.watch(&TRIP).await;
    error!("Trip watcher stopped: {}", e);
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("E53_IS1 infrared intrusion example");
    let settings = credentials::config();

    let watcher = E53Is1::new(hardware::trip_input(peripherals.GPIO9));
    match trip_watch_task(watcher) {
        Ok(token) => spawner.spawn(token),
        Err(_) => halt(FirmwareError::Spawn).await,
    }

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    static MQTT_BUFFERS: StaticCell<MqttBuffers> = StaticCell::new();
    let buffers = MQTT_BUFFERS.init(MqttBuffers::new());

    let link = match network::connect(spawner, peripherals.WIFI, &settings.internet, &CLOUD, seed)
        .await
    {
        Ok(stack) => {
            match MqttSink::connect(stack, ConnectParams::from(&settings.cloud), buffers).await {
                Ok(sink) => {
                    CLOUD.set_connected(true);
                    CloudLink::Online(sink)
                }
                Err(e) => {
                    warn!("Cloud unavailable ({}), running offline", e);
                    CloudLink::Offline
                }
            }
        }
        Err(e) => {
            warn!("Network unavailable ({}), running offline", e);
            CloudLink::Offline
        }
    };

    let app = IntrusionApp::new(
        hardware::output(peripherals.GPIO7),
        link,
        Delay,
        &CLOUD,
        settings.cloud.device_id,
    );
    let mut app = match app {
        Ok(app) => app.with_keep_alive(u32::from(settings.cloud.lifetime_secs) * 1000 / 2),
        Err(e) => halt(e).await,
    };

    let Err(e) = app.run(&TRIP).await;
    halt(e).await
}
