//! E53_SC2 smart-cover example: LED D1 on GPIO7, LED D2 on GPIO8.

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
use esp_hal::timer::timg::TimerGroup;
use log::info;

use e53_core::apps::MotionApp;
use e53_core::boards::E53Sc2;
use e53_firmware::{halt, hardware};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 32768);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("E53_SC2 smart-cover example");

    let i2c = match hardware::create_i2c_bus(
        peripherals.I2C0,
        peripherals.GPIO12,
        peripherals.GPIO11,
    ) {
        Ok(i2c) => i2c,
        Err(e) => halt(e).await,
    };

    let mut board = E53Sc2::new(i2c, Delay);
    if let Err(e) = board.init().await {
        halt(e).await;
    }

    let mut app = MotionApp::new(
        board,
        hardware::output(peripherals.GPIO7),
        hardware::output(peripherals.GPIO8),
        Delay,
    );
    let Err(e) = app.run().await;
    halt(e).await
}
