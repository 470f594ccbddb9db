//! Host stand-ins for the board's GPIO, timer and cloud connection.

use std::convert::Infallible;
use std::time::Duration;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use log::{info, warn};

use e53_core::cloud::{ReportError, ReportSink};

/// Output pin that logs every level change.
pub struct LoggedPin {
    name: &'static str,
    high: bool,
}

impl LoggedPin {
    pub fn new(name: &'static str) -> Self {
        Self { name, high: false }
    }

    fn drive(&mut self, high: bool) {
        if self.high != high {
            info!("[gpio] {} -> {}", self.name, if high { "high" } else { "low" });
        }
        self.high = high;
    }
}

impl ErrorType for LoggedPin {
    type Error = Infallible;
}

impl OutputPin for LoggedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}

/// Delay backed by `std::thread::sleep`, optionally scaled down.
#[derive(Clone, Copy)]
pub struct HostDelay {
    divisor: u32,
}

impl HostDelay {
    pub fn new(divisor: u32) -> Self {
        Self {
            divisor: divisor.max(1),
        }
    }
}

impl DelayNs for HostDelay {
    async fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns / self.divisor)));
    }
}

/// Report sink that prints what the firmware would publish.
pub struct LogSink {
    pub published: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self { published: 0 }
    }
}

impl ReportSink for LogSink {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ReportError> {
        let Ok(body) = std::str::from_utf8(payload) else {
            warn!("[cloud] payload is not UTF-8");
            return Err(ReportError::Serialize);
        };
        info!("[cloud] {} <- {}", topic, body);
        self.published += 1;
        Ok(())
    }
}

/// Pyroelectric input that fires a fixed number of trips, one per period,
/// then fails so the watcher stops.
pub struct ScriptedTripInput {
    remaining: u32,
    period: Duration,
}

impl ScriptedTripInput {
    pub fn new(trips: u32, period: Duration) -> Self {
        Self {
            remaining: trips,
            period,
        }
    }

    async fn next_trip(&mut self) -> Result<(), ErrorKind> {
        std::thread::sleep(self.period);
        // Let the intrusion loop handle the previous trip first.
        embassy_futures::yield_now().await;
        if self.remaining == 0 {
            return Err(ErrorKind::Other);
        }
        self.remaining -= 1;
        info!("[gpio] infrared input falling edge");
        Ok(())
    }
}

impl ErrorType for ScriptedTripInput {
    type Error = ErrorKind;
}

impl Wait for ScriptedTripInput {
    async fn wait_for_high(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), ErrorKind> {
        self.next_trip().await
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), ErrorKind> {
        self.next_trip().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), ErrorKind> {
        self.next_trip().await
    }
}
