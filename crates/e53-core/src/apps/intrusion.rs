//! Infrared intrusion loop: sound the buzzer on a trip and report the
//! status change to the cloud

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{Either, select};
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use heapless::String;
use log::{error, info, warn};

use super::AppError;
use crate::boards::TripSignal;
use crate::cloud::report::MAX_TOPIC_LEN;
use crate::cloud::{PropertyReport, PropertyValue, ReportSink, report_topic};
use crate::config::intrusion::{ALARM_DURATION_MS, SERVICE_ID, STATUS_KEY};
use crate::status::{Status, Switch};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InfraredStatus {
    #[default]
    Safe,
    Intrude,
}

impl InfraredStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Intrude => "Intrude",
        }
    }
}

/// Broker connection flag shared between the network task and the loop.
pub struct CloudContext {
    connected: AtomicBool,
}

impl CloudContext {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Default for CloudContext {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IntrusionApp<'a, P, R, D> {
    buzzer: Switch<P>,
    sink: R,
    delay: D,
    cloud: &'a CloudContext,
    topic: String<MAX_TOPIC_LEN>,
    status: InfraredStatus,
    keep_alive_ms: Option<u32>,
}

impl<'a, P, R, D> IntrusionApp<'a, P, R, D>
where
    P: OutputPin,
    R: ReportSink,
    D: DelayNs,
{
    pub fn new(
        buzzer: P,
        sink: R,
        delay: D,
        cloud: &'a CloudContext,
        device_id: &str,
    ) -> Result<Self, AppError> {
        Ok(Self {
            buzzer: Switch::new(buzzer, "buzzer"),
            sink,
            delay,
            cloud,
            topic: report_topic(device_id)?,
            status: InfraredStatus::Safe,
            keep_alive_ms: None,
        })
    }

    /// Ping the sink whenever no trip arrives for `interval_ms`.
    pub fn with_keep_alive(mut self, interval_ms: u32) -> Self {
        self.keep_alive_ms = Some(interval_ms);
        self
    }

    pub fn status(&self) -> InfraredStatus {
        self.status
    }

    pub fn buzzer(&self) -> Status {
        self.buzzer.status()
    }

    /// Publish the current status.
    ///
    /// Skipped while disconnected. Failures are logged and dropped.
    pub async fn report(&mut self) {
        if !self.cloud.is_connected() {
            warn!(
                "Intrusion: not connected, {} report skipped",
                self.status.label()
            );
            return;
        }

        let report = PropertyReport::single(
            SERVICE_ID,
            STATUS_KEY,
            PropertyValue::Text(self.status.label()),
        );
        let Ok(payload) = report.to_json() else {
            return;
        };

        match self.sink.publish(&self.topic, &payload).await {
            Ok(()) => info!("Intrusion: reported {}", self.status.label()),
            Err(e) => error!("Intrusion: report {} failed: {}", self.status.label(), e),
        }
    }

    /// Buzz for the alarm duration, reporting the status on either side.
    pub async fn handle_trip(&mut self) -> Result<(), AppError> {
        self.buzzer.set(Status::On)?;
        self.status = InfraredStatus::Intrude;
        self.report().await;

        self.delay.delay_ms(ALARM_DURATION_MS).await;

        self.buzzer.set(Status::Off)?;
        self.status = InfraredStatus::Safe;
        self.report().await;
        Ok(())
    }

    /// Report `Safe` once, then handle every trip raised on `trip`.
    pub async fn run(&mut self, trip: &TripSignal) -> Result<Infallible, AppError> {
        self.status = InfraredStatus::Safe;
        self.report().await;

        loop {
            self.wait_for_trip(trip).await;
            info!("Intrusion: trip");
            self.handle_trip().await?;
        }
    }

    async fn wait_for_trip(&mut self, trip: &TripSignal) {
        let Some(interval_ms) = self.keep_alive_ms else {
            trip.wait().await;
            return;
        };

        loop {
            match select(trip.wait(), self.delay.delay_ms(interval_ms)).await {
                Either::First(()) => return,
                Either::Second(()) => {
                    if !self.cloud.is_connected() {
                        continue;
                    }
                    if let Err(e) = self.sink.keep_alive().await {
                        warn!("Intrusion: keep-alive failed: {}", e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::cloud::ReportError;
    use crate::status::OutputError;
    use embassy_futures::block_on;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use std::string::String as StdString;
    use std::vec::Vec;

    const DEVICE_ID: &str = "dev_1";
    const TOPIC: &str = "$oc/devices/dev_1/sys/properties/report";

    #[derive(Default)]
    struct RecordingSink {
        published: Vec<(StdString, StdString)>,
        fail: bool,
    }

    impl ReportSink for RecordingSink {
        async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ReportError> {
            if self.fail {
                return Err(ReportError::Transport);
            }
            let payload = StdString::from_utf8(payload.to_vec()).unwrap();
            self.published.push((topic.into(), payload));
            Ok(())
        }
    }

    /// Output pin that refuses every level change.
    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }
        fn set_high(&mut self) -> Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    fn payload(status: &str) -> StdString {
        std::format!(
            r#"{{"services":[{{"service_id":"Infrared","properties":{{"Infrared_Status":"{}"}}}}]}}"#,
            status
        )
    }

    fn buzz_once() -> [PinTransaction; 2] {
        [
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]
    }

    #[test]
    fn test_trip_reports_intrude_then_safe() {
        let cloud = CloudContext::new();
        cloud.set_connected(true);
        let mut sink = RecordingSink::default();
        let mut buzzer = PinMock::new(&buzz_once());

        let mut app =
            IntrusionApp::new(buzzer.clone(), &mut sink, NoopDelay::new(), &cloud, DEVICE_ID)
                .unwrap();
        block_on(app.handle_trip()).unwrap();
        assert_eq!(app.status(), InfraredStatus::Safe);
        assert_eq!(app.buzzer(), Status::Off);
        drop(app);

        assert_eq!(
            sink.published,
            [
                (StdString::from(TOPIC), payload("Intrude")),
                (StdString::from(TOPIC), payload("Safe")),
            ]
        );
        buzzer.done();
    }

    #[test]
    fn test_reports_skipped_while_disconnected() {
        let cloud = CloudContext::default();
        let mut sink = RecordingSink::default();
        let mut buzzer = PinMock::new(&buzz_once());

        let mut app =
            IntrusionApp::new(buzzer.clone(), &mut sink, NoopDelay::new(), &cloud, DEVICE_ID)
                .unwrap();
        block_on(app.handle_trip()).unwrap();
        drop(app);

        assert!(sink.published.is_empty());
        buzzer.done();
    }

    #[test]
    fn test_publish_failure_does_not_stop_the_alarm() {
        let cloud = CloudContext::new();
        cloud.set_connected(true);
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut buzzer = PinMock::new(&buzz_once());

        let mut app =
            IntrusionApp::new(buzzer.clone(), sink, NoopDelay::new(), &cloud, DEVICE_ID).unwrap();
        assert_eq!(block_on(app.handle_trip()), Ok(()));
        buzzer.done();
    }

    #[test]
    fn test_run_reports_safe_then_handles_pending_trip() {
        let cloud = CloudContext::new();
        cloud.set_connected(true);
        let trip = TripSignal::new();
        trip.raise();
        let mut sink = RecordingSink::default();

        let mut app =
            IntrusionApp::new(BrokenPin, &mut sink, NoopDelay::new(), &cloud, DEVICE_ID).unwrap();
        let result = block_on(app.run(&trip));
        assert_eq!(
            result,
            Err(AppError::Output(OutputError { name: "buzzer" }))
        );
        assert!(!trip.is_raised());
        drop(app);

        assert_eq!(sink.published, [(StdString::from(TOPIC), payload("Safe"))]);
    }

    /// Sink that raises the trip from its keep-alive, as if the sensor
    /// fired while the session was idle.
    struct IdleSink<'t> {
        trip: &'t TripSignal,
        pings: u32,
    }

    impl ReportSink for IdleSink<'_> {
        async fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), ReportError> {
            Ok(())
        }

        async fn keep_alive(&mut self) -> Result<(), ReportError> {
            self.pings += 1;
            if self.pings == 2 {
                self.trip.raise();
            }
            Ok(())
        }
    }

    #[test]
    fn test_idle_session_is_kept_alive_until_trip() {
        let cloud = CloudContext::new();
        cloud.set_connected(true);
        let trip = TripSignal::new();
        let mut sink = IdleSink {
            trip: &trip,
            pings: 0,
        };

        let mut app = IntrusionApp::new(BrokenPin, &mut sink, NoopDelay::new(), &cloud, DEVICE_ID)
            .unwrap()
            .with_keep_alive(30_000);
        let result = block_on(app.run(&trip));
        assert!(matches!(result, Err(AppError::Output(_))));
        drop(app);

        assert_eq!(sink.pings, 2);
    }

    #[test]
    fn test_oversized_device_id_is_rejected() {
        let cloud = CloudContext::new();
        let device_id = "x".repeat(MAX_TOPIC_LEN);
        let result = IntrusionApp::new(
            BrokenPin,
            RecordingSink::default(),
            NoopDelay::new(),
            &cloud,
            &device_id,
        );
        assert!(matches!(
            result,
            Err(AppError::Report(ReportError::TopicTooLong { .. }))
        ));
    }
}
