//! Smart-cover loop: compare each reading with the first one and flag a
//! moved cover on LED D2

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use log::{error, info, warn};

use super::AppError;
use crate::boards::Sc2Reading;
use crate::config::motion::{AXIS_DEVIATION_LIMIT, POLL_INTERVAL_MS};
use crate::sensors::{AxisReading, Sensor};
use crate::status::{Status, Switch};

/// LED levels for one reading. D1 means "cover in place", D2 "cover moved".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionDecision {
    pub d1: Status,
    pub d2: Status,
}

impl MotionDecision {
    pub fn from_axes(baseline: &AxisReading, current: &AxisReading) -> Self {
        let moved = baseline
            .to_array()
            .iter()
            .zip(current.to_array().iter())
            .any(|(&b, &c)| (i32::from(c) - i32::from(b)).abs() > AXIS_DEVIATION_LIMIT);

        Self {
            d1: Status::from_bool(!moved),
            d2: Status::from_bool(moved),
        }
    }
}

pub struct MotionApp<S, A, B, D> {
    board: S,
    d1: Switch<A>,
    d2: Switch<B>,
    delay: D,
    baseline: Option<AxisReading>,
}

impl<S, A, B, D> MotionApp<S, A, B, D>
where
    S: Sensor<Readings = Sc2Reading>,
    A: OutputPin,
    B: OutputPin,
    D: DelayNs,
{
    /// `board` must already be initialised.
    pub fn new(board: S, d1: A, d2: B, delay: D) -> Self {
        Self {
            board,
            d1: Switch::new(d1, "D1"),
            d2: Switch::new(d2, "D2"),
            delay,
            baseline: None,
        }
    }

    pub async fn step(&mut self) -> Result<MotionDecision, AppError> {
        let reading = self.board.read().await.map_err(|e| {
            error!("Motion: read failed: {}", e);
            e
        })?;

        let baseline = match self.baseline {
            Some(baseline) => baseline,
            None => {
                info!("Motion: baseline {:?}", reading.accel.to_array());
                self.baseline = Some(reading.accel);
                reading.accel
            }
        };

        let decision = MotionDecision::from_axes(&baseline, &reading.accel);
        if decision.d2.is_on() && !self.d2.status().is_on() {
            warn!("Motion: cover moved, accel {:?}", reading.accel.to_array());
        }
        self.d1.set(decision.d1)?;
        self.d2.set(decision.d2)?;

        info!(
            "Motion: accel={:?} temperature={}",
            reading.accel.to_array(),
            reading.temperature
        );
        Ok(decision)
    }

    pub async fn run(&mut self) -> Result<Infallible, AppError> {
        loop {
            self.step().await?;
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
        }
    }

    pub fn baseline(&self) -> Option<AxisReading> {
        self.baseline
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::sensors::SensorError;
    use embassy_futures::block_on;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use std::collections::VecDeque;

    fn axes(x: i16, y: i16, z: i16) -> AxisReading {
        AxisReading { x, y, z }
    }

    /// Board stand-in replaying a queue of accelerometer samples.
    struct Replay(VecDeque<AxisReading>);

    impl Sensor for Replay {
        type Readings = Sc2Reading;

        async fn read(&mut self) -> Result<Sc2Reading, SensorError> {
            let accel = self.0.pop_front().ok_or(SensorError::InputFailed {
                sensor: "replay",
            })?;
            Ok(Sc2Reading {
                accel,
                temperature: 25,
            })
        }
    }

    #[test]
    fn test_deviation_limit_is_exclusive() {
        let base = axes(0, 0, 16384);
        let at_limit = MotionDecision::from_axes(&base, &axes(100, -100, 16284));
        assert_eq!(at_limit.d1, Status::On);
        assert_eq!(at_limit.d2, Status::Off);

        let past_limit = MotionDecision::from_axes(&base, &axes(0, 101, 16384));
        assert_eq!(past_limit.d1, Status::Off);
        assert_eq!(past_limit.d2, Status::On);
    }

    #[test]
    fn test_extreme_axes_do_not_overflow() {
        let decision = MotionDecision::from_axes(&axes(i16::MIN, 0, 0), &axes(i16::MAX, 0, 0));
        assert_eq!(decision.d2, Status::On);
    }

    #[test]
    fn test_first_reading_sets_baseline() {
        let samples = VecDeque::from([axes(10, 20, 30), axes(500, 20, 30), axes(15, 25, 35)]);
        let mut d1 = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let mut d2 = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]);

        let mut app = MotionApp::new(Replay(samples), d1.clone(), d2.clone(), NoopDelay::new());

        let first = block_on(app.step()).unwrap();
        assert_eq!(first.d1, Status::On);
        assert_eq!(app.baseline(), Some(axes(10, 20, 30)));

        let moved = block_on(app.step()).unwrap();
        assert_eq!(moved.d2, Status::On);

        let settled = block_on(app.step()).unwrap();
        assert_eq!(settled.d1, Status::On);
        assert_eq!(app.baseline(), Some(axes(10, 20, 30)));

        let end = block_on(app.run());
        assert!(matches!(end, Err(AppError::Sensor(_))));

        d1.done();
        d2.done();
    }
}
