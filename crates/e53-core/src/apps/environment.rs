//! Agriculture loop: fill light on in the dark, motor on when hot or humid

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use log::{error, info};

use super::AppError;
use crate::boards::Ia1Reading;
use crate::config::environment::{
    HUMIDITY_MOTOR_ON_ABOVE, LUX_LIGHT_ON_BELOW, POLL_INTERVAL_MS, TEMPERATURE_MOTOR_ON_ABOVE,
};
use crate::sensors::Sensor;
use crate::status::{Status, Switch};

/// Output levels chosen for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentDecision {
    pub light: Status,
    pub motor: Status,
}

impl EnvironmentDecision {
    /// Thresholds compare the readings truncated toward zero.
    pub fn from_reading(reading: &Ia1Reading) -> Self {
        let lux = reading.lux as i32;
        let humidity = reading.humidity as i32;
        let temperature = reading.temperature as i32;

        Self {
            light: Status::from_bool(lux < LUX_LIGHT_ON_BELOW),
            motor: Status::from_bool(
                humidity > HUMIDITY_MOTOR_ON_ABOVE || temperature > TEMPERATURE_MOTOR_ON_ABOVE,
            ),
        }
    }
}

pub struct EnvironmentApp<S, L, M, D> {
    board: S,
    light: Switch<L>,
    motor: Switch<M>,
    delay: D,
}

impl<S, L, M, D> EnvironmentApp<S, L, M, D>
where
    S: Sensor<Readings = Ia1Reading>,
    L: OutputPin,
    M: OutputPin,
    D: DelayNs,
{
    /// `board` must already be initialised.
    pub fn new(board: S, light: L, motor: M, delay: D) -> Self {
        Self {
            board,
            light: Switch::new(light, "light"),
            motor: Switch::new(motor, "motor"),
            delay,
        }
    }

    /// Read the board once and apply the resulting output levels.
    pub async fn step(&mut self) -> Result<EnvironmentDecision, AppError> {
        let reading = self.board.read().await.map_err(|e| {
            error!("Environment: read failed: {}", e);
            e
        })?;

        let decision = EnvironmentDecision::from_reading(&reading);
        self.light.set(decision.light)?;
        self.motor.set(decision.motor)?;

        info!(
            "Environment: lux={} humidity={} temperature={} light={} motor={}",
            reading.lux,
            reading.humidity,
            reading.temperature,
            decision.light.label(),
            decision.motor.label()
        );
        Ok(decision)
    }

    pub async fn run(&mut self) -> Result<Infallible, AppError> {
        loop {
            self.step().await?;
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
        }
    }

    pub fn light(&self) -> Status {
        self.light.status()
    }

    pub fn motor(&self) -> Status {
        self.motor.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{DriverError, SensorError};
    use embassy_futures::block_on;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    fn reading(lux: f32, humidity: f32, temperature: f32) -> Ia1Reading {
        Ia1Reading {
            lux,
            humidity,
            temperature,
        }
    }

    /// Board stand-in returning a scripted result on every read.
    struct ScriptedBoard(Result<Ia1Reading, SensorError>);

    impl Sensor for ScriptedBoard {
        type Readings = Ia1Reading;

        async fn read(&mut self) -> Result<Ia1Reading, SensorError> {
            self.0
        }
    }

    #[test]
    fn test_light_threshold() {
        let decide = |lux| EnvironmentDecision::from_reading(&reading(lux, 50.0, 25.0)).light;
        assert_eq!(decide(19.0), Status::On);
        assert_eq!(decide(19.9), Status::On);
        assert_eq!(decide(20.0), Status::Off);
        assert_eq!(decide(250.0), Status::Off);
    }

    #[test]
    fn test_motor_threshold() {
        let decide = |h, t| EnvironmentDecision::from_reading(&reading(100.0, h, t)).motor;
        assert_eq!(decide(71.0, 25.0), Status::On);
        assert_eq!(decide(50.0, 36.0), Status::On);
        assert_eq!(decide(70.0, 35.0), Status::Off);
        // 70.9 and 35.9 truncate to the limits
        assert_eq!(decide(70.9, 35.9), Status::Off);
    }

    #[test]
    fn test_step_drives_outputs() {
        let mut light = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut motor = PinMock::new(&[PinTransaction::set(State::Low)]);

        let mut app = EnvironmentApp::new(
            ScriptedBoard(Ok(reading(10.0, 40.0, 22.0))),
            light.clone(),
            motor.clone(),
            NoopDelay::new(),
        );
        let decision = block_on(app.step()).unwrap();
        assert_eq!(
            decision,
            EnvironmentDecision {
                light: Status::On,
                motor: Status::Off,
            }
        );
        assert_eq!(app.light(), Status::On);
        assert_eq!(app.motor(), Status::Off);

        light.done();
        motor.done();
    }

    #[test]
    fn test_run_stops_on_read_failure() {
        let failure = SensorError::ReadFailed {
            sensor: "SHT30",
            operation: "fetch temperature/humidity",
            cause: DriverError::Bus(ErrorKind::Other),
        };
        let untouched: [PinTransaction; 0] = [];
        let mut light = PinMock::new(&untouched);
        let mut motor = PinMock::new(&untouched);

        let mut app = EnvironmentApp::new(
            ScriptedBoard(Err(failure)),
            light.clone(),
            motor.clone(),
            NoopDelay::new(),
        );
        let result = block_on(app.run());
        assert_eq!(result, Err(AppError::Sensor(failure)));

        light.done();
        motor.done();
    }
}
