//! E53_IA1 agriculture board: BH1750 light sensor and SHT30
//! temperature/humidity sensor sharing one I2C bus

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{debug, error, info};

use crate::config::environment;
use crate::sensors::{Bh1750, Sensor, SensorError, Sht30};

/// One poll of the agriculture board.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Ia1Reading {
    pub lux: f32,
    pub humidity: f32,
    pub temperature: f32,
}

/// Both chips are addressed through the same bus value; a driver is
/// created over `&mut I` for each operation.
pub struct E53Ia1<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> E53Ia1<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Power up the light sensor and start periodic acquisition on the SHT30.
    pub async fn init(&mut self) -> Result<(), SensorError> {
        Bh1750::new(&mut self.i2c).power_on().await.map_err(|cause| {
            error!("E53_IA1: BH1750 power on failed");
            SensorError::InitializationFailed {
                sensor: "BH1750",
                cause,
            }
        })?;

        Sht30::new(&mut self.i2c)
            .start_periodic()
            .await
            .map_err(|cause| {
                error!("E53_IA1: SHT30 periodic start failed");
                SensorError::InitializationFailed {
                    sensor: "SHT30",
                    cause,
                }
            })?;

        info!("E53_IA1 ready");
        Ok(())
    }
}

impl<I: I2c, D: DelayNs> Sensor for E53Ia1<I, D> {
    type Readings = Ia1Reading;

    async fn read(&mut self) -> Result<Ia1Reading, SensorError> {
        Bh1750::new(&mut self.i2c)
            .start_measurement()
            .await
            .map_err(|cause| SensorError::ReadFailed {
                sensor: "BH1750",
                operation: "start measurement",
                cause,
            })?;

        self.delay.delay_ms(environment::LIGHT_CONVERSION_MS).await;

        let lux = Bh1750::new(&mut self.i2c)
            .read_lux()
            .await
            .map_err(|cause| SensorError::ReadFailed {
                sensor: "BH1750",
                operation: "read illuminance",
                cause,
            })?;

        let climate = Sht30::new(&mut self.i2c)
            .fetch()
            .await
            .map_err(|cause| SensorError::ReadFailed {
                sensor: "SHT30",
                operation: "fetch temperature/humidity",
                cause,
            })?;

        debug!(
            "E53_IA1: lux={} humidity={} temperature={}",
            lux, climate.humidity, climate.temperature
        );

        Ok(Ia1Reading {
            lux,
            humidity: climate.humidity,
            temperature: climate.temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::address;
    use crate::sensors::DriverError;
    use crate::sensors::sht30::crc8;
    use embassy_futures::block_on;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;

    #[test]
    fn test_init_powers_both_chips() {
        let expectations = [
            I2cTransaction::write(address::BH1750, vec![0x01]),
            I2cTransaction::write(address::SHT30, vec![0x22, 0x36]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut board = E53Ia1::new(i2c.clone(), NoopDelay::new());
        block_on(board.init()).unwrap();
        i2c.done();
    }

    #[test]
    fn test_init_stops_at_first_failure() {
        let expectations =
            [I2cTransaction::write(address::BH1750, vec![0x01]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);

        let mut board = E53Ia1::new(i2c.clone(), NoopDelay::new());
        let result = block_on(board.init());
        assert_eq!(
            result,
            Err(SensorError::InitializationFailed {
                sensor: "BH1750",
                cause: DriverError::Bus(ErrorKind::Other),
            })
        );
        i2c.done();
    }

    #[test]
    fn test_read_combines_light_and_climate() {
        let t = [0x66, 0x66];
        let h = [0x80, 0x00];
        let expectations = [
            I2cTransaction::write(address::BH1750, vec![0x10]),
            I2cTransaction::read(address::BH1750, vec![0x00, 0x18]),
            I2cTransaction::write(address::SHT30, vec![0xE0, 0x00]),
            I2cTransaction::read(
                address::SHT30,
                vec![t[0], t[1], crc8(&t), h[0], h[1], crc8(&h)],
            ),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut board = E53Ia1::new(i2c.clone(), NoopDelay::new());
        let reading = block_on(board.read()).unwrap();
        assert!((reading.lux - 20.0).abs() < 1e-4);
        assert!((reading.humidity - 50.0).abs() < 0.01);
        assert!((reading.temperature - 25.0).abs() < 0.01);
        i2c.done();
    }
}
