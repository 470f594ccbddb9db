//! MPU6050 6-axis accelerometer/gyroscope driver
//!
//! A thin fixed-sequence protocol over an async I2C bus: register writes
//! are framed register-address-first, register reads are a combined
//! write-then-read. Multi-byte values are big-endian register pairs.
//!
//! The device moves through [`DeviceState`] as [`Mpu6050::init`] runs:
//! a reset pulse on PWR_MGMT_1, the fixed interrupt/filter/range
//! configuration, then the WHO_AM_I identity check. Reads are only
//! meaningful once the driver is [`DeviceState::Ready`].

pub mod registers;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{Error as _, I2c};
use log::{debug, error, info};

use super::DriverError;
use crate::config::{address, motion};
use registers::*;

/// Lifecycle of the chip as seen by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Uninitialized,
    Reset,
    Configured,
    Ready,
}

/// Raw signed readings of the three axes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AxisReading {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AxisReading {
    pub const fn to_array(self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }
}

/// Assemble three big-endian register pairs into signed axis values.
pub const fn axes_from_bytes(buf: &[u8; 6]) -> AxisReading {
    AxisReading {
        x: i16::from_be_bytes([buf[0], buf[1]]),
        y: i16::from_be_bytes([buf[2], buf[3]]),
        z: i16::from_be_bytes([buf[4], buf[5]]),
    }
}

/// Convert a raw TEMP_OUT register pair to degrees Celsius.
pub fn temperature_from_raw(raw: i16) -> f32 {
    (raw as f32 + 13200.0) / 280.0 - 13.0
}

pub struct Mpu6050<I, D> {
    i2c: I,
    delay: D,
    state: DeviceState,
}

impl<I: I2c, D: DelayNs> Mpu6050<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            i2c,
            delay,
            state: DeviceState::Uninitialized,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Write one byte to `reg`.
    pub async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), DriverError> {
        self.i2c
            .write(address::MPU6050, &[reg, value])
            .await
            .map_err(|e| {
                error!("MPU6050: I2C write to {:#04x} failed: {:?}", reg, e);
                DriverError::Bus(e.kind())
            })
    }

    /// Write `data` to consecutive registers starting at `reg`.
    ///
    /// The frame is assembled in a fixed scratch buffer, so at most
    /// `SCRATCH_LEN - 1` payload bytes fit.
    pub async fn write_buffer(&mut self, reg: u8, data: &[u8]) -> Result<(), DriverError> {
        if data.len() >= SCRATCH_LEN {
            error!(
                "MPU6050: {} byte payload for {:#04x} exceeds scratch buffer",
                data.len(),
                reg
            );
            return Err(DriverError::BufferTooLong {
                len: data.len(),
                max: SCRATCH_LEN - 1,
            });
        }

        let mut frame = [0u8; SCRATCH_LEN];
        frame[0] = reg;
        frame[1..=data.len()].copy_from_slice(data);

        self.i2c
            .write(address::MPU6050, &frame[..=data.len()])
            .await
            .map_err(|e| {
                error!("MPU6050: I2C buffer write to {:#04x} failed: {:?}", reg, e);
                DriverError::Bus(e.kind())
            })
    }

    /// Read `buf.len()` bytes starting at `reg`.
    pub async fn read_buffer(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), DriverError> {
        self.i2c
            .write_read(address::MPU6050, &[reg], buf)
            .await
            .map_err(|e| {
                error!("MPU6050: I2C write-read of {:#04x} failed: {:?}", reg, e);
                DriverError::Bus(e.kind())
            })
    }

    /// Pulse the device reset bit and wake the chip.
    pub async fn reset(&mut self) -> Result<(), DriverError> {
        self.write_register(PWR_MGMT_1, PWR_MGMT_1_DEVICE_RESET).await?;
        self.delay.delay_ms(motion::RESET_DELAY_MS).await;
        self.write_register(PWR_MGMT_1, PWR_MGMT_1_WAKE).await?;
        self.state = DeviceState::Reset;
        Ok(())
    }

    /// Apply the fixed interrupt, filter and range configuration.
    pub async fn configure(&mut self) -> Result<(), DriverError> {
        self.write_register(INT_ENABLE, 0x00).await?;
        self.write_register(USER_CTRL, 0x00).await?;
        self.write_register(FIFO_EN, 0x00).await?;
        self.write_register(INT_PIN_CFG, INT_PIN_CFG_ACTIVE_LOW).await?;
        self.enable_motion_interrupt().await?;
        self.write_register(CONFIG, CONFIG_DLPF_20HZ).await?;
        self.write_register(ACCEL_CONFIG, ACCEL_CONFIG_16G_HPF_HOLD).await?;
        self.write_register(INT_PIN_CFG, INT_PIN_CFG_LATCHED).await?;
        self.write_register(INT_ENABLE, INT_MOTION).await?;
        self.state = DeviceState::Configured;
        Ok(())
    }

    pub async fn enable_motion_interrupt(&mut self) -> Result<(), DriverError> {
        self.write_register(MOT_THR, MOTION_THRESHOLD).await?;
        self.write_register(MOT_DUR, MOTION_DURATION_MS).await
    }

    pub async fn enable_free_fall_interrupt(&mut self) -> Result<(), DriverError> {
        self.write_register(FF_THR, FREE_FALL_THRESHOLD).await?;
        self.write_register(FF_DUR, FREE_FALL_DURATION_MS).await
    }

    pub async fn enable_zero_motion_interrupt(&mut self) -> Result<(), DriverError> {
        self.write_register(ZRMOT_THR, ZERO_MOTION_THRESHOLD).await?;
        self.write_register(ZRMOT_DUR, ZERO_MOTION_DURATION).await
    }

    pub async fn read_identity(&mut self) -> Result<u8, DriverError> {
        let mut id = [0u8; 1];
        self.read_buffer(WHO_AM_I, &mut id).await?;
        Ok(id[0])
    }

    /// Compare WHO_AM_I against the expected identity.
    pub async fn check_identity(&mut self) -> Result<(), DriverError> {
        let found = self.read_identity().await?;
        if found != EXPECTED_IDENTITY {
            error!("MPU6050: detected identity {:#04x}, expected {:#04x}", found, EXPECTED_IDENTITY);
            return Err(DriverError::UnexpectedIdentity {
                expected: EXPECTED_IDENTITY,
                found,
            });
        }
        Ok(())
    }

    /// Reset, configure and identify the chip.
    ///
    /// Any failure aborts the sequence and leaves the driver in the last
    /// state it reached.
    pub async fn init(&mut self) -> Result<(), DriverError> {
        self.state = DeviceState::Uninitialized;
        self.reset().await?;
        self.configure().await?;
        self.check_identity().await?;
        self.state = DeviceState::Ready;
        info!("MPU6050: ready");
        Ok(())
    }

    pub async fn read_accel(&mut self) -> Result<AxisReading, DriverError> {
        let mut buf = [0u8; 6];
        self.read_buffer(ACCEL_XOUT_H, &mut buf).await?;
        Ok(axes_from_bytes(&buf))
    }

    pub async fn read_gyro(&mut self) -> Result<AxisReading, DriverError> {
        let mut buf = [0u8; 6];
        self.read_buffer(GYRO_XOUT_H, &mut buf).await?;
        Ok(axes_from_bytes(&buf))
    }

    pub async fn read_raw_temperature(&mut self) -> Result<i16, DriverError> {
        let mut buf = [0u8; 2];
        self.read_buffer(TEMP_OUT_H, &mut buf).await?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Die temperature in degrees Celsius.
    pub async fn read_temperature(&mut self) -> Result<f32, DriverError> {
        let raw = self.read_raw_temperature().await?;
        let celsius = temperature_from_raw(raw);
        debug!("MPU6050: raw temperature {} -> {} C", raw, celsius);
        Ok(celsius)
    }

    /// INT_STATUS; reading it clears latched interrupts.
    pub async fn read_interrupt_status(&mut self) -> Result<u8, DriverError> {
        let mut status = [0u8; 1];
        self.read_buffer(INT_STATUS, &mut status).await?;
        Ok(status[0])
    }

    pub async fn motion_detected(&mut self) -> Result<bool, DriverError> {
        Ok(self.read_interrupt_status().await? & INT_MOTION != 0)
    }

    pub async fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::RefCell;
    use embassy_futures::block_on;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_async::i2c::Operation;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = address::MPU6050;

    /// Bus and delay activity in the order the driver issued it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Write(u8, u8),
        Read(u8),
        Delay(u32),
    }

    /// Forwards to the mock bus and appends every register access to `log`.
    struct LoggedBus<'a> {
        inner: I2cMock,
        log: &'a RefCell<Vec<Event>>,
    }

    impl embedded_hal::i2c::ErrorType for LoggedBus<'_> {
        type Error = ErrorKind;
    }

    impl I2c for LoggedBus<'_> {
        async fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
            if let [reg, value] = bytes {
                self.log.borrow_mut().push(Event::Write(*reg, *value));
            }
            self.inner.write(address, bytes).await
        }

        async fn write_read(
            &mut self,
            address: u8,
            bytes: &[u8],
            buffer: &mut [u8],
        ) -> Result<(), ErrorKind> {
            if let [reg] = bytes {
                self.log.borrow_mut().push(Event::Read(*reg));
            }
            self.inner.write_read(address, bytes, buffer).await
        }

        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            self.inner.transaction(address, operations).await
        }
    }

    /// Delay provider that appends every requested wait to `log`.
    struct LoggedDelay<'a> {
        log: &'a RefCell<Vec<Event>>,
    }

    impl DelayNs for LoggedDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(Event::Delay(ns));
        }
    }

    fn write(reg: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write(ADDR, vec![reg, value])
    }

    fn reset_and_configure() -> Vec<I2cTransaction> {
        vec![
            write(PWR_MGMT_1, 0x80),
            write(PWR_MGMT_1, 0x00),
            write(INT_ENABLE, 0x00),
            write(USER_CTRL, 0x00),
            write(FIFO_EN, 0x00),
            write(INT_PIN_CFG, 0x80),
            write(MOT_THR, 0x03),
            write(MOT_DUR, 0x14),
            write(CONFIG, 0x04),
            write(ACCEL_CONFIG, 0x1C),
            write(INT_PIN_CFG, 0x1C),
            write(INT_ENABLE, 0x40),
        ]
    }

    #[test]
    fn test_temperature_conversion_at_zero() {
        let expected = (0.0 + 13200.0) / 280.0 - 13.0;
        assert!((temperature_from_raw(0) - expected).abs() < 1e-5);
        assert!((temperature_from_raw(0) - 34.142_857).abs() < 1e-4);
    }

    #[test]
    fn test_temperature_conversion_negative_raw() {
        // -13200 is the raw value for -13 C
        assert!((temperature_from_raw(-13200) + 13.0).abs() < 1e-5);
    }

    #[test]
    fn test_axis_assembly() {
        let axes = axes_from_bytes(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(axes.x, 0x0102);
        assert_eq!(axes.y, 0x0304);
        assert_eq!(axes.z, 0x0506);
    }

    #[test]
    fn test_axis_assembly_is_signed() {
        let axes = axes_from_bytes(&[0xFF, 0xFF, 0x80, 0x00, 0x7F, 0xFF]);
        assert_eq!(axes.to_array(), [-1, i16::MIN, i16::MAX]);
    }

    #[test]
    fn test_init_succeeds_on_expected_identity() {
        let mut expectations = reset_and_configure();
        expectations.push(I2cTransaction::write_read(ADDR, vec![WHO_AM_I], vec![0x68]));
        let mut i2c = I2cMock::new(&expectations);
        let log = RefCell::new(Vec::new());

        let bus = LoggedBus {
            inner: i2c.clone(),
            log: &log,
        };
        let mut mpu = Mpu6050::new(bus, LoggedDelay { log: &log });
        block_on(mpu.init()).unwrap();
        assert_eq!(mpu.state(), DeviceState::Ready);

        // The reset pulse brackets the only wait, ahead of any configuration.
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Write(PWR_MGMT_1, 0x80),
                Event::Delay(20_000_000),
                Event::Write(PWR_MGMT_1, 0x00),
                Event::Write(INT_ENABLE, 0x00),
                Event::Write(USER_CTRL, 0x00),
                Event::Write(FIFO_EN, 0x00),
                Event::Write(INT_PIN_CFG, 0x80),
                Event::Write(MOT_THR, 0x03),
                Event::Write(MOT_DUR, 0x14),
                Event::Write(CONFIG, 0x04),
                Event::Write(ACCEL_CONFIG, 0x1C),
                Event::Write(INT_PIN_CFG, 0x1C),
                Event::Write(INT_ENABLE, 0x40),
                Event::Read(WHO_AM_I),
            ]
        );
        i2c.done();
    }

    #[test]
    fn test_init_fails_on_wrong_identity() {
        let mut expectations = reset_and_configure();
        expectations.push(I2cTransaction::write_read(ADDR, vec![WHO_AM_I], vec![0x70]));
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        let result = block_on(mpu.init());
        assert_eq!(
            result,
            Err(DriverError::UnexpectedIdentity {
                expected: 0x68,
                found: 0x70
            })
        );
        assert_ne!(mpu.state(), DeviceState::Ready);
        i2c.done();
    }

    #[test]
    fn test_reset_failure_aborts_before_configuration() {
        let expectations = [write(PWR_MGMT_1, 0x80).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        let result = block_on(mpu.init());
        assert_eq!(result, Err(DriverError::Bus(ErrorKind::Other)));
        assert_eq!(mpu.state(), DeviceState::Uninitialized);
        i2c.done();
    }

    #[test]
    fn test_read_accel_reads_six_bytes_in_one_transaction() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            vec![ACCEL_XOUT_H],
            vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
        )];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        let accel = block_on(mpu.read_accel()).unwrap();
        assert_eq!(accel, AxisReading { x: 0x0102, y: 0x0304, z: 0x0506 });
        i2c.done();
    }

    #[test]
    fn test_read_gyro_uses_gyro_registers() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            vec![GYRO_XOUT_H],
            vec![0x00, 0x10, 0xFF, 0xF0, 0x00, 0x00],
        )];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        let gyro = block_on(mpu.read_gyro()).unwrap();
        assert_eq!(gyro.to_array(), [16, -16, 0]);
        i2c.done();
    }

    #[test]
    fn test_read_temperature_converts_raw_pair() {
        let expectations = [I2cTransaction::write_read(ADDR, vec![TEMP_OUT_H], vec![0x00, 0x00])];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        let celsius = block_on(mpu.read_temperature()).unwrap();
        assert!((celsius - temperature_from_raw(0)).abs() < 1e-6);
        i2c.done();
    }

    #[test]
    fn test_read_failure_is_reported() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![ACCEL_XOUT_H], vec![0; 6])
                .with_error(ErrorKind::NoAcknowledge(
                    embedded_hal::i2c::NoAcknowledgeSource::Address,
                )),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        let result = block_on(mpu.read_accel());
        assert!(matches!(result, Err(DriverError::Bus(ErrorKind::NoAcknowledge(_)))));
        i2c.done();
    }

    #[test]
    fn test_write_buffer_frames_register_first() {
        let expectations = [I2cTransaction::write(ADDR, vec![MOT_THR, 0x03, 0x14])];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        block_on(mpu.write_buffer(MOT_THR, &[0x03, 0x14])).unwrap();
        i2c.done();
    }

    #[test]
    fn test_write_buffer_rejects_oversized_payload() {
        let expectations: [I2cTransaction; 0] = [];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        let payload = [0u8; SCRATCH_LEN];
        let result = block_on(mpu.write_buffer(MOT_THR, &payload));
        assert_eq!(
            result,
            Err(DriverError::BufferTooLong {
                len: SCRATCH_LEN,
                max: SCRATCH_LEN - 1
            })
        );
        i2c.done();
    }

    #[test]
    fn test_motion_detected_checks_motion_bit() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![INT_STATUS], vec![0x41]),
            I2cTransaction::write_read(ADDR, vec![INT_STATUS], vec![0x01]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        assert!(block_on(mpu.motion_detected()).unwrap());
        assert!(!block_on(mpu.motion_detected()).unwrap());
        i2c.done();
    }

    #[test]
    fn test_interrupt_presets() {
        let expectations = [
            write(FF_THR, 0x01),
            write(FF_DUR, 0x01),
            write(ZRMOT_THR, 0x20),
            write(ZRMOT_DUR, 0x20),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut mpu = Mpu6050::new(i2c.clone(), NoopDelay::new());
        block_on(mpu.enable_free_fall_interrupt()).unwrap();
        block_on(mpu.enable_zero_motion_interrupt()).unwrap();
        i2c.done();
    }
}
