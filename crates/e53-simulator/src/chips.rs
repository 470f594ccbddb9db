//! Simulated I2C chips behind one bus.
//!
//! Each chip answers at its real address and speaks just enough of its
//! protocol for the e53-core drivers: the MPU6050 is a register file with
//! an auto-incrementing pointer, the BH1750 and SHT30 are command
//! responders. Readings follow slow synthetic waveforms so the example
//! loops see their thresholds crossed.

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource};
use embedded_hal_async::i2c::{I2c, Operation, SevenBitAddress};
use log::{debug, trace, warn};

use e53_core::config::address;
use e53_core::sensors::mpu6050::registers::{
    ACCEL_XOUT_H, EXPECTED_IDENTITY, GYRO_XOUT_H, INT_MOTION, INT_STATUS, PWR_MGMT_1,
    PWR_MGMT_1_DEVICE_RESET, TEMP_OUT_H, WHO_AM_I,
};
use e53_core::sensors::sht30::crc8;

/// PWR_MGMT_1 after reset: SLEEP set.
const PWR_MGMT_1_RESET_VALUE: u8 = 0x40;
/// One g at the ±2 g default range.
const ONE_G: i16 = 16384;
/// Every n-th accelerometer sample the cover is lifted.
const LIFT_EVERY: u32 = 5;
const LIFT_OFFSET: i16 = 2000;

const BH1750_POWER_ON: u8 = 0x01;
const BH1750_CONTINUOUS_HIGH_RES: u8 = 0x10;
const SHT30_PERIODIC: [u8; 2] = [0x22, 0x36];
const SHT30_FETCH: [u8; 2] = [0xE0, 0x00];

struct Mpu6050Sim {
    registers: [u8; 128],
    pointer: u8,
    samples: u32,
}

impl Mpu6050Sim {
    fn new() -> Self {
        let mut chip = Self {
            registers: [0; 128],
            pointer: 0,
            samples: 0,
        };
        chip.power_on_reset();
        chip
    }

    fn power_on_reset(&mut self) {
        self.registers = [0; 128];
        self.registers[WHO_AM_I as usize] = EXPECTED_IDENTITY;
        self.registers[PWR_MGMT_1 as usize] = PWR_MGMT_1_RESET_VALUE;
    }

    fn write(&mut self, bytes: &[u8]) {
        let Some((&reg, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = reg;

        for &value in data {
            if self.pointer == PWR_MGMT_1 && value & PWR_MGMT_1_DEVICE_RESET != 0 {
                debug!("MPU6050 sim: device reset");
                self.power_on_reset();
            } else {
                self.registers[self.index()] = value;
            }
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        if self.pointer == ACCEL_XOUT_H {
            self.sample();
        }

        for byte in buf.iter_mut() {
            *byte = self.registers[self.index()];
            // INT_STATUS clears on read
            if self.pointer == INT_STATUS {
                self.registers[INT_STATUS as usize] = 0;
            }
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    /// Latch a fresh accelerometer, temperature and gyro sample.
    fn sample(&mut self) {
        self.samples += 1;
        let n = self.samples;
        let jitter = ((n * 7) % 21) as i16 - 10;
        let lifted = n % LIFT_EVERY == 0;

        let x = jitter + if lifted { LIFT_OFFSET } else { 0 };
        let accel = [x, -jitter, ONE_G + jitter];
        self.store_axes(ACCEL_XOUT_H, accel);

        // 25 °C as (raw + 13200) / 280 - 13
        let temperature: i16 = -2560;
        let [hi, lo] = temperature.to_be_bytes();
        self.registers[TEMP_OUT_H as usize] = hi;
        self.registers[TEMP_OUT_H as usize + 1] = lo;

        self.store_axes(GYRO_XOUT_H, [jitter, jitter / 2, -jitter]);

        if lifted {
            self.registers[INT_STATUS as usize] |= INT_MOTION;
        }
        trace!("MPU6050 sim: accel {:?}", accel);
    }

    fn store_axes(&mut self, first: u8, axes: [i16; 3]) {
        for (i, axis) in axes.iter().enumerate() {
            let [hi, lo] = axis.to_be_bytes();
            let at = first as usize + i * 2;
            self.registers[at] = hi;
            self.registers[at + 1] = lo;
        }
    }

    fn index(&self) -> usize {
        self.pointer as usize % self.registers.len()
    }
}

#[derive(Default)]
struct Bh1750Sim {
    powered: bool,
    measuring: bool,
    samples: u32,
}

impl Bh1750Sim {
    fn write(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        match bytes {
            [BH1750_POWER_ON] => self.powered = true,
            [BH1750_CONTINUOUS_HIGH_RES] if self.powered => self.measuring = true,
            other => {
                warn!("BH1750 sim: unexpected command {:02x?}", other);
                return Err(ErrorKind::Other);
            }
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), ErrorKind> {
        if !self.measuring || buf.len() != 2 {
            return Err(ErrorKind::Other);
        }
        self.samples += 1;
        // 0..60 lux over a 12 sample period
        let t = self.samples as f32 / 12.0 * core::f32::consts::TAU;
        let lux = 30.0 + 30.0 * t.sin();
        let raw = (lux * 1.2) as u16;
        buf.copy_from_slice(&raw.to_be_bytes());
        Ok(())
    }
}

#[derive(Default)]
struct Sht30Sim {
    periodic: bool,
    fetched: bool,
    samples: u32,
}

impl Sht30Sim {
    fn write(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        if bytes == SHT30_PERIODIC.as_slice() {
            self.periodic = true;
        } else if bytes == SHT30_FETCH.as_slice() && self.periodic {
            self.fetched = true;
        } else {
            warn!("SHT30 sim: unexpected command {:02x?}", bytes);
            return Err(ErrorKind::Other);
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), ErrorKind> {
        if !self.fetched || buf.len() != 6 {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }
        self.fetched = false;
        self.samples += 1;

        let t = self.samples as f32 / 20.0 * core::f32::consts::TAU;
        let temperature = 30.0 + 8.0 * t.sin();
        let humidity = 62.0 + 12.0 * (t * 0.5).cos();

        let raw_t = ((temperature + 45.0) / 175.0 * 65535.0) as u16;
        let raw_h = (humidity / 100.0 * 65535.0) as u16;
        for (chunk, raw) in buf.chunks_exact_mut(3).zip([raw_t, raw_h]) {
            let word = raw.to_be_bytes();
            chunk[..2].copy_from_slice(&word);
            chunk[2] = crc8(&word);
        }
        Ok(())
    }
}

/// The expansion board's I2C bus with every simulated chip attached.
pub struct SimulatedBus {
    mpu: Mpu6050Sim,
    light: Bh1750Sim,
    climate: Sht30Sim,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self {
            mpu: Mpu6050Sim::new(),
            light: Bh1750Sim::default(),
            climate: Sht30Sim::default(),
        }
    }

    fn write_to(&mut self, addr: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
        match addr {
            address::MPU6050 => {
                self.mpu.write(bytes);
                Ok(())
            }
            address::BH1750 => self.light.write(bytes),
            address::SHT30 => self.climate.write(bytes),
            _ => Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        }
    }

    fn read_from(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        match addr {
            address::MPU6050 => {
                self.mpu.read(buf);
                Ok(())
            }
            address::BH1750 => self.light.read(buf),
            address::SHT30 => self.climate.read(buf),
            _ => Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        }
    }
}

impl ErrorType for SimulatedBus {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for SimulatedBus {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.write_to(address, bytes)?,
                Operation::Read(buf) => self.read_from(address, buf)?,
            }
        }
        Ok(())
    }
}
