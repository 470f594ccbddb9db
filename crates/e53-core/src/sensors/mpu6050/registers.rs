//! MPU6050 register map and fixed configuration values

pub const CONFIG: u8 = 0x1A;
pub const ACCEL_CONFIG: u8 = 0x1C;
pub const FF_THR: u8 = 0x1D;
pub const FF_DUR: u8 = 0x1E;
pub const MOT_THR: u8 = 0x1F;
pub const MOT_DUR: u8 = 0x20;
pub const ZRMOT_THR: u8 = 0x21;
pub const ZRMOT_DUR: u8 = 0x22;
pub const FIFO_EN: u8 = 0x23;
pub const INT_PIN_CFG: u8 = 0x37;
pub const INT_ENABLE: u8 = 0x38;
pub const INT_STATUS: u8 = 0x3A;
pub const ACCEL_XOUT_H: u8 = 0x3B;
pub const TEMP_OUT_H: u8 = 0x41;
pub const GYRO_XOUT_H: u8 = 0x43;
pub const USER_CTRL: u8 = 0x6A;
pub const PWR_MGMT_1: u8 = 0x6B;
pub const WHO_AM_I: u8 = 0x75;

/// Value WHO_AM_I reports on a genuine part.
pub const EXPECTED_IDENTITY: u8 = 0x68;

/// PWR_MGMT_1 device reset bit.
pub const PWR_MGMT_1_DEVICE_RESET: u8 = 0x80;
/// PWR_MGMT_1 with sleep cleared and the internal oscillator selected.
pub const PWR_MGMT_1_WAKE: u8 = 0x00;

/// INT_STATUS / INT_ENABLE motion detection bit.
pub const INT_MOTION: u8 = 0x40;

/// INT_PIN_CFG: active-low interrupt level.
pub const INT_PIN_CFG_ACTIVE_LOW: u8 = 0x80;
/// INT_PIN_CFG: open-drain, latched, cleared on any read.
pub const INT_PIN_CFG_LATCHED: u8 = 0x1C;

/// CONFIG: DLPF at ~20 Hz, external sync disabled.
pub const CONFIG_DLPF_20HZ: u8 = 0x04;
/// ACCEL_CONFIG: ±16 g with the high-pass filter in hold mode.
pub const ACCEL_CONFIG_16G_HPF_HOLD: u8 = 0x1C;

/// Motion detection: threshold 3 LSB (2 mg each), 20 ms duration.
pub const MOTION_THRESHOLD: u8 = 0x03;
pub const MOTION_DURATION_MS: u8 = 0x14;
/// Free-fall detection: threshold 1 LSB, 1 ms duration.
pub const FREE_FALL_THRESHOLD: u8 = 0x01;
pub const FREE_FALL_DURATION_MS: u8 = 0x01;
/// Zero-motion detection: threshold 32 LSB, 32 × 64 ms duration.
pub const ZERO_MOTION_THRESHOLD: u8 = 0x20;
pub const ZERO_MOTION_DURATION: u8 = 0x20;

/// Size of the register-write scratch buffer, including the register byte.
pub const SCRATCH_LEN: usize = 256;
