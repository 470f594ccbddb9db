//! Hardware-independent core library for the E53 expansion-board examples
//!
//! This crate contains the platform-agnostic pieces of the example
//! applications: the register-level drivers for the chips on each E53 board,
//! the board wrappers that combine them, the polling/reporting loops, the
//! cloud property report model and the board configuration.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod apps;
pub mod boards;
pub mod cloud;
pub mod config;
pub mod sensors;
pub mod status;
