//! Application loops for the example boards
//!
//! Each app owns its board and output switches and runs forever. A sensor
//! or output failure is logged where it happens and ends the loop with an
//! [`AppError`].

pub mod environment;
pub mod intrusion;
pub mod motion;

use thiserror_no_std::Error;

use crate::cloud::ReportError;
use crate::sensors::SensorError;
use crate::status::OutputError;

pub use environment::{EnvironmentApp, EnvironmentDecision};
pub use intrusion::{CloudContext, InfraredStatus, IntrusionApp};
pub use motion::{MotionApp, MotionDecision};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    Sensor(SensorError),
    #[error("{0}")]
    Output(OutputError),
    #[error("{0}")]
    Report(ReportError),
}

impl From<SensorError> for AppError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<OutputError> for AppError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}
