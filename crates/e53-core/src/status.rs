//! Two-valued digital outputs (LEDs, fill light, motor, buzzer)

use embedded_hal::digital::OutputPin;
use log::{debug, error};
use thiserror_no_std::Error;

/// On/off state applied to an output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Off,
    On,
}

impl Status {
    pub const fn from_bool(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }

    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("failed to drive output '{name}'")]
pub struct OutputError {
    pub name: &'static str,
}

/// A named output pin driven active-high.
///
/// The last applied status is remembered so loops can log transitions.
pub struct Switch<P> {
    pin: P,
    name: &'static str,
    status: Status,
}

impl<P: OutputPin> Switch<P> {
    pub fn new(pin: P, name: &'static str) -> Self {
        Self {
            pin,
            name,
            status: Status::Off,
        }
    }

    /// Drive the pin high for [`Status::On`], low for [`Status::Off`].
    pub fn set(&mut self, status: Status) -> Result<(), OutputError> {
        let result = match status {
            Status::On => self.pin.set_high(),
            Status::Off => self.pin.set_low(),
        };

        result.map_err(|e| {
            error!("Output {}: set {} failed: {:?}", self.name, status.label(), e);
            OutputError { name: self.name }
        })?;

        if self.status != status {
            debug!("Output {} -> {}", self.name, status.label());
        }
        self.status = status;
        Ok(())
    }

    pub fn status(&self) -> Status {
        self.status
    }
}
