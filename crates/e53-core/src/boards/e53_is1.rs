//! E53_IS1 infrared board: pyroelectric trip input and buzzer
//!
//! The trip input pulls low when the sensor sees movement. The board's
//! watcher stands in for the GPIO interrupt handler: it waits for the
//! falling edge and raises a [`TripSignal`] that the reporting loop waits on.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::digital::Wait;
use log::{debug, error};

use crate::sensors::SensorError;

/// Binary event flag handed from the trip watcher to the reporting task.
///
/// Carries no payload; several trips before the task wakes collapse into one.
pub struct TripSignal {
    inner: Signal<CriticalSectionRawMutex, ()>,
}

impl TripSignal {
    pub const fn new() -> Self {
        Self {
            inner: Signal::new(),
        }
    }

    pub fn raise(&self) {
        self.inner.signal(());
    }

    /// Wait for the next trip and clear the flag.
    pub async fn wait(&self) {
        self.inner.wait().await;
    }

    pub fn is_raised(&self) -> bool {
        self.inner.signaled()
    }

    pub fn clear(&self) {
        self.inner.reset();
    }
}

impl Default for TripSignal {
    fn default() -> Self {
        Self::new()
    }
}

pub struct E53Is1<P> {
    trip_input: P,
}

impl<P: Wait> E53Is1<P> {
    pub fn new(trip_input: P) -> Self {
        Self { trip_input }
    }

    /// Raise `trip` on every falling edge of the trip input.
    ///
    /// Only returns if the input pin reports an error.
    pub async fn watch(&mut self, trip: &TripSignal) -> Result<Infallible, SensorError> {
        loop {
            self.trip_input.wait_for_falling_edge().await.map_err(|e| {
                error!("E53_IS1: waiting for trip edge failed: {:?}", e);
                SensorError::InputFailed { sensor: "E53_IS1" }
            })?;
            debug!("E53_IS1: trip");
            trip.raise();
        }
    }
}
