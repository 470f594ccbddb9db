//! E53 expansion boards: the chips on each board behind the [`Sensor`] trait
//!
//! [`Sensor`]: crate::sensors::Sensor

pub mod e53_ia1;
pub mod e53_is1;
pub mod e53_sc2;

pub use e53_ia1::{E53Ia1, Ia1Reading};
pub use e53_is1::{E53Is1, TripSignal};
pub use e53_sc2::{E53Sc2, Sc2Reading};
