//! Platform interfaces consumed by the engine.
//!
//! The engine never reads a wall clock or an entropy source directly. It is
//! handed a [`TickSource`] and a [`RandomSource`] at construction, which lets
//! tests drive capability expiry and key generation deterministically.

mod clock;
mod random;

pub use clock::{ManualClock, MonotonicClock, TickSource};
pub use random::{OsRandom, RandomSource};
