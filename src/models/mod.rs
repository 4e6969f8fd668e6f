//! Domain models for flightdeck.
//!
//! # Core Concepts
//!
//! - [`Flight`]: a flight with its two-part manifest: the capacity-bounded
//!   seated list and the overbooked remainder.
//! - [`Passenger`]: a traveler on one reservation. Passengers sharing a
//!   reservation identifier form one travel party, the atomic unit of the
//!   seating decision.
//! - [`FlightCategory`]: the status tier (Black > Platinum > Gold > Normal)
//!   feeding a passenger's priority weight.
//!
//! Wire naming is camelCase throughout, mapped from the in-memory snake_case
//! fields at the serde boundary.

mod flight;
mod passenger;

pub use flight::*;
pub use passenger::*;
