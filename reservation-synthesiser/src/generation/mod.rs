//! Random guests and stays for synthetic reservations.
//!
//! Every generator takes the random number generator as an argument so that a seeded
//! generator gives reproducible runs.

pub mod guest_generation;
pub mod stay_generation;

pub use guest_generation::{generate_guest, random_email, random_name, Guest};
pub use stay_generation::{random_stay_dates, StayDates, MAX_STAY_NIGHTS, MIN_STAY_NIGHTS};
