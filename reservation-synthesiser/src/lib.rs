//! # Reservation synthesiser
//!
//! Fills a property with synthetic reservations so that every room type reaches a target
//! occupancy in expectation over a date range. Reservation counts are derived from the
//! available room-nights and the mean stay length, guests and stays are random, and the
//! reservations are written one at a time through [`pms_client`].

pub mod configuration;
pub mod generation;
pub mod orchestration;
pub mod parsing;
pub mod planning;
pub mod reservation;
pub mod writing;

pub use orchestration::{
    spawn_run, Orchestrator, ProgressEvent, RoomTypeResult, RunError, RunHandle, RunRequest,
    RunSummary,
};
pub use planning::RoomTypeConfig;
