//! Turning an occupancy target into a number of reservations.
//!
//! A room type with `units` rooms over `num_days` nights offers `num_days * units` room-nights.
//! Filling `percentage` of them with stays whose length is drawn from the generator's
//! distribution takes, in expectation, `target room-nights / mean stay length` reservations.
//! The realized occupancy varies around the target because stay lengths are random and stays
//! near the end of the range get clamped.

use serde::{Deserialize, Serialize};

/// The mean of the stay-length distribution used by
/// [`random_stay_dates`](crate::generation::random_stay_dates): uniform over 1..=7 nights.
/// The two must be changed together.
pub const AVERAGE_STAY_LENGTH: f64 = 4.0;

/// The occupancy target for one room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTypeConfig {
    #[serde(rename = "roomTypeID")]
    pub room_type_id: String,
    #[serde(rename = "roomTypeName")]
    pub room_type_name: String,
    #[serde(rename = "roomTypeUnits", default)]
    pub room_type_units: u32,
    /// The share of room-nights to fill, in percent.
    #[serde(default)]
    pub percentage: f64,
}

/// The figures behind a reservation count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyPlan {
    pub num_days: i64,
    pub room_units: u32,
    pub percentage: f64,
    pub available_room_nights: f64,
    pub target_room_nights: f64,
    pub reservations: u32,
}

impl OccupancyPlan {
    /// Returns `None` for a non-positive percentage, such room types get no reservations at all.
    /// Every other room type gets at least one reservation.
    pub fn new(num_days: i64, room_units: u32, percentage: f64) -> Option<Self> {
        if !(percentage > 0.0) {
            return None;
        }
        let available_room_nights = num_days as f64 * room_units as f64;
        let target_room_nights = available_room_nights * (percentage / 100.0);
        // Ties round to even. `as` saturates, so huge targets cannot wrap around.
        let reservations = (target_room_nights / AVERAGE_STAY_LENGTH)
            .round_ties_even()
            .max(1.0) as u32;
        Some(Self {
            num_days,
            room_units,
            percentage,
            available_room_nights,
            target_room_nights,
            reservations,
        })
    }

    /// The plan for a configured room type. A room type without any units has no room-nights to
    /// fill and is skipped like one without a percentage.
    pub fn for_room_type(num_days: i64, config: &RoomTypeConfig) -> Option<Self> {
        if config.room_type_units == 0 {
            return None;
        }
        Self::new(num_days, config.room_type_units, config.percentage)
    }

    pub fn target_rooms_per_night(&self) -> f64 {
        self.room_units as f64 * (self.percentage / 100.0)
    }

    /// The occupancy the planned reservations give if every stay has the average length.
    pub fn expected_occupancy(&self) -> f64 {
        if self.available_room_nights <= 0.0 {
            return 0.0;
        }
        self.reservations as f64 * AVERAGE_STAY_LENGTH / self.available_room_nights * 100.0
    }

    pub fn expected_rooms_per_night(&self) -> f64 {
        if self.num_days <= 0 {
            return 0.0;
        }
        self.reservations as f64 * AVERAGE_STAY_LENGTH / self.num_days as f64
    }
}

/// The number of reservations to create for a room type, `None` if it is skipped.
pub fn reservation_count(num_days: i64, room_units: u32, percentage: f64) -> Option<u32> {
    OccupancyPlan::new(num_days, room_units, percentage).map(|plan| plan.reservations)
}

/// The number of reservations a whole run will attempt.
pub fn expected_total(num_days: i64, configs: &[RoomTypeConfig]) -> u64 {
    configs
        .iter()
        .filter_map(|config| OccupancyPlan::for_room_type(num_days, config))
        .map(|plan| plan.reservations as u64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{MAX_STAY_NIGHTS, MIN_STAY_NIGHTS};

    fn config(units: u32, percentage: f64) -> RoomTypeConfig {
        RoomTypeConfig {
            room_type_id: "1".to_string(),
            room_type_name: "Double".to_string(),
            room_type_units: units,
            percentage,
        }
    }

    #[test]
    fn average_matches_the_stay_length_distribution() {
        let lengths = MIN_STAY_NIGHTS..=MAX_STAY_NIGHTS;
        let count = lengths.clone().count() as f64;
        let mean = lengths.sum::<i64>() as f64 / count;
        assert_eq!(AVERAGE_STAY_LENGTH, mean);
    }

    #[test]
    fn hundred_rooms_half_full_for_a_week() {
        let plan = OccupancyPlan::new(7, 100, 50.0).unwrap();
        assert_eq!(700.0, plan.available_room_nights);
        assert_eq!(350.0, plan.target_room_nights);
        assert_eq!(88, plan.reservations);
        assert_eq!(50.0, plan.target_rooms_per_night());
        assert!((plan.expected_occupancy() - 50.285).abs() < 0.01);
    }

    #[test]
    fn non_positive_percentages_are_skipped() {
        assert_eq!(None, reservation_count(7, 100, 0.0));
        assert_eq!(None, reservation_count(7, 100, -5.0));
        assert_eq!(None, reservation_count(7, 100, f64::NAN));
    }

    #[test]
    fn positive_percentages_always_get_one_reservation() {
        assert_eq!(Some(1), reservation_count(7, 0, 50.0));
        assert_eq!(Some(1), reservation_count(0, 100, 50.0));
        assert_eq!(Some(1), reservation_count(1, 1, 0.01));
    }

    #[test]
    fn matches_the_closed_form() {
        for num_days in [1i64, 7, 30, 90] {
            for units in [1u32, 3, 17, 100] {
                for percentage in [1.0, 12.5, 50.0, 99.9, 100.0] {
                    let exact = num_days as f64 * units as f64 * (percentage / 100.0) / 4.0;
                    let expected = exact.round_ties_even().max(1.0) as u32;
                    assert_eq!(Some(expected), reservation_count(num_days, units, percentage));
                }
            }
        }
    }

    #[test]
    fn halves_round_to_even() {
        // 10 room-nights / 4 = 2.5
        assert_eq!(Some(2), reservation_count(10, 1, 100.0));
        // 14 room-nights / 4 = 3.5
        assert_eq!(Some(4), reservation_count(14, 1, 100.0));
    }

    #[test]
    fn room_types_without_units_are_skipped() {
        assert_eq!(None, OccupancyPlan::for_room_type(7, &config(0, 50.0)));
        assert_eq!(
            Some(88),
            OccupancyPlan::for_room_type(7, &config(100, 50.0)).map(|plan| plan.reservations)
        );
    }

    #[test]
    fn expected_total_ignores_skipped_room_types() {
        let configs = vec![config(100, 50.0), config(10, 0.0), config(0, 20.0)];
        assert_eq!(88, expected_total(7, &configs));
    }
}
