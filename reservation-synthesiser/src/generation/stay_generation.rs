use chrono::{Duration, NaiveDate};
use rand::Rng;

/// Stay lengths are drawn uniformly from `MIN_STAY_NIGHTS..=MAX_STAY_NIGHTS`.
/// `planning::AVERAGE_STAY_LENGTH` has to stay equal to the mean of this distribution.
pub const MIN_STAY_NIGHTS: i64 = 1;
pub const MAX_STAY_NIGHTS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayDates {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    /// The realized number of nights, after any clamping to the range.
    pub stay_length: u32,
}

/// Draws a stay of 1 to 7 nights that lies within `range_start..=range_end`.
///
/// The stay length is drawn first and the check-in is then drawn uniformly among the dates that
/// leave room for it. When the range is too short for the drawn length the guest checks in on
/// `range_start` and the stay is shortened to fit (an empty range still asks for one night, which
/// the final clamp turns into zero).
pub fn random_stay_dates<T: Rng>(range_start: NaiveDate, range_end: NaiveDate, rng: &mut T) -> StayDates {
    let mut stay_length = rng.gen_range(MIN_STAY_NIGHTS..=MAX_STAY_NIGHTS);
    let latest_checkin = range_end - Duration::days(stay_length);

    let checkin = if range_start > latest_checkin {
        let max_possible_stay = (range_end - range_start).num_days();
        stay_length = if max_possible_stay > 0 {
            stay_length.min(max_possible_stay)
        } else {
            1
        };
        range_start
    } else {
        let latest_offset = (latest_checkin - range_start).num_days();
        range_start + Duration::days(rng.gen_range(0..=latest_offset))
    };

    let mut checkout = checkin + Duration::days(stay_length);
    if checkout > range_end {
        checkout = range_end;
        stay_length = (checkout - checkin).num_days();
    }

    StayDates {
        checkin,
        checkout,
        stay_length: u32::try_from(stay_length).unwrap_or(0),
    }
}
