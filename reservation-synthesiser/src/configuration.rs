// Fixed values used when synthesising reservations.
use std::time::Duration;

/// Throttling of reservation writes within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// The pause after every reservation of a room type except its last one.
    pub between_reservations: Duration,
}

impl Pacing {
    pub const BETWEEN_RESERVATIONS: Duration = Duration::from_millis(300);

    /// No pauses at all. Only sensible against a fake or local API.
    pub fn unthrottled() -> Self {
        Self {
            between_reservations: Duration::ZERO,
        }
    }

    /// A rough duration estimate for a run of `reservations` writes, ignoring the calls themselves.
    pub fn estimated_duration(&self, reservations: u64) -> Duration {
        self.between_reservations
            .saturating_mul(u32::try_from(reservations).unwrap_or(u32::MAX))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_reservations: Self::BETWEEN_RESERVATIONS,
        }
    }
}

/// Guest fields that are the same on every synthetic reservation.
pub struct GuestDefaults;

impl GuestDefaults {
    pub const COUNTRY: &'static str = "US";
    pub const ZIP: &'static str = "12345";
    pub const GENDER: &'static str = "M";
    pub const PAYMENT_METHOD: &'static str = "ebanking";
}
