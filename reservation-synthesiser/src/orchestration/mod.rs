//! Runs that create the synthetic reservations for a set of room types.
//!
//! A run validates its input, resolves the source identifier once, then works through the room
//! types one after another. Each reservation is generated, sent and recorded before the next one
//! starts. A failed reservation is recorded in its room type's result and the run moves on, only
//! invalid input or a missing source identifier end a run early.

pub mod job;
mod progress;

use std::{
    panic::{self, AssertUnwindSafe},
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use common_utils::date_utils::{format_ymd, DateError, DateRange};
use pms_client::{
    resolve_source_id, ApiClient, ApiEndpoints, ApiError, Credentials, ReqwestTransport,
    SourceCache, Transport,
};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use crate::{
    configuration::Pacing,
    generation::{self, guest_generation::random_third_party_identifier},
    planning::{self, OccupancyPlan, RoomTypeConfig},
    reservation::ReservationRequest,
};

pub use job::{spawn_run, RunHandle};
pub use progress::{NoProgress, ProgressEvent, ProgressSink};

/// Why a run ended before creating any reservation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("Access token not configured")]
    MissingAccessToken,
    #[error("Start date and end date are required")]
    MissingDates,
    #[error("invalid date range: {0}")]
    InvalidDates(#[from] DateError),
    #[error("CRITICAL: No source ID available! Cannot create reservations.")]
    NoSourceId,
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// The input of a run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub credentials: Credentials,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub room_type_configs: Vec<RoomTypeConfig>,
}

/// What happened to the reservations of one room type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomTypeResult {
    #[serde(rename = "roomTypeID")]
    pub room_type_id: String,
    #[serde(rename = "roomTypeName")]
    pub room_type_name: String,
    pub requested: u32,
    pub created: u32,
    pub errors: Vec<String>,
    pub stay_lengths: Vec<u32>,
}

impl RoomTypeResult {
    fn new(config: &RoomTypeConfig, requested: u32) -> Self {
        Self {
            room_type_id: config.room_type_id.clone(),
            room_type_name: config.room_type_name.clone(),
            requested,
            created: 0,
            errors: Vec::new(),
            stay_lengths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RunSummary {
    pub results: Vec<RoomTypeResult>,
    pub total_created: u64,
    pub total_errors: u64,
    /// Set when the run was cancelled, `results` then only covers the work done so far.
    pub cancelled: bool,
}

// A reservation that was accepted upstream.
struct CreatedReservation {
    stay_length: u32,
    reservation_id: Option<String>,
}

pub struct Orchestrator<T = ReqwestTransport> {
    client: ApiClient<T>,
    endpoints: ApiEndpoints,
    source_cache: SourceCache,
    pacing: Pacing,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(client: ApiClient<T>, endpoints: ApiEndpoints) -> Self {
        Self {
            client,
            endpoints,
            source_cache: SourceCache::new(),
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// The source identifier, once some run has resolved it.
    pub fn cached_source_id(&self) -> Option<&str> {
        self.source_cache.get()
    }

    /// Creates the reservations for every room type with a positive percentage and blocks until done.
    pub fn create_reservations<R: Rng>(
        &self,
        request: &RunRequest,
        rng: &mut R,
    ) -> Result<RunSummary, RunError> {
        self.run(request, rng, &NoProgress, &AtomicBool::new(false))
    }

    /// Like [`Self::create_reservations`], reporting progress to `progress` and stopping before
    /// the next reservation once `cancel` is set. A panic inside the run is turned into
    /// [`RunError::Unexpected`].
    pub fn run<R: Rng>(
        &self,
        request: &RunRequest,
        rng: &mut R,
        progress: &dyn ProgressSink,
        cancel: &AtomicBool,
    ) -> Result<RunSummary, RunError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.execute(request, rng, progress, cancel)))
            .unwrap_or_else(|payload| {
                let reason = panic_message(payload.as_ref());
                error!(%reason, "reservation run aborted");
                Err(RunError::Unexpected(reason))
            })
    }

    fn execute<R: Rng>(
        &self,
        request: &RunRequest,
        rng: &mut R,
        progress: &dyn ProgressSink,
        cancel: &AtomicBool,
    ) -> Result<RunSummary, RunError> {
        let credentials = &request.credentials;
        if !credentials.has_access_token() {
            return Err(RunError::MissingAccessToken);
        }
        let range = validated_range(request.start_date.as_deref(), request.end_date.as_deref())?;

        let source_id =
            resolve_source_id(&self.source_cache, &self.client, &self.endpoints, credentials);
        if source_id.is_empty() {
            error!("{}", RunError::NoSourceId);
            return Err(RunError::NoSourceId);
        }
        info!(source_id, "using source for all reservations");

        let num_days = range.num_days();
        let expected_total = planning::expected_total(num_days, &request.room_type_configs);
        info!(
            date_range = %range,
            num_days,
            room_types = request.room_type_configs.len(),
            expected_total,
            estimated_seconds = self.pacing.estimated_duration(expected_total).as_secs(),
            "starting reservation run"
        );

        let mut summary = RunSummary::default();
        for config in &request.room_type_configs {
            let plan = match OccupancyPlan::for_room_type(num_days, config) {
                Some(plan) => plan,
                None => {
                    debug!(room_type = %config.room_type_name, "no occupancy requested, skipping");
                    continue;
                }
            };
            log_plan(config, &plan);
            progress.report(ProgressEvent::Planned {
                room_type_name: config.room_type_name.clone(),
                reservations: plan.reservations,
            });

            let span = info_span!("room_type", name = %config.room_type_name);
            let _entered = span.enter();
            let mut room_result = RoomTypeResult::new(config, plan.reservations);
            for index in 1..=plan.reservations {
                if cancel.load(Ordering::Relaxed) {
                    summary.cancelled = true;
                    break;
                }
                let outcome = self.create_one(credentials, config, range, source_id, rng);
                match &outcome {
                    Ok(created) => {
                        info!(
                            index,
                            of = plan.reservations,
                            reservation_id = created.reservation_id.as_deref().unwrap_or("N/A"),
                            stay_length = created.stay_length,
                            total_created = summary.total_created + 1,
                            "reservation created"
                        );
                        room_result.created += 1;
                        room_result.stay_lengths.push(created.stay_length);
                        summary.total_created += 1;
                    }
                    Err(e) => {
                        let message = format!("Reservation {}: {}", index, e);
                        warn!(error = %message, "reservation failed");
                        room_result.errors.push(message);
                        summary.total_errors += 1;
                    }
                }
                progress.report(ProgressEvent::ReservationCompleted {
                    room_type_name: config.room_type_name.clone(),
                    index,
                    of: plan.reservations,
                    completed: summary.total_created + summary.total_errors,
                    expected_total,
                    succeeded: outcome.is_ok(),
                });
                if index < plan.reservations {
                    thread::sleep(self.pacing.between_reservations);
                }
            }
            progress.report(ProgressEvent::RoomTypeFinished {
                room_type_name: config.room_type_name.clone(),
                created: room_result.created,
                requested: room_result.requested,
            });
            summary.results.push(room_result);
            if summary.cancelled {
                warn!("run cancelled, remaining reservations are not created");
                break;
            }
        }
        Ok(summary)
    }

    fn create_one<R: Rng>(
        &self,
        credentials: &Credentials,
        config: &RoomTypeConfig,
        range: DateRange,
        source_id: &str,
        rng: &mut R,
    ) -> Result<CreatedReservation, ApiError> {
        let guest = generation::generate_guest(rng);
        let stay = generation::random_stay_dates(range.start(), range.end(), rng);
        debug!(
            guest = %format!("{} {}", guest.first_name, guest.last_name),
            checkin = %format_ymd(stay.checkin),
            checkout = %format_ymd(stay.checkout),
            stay_length = stay.stay_length,
            "creating reservation"
        );
        let request = ReservationRequest {
            property_id: credentials.property_id().to_string(),
            start_date: stay.checkin,
            end_date: stay.checkout,
            guest,
            source_id: source_id.to_string(),
            third_party_identifier: random_third_party_identifier(rng),
            room_type_id: config.room_type_id.clone(),
        };
        let response = self.client.post_form(
            &self.endpoints.post_reservation_url(),
            request.into_form_fields(),
            credentials,
        )?;
        let reservation_id = response
            .get("reservationID")
            .and_then(|id| match id {
                serde_json::Value::String(id) => Some(id.clone()),
                serde_json::Value::Number(id) => Some(id.to_string()),
                _ => None,
            });
        Ok(CreatedReservation {
            stay_length: stay.stay_length,
            reservation_id,
        })
    }
}

fn validated_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, RunError> {
    match (present(start), present(end)) {
        (Some(start), Some(end)) => Ok(DateRange::parse(start, end)?),
        _ => Err(RunError::MissingDates),
    }
}

fn present(date: Option<&str>) -> Option<&str> {
    date.map(str::trim).filter(|date| !date.is_empty())
}

fn log_plan(config: &RoomTypeConfig, plan: &OccupancyPlan) {
    info!(
        room_type = %config.room_type_name,
        room_units = plan.room_units,
        num_days = plan.num_days,
        available_room_nights = plan.available_room_nights,
        target_percentage = plan.percentage,
        target_rooms_per_night = %format!("{:.1}", plan.target_rooms_per_night()),
        target_room_nights = %format!("{:.1}", plan.target_room_nights),
        average_stay_length = planning::AVERAGE_STAY_LENGTH,
        reservations = plan.reservations,
        expected_rooms_per_night = %format!("{:.1}", plan.expected_rooms_per_night()),
        expected_occupancy = %format!("{:.1}%", plan.expected_occupancy()),
        "planned reservations"
    );
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "the run panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_dates_are_required() {
        assert_eq!(Err(RunError::MissingDates), validated_range(None, Some("2024-01-08")));
        assert_eq!(Err(RunError::MissingDates), validated_range(Some("2024-01-01"), Some("")));
        assert_eq!(
            7,
            validated_range(Some("2024-01-01"), Some(" 2024-01-08 "))
                .unwrap()
                .num_days()
        );
    }

    #[test]
    fn inverted_range_is_an_input_error() {
        assert!(matches!(
            validated_range(Some("2024-01-08"), Some("2024-01-01")),
            Err(RunError::InvalidDates(DateError::Inverted { .. }))
        ));
    }

    #[test]
    fn blank_dates_count_as_missing() {
        assert_eq!(None, present(Some("   ")));
        assert_eq!(None, present(None));
        assert_eq!(Some("2024-01-01"), present(Some(" 2024-01-01\n")));
    }

    #[test]
    fn date_errors_survive_cloning_the_run_error() {
        let error = validated_range(Some("2024-13-01"), Some("2024-01-08")).unwrap_err();
        let copy = error.clone();
        assert_eq!(
            RunError::InvalidDates(DateError::Invalid("2024-13-01".to_string())),
            copy
        );
        assert_eq!(error, copy);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!("boom 1", panic_message(payload.as_ref()));
    }
}
