use std::sync::mpsc::Sender;

/// Milestones of a run, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Planned {
        room_type_name: String,
        reservations: u32,
    },
    ReservationCompleted {
        room_type_name: String,
        index: u32,
        of: u32,
        /// Reservations attempted so far over all room types.
        completed: u64,
        expected_total: u64,
        succeeded: bool,
    },
    RoomTypeFinished {
        room_type_name: String,
        created: u32,
        requested: u32,
    },
}

/// Receives the progress of a run as it happens.
pub trait ProgressSink {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

// A receiver that went away does not stop the run.
impl ProgressSink for Sender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}
