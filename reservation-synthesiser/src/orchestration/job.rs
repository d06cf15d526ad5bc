//! Runs on a background thread, with a progress channel and a cancel switch.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver},
        Arc,
    },
    thread::{self, JoinHandle},
};

use pms_client::Transport;
use rand::Rng;

use super::{Orchestrator, ProgressEvent, RunError, RunRequest, RunSummary};

/// A run in progress.
pub struct RunHandle {
    progress: Receiver<ProgressEvent>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<RunSummary, RunError>>,
}

impl RunHandle {
    /// The run's progress events. The channel closes when the run ends, so iterating it blocks
    /// until then.
    pub fn progress(&self) -> &Receiver<ProgressEvent> {
        &self.progress
    }

    /// Asks the run to stop before its next reservation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the run to end.
    pub fn join(self) -> Result<RunSummary, RunError> {
        self.worker
            .join()
            .unwrap_or_else(|_| Err(RunError::Unexpected("the run thread panicked".to_string())))
    }
}

/// Starts a run on its own thread. The orchestrator is shared, so runs started from the same
/// orchestrator reuse its source identifier.
pub fn spawn_run<T, R>(
    orchestrator: Arc<Orchestrator<T>>,
    request: RunRequest,
    mut rng: R,
) -> io::Result<RunHandle>
where
    T: Transport + 'static,
    R: Rng + Send + 'static,
{
    let (sender, progress) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);
    let worker = thread::Builder::new()
        .name("reservation-run".to_string())
        .spawn(move || orchestrator.run(&request, &mut rng, &sender, &worker_cancel))?;
    Ok(RunHandle {
        progress,
        cancel,
        worker,
    })
}
