//! Background writer for review results.
//!
//! Ratings are persisted off the UI path: the session hands a job to the queue
//! and moves on to the next card. Failed writes come back as
//! [`PersistenceFailure`] notifications; they are not retried.

use super::store::CardStore;
use crate::models::SrsState;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// A review result waiting to be written.
#[derive(Clone, Debug)]
pub struct SaveJob {
    pub user_id: String,
    pub card_id: String,
    pub state: SrsState,
}

/// A write that did not reach the store. The card's new state may be lost.
#[derive(Clone, Debug, PartialEq)]
pub struct PersistenceFailure {
    pub card_id: String,
    pub message: String,
}

pub struct SaveQueue {
    jobs: Option<Sender<SaveJob>>,
    failures: Receiver<PersistenceFailure>,
    worker: Option<JoinHandle<()>>,
}

impl SaveQueue {
    /// Spawns the writer thread.
    pub fn spawn(store: Arc<dyn CardStore>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<SaveJob>();
        let (failure_tx, failure_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            for job in job_rx {
                match store.save_card_state(&job.user_id, &job.card_id, &job.state) {
                    Ok(()) => debug!("Saved review state of card {}", job.card_id),
                    Err(e) => {
                        warn!("Failed to save review state of card {}: {}", job.card_id, e);
                        // Nobody listening any more is fine
                        let _ = failure_tx.send(PersistenceFailure {
                            card_id: job.card_id,
                            message: e.to_string(),
                        });
                    }
                }
            }
        });

        Self {
            jobs: Some(job_tx),
            failures: failure_rx,
            worker: Some(worker),
        }
    }

    /// Queues a write without waiting for it.
    pub fn submit(&self, job: SaveJob) {
        let Some(jobs) = &self.jobs else {
            return;
        };
        if let Err(mpsc::SendError(job)) = jobs.send(job) {
            warn!("Save writer is gone, review of card {} not persisted", job.card_id);
        }
    }

    /// Failures reported since the last call.
    pub fn take_failures(&self) -> Vec<PersistenceFailure> {
        self.failures.try_iter().collect()
    }

    /// Waits until every queued write finished and returns the outstanding failures.
    pub fn close(mut self) -> Vec<PersistenceFailure> {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Save writer panicked");
            }
        }
        self.failures.try_iter().collect()
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain in-flight jobs and exit on its own.
        self.jobs.take();
    }
}
