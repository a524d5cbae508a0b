//! Execution lanes
//!
//! The request and working lanes are tokio runtime handles. The delivery
//! lane is a dedicated thread draining a queue, so callbacks never run
//! concurrently with each other and keep their submission order.

use crate::error::{Error, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error};

/// Name of the thread backing the delivery lane
pub const DELIVERY_THREAD_NAME: &str = "pagekit-delivery";

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serial lane for user-visible callbacks
#[derive(Clone)]
pub struct DeliveryLane {
    tx: mpsc::Sender<Job>,
}

impl DeliveryLane {
    /// Start a new delivery lane.
    ///
    /// The backing thread exits once every clone of the lane is dropped and
    /// the queue is drained.
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name(DELIVERY_THREAD_NAME.to_string())
            .spawn(move || {
                for job in rx {
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!("Delivery callback panicked");
                    }
                }
                debug!("Delivery lane drained, exiting");
            })?;
        Ok(Self { tx })
    }

    /// Queue `job` on the lane.
    ///
    /// If the lane thread is gone the job runs inline, so it still runs
    /// exactly once.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(mpsc::SendError(job)) = self.tx.send(Box::new(job)) {
            job();
        }
    }

    /// Queue `job` and wait until it has returned
    pub async fn dispatch_and_wait<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        self.dispatch(move || {
            job();
            let _ = done_tx.send(());
        });
        // a panicking job drops the sender; that still counts as returned
        let _ = done_rx.await;
    }
}

impl std::fmt::Debug for DeliveryLane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryLane").finish_non_exhaustive()
    }
}

/// The three lanes owned by a session
#[derive(Debug, Clone)]
pub struct Lanes {
    /// Pacing and dispatch
    pub request: Handle,
    /// Post-network processing
    pub working: Handle,
    /// User-visible callbacks
    pub delivery: DeliveryLane,
}

impl Lanes {
    /// Build lanes from explicit parts
    pub fn new(request: Handle, working: Handle, delivery: DeliveryLane) -> Self {
        Self {
            request,
            working,
            delivery,
        }
    }

    /// Request and working lanes on the current runtime, plus a fresh
    /// delivery lane
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::lane(format!("no tokio runtime available: {e}")))?;
        Ok(Self::new(handle.clone(), handle, DeliveryLane::spawn()?))
    }
}
