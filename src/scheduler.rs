use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::RefreshError;
use crate::frame::InfoFrame;

/// Produces a complete new info frame. Implementations do their own I/O; the scheduler only
/// decides when to run them and what to do with the result.
pub trait Refresh: Send + Sync + 'static {
    fn refresh(&self) -> impl Future<Output = Result<InfoFrame, RefreshError>> + Send;
}

/// The current info frame. Publishing swaps the whole `Arc`, so a reader always holds one
/// complete frame.
pub struct FrameHandle {
    current: watch::Sender<Arc<InfoFrame>>,
}

impl FrameHandle {
    pub fn new(initial: InfoFrame) -> Self {
        let (current, _) = watch::channel(Arc::new(initial));
        Self { current }
    }

    pub fn current(&self) -> Arc<InfoFrame> {
        Arc::clone(&self.current.borrow())
    }

    pub fn publish(&self, frame: InfoFrame) {
        self.current.send_replace(Arc::new(frame));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Clears the in-flight flag however the refresh task ends, including when it is aborted.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RefreshScheduler<R> {
    refresher: Arc<R>,
    frame: Arc<FrameHandle>,
    refreshing: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Refresh> RefreshScheduler<R> {
    pub fn new(refresher: Arc<R>, frame: Arc<FrameHandle>) -> Self {
        Self {
            refresher,
            frame,
            refreshing: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RefreshState {
        if self.refreshing.load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Start a refresh cycle in the background. Returns `false` without doing anything when a
    /// cycle is already running. Must be called from within a Tokio runtime.
    pub fn trigger(&self) -> bool {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!(target: "UPDATE_INFO", "previous refresh still running, skipping");
            return false;
        }

        let in_flight = InFlight(Arc::clone(&self.refreshing));
        let refresher = Arc::clone(&self.refresher);
        let frame = Arc::clone(&self.frame);

        let task = tokio::spawn(async move {
            let _in_flight = in_flight;
            match refresher.refresh().await {
                Ok(info) => {
                    frame.publish(info);
                    log::info!(target: "UPDATE_INFO", "info frame refreshed in the background");
                }
                Err(err) => {
                    log::error!(target: "UPDATE_INFO", "refresh abandoned, keeping previous frame: {}", err);
                }
            }
        });

        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(task);
        }
        true
    }

    /// Abort the in-flight cycle, if any, without waiting for it.
    pub fn shutdown(&self) {
        if let Some(task) = self.task.lock().ok().and_then(|mut slot| slot.take()) {
            task.abort();
        }
    }
}
