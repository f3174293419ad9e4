//! Scheduler layer for the poller
//!
//! Each schedule runs the fetch-and-store cycle on its own fixed interval in
//! its own task. Schedules share nothing mutable, so a slow or failing cycle
//! on one never delays the other.

pub mod poller;

pub use poller::{Schedule, SchedulePoller};

use tokio::task::JoinHandle;
use tracing::info;

/// Owns the running schedule tasks
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawns one task per poller
    pub fn start(pollers: Vec<SchedulePoller>) -> Self {
        let handles = pollers.into_iter().map(SchedulePoller::spawn).collect();
        Self { handles }
    }

    /// Number of schedules started
    pub fn schedule_count(&self) -> usize {
        self.handles.len()
    }

    /// Stops every schedule, interrupting any cycle in flight
    pub fn shutdown(self) {
        for handle in &self.handles {
            handle.abort();
        }
        info!("Stopped {} schedule(s)", self.handles.len());
    }
}
