//! Schedule poller
//!
//! Runs the fetch-and-store cycle for one schedule forever. A failed cycle is
//! logged and the poller goes back to waiting for the next tick.

use anyhow::{Result, bail};
use gidsync_client::ApiClient;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::sync::{self, Destinations, SyncReport};

/// A named interval and the files it writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    name: String,
    interval: Duration,
    destinations: Destinations,
}

impl Schedule {
    /// Creates a schedule; the interval must be non-zero
    pub fn new(
        name: impl Into<String>,
        interval: Duration,
        destinations: Destinations,
    ) -> Result<Self> {
        let name = name.into();
        if interval.is_zero() {
            bail!("interval of schedule {} must be greater than 0", name);
        }

        Ok(Self {
            name,
            interval,
            destinations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }
}

/// Drives one schedule
pub struct SchedulePoller {
    schedule: Schedule,
    client: ApiClient,
}

impl SchedulePoller {
    pub fn new(schedule: Schedule, client: ApiClient) -> Self {
        Self { schedule, client }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Starts the polling loop on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Waits one interval, runs a cycle, repeats; never returns
    pub async fn run(&self) {
        let interval = self.schedule.interval();
        info!(
            "Starting schedule {} (interval: {:?})",
            self.schedule.name(),
            interval
        );

        let start = Instant::now() + interval;
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            // Logged inside; the next tick always follows
            if self.run_once().await.is_err() {
                continue;
            }
        }
    }

    /// Runs a single cycle and logs its outcome
    ///
    /// The error wraps the [`SyncError`](crate::sync::SyncError) that names the failed phase.
    pub async fn run_once(&self) -> Result<SyncReport> {
        info!(
            "Fetching data for schedule {} (interval: {:?})",
            self.schedule.name, self.schedule.interval
        );

        match sync::fetch_and_store(&self.client, self.schedule.destinations()).await {
            Ok(report) => {
                info!(
                    "Schedule {} stored {} project(s) and {} user(s)",
                    self.schedule.name, report.projects, report.users
                );
                Ok(report)
            }
            Err(e) => {
                let phase = e.phase();
                let e = anyhow::Error::from(e);
                error!(
                    phase = %phase,
                    "Error fetching or storing data for schedule {}: {:#}",
                    self.schedule.name, e
                );
                Err(e)
            }
        }
    }
}
