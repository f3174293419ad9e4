//! Fetch-and-store cycle
//!
//! One cycle runs strictly in order: fetch projects, save projects, fetch
//! users, save users. The first failing step aborts the cycle. A snapshot that
//! was already saved stays on disk; the next cycle overwrites it.

use gidsync_client::{ApiClient, ClientError};
use gidsync_core::domain::resource::ResourceKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::storage::{self, StorageError};

/// Where one schedule writes its snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    pub projects: PathBuf,
    pub users: PathBuf,
}

impl Destinations {
    /// `<dir>/<prefix>_projects.json` and `<dir>/<prefix>_users.json`
    pub fn for_schedule(dir: &Path, prefix: &str) -> Self {
        Self {
            projects: dir.join(format!("{}_projects.json", prefix)),
            users: dir.join(format!("{}_users.json", prefix)),
        }
    }

    pub fn path_for(&self, kind: ResourceKind) -> &Path {
        match kind {
            ResourceKind::Projects => &self.projects,
            ResourceKind::Users => &self.users,
        }
    }
}

/// The step of a cycle that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    FetchProjects,
    SaveProjects,
    FetchUsers,
    SaveUsers,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncPhase::FetchProjects => write!(f, "fetch-projects"),
            SyncPhase::SaveProjects => write!(f, "save-projects"),
            SyncPhase::FetchUsers => write!(f, "fetch-users"),
            SyncPhase::SaveUsers => write!(f, "save-users"),
        }
    }
}

/// Errors that abort a cycle
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to fetch {kind}")]
    Fetch {
        kind: ResourceKind,
        #[source]
        source: ClientError,
    },

    #[error("Failed to save {kind}")]
    Save {
        kind: ResourceKind,
        #[source]
        source: StorageError,
    },
}

impl SyncError {
    pub fn phase(&self) -> SyncPhase {
        match self {
            SyncError::Fetch {
                kind: ResourceKind::Projects,
                ..
            } => SyncPhase::FetchProjects,
            SyncError::Save {
                kind: ResourceKind::Projects,
                ..
            } => SyncPhase::SaveProjects,
            SyncError::Fetch {
                kind: ResourceKind::Users,
                ..
            } => SyncPhase::FetchUsers,
            SyncError::Save {
                kind: ResourceKind::Users,
                ..
            } => SyncPhase::SaveUsers,
        }
    }
}

/// Entity counts written by a successful cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub projects: usize,
    pub users: usize,
}

/// Fetches projects then users and writes each to its destination
pub async fn fetch_and_store(
    client: &ApiClient,
    destinations: &Destinations,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();

    for kind in ResourceKind::ALL {
        let collection = client
            .fetch_resource(kind)
            .await
            .map_err(|source| SyncError::Fetch { kind, source })?;

        let path = destinations.path_for(kind);
        storage::save_json(path, collection.entities())
            .map_err(|source| SyncError::Save { kind, source })?;

        debug!(
            "Saved {} {} to {}",
            collection.len(),
            kind,
            path.display()
        );

        match kind {
            ResourceKind::Projects => report.projects = collection.len(),
            ResourceKind::Users => report.users = collection.len(),
        }
    }

    info!(
        projects = report.projects,
        users = report.users,
        "Fetched and stored data to {} and {}",
        destinations.projects.display(),
        destinations.users.display()
    );

    Ok(report)
}
