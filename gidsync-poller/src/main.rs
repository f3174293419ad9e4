//! gidsync Poller
//!
//! Keeps JSON snapshots of the remote projects and users collections fresh on
//! two independent cadences.
//!
//! Architecture:
//! - Configuration: environment variables, optionally loaded from a dotenv file
//! - Storage: pretty-printed JSON snapshot files
//! - Sync: the fetch-and-store cycle (projects, then users)
//! - Scheduler: one task per interval, running cycles forever
//!
//! A failed cycle is logged and retried on the next tick; only configuration
//! errors at startup stop the process.

mod config;
mod scheduler;
mod storage;
mod sync;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gidsync_client::ApiClient;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::scheduler::{Schedule, SchedulePoller, Scheduler};
use crate::sync::Destinations;

#[derive(Parser, Debug)]
#[command(name = "gidsync")]
#[command(about = "Mirrors remote projects and users into JSON files on two polling intervals")]
#[command(version)]
struct Args {
    /// Dotenv file to load before reading configuration
    #[arg(long, env = "GIDSYNC_ENV_FILE", default_value = ".env")]
    env_file: PathBuf,

    /// Run one cycle per schedule and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gidsync_poller=info,gidsync_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    load_env_file(&args.env_file)?;

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Loaded configuration: base_url={}, short_interval={:?}, long_interval={:?}, output_dir={}",
        config.base_url,
        config.short_interval,
        config.long_interval,
        config.output_dir.display()
    );

    let client = ApiClient::new(
        config.base_url.clone(),
        config.api_token.clone(),
        config.request_timeout,
    )
    .context("Failed to create API client")?;

    let pollers = build_pollers(&config, &client)?;

    if args.once {
        return run_once(&pollers).await;
    }

    let scheduler = Scheduler::start(pollers);
    info!(
        "Service started with {} schedule(s). Press Ctrl+C to stop.",
        scheduler.schedule_count()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown signal received");
    scheduler.shutdown();

    Ok(())
}

/// Loads a dotenv file if one exists; a malformed file is fatal
fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            info!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => {
            debug!("No env file at {}, using process environment", path.display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

/// The short- and long-interval schedules, sharing one client
fn build_pollers(config: &Config, client: &ApiClient) -> Result<Vec<SchedulePoller>> {
    let schedules = [
        ("short_interval", config.short_interval),
        ("long_interval", config.long_interval),
    ];

    schedules
        .into_iter()
        .map(|(name, interval)| -> Result<SchedulePoller> {
            let destinations = Destinations::for_schedule(&config.output_dir, name);
            let schedule = Schedule::new(name, interval, destinations)?;
            Ok(SchedulePoller::new(schedule, client.clone()))
        })
        .collect()
}

/// Runs every schedule's cycle once, in order
async fn run_once(pollers: &[SchedulePoller]) -> Result<()> {
    let mut failed = 0;

    for poller in pollers {
        if poller.run_once().await.is_err() {
            warn!("Schedule {} failed", poller.schedule().name());
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} schedule(s) failed", failed, pollers.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gidsync_client::testing::{ScriptedTransport, Step};
    use std::sync::Arc;
    use std::time::Duration;

    fn config(output_dir: &Path) -> Config {
        Config {
            api_token: "token".to_string(),
            base_url: "http://api.test".to_string(),
            short_interval: Duration::from_secs(30),
            long_interval: Duration::from_secs(300),
            request_timeout: Duration::from_secs(10),
            output_dir: output_dir.to_path_buf(),
        }
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["gidsync"]).unwrap();
        assert_eq!(args.env_file, PathBuf::from(".env"));
        assert!(!args.once);

        let args = Args::try_parse_from(["gidsync", "--once", "--env-file", "prod.env"]).unwrap();
        assert_eq!(args.env_file, PathBuf::from("prod.env"));
        assert!(args.once);
    }

    #[test]
    fn test_build_pollers() {
        let config = config(Path::new("/srv/mirror"));
        let client =
            ApiClient::new(&config.base_url, &config.api_token, config.request_timeout).unwrap();

        let pollers = build_pollers(&config, &client).unwrap();

        let names: Vec<_> = pollers.iter().map(|p| p.schedule().name()).collect();
        assert_eq!(names, ["short_interval", "long_interval"]);
        assert_eq!(pollers[0].schedule().interval(), Duration::from_secs(30));
        assert_eq!(pollers[1].schedule().interval(), Duration::from_secs(300));
        assert_eq!(
            pollers[1].schedule().destinations().users,
            PathBuf::from("/srv/mirror/long_interval_users.json")
        );
    }

    #[tokio::test]
    async fn test_run_once_fails_when_any_schedule_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let transport = Arc::new(ScriptedTransport::new([Step::status(404, "not found")]));
        let client = ApiClient::with_transport(&config.base_url, &config.api_token, transport);
        let pollers = build_pollers(&config, &client).unwrap();

        let err = run_once(&pollers).await.unwrap_err();
        assert_eq!(err.to_string(), "2 of 2 schedule(s) failed");
    }

    #[tokio::test]
    async fn test_run_once_succeeds_when_every_schedule_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let transport = Arc::new(ScriptedTransport::new([Step::ok(r#"{"data":[]}"#)]));
        let client = ApiClient::with_transport(&config.base_url, &config.api_token, transport);
        let pollers = build_pollers(&config, &client).unwrap();

        run_once(&pollers).await.unwrap();
        assert!(dir.path().join("short_interval_projects.json").exists());
        assert!(dir.path().join("long_interval_users.json").exists());
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(&dir.path().join("absent.env")).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.env");
        std::fs::write(&path, "NOT VALID LINE\n").unwrap();
        assert!(load_env_file(&path).is_err());
    }
}
