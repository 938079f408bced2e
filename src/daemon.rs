//! Background scheduler that keeps the remote categories fresh.
//!
//! Each sync target gets its own loop: wait `interval` plus a random share of
//! `jitter`, then sync. All loops share the synchronizer's lock, so runs never
//! overlap. SIGINT/SIGTERM (Ctrl-C on Windows) stops every loop between runs.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::app::Result;
use crate::config::{format_interval, Config, ConfigError};
use crate::sync::{SyncTarget, Synchronizer};

/// When one target is synced.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub target: SyncTarget,
    pub interval: Duration,
    pub jitter: Duration,
}

impl Schedule {
    /// Interval plus a uniformly random extra delay of at most `jitter`.
    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }
        let max = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = rand::rng().random_range(0..=max);
        self.interval.saturating_add(Duration::from_millis(extra))
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Whether to sync every target immediately on start
    pub update_on_start: bool,
    pub schedules: Vec<Schedule>,
}

impl DaemonConfig {
    /// Schedules for `targets` from the `[sync]` section. `interval`, when
    /// given, replaces every configured interval.
    pub fn from_config(
        config: &Config,
        targets: &[SyncTarget],
        interval: Option<Duration>,
    ) -> std::result::Result<Self, ConfigError> {
        let schedules = targets
            .iter()
            .map(|target| {
                Ok(Schedule {
                    target: target.clone(),
                    interval: match interval {
                        Some(interval) => interval,
                        None => config.sync.interval_for(&target.tag)?,
                    },
                    jitter: config.sync.jitter_for(&target.tag)?,
                })
            })
            .collect::<std::result::Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            update_on_start: config.sync.update_on_start,
            schedules,
        })
    }
}

/// Daemon runner
pub struct Daemon {
    synchronizer: Arc<Synchronizer>,
    config: DaemonConfig,
    shutdown: watch::Sender<bool>,
}

impl Daemon {
    pub fn new(synchronizer: Arc<Synchronizer>, config: DaemonConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            synchronizer,
            config,
            shutdown,
        }
    }

    /// Ask every loop to stop. An in-flight sync finishes first.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_stopping(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run until SIGINT/SIGTERM or [`Daemon::stop`].
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let daemon = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            tracing::info!("Shutdown signal received");
            daemon.stop();
        });

        self.run_until_stopped().await;
        Ok(())
    }

    pub async fn run_until_stopped(&self) {
        for schedule in &self.config.schedules {
            tracing::info!(
                "Daemon will sync {} every {} (+ up to {} jitter)",
                schedule.target.tag,
                format_interval(schedule.interval.as_secs()),
                format_interval(schedule.jitter.as_secs())
            );
        }

        if self.config.update_on_start && !self.is_stopping() {
            tracing::info!("Running initial sync");
            for report in self.synchronizer.sync_all().await {
                tracing::info!("{}", report);
            }
        }

        let loops = self
            .config
            .schedules
            .iter()
            .map(|schedule| self.schedule_loop(schedule));
        futures::future::join_all(loops).await;

        tracing::info!("Daemon shutting down");
    }

    async fn schedule_loop(&self, schedule: &Schedule) {
        let mut shutdown = self.shutdown.subscribe();

        loop {
            let delay = schedule.next_delay();
            tracing::debug!("Next {} sync in {}s", schedule.target.tag, delay.as_secs());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.wait_for(|stop| *stop) => break,
            }
            if self.is_stopping() {
                break;
            }

            tracing::info!("Running scheduled sync of {}", schedule.target.tag);
            let report = self.synchronizer.sync(&schedule.target).await;
            tracing::info!("{}", report);
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to install signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {},
        _ = sigint.recv() => {},
    }
}

#[cfg(windows)]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::stub::StubFetcher;
    use crate::fetcher::Endpoints;
    use crate::router::{ChangeNotifier, Router};
    use crate::store::{SqliteStore, Store};

    fn synchronizer(stub: Arc<StubFetcher>) -> Arc<Synchronizer> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let router = Router::new(store, ChangeNotifier::default());
        let endpoints = Endpoints::new("https://api.example.com/3", "secret").unwrap();
        Arc::new(Synchronizer::new(
            stub,
            router,
            endpoints,
            vec![SyncTarget::popular()],
        ))
    }

    fn daemon_config(update_on_start: bool) -> DaemonConfig {
        DaemonConfig {
            update_on_start,
            schedules: vec![Schedule {
                target: SyncTarget::popular(),
                interval: Duration::from_secs(3600),
                jitter: Duration::ZERO,
            }],
        }
    }

    #[test]
    fn test_next_delay_stays_within_jitter() {
        let schedule = Schedule {
            target: SyncTarget::popular(),
            interval: Duration::from_secs(60),
            jitter: Duration::from_secs(30),
        };
        for _ in 0..100 {
            let delay = schedule.next_delay();
            assert!(delay >= Duration::from_secs(60));
            assert!(delay <= Duration::from_secs(90));
        }
    }

    #[test]
    fn test_huge_jitter_saturates() {
        let schedule = Schedule {
            target: SyncTarget::popular(),
            interval: Duration::from_secs(60),
            jitter: Duration::MAX,
        };
        for _ in 0..10 {
            assert!(schedule.next_delay() >= Duration::from_secs(60));
        }

        let schedule = Schedule {
            interval: Duration::MAX,
            jitter: Duration::from_secs(u64::MAX),
            ..schedule
        };
        assert_eq!(schedule.next_delay(), Duration::MAX);
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_toml_str(
            r#"
[sync]
interval = "1d"
jitter = "0s"
update_on_start = false

[sync.schedule.top_rated]
interval = "2d"
"#,
        )
        .unwrap();

        let daemon_config =
            DaemonConfig::from_config(&config, &SyncTarget::defaults(), None).unwrap();
        assert!(!daemon_config.update_on_start);
        assert_eq!(daemon_config.schedules[0].interval, Duration::from_secs(86400));
        assert_eq!(daemon_config.schedules[1].interval, Duration::from_secs(2 * 86400));
        assert!(daemon_config.schedules[1].jitter.is_zero());

        let forced = DaemonConfig::from_config(
            &config,
            &SyncTarget::defaults(),
            Some(Duration::from_secs(600)),
        )
        .unwrap();
        assert!(forced
            .schedules
            .iter()
            .all(|s| s.interval == Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_initial_sync_then_stop() {
        let stub = Arc::new(StubFetcher::new());
        let daemon = Arc::new(Daemon::new(synchronizer(stub.clone()), daemon_config(true)));

        let running = daemon.clone();
        let handle = tokio::spawn(async move { running.run_until_stopped().await });

        for _ in 0..200 {
            if !stub.calls().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        daemon.stop();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("daemon should stop")
            .unwrap();
        // The list fetch failed (no stub), so exactly one request was made
        assert_eq!(stub.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_before_start_skips_everything() {
        let stub = Arc::new(StubFetcher::new());
        let daemon = Daemon::new(synchronizer(stub.clone()), daemon_config(true));

        daemon.stop();
        tokio::time::timeout(Duration::from_secs(2), daemon.run_until_stopped())
            .await
            .expect("daemon should stop");

        assert!(stub.calls().is_empty());
    }
}
