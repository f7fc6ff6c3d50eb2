use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::changes::ChangeReport;
use crate::config::MonitorConfig;
use crate::error::Result;
use crate::notify::{Notifier, NotifyOutcome, SkipReason};
use crate::status::{DropCatchChecker, PageClient, PreviousStatus, StatusSnapshot, WhoisChecker};
use crate::store::StatusStore;

/// Result of a single monitoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub domain: String,
    pub started_at: DateTime<Utc>,
    pub previous: PreviousStatus,
    pub current: StatusSnapshot,
    pub changes: ChangeReport,
    pub notification: NotifyOutcome,
    pub dropcatch_url: String,
    pub state_file: PathBuf,
    /// Whether `current` was written to `state_file`
    pub saved: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Check and compare only; do not email or write the state file
    pub dry_run: bool,
}

/// One-shot domain monitor: load, check, compare, notify, persist.
#[derive(Debug, Clone)]
pub struct Monitor {
    domain: String,
    dropcatch: DropCatchChecker,
    whois: Option<WhoisChecker>,
    notifier: Notifier,
    store: StatusStore,
}

impl Monitor {
    /// Build from an already validated configuration.
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let client = PageClient::new(&config.http)?;

        let whois = config
            .sources
            .whois_enabled
            .then(|| WhoisChecker::from_config(client.clone(), config));

        Ok(Self {
            domain: config.domain.clone(),
            dropcatch: DropCatchChecker::from_config(client, config),
            whois,
            notifier: Notifier::new(config.notify.clone()),
            store: StatusStore::new(config.state_file.clone()),
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Public status page for the domain.
    pub fn dropcatch_url(&self) -> String {
        self.dropcatch.page_url(&self.domain)
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_with(RunOptions::default()).await
    }

    /// Check failures end up in the snapshot; only state file errors abort
    /// the run.
    #[instrument(skip(self), fields(domain = %self.domain))]
    pub async fn run_with(&self, options: RunOptions) -> Result<RunReport> {
        let started_at = Utc::now();
        let previous = self.store.load().await?;

        let dropcatch = self.dropcatch.check(&self.domain).await;
        let whois = match &self.whois {
            Some(checker) => Some(checker.check(&self.domain).await),
            None => None,
        };
        let current = StatusSnapshot::new(dropcatch, whois);

        let changes = ChangeReport::detect(&previous, &current);
        info!(
            dropcatch = %current.dropcatch,
            changes = changes.len(),
            critical = changes.critical,
            "Status checked"
        );

        let dropcatch_url = self.dropcatch_url();

        let notification = if options.dry_run {
            NotifyOutcome::skipped(SkipReason::DryRun)
        } else {
            self.notifier
                .notify(&self.domain, &current, &changes, &dropcatch_url)
                .await
        };

        if !options.dry_run {
            self.store.save(&current).await?;
        }

        Ok(RunReport {
            domain: self.domain.clone(),
            started_at,
            previous,
            current,
            changes,
            notification,
            dropcatch_url,
            state_file: self.store.path().to_path_buf(),
            saved: !options.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::DropCatchStatus;
    use tempfile::tempdir;

    fn offline_config(state_file: PathBuf) -> MonitorConfig {
        let mut config = MonitorConfig {
            state_file,
            ..MonitorConfig::default()
        };
        config.sources.dropcatch_url = "http://127.0.0.1:1/domain/{domain}".to_string();
        config.sources.whois_url = "http://127.0.0.1:1/whois/{domain}".to_string();
        config.http.timeout_secs = 2;
        config.validated().unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_sources_still_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("domain_status.json");
        let monitor = Monitor::new(&offline_config(path.clone())).unwrap();

        let report = monitor.run().await.unwrap();
        assert!(matches!(
            report.current.dropcatch,
            DropCatchStatus::TransportError(_)
        ));
        assert!(report.current.whois.as_ref().unwrap().error().is_some());
        assert!(report.saved);
        assert!(path.exists());
        assert_eq!(
            report.notification,
            NotifyOutcome::skipped(SkipReason::MissingConfig)
        );
    }

    #[tokio::test]
    async fn test_dry_run_leaves_state_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("domain_status.json");
        let monitor = Monitor::new(&offline_config(path.clone())).unwrap();

        let report = monitor
            .run_with(RunOptions { dry_run: true })
            .await
            .unwrap();
        assert!(!report.saved);
        assert!(!path.exists());
        assert_eq!(report.notification, NotifyOutcome::skipped(SkipReason::DryRun));
    }

    #[test]
    fn test_whois_disabled_variant() {
        let dir = tempdir().unwrap();
        let mut config = offline_config(dir.path().join("s.json"));
        config.sources.whois_enabled = false;

        let monitor = Monitor::new(&config).unwrap();
        assert!(monitor.whois.is_none());
        assert_eq!(
            monitor.dropcatch_url(),
            "http://127.0.0.1:1/domain/writeup.ai"
        );
    }
}
