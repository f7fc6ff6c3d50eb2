pub mod changes;
pub mod colors;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod output;
pub mod status;
pub mod store;
pub mod validation;

pub use error::{DropwatchError, Result};
pub use validation::normalize_domain;

pub use changes::{ChangeReport, ChangeSource, StatusChange};
pub use config::{ConfigOverrides, EmailConfig, MonitorConfig, NotifyConfig};
pub use monitor::{Monitor, RunOptions, RunReport};
pub use notify::{EmailMessage, Notifier, NotifyOutcome, SkipReason};
pub use status::{
    DropCatchChecker, DropCatchStatus, PageClassifier, PreviousStatus, StatusSnapshot,
    WhoisCheck, WhoisChecker, WhoisStatus,
};
pub use store::StatusStore;

pub use output::{OutputFormat, OutputFormatter};
