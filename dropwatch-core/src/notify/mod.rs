//! Email alerts over an authenticated STARTTLS relay.
//!
//! Sending never fails the run: missing credentials skip the email and any
//! SMTP problem is logged and reported as [`NotifyOutcome::Failed`].

mod message;

pub use message::{strip_non_ascii, EmailMessage};

use std::time::Duration;

use lettre::address::Envelope;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::changes::ChangeReport;
use crate::config::{EmailConfig, NotifyConfig};
use crate::status::StatusSnapshot;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Sender, password or recipient not configured
    MissingConfig,
    /// Nothing changed and `notify_on_every_run` is off
    NoChanges,
    /// The run was a dry run
    DryRun,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingConfig => f.write_str("email configuration missing"),
            SkipReason::NoChanges => f.write_str("no changes detected"),
            SkipReason::DryRun => f.write_str("dry run"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifyOutcome {
    Sent { subject: String },
    Skipped { reason: SkipReason },
    Failed { reason: String },
}

impl NotifyOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotifyOutcome::Sent { .. })
    }

    pub fn skipped(reason: SkipReason) -> Self {
        NotifyOutcome::Skipped { reason }
    }
}

impl std::fmt::Display for NotifyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyOutcome::Sent { subject } => write!(f, "sent ({})", subject),
            NotifyOutcome::Skipped { reason } => write!(f, "skipped ({})", reason),
            NotifyOutcome::Failed { reason } => write!(f, "send failed ({})", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }

    /// Whether this run should produce an email at all.
    pub fn should_send(&self, changes: &ChangeReport) -> bool {
        self.config.notify_on_every_run || !changes.is_empty()
    }

    /// Compose and send the alert for this run, if warranted.
    #[instrument(skip_all, fields(domain = %domain, changes = changes.len()))]
    pub async fn notify(
        &self,
        domain: &str,
        snapshot: &StatusSnapshot,
        changes: &ChangeReport,
        dropcatch_url: &str,
    ) -> NotifyOutcome {
        if !self.should_send(changes) {
            debug!("No changes detected, not sending");
            return NotifyOutcome::skipped(SkipReason::NoChanges);
        }

        let Some(email) = self.config.email() else {
            warn!("Email configuration missing, skipping notification");
            return NotifyOutcome::skipped(SkipReason::MissingConfig);
        };

        let message = EmailMessage::compose(domain, snapshot, changes, dropcatch_url, &self.config);
        self.send(&email, &message).await
    }

    /// Deliver `message`, converting every failure into an outcome.
    pub async fn send(&self, email: &EmailConfig, message: &EmailMessage) -> NotifyOutcome {
        match deliver(email, message).await {
            Ok(()) => {
                info!(subject = %message.subject, "Email sent");
                NotifyOutcome::Sent {
                    subject: message.subject.clone(),
                }
            }
            Err(reason) => {
                warn!(error = %reason, "Failed to send email");
                NotifyOutcome::Failed { reason }
            }
        }
    }
}

async fn deliver(email: &EmailConfig, message: &EmailMessage) -> Result<(), String> {
    let from: Address = email
        .sender_email
        .parse()
        .map_err(|e| format!("invalid sender address: {}", e))?;
    let to: Address = email
        .recipient_email
        .parse()
        .map_err(|e| format!("invalid recipient address: {}", e))?;
    let envelope = Envelope::new(Some(from), vec![to]).map_err(|e| e.to_string())?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email.smtp_host)
        .map_err(|e| format!("SMTP setup failed: {}", e))?
        .port(email.smtp_port)
        .credentials(Credentials::new(
            email.sender_email.clone(),
            email.sender_password.clone(),
        ))
        .timeout(Some(SMTP_TIMEOUT))
        .build();

    debug!(host = %email.smtp_host, port = email.smtp_port, "Connecting to SMTP relay");

    let raw = message.to_raw(&email.sender_email, &email.recipient_email);
    transport
        .send_raw(&envelope, raw.as_bytes())
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}
