use chrono::{DateTime, Local, Utc};
use colored::Colorize;

use super::OutputFormatter;
use crate::colors::CatppuccinExt;
use crate::config::MonitorConfig;
use crate::monitor::RunReport;
use crate::notify::NotifyOutcome;
use crate::status::{DropCatchStatus, PreviousStatus, WhoisCheck, WhoisStatus};

fn local_time(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.sky().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_white().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.use_colors {
            text.overlay1().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        if self.use_colors {
            format!("\n{}\n{}", text.lavender().bold(), "─".repeat(text.len()).subtext0())
        } else {
            format!("\n{}\n{}", text, "-".repeat(text.len()))
        }
    }

    fn dropcatch(&self, status: &DropCatchStatus) -> String {
        let text = status.to_string();
        match status {
            DropCatchStatus::AvailableForBackorder => self.success(&text),
            DropCatchStatus::InAuction => self.warning(&text),
            DropCatchStatus::HttpError(_) | DropCatchStatus::TransportError(_) => {
                self.error(&text)
            }
            DropCatchStatus::NotAvailableYet | DropCatchStatus::Unrecognized => {
                self.value(&text)
            }
        }
    }

    fn whois(&self, check: Option<&WhoisCheck>) -> String {
        match check {
            None => self.muted("disabled"),
            Some(WhoisCheck::Failed { error }) => self.error(&format!("error ({})", error)),
            Some(WhoisCheck::Found { status, source, .. }) => {
                let text = if source.is_empty() {
                    status.to_string()
                } else {
                    format!("{} (via {})", status, source)
                };
                match status {
                    WhoisStatus::PendingDelete | WhoisStatus::Expired => self.success(&text),
                    WhoisStatus::RedemptionPeriod => self.warning(&text),
                    WhoisStatus::Active | WhoisStatus::Unrecognized => self.value(&text),
                }
            }
        }
    }

    fn notification(&self, outcome: &NotifyOutcome) -> String {
        let text = outcome.to_string();
        match outcome {
            NotifyOutcome::Sent { .. } => self.success(&text),
            NotifyOutcome::Skipped { .. } => self.muted(&text),
            NotifyOutcome::Failed { .. } => self.error(&text),
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &RunReport) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("Domain: {}", report.domain)));
        output.push(format!(
            "  {}: {}",
            self.label("Checked"),
            self.value(&local_time(&report.current.timestamp))
        ));

        if report.changes.is_empty() {
            output.push(format!("  {}: {}", self.label("Changes"), self.muted("none")));
        } else {
            let heading = if report.changes.critical {
                self.error("CRITICAL")
            } else {
                self.warning("changed")
            };
            output.push(format!("  {}: {}", self.label("Changes"), heading));
            for change in &report.changes.changes {
                output.push(format!("    - {}", self.value(&change.to_string())));
            }
        }

        output.push(format!(
            "  {}: {}",
            self.label("Notification"),
            self.notification(&report.notification)
        ));

        let saved = if report.saved {
            self.value(&report.state_file.display().to_string())
        } else {
            self.muted("not saved (dry run)")
        };
        output.push(format!("  {}: {}", self.label("State"), saved));

        output.push(String::new());
        output.push(self.label("Current Status:"));
        output.push(format!(
            "   {}: {}",
            self.label("DropCatch"),
            self.dropcatch(&report.current.dropcatch)
        ));
        output.push(format!(
            "   {}: {}",
            self.label("WHOIS"),
            self.whois(report.current.whois.as_ref())
        ));
        output.push(format!(
            "{}: {}",
            self.label("Direct link"),
            self.value(&report.dropcatch_url)
        ));

        output.join("\n")
    }

    fn format_previous(&self, domain: &str, previous: &PreviousStatus) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("Last recorded status: {}", domain)));

        if previous.is_empty() {
            output.push(format!("  {}", self.muted("No status recorded yet")));
            return output.join("\n");
        }

        if let Some(timestamp) = &previous.timestamp {
            let shown = DateTime::parse_from_rfc3339(timestamp)
                .map(|t| local_time(&t.with_timezone(&Utc)))
                .unwrap_or_else(|_| timestamp.clone());
            output.push(format!("  {}: {}", self.label("Recorded"), self.value(&shown)));
        }

        let dropcatch = match &previous.dropcatch {
            Some(status) => self.dropcatch(status),
            None => self.muted("unknown"),
        };
        output.push(format!("  {}: {}", self.label("DropCatch"), dropcatch));
        output.push(format!(
            "  {}: {}",
            self.label("WHOIS"),
            self.whois(previous.whois.as_ref())
        ));

        output.join("\n")
    }

    fn format_config(&self, config: &MonitorConfig) -> String {
        let config = config.redacted();
        let mut output = Vec::new();

        output.push(self.header("Configuration"));
        output.push(format!("  {}: {}", self.label("Domain"), self.value(&config.domain)));
        output.push(format!(
            "  {}: {}",
            self.label("State file"),
            self.value(&config.state_file.display().to_string())
        ));
        output.push(format!(
            "  {}: {}",
            self.label("DropCatch URL"),
            self.value(&config.sources.dropcatch_url)
        ));
        let whois = if config.sources.whois_enabled {
            self.value(&config.sources.whois_url)
        } else {
            self.muted("disabled")
        };
        output.push(format!("  {}: {}", self.label("WHOIS URL"), whois));
        output.push(format!(
            "  {}: {}s",
            self.label("Timeout"),
            self.value(&config.http.timeout_secs.to_string())
        ));
        output.push(format!(
            "  {}: {}:{}",
            self.label("SMTP relay"),
            self.value(&config.notify.smtp_host),
            self.value(&config.notify.smtp_port.to_string())
        ));

        let field = |v: &Option<String>| match v.as_deref() {
            Some(s) => self.value(s),
            None => self.muted("(unset)"),
        };
        output.push(format!("  {}: {}", self.label("Sender"), field(&config.notify.sender_email)));
        output.push(format!("  {}: {}", self.label("Password"), field(&config.notify.sender_password)));
        output.push(format!("  {}: {}", self.label("Recipient"), field(&config.notify.recipient_email)));
        output.push(format!(
            "  {}: {}",
            self.label("Notify every run"),
            self.value(&config.notify.notify_on_every_run.to_string())
        ));

        output.join("\n")
    }
}
