use chrono::SecondsFormat;

use crate::changes::ChangeReport;
use crate::config::NotifyConfig;
use crate::status::{DropCatchStatus, StatusSnapshot};

/// Plain-text alert. Subject and body only ever contain ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

/// Drop every non-ASCII character.
pub fn strip_non_ascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

impl EmailMessage {
    pub fn new(subject: &str, body: &str) -> Self {
        Self {
            subject: strip_non_ascii(subject),
            body: strip_non_ascii(body),
        }
    }

    pub fn compose(
        domain: &str,
        snapshot: &StatusSnapshot,
        changes: &ChangeReport,
        dropcatch_url: &str,
        notify: &NotifyConfig,
    ) -> Self {
        let urgency = if changes.critical { "URGENT" } else { "Update" };
        let subject = format!("{}: {} Status Change!", urgency, domain);

        let mut lines = vec![
            format!("Domain: {}", domain),
            format!(
                "Time: {}",
                snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        ];
        if let Some(run_url) = &notify.run_url {
            lines.push(format!("Run: {}", run_url));
        }

        lines.push(String::new());
        lines.push("CHANGES DETECTED:".to_string());
        if changes.is_empty() {
            lines.push("None".to_string());
        } else {
            lines.extend(changes.lines());
        }

        let whois = match &snapshot.whois {
            Some(check) => check.status_label(),
            None => "disabled",
        };
        lines.push(String::new());
        lines.push("CURRENT STATUS:".to_string());
        lines.push(format!("- DropCatch: {}", snapshot.dropcatch));
        lines.push(format!("- WHOIS Status: {}", whois));

        lines.push(String::new());
        lines.push("ACTION NEEDED:".to_string());
        lines.push(
            if snapshot.dropcatch == DropCatchStatus::AvailableForBackorder {
                "DOMAIN IS AVAILABLE FOR BACKORDER ON DROPCATCH!"
            } else {
                "Continue monitoring..."
            }
            .to_string(),
        );

        lines.push(String::new());
        lines.push(format!("Direct DropCatch Link: {}", dropcatch_url));
        if let Some(footer) = &notify.footer {
            lines.push(String::new());
            lines.push(footer.clone());
        }

        Self::new(&subject, &lines.join("\n"))
    }

    /// RFC 822 message with just `From`, `To` and `Subject` headers.
    pub fn to_raw(&self, from: &str, to: &str) -> String {
        let mut raw = format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\n\r\n",
            strip_non_ascii(from),
            strip_non_ascii(to),
            self.subject
        );
        for line in self.body.lines() {
            raw.push_str(line);
            raw.push_str("\r\n");
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{WhoisCheck, WhoisStatus};
    use chrono::Utc;

    const URL: &str = "https://www.dropcatch.com/domain/writeup.ai";

    fn snapshot(dropcatch: DropCatchStatus, whois: Option<WhoisCheck>) -> StatusSnapshot {
        StatusSnapshot::new(dropcatch, whois)
    }

    #[test]
    fn test_strip_non_ascii() {
        assert_eq!(strip_non_ascii("🚨 Alert — now"), " Alert  now");
        assert_eq!(strip_non_ascii("plain"), "plain");
    }

    #[test]
    fn test_critical_subject_and_action() {
        let previous: crate::status::PreviousStatus =
            serde_json::from_str(r#"{"dropcatch": "NOT_AVAILABLE_YET"}"#).unwrap();
        let current = snapshot(DropCatchStatus::AvailableForBackorder, None);
        let changes = ChangeReport::detect(&previous, &current);

        let message =
            EmailMessage::compose("writeup.ai", &current, &changes, URL, &NotifyConfig::default());
        assert_eq!(message.subject, "URGENT: writeup.ai Status Change!");
        assert!(message
            .body
            .contains("DropCatch: NOT_AVAILABLE_YET -> AVAILABLE_FOR_BACKORDER"));
        assert!(message
            .body
            .contains("DOMAIN IS AVAILABLE FOR BACKORDER ON DROPCATCH!"));
        assert!(message.body.contains("- WHOIS Status: disabled"));
        assert!(message.body.contains(&format!("Direct DropCatch Link: {}", URL)));
    }

    #[test]
    fn test_routine_update_without_changes() {
        let current = snapshot(
            DropCatchStatus::NotAvailableYet,
            Some(WhoisCheck::Failed {
                error: "HTTP 403".to_string(),
            }),
        );
        let notify = NotifyConfig {
            run_url: Some("https://ci.example.com/runs/42".to_string()),
            footer: Some("Next check: tomorrow at 09:00 UTC".to_string()),
            ..NotifyConfig::default()
        };

        let message =
            EmailMessage::compose("writeup.ai", &current, &ChangeReport::default(), URL, &notify);
        assert_eq!(message.subject, "Update: writeup.ai Status Change!");
        assert!(message.body.contains("CHANGES DETECTED:\nNone"));
        assert!(message.body.contains("- WHOIS Status: error"));
        assert!(message.body.contains("Continue monitoring..."));
        assert!(message.body.contains("Run: https://ci.example.com/runs/42"));
        assert!(message.body.ends_with("Next check: tomorrow at 09:00 UTC"));
    }

    #[test]
    fn test_whois_status_in_body() {
        let current = snapshot(
            DropCatchStatus::InAuction,
            Some(WhoisCheck::Found {
                status: WhoisStatus::PendingDelete,
                checked_at: Utc::now(),
                source: "whois.net".to_string(),
            }),
        );
        let message = EmailMessage::compose(
            "writeup.ai",
            &current,
            &ChangeReport::default(),
            URL,
            &NotifyConfig::default(),
        );
        assert!(message.body.contains("- WHOIS Status: pendingDelete"));
        assert!(message.body.contains("- DropCatch: IN_AUCTION"));
    }

    #[test]
    fn test_to_raw_headers_and_ascii() {
        let message = EmailMessage::new("Update: café.com", "Line one ✓\nLine two");
        let raw = message.to_raw("alerts@example.com", "me@example.com");

        assert!(raw.starts_with(
            "From: alerts@example.com\r\nTo: me@example.com\r\nSubject: Update: caf.com\r\n\r\n"
        ));
        assert!(raw.ends_with("Line one \r\nLine two\r\n"));
        assert!(raw.is_ascii());
    }
}
