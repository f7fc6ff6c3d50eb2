use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::{PreviousStatus, StatusSnapshot};

/// Label used when one side of a comparison has no value.
const MISSING: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    DropCatch,
    Whois,
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSource::DropCatch => f.write_str("DropCatch"),
            ChangeSource::Whois => f.write_str("WHOIS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub source: ChangeSource,
    pub from: Option<String>,
    pub to: Option<String>,
    pub critical: bool,
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.source,
            self.from.as_deref().unwrap_or(MISSING),
            self.to.as_deref().unwrap_or(MISSING)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub changes: Vec<StatusChange>,
    /// Any change moved into a state where the domain is about to drop
    pub critical: bool,
}

impl ChangeReport {
    /// Compare the current snapshot with the previous run.
    ///
    /// Only the DropCatch label and the WHOIS status participate; timestamps
    /// and WHOIS metadata are ignored. WHOIS is skipped when the current run
    /// did not check it.
    pub fn detect(previous: &PreviousStatus, current: &StatusSnapshot) -> Self {
        let mut report = ChangeReport::default();

        if previous.dropcatch.as_ref() != Some(&current.dropcatch) {
            report.push(StatusChange {
                source: ChangeSource::DropCatch,
                from: previous.dropcatch.as_ref().map(|s| s.label()),
                to: Some(current.dropcatch.label()),
                critical: current.dropcatch.is_critical(),
            });
        }

        if let Some(whois) = &current.whois {
            let old = previous.whois_status();
            let new = whois.status();
            if old != new {
                report.push(StatusChange {
                    source: ChangeSource::Whois,
                    from: old.map(|s| s.to_string()),
                    to: new.map(|s| s.to_string()),
                    critical: new.is_some_and(|s| s.is_critical()),
                });
            }
        }

        report
    }

    fn push(&mut self, change: StatusChange) {
        self.critical |= change.critical;
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// One `Source: old -> new` line per change.
    pub fn lines(&self) -> Vec<String> {
        self.changes.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{DropCatchStatus, WhoisCheck, WhoisStatus};
    use chrono::Utc;

    fn found(status: WhoisStatus) -> WhoisCheck {
        WhoisCheck::Found {
            status,
            checked_at: Utc::now(),
            source: "whois.net".to_string(),
        }
    }

    #[test]
    fn test_backorder_transition_is_critical() {
        let previous: PreviousStatus =
            serde_json::from_str(r#"{"dropcatch": "NOT_AVAILABLE_YET"}"#).unwrap();
        let current = StatusSnapshot::new(DropCatchStatus::AvailableForBackorder, None);

        let report = ChangeReport::detect(&previous, &current);
        assert_eq!(
            report.lines(),
            vec!["DropCatch: NOT_AVAILABLE_YET -> AVAILABLE_FOR_BACKORDER"]
        );
        assert!(report.critical);
    }

    #[test]
    fn test_first_run_reports_unknown_origin() {
        let current = StatusSnapshot::new(
            DropCatchStatus::NotAvailableYet,
            Some(found(WhoisStatus::Active)),
        );

        let report = ChangeReport::detect(&PreviousStatus::default(), &current);
        assert_eq!(
            report.lines(),
            vec![
                "DropCatch: unknown -> NOT_AVAILABLE_YET",
                "WHOIS: unknown -> active"
            ]
        );
        assert!(!report.critical);
    }

    #[test]
    fn test_unchanged_status_yields_no_changes() {
        let first = StatusSnapshot::new(
            DropCatchStatus::InAuction,
            Some(found(WhoisStatus::RedemptionPeriod)),
        );
        let previous = PreviousStatus::from(first);
        // Same statuses, fresh timestamps
        let second = StatusSnapshot::new(
            DropCatchStatus::InAuction,
            Some(found(WhoisStatus::RedemptionPeriod)),
        );

        let report = ChangeReport::detect(&previous, &second);
        assert!(report.is_empty());
        assert!(!report.critical);
    }

    #[test]
    fn test_whois_pending_delete_is_critical() {
        let previous = PreviousStatus::from(StatusSnapshot::new(
            DropCatchStatus::NotAvailableYet,
            Some(found(WhoisStatus::RedemptionPeriod)),
        ));
        let current = StatusSnapshot::new(
            DropCatchStatus::NotAvailableYet,
            Some(found(WhoisStatus::PendingDelete)),
        );

        let report = ChangeReport::detect(&previous, &current);
        assert_eq!(report.lines(), vec!["WHOIS: redemptionPeriod -> pendingDelete"]);
        assert!(report.critical);
    }

    #[test]
    fn test_whois_failure_compares_as_missing() {
        let previous = PreviousStatus::from(StatusSnapshot::new(
            DropCatchStatus::NotAvailableYet,
            Some(found(WhoisStatus::Expired)),
        ));
        let current = StatusSnapshot::new(
            DropCatchStatus::NotAvailableYet,
            Some(WhoisCheck::Failed {
                error: "HTTP 500".to_string(),
            }),
        );

        let report = ChangeReport::detect(&previous, &current);
        assert_eq!(report.lines(), vec!["WHOIS: expired -> unknown"]);
        assert!(!report.critical);

        // Two failed checks in a row are not a change
        let previous = PreviousStatus::from(current.clone());
        assert!(ChangeReport::detect(&previous, &current).is_empty());
    }

    #[test]
    fn test_whois_skipped_when_not_checked() {
        let previous = PreviousStatus::from(StatusSnapshot::new(
            DropCatchStatus::NotAvailableYet,
            Some(found(WhoisStatus::Active)),
        ));
        let current = StatusSnapshot::new(DropCatchStatus::NotAvailableYet, None);

        assert!(ChangeReport::detect(&previous, &current).is_empty());
    }

    #[test]
    fn test_error_to_error_change() {
        let previous: PreviousStatus =
            serde_json::from_str(r#"{"dropcatch": "ERROR_503"}"#).unwrap();
        let current = StatusSnapshot::new(
            DropCatchStatus::TransportError("operation timed out".to_string()),
            None,
        );

        let report = ChangeReport::detect(&previous, &current);
        assert_eq!(
            report.lines(),
            vec!["DropCatch: ERROR_503 -> ERROR: operation timed out"]
        );
        assert!(!report.critical);
    }
}
