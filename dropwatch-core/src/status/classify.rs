//! Keyword classifiers for the monitored pages.
//!
//! The rules depend on third-party page wording, so each source gets its own
//! classifier behind [`PageClassifier`] and can be swapped without touching
//! the checkers.

use super::types::{DropCatchStatus, WhoisStatus};

/// Maps a successfully fetched page body to a status.
pub trait PageClassifier: Send + Sync {
    type Status;

    /// `body` is the raw page; implementations handle case themselves.
    fn classify(&self, body: &str) -> Self::Status;
}

/// DropCatch domain page rules, first match wins:
/// - "backorder" and "place a backorder" -> available for backorder
/// - "no results" or "not found" -> not available yet
/// - "auction" -> in auction
#[derive(Debug, Clone, Copy, Default)]
pub struct DropCatchClassifier;

impl PageClassifier for DropCatchClassifier {
    type Status = DropCatchStatus;

    fn classify(&self, body: &str) -> DropCatchStatus {
        let content = body.to_lowercase();

        if content.contains("backorder") && content.contains("place a backorder") {
            DropCatchStatus::AvailableForBackorder
        } else if content.contains("no results") || content.contains("not found") {
            DropCatchStatus::NotAvailableYet
        } else if content.contains("auction") {
            DropCatchStatus::InAuction
        } else {
            DropCatchStatus::Unrecognized
        }
    }
}

/// whois.net page rules, first match wins:
/// pending delete, redemption, expired, active.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhoisPageClassifier;

impl PageClassifier for WhoisPageClassifier {
    type Status = WhoisStatus;

    fn classify(&self, body: &str) -> WhoisStatus {
        let content = body.to_lowercase();

        if content.contains("pendingdelete") || content.contains("pending delete") {
            WhoisStatus::PendingDelete
        } else if content.contains("redemption") {
            WhoisStatus::RedemptionPeriod
        } else if content.contains("expired") {
            WhoisStatus::Expired
        } else if content.contains("active") {
            WhoisStatus::Active
        } else {
            WhoisStatus::Unrecognized
        }
    }
}
