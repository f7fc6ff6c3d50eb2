use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Classification of the DropCatch domain page.
///
/// Persisted as its legacy label (`AVAILABLE_FOR_BACKORDER`, `ERROR_404`,
/// `ERROR: <message>`, ...), so state files stay plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropCatchStatus {
    AvailableForBackorder,
    NotAvailableYet,
    InAuction,
    /// The page loaded but matched none of the known phrasings
    Unrecognized,
    /// Non-200 response
    HttpError(u16),
    /// Timeout, DNS failure, connection reset, unreadable body
    TransportError(String),
}

impl DropCatchStatus {
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            DropCatchStatus::HttpError(_) | DropCatchStatus::TransportError(_)
        )
    }

    /// Transitioning into this state warrants an urgent alert.
    pub fn is_critical(&self) -> bool {
        matches!(self, DropCatchStatus::AvailableForBackorder)
    }
}

impl fmt::Display for DropCatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropCatchStatus::AvailableForBackorder => f.write_str("AVAILABLE_FOR_BACKORDER"),
            DropCatchStatus::NotAvailableYet => f.write_str("NOT_AVAILABLE_YET"),
            DropCatchStatus::InAuction => f.write_str("IN_AUCTION"),
            DropCatchStatus::Unrecognized => f.write_str("UNKNOWN_STATUS"),
            DropCatchStatus::HttpError(code) => write!(f, "ERROR_{}", code),
            DropCatchStatus::TransportError(message) => write!(f, "ERROR: {}", message),
        }
    }
}

impl FromStr for DropCatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE_FOR_BACKORDER" => Ok(DropCatchStatus::AvailableForBackorder),
            "NOT_AVAILABLE_YET" => Ok(DropCatchStatus::NotAvailableYet),
            "IN_AUCTION" => Ok(DropCatchStatus::InAuction),
            "UNKNOWN_STATUS" => Ok(DropCatchStatus::Unrecognized),
            _ => {
                if let Some(message) = s.strip_prefix("ERROR: ") {
                    return Ok(DropCatchStatus::TransportError(message.to_string()));
                }
                if let Some(code) = s.strip_prefix("ERROR_") {
                    return code
                        .parse::<u16>()
                        .map(DropCatchStatus::HttpError)
                        .map_err(|_| format!("Invalid HTTP error label: {}", s));
                }
                Err(format!("Unknown DropCatch status: {}", s))
            }
        }
    }
}

impl Serialize for DropCatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DropCatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        // Labels written by other versions of the monitor are kept as unrecognized
        Ok(label.parse().unwrap_or(DropCatchStatus::Unrecognized))
    }
}

/// Registration lifecycle phase as reported by the WHOIS page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhoisStatus {
    #[serde(rename = "pendingDelete")]
    PendingDelete,
    #[serde(rename = "redemptionPeriod")]
    RedemptionPeriod,
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "unknown", other)]
    Unrecognized,
}

impl WhoisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhoisStatus::PendingDelete => "pendingDelete",
            WhoisStatus::RedemptionPeriod => "redemptionPeriod",
            WhoisStatus::Expired => "expired",
            WhoisStatus::Active => "active",
            WhoisStatus::Unrecognized => "unknown",
        }
    }

    /// The domain is about to be released.
    pub fn is_critical(&self) -> bool {
        matches!(self, WhoisStatus::PendingDelete | WhoisStatus::Expired)
    }
}

impl fmt::Display for WhoisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a WHOIS page check: either a classified status with metadata,
/// or the reason the page could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhoisCheck {
    Found {
        status: WhoisStatus,
        /// Epoch when an older file did not record it
        #[serde(default)]
        checked_at: DateTime<Utc>,
        #[serde(default)]
        source: String,
    },
    Failed {
        error: String,
    },
}

impl WhoisCheck {
    pub fn status(&self) -> Option<WhoisStatus> {
        match self {
            WhoisCheck::Found { status, .. } => Some(*status),
            WhoisCheck::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WhoisCheck::Found { .. } => None,
            WhoisCheck::Failed { error } => Some(error),
        }
    }

    /// Status label for display, `error` when the check failed.
    pub fn status_label(&self) -> &'static str {
        self.status().map(|s| s.as_str()).unwrap_or("error")
    }
}

/// Everything learned in one run. Written to the state file as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub timestamp: DateTime<Utc>,
    pub dropcatch: DropCatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisCheck>,
}

impl StatusSnapshot {
    pub fn new(dropcatch: DropCatchStatus, whois: Option<WhoisCheck>) -> Self {
        Self {
            timestamp: Utc::now(),
            dropcatch,
            whois,
        }
    }
}

/// State loaded from a previous run.
///
/// Every field is optional so that hand-edited or older files still load;
/// the default value means there was no previous run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviousStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropcatch: Option<DropCatchStatus>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "stored_whois"
    )]
    pub whois: Option<WhoisCheck>,
}

/// A stored WHOIS entry that matches neither shape is dropped rather than
/// failing the whole file.
fn stored_whois<'de, D>(deserializer: D) -> Result<Option<WhoisCheck>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| WhoisCheck::deserialize(v).ok()))
}

impl PreviousStatus {
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none() && self.dropcatch.is_none() && self.whois.is_none()
    }

    pub fn whois_status(&self) -> Option<WhoisStatus> {
        self.whois.as_ref().and_then(WhoisCheck::status)
    }
}

impl From<StatusSnapshot> for PreviousStatus {
    fn from(snapshot: StatusSnapshot) -> Self {
        Self {
            timestamp: Some(snapshot.timestamp.to_rfc3339()),
            dropcatch: Some(snapshot.dropcatch),
            whois: snapshot.whois,
        }
    }
}
