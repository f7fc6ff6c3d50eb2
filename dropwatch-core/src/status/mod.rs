//! Domain status checking
//!
//! Fetches the DropCatch and WHOIS pages for a domain and classifies them.
//! Checks never return errors: transport failures and HTTP error codes are
//! folded into the resulting status.

mod classify;
mod client;
mod types;

pub use classify::{DropCatchClassifier, PageClassifier, WhoisPageClassifier};
pub use client::{DropCatchChecker, PageClient, PageFetch, WhoisChecker};
pub use types::{DropCatchStatus, PreviousStatus, StatusSnapshot, WhoisCheck, WhoisStatus};
