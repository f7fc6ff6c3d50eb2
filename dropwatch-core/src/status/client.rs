use chrono::Utc;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use super::classify::{DropCatchClassifier, PageClassifier, WhoisPageClassifier};
use super::types::{DropCatchStatus, WhoisCheck, WhoisStatus};
use crate::config::{HttpConfig, MonitorConfig};
use crate::error::Result;
use crate::validation::{render_url, template_host};

/// What came back from fetching a status page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    /// HTTP 200 with its body
    Page(String),
    /// Any other HTTP status
    Status(u16),
    /// The request never produced a response (or its body could not be read)
    Transport(String),
}

/// HTTP client shared by the page checkers. Fetching never fails; every
/// outcome is a [`PageFetch`].
#[derive(Debug, Clone)]
pub struct PageClient {
    client: reqwest::Client,
}

impl PageClient {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout())
            .user_agent(http.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> PageFetch {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Request failed");
                return PageFetch::Transport(e.to_string());
            }
        };

        let status = response.status();
        debug!(status = status.as_u16(), "Received response");

        if status != StatusCode::OK {
            return PageFetch::Status(status.as_u16());
        }

        match response.text().await {
            Ok(body) => PageFetch::Page(body),
            Err(e) => {
                warn!(error = %e, "Failed to read response body");
                PageFetch::Transport(e.to_string())
            }
        }
    }
}

/// Checks the DropCatch page for a domain.
#[derive(Debug, Clone)]
pub struct DropCatchChecker<C = DropCatchClassifier> {
    client: PageClient,
    url_template: String,
    classifier: C,
}

impl DropCatchChecker {
    pub fn new(client: PageClient, url_template: impl Into<String>) -> Self {
        Self::with_classifier(client, url_template, DropCatchClassifier)
    }

    pub fn from_config(client: PageClient, config: &MonitorConfig) -> Self {
        Self::new(client, config.sources.dropcatch_url.clone())
    }
}

impl<C: PageClassifier<Status = DropCatchStatus>> DropCatchChecker<C> {
    pub fn with_classifier(client: PageClient, url_template: impl Into<String>, classifier: C) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            classifier,
        }
    }

    pub fn page_url(&self, domain: &str) -> String {
        render_url(&self.url_template, domain)
    }

    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn check(&self, domain: &str) -> DropCatchStatus {
        let url = self.page_url(domain);
        debug!(url = %url, "Checking DropCatch");

        match self.client.fetch(&url).await {
            PageFetch::Page(body) => self.classifier.classify(&body),
            PageFetch::Status(code) => DropCatchStatus::HttpError(code),
            PageFetch::Transport(message) => DropCatchStatus::TransportError(message),
        }
    }
}

/// Checks a WHOIS web page for a domain's lifecycle status.
#[derive(Debug, Clone)]
pub struct WhoisChecker<C = WhoisPageClassifier> {
    client: PageClient,
    url_template: String,
    source: String,
    classifier: C,
}

impl WhoisChecker {
    pub fn new(client: PageClient, url_template: impl Into<String>) -> Self {
        Self::with_classifier(client, url_template, WhoisPageClassifier)
    }

    pub fn from_config(client: PageClient, config: &MonitorConfig) -> Self {
        Self::new(client, config.sources.whois_url.clone())
    }
}

impl<C: PageClassifier<Status = WhoisStatus>> WhoisChecker<C> {
    pub fn with_classifier(client: PageClient, url_template: impl Into<String>, classifier: C) -> Self {
        let url_template = url_template.into();
        let source = template_host(&url_template)
            .unwrap_or("whois")
            .to_string();

        Self {
            client,
            url_template,
            source,
            classifier,
        }
    }

    /// Label recorded in results, e.g. `whois.net`.
    pub fn source(&self) -> &str {
        &self.source
    }

    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn check(&self, domain: &str) -> WhoisCheck {
        let url = render_url(&self.url_template, domain);
        debug!(url = %url, "Checking WHOIS");

        match self.client.fetch(&url).await {
            PageFetch::Page(body) => WhoisCheck::Found {
                status: self.classifier.classify(&body),
                checked_at: Utc::now(),
                source: self.source.clone(),
            },
            PageFetch::Status(code) => WhoisCheck::Failed {
                error: format!("HTTP {}", code),
            },
            PageFetch::Transport(message) => WhoisCheck::Failed { error: message },
        }
    }
}
