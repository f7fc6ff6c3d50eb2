//! Layered configuration.
//!
//! Sources are merged lowest to highest priority:
//! 1. Built-in defaults
//! 2. `./dropwatch.toml`, if present
//! 3. An explicit TOML file
//! 4. `SENDER_EMAIL`, `SENDER_PASSWORD`, `RECIPIENT_EMAIL`, taken verbatim
//! 5. `DROPWATCH_*` variables, `__` separating nested keys
//!    (e.g. `DROPWATCH_NOTIFY__SMTP_PORT=2525`)
//!
//! CLI flags are applied by the caller on top of the extracted value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{DropwatchError, Result};
use crate::validation::{normalize_domain, validate_url_template};

pub const PROJECT_CONFIG_FILE: &str = "dropwatch.toml";
pub const ENV_PREFIX: &str = "DROPWATCH_";

pub const DEFAULT_DOMAIN: &str = "writeup.ai";
pub const DEFAULT_STATE_FILE: &str = "domain_status.json";
pub const DEFAULT_DROPCATCH_URL: &str = "https://www.dropcatch.com/domain/{domain}";
pub const DEFAULT_WHOIS_URL: &str = "https://www.whois.net/whois/{domain}";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// `notify` keys holding mail credentials, with the bare variable for each.
/// These are read verbatim so a numeric or bracketed password stays a string.
const CREDENTIALS: [(&str, &str); 3] = [
    ("sender_email", "SENDER_EMAIL"),
    ("sender_password", "SENDER_PASSWORD"),
    ("recipient_email", "RECIPIENT_EMAIL"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Domain being watched
    pub domain: String,
    /// Where the last snapshot is persisted
    pub state_file: PathBuf,
    pub sources: SourcesConfig,
    pub http: HttpConfig,
    pub notify: NotifyConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            sources: SourcesConfig::default(),
            http: HttpConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub dropcatch_url: String,
    pub whois_url: String,
    /// Disabling WHOIS gives the DropCatch-only variant of the check.
    pub whois_enabled: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            dropcatch_url: DEFAULT_DROPCATCH_URL.to_string(),
            whois_url: DEFAULT_WHOIS_URL.to_string(),
            whois_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Send an email on every run, not only when a change was detected
    pub notify_on_every_run: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
    pub recipient_email: Option<String>,
    /// Link to the scheduler run that produced the email
    pub run_url: Option<String>,
    /// Free-form closing line, e.g. when the next check is due
    pub footer: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            notify_on_every_run: false,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            sender_email: None,
            sender_password: None,
            recipient_email: None,
            run_url: None,
            footer: None,
        }
    }
}

/// Fully resolved SMTP settings. Only exists when every credential is present.
#[derive(Clone, PartialEq)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .field("recipient_email", &self.recipient_email)
            .finish()
    }
}

impl NotifyConfig {
    /// Resolve SMTP settings, or `None` if any credential is missing or blank.
    pub fn email(&self) -> Option<EmailConfig> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Some(EmailConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            sender_email: present(&self.sender_email)?,
            sender_password: present(&self.sender_password)?,
            recipient_email: present(&self.recipient_email)?,
        })
    }

    /// Copy with the password masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            sender_password: self.sender_password.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

/// Command-line settings, applied on top of every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub domain: Option<String>,
    pub state_file: Option<PathBuf>,
    pub disable_whois: bool,
    pub notify_on_every_run: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(domain) = &self.domain {
            config.domain = domain.clone();
        }
        if let Some(state_file) = &self.state_file {
            config.state_file = state_file.clone();
        }
        if self.disable_whois {
            config.sources.whois_enabled = false;
        }
        if self.notify_on_every_run {
            config.notify.notify_on_every_run = true;
        }
    }
}

fn is_credential_key(key: &str) -> bool {
    CREDENTIALS
        .iter()
        .any(|(name, _)| key.eq_ignore_ascii_case(&format!("notify.{}", name)))
}

/// Merge `var` as the string value of `notify.<key>`, if set.
fn merge_verbatim(figment: Figment, key: &str, var: &str) -> Figment {
    match std::env::var(var) {
        Ok(value) => figment.merge(Serialized::default(&format!("notify.{}", key), value)),
        Err(_) => figment,
    }
}

impl MonitorConfig {
    /// Load from every source and validate.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with(config_path, &ConfigOverrides::default())
    }

    /// Load from every source, apply `overrides`, then validate.
    pub fn load_with(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config: Self = Self::figment(config_path)
            .extract()
            .map_err(|e| DropwatchError::ConfigError(Box::new(e)))?;
        overrides.apply(&mut config);
        config.validated()
    }

    /// The merged provider stack, before extraction.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.exists() {
            figment = figment.merge(Toml::file(&project));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        for (key, var) in CREDENTIALS {
            figment = merge_verbatim(figment, key, var);
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .filter(|key| !is_credential_key(key.as_str())),
        );

        for (key, _) in CREDENTIALS {
            let var = format!("{}NOTIFY__{}", ENV_PREFIX, key.to_ascii_uppercase());
            figment = merge_verbatim(figment, key, &var);
        }

        figment
    }

    /// Normalize the domain and check templates and timeouts.
    pub fn validated(mut self) -> Result<Self> {
        self.domain = normalize_domain(&self.domain)?;
        validate_url_template("dropcatch", &self.sources.dropcatch_url)?;
        if self.sources.whois_enabled {
            validate_url_template("whois", &self.sources.whois_url)?;
        }
        if self.http.timeout_secs == 0 {
            return Err(DropwatchError::InvalidConfig(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.state_file.as_os_str().is_empty() {
            return Err(DropwatchError::InvalidConfig(
                "state_file must not be empty".to_string(),
            ));
        }
        Ok(self)
    }

    /// Copy safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            notify: self.notify.redacted(),
            ..self.clone()
        }
    }
}
