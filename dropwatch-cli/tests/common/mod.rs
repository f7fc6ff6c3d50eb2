use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Nothing listens on port 1, so every check fails fast with a transport error.
pub const OFFLINE_DROPCATCH: &str = "http://127.0.0.1:1/domain/{domain}";
pub const OFFLINE_WHOIS: &str = "http://127.0.0.1:1/whois/{domain}";

pub struct TestEnv {
    tmp: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn dir(&self) -> &Path {
        self.tmp.path()
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir().join("domain_status.json")
    }

    /// `dropwatch` isolated in the temp dir, pointed at unreachable sources
    /// and without mail credentials.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("dropwatch");
        cmd.current_dir(self.dir())
            .env_remove("SENDER_EMAIL")
            .env_remove("SENDER_PASSWORD")
            .env_remove("RECIPIENT_EMAIL")
            .env_remove("RUST_LOG")
            .env("DROPWATCH_SOURCES__DROPCATCH_URL", OFFLINE_DROPCATCH)
            .env("DROPWATCH_SOURCES__WHOIS_URL", OFFLINE_WHOIS)
            .env("DROPWATCH_HTTP__TIMEOUT_SECS", "2");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .args(["--format", "json", "--no-color"])
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}
