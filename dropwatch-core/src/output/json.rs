use serde_json::json;

use super::OutputFormatter;
use crate::config::MonitorConfig;
use crate::monitor::RunReport;
use crate::status::PreviousStatus;

pub struct JsonFormatter {
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    fn to_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        } else {
            serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RunReport) -> String {
        self.to_json(report)
    }

    fn format_previous(&self, domain: &str, previous: &PreviousStatus) -> String {
        self.to_json(&json!({
            "domain": domain,
            "status": previous,
        }))
    }

    fn format_config(&self, config: &MonitorConfig) -> String {
        self.to_json(&config.redacted())
    }
}
