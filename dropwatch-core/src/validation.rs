//! Domain name and URL template validation

use crate::error::{DropwatchError, Result};

/// Placeholder substituted with the domain in source URL templates.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// Normalize and validate a domain name
///
/// This function:
/// - Removes http:// and https:// prefixes
/// - Removes www. prefix
/// - Removes trailing slashes and paths
/// - Converts to lowercase
/// - Validates format (must contain dots, only alphanumeric/hyphens/dots)
pub fn normalize_domain(domain: &str) -> Result<String> {
    let domain = domain.trim().to_lowercase();

    let domain = domain
        .strip_prefix("http://")
        .or_else(|| domain.strip_prefix("https://"))
        .unwrap_or(&domain);

    let domain = domain.split('/').next().unwrap_or(domain);
    let domain = domain.strip_prefix("www.").unwrap_or(domain);

    if domain.is_empty() || !domain.contains('.') {
        return Err(DropwatchError::InvalidDomain(domain.to_string()));
    }

    let valid = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err(DropwatchError::InvalidDomain(domain.to_string()));
    }

    if domain.contains("..") || domain.starts_with('.') || domain.ends_with('.') {
        return Err(DropwatchError::InvalidDomain(domain.to_string()));
    }

    for label in domain.split('.') {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return Err(DropwatchError::InvalidDomain(domain.to_string()));
        }
    }

    Ok(domain.to_string())
}

/// Check that a source URL template is an http(s) URL with a `{domain}` slot.
pub fn validate_url_template(name: &str, template: &str) -> Result<()> {
    if !template.contains(DOMAIN_PLACEHOLDER) {
        return Err(DropwatchError::InvalidConfig(format!(
            "{} URL template must contain {}: {}",
            name, DOMAIN_PLACEHOLDER, template
        )));
    }
    if !(template.starts_with("http://") || template.starts_with("https://")) {
        return Err(DropwatchError::InvalidConfig(format!(
            "{} URL template must start with http:// or https://: {}",
            name, template
        )));
    }
    Ok(())
}

/// Expand a URL template for a domain.
pub fn render_url(template: &str, domain: &str) -> String {
    template.replace(DOMAIN_PLACEHOLDER, domain)
}

/// Host part of a URL template with any `www.` prefix removed, e.g.
/// `https://www.whois.net/whois/{domain}` -> `whois.net`.
pub fn template_host(template: &str) -> Option<&str> {
    let rest = template
        .strip_prefix("https://")
        .or_else(|| template.strip_prefix("http://"))?;
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.split(':').next()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
