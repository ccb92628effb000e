use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::models::wizard::CompanyProfile;

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)+$")
        .expect("domain pattern is valid")
});

const EMPTY_SITE_MESSAGE: &str = "Please enter a company website URL";
const INVALID_SITE_MESSAGE: &str =
    "Please enter only the domain name (e.g., company.com or www.company.com)";

/// Reduces user input to a bare, lower-cased host name.
///
/// Accepts `company.com`, `www.company.com` or an `http(s)://` URL whose path
/// is empty or `/`. Anything carrying a path, query, fragment or port is
/// rejected, as is a host without a dot.
pub fn normalize_site(input: &str) -> AppResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(EMPTY_SITE_MESSAGE));
    }

    let lowered = trimmed.to_ascii_lowercase();
    let without_scheme = match lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None if lowered.contains("://") => {
            return Err(AppError::validation(INVALID_SITE_MESSAGE))
        }
        None => lowered.as_str(),
    };

    let split_at = without_scheme
        .find(['/', '?', '#'])
        .unwrap_or(without_scheme.len());
    let (host, rest) = without_scheme.split_at(split_at);
    if !(rest.is_empty() || rest == "/") {
        return Err(AppError::validation(INVALID_SITE_MESSAGE));
    }

    if !DOMAIN_RE.is_match(host) {
        return Err(AppError::validation(INVALID_SITE_MESSAGE));
    }

    Ok(host.to_string())
}

/// `acme.io` -> `ACME Corp`. A leading `www` label is skipped.
pub fn company_name(site: &str) -> String {
    let mut labels = site.split('.').filter(|label| !label.is_empty());
    let first = match labels.next() {
        Some("www") => labels.next().unwrap_or("www"),
        Some(label) => label,
        None => site,
    };
    format!("{} Corp", first.to_uppercase())
}

pub fn scope_description(site: &str) -> String {
    format!(
        "{site} appears to be a technology company offering various software solutions and services. \
         The company provides enterprise-level applications, cloud services, and digital transformation \
         solutions to help businesses optimize their operations and improve customer experience."
    )
}

pub fn company_profile(site: &str) -> CompanyProfile {
    CompanyProfile {
        company_name: company_name(site),
        scope_description: scope_description(site),
    }
}
