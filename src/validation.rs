//! URL validation and SSRF protection for subscriber registration.

use std::collections::HashSet;
use std::net::IpAddr;

use crate::error::WebhookError;
use crate::models::WebhookEventType;

/// Validate a subscriber endpoint URL.
///
/// Checks:
/// 1. URL is parseable
/// 2. Scheme is HTTPS
/// 3. Host is not a private/internal address (SSRF protection)
///
/// `allow_insecure` relaxes checks 2 and 3 for development and test
/// environments where endpoints live on plain HTTP or loopback.
pub fn validate_webhook_url(url: &str, allow_insecure: bool) -> Result<(), WebhookError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| WebhookError::InvalidUrl(format!("Invalid URL format: {e}")))?;

    match parsed.scheme() {
        "https" => {}
        "http" if allow_insecure => {}
        "http" => {
            return Err(WebhookError::InvalidUrl(
                "Webhook URLs must use HTTPS".to_string(),
            ));
        }
        scheme => {
            return Err(WebhookError::InvalidUrl(format!(
                "Unsupported URL scheme: {scheme}"
            )));
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| WebhookError::InvalidUrl("URL must have a host".to_string()))?;

    if allow_insecure {
        return Ok(());
    }
    validate_host_not_internal(host)
}

/// Validate that a host is not a private/internal address.
///
/// Blocks loopback, RFC1918 private ranges, link-local (cloud metadata
/// endpoints), CGNAT, IPv6 loopback/unspecified, and internal hostnames
/// (localhost, *.internal, *.local).
pub fn validate_host_not_internal(host: &str) -> Result<(), WebhookError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_internal_ip(&ip) {
            return Err(WebhookError::SsrfDetected(format!(
                "Destination host {host} is a private/internal address"
            )));
        }
    }

    let lower = host.to_ascii_lowercase();
    if lower == "localhost"
        || lower == "metadata.google.internal"
        || lower.ends_with(".internal")
        || lower.ends_with(".local")
    {
        return Err(WebhookError::SsrfDetected(format!(
            "Destination host {host} is a restricted internal hostname"
        )));
    }

    Ok(())
}

fn is_internal_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()                // 127.0.0.0/8
                || v4.is_private()          // 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
                || v4.is_link_local()       // 169.254.0.0/16
                || v4.is_broadcast()
                || v4.is_unspecified()
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64) // 100.64.0.0/10 (CGNAT)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

/// Validate that every event name in a subscriber filter is a known
/// [`WebhookEventType`].
pub fn validate_event_names(events: &HashSet<String>) -> Result<(), WebhookError> {
    for name in events {
        if WebhookEventType::parse(name).is_none() {
            return Err(WebhookError::Validation(format!(
                "Unknown event type: {name}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
