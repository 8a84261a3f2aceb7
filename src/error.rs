//! Error types for the webhook engine.

/// Webhook engine error variants.
///
/// Failures inside the delivery pipeline itself are never surfaced through
/// this type — they are contained and reported as [`DeliveryRecord`] data and
/// operational logs. `WebhookError` covers the edges: subscriber registration
/// validation, store access, and engine construction.
///
/// [`DeliveryRecord`]: crate::models::DeliveryRecord
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("SSRF protection: {0}")]
    SsrfDetected(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
