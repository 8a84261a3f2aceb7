//! Webhook delivery execution.
//!
//! Performs the HTTP POST for one subscriber and one envelope: signs the
//! exact bytes sent, enforces the subscriber's per-attempt timeout, retries
//! retryable failures with exponential backoff, and records one audit entry
//! for the whole sequence.
//!
//! Failure classification:
//! - 2xx response ends the sequence successfully
//! - 4xx (except 429) is terminal — the receiver rejected the request on its
//!   merits and retrying identical input cannot fix it
//! - 429, 5xx, timeout and transport errors are retryable

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::Client;
use uuid::Uuid;

use crate::crypto;
use crate::error::WebhookError;
use crate::models::{DeliveryRecord, EventEnvelope, Subscriber, RESPONSE_BODY_LIMIT};
use crate::store::DeliveryLog;

/// User-Agent sent with every delivery.
pub const USER_AGENT: &str = "hookfan-webhooks/0.1";

/// Default backoff base: first retry waits this long, doubling per attempt.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Protocol header names that subscriber custom headers may not override.
const RESERVED_HEADERS: [&str; 6] = [
    "content-type",
    "user-agent",
    "x-webhook-signature",
    "x-webhook-delivery",
    "x-webhook-event",
    "x-webhook-timestamp",
];

/// Executes delivery sequences and records their outcomes.
#[derive(Clone)]
pub struct DeliveryService {
    http_client: Client,
    log: Arc<dyn DeliveryLog>,
    backoff_base: Duration,
}

impl DeliveryService {
    /// Create a delivery service with a shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::Internal` if the HTTP client cannot be built.
    pub fn new(log: Arc<dyn DeliveryLog>) -> Result<Self, WebhookError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| WebhookError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            log,
            backoff_base: DEFAULT_BACKOFF_BASE,
        })
    }

    /// Set the backoff base interval (mainly for tests).
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Run one delivery sequence for a subscriber and return its record.
    ///
    /// All failures are contained: the returned record carries the outcome,
    /// and nothing here panics or propagates an error to the caller.
    pub async fn deliver(&self, subscriber: &Subscriber, envelope: &EventEnvelope) -> DeliveryRecord {
        let delivery_id = Uuid::new_v4();
        let start = Instant::now();

        // Serialize once: the signature must cover the exact bytes sent, and
        // every attempt resends the same body.
        let body = match serde_json::to_vec(envelope) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(
                    target: "webhook_delivery",
                    delivery_id = %delivery_id,
                    subscriber_id = %subscriber.id,
                    error = %e,
                    "Failed to serialize webhook envelope"
                );
                let record = DeliveryRecord {
                    id: delivery_id,
                    subscriber_id: subscriber.id,
                    event: envelope.event.clone(),
                    success: false,
                    status_code: None,
                    response_body: None,
                    error: Some(format!("Failed to serialize payload: {e}")),
                    duration_ms: start.elapsed().as_millis() as u64,
                    attempts: 0,
                    payload: String::new(),
                    created_at: Utc::now(),
                };
                self.persist(&record).await;
                return record;
            }
        };

        let signature = crypto::sign(&body, &subscriber.secret);
        let headers = build_headers(subscriber, envelope, delivery_id, &signature);
        let timeout = Duration::from_millis(subscriber.timeout_ms);
        let total_attempts = subscriber.retry_attempts + 1;

        let mut attempts_made = 0u32;
        let mut success = false;
        let mut last_status: Option<u16> = None;
        let mut last_body: Option<String> = None;
        let mut last_error: Option<String> = None;

        for attempt in 0..total_attempts {
            attempts_made = attempt + 1;

            let result = self
                .http_client
                .post(&subscriber.url)
                .headers(headers.clone())
                .timeout(timeout)
                .body(body.clone())
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    // Best-effort body read: a failure here must not fail the delivery.
                    let text: String = response
                        .text()
                        .await
                        .unwrap_or_default()
                        .chars()
                        .take(RESPONSE_BODY_LIMIT)
                        .collect();

                    last_status = Some(status.as_u16());
                    last_body = Some(text);
                    last_error = None;

                    if status.is_success() {
                        success = true;
                        break;
                    }
                    if is_terminal_status(status.as_u16()) {
                        break;
                    }
                }
                Err(e) => {
                    last_status = None;
                    last_body = None;
                    last_error = Some(describe_error(&e, subscriber.timeout_ms));
                }
            }

            if attempt + 1 < total_attempts {
                tokio::time::sleep(backoff_delay(self.backoff_base, attempt)).await;
            }
        }

        let record = DeliveryRecord {
            id: delivery_id,
            subscriber_id: subscriber.id,
            event: envelope.event.clone(),
            success,
            status_code: last_status,
            response_body: last_body,
            error: last_error,
            duration_ms: start.elapsed().as_millis() as u64,
            attempts: attempts_made,
            payload: String::from_utf8_lossy(&body).into_owned(),
            created_at: Utc::now(),
        };

        if record.success {
            tracing::info!(
                target: "webhook_delivery",
                delivery_id = %record.id,
                subscriber_id = %subscriber.id,
                tenant_id = %subscriber.tenant_id,
                event = %record.event,
                status_code = record.status_code,
                attempts = record.attempts,
                duration_ms = record.duration_ms,
                "Webhook delivery succeeded"
            );
        } else {
            tracing::warn!(
                target: "webhook_delivery",
                delivery_id = %record.id,
                subscriber_id = %subscriber.id,
                tenant_id = %subscriber.tenant_id,
                event = %record.event,
                status_code = record.status_code,
                error = record.error.as_deref(),
                attempts = record.attempts,
                duration_ms = record.duration_ms,
                "Webhook delivery failed"
            );
        }

        self.persist(&record).await;
        record
    }

    /// Persist the audit record. A write failure is reported operationally
    /// and swallowed — losing the audit trail must not fail the delivery.
    async fn persist(&self, record: &DeliveryRecord) {
        if let Err(e) = self.log.record(record.clone()).await {
            tracing::error!(
                target: "webhook_delivery",
                delivery_id = %record.id,
                subscriber_id = %record.subscriber_id,
                error = %e,
                "Failed to persist delivery record"
            );
        }
    }
}

/// Backoff before the retry following attempt `attempt_index` (0-based):
/// `base * 2^attempt_index`.
pub fn backoff_delay(base: Duration, attempt_index: u32) -> Duration {
    base * 2u32.saturating_pow(attempt_index)
}

/// A 4xx response means the receiver rejected the request on its merits and
/// retries cannot fix it. 429 is carved out: rate limiting is transient.
fn is_terminal_status(status: u16) -> bool {
    (400..500).contains(&status) && status != 429
}

fn describe_error(e: &reqwest::Error, timeout_ms: u64) -> String {
    if e.is_timeout() {
        format!("Request timed out after {timeout_ms}ms")
    } else if e.is_connect() {
        format!("Connection failed: {e}")
    } else {
        format!("Request error: {e}")
    }
}

/// Build the request headers: the protocol set first, then subscriber custom
/// headers. Protocol header names are reserved — a custom header matching one
/// is skipped with a warning rather than silently clobbering the signature.
fn build_headers(
    subscriber: &Subscriber,
    envelope: &EventEnvelope,
    delivery_id: Uuid,
    signature: &str,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    // Header values here come from validated UUIDs and fixed strings, so
    // parse failures should never occur; skip silently rather than panic.
    if let Ok(v) = "application/json".parse() {
        headers.insert("Content-Type", v);
    }
    if let Ok(v) = signature.parse() {
        headers.insert("X-Webhook-Signature", v);
    }
    if let Ok(v) = delivery_id.to_string().parse() {
        headers.insert("X-Webhook-Delivery", v);
    }
    if let Ok(v) = envelope.event.parse() {
        headers.insert("X-Webhook-Event", v);
    }
    if let Ok(v) = envelope.timestamp.to_rfc3339().parse() {
        headers.insert("X-Webhook-Timestamp", v);
    }

    for (name, value) in &subscriber.headers {
        if RESERVED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            tracing::warn!(
                target: "webhook_delivery",
                subscriber_id = %subscriber.id,
                header = %name,
                "Ignoring custom header that overrides a reserved protocol header"
            );
            continue;
        }
        match (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            (Ok(n), Ok(v)) => {
                headers.insert(n, v);
            }
            _ => {
                tracing::warn!(
                    target: "webhook_delivery",
                    subscriber_id = %subscriber.id,
                    header = %name,
                    "Ignoring custom header with invalid name or value"
                );
            }
        }
    }

    headers
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
