//! Core data types: subscribers, event envelopes, delivery records, and the
//! event taxonomy.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Event taxonomy
// ---------------------------------------------------------------------------

/// Known webhook event types.
///
/// Subscriber event filters are validated against this registry at
/// registration time; the dispatcher itself matches on exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookEventType {
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionCancelled,
    PaymentSucceeded,
    PaymentFailed,
    CustomerCreated,
    CustomerUpdated,
    PlanChanged,
    InvoiceCreated,
    InvoicePaid,
}

impl WebhookEventType {
    /// The dot-namespaced wire name for this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionCreated => "subscription.created",
            Self::SubscriptionUpdated => "subscription.updated",
            Self::SubscriptionCancelled => "subscription.cancelled",
            Self::PaymentSucceeded => "payment.succeeded",
            Self::PaymentFailed => "payment.failed",
            Self::CustomerCreated => "customer.created",
            Self::CustomerUpdated => "customer.updated",
            Self::PlanChanged => "plan.changed",
            Self::InvoiceCreated => "invoice.created",
            Self::InvoicePaid => "invoice.paid",
        }
    }

    /// Parse a wire name back into an event type. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|et| et.as_str() == s)
    }

    /// All known event types.
    pub fn all() -> &'static [WebhookEventType] {
        &[
            Self::SubscriptionCreated,
            Self::SubscriptionUpdated,
            Self::SubscriptionCancelled,
            Self::PaymentSucceeded,
            Self::PaymentFailed,
            Self::CustomerCreated,
            Self::CustomerUpdated,
            Self::PlanChanged,
            Self::InvoiceCreated,
            Self::InvoicePaid,
        ]
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// A tenant-registered receiving endpoint plus its delivery policy.
///
/// Read-only from the engine's perspective; delivery never mutates it.
/// Deliberately not serializable: the secret must never be echoed.
#[derive(Clone)]
pub struct Subscriber {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Target URL for the HTTP POST.
    pub url: String,
    /// Extra headers merged into every request. Protocol header names are
    /// reserved and cannot be overridden from here.
    pub headers: HashMap<String, String>,
    /// Shared secret used to sign payloads. Never logged or echoed.
    pub secret: String,
    /// Event names this endpoint wants. Exact-match membership only.
    pub events: HashSet<String>,
    /// Inactive endpoints are skipped entirely.
    pub active: bool,
    /// Additional attempts beyond the first.
    pub retry_attempts: u32,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
}

// Manual Debug so the signing secret can never leak into logs.
impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("tenant_id", &self.tenant_id)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("secret", &"<redacted>")
            .field("events", &self.events)
            .field("active", &self.active)
            .field("retry_attempts", &self.retry_attempts)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Event envelope
// ---------------------------------------------------------------------------

/// The wire payload sent to every matching subscriber for one occurrence.
///
/// Immutable once constructed: the same serialized bytes are signed and sent,
/// and the timestamp is assigned once and shared across the whole fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
    pub company_id: Uuid,
}

impl EventEnvelope {
    /// Build an envelope for one event occurrence, stamping it now.
    pub fn new(event: impl Into<String>, company_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            timestamp: Utc::now(),
            data,
            company_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Delivery record
// ---------------------------------------------------------------------------

/// Maximum response body length retained in a delivery record.
pub const RESPONSE_BODY_LIMIT: usize = 1000;

/// Audit record for one delivery sequence (initial attempt plus retries).
///
/// Created once after the sequence ends, never updated afterward. Also
/// returned to the triggering caller for immediate inspection; callers that
/// need delivery confirmation must check [`success`](Self::success) —
/// a returned record only means the sequence ran, not that it landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Unique per delivery sequence; sent as `X-Webhook-Delivery`.
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub event: String,
    /// Whether the final response had a 2xx status.
    pub success: bool,
    /// Final HTTP status, if any response was received.
    pub status_code: Option<u16>,
    /// Final response body, truncated to [`RESPONSE_BODY_LIMIT`] characters.
    pub response_body: Option<String>,
    /// Last error, if the sequence ended without a usable response.
    pub error: Option<String>,
    /// Total wall-clock duration of the sequence in milliseconds.
    pub duration_ms: u64,
    /// Attempts actually made (1-based).
    pub attempts: u32,
    /// The serialized envelope that was sent, for replay and debugging.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
