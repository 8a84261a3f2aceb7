//! Outbound webhook delivery engine.
//!
//! Provides tenant-scoped fan-out of domain events to registered HTTP
//! endpoints with HMAC-SHA256 signing, per-endpoint timeout and retry
//! policy, exponential backoff, and an append-only delivery audit trail.
//!
//! Delivery is at-least-once and push-only. Deliveries to different
//! subscribers race independently; receivers must treat events as unordered
//! unless they inspect the envelope timestamp themselves.

pub mod crypto;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

pub use error::WebhookError;
pub use models::{DeliveryRecord, EventEnvelope, Subscriber, WebhookEventType};
pub use services::billing_events::BillingEvents;
pub use services::delivery_service::DeliveryService;
pub use services::dispatcher::WebhookDispatcher;
pub use store::{DeliveryLog, InMemoryStore, SubscriptionStore};
