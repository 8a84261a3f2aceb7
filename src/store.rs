//! Persistence seams for subscriber records and the delivery audit trail.
//!
//! The relational store backing a production deployment is an external
//! collaborator; the engine only needs the two narrow interfaces defined
//! here. [`InMemoryStore`] implements both for embedding and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::WebhookError;
use crate::models::{DeliveryRecord, Subscriber};
use crate::validation;

/// Read access to subscriber registrations.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// List all active subscribers owned by a tenant.
    async fn list_active(&self, tenant_id: Uuid) -> Result<Vec<Subscriber>, WebhookError>;
}

/// Append-only audit trail of delivery sequences.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Persist one delivery record.
    async fn record(&self, record: DeliveryRecord) -> Result<(), WebhookError>;

    /// List records for a subscriber, most recent first, limited to `limit`.
    async fn recent(
        &self,
        subscriber_id: Uuid,
        limit: usize,
    ) -> Result<Vec<DeliveryRecord>, WebhookError>;
}

/// In-memory store implementing both persistence seams.
pub struct InMemoryStore {
    subscribers: RwLock<HashMap<Uuid, Subscriber>>,
    deliveries: RwLock<Vec<DeliveryRecord>>,
    allow_insecure: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            deliveries: RwLock::new(Vec::new()),
            allow_insecure: false,
        }
    }

    /// Allow plain-HTTP and internal-host subscriber URLs (for
    /// development/testing).
    #[must_use]
    pub fn with_allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Register a subscriber after validating its URL and event filter.
    pub async fn register(&self, subscriber: Subscriber) -> Result<(), WebhookError> {
        validation::validate_webhook_url(&subscriber.url, self.allow_insecure)?;
        validation::validate_event_names(&subscriber.events)?;

        self.subscribers
            .write()
            .await
            .insert(subscriber.id, subscriber);
        Ok(())
    }

    /// Remove a subscriber registration. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.subscribers.write().await.remove(&id).is_some()
    }

    /// Total number of stored delivery records, across all subscribers.
    pub async fn delivery_count(&self) -> usize {
        self.deliveries.read().await.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn list_active(&self, tenant_id: Uuid) -> Result<Vec<Subscriber>, WebhookError> {
        let subs = self.subscribers.read().await;
        Ok(subs
            .values()
            .filter(|s| s.tenant_id == tenant_id && s.active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DeliveryLog for InMemoryStore {
    async fn record(&self, record: DeliveryRecord) -> Result<(), WebhookError> {
        self.deliveries.write().await.push(record);
        Ok(())
    }

    async fn recent(
        &self,
        subscriber_id: Uuid,
        limit: usize,
    ) -> Result<Vec<DeliveryRecord>, WebhookError> {
        let deliveries = self.deliveries.read().await;
        Ok(deliveries
            .iter()
            .rev()
            .filter(|r| r.subscriber_id == subscriber_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
