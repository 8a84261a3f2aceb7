//! Event fan-out.
//!
//! Resolves the active subscribers for a tenant, filters them to the
//! triggered event, and runs one delivery sequence per match concurrently.
//! Webhook delivery is best-effort relative to the business operation that
//! triggered it: nothing here returns an error or panics, and a store
//! failure yields an empty result list plus an operational log entry.

use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use crate::models::{DeliveryRecord, EventEnvelope};
use crate::services::delivery_service::DeliveryService;
use crate::store::SubscriptionStore;

/// Fans one event occurrence out to all matching subscribers.
#[derive(Clone)]
pub struct WebhookDispatcher {
    store: Arc<dyn SubscriptionStore>,
    delivery: DeliveryService,
}

impl WebhookDispatcher {
    pub fn new(store: Arc<dyn SubscriptionStore>, delivery: DeliveryService) -> Self {
        Self { store, delivery }
    }

    /// Deliver `event` with `data` to every matching subscriber of the tenant.
    ///
    /// Returns one record per matching subscriber, successful or not. An
    /// empty list means either nobody was subscribed or the subscriber list
    /// could not be loaded — callers needing the distinction must inspect
    /// the operational logs; the triggering operation must never fail on it.
    pub async fn trigger_event(
        &self,
        tenant_id: Uuid,
        event: &str,
        data: serde_json::Value,
    ) -> Vec<DeliveryRecord> {
        let subscribers = match self.store.list_active(tenant_id).await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!(
                    target: "webhook_delivery",
                    tenant_id = %tenant_id,
                    event = %event,
                    error = %e,
                    "Failed to load subscribers; skipping webhook fan-out"
                );
                return Vec::new();
            }
        };

        let matching: Vec<_> = subscribers
            .into_iter()
            .filter(|s| s.events.contains(event))
            .collect();

        if matching.is_empty() {
            tracing::debug!(
                target: "webhook_delivery",
                tenant_id = %tenant_id,
                event = %event,
                "No active subscribers match event"
            );
            return Vec::new();
        }

        tracing::info!(
            target: "webhook_delivery",
            tenant_id = %tenant_id,
            event = %event,
            subscriber_count = matching.len(),
            "Fanning event out to matching subscribers"
        );

        // One envelope, one timestamp, shared by the whole fan-out.
        let envelope = EventEnvelope::new(event, tenant_id, data);

        // join_all settles every future regardless of individual outcomes;
        // one subscriber's failure never aborts the others.
        join_all(
            matching
                .iter()
                .map(|subscriber| self.delivery.deliver(subscriber, &envelope)),
        )
        .await
    }
}
