//! Typed billing-event adapters.
//!
//! Each method shapes one domain object into the generic envelope `data` and
//! triggers the fan-out under its fixed event name. Pure translation: no
//! business logic lives here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::models::{DeliveryRecord, WebhookEventType};
use crate::services::dispatcher::WebhookDispatcher;

/// Subscription fields carried into subscription lifecycle events.
#[derive(Debug, Clone)]
pub struct SubscriptionInfo {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    pub price_id: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
}

/// Invoice fields carried into payment and invoice events.
#[derive(Debug, Clone)]
pub struct InvoiceInfo {
    pub id: String,
    pub subscription_id: String,
    pub customer_id: String,
    pub amount_due: i64,
    pub amount_paid: i64,
    pub currency: String,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub receipt_url: Option<String>,
    pub attempt_count: u32,
    pub next_payment_attempt: Option<DateTime<Utc>>,
}

/// Customer fields carried into customer events.
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Plan-change fields carried into `plan.changed`.
#[derive(Debug, Clone)]
pub struct PlanChange {
    pub subscription_id: String,
    pub old_plan: String,
    pub new_plan: String,
    pub changed_at: DateTime<Utc>,
    pub effective_date: DateTime<Utc>,
}

/// Billing-domain event adapters over the fan-out dispatcher.
#[derive(Clone)]
pub struct BillingEvents {
    dispatcher: Arc<WebhookDispatcher>,
}

impl BillingEvents {
    pub fn new(dispatcher: Arc<WebhookDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn subscription_created(
        &self,
        tenant_id: Uuid,
        subscription: &SubscriptionInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::SubscriptionCreated.as_str(),
                json!({
                    "subscriptionId": subscription.id,
                    "customerId": subscription.customer_id,
                    "status": subscription.status,
                    "priceId": subscription.price_id,
                    "currentPeriodStart": subscription.current_period_start,
                    "currentPeriodEnd": subscription.current_period_end,
                }),
            )
            .await
    }

    pub async fn subscription_updated(
        &self,
        tenant_id: Uuid,
        subscription: &SubscriptionInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::SubscriptionUpdated.as_str(),
                json!({
                    "subscriptionId": subscription.id,
                    "status": subscription.status,
                    "priceId": subscription.price_id,
                    "currentPeriodStart": subscription.current_period_start,
                    "currentPeriodEnd": subscription.current_period_end,
                    "cancelAtPeriodEnd": subscription.cancel_at_period_end,
                }),
            )
            .await
    }

    pub async fn subscription_cancelled(
        &self,
        tenant_id: Uuid,
        subscription_id: &str,
        cancelled_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::SubscriptionCancelled.as_str(),
                json!({
                    "subscriptionId": subscription_id,
                    "cancelledAt": cancelled_at,
                    "endedAt": ended_at,
                }),
            )
            .await
    }

    pub async fn payment_succeeded(
        &self,
        tenant_id: Uuid,
        invoice: &InvoiceInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::PaymentSucceeded.as_str(),
                json!({
                    "invoiceId": invoice.id,
                    "subscriptionId": invoice.subscription_id,
                    "customerId": invoice.customer_id,
                    "amountPaid": invoice.amount_paid,
                    "currency": invoice.currency,
                    "paidAt": invoice.paid_at,
                    "receiptUrl": invoice.receipt_url,
                }),
            )
            .await
    }

    pub async fn payment_failed(
        &self,
        tenant_id: Uuid,
        invoice: &InvoiceInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::PaymentFailed.as_str(),
                json!({
                    "invoiceId": invoice.id,
                    "subscriptionId": invoice.subscription_id,
                    "customerId": invoice.customer_id,
                    "amountDue": invoice.amount_due,
                    "currency": invoice.currency,
                    "attemptCount": invoice.attempt_count,
                    "nextPaymentAttempt": invoice.next_payment_attempt,
                }),
            )
            .await
    }

    pub async fn customer_created(
        &self,
        tenant_id: Uuid,
        customer: &CustomerInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::CustomerCreated.as_str(),
                json!({
                    "customerId": customer.id,
                    "email": customer.email,
                    "name": customer.name,
                    "createdAt": customer.created_at,
                }),
            )
            .await
    }

    pub async fn customer_updated(
        &self,
        tenant_id: Uuid,
        customer: &CustomerInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::CustomerUpdated.as_str(),
                json!({
                    "customerId": customer.id,
                    "email": customer.email,
                    "name": customer.name,
                }),
            )
            .await
    }

    pub async fn plan_changed(&self, tenant_id: Uuid, change: &PlanChange) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::PlanChanged.as_str(),
                json!({
                    "subscriptionId": change.subscription_id,
                    "oldPlan": change.old_plan,
                    "newPlan": change.new_plan,
                    "changedAt": change.changed_at,
                    "effectiveDate": change.effective_date,
                }),
            )
            .await
    }

    pub async fn invoice_created(
        &self,
        tenant_id: Uuid,
        invoice: &InvoiceInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::InvoiceCreated.as_str(),
                json!({
                    "invoiceId": invoice.id,
                    "subscriptionId": invoice.subscription_id,
                    "customerId": invoice.customer_id,
                    "amountDue": invoice.amount_due,
                    "currency": invoice.currency,
                    "dueDate": invoice.due_date,
                    "status": invoice.status,
                }),
            )
            .await
    }

    pub async fn invoice_paid(
        &self,
        tenant_id: Uuid,
        invoice: &InvoiceInfo,
    ) -> Vec<DeliveryRecord> {
        self.dispatcher
            .trigger_event(
                tenant_id,
                WebhookEventType::InvoicePaid.as_str(),
                json!({
                    "invoiceId": invoice.id,
                    "subscriptionId": invoice.subscription_id,
                    "customerId": invoice.customer_id,
                    "amountPaid": invoice.amount_paid,
                    "currency": invoice.currency,
                    "paidAt": invoice.paid_at,
                    "receiptUrl": invoice.receipt_url,
                }),
            )
            .await
    }
}
