//! Delivery pipeline services.

pub mod billing_events;
pub mod delivery_service;
pub mod dispatcher;
