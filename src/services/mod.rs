//! Business logic services.

pub mod aggregator;
pub mod auth;
pub mod dashboard;
pub mod identity;
pub mod page;
pub mod report_store;
