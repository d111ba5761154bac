//! Database models for accounts and weekly reports.

pub mod account;
pub mod report;
