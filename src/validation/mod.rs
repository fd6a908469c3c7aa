//! Validation of graph edits.
//!
//! `connection` gates every new edge before it is committed; `audit`
//! re-checks the whole graph after the fact.

pub mod audit;
pub mod connection;

pub use audit::{AuditReport, AuditViolation, InvariantAudit};
pub use connection::{ConnectionPlan, ConnectionValidator};
