//! # rewind-audit
//!
//! The audit log as applications use it.
//!
//! - [`selector::open_store`] picks the configured backend once
//! - [`query::AuditQuery`] reads a subject's audits the same way over either
//!   backend
//! - [`revision::Reconstructor`] rebuilds past states and reverts mutations
//! - [`service::AuditLog`] ties them together behind one handle

pub mod error;
pub mod query;
pub mod revision;
pub mod selector;
pub mod service;
pub mod subjects;

#[cfg(test)]
mod test_support;

pub use error::AuditError;
pub use query::{AuditQuery, QuerySource};
pub use revision::{Reconstructor, Revision};
pub use selector::open_store;
pub use service::AuditLog;
pub use subjects::{Attributes, InMemorySubjects, SubjectRepository};
