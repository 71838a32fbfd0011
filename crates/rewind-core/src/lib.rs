//! # rewind-core
//!
//! Core types shared by every Rewind crate.
//!
//! - [`entities::AuditRecord`], the immutable-after-write audit entry, and the
//!   identity types it references
//! - Ordered change sets (`attribute -> [old, new]`)
//! - Equality criteria used by both storage backends
//! - The explicit per-operation [`context::AuditContext`]
//! - The [`store::AuditStore`] trait implemented by the relational and
//!   object-storage backends
//! - The cross-backend [`errors::StoreError`]

pub mod changes;
pub mod context;
pub mod criteria;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod store;
pub mod timestamp;
pub mod update;

pub use changes::{AuditedChanges, Change, ChangeSet};
pub use context::AuditContext;
pub use criteria::Criteria;
pub use entities::{Actor, AuditRecord, EntityRef};
pub use enums::{AuditAction, StorageMechanism};
pub use errors::StoreError;
pub use store::AuditStore;
pub use update::{RecordUpdate, RecordUpdateBuilder};
