//! Entity structs for audit records and the identities they reference.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`. The JSON
//! form of [`AuditRecord`] is the object-store blob format.

mod entity_ref;
mod record;

pub use entity_ref::{Actor, EntityRef};
pub use record::AuditRecord;
