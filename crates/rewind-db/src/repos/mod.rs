//! Repository modules implementing the audit store on `RewindDb`.
//!
//! Each module adds methods to `RewindDb` via `impl` blocks.

pub mod audit;
mod criteria;
