use rewind_core::AuditRecord;
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `rwd schema`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_for!(AuditRecord);
    output(&schema, flags.format)
}
