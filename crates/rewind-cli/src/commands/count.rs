use rewind_audit::AuditLog;
use rewind_core::Criteria;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CountArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
struct CountResponse {
    count: usize,
}

/// Handle `rwd count`.
pub async fn handle(args: &CountArgs, log: &AuditLog, flags: &GlobalFlags) -> anyhow::Result<()> {
    let criteria = Criteria::parse_pairs(args.criteria.iter().map(String::as_str))?;
    let count = log.store().count(&criteria).await?;
    output(&CountResponse { count }, flags.format)
}
