use std::path::Path;

use anyhow::Context;
use rewind_audit::AuditLog;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::parse::{parse_entity, parse_optional_entity};
use crate::cli::root_commands::ExportArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExportResponse {
    path: String,
    records: usize,
}

/// Handle `rwd export`. One record per line, ascending by version.
pub async fn handle(args: &ExportArgs, log: &AuditLog, flags: &GlobalFlags) -> anyhow::Result<()> {
    let subject = parse_entity(&args.subject)?;
    let mut query = log.audits(&subject);
    if let Some(parent) = parse_optional_entity(args.filed_under.as_deref())? {
        query = query.filed_under(parent);
    }
    let records = query.ascending().await?;

    let path = Path::new(&args.output);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    serde_jsonlines::write_json_lines(path, &records)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(subject = %subject, records = records.len(), path = %path.display(), "audits exported");
    output(
        &ExportResponse {
            path: args.output.clone(),
            records: records.len(),
        },
        flags.format,
    )
}
