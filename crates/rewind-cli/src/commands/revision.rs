use anyhow::{Context, bail};
use rewind_audit::{AuditLog, Revision};
use rewind_core::Criteria;

use crate::cli::GlobalFlags;
use crate::cli::parse::{parse_entity, parse_optional_entity, parse_time};
use crate::cli::root_commands::RevisionArgs;
use crate::output::output;

/// Handle `rwd revision`.
pub async fn handle(
    args: &RevisionArgs,
    log: &AuditLog,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let revision = reconstruct(args, log).await?;
    output(&revision, flags.format)
}

/// Without `--version` or `--at` the latest version is reconstructed.
async fn reconstruct(args: &RevisionArgs, log: &AuditLog) -> anyhow::Result<Revision> {
    let subject = parse_entity(&args.subject)?;
    let filed_under = parse_optional_entity(args.filed_under.as_deref())?;

    if let Some(at) = args.at.as_deref() {
        let time = parse_time(at)?;
        return log
            .revision_at(&subject, filed_under.as_ref(), time)
            .await?
            .with_context(|| format!("{subject} has no audits at or before {at}"));
    }

    let mut query = log.audits(&subject);
    if let Some(parent) = filed_under {
        query = query.filed_under(parent);
    }
    let record = match args.version {
        Some(version) => {
            query
                .find_by(&Criteria::new().field("version", version))
                .await?
        }
        None => query.last().await?,
    };
    let Some(record) = record else {
        bail!("no matching audit for {subject}");
    };

    Ok(log.revision(&record).await?)
}
