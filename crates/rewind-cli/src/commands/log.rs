use rewind_audit::{AuditLog, QuerySource};
use rewind_core::AuditRecord;

use crate::cli::GlobalFlags;
use crate::cli::parse::{parse_entity, parse_optional_entity, parse_time};
use crate::cli::root_commands::LogArgs;
use crate::output::output;

/// Handle `rwd log`.
pub async fn handle(args: &LogArgs, log: &AuditLog, flags: &GlobalFlags) -> anyhow::Result<()> {
    let records = fetch(args, log, flags).await?;
    output(&records, flags.format)
}

async fn fetch(
    args: &LogArgs,
    log: &AuditLog,
    flags: &GlobalFlags,
) -> anyhow::Result<Vec<AuditRecord>> {
    let subject = parse_entity(&args.subject)?;
    let mut query = log.audits(&subject);
    if let Some(parent) = parse_optional_entity(args.filed_under.as_deref())? {
        query = query.filed_under(parent);
    }
    if args.associated {
        query = query.source(QuerySource::Associated);
    }

    let mut records = if args.with_associated {
        query.own_and_associated().await?
    } else if args.descending {
        query.descending().await?
    } else {
        query.ascending().await?
    };

    if let Some(until) = args.up_until.as_deref() {
        let until = parse_time(until)?;
        records.retain(|r| r.created_at_or_before(until));
    }

    let limit = flags.limit.unwrap_or(log.general().default_limit) as usize;
    records.truncate(limit);
    Ok(records)
}
