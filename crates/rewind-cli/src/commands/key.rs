use rewind_config::{RewindConfig, StorageOptions};
use rewind_core::{AuditAction, AuditRecord, ChangeSet};
use rewind_lake::KeyLayout;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::parse::{parse_entity, parse_optional_entity};
use crate::cli::root_commands::KeyArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
struct KeyResponse {
    key: String,
    partitioned: bool,
}

/// Handle `rwd key`. Resolves offline from `[storage.options]`.
pub fn handle(args: &KeyArgs, config: &RewindConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = resolve(args, &config.storage.options)?;
    output(&response, flags.format)
}

fn resolve(args: &KeyArgs, options: &StorageOptions) -> anyhow::Result<KeyResponse> {
    let subject = parse_entity(&args.subject)?;
    let mut record = AuditRecord::new(&subject, AuditAction::Update, ChangeSet::new());
    if let Some(associated) = parse_optional_entity(args.associated.as_deref())? {
        record = record.with_associated(&associated);
    }

    let layout = KeyLayout::from_options(options);
    Ok(KeyResponse {
        key: layout.resolve_key(&record),
        partitioned: layout.partition,
    })
}
