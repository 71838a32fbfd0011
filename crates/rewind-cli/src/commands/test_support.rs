use std::sync::Arc;

use rewind_audit::AuditLog;
use rewind_config::GeneralConfig;
use rewind_core::{AuditAction, AuditContext, AuditRecord, Change, ChangeSet, EntityRef};
use rewind_lake::{KeyLayout, RewindLake};

use crate::cli::{GlobalFlags, OutputFormat};

pub fn flags(limit: Option<u32>) -> GlobalFlags {
    GlobalFlags {
        format: OutputFormat::Raw,
        limit,
        quiet: true,
        verbose: false,
        config: None,
    }
}

/// `Company#1` created as "Acme" then renamed twice: versions 1..=3.
pub async fn seeded_log() -> AuditLog {
    let store = Arc::new(RewindLake::in_memory(KeyLayout::default()));
    let log = AuditLog::new(store, GeneralConfig::default());
    let company = EntityRef::new("Company", 1);
    let ctx = AuditContext::new();

    let create = AuditRecord::new(
        &company,
        AuditAction::Create,
        ChangeSet::new().with("name", Change::created("Acme")),
    );
    log.record(&ctx, create).await.unwrap();
    for (old, new) in [("Acme", "Acme Corp"), ("Acme Corp", "Acme Inc")] {
        let update = AuditRecord::new(
            &company,
            AuditAction::Update,
            ChangeSet::new().with("name", Change::updated(old, new)),
        );
        log.record(&ctx, update).await.unwrap();
    }
    log
}
