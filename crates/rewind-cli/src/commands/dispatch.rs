use anyhow::Context;
use rewind_audit::AuditLog;
use rewind_config::RewindConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to its handler module.
///
/// `key` and `config` never touch a backend; the rest open the configured store.
pub async fn dispatch(
    command: Commands,
    config: &RewindConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Key(args) => commands::key::handle(&args, config, flags),
        Commands::Config(args) => commands::config::handle(&args, config, flags),
        Commands::Schema => commands::schema::handle(flags),
        Commands::Log(args) => commands::log::handle(&args, &open(config).await?, flags).await,
        Commands::Revision(args) => {
            commands::revision::handle(&args, &open(config).await?, flags).await
        }
        Commands::Count(args) => commands::count::handle(&args, &open(config).await?, flags).await,
        Commands::Export(args) => {
            commands::export::handle(&args, &open(config).await?, flags).await
        }
    }
}

async fn open(config: &RewindConfig) -> anyhow::Result<AuditLog> {
    AuditLog::open(config).await.with_context(|| {
        format!(
            "failed to open {} audit store",
            config.storage.mechanism.as_str()
        )
    })
}
