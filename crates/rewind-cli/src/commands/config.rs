use rewind_config::RewindConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ConfigArgs;
use crate::output::output;

const MASK: &str = "********";

/// Handle `rwd config`.
pub fn handle(args: &ConfigArgs, config: &RewindConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let shown = if args.show_secrets {
        config.clone()
    } else {
        masked(config)
    };

    if args.toml {
        print!("{}", toml::to_string_pretty(&shown)?);
        return Ok(());
    }
    output(&shown, flags.format)
}

fn masked(config: &RewindConfig) -> RewindConfig {
    let mut config = config.clone();
    for secret in [
        &mut config.storage.options.secret_key,
        &mut config.storage.database.auth_token,
    ] {
        if !secret.is_empty() {
            *secret = MASK.to_string();
        }
    }
    config
}
