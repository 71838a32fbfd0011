use clap::Parser;

pub mod global;
pub mod parse;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `rwd` binary.
#[derive(Debug, Parser)]
#[command(name = "rwd", version, about = "Rewind - audit trail inspection and time travel")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file layered above the user-global one
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["rwd", "--format", "raw", "--limit", "10", "schema"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(cli.limit, Some(10));
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["rwd", "log", "Company#1", "--descending", "--quiet"])
            .expect("cli should parse");

        assert!(cli.quiet);
        let Commands::Log(args) = cli.command else {
            panic!("expected log command");
        };
        assert_eq!(args.subject, "Company#1");
        assert!(args.descending);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["rwd", "--format", "xml", "schema"]).is_err());
    }

    #[test]
    fn revision_version_and_time_conflict() {
        let parsed = Cli::try_parse_from([
            "rwd",
            "revision",
            "Company#1",
            "--version",
            "2",
            "--at",
            "2026-01-01 00:00:00",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn count_collects_criteria_pairs() {
        let cli = Cli::try_parse_from(["rwd", "count", "action=update", "version=2"])
            .expect("cli should parse");
        let Commands::Count(args) = cli.command else {
            panic!("expected count command");
        };
        assert_eq!(args.criteria, vec!["action=update", "version=2"]);
    }
}
