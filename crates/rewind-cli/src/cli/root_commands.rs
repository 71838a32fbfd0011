use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Print the object-store key a record would be filed under.
    Key(KeyArgs),
    /// List a subject's audits.
    Log(LogArgs),
    /// Reconstruct a subject at a version or point in time.
    Revision(RevisionArgs),
    /// Count audits matching field=value criteria.
    Count(CountArgs),
    /// Write a subject's audits as JSON Lines.
    Export(ExportArgs),
    /// Print the audit record JSON Schema.
    Schema,
    /// Print the effective configuration.
    Config(ConfigArgs),
}

/// Arguments for `rwd key`.
#[derive(Clone, Debug, Args)]
pub struct KeyArgs {
    /// Audited entity as `Type#id` (e.g. `Company#42`, `Draft#?`).
    pub subject: String,

    /// Entity the record is filed under, as `Type#id`.
    #[arg(long)]
    pub associated: Option<String>,
}

/// Arguments for `rwd log`.
#[derive(Clone, Debug, Args)]
pub struct LogArgs {
    /// Subject as `Type#id`.
    pub subject: String,

    /// Entity the subject's type files its audits under, as `Type#id`.
    #[arg(long)]
    pub filed_under: Option<String>,

    /// Newest version first.
    #[arg(long)]
    pub descending: bool,

    /// Only audits created at or before this time (`YYYY-MM-DD HH:MM:SS` or RFC 3339).
    #[arg(long)]
    pub up_until: Option<String>,

    /// List audits of other subjects filed under this one instead.
    #[arg(long, conflicts_with = "with_associated")]
    pub associated: bool,

    /// Merge own and associated audits, newest first.
    #[arg(long)]
    pub with_associated: bool,
}

/// Arguments for `rwd revision`.
#[derive(Clone, Debug, Args)]
pub struct RevisionArgs {
    /// Subject as `Type#id`.
    pub subject: String,

    /// Audit version to reconstruct.
    #[arg(long, conflicts_with = "at")]
    pub version: Option<u32>,

    /// Reconstruct as of this time.
    #[arg(long)]
    pub at: Option<String>,

    /// Entity the subject's type files its audits under, as `Type#id`.
    #[arg(long)]
    pub filed_under: Option<String>,
}

/// Arguments for `rwd count`.
#[derive(Clone, Debug, Args)]
pub struct CountArgs {
    /// Criteria as `field=value` pairs; values are read as JSON, else as text.
    pub criteria: Vec<String>,
}

/// Arguments for `rwd export`.
#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// Subject as `Type#id`.
    pub subject: String,

    /// Destination `.jsonl` file.
    #[arg(short, long)]
    pub output: String,

    /// Entity the subject's type files its audits under, as `Type#id`.
    #[arg(long)]
    pub filed_under: Option<String>,
}

/// Arguments for `rwd config`.
#[derive(Clone, Debug, Args)]
pub struct ConfigArgs {
    /// Print as TOML instead of the global output format.
    #[arg(long)]
    pub toml: bool,

    /// Include credentials instead of masking them.
    #[arg(long)]
    pub show_secrets: bool,
}
