//! Clap derive structures for the `shortdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// shortdeck -- dashboard for Shlink URL shortener servers
#[derive(Debug, Parser)]
#[command(
    name = "shortdeck",
    version,
    about = "Manage Shlink short URLs and domains from the command line",
    long_about = "A dashboard-style CLI for Shlink servers.\n\n\
        Keeps the short URL and domain collections in a local store and\n\
        reconciles them with every change instead of refetching.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 's', env = "SHORTDECK_SERVER", global = true)]
    pub server: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, env = "SHORTDECK_URL", global = true)]
    pub url: Option<String>,

    /// Shlink API key
    #[arg(long, env = "SHORTDECK_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "SHORTDECK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SHORTDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile and defaults)
    #[arg(long, env = "SHORTDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, create, edit and delete short URLs
    #[command(alias = "urls", alias = "su")]
    ShortUrls(ShortUrlsArgs),

    /// Inspect domains, probe their health and edit redirects
    #[command(alias = "dom")]
    Domains(DomainsArgs),

    /// Manage server profiles and settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Short URLs ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShortUrlsArgs {
    #[command(subcommand)]
    pub command: ShortUrlsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShortUrlsCommand {
    /// List one page of short URLs
    #[command(alias = "ls")]
    List {
        /// Page to fetch (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Items per page
        #[arg(long)]
        items_per_page: Option<u32>,

        /// Search term matched against code, URL and title
        #[arg(long)]
        search: Option<String>,

        /// Only short URLs carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Ordering, e.g. `dateCreated-DESC`
        #[arg(long)]
        order_by: Option<String>,
    },

    /// Shorten a long URL
    Create {
        /// Destination URL
        long_url: String,

        /// Custom short code
        #[arg(long)]
        slug: Option<String>,

        /// Domain to create the short URL on
        #[arg(long, short = 'd')]
        domain: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Maximum visits before the short URL stops redirecting
        #[arg(long)]
        max_visits: Option<u64>,
    },

    /// Edit an existing short URL
    Edit {
        short_code: String,

        /// Domain the short code lives on (default domain if omitted)
        #[arg(long, short = 'd')]
        domain: Option<String>,

        #[arg(long)]
        long_url: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Replace tags (repeatable)
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,

        #[arg(long)]
        max_visits: Option<u64>,

        #[arg(long)]
        crawlable: Option<bool>,
    },

    /// Delete a short URL
    #[command(alias = "rm")]
    Delete {
        short_code: String,

        /// Domain the short code lives on (default domain if omitted)
        #[arg(long, short = 'd')]
        domain: Option<String>,
    },
}

// ── Domains ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DomainsCommand {
    /// List domains
    #[command(alias = "ls")]
    List {
        /// Only show domains containing this text (case-insensitive)
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Probe every domain's health before printing
        #[arg(long)]
        validate: bool,
    },

    /// Probe one domain's health endpoint
    Check { domain: String },

    /// Set the not-found redirects of a domain
    Redirects {
        domain: String,

        /// Redirect for the domain's root path
        #[arg(long)]
        base_url: Option<String>,

        /// Redirect for any other unmatched path
        #[arg(long = "regular-404")]
        regular_404: Option<String>,

        /// Redirect for unknown short codes
        #[arg(long)]
        invalid_short_url: Option<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Add or replace a server profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Make this the default server
        #[arg(long)]
        default: bool,
    },

    /// Show the current configuration (secrets masked)
    Show,

    /// List configured servers
    Servers,

    /// Set the default server
    Use { name: String },

    /// Store a server's API key in the system keyring
    SetKey {
        /// Profile name (defaults to the active server)
        name: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
