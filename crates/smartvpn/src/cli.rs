//! Clap derive structures for the `smartvpn` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smartvpn -- inspect and drive a Smart VPN backend
#[derive(Debug, Parser)]
#[command(
    name = "smartvpn",
    version,
    about = "Inspect and control a Smart VPN backend from the command line",
    long_about = "Shows connection status, servers, routing rules and connection history\n\
        from a Smart VPN management backend, and connects or disconnects the tunnel.",
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
    /// Backend base URL (overrides config)
    #[arg(long, short = 'b', env = "SMARTVPN_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, env = "SMARTVPN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
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
    /// YAML
    Yaml,
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
    /// Show connection status and headline counts
    #[command(alias = "home")]
    Status,

    /// List VPN servers, marking the connected one
    #[command(alias = "ls")]
    Servers,

    /// List routing rules
    Rules,

    /// Show connection history
    History,

    /// Disconnect if connected, otherwise connect to the first server
    Toggle,

    /// Connect to a specific server
    Connect {
        /// Server ID as listed by `smartvpn servers`
        server_id: String,
    },

    /// Disconnect the tunnel
    Disconnect,

    /// Keep a screen mounted and print every refresh
    Watch(WatchArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Screen to watch: home, servers, rules or history
    #[arg(long, short = 's', default_value = "home")]
    pub screen: String,

    /// Stop after this many refreshes (default: until interrupted)
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display the resolved configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
