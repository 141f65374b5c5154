use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "queryroute",
    about = "Route search queries to !bang redirects, instant answers or search"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Settings file (defaults to queryroute.toml in the data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Route a query: bang redirect, instant answer, or plain search
    Route(RouteArgs),
    /// Resolve a !bang query to its redirect URL
    Bang(BangArgs),
    /// Autocomplete bang triggers
    Suggest(SuggestArgs),
    /// Rebuild the bang suggester index
    Index,
    /// Inspect the bang registry
    Bangs {
        #[command(subcommand)]
        action: BangsAction,
    },
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Route --

#[derive(Debug, Parser)]
pub struct RouteArgs {
    /// The raw query
    pub query: String,

    /// Two-letter region code (e.g. ca, FR)
    #[arg(short, long, default_value = "")]
    pub region: String,

    /// Language tag (defaults to the configured default language)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// User agent to report to answerers
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Bang --

#[derive(Debug, Parser)]
pub struct BangArgs {
    /// The raw query, e.g. "!g rust traits"
    pub query: String,

    /// Two-letter region code (e.g. ca, FR)
    #[arg(short, long, default_value = "")]
    pub region: String,

    /// Language tag (defaults to the configured default language)
    #[arg(short, long)]
    pub lang: Option<String>,
}

// -- Suggest --

#[derive(Debug, Parser)]
pub struct SuggestArgs {
    /// Trigger prefix
    pub term: String,

    /// Number of suggestions (defaults to the configured size)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

// -- Bangs subcommands --

#[derive(Debug, Subcommand)]
pub enum BangsAction {
    /// List every bang with its triggers and regions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report triggers claimed by more than one bang
    Check,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "queryroute",
            &mut std::io::stdout(),
        );
    }
}
