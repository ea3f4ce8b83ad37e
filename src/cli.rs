//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  chat-segments reply.md                  Segment a file, print segments as text
  cat reply.md | chat-segments            Read the message from stdin
  chat-segments -f json reply.md          Print groups as JSON
  chat-segments -f bubbles -w 60 reply.md Draw one box per bubble
  chat-segments --raw reply.md            Disable splitting, print trimmed input
  chat-segments config                    Show config file and effective settings
  chat-segments completions bash          Generate bash completions
";

/// Output format for segmented messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Segments separated by blank lines, groups by `---`
    Text,
    /// Array of groups, each an array of { kind, text }
    Json,
    /// One box per segment
    Bubbles,
}

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Split assistant chat replies into renderable message bubbles",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Message file to segment (stdin when omitted or '-')
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Bubble width in columns (overrides config)
    #[arg(short = 'w', long)]
    pub width: Option<usize>,

    /// Disable splitting and return the trimmed message as one segment
    #[arg(long)]
    pub raw: bool,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show config file path and effective settings
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
