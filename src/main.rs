//! # chat-segments
//!
//! Command-line front end for the segmentation engine: reads one assistant reply from a file or
//! stdin and prints its message groups as text, JSON, or boxed bubbles.

mod cli;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use chat_segments::core;
use cli::{Args, Commands};

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    match &args.command {
        Some(Commands::Config) => {
            core::cli::run_config();
            return;
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Args::command();
            cli::generate(*shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
            return;
        }
        None => {}
    }

    // Print user-friendly message; exit uses Display not Debug
    let config = core::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = run::run_segment(&args, config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
