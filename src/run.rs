//! Application run modes: logger init, message segmentation.

use std::io::{self, Read, Write};
use std::path::Path;

use chat_segments::core::config::Config;
use chat_segments::core::render;
use chat_segments::segment_bytes;

use crate::cli::{Args, OutputFormat};

/// Initialize env_logger. Logs go to stderr so stdout carries only the rendered output.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    logger.target(env_logger::Target::Stderr);
    let _ = logger.try_init();
}

fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read(p),
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Segment one message from a file or stdin and print it in the requested format.
pub fn run_segment(args: &Args, mut config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if args.raw {
        config.segment.enabled = false;
    }
    if let Some(width) = args.width {
        if width == 0 {
            return Err("width must be greater than 0".into());
        }
        config.width = width;
    }

    let bytes = read_input(args.input.as_deref()).map_err(|e| match &args.input {
        Some(p) => format!("cannot read {}: {}", p.display(), e),
        None => format!("cannot read stdin: {}", e),
    })?;
    log::info!("read {} bytes", bytes.len());

    let groups = segment_bytes(&bytes, &config.segment)?;

    let out = match args.format {
        OutputFormat::Json => render::render_json(&groups)?,
        OutputFormat::Text => render::render_text(&groups),
        OutputFormat::Bubbles => render::render_bubbles(&groups, config.width),
    };

    if out.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    if !out.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
