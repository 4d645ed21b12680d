mod cli;
mod demo;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands, DumpArgs, WriteArgs};
use logbuf::buffer::LogBuffer;
use logbuf::config::Config;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    // The demo installs its own tee subscriber
    if !matches!(cli.command, Commands::Demo(_)) {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }

    let buffer = LogBuffer::from_config(&config.buffer)?;

    match cli.command {
        Commands::Demo(args) => {
            let level = config.logging.level().unwrap_or(Level::INFO);
            let entries = demo::run(Arc::new(buffer), level, args.keep)?;
            println!("\nBuffered entries:");
            for entry in entries {
                println!("{entry}");
            }
        }
        Commands::Write(args) => write_entries(&buffer, args)?,
        Commands::Dump(args) => dump_entries(&buffer, args)?,
        Commands::Clear => buffer.clear()?,
    }

    Ok(())
}

fn write_entries(
    buffer: &LogBuffer,
    args: WriteArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !args.lines.is_empty() {
        for line in &args.lines {
            buffer.write_str(line)?;
        }
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        buffer.write_str(&line?)?;
    }
    Ok(())
}

fn dump_entries(
    buffer: &LogBuffer,
    args: DumpArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut out = io::stdout().lock();
    for entry in buffer.entries()? {
        if args.timestamps {
            writeln!(out, "{} {}", entry.recorded_at().to_rfc3339(), entry.text())?;
        } else {
            writeln!(out, "{}", entry.text())?;
        }
    }
    Ok(())
}
