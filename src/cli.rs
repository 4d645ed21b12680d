use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "logbuf")]
#[command(about = "Retention-bounded persistent log buffer", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $LOGBUF_CONFIG or config/logbuf.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route tracing events into the buffer and print what was retained
    Demo(DemoArgs),
    /// Append entries to the buffer
    Write(WriteArgs),
    /// Print retained entries, oldest first
    Dump(DumpArgs),
    /// Delete every entry and the store itself
    Clear,
}

#[derive(clap::Args, Debug)]
pub struct DemoArgs {
    /// Keep the buffered entries instead of clearing them on exit
    #[arg(long)]
    pub keep: bool,
}

#[derive(clap::Args, Debug)]
pub struct WriteArgs {
    /// Entries to append; read from stdin line by line when omitted
    pub lines: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct DumpArgs {
    /// Prefix each entry with its RFC 3339 timestamp
    #[arg(long)]
    pub timestamps: bool,
}
