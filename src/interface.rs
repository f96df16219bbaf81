use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "MediaTransporter", version)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "/etc/mediatransporter.json")]
    pub config: PathBuf,

    /// Do not create directories or move any files
    #[arg(short, long)]
    pub simulate: bool,

    /// Skip the confirmation prompt
    #[arg(short, long, conflicts_with = "simulate")]
    pub yes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Operate on this directory instead of the configured download path
    pub path: Option<PathBuf>,
}
