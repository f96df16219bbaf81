mod config;
mod extract;
mod input;
mod interface;
mod media;
mod movie;
mod tv;
mod util;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use itertools::Itertools;
use once_cell::sync::Lazy;
use question::Answer;
use tracing::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::input::Classified;
use crate::media::{Media, Outcome, Placement};

static ARGS: Lazy<interface::Args> = Lazy::new(interface::Args::parse);

pub type Result<T, E = color_eyre::eyre::Report> = std::result::Result<T, E>;

fn main() -> Result<()> {
    color_eyre::install()?;

    let default_level = if ARGS.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    debug!(?ARGS);

    let config = Config::load(&ARGS.config)
        .wrap_err_with(|| format!("Cannot load configuration from {:?}", ARGS.config))?;

    debug!(?config);

    let download_path = ARGS.path.as_ref().unwrap_or(&config.download_path);
    if !download_path.is_dir() {
        error!(path = ?download_path, "Download path must be a directory");
        std::process::exit(1);
    }

    let entries = input::scan(&config, download_path);

    debug!(?entries);

    if entries.is_empty() {
        info!("No media files to transport");
        return Ok(());
    }

    let mut batch = Vec::with_capacity(entries.len());
    for path in entries {
        let Some(classified) = input::classify(&path) else {
            info!(file = ?path, "Unrecognised media file name, skipping");
            continue;
        };
        let media = match classified {
            Classified::Tv(show_info) => tv::TvFile::new(&config, path, show_info).map(Media::Tv),
            Classified::Movie(movie_info) => {
                movie::MovieFile::new(&config, path, movie_info).map(Media::Movie)
            }
        };
        match media {
            Ok(media) => batch.push(media),
            Err(e) => warn!(error = %e, "Skipping file"),
        }
    }

    for media in &batch {
        println!("{}", media.describe());
    }
    println!();

    if ARGS.simulate {
        eprintln!("Simulate mode; not moving any files");
        return Ok(());
    }

    if !ARGS.yes && !util::confirm("Continue?", Some(Answer::YES)) {
        eprintln!("Aborting");
        return Ok(());
    }

    // One file to completion before the next; a failure only loses that
    // file, not the batch.
    let mut outcomes = Vec::with_capacity(batch.len());
    for media in &batch {
        if let Err(e) = media.prepare_destination() {
            error!(file = %media.file_name(), error = %e, "Failed to prepare destination");
            outcomes.push(Outcome::Failed);
            continue;
        }
        match media.process() {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                error!(file = %media.file_name(), error = %e, "Failed to place file");
                outcomes.push(Outcome::Failed);
            }
        }
    }

    let counts = outcomes.iter().copied().counts();
    info!(
        moved = counts.get(&Outcome::Moved).copied().unwrap_or(0),
        extracted = counts.get(&Outcome::Extracted).copied().unwrap_or(0),
        skipped = counts.get(&Outcome::Skipped).copied().unwrap_or(0),
        failed = counts.get(&Outcome::Failed).copied().unwrap_or(0),
        "Transport complete"
    );

    Ok(())
}
