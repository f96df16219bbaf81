use std::fs;
use std::path::{Path, PathBuf};

use tracing::*;

use crate::config::Config;
use crate::input::MovieInfo;
use crate::media::{self, MediaFile, Outcome, PlaceError, Placement};

#[derive(Debug)]
pub struct MovieFile<'a> {
    media: MediaFile<'a>,
    year: u32,
    movie_path: PathBuf,
}

impl<'a> MovieFile<'a> {
    pub fn new(
        config: &'a Config,
        download_path: PathBuf,
        info: MovieInfo,
    ) -> Result<Self, PlaceError> {
        let year = info.year.parse().map_err(|source| PlaceError::Parse {
            text: info.year.clone(),
            source,
        })?;
        let media = MediaFile::new(config, download_path, info.title);
        let movie_path = config.movie_path(&media.title, year);
        Ok(Self {
            media,
            year,
            movie_path,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.media.file_name
    }

    pub fn movie_path(&self) -> &Path {
        &self.movie_path
    }

    pub fn describe(&self) -> String {
        format!(
            "'{}' -> '{}'",
            self.media.file_name,
            self.movie_path.display()
        )
    }
}

impl Placement for MovieFile<'_> {
    fn prepare_destination(&self) -> Result<(), PlaceError> {
        if self.movie_path.is_dir() {
            return Ok(());
        }
        if self.media.capacity_reached() {
            warn!(title = %self.media.title, "Capacity reached, skipping new movie");
        } else {
            info!(title = %self.media.title, year = self.year, "Adding movie");
            fs::create_dir_all(&self.movie_path).map_err(|source| PlaceError::CreateDir {
                path: self.movie_path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn process(&self) -> Result<Outcome, PlaceError> {
        if !self.movie_path.is_dir() {
            fs::create_dir_all(&self.movie_path).map_err(|source| PlaceError::CreateDir {
                path: self.movie_path.clone(),
                source,
            })?;
        }

        let existing = media::list_names(&self.movie_path)?;

        let title = self.media.title.to_lowercase();
        if let Some(existing) = existing
            .iter()
            .find(|name| name.to_lowercase().contains(&title))
        {
            info!(
                title = %self.media.title,
                year = self.year,
                existing = %existing,
                "Movie already exists, skipping"
            );
            return Ok(Outcome::Skipped);
        }

        if self.media.has_video_extension() {
            self.media.move_media(&self.movie_path)?;
            Ok(Outcome::Moved)
        } else {
            self.media.extract_media(&self.movie_path)?;
            Ok(Outcome::Extracted)
        }
    }
}
