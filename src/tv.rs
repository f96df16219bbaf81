use std::fs;
use std::path::{Path, PathBuf};

use tracing::*;

use crate::config::Config;
use crate::input::ShowInfo;
use crate::media::{self, MediaFile, Outcome, PlaceError, Placement};

/// A downloaded TV episode and its destination on the media share.
///
/// Both destination paths are fixed at construction, before any filesystem
/// mutation.
#[derive(Debug)]
pub struct TvFile<'a> {
    media: MediaFile<'a>,
    episode_id: String,
    season: u32,
    episode: u32,
    tv_root_path: PathBuf,
    tv_season_path: PathBuf,
}

impl<'a> TvFile<'a> {
    pub fn new(
        config: &'a Config,
        download_path: PathBuf,
        info: ShowInfo,
    ) -> Result<Self, PlaceError> {
        let season = info.season.parse().map_err(|source| PlaceError::Parse {
            text: info.season.clone(),
            source,
        })?;
        let episode = info.episode.parse().map_err(|source| PlaceError::Parse {
            text: info.episode.clone(),
            source,
        })?;
        let media = MediaFile::new(config, download_path, info.title);
        let tv_root_path = config.tv_root_path(&media.title);
        let tv_season_path = config.tv_season_path(&media.title, season);
        Ok(Self {
            media,
            episode_id: info.episode_id,
            season,
            episode,
            tv_root_path,
            tv_season_path,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.media.file_name
    }

    pub fn tv_root_path(&self) -> &Path {
        &self.tv_root_path
    }

    pub fn tv_season_path(&self) -> &Path {
        &self.tv_season_path
    }

    pub fn describe(&self) -> String {
        format!(
            "'{}' -> '{}'",
            self.media.file_name,
            self.tv_season_path.display()
        )
    }
}

impl Placement for TvFile<'_> {
    fn prepare_destination(&self) -> Result<(), PlaceError> {
        if self.tv_root_path.is_dir() {
            // Existing shows still obey the capacity limit for new seasons.
            if self.media.capacity_reached() {
                warn!(
                    title = %self.media.title,
                    season = self.season,
                    "Capacity reached, skipping new season"
                );
            } else if !self.tv_season_path.is_dir() {
                info!(
                    title = %self.media.title,
                    season = self.season,
                    "Creating season folder"
                );
                fs::create_dir(&self.tv_season_path).map_err(|source| PlaceError::CreateDir {
                    path: self.tv_season_path.clone(),
                    source,
                })?;
            }
        } else if self.media.capacity_reached() {
            warn!(title = %self.media.title, "Capacity reached, skipping new show");
        } else {
            info!(title = %self.media.title, "Adding TV show");
            fs::create_dir_all(&self.tv_season_path).map_err(|source| PlaceError::CreateDir {
                path: self.tv_season_path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn process(&self) -> Result<Outcome, PlaceError> {
        // Absence is the only condition answered by creation; listing
        // faults on an existing directory propagate below.
        if !self.tv_season_path.is_dir() {
            fs::create_dir_all(&self.tv_season_path).map_err(|source| PlaceError::CreateDir {
                path: self.tv_season_path.clone(),
                source,
            })?;
        }

        let existing_episodes = media::list_names(&self.tv_season_path)?;

        let episode_id = self.episode_id.to_lowercase();
        if let Some(existing) = existing_episodes
            .iter()
            .find(|name| name.to_lowercase().contains(&episode_id))
        {
            info!(
                title = %self.media.title,
                season = self.season,
                episode = self.episode,
                existing = %existing,
                "Episode already exists, skipping"
            );
            return Ok(Outcome::Skipped);
        }

        if self.media.has_video_extension() {
            self.media.move_media(&self.tv_season_path)?;
            Ok(Outcome::Moved)
        } else {
            self.media.extract_media(&self.tv_season_path)?;
            Ok(Outcome::Extracted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn show_info(season: &str, episode: &str) -> ShowInfo {
        ShowInfo {
            title: "Some Show".to_owned(),
            episode_id: format!("S{season}E{episode}"),
            season: season.to_owned(),
            episode: episode.to_owned(),
        }
    }

    fn tv_file<'a>(config: &'a Config, download: &Path) -> TvFile<'a> {
        let source = download.join("some.show.s01e02.mkv");
        TvFile::new(config, source, show_info("01", "02")).unwrap()
    }

    #[test]
    fn parses_season_and_episode() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());
        let tv = tv_file(&config, temp.path());
        assert_eq!(tv.season, 1);
        assert_eq!(tv.episode, 2);
    }

    #[test]
    fn construction_fails_on_non_numeric_text() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());
        let result = TvFile::new(
            &config,
            temp.path().join("bad.mkv"),
            show_info("xx", "02"),
        );
        assert!(matches!(result, Err(PlaceError::Parse { .. })));
    }

    #[test]
    fn season_path_extends_root_path() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());
        let tv = tv_file(&config, temp.path());
        assert!(tv.tv_season_path().starts_with(tv.tv_root_path()));
        assert_eq!(
            tv.tv_season_path(),
            temp.path().join("Some Show").join("Season 1")
        );
    }

    #[test]
    fn prepare_creates_full_tree_for_new_show() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());
        let tv = tv_file(&config, temp.path());

        tv.prepare_destination().unwrap();
        assert!(tv.tv_season_path().is_dir());
    }

    #[test]
    fn prepare_creates_season_folder_for_existing_show() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());
        let tv = tv_file(&config, temp.path());

        fs::create_dir_all(tv.tv_root_path()).unwrap();
        tv.prepare_destination().unwrap();
        assert!(tv.tv_season_path().is_dir());
    }

    #[test]
    fn prepare_skips_new_show_at_capacity() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::for_tests(temp.path(), temp.path());
        config.capacity_limit = Some(0);
        let tv = tv_file(&config, temp.path());

        tv.prepare_destination().unwrap();
        assert!(!tv.tv_root_path().exists());
        assert!(!tv.tv_season_path().exists());
    }

    #[test]
    fn prepare_skips_new_season_at_capacity() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::for_tests(temp.path(), temp.path());
        config.capacity_limit = Some(0);
        let tv = tv_file(&config, temp.path());

        fs::create_dir_all(tv.tv_root_path()).unwrap();
        tv.prepare_destination().unwrap();
        assert!(!tv.tv_season_path().exists());
    }

    #[test]
    fn process_skips_existing_episode() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());

        let source = temp.path().join("some.show.s01e02.mkv");
        fs::write(&source, b"video").unwrap();
        let tv = TvFile::new(&config, source.clone(), show_info("01", "02")).unwrap();

        // Same episode under a different release name and case.
        fs::create_dir_all(tv.tv_season_path()).unwrap();
        fs::write(
            tv.tv_season_path().join("Some.Show.S01E02.720p.mkv"),
            b"old",
        )
        .unwrap();

        assert_eq!(tv.process().unwrap(), Outcome::Skipped);
        assert!(source.exists());
    }

    #[test]
    fn process_moves_into_empty_season() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());

        let source = temp.path().join("some.show.s01e02.mkv");
        fs::write(&source, b"video").unwrap();
        let tv = TvFile::new(&config, source.clone(), show_info("01", "02")).unwrap();

        fs::create_dir_all(tv.tv_season_path()).unwrap();
        assert_eq!(tv.process().unwrap(), Outcome::Moved);
        assert!(!source.exists());
        assert!(tv.tv_season_path().join("some.show.s01e02.mkv").is_file());
    }

    #[test]
    fn process_creates_absent_season_directory() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());

        let source = temp.path().join("some.show.s01e02.mkv");
        fs::write(&source, b"video").unwrap();
        let tv = TvFile::new(&config, source, show_info("01", "02")).unwrap();

        assert_eq!(tv.process().unwrap(), Outcome::Moved);
        assert!(tv.tv_season_path().join("some.show.s01e02.mkv").is_file());
    }
}
