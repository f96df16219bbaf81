use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::*;
use walkdir::WalkDir;

use crate::config::Config;
use crate::extract;
use crate::media;

static EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<title>.+?)[ ._-]+(?P<id>s(?P<season>\d{1,2})e(?P<episode>\d{1,3}))")
        .unwrap()
});

static MOVIE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<title>.+?)[ ._(]+(?P<year>19\d{2}|20\d{2})").unwrap());

/// Matched regex groups identifying a file as a TV episode. Season and
/// episode stay as source text until TvFile construction parses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowInfo {
    pub title: String,
    pub episode_id: String,
    pub season: String,
    pub episode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieInfo {
    pub title: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Tv(ShowInfo),
    Movie(MovieInfo),
}

pub fn classify(path: &Path) -> Option<Classified> {
    let name = path.file_stem()?.to_str()?;

    if let Some(caps) = EPISODE_RE.captures(name) {
        return Some(Classified::Tv(ShowInfo {
            title: clean_title(&caps["title"]),
            episode_id: caps["id"].to_owned(),
            season: caps["season"].to_owned(),
            episode: caps["episode"].to_owned(),
        }));
    }

    if let Some(caps) = MOVIE_RE.captures(name) {
        return Some(Classified::Movie(MovieInfo {
            title: clean_title(&caps["title"]),
            year: caps["year"].to_owned(),
        }));
    }

    None
}

fn clean_title(raw: &str) -> String {
    raw.replace(['.', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn scan(config: &Config, download_path: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = WalkDir::new(download_path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            // Remove files that start with '.'
            !entry.file_name().to_string_lossy().starts_with('.')
        })
        .map(|entry| entry.into_path())
        .filter(|path| {
            match path.extension().and_then(|x| x.to_str()) {
                // Special case for `.nfo` and `.txt`: these are never media files.
                Some("nfo" | "txt") => false,
                None => false,
                // Split volumes (.r00, ...) have no archive kind of their
                // own and fall through here.
                Some(ext) => {
                    media::is_video_extension(config, ext)
                        || extract::archive_kind(path).is_some()
                }
            }
        })
        .collect();
    entries.sort_unstable();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn classify_name(name: &str) -> Option<Classified> {
        classify(Path::new(name))
    }

    #[test]
    fn classifies_episodes() {
        let Some(Classified::Tv(info)) = classify_name("show.s01e02.mkv") else {
            panic!("expected a TV classification");
        };
        assert_eq!(info.title, "show");
        assert_eq!(info.episode_id, "s01e02");
        assert_eq!(info.season, "01");
        assert_eq!(info.episode, "02");
    }

    #[test]
    fn classifies_episodes_case_insensitively() {
        let Some(Classified::Tv(info)) = classify_name("The_Expanse_S03E01_1080p.mkv") else {
            panic!("expected a TV classification");
        };
        assert_eq!(info.title, "The Expanse");
        assert_eq!(info.episode_id, "S03E01");
        assert_eq!(info.season, "03");
        assert_eq!(info.episode, "01");
    }

    #[test]
    fn episode_token_wins_over_year() {
        let Some(Classified::Tv(info)) = classify_name("Show.2019.S02E05.720p.rar") else {
            panic!("expected a TV classification");
        };
        assert_eq!(info.title, "Show 2019");
        assert_eq!(info.episode_id, "S02E05");
    }

    #[test]
    fn classifies_movies() {
        let Some(Classified::Movie(info)) = classify_name("Some Movie (2019).mkv") else {
            panic!("expected a movie classification");
        };
        assert_eq!(info.title, "Some Movie");
        assert_eq!(info.year, "2019");

        let Some(Classified::Movie(info)) = classify_name("Some.Movie.2019.1080p.rar") else {
            panic!("expected a movie classification");
        };
        assert_eq!(info.title, "Some Movie");
        assert_eq!(info.year, "2019");
    }

    #[test]
    fn rejects_unrecognised_names() {
        assert_eq!(classify_name("holiday-clip.mkv"), None);
        assert_eq!(classify_name("s01e02.mkv"), None);
    }

    #[test]
    fn scan_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_tests(temp.path(), temp.path());

        for name in [
            "show.s01e02.mkv",
            "movie.2019.rar",
            "movie.2019.r00",
            ".hidden.mkv",
            "notes.txt",
            "release.nfo",
            "unknown.bin",
        ] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested/other.s02e01.mp4"), b"x").unwrap();

        let entries = scan(&config, temp.path());
        assert_eq!(
            entries,
            vec![
                temp.path().join("movie.2019.rar"),
                temp.path().join("nested/other.s02e01.mp4"),
                temp.path().join("show.s01e02.mkv"),
            ]
        );
    }
}
