use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::*;
use walkdir::WalkDir;

use crate::config::Config;
use crate::extract;
use crate::movie::MovieFile;
use crate::tv::TvFile;

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "mpg", "mpeg", "ts", "webm", "flv",
];

#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    #[error("{text:?} is not a number")]
    Parse {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("failed to create directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list directory {path:?}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {file:?} into {dest:?}")]
    Move {
        file: String,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run {tool}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("extraction of {archive:?} failed: {stderr}")]
    Extract { archive: PathBuf, stderr: String },

    #[error("{path:?} is not a recognised archive")]
    UnknownArchive { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Moved,
    Extracted,
    Skipped,
    Failed,
}

pub trait Placement {
    fn prepare_destination(&self) -> Result<(), PlaceError>;
    fn process(&self) -> Result<Outcome, PlaceError>;
}

pub enum Media<'a> {
    Tv(TvFile<'a>),
    Movie(MovieFile<'a>),
}

impl Media<'_> {
    pub fn file_name(&self) -> &str {
        match self {
            Media::Tv(tv) => tv.file_name(),
            Media::Movie(movie) => movie.file_name(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Media::Tv(tv) => tv.describe(),
            Media::Movie(movie) => movie.describe(),
        }
    }
}

impl Placement for Media<'_> {
    fn prepare_destination(&self) -> Result<(), PlaceError> {
        match self {
            Media::Tv(tv) => tv.prepare_destination(),
            Media::Movie(movie) => movie.prepare_destination(),
        }
    }

    fn process(&self) -> Result<Outcome, PlaceError> {
        match self {
            Media::Tv(tv) => tv.process(),
            Media::Movie(movie) => movie.process(),
        }
    }
}

/// Shared capabilities of a downloaded media file, independent of its
/// category.
#[derive(Debug)]
pub struct MediaFile<'a> {
    pub download_path: PathBuf,
    pub file_name: String,
    pub title: String,
    config: &'a Config,
}

impl<'a> MediaFile<'a> {
    pub fn new(config: &'a Config, download_path: PathBuf, title: String) -> Self {
        let file_name = download_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            download_path,
            file_name,
            title,
            config,
        }
    }

    pub fn has_video_extension(&self) -> bool {
        match self.download_path.extension().and_then(|e| e.to_str()) {
            Some(ext) => is_video_extension(self.config, ext),
            None => false,
        }
    }

    pub fn capacity_reached(&self) -> bool {
        let Some(limit) = self.config.capacity_limit else {
            return false;
        };
        let used = share_usage(&self.config.share_path);
        trace!(used, limit, "Checked share usage");
        used >= limit
    }

    pub fn move_media(&self, dest_dir: &Path) -> Result<(), PlaceError> {
        let dest = dest_dir.join(&self.file_name);
        info!(file = %self.file_name, dest = ?dest_dir, "Moving media file");
        match fs::rename(&self.download_path, &dest) {
            Ok(()) => Ok(()),
            // The share is routinely a different filesystem from the
            // download directory; rename fails with EXDEV there.
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) => {
                fs::copy(&self.download_path, &dest).map_err(|source| PlaceError::Move {
                    file: self.file_name.clone(),
                    dest: dest_dir.to_path_buf(),
                    source,
                })?;
                fs::remove_file(&self.download_path).map_err(|source| PlaceError::Move {
                    file: self.file_name.clone(),
                    dest: dest_dir.to_path_buf(),
                    source,
                })?;
                Ok(())
            }
            Err(source) => Err(PlaceError::Move {
                file: self.file_name.clone(),
                dest: dest_dir.to_path_buf(),
                source,
            }),
        }
    }

    pub fn extract_media(&self, dest_dir: &Path) -> Result<(), PlaceError> {
        info!(file = %self.file_name, dest = ?dest_dir, "Extracting archive");
        extract::extract(&self.download_path, dest_dir)?;
        self.cleanup_archive();
        Ok(())
    }

    // Files are already placed at this point, so cleanup failures are only
    // worth a warning.
    fn cleanup_archive(&self) {
        if let Err(e) = fs::remove_file(&self.download_path) {
            warn!(file = %self.file_name, error = %e, "Failed to remove archive");
            return;
        }
        let Some(parent) = self.download_path.parent() else {
            return;
        };
        let Some(stem) = self.download_path.file_stem() else {
            return;
        };
        let Ok(entries) = fs::read_dir(parent) else {
            return;
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.file_stem() == Some(stem) && extract::is_split_volume(&path) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(file = ?path, error = %e, "Failed to remove split volume");
                }
            }
        }
    }
}

pub fn is_video_extension(config: &Config, ext: &str) -> bool {
    match &config.video_extensions {
        Some(extensions) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
    }
}

// Accumulated size of regular files under the share. Unreadable entries
// contribute nothing.
pub fn share_usage(share: &Path) -> u64 {
    WalkDir::new(share)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

pub fn list_names(dir: &Path) -> Result<Vec<String>, PlaceError> {
    let entries = fs::read_dir(dir).map_err(|source| PlaceError::List {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PlaceError::List {
            path: dir.to_path_buf(),
            source,
        })?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
