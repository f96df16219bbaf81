use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_tv_root_template() -> String {
    "{share}/{title}".to_owned()
}

fn default_tv_season_template() -> String {
    "{share}/{title}/Season {season}".to_owned()
}

fn default_movie_template() -> String {
    "{share}/{title} ({year})".to_owned()
}

/// Runtime configuration, read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub download_path: PathBuf,
    pub share_path: PathBuf,

    #[serde(default = "default_tv_root_template")]
    pub tv_root_template: String,

    #[serde(default = "default_tv_season_template")]
    pub tv_season_template: String,

    #[serde(default = "default_movie_template")]
    pub movie_template: String,

    /// Byte budget for the share. Absent means unlimited.
    #[serde(default)]
    pub capacity_limit: Option<u64>,

    /// Overrides the built-in list of playable extensions.
    #[serde(default)]
    pub video_extensions: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file")]
    Parse(#[from] serde_json::Error),

    #[error("tv_season_template {season:?} does not extend tv_root_template {root:?}")]
    TemplateMismatch { root: String, season: String },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    // The season path must stay a strict path-extension of the root path,
    // which holds whenever the templates share a prefix.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.tv_season_template.starts_with(&self.tv_root_template) {
            return Err(ConfigError::TemplateMismatch {
                root: self.tv_root_template.clone(),
                season: self.tv_season_template.clone(),
            });
        }
        Ok(())
    }

    pub fn tv_root_path(&self, title: &str) -> PathBuf {
        PathBuf::from(self.render(&self.tv_root_template, title, None, None))
    }

    pub fn tv_season_path(&self, title: &str, season: u32) -> PathBuf {
        PathBuf::from(self.render(&self.tv_season_template, title, Some(season), None))
    }

    pub fn movie_path(&self, title: &str, year: u32) -> PathBuf {
        PathBuf::from(self.render(&self.movie_template, title, None, Some(year)))
    }

    fn render(&self, template: &str, title: &str, season: Option<u32>, year: Option<u32>) -> String {
        let mut rendered = template
            .replace("{share}", &self.share_path.to_string_lossy())
            .replace("{title}", title);
        if let Some(season) = season {
            rendered = rendered.replace("{season}", &season.to_string());
        }
        if let Some(year) = year {
            rendered = rendered.replace("{year}", &year.to_string());
        }
        rendered
    }

    #[cfg(test)]
    pub(crate) fn for_tests(share: &Path, download: &Path) -> Self {
        Self {
            download_path: download.to_path_buf(),
            share_path: share.to_path_buf(),
            tv_root_template: default_tv_root_template(),
            tv_season_template: default_tv_season_template(),
            movie_template: default_movie_template(),
            capacity_limit: None,
            video_extensions: None,
        }
    }
}
