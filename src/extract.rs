use std::path::Path;
use std::process::{Command, Stdio};

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use strum::Display;
use tracing::*;

use crate::media::PlaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArchiveKind {
    Rar,
    Zip,
    #[strum(serialize = "7z")]
    SevenZ,
}

impl ArchiveKind {
    pub fn tool(self) -> &'static str {
        match self {
            ArchiveKind::Rar => "unrar",
            ArchiveKind::Zip => "unzip",
            ArchiveKind::SevenZ => "7z",
        }
    }
}

pub fn archive_kind(path: &Path) -> Option<ArchiveKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "rar" => Some(ArchiveKind::Rar),
        "zip" => Some(ArchiveKind::Zip),
        "7z" => Some(ArchiveKind::SevenZ),
        _ => None,
    }
}

static SPLIT_VOLUME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[rR]\d{2}$").unwrap());

// RAR split volumes (.r00, .r01, ...) ride along with the main archive and
// are never extraction entry points themselves.
pub fn is_split_volume(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SPLIT_VOLUME_RE.is_match(ext))
}

pub fn extract(archive: &Path, dest_dir: &Path) -> Result<(), PlaceError> {
    let kind = archive_kind(archive).ok_or_else(|| PlaceError::UnknownArchive {
        path: archive.to_path_buf(),
    })?;

    let mut command = Command::new(kind.tool());
    match kind {
        ArchiveKind::Rar => {
            command.arg("x").arg("-o+").arg("-y").arg(archive).arg(dest_dir);
        }
        ArchiveKind::Zip => {
            command.arg("-o").arg("-q").arg(archive).arg("-d").arg(dest_dir);
        }
        ArchiveKind::SevenZ => {
            command
                .arg("x")
                .arg("-y")
                .arg(format!("-o{}", dest_dir.display()))
                .arg(archive);
        }
    }

    debug!(command = %render_command(&command), "Running extraction command");

    let output = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| PlaceError::Spawn {
            tool: kind.tool(),
            source,
        })?;

    if !output.status.success() {
        return Err(PlaceError::Extract {
            archive: archive.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    debug!(archive = ?archive, kind = %kind, "Extraction successful");

    Ok(())
}

fn render_command(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|arg| shell_escape::escape(arg.to_string_lossy()))
        .join(" ")
}
