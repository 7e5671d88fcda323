//! src/audio/mod.rs
//! ============================================================================
//! # Audio collaborator
//!
//! The navigator never decodes audio itself. Everything it needs from a codec
//! stack goes through [`AudioBackend`]; the shipped implementation shells out
//! to ffmpeg/ffprobe (see [`ffmpeg`]).

pub mod ffmpeg;

#[cfg(test)]
pub mod mock;

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::error::AppError;
use crate::fs::entry::Entry;

pub use ffmpeg::FfmpegBackend;

/// Tag name → value, plus technical fields for analysis reports.
pub type MetadataMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    M4a,
    Ogg,
    Aac,
}

impl AudioFormat {
    pub const ALL: [Self; 6] = [
        Self::Mp3,
        Self::Wav,
        Self::Flac,
        Self::M4a,
        Self::Ogg,
        Self::Aac,
    ];

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
            Self::Aac => "aac",
        }
    }

    /// Case-insensitive match on a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(OsStr::to_str)
            .and_then(Self::from_extension)
    }

    /// Lossy targets honour the quality (kbps) setting.
    #[must_use]
    pub const fn is_lossy(self) -> bool {
        matches!(self, Self::Mp3 | Self::M4a | Self::Ogg | Self::Aac)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Wav => "WAV",
            Self::Flac => "FLAC",
            Self::M4a => "M4A",
            Self::Ogg => "OGG",
            Self::Aac => "AAC",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tag used to pick a destination folder when organizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganizeKey {
    Artist,
    Album,
    Genre,
    Year,
}

impl OrganizeKey {
    pub const ALL: [Self; 4] = [Self::Artist, Self::Album, Self::Genre, Self::Year];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::Genre => "Genre",
            Self::Year => "Year",
        }
    }

    /// Key in a [`MetadataMap`].
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Genre => "genre",
            Self::Year => "year",
        }
    }

    #[must_use]
    pub fn unknown_folder(self) -> String {
        format!("Unknown {}", self.label())
    }
}

impl fmt::Display for OrganizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keep alphanumerics, space, `-` and `_`; trim trailing whitespace.
/// An empty result becomes `Unknown <Key>`.
#[must_use]
pub fn sanitize_folder_name(raw: &str, key: OrganizeKey) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let trimmed: &str = cleaned.trim_end();

    if trimmed.trim_start().is_empty() {
        key.unknown_folder()
    } else {
        trimmed.to_string()
    }
}

#[must_use]
pub fn has_audio_extension(path: &Path) -> bool {
    AudioFormat::from_path(path).is_some()
}

/// Whether `dir` directly holds at least one audio file.
///
/// Runs on the interaction task, so it never descends and stops at the first
/// match, whatever `audio.recursive` says.
#[must_use]
pub fn dir_contains_audio(dir: &Path) -> bool {
    audio_walker(dir, false)
        .into_iter()
        .filter_map(Result::ok)
        .any(|e| e.file_type().is_file() && has_audio_extension(e.path()))
}

/// Sorted audio files under `dir`, collected on the blocking pool.
pub async fn collect_audio_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, AppError> {
    let root: PathBuf = dir.to_path_buf();

    let listing = tokio::task::spawn_blocking(move || {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in audio_walker(&root, recursive) {
            let entry = entry.map_err(|e| {
                let path: PathBuf = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                match e.into_io_error() {
                    Some(io) => AppError::from_io("list audio", &path, io),
                    None => AppError::collaborator("list audio", path, "filesystem loop"),
                }
            })?;
            if entry.file_type().is_file() && has_audio_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok::<_, AppError>(files)
    })
    .await
    .map_err(|e| AppError::Other(format!("audio listing task failed: {e}")))??;

    debug!(dir = %dir.display(), count = listing.len(), "Collected audio files");
    Ok(listing)
}

fn audio_walker(dir: &Path, recursive: bool) -> WalkDir {
    let walker: WalkDir = WalkDir::new(dir).min_depth(1).follow_links(false);
    if recursive { walker } else { walker.max_depth(1) }
}

/// Move `file` into `<file's dir>/<folder>/`, creating the folder if needed.
#[instrument(level = "debug", skip_all, fields(file = %file.display(), folder = folder))]
pub async fn move_file_into_folder(file: &Path, folder: &str) -> Result<PathBuf, AppError> {
    let parent: &Path = file
        .parent()
        .ok_or_else(|| AppError::collaborator("organize", file, "file has no parent directory"))?;
    let name: &OsStr = file
        .file_name()
        .ok_or_else(|| AppError::collaborator("organize", file, "file has no name"))?;

    let target_dir: PathBuf = parent.join(folder);
    TokioFs::create_dir_all(&target_dir)
        .await
        .map_err(|e| AppError::from_io("organize", &target_dir, e))?;

    let target: PathBuf = target_dir.join(name);
    if TokioFs::symlink_metadata(&target).await.is_ok() {
        return Err(AppError::NameCollision(target));
    }

    TokioFs::rename(file, &target)
        .await
        .map_err(|e| AppError::from_io("organize", file, e))?;

    info!(
        marker = "AUDIO_ORGANIZE",
        from = %file.display(),
        to = %target.display(),
        "File moved into folder"
    );
    Ok(target)
}

/// Everything the navigator asks of an audio toolkit.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// An audio file, or a directory with audio files directly inside.
    /// Called on the interaction task, so it must not walk subtrees.
    fn is_supported(&self, entry: &Entry) -> bool;

    /// Sorted audio files in `dir`.
    async fn list_audio_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError>;

    /// Returns the path of the converted file.
    async fn convert(
        &self,
        file: &Path,
        format: AudioFormat,
        quality: u32,
        delete_original: bool,
    ) -> Result<PathBuf, AppError>;

    async fn read_metadata(&self, file: &Path) -> Result<MetadataMap, AppError>;

    async fn write_metadata(&self, file: &Path, fields: &MetadataMap) -> Result<(), AppError>;

    /// Sanitized folder name for `file` under `key`.
    async fn classify_for_organization(
        &self,
        file: &Path,
        key: OrganizeKey,
    ) -> Result<String, AppError>;

    async fn move_into_folder(&self, file: &Path, folder: &str) -> Result<PathBuf, AppError> {
        move_file_into_folder(file, folder).await
    }

    async fn analyze(&self, file: &Path) -> Result<MetadataMap, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn format_from_extension_ignores_case() {
        assert_eq!(AudioFormat::from_extension("FLAC"), Some(AudioFormat::Flac));
        assert_eq!(
            AudioFormat::from_path(Path::new("/a/b.M4a")),
            Some(AudioFormat::M4a)
        );
        assert_eq!(AudioFormat::from_extension("txt"), None);
    }

    #[test]
    fn folder_names_are_sanitized() {
        assert_eq!(sanitize_folder_name("AC/DC", OrganizeKey::Artist), "ACDC");
        assert_eq!(
            sanitize_folder_name("Rock & Roll  ", OrganizeKey::Genre),
            "Rock  Roll"
        );
        assert_eq!(sanitize_folder_name("???", OrganizeKey::Album), "Unknown Album");
        assert_eq!(sanitize_folder_name("", OrganizeKey::Year), "Unknown Year");
    }

    #[tokio::test]
    async fn collects_sorted_audio_files_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.mp3"), b"").unwrap();
        fs::write(tmp.path().join("a.WAV"), b"").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested/c.flac"), b"").unwrap();

        let flat = collect_audio_files(tmp.path(), false).await.unwrap();
        assert_eq!(flat, [tmp.path().join("a.WAV"), tmp.path().join("b.mp3")]);

        let deep = collect_audio_files(tmp.path(), true).await.unwrap();
        assert_eq!(deep.len(), 3);

        assert!(dir_contains_audio(tmp.path()));
        fs::create_dir(tmp.path().join("empty")).unwrap();
        assert!(!dir_contains_audio(&tmp.path().join("empty")));
    }

    #[test]
    fn audio_check_stays_at_the_top_level() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("deep/er")).unwrap();
        fs::write(tmp.path().join("deep/er/song.mp3"), b"").unwrap();
        fs::write(tmp.path().join("cover.jpg"), b"").unwrap();

        assert!(!dir_contains_audio(tmp.path()));
        assert!(dir_contains_audio(&tmp.path().join("deep/er")));
    }

    #[tokio::test]
    async fn move_into_folder_creates_target() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("song.mp3");
        fs::write(&file, b"x").unwrap();

        let moved = move_file_into_folder(&file, "Queen").await.unwrap();
        assert_eq!(moved, tmp.path().join("Queen/song.mp3"));
        assert!(!file.exists());
        assert!(moved.exists());
    }
}
