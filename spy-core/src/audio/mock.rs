//! Scripted [`AudioBackend`] for tests.
//!
//! Any file whose name contains `bad` fails. Everything else succeeds with
//! canned metadata. Calls are recorded in order. [`MockAudio::panic_on`]
//! makes one operation panic instead.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{
    AudioBackend, AudioFormat, MetadataMap, OrganizeKey, collect_audio_files, dir_contains_audio,
    has_audio_extension, sanitize_folder_name,
};
use crate::error::AppError;
use crate::fs::entry::{Entry, EntryKind};

#[derive(Debug, Default)]
pub struct MockAudio {
    calls: Mutex<Vec<(&'static str, PathBuf)>>,
    cancel_after: Option<(usize, CancellationToken)>,
    panic_on: Option<&'static str>,
}

impl MockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `token` once `n` calls have been made.
    pub fn cancel_after(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((n, token));
        self
    }

    /// Panic whenever `op` is called.
    pub fn panic_on(mut self, op: &'static str) -> Self {
        self.panic_on = Some(op);
        self
    }

    pub fn calls(&self) -> Vec<(&'static str, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, file: &Path) -> Result<(), AppError> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((op, file.to_path_buf()));
            calls.len()
        };
        if let Some((n, token)) = &self.cancel_after
            && count >= *n
        {
            token.cancel();
        }
        if self.panic_on == Some(op) {
            panic!("scripted panic in {op}");
        }

        let name = file.file_name().map(|n| n.to_string_lossy().into_owned());
        if name.is_some_and(|n| n.contains("bad")) {
            return Err(AppError::collaborator(op, file, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl AudioBackend for MockAudio {
    fn is_supported(&self, entry: &Entry) -> bool {
        match entry.kind {
            EntryKind::File => has_audio_extension(&entry.path),
            EntryKind::Directory => dir_contains_audio(&entry.path),
            EntryKind::Placeholder(_) => false,
        }
    }

    async fn list_audio_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        collect_audio_files(dir, false).await
    }

    async fn convert(
        &self,
        file: &Path,
        format: AudioFormat,
        _quality: u32,
        _delete_original: bool,
    ) -> Result<PathBuf, AppError> {
        self.record("convert", file)?;
        Ok(file.with_extension(format.extension()))
    }

    async fn read_metadata(&self, file: &Path) -> Result<MetadataMap, AppError> {
        self.record("read_metadata", file)?;
        Ok(MetadataMap::from([
            ("artist".to_string(), "Mock Artist".to_string()),
            ("title".to_string(), "Mock Title".to_string()),
        ]))
    }

    async fn write_metadata(&self, file: &Path, _fields: &MetadataMap) -> Result<(), AppError> {
        self.record("write_metadata", file)
    }

    async fn classify_for_organization(
        &self,
        file: &Path,
        key: OrganizeKey,
    ) -> Result<String, AppError> {
        self.record("classify", file)?;
        let raw = if key == OrganizeKey::Artist { "Mock Artist" } else { "" };
        Ok(sanitize_folder_name(raw, key))
    }

    async fn analyze(&self, file: &Path) -> Result<MetadataMap, AppError> {
        self.record("analyze", file)?;
        Ok(MetadataMap::from([(
            "duration".to_string(),
            "00:42".to_string(),
        )]))
    }
}
