//! src/audio/ffmpeg.rs
//! ============================================================================
//! # FfmpegBackend
//!
//! [`AudioBackend`] backed by the `ffmpeg` and `ffprobe` executables.
//! Metadata and stream information come from
//! `ffprobe -print_format json -show_format -show_streams`; conversion and tag
//! writes run `ffmpeg` into a sibling file.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use bytesize::ByteSize;
use serde::Deserialize;
use tokio::fs as TokioFs;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use super::{
    AudioBackend, AudioFormat, MetadataMap, OrganizeKey, collect_audio_files, dir_contains_audio,
    has_audio_extension, sanitize_folder_name,
};
use crate::config::AudioConfig;
use crate::error::AppError;
use crate::fs::entry::{Entry, EntryKind};

/// Tags surfaced by Show Metadata, in display order.
const KNOWN_TAGS: [&str; 7] = ["title", "artist", "album", "year", "genre", "track", "comment"];

#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    recursive: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: ProbeFormat,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
    size: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl ProbeOutput {
    fn audio_stream(&self) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"))
    }

    /// Container tags first, then audio stream tags (ogg keeps them there).
    /// Keys are lower-cased; `date` is folded into `year`.
    fn tags(&self) -> MetadataMap {
        let mut out: MetadataMap = MetadataMap::new();
        let stream_tags = self.audio_stream().map(|s| &s.tags);

        for tags in std::iter::once(&self.format.tags).chain(stream_tags) {
            for (key, value) in tags {
                let key: String = match key.to_ascii_lowercase().as_str() {
                    "date" | "tyer" => "year".to_string(),
                    other => other.to_string(),
                };
                let value: String = if key == "year" {
                    value.chars().take(4).collect()
                } else {
                    value.trim().to_string()
                };
                if !value.is_empty() {
                    out.entry(key).or_insert(value);
                }
            }
        }
        out
    }

    fn technical(&self, into: &mut MetadataMap) {
        if let Some(secs) = self
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
        {
            into.insert("duration".into(), format_duration(secs));
        }
        if let Some(bps) = self
            .format
            .bit_rate
            .as_deref()
            .and_then(|b| b.parse::<u64>().ok())
        {
            into.insert("bitrate".into(), format!("{} kbps", bps / 1000));
        }
        if let Some(stream) = self.audio_stream() {
            if let Some(rate) = &stream.sample_rate {
                into.insert("sample_rate".into(), format!("{rate} Hz"));
            }
            if let Some(channels) = stream.channels {
                into.insert("channels".into(), channels.to_string());
            }
            if let Some(codec) = &stream.codec_name {
                into.insert("codec".into(), codec.clone());
            }
        }
    }
}

fn os_args(items: &[&str]) -> Vec<OsString> {
    items.iter().map(OsString::from).collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_duration(secs: f64) -> String {
    let total: u64 = secs.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

impl FfmpegBackend {
    #[must_use]
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg_path.clone(),
            ffprobe: config.ffprobe_path.clone(),
            recursive: config.recursive,
        }
    }

    /// Run `program` to completion and return its stdout.
    async fn run(&self, program: &Path, args: &[OsString]) -> Result<Vec<u8>, AppError> {
        let cmd: String = program.display().to_string();
        let started: Instant = Instant::now();

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::ExternalCmd {
                cmd: cmd.clone(),
                code: None,
                stderr: format!("failed to spawn: {e}"),
            })?;

        debug!(
            cmd = %cmd,
            status = ?output.status.code(),
            elapsed_ms = started.elapsed().as_millis(),
            "External command finished"
        );

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(AppError::ExternalCmd {
                cmd,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    async fn probe(&self, file: &Path) -> Result<ProbeOutput, AppError> {
        let mut args: Vec<OsString> = os_args(&[
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ]);
        args.push(file.into());

        let stdout: Vec<u8> = self.run(&self.ffprobe, &args).await?;

        Ok(serde_json::from_slice(&stdout)?)
    }

    fn codec_args(format: AudioFormat, quality: u32) -> Vec<String> {
        let bitrate: String = format!("{quality}k");
        let codec: &str = match format {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::Wav => "pcm_s16le",
            AudioFormat::Flac => "flac",
            AudioFormat::M4a | AudioFormat::Aac => "aac",
            AudioFormat::Ogg => "libvorbis",
        };

        let mut args: Vec<String> = vec!["-codec:a".into(), codec.into()];
        if format.is_lossy() {
            args.push("-b:a".into());
            args.push(bitrate);
        }
        args
    }
}

#[async_trait]
impl AudioBackend for FfmpegBackend {
    fn is_supported(&self, entry: &Entry) -> bool {
        match entry.kind {
            EntryKind::File => has_audio_extension(&entry.path),
            EntryKind::Directory => dir_contains_audio(&entry.path),
            EntryKind::Placeholder(_) => false,
        }
    }

    async fn list_audio_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        collect_audio_files(dir, self.recursive).await
    }

    #[instrument(level = "info", skip(self), fields(file = %file.display(), format = %format))]
    async fn convert(
        &self,
        file: &Path,
        format: AudioFormat,
        quality: u32,
        delete_original: bool,
    ) -> Result<PathBuf, AppError> {
        if AudioFormat::from_path(file) == Some(format) {
            return Err(AppError::collaborator(
                "convert",
                file,
                format!("already {format}"),
            ));
        }

        let output: PathBuf = file.with_extension(format.extension());
        if TokioFs::symlink_metadata(&output).await.is_ok() {
            return Err(AppError::NameCollision(output));
        }

        let codec: Vec<String> = Self::codec_args(format, quality);
        let mut args: Vec<OsString> = os_args(&["-hide_banner", "-loglevel", "error", "-n", "-i"]);
        args.push(file.into());
        args.extend(os_args(&["-vn", "-map_metadata", "0"]));
        args.extend(codec.into_iter().map(OsString::from));
        args.push(output.clone().into());

        if let Err(e) = self.run(&self.ffmpeg, &args).await {
            // ffmpeg may leave a truncated output behind
            let _ = TokioFs::remove_file(&output).await;
            return Err(e);
        }

        if delete_original && TokioFs::metadata(&output).await.is_ok() {
            TokioFs::remove_file(file)
                .await
                .map_err(|e| AppError::from_io("convert", file, e))?;
        }

        info!(
            marker = "AUDIO_CONVERT",
            input = %file.display(),
            output = %output.display(),
            quality,
            delete_original,
            "File converted"
        );
        Ok(output)
    }

    #[instrument(level = "debug", skip(self), fields(file = %file.display()))]
    async fn read_metadata(&self, file: &Path) -> Result<MetadataMap, AppError> {
        let probe: ProbeOutput = self.probe(file).await?;
        let tags: MetadataMap = probe.tags();

        let mut out: MetadataMap = tags
            .into_iter()
            .filter(|(k, _)| KNOWN_TAGS.contains(&k.as_str()))
            .collect();
        probe.technical(&mut out);
        Ok(out)
    }

    #[instrument(level = "info", skip(self, fields), fields(file = %file.display(), count = fields.len()))]
    async fn write_metadata(&self, file: &Path, fields: &MetadataMap) -> Result<(), AppError> {
        let stem: String = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext: String = file
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp: PathBuf = file.with_file_name(format!(".{stem}.spy-tmp.{ext}"));

        let mut args: Vec<OsString> = os_args(&["-hide_banner", "-loglevel", "error", "-y", "-i"]);
        args.push(file.into());
        args.extend(os_args(&["-map", "0", "-codec", "copy", "-map_metadata", "0"]));
        for (key, value) in fields {
            args.push("-metadata".into());
            args.push(format!("{key}={value}").into());
        }
        args.push(tmp.clone().into());

        if let Err(e) = self.run(&self.ffmpeg, &args).await {
            let _ = TokioFs::remove_file(&tmp).await;
            return Err(e);
        }

        TokioFs::rename(&tmp, file)
            .await
            .map_err(|e| AppError::from_io("write metadata", file, e))?;

        info!(marker = "AUDIO_TAG_WRITE", file = %file.display(), "Metadata written");
        Ok(())
    }

    async fn classify_for_organization(
        &self,
        file: &Path,
        key: OrganizeKey,
    ) -> Result<String, AppError> {
        let tags: MetadataMap = self.probe(file).await?.tags();
        let raw: &str = tags.get(key.tag()).map_or("", String::as_str);
        if raw.is_empty() {
            warn!(file = %file.display(), key = key.tag(), "Tag missing, using fallback folder");
        }
        Ok(sanitize_folder_name(raw, key))
    }

    #[instrument(level = "debug", skip(self), fields(file = %file.display()))]
    async fn analyze(&self, file: &Path) -> Result<MetadataMap, AppError> {
        let meta = TokioFs::metadata(file)
            .await
            .map_err(|e| AppError::from_io("analyze", file, e))?;
        let probe: ProbeOutput = self.probe(file).await?;

        let mut out: MetadataMap = MetadataMap::new();
        let size: u64 = probe
            .format
            .size
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(meta.len());
        out.insert("size".into(), ByteSize::b(size).to_string());
        if let Some(ext) = file.extension() {
            out.insert("format".into(), ext.to_string_lossy().to_uppercase());
        }
        probe.technical(&mut out);
        Ok(out)
    }
}
