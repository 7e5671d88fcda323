//! src/tasks/batch_runner.rs
//! ============================================================================
//! # Batch Runner: sequential per-file media operations off the UI task
//!
//! A batch resolves its target into an ordered list of audio files, then runs
//! one operation per file, in order, never skipping or retrying. Every item
//! ends with exactly one [`BatchOutcome`]. Progress and outcomes travel to the
//! interaction loop over a bounded channel as [`BatchEvent`]s.
//!
//! Cancellation is cooperative and checked between items. Items not reached
//! are recorded as cancelled failures so the outcome list still covers every
//! item.
//!
//! Analyze and organize previews also close with a [`BatchDigest`]: library
//! totals for the former, destination folders for the latter.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use compact_str::CompactString;
use futures::FutureExt;
use tokio::fs as TokioFs;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::audio::{AudioBackend, AudioFormat, MetadataMap, OrganizeKey};
use crate::error::AppError;
use crate::fs::entry::Entry;

pub type BatchId = CompactString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Convert {
        format: AudioFormat,
        quality: u32,
        delete_original: bool,
    },
    ReadMetadata,
    WriteMetadata {
        fields: MetadataMap,
    },
    Organize {
        key: OrganizeKey,
    },
    /// Classify only; nothing moves
    PreviewOrganize {
        key: OrganizeKey,
    },
    Analyze,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Convert { format, .. } => write!(f, "Convert to {format}"),
            Self::ReadMetadata => f.write_str("Show Metadata"),
            Self::WriteMetadata { .. } => f.write_str("Edit Metadata"),
            Self::Organize { key } => write!(f, "Organize by {key}"),
            Self::PreviewOrganize { key } => write!(f, "Preview Organize by {key}"),
            Self::Analyze => f.write_str("Analyze"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    /// Never started because the batch was cancelled first
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub item: PathBuf,
    pub status: OutcomeStatus,

    /// Short result or error text
    pub detail: String,

    /// Key/value report for metadata reads and analysis
    pub report: Option<MetadataMap>,
}

impl BatchOutcome {
    fn ok(item: PathBuf, detail: impl Into<String>, report: Option<MetadataMap>) -> Self {
        Self {
            item,
            status: OutcomeStatus::Succeeded,
            detail: detail.into(),
            report,
        }
    }

    fn failed(item: PathBuf, err: &AppError) -> Self {
        Self {
            item,
            status: OutcomeStatus::Failed,
            detail: err.inline_message(),
            report: None,
        }
    }

    fn cancelled(item: PathBuf) -> Self {
        Self {
            item,
            status: OutcomeStatus::Cancelled,
            detail: AppError::Cancelled.inline_message(),
            report: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == OutcomeStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Included in `failed`
    pub cancelled: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let succeeded: usize = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            cancelled: outcomes.iter().filter(|o| o.is_cancelled()).count(),
        }
    }
}

/// Totals reported once a batch has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDigest {
    /// Every file an Analyze batch covered
    Library {
        files: usize,
        total_bytes: u64,
        formats: BTreeMap<AudioFormat, usize>,
    },

    /// Destination folder → number of files an organize would move there
    Folders(BTreeMap<String, usize>),
}

impl BatchDigest {
    /// Group classified files by destination folder.
    #[must_use]
    pub fn folders<'a>(destinations: impl IntoIterator<Item = &'a str>) -> Self {
        let mut groups: BTreeMap<String, usize> = BTreeMap::new();
        for folder in destinations {
            *groups.entry(folder.to_string()).or_default() += 1;
        }
        Self::Folders(groups)
    }

    /// Size and format breakdown of `items`; files that vanished count as 0 bytes.
    pub async fn library(items: &[PathBuf]) -> Self {
        let mut total_bytes: u64 = 0;
        let mut formats: BTreeMap<AudioFormat, usize> = BTreeMap::new();

        for item in items {
            if let Ok(meta) = TokioFs::metadata(item).await {
                total_bytes += meta.len();
            }
            if let Some(format) = AudioFormat::from_path(item) {
                *formats.entry(format).or_default() += 1;
            }
        }

        Self::Library {
            files: items.len(),
            total_bytes,
            formats,
        }
    }
}

impl fmt::Display for BatchDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library {
                files,
                total_bytes,
                formats,
            } => {
                write!(f, "{files} files, {}", ByteSize::b(*total_bytes))?;
                if !formats.is_empty() {
                    let counts: Vec<String> = formats
                        .iter()
                        .map(|(format, n)| format!("{format}: {n}"))
                        .collect();
                    write!(f, " ({})", counts.join(", "))?;
                }
                Ok(())
            }
            Self::Folders(groups) => {
                let files: usize = groups.values().sum();
                write!(f, "{files} files into {} folders", groups.len())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub id: BatchId,
    pub items: Vec<PathBuf>,
    pub operation: OperationKind,
    pub progress: usize,
    pub outcomes: Vec<BatchOutcome>,
    pub digest: Option<BatchDigest>,
}

impl BatchJob {
    #[must_use]
    pub fn new(id: BatchId, items: Vec<PathBuf>, operation: OperationKind) -> Self {
        let outcomes: Vec<BatchOutcome> = Vec::with_capacity(items.len());
        Self {
            id,
            items,
            operation,
            progress: 0,
            outcomes,
            digest: None,
        }
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_outcomes(&self.outcomes)
    }
}

/// Messages from a running batch to the interaction loop.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        id: BatchId,
        operation: OperationKind,
        total: usize,
    },
    Progress {
        id: BatchId,
        completed: usize,
        total: usize,
        current: PathBuf,
    },
    ItemFinished {
        id: BatchId,
        outcome: BatchOutcome,
    },
    Finished {
        id: BatchId,
        summary: BatchSummary,
        elapsed: Duration,
        digest: Option<BatchDigest>,
    },
    /// The target could not be resolved into files; nothing ran
    Aborted {
        id: BatchId,
        reason: String,
    },
}

impl BatchEvent {
    #[must_use]
    pub fn id(&self) -> &BatchId {
        match self {
            Self::Started { id, .. }
            | Self::Progress { id, .. }
            | Self::ItemFinished { id, .. }
            | Self::Finished { id, .. }
            | Self::Aborted { id, .. } => id,
        }
    }
}

/// Control side of a spawned batch.
#[derive(Debug)]
pub struct BatchHandle {
    pub id: BatchId,
    cancel: CancellationToken,
    join: JoinHandle<Option<BatchJob>>,
}

impl BatchHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Reap a task that has stopped, without waiting.
    ///
    /// `Some(reason)` when the task died (panicked or was torn down) instead of
    /// returning normally. A task that returned has already queued its
    /// `Finished` or `Aborted` event.
    #[must_use]
    pub fn failure(self) -> Option<String> {
        match self.join.now_or_never()? {
            Ok(_) => None,
            Err(e) => Some(describe_join_error(e)),
        }
    }

    /// Wait for the batch and return its final job state.
    pub async fn join(self) -> Option<BatchJob> {
        self.join.await.ok().flatten()
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_cancelled() {
        return "batch task was cancelled".to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .map_or_else(
                || "batch task panicked".to_string(),
                |msg| format!("batch task panicked: {msg}"),
            ),
        Err(_) => "batch task failed".to_string(),
    }
}

pub struct BatchRunner {
    audio: Arc<dyn AudioBackend>,
    events: mpsc::Sender<BatchEvent>,
}

impl BatchRunner {
    #[must_use]
    pub fn new(audio: Arc<dyn AudioBackend>, events: mpsc::Sender<BatchEvent>) -> Self {
        Self { audio, events }
    }

    #[must_use]
    pub fn audio(&self) -> &Arc<dyn AudioBackend> {
        &self.audio
    }

    /// Spawn a batch over `target`: the file itself, or the audio files of a
    /// directory.
    pub fn spawn(&self, target: &Entry, operation: OperationKind) -> BatchHandle {
        let id: BatchId = CompactString::new(nanoid::nanoid!(8));
        let cancel: CancellationToken = CancellationToken::new();

        let audio: Arc<dyn AudioBackend> = Arc::clone(&self.audio);
        let events: mpsc::Sender<BatchEvent> = self.events.clone();
        let token: CancellationToken = cancel.clone();
        let target: Entry = target.clone();
        let span = info_span!("batch", id = %id, operation = %operation);
        let task_id: BatchId = id.clone();

        let join: JoinHandle<Option<BatchJob>> = tokio::spawn(
            async move {
                let items: Vec<PathBuf> = match resolve_items(audio.as_ref(), &target).await {
                    Ok(items) => items,
                    Err(e) => {
                        warn!(marker = "BATCH_ABORTED", error = %e, "Could not collect batch items");
                        emit(
                            &events,
                            BatchEvent::Aborted {
                                id: task_id,
                                reason: e.inline_message(),
                            },
                        )
                        .await;
                        return None;
                    }
                };

                let job: BatchJob = BatchJob::new(task_id, items, operation);
                Some(run_job(audio.as_ref(), job, &events, &token).await)
            }
            .instrument(span),
        );

        BatchHandle { id, cancel, join }
    }
}

async fn resolve_items(audio: &dyn AudioBackend, target: &Entry) -> Result<Vec<PathBuf>, AppError> {
    if target.is_dir() {
        audio.list_audio_files(&target.path).await
    } else {
        Ok(vec![target.path.clone()])
    }
}

async fn emit(events: &mpsc::Sender<BatchEvent>, event: BatchEvent) {
    if events.send(event).await.is_err() {
        debug!("Batch event receiver dropped");
    }
}

/// Run every item of `job` in order and return the finished job.
pub async fn run_job(
    audio: &dyn AudioBackend,
    mut job: BatchJob,
    events: &mpsc::Sender<BatchEvent>,
    cancel: &CancellationToken,
) -> BatchJob {
    let started: Instant = Instant::now();
    let total: usize = job.items.len();

    info!(marker = "BATCH_START", id = %job.id, total, operation = %job.operation, "Batch started");
    emit(
        events,
        BatchEvent::Started {
            id: job.id.clone(),
            operation: job.operation.clone(),
            total,
        },
    )
    .await;

    let mut destinations: Vec<String> = Vec::new();

    for item in job.items.clone() {
        let outcome: BatchOutcome = if cancel.is_cancelled() {
            BatchOutcome::cancelled(item.clone())
        } else {
            match process_item(audio, &job.operation, &item).await {
                Ok(done) => {
                    destinations.extend(done.folder);
                    BatchOutcome::ok(item.clone(), done.detail, done.report)
                }
                Err(e) => {
                    debug!(item = %item.display(), error = %e, "Batch item failed");
                    BatchOutcome::failed(item.clone(), &e)
                }
            }
        };

        job.progress += 1;
        job.outcomes.push(outcome.clone());

        emit(
            events,
            BatchEvent::ItemFinished {
                id: job.id.clone(),
                outcome,
            },
        )
        .await;
        emit(
            events,
            BatchEvent::Progress {
                id: job.id.clone(),
                completed: job.progress,
                total,
                current: item,
            },
        )
        .await;
    }

    job.digest = match job.operation {
        OperationKind::Analyze => Some(BatchDigest::library(&job.items).await),
        OperationKind::PreviewOrganize { .. } => Some(BatchDigest::folders(
            destinations.iter().map(String::as_str),
        )),
        _ => None,
    };

    let summary: BatchSummary = job.summary();
    let elapsed: Duration = started.elapsed();
    info!(
        marker = "BATCH_FINISHED",
        id = %job.id,
        succeeded = summary.succeeded,
        failed = summary.failed,
        cancelled = summary.cancelled,
        elapsed_ms = elapsed.as_millis(),
        "Batch finished"
    );
    emit(
        events,
        BatchEvent::Finished {
            id: job.id.clone(),
            summary,
            elapsed,
            digest: job.digest.clone(),
        },
    )
    .await;

    job
}

/// Result of one successful item.
struct ItemDone {
    detail: String,
    report: Option<MetadataMap>,

    /// Destination folder, for organize previews
    folder: Option<String>,
}

impl ItemDone {
    fn new(detail: String, report: Option<MetadataMap>) -> Self {
        Self {
            detail,
            report,
            folder: None,
        }
    }
}

async fn process_item(
    audio: &dyn AudioBackend,
    operation: &OperationKind,
    item: &Path,
) -> Result<ItemDone, AppError> {
    match operation {
        OperationKind::Convert {
            format,
            quality,
            delete_original,
        } => {
            let output: PathBuf = audio
                .convert(item, *format, *quality, *delete_original)
                .await?;
            Ok(ItemDone::new(format!("-> {}", file_name(&output)), None))
        }

        OperationKind::ReadMetadata => {
            let tags: MetadataMap = audio.read_metadata(item).await?;
            Ok(ItemDone::new(format!("{} fields", tags.len()), Some(tags)))
        }

        OperationKind::WriteMetadata { fields } => {
            audio.write_metadata(item, fields).await?;
            let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
            Ok(ItemDone::new(format!("set {}", keys.join(", ")), None))
        }

        OperationKind::Organize { key } => {
            let folder: String = audio.classify_for_organization(item, *key).await?;
            audio.move_into_folder(item, &folder).await?;
            Ok(ItemDone::new(format!("-> {folder}/"), None))
        }

        OperationKind::PreviewOrganize { key } => {
            let folder: String = audio.classify_for_organization(item, *key).await?;
            Ok(ItemDone {
                detail: format!("would go to {folder}/"),
                report: None,
                folder: Some(folder),
            })
        }

        OperationKind::Analyze => {
            let report: MetadataMap = audio.analyze(item).await?;
            let duration: &str = report.get("duration").map_or("?", String::as_str);
            Ok(ItemDone::new(duration.to_string(), Some(report)))
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock::MockAudio;
    use crate::fs::entry::EntryKind;
    use std::fs;
    use tempfile::TempDir;

    fn drain(rx: &mut mpsc::Receiver<BatchEvent>) -> Vec<BatchEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn items(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/music").join(n)).collect()
    }

    fn collect_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_batch() {
        let audio = MockAudio::new();
        let (tx, mut rx) = mpsc::channel(64);
        let job = BatchJob::new(
            "t1".into(),
            items(&["a.wav", "bad1.wav", "c.wav", "bad2.wav", "e.wav"]),
            OperationKind::Analyze,
        );

        let done = run_job(&audio, job, &tx, &CancellationToken::new()).await;

        assert_eq!(done.progress, 5);
        assert_eq!(done.outcomes.len(), 5);
        let order: Vec<_> = done.outcomes.iter().map(|o| o.item.clone()).collect();
        assert_eq!(order, done.items);
        let flags: Vec<bool> = done.outcomes.iter().map(BatchOutcome::is_success).collect();
        assert_eq!(flags, [true, false, true, false, true]);
        assert_eq!(audio.calls().len(), 5);

        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(BatchEvent::Started { total: 5, .. })));
        assert!(matches!(
            events.last(),
            Some(BatchEvent::Finished {
                summary: BatchSummary {
                    total: 5,
                    succeeded: 3,
                    failed: 2,
                    cancelled: 0
                },
                ..
            })
        ));
        let last_progress = events.iter().rev().find_map(|e| match e {
            BatchEvent::Progress { completed, .. } => Some(*completed),
            _ => None,
        });
        assert_eq!(last_progress, Some(5));
    }

    #[tokio::test]
    async fn cancellation_marks_remaining_items() {
        let cancel = CancellationToken::new();
        let audio = MockAudio::new().cancel_after(2, cancel.clone());
        let (tx, _rx) = mpsc::channel(64);
        let job = BatchJob::new(
            "t2".into(),
            items(&["a.mp3", "b.mp3", "c.mp3", "d.mp3"]),
            OperationKind::ReadMetadata,
        );

        let done = run_job(&audio, job, &tx, &cancel).await;

        assert_eq!(done.outcomes.len(), 4);
        assert_eq!(audio.calls().len(), 2);
        let summary = done.summary();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.cancelled, 2);
        assert!(done.outcomes[3].is_cancelled());
        assert_eq!(done.outcomes[1].status, OutcomeStatus::Succeeded);
    }

    #[test]
    fn failure_worded_like_a_cancel_is_not_a_cancel() {
        let outcomes = [
            BatchOutcome::failed(PathBuf::from("/a.mp3"), &AppError::Cancelled),
            BatchOutcome::cancelled(PathBuf::from("/b.mp3")),
        ];
        assert_eq!(outcomes[0].detail, outcomes[1].detail);

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.cancelled, 1);
    }

    #[tokio::test]
    async fn preview_groups_without_moving() {
        let tmp = TempDir::new().unwrap();
        let files: Vec<PathBuf> = ["one.mp3", "two.flac", "bad.mp3"]
            .iter()
            .map(|n| tmp.path().join(n))
            .collect();
        for f in &files {
            fs::write(f, b"").unwrap();
        }
        let (tx, _rx) = mpsc::channel(64);
        let job = BatchJob::new(
            "p1".into(),
            files.clone(),
            OperationKind::PreviewOrganize {
                key: OrganizeKey::Artist,
            },
        );

        let done = run_job(&MockAudio::new(), job, &tx, &CancellationToken::new()).await;

        assert_eq!(
            done.digest,
            Some(BatchDigest::Folders(BTreeMap::from([(
                "Mock Artist".to_string(),
                2
            )])))
        );
        assert_eq!(
            done.digest.as_ref().map(ToString::to_string).as_deref(),
            Some("2 files into 1 folders")
        );
        assert!(files.iter().all(|f| f.exists()));
        assert!(!tmp.path().join("Mock Artist").exists());
    }

    #[tokio::test]
    async fn analyze_closes_with_library_totals() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.mp3"), b"abc").unwrap();
        fs::write(tmp.path().join("b.flac"), b"abcde").unwrap();
        fs::write(tmp.path().join("c.MP3"), b"").unwrap();
        let items = collect_files(tmp.path());

        let (tx, mut rx) = mpsc::channel(64);
        let job = BatchJob::new("a1".into(), items, OperationKind::Analyze);
        let done = run_job(&MockAudio::new(), job, &tx, &CancellationToken::new()).await;

        let expected = BatchDigest::Library {
            files: 3,
            total_bytes: 8,
            formats: BTreeMap::from([(AudioFormat::Mp3, 2), (AudioFormat::Flac, 1)]),
        };
        assert_eq!(done.digest.as_ref(), Some(&expected));

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(BatchEvent::Finished { digest: Some(d), .. }) if *d == expected
        ));
    }

    #[tokio::test]
    async fn other_operations_have_no_digest() {
        let (tx, _rx) = mpsc::channel(64);
        let job = BatchJob::new("m1".into(), items(&["a.mp3"]), OperationKind::ReadMetadata);
        let done = run_job(&MockAudio::new(), job, &tx, &CancellationToken::new()).await;
        assert!(done.digest.is_none());
    }

    #[tokio::test]
    async fn dead_task_reports_why() {
        let (tx, _rx) = mpsc::channel(64);
        let runner = BatchRunner::new(Arc::new(MockAudio::new().panic_on("analyze")), tx);
        let target = Entry::new(PathBuf::from("/music/song.mp3"), EntryKind::File);

        let handle = runner.spawn(&target, OperationKind::Analyze);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let reason = handle.failure().unwrap();
        assert!(reason.contains("scripted panic in analyze"), "{reason}");
    }

    #[tokio::test]
    async fn clean_exit_is_not_a_failure() {
        let (tx, _rx) = mpsc::channel(64);
        let runner = BatchRunner::new(Arc::new(MockAudio::new()), tx);
        let target = Entry::new(PathBuf::from("/music/song.mp3"), EntryKind::File);

        let handle = runner.spawn(&target, OperationKind::Analyze);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(handle.failure(), None);
    }

    #[tokio::test]
    async fn spawned_batch_lists_directory_audio() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("one.mp3"), b"").unwrap();
        fs::write(tmp.path().join("two.flac"), b"").unwrap();
        fs::write(tmp.path().join("cover.jpg"), b"").unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let runner = BatchRunner::new(Arc::new(MockAudio::new()), tx);
        let target = Entry::new(tmp.path().to_path_buf(), EntryKind::Directory);

        let handle = runner.spawn(
            &target,
            OperationKind::Organize {
                key: OrganizeKey::Artist,
            },
        );
        let job = handle.join().await.unwrap();

        assert_eq!(job.items.len(), 2);
        assert!(job.outcomes.iter().all(BatchOutcome::is_success));
        assert!(tmp.path().join("Mock Artist/one.mp3").exists());
        assert!(tmp.path().join("Mock Artist/two.flac").exists());

        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.id() == &job.id));
    }

    #[tokio::test]
    async fn unreadable_target_aborts() {
        let (tx, mut rx) = mpsc::channel(8);
        let runner = BatchRunner::new(Arc::new(MockAudio::new()), tx);
        let target = Entry::new(PathBuf::from("/definitely/not/here"), EntryKind::Directory);

        let handle = runner.spawn(&target, OperationKind::Analyze);
        assert!(handle.join().await.is_none());
        assert!(matches!(rx.recv().await, Some(BatchEvent::Aborted { .. })));
    }
}
