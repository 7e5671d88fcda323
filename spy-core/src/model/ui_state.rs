//! src/model/ui_state.rs
//! ============================================================================
//! # UIState: interaction mode, transient notification and the latest batch
//! snapshot the renderer draws from.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use compact_str::CompactString;

use crate::tasks::batch_runner::{
    BatchDigest, BatchEvent, BatchId, BatchOutcome, BatchSummary, OperationKind,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Browsing,
    ActionMenuOpen,
    /// Sub-state of the menu waiting for `y`
    ConfirmDelete,
    InputPromptOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
    pub auto_dismiss: Option<Duration>,
}

/// What the renderer knows about the current or last batch.
#[derive(Debug, Clone)]
pub struct BatchSnapshot {
    pub id: BatchId,
    pub operation: Option<OperationKind>,
    pub total: usize,
    pub completed: usize,
    pub current: Option<PathBuf>,
    pub outcomes: Vec<BatchOutcome>,
    pub summary: Option<BatchSummary>,
    pub digest: Option<BatchDigest>,
    pub aborted: Option<String>,
}

impl BatchSnapshot {
    #[must_use]
    pub fn new(id: BatchId) -> Self {
        Self {
            id,
            operation: None,
            total: 0,
            completed: 0,
            current: None,
            outcomes: Vec::new(),
            summary: None,
            digest: None,
            aborted: None,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.summary.is_none() && self.aborted.is_none()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            if self.is_running() { 0.0 } else { 1.0 }
        } else {
            (self.completed as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }

    /// Fold one event into the snapshot. Events for other batches are ignored.
    pub fn apply(&mut self, event: BatchEvent) -> bool {
        if event.id() != &self.id {
            return false;
        }

        match event {
            BatchEvent::Started {
                operation, total, ..
            } => {
                self.operation = Some(operation);
                self.total = total;
                self.outcomes.reserve(total);
            }
            BatchEvent::Progress {
                completed, current, ..
            } => {
                self.completed = completed;
                self.current = Some(current);
            }
            BatchEvent::ItemFinished { outcome, .. } => self.outcomes.push(outcome),
            BatchEvent::Finished {
                summary, digest, ..
            } => {
                self.summary = Some(summary);
                self.digest = digest;
                self.current = None;
            }
            BatchEvent::Aborted { reason, .. } => self.abort(reason),
        }
        true
    }

    /// Stop tracking the batch as running, keeping what it reported so far.
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = Some(reason.into());
        self.current = None;
    }
}

#[derive(Debug, Clone)]
pub struct UIState {
    pub mode: Mode,
    pub selected: usize,
    pub scroll_offset: usize,
    pub notification: Option<Notification>,
    pub batch: Option<BatchSnapshot>,
    notification_ttl: Duration,
}

impl Default for UIState {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

impl UIState {
    #[must_use]
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            mode: Mode::Browsing,
            selected: 0,
            scroll_offset: 0,
            notification: None,
            batch: None,
            notification_ttl,
        }
    }

    pub fn show_notification(
        &mut self,
        message: impl Into<CompactString>,
        level: NotificationLevel,
        auto_dismiss: Option<Duration>,
    ) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            timestamp: Instant::now(),
            auto_dismiss,
        });
    }

    #[inline]
    pub fn show_info(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Info, Some(self.notification_ttl));
    }

    #[inline]
    pub fn show_success(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Success, Some(self.notification_ttl));
    }

    #[inline]
    pub fn show_warning(&mut self, message: impl Into<CompactString>) {
        self.show_notification(
            message,
            NotificationLevel::Warning,
            Some(self.notification_ttl * 2),
        );
    }

    #[inline]
    pub fn show_error(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Error, None);
    }

    /// Drop an expired notification. Returns true when something changed.
    pub fn update_notification(&mut self) -> bool {
        if let Some(notification) = &self.notification
            && let Some(ttl) = notification.auto_dismiss
            && notification.timestamp.elapsed() > ttl
        {
            self.notification = None;
            return true;
        }
        false
    }

    /// Keep `selected` inside `rows` and visible in a window of `height`.
    pub fn clamp_selection(&mut self, rows: usize, height: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    #[must_use]
    pub fn batch_running(&self) -> bool {
        self.batch.as_ref().is_some_and(BatchSnapshot::is_running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_ignores_foreign_events() {
        let mut snap = BatchSnapshot::new("mine".into());
        let applied = snap.apply(BatchEvent::Started {
            id: "other".into(),
            operation: OperationKind::Analyze,
            total: 3,
        });
        assert!(!applied);
        assert_eq!(snap.total, 0);
        assert!(snap.is_running());
    }

    #[test]
    fn snapshot_tracks_progress_to_completion() {
        let mut snap = BatchSnapshot::new("b".into());
        snap.apply(BatchEvent::Started {
            id: "b".into(),
            operation: OperationKind::Analyze,
            total: 2,
        });
        snap.apply(BatchEvent::Progress {
            id: "b".into(),
            completed: 1,
            total: 2,
            current: PathBuf::from("/a.mp3"),
        });
        assert!((snap.ratio() - 0.5).abs() < f64::EPSILON);

        snap.apply(BatchEvent::Finished {
            id: "b".into(),
            summary: BatchSummary {
                total: 2,
                succeeded: 2,
                failed: 0,
                cancelled: 0,
            },
            elapsed: Duration::ZERO,
            digest: None,
        });
        assert!(!snap.is_running());
        assert!(snap.current.is_none());
    }

    #[test]
    fn selection_scrolls_into_view() {
        let mut ui = UIState::default();
        ui.selected = 12;
        ui.clamp_selection(20, 5);
        assert_eq!(ui.scroll_offset, 8);

        ui.selected = 2;
        ui.clamp_selection(20, 5);
        assert_eq!(ui.scroll_offset, 2);

        ui.selected = 30;
        ui.clamp_selection(4, 5);
        assert_eq!(ui.selected, 3);
    }

    #[test]
    fn errors_stay_until_replaced() {
        let mut ui = UIState::new(Duration::ZERO);
        ui.show_error("boom");
        std::thread::sleep(Duration::from_millis(2));
        assert!(!ui.update_notification());

        ui.show_info("hi");
        std::thread::sleep(Duration::from_millis(2));
        assert!(ui.update_notification());
        assert!(ui.notification.is_none());
    }
}
