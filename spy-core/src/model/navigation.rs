//! src/model/navigation.rs
//! ============================================================================
//! # NavigationState: current root, back history and highlighted entry

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;
use crate::fs::entry::Entry;
use crate::fs::tree::FileSystemTree;

/// Result of [`NavigationState::ascend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Moved back to this root
    Moved(PathBuf),
    /// History was empty; nothing changed
    AtTop,
}

#[derive(Debug, Clone)]
pub struct NavigationState {
    current_root: PathBuf,
    history: Vec<PathBuf>,
    highlighted: Option<Entry>,
}

impl NavigationState {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            current_root: root,
            history: Vec::new(),
            highlighted: None,
        }
    }

    #[must_use]
    pub fn current_root(&self) -> &Path {
        &self.current_root
    }

    #[must_use]
    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    #[must_use]
    pub const fn highlighted(&self) -> Option<&Entry> {
        self.highlighted.as_ref()
    }

    /// Make `entry` (a directory) the new root, remembering the old one.
    pub fn descend(&mut self, entry: &Entry) -> Result<(), AppError> {
        if !entry.is_dir() {
            return Err(AppError::collaborator(
                "open",
                entry.path.clone(),
                "not a directory",
            ));
        }

        let previous: PathBuf = std::mem::replace(&mut self.current_root, entry.path.clone());
        debug!(from = %previous.display(), to = %self.current_root.display(), "Descend");
        self.history.push(previous);
        self.highlighted = None;
        Ok(())
    }

    /// Return to the previous root. A no-op when there is no history.
    pub fn ascend(&mut self) -> NavigationOutcome {
        match self.history.pop() {
            Some(previous) => {
                debug!(to = %previous.display(), "Ascend");
                self.current_root = previous.clone();
                self.highlighted = None;
                NavigationOutcome::Moved(previous)
            }
            None => NavigationOutcome::AtTop,
        }
    }

    /// Stay on `root` after the popped history entry could not be loaded.
    /// The unusable entry is not pushed back.
    pub fn restore_root(&mut self, root: PathBuf) {
        self.current_root = root;
    }

    /// Drop the newest history item, used when loading a descended root failed.
    pub fn undo_descend(&mut self) {
        if let Some(previous) = self.history.pop() {
            self.current_root = previous;
        }
    }

    #[inline]
    pub fn set_highlighted(&mut self, entry: Option<Entry>) {
        self.highlighted = entry;
    }

    /// Forget the highlight if a reload took its entry out of `tree`.
    pub fn revalidate(&mut self, tree: &FileSystemTree) {
        let stale: bool = self
            .highlighted
            .as_ref()
            .is_some_and(|e| !e.is_placeholder() && !tree.contains(&e.path));
        if stale {
            self.highlighted = None;
        }
    }
}
