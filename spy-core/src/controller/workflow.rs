//! src/controller/workflow.rs
//! ============================================================================
//! # Workflow: the navigator's state machine
//!
//! Owns the tree, navigation, menu, prompt and UI state, and is the only
//! place they change. Modes move Browsing → ActionMenuOpen (→ ConfirmDelete)
//! → InputPromptOpen and always come back to Browsing. Filesystem mutations
//! run synchronously here; media work is handed to the [`BatchRunner`] and
//! comes back as [`BatchEvent`]s through [`Workflow::on_batch_event`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::audio::AudioBackend;
use crate::config::Config;
use crate::controller::actions::Action;
use crate::error::AppError;
use crate::fs::entry::{Entry, EntryKind};
use crate::fs::operator::FileSystemOps;
use crate::fs::tree::{FileSystemTree, VisibleRow};
use crate::model::action_menu::{ActionKind, ActionMenu, MenuOptions, MenuResolution};
use crate::model::input_prompt::{InputPrompt, PromptSubmission};
use crate::model::navigation::{NavigationOutcome, NavigationState};
use crate::model::ui_state::{BatchSnapshot, Mode, UIState};
use crate::tasks::batch_runner::{BatchEvent, BatchHandle, BatchRunner, OperationKind};

/// Rows taken by the title, borders and status bar.
const CHROME_ROWS: u16 = 4;

pub struct Workflow {
    fs: Arc<dyn FileSystemOps>,
    tree: FileSystemTree,
    nav: NavigationState,
    menu: ActionMenu,
    prompt: InputPrompt,
    ui: UIState,
    runner: BatchRunner,
    batch: Option<BatchHandle>,
    menu_options: MenuOptions,
    delete_original: bool,
    viewport_height: usize,
    should_quit: bool,
}

impl Workflow {
    /// Load `root` and start in Browsing mode.
    pub fn new(
        config: &Config,
        fs: Arc<dyn FileSystemOps>,
        audio: Arc<dyn AudioBackend>,
        root: PathBuf,
        batch_tx: mpsc::Sender<BatchEvent>,
    ) -> Result<Self, AppError> {
        let mut tree: FileSystemTree = FileSystemTree::new(Arc::clone(&fs), config.show_hidden);
        tree.load(&root)?;

        let mut workflow = Self {
            fs,
            tree,
            nav: NavigationState::new(root),
            menu: ActionMenu::new(),
            prompt: InputPrompt::new(),
            ui: UIState::new(config.notification_ttl),
            runner: BatchRunner::new(audio, batch_tx),
            batch: None,
            menu_options: MenuOptions {
                convert_targets: config.batch.convert_targets.clone(),
                quality: config.batch.default_quality,
                confirm_delete: config.confirm_delete,
            },
            delete_original: config.batch.delete_original,
            viewport_height: 20,
            should_quit: false,
        };
        workflow.sync_highlight();
        Ok(workflow)
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub const fn tree(&self) -> &FileSystemTree {
        &self.tree
    }

    #[must_use]
    pub const fn nav(&self) -> &NavigationState {
        &self.nav
    }

    #[must_use]
    pub const fn menu(&self) -> &ActionMenu {
        &self.menu
    }

    #[must_use]
    pub const fn prompt(&self) -> &InputPrompt {
        &self.prompt
    }

    #[must_use]
    pub const fn ui(&self) -> &UIState {
        &self.ui
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.ui.mode
    }

    #[must_use]
    pub fn rows(&self) -> Vec<VisibleRow> {
        self.tree.visible_rows()
    }

    /// Apply one action.
    #[instrument(level = "trace", skip(self))]
    pub fn handle(&mut self, action: Action) {
        match action {
            Action::MoveSelectionUp => self.move_selection(-1),
            Action::MoveSelectionDown => self.move_selection(1),
            Action::Expand => self.expand_selected(),
            Action::Collapse => self.collapse_selected(),
            Action::EnterSelected => self.enter_selected(),
            Action::GoBack => self.go_back(),
            Action::ShowActions => self.show_actions(),
            Action::Refresh => {
                self.refresh_tree();
                self.ui.show_info("Refreshed");
            }
            Action::ToggleShowHidden => {
                let show: bool = !self.tree.show_hidden();
                self.tree.set_show_hidden(show);
                self.refresh_tree();
                self.ui
                    .show_info(if show { "Showing hidden entries" } else { "Hiding hidden entries" });
            }
            Action::CancelBatch => self.cancel_batch(),
            Action::DismissBatch => self.dismiss_batch(),
            Action::Quit => {
                if let Some(handle) = &self.batch {
                    handle.cancel();
                }
                self.should_quit = true;
            }

            Action::MenuUp => self.menu.cursor_up(),
            Action::MenuDown => self.menu.cursor_down(),
            Action::MenuActivate => self.activate_menu(),
            Action::ConfirmDelete(accepted) => self.answer_confirmation(accepted),

            Action::PromptInsert(ch) => self.prompt.insert_char(ch),
            Action::PromptBackspace => {
                self.prompt.delete_char_before();
            }
            Action::PromptDelete => {
                self.prompt.delete_char_at();
            }
            Action::PromptLeft => self.prompt.move_left(),
            Action::PromptRight => self.prompt.move_right(),
            Action::PromptHome => self.prompt.move_home(),
            Action::PromptEnd => self.prompt.move_end(),
            Action::PromptSubmit => self.submit_prompt(),

            Action::Escape => self.close_modals(),
            Action::Tick => {
                self.ui.update_notification();
                self.reap_batch();
            }
            Action::Resize(_, height) => {
                self.viewport_height = usize::from(height.saturating_sub(CHROME_ROWS)).max(1);
                self.sync_highlight();
            }
            Action::NoOp => {}
        }
    }

    /// Fold a batch event into the snapshot the renderer reads.
    pub fn on_batch_event(&mut self, event: BatchEvent) {
        let Some(snapshot) = self.ui.batch.as_mut() else {
            return;
        };

        let finished: Option<String> = match &event {
            BatchEvent::Finished {
                summary, digest, ..
            } => {
                let mut message: String =
                    format!("{} succeeded, {} failed", summary.succeeded, summary.failed);
                if summary.cancelled > 0 {
                    message.push_str(&format!(" ({} cancelled)", summary.cancelled));
                }
                if let Some(digest) = digest {
                    message.push_str(&format!(" | {digest}"));
                }
                Some(message)
            }
            _ => None,
        };
        let aborted: Option<String> = match &event {
            BatchEvent::Aborted { reason, .. } => Some(reason.clone()),
            _ => None,
        };

        if !snapshot.apply(event) {
            return;
        }

        let changes_disk: bool = matches!(
            snapshot.operation,
            Some(OperationKind::Convert { .. } | OperationKind::Organize { .. })
        );
        let clean: bool = snapshot.summary.is_some_and(|s| s.failed == 0);

        if let Some(message) = finished {
            if clean {
                self.ui.show_success(message);
            } else {
                self.ui.show_warning(message);
            }
            if changes_disk {
                self.refresh_tree();
            }
        } else if let Some(reason) = aborted {
            self.ui.show_error(format!("Batch aborted: {reason}"));
        }
    }

    // ---- browsing -------------------------------------------------------

    fn selected_row(&self) -> Option<VisibleRow> {
        self.tree.visible_rows().into_iter().nth(self.ui.selected)
    }

    fn move_selection(&mut self, delta: isize) {
        let count: usize = self.tree.visible_rows().len();
        if count == 0 {
            return;
        }
        self.ui.selected = self
            .ui
            .selected
            .saturating_add_signed(delta)
            .min(count - 1);
        self.sync_highlight();
    }

    /// Clamp the cursor and publish the entry under it.
    fn sync_highlight(&mut self) {
        let rows: Vec<VisibleRow> = self.tree.visible_rows();
        self.ui.clamp_selection(rows.len(), self.viewport_height);
        self.nav
            .set_highlighted(rows.into_iter().nth(self.ui.selected).map(|r| r.entry));
    }

    fn select_path(&mut self, path: &Path) {
        if let Some(idx) = self
            .tree
            .visible_rows()
            .iter()
            .position(|r| !r.entry.is_placeholder() && r.entry.path == path)
        {
            self.ui.selected = idx;
        }
        self.sync_highlight();
    }

    fn expand_selected(&mut self) {
        let Some(row) = self.selected_row() else { return };
        if !row.entry.is_dir() {
            return;
        }
        if let Err(e) = self.tree.expand(&row.entry.path) {
            self.ui.show_error(e.inline_message());
        }
        self.sync_highlight();
    }

    fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row() else { return };

        if row.entry.is_dir() && row.expanded {
            self.tree.collapse(&row.entry.path);
            self.sync_highlight();
            return;
        }

        // Jump to the parent row
        let parent: Option<PathBuf> = if row.entry.is_placeholder() {
            Some(row.entry.path.clone())
        } else {
            row.entry.path.parent().map(Path::to_path_buf)
        };
        if let Some(parent) = parent
            && Some(parent.as_path()) != self.tree.root_path()
        {
            self.select_path(&parent);
        }
    }

    fn enter_selected(&mut self) {
        let Some(row) = self.selected_row() else { return };
        match row.entry.kind {
            EntryKind::Directory => self.descend(&row.entry),
            EntryKind::File => self.open_menu(&row.entry),
            EntryKind::Placeholder(_) => {}
        }
    }

    fn descend(&mut self, entry: &Entry) {
        if let Err(e) = self.nav.descend(entry) {
            self.ui.show_error(e.inline_message());
            return;
        }
        if let Err(e) = self.tree.load(&entry.path) {
            warn!(path = %entry.path.display(), error = %e, "Descend failed");
            self.nav.undo_descend();
            self.ui.show_error(e.inline_message());
            return;
        }

        info!(marker = "NAV_DESCEND", root = %entry.path.display(), "Descended");
        self.ui.selected = 0;
        self.ui.scroll_offset = 0;
        self.sync_highlight();
    }

    fn go_back(&mut self) {
        let current: PathBuf = self.nav.current_root().to_path_buf();
        match self.nav.ascend() {
            NavigationOutcome::AtTop => self.ui.show_info("Already at the top"),
            NavigationOutcome::Moved(previous) => {
                if let Err(e) = self.tree.load(&previous) {
                    warn!(path = %previous.display(), error = %e, "Previous root unavailable");
                    self.nav.restore_root(current);
                    self.ui.show_error(e.inline_message());
                    return;
                }
                info!(marker = "NAV_ASCEND", root = %previous.display(), "Went back");
                self.ui.selected = 0;
                self.ui.scroll_offset = 0;
                // Land on the directory we came back out of
                self.select_path(&current);
            }
        }
    }

    /// Re-list from disk, keeping the cursor on the same entry when it survives.
    fn refresh_tree(&mut self) {
        let keep: Option<PathBuf> = self.nav.highlighted().map(|e| e.path.clone());
        if let Err(e) = self.tree.refresh() {
            self.ui.show_error(e.inline_message());
        }
        self.after_reload(keep.as_deref());
    }

    fn after_reload(&mut self, prefer: Option<&Path>) {
        self.nav.revalidate(&self.tree);
        match prefer {
            Some(path) if self.tree.contains(path) => self.select_path(path),
            _ => self.sync_highlight(),
        }
    }

    // ---- action menu ----------------------------------------------------

    fn show_actions(&mut self) {
        match self.nav.highlighted().cloned() {
            Some(entry) => self.open_menu(&entry),
            None => self.ui.show_info("Nothing selected"),
        }
    }

    fn open_menu(&mut self, entry: &Entry) {
        let audio_supported: bool = self.runner.audio().is_supported(entry);
        if self.menu.open_for(entry, audio_supported, &self.menu_options) {
            self.ui.mode = Mode::ActionMenuOpen;
        }
    }

    fn activate_menu(&mut self) {
        let Some(resolution) = self.menu.activate() else {
            return;
        };

        match resolution {
            MenuResolution::Descend(entry) => {
                self.close_modals();
                self.descend(&entry);
            }
            MenuResolution::OpenFile(entry) => {
                self.close_modals();
                self.ui
                    .show_info(format!("No viewer for {}", entry.name));
            }
            MenuResolution::Prompt { action, context } => {
                self.menu.close();
                self.prompt.open(action, context);
                self.ui.mode = Mode::InputPromptOpen;
            }
            MenuResolution::ConfirmDelete(_) => self.ui.mode = Mode::ConfirmDelete,
            MenuResolution::Delete(entry) => self.run_delete(&entry),
            MenuResolution::Batch { action, target } => {
                let Some(operation) = self.operation_for(action) else {
                    return;
                };
                if self.start_batch(&target, operation) {
                    self.close_modals();
                }
            }
        }
    }

    fn answer_confirmation(&mut self, accepted: bool) {
        match self.menu.confirm(accepted) {
            Some(MenuResolution::Delete(entry)) => self.run_delete(&entry),
            _ => self.ui.mode = Mode::ActionMenuOpen,
        }
    }

    #[instrument(level = "info", skip(self), fields(path = %entry.path.display()))]
    fn run_delete(&mut self, entry: &Entry) {
        match self.fs.delete(&entry.path) {
            Ok(()) => {
                if let Err(e) = self.tree.reload_from(&entry.path) {
                    warn!(error = %e, "Reload after delete failed");
                }
                self.close_modals();
                self.after_reload(None);
                self.ui.show_success(format!("Deleted {}", entry.name));
            }
            Err(e) => {
                self.menu.error = Some(e.inline_message());
                self.ui.mode = Mode::ActionMenuOpen;
            }
        }
    }

    fn operation_for(&self, action: ActionKind) -> Option<OperationKind> {
        let op: OperationKind = match action {
            ActionKind::ShowMetadata => OperationKind::ReadMetadata,
            ActionKind::Convert { format, quality } => OperationKind::Convert {
                format,
                quality,
                delete_original: self.delete_original,
            },
            ActionKind::Organize(key) => OperationKind::Organize { key },
            ActionKind::PreviewOrganize(key) => OperationKind::PreviewOrganize { key },
            ActionKind::Analyze => OperationKind::Analyze,
            _ => return None,
        };
        Some(op)
    }

    // ---- input prompt ---------------------------------------------------

    fn submit_prompt(&mut self) {
        let submission: PromptSubmission = match self.prompt.submit() {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, "Prompt rejected");
                return;
            }
        };

        let result: Result<(PathBuf, String), AppError> = match submission {
            PromptSubmission::CreateFile(path) => self
                .fs
                .create_file(&path)
                .map(|()| (path, "File created".to_string())),
            PromptSubmission::CreateDirectory(path) => self
                .fs
                .create_directory(&path)
                .map(|()| (path, "Folder created".to_string())),
            PromptSubmission::Rename { from, to } => {
                self.fs.rename(&from, &to).map(|()| {
                    // The old node may be an expanded directory; re-list its parent
                    if let Err(e) = self.tree.reload_from(&from) {
                        warn!(error = %e, "Reload after rename failed");
                    }
                    (to, "Renamed".to_string())
                })
            }
            PromptSubmission::WriteMetadata { target, fields } => {
                let entry: Entry = self
                    .prompt
                    .context_path()
                    .and_then(|p| self.tree.find(p))
                    .map_or_else(
                        || Entry::new(target.clone(), EntryKind::File),
                        |n| n.entry.clone(),
                    );
                if self.start_batch(&entry, OperationKind::WriteMetadata { fields }) {
                    self.close_modals();
                } else {
                    self.prompt.error = Some("A batch is already running".into());
                }
                return;
            }
        };

        match result {
            Ok((path, message)) => {
                if let Err(e) = self.tree.reload_from(&path) {
                    warn!(error = %e, "Reload after prompt action failed");
                }
                // Open the parent so the new entry is on screen
                if let Some(parent) = path.parent()
                    && Some(parent) != self.tree.root_path()
                    && let Err(e) = self.tree.expand(parent)
                {
                    debug!(error = %e, "Parent not expandable");
                }
                self.close_modals();
                self.after_reload(Some(&path));
                self.ui.show_success(message);
            }
            Err(e) => {
                self.prompt.error = Some(e.inline_message());
            }
        }
    }

    // ---- shared ---------------------------------------------------------

    fn close_modals(&mut self) {
        self.menu.close();
        self.prompt.close();
        self.ui.mode = Mode::Browsing;
    }

    fn start_batch(&mut self, target: &Entry, operation: OperationKind) -> bool {
        if self.ui.batch_running() {
            self.ui.show_warning("A batch is already running");
            return false;
        }

        let label: String = operation.to_string();
        let handle: BatchHandle = self.runner.spawn(target, operation);
        info!(
            marker = "BATCH_DISPATCH",
            id = %handle.id,
            target = %target.path.display(),
            operation = %label,
            "Batch dispatched"
        );

        self.ui.batch = Some(BatchSnapshot::new(handle.id.clone()));
        self.batch = Some(handle);
        self.ui.show_info(format!("{label} started"));
        true
    }

    fn cancel_batch(&mut self) {
        match &self.batch {
            Some(handle) if self.ui.batch_running() => {
                if handle.is_cancelled() {
                    self.ui.show_info("Already cancelling");
                    return;
                }
                handle.cancel();
                self.ui.show_warning("Cancelling after the current item");
            }
            _ => self.ui.show_info("No batch running"),
        }
    }

    /// Drop the handle once its task has stopped. A task that died without
    /// sending `Finished` or `Aborted` leaves a running snapshot behind, which
    /// is closed here so later batches are not refused.
    fn reap_batch(&mut self) {
        if !self.batch.as_ref().is_some_and(BatchHandle::is_finished) {
            return;
        }
        let Some(handle) = self.batch.take() else {
            return;
        };
        let Some(reason) = handle.failure() else {
            return;
        };

        warn!(marker = "BATCH_DIED", reason = %reason, "Batch task stopped without reporting");
        if let Some(snapshot) = self.ui.batch.as_mut().filter(|s| s.is_running()) {
            snapshot.abort(reason.clone());
        }
        self.ui.show_error(format!("Batch failed: {reason}"));
    }

    fn dismiss_batch(&mut self) {
        if self.ui.batch_running() {
            self.ui.show_info("Batch still running; press c to cancel");
            return;
        }
        self.ui.batch = None;
        self.batch = None;
    }
}
