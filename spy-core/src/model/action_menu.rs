//! src/model/action_menu.rs
//! ============================================================================
//! # ActionMenu: contextual actions for one entry
//!
//! The action list is fixed when the menu opens. Each item is an
//! [`ActionKind`] value, and [`ActionMenu::activate`] turns the item under the
//! cursor into a [`MenuResolution`] that the controller carries out.

use std::fmt;
use std::path::PathBuf;

use smallvec::SmallVec;
use tracing::debug;

use crate::audio::{AudioFormat, OrganizeKey};
use crate::fs::entry::{Entry, EntryKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Open,
    NewFile,
    NewFolder,
    Rename,
    Delete,
    ShowMetadata,
    EditMetadata,
    Convert { format: AudioFormat, quality: u32 },
    Organize(OrganizeKey),
    PreviewOrganize(OrganizeKey),
    Analyze,
}

impl ActionKind {
    /// Whether choosing this action opens the input prompt.
    #[must_use]
    pub const fn needs_input(self) -> bool {
        matches!(
            self,
            Self::NewFile | Self::NewFolder | Self::Rename | Self::EditMetadata
        )
    }

    /// Prompt title for actions that need input.
    #[must_use]
    pub const fn prompt_label(self) -> &'static str {
        match self {
            Self::NewFile => "Enter name for new file:",
            Self::NewFolder => "Enter name for new folder:",
            Self::Rename => "Enter new name:",
            Self::EditMetadata => "Enter tag as field=value:",
            _ => "",
        }
    }

    #[must_use]
    pub const fn is_batch(self) -> bool {
        matches!(
            self,
            Self::ShowMetadata
                | Self::Convert { .. }
                | Self::Organize(_)
                | Self::PreviewOrganize(_)
                | Self::Analyze
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::NewFile => f.write_str("New File"),
            Self::NewFolder => f.write_str("New Folder"),
            Self::Rename => f.write_str("Rename"),
            Self::Delete => f.write_str("Delete"),
            Self::ShowMetadata => f.write_str("Show Metadata"),
            Self::EditMetadata => f.write_str("Edit Metadata"),
            Self::Convert { format, .. } => write!(f, "Convert to {format}"),
            Self::Organize(key) => write!(f, "Organize by {key}"),
            Self::PreviewOrganize(key) => write!(f, "Preview Organize by {key}"),
            Self::Analyze => f.write_str("Analyze"),
        }
    }
}

/// Inputs to [`ActionMenu::open_for`] that come from configuration.
#[derive(Debug, Clone)]
pub struct MenuOptions {
    pub convert_targets: Vec<AudioFormat>,
    pub quality: u32,
    pub confirm_delete: bool,
}

/// What the controller must do after an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuResolution {
    /// Make this directory the new root
    Descend(Entry),

    /// Open on a file; nothing to do yet
    OpenFile(Entry),

    /// Show the input prompt bound to `action`
    Prompt { action: ActionKind, context: PathBuf },

    /// Run the delete now
    Delete(Entry),

    /// Wait for the user to confirm deleting this entry
    ConfirmDelete(Entry),

    /// Hand a media action to the batch runner
    Batch { action: ActionKind, target: Entry },
}

type ActionList = SmallVec<[ActionKind; 24]>;

#[derive(Debug, Clone, Default)]
pub struct ActionMenu {
    target: Option<Entry>,
    actions: ActionList,
    cursor: usize,
    visible: bool,
    confirm_delete: bool,
    confirming: bool,

    /// Inline failure shown under the list
    pub error: Option<String>,
}

impl ActionMenu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the action list for `entry`. Placeholders open nothing.
    pub fn open_for(&mut self, entry: &Entry, audio_supported: bool, options: &MenuOptions) -> bool {
        let mut actions: ActionList = match entry.kind {
            EntryKind::Directory => SmallVec::from_slice(&[
                ActionKind::Open,
                ActionKind::NewFile,
                ActionKind::NewFolder,
                ActionKind::Rename,
                ActionKind::Delete,
            ]),
            EntryKind::File => {
                SmallVec::from_slice(&[ActionKind::Open, ActionKind::Rename, ActionKind::Delete])
            }
            EntryKind::Placeholder(_) => {
                self.close();
                return false;
            }
        };

        if audio_supported {
            actions.push(ActionKind::ShowMetadata);
            actions.push(ActionKind::EditMetadata);
            actions.extend(options.convert_targets.iter().map(|&format| ActionKind::Convert {
                format,
                quality: options.quality,
            }));
            actions.extend(OrganizeKey::ALL.into_iter().map(ActionKind::PreviewOrganize));
            actions.extend(OrganizeKey::ALL.into_iter().map(ActionKind::Organize));
            actions.push(ActionKind::Analyze);
        }

        debug!(
            target_path = %entry.path.display(),
            actions = actions.len(),
            audio_supported,
            "Action menu opened"
        );

        self.target = Some(entry.clone());
        self.actions = actions;
        self.cursor = 0;
        self.visible = true;
        self.confirm_delete = options.confirm_delete;
        self.confirming = false;
        self.error = None;
        true
    }

    pub fn close(&mut self) {
        self.target = None;
        self.actions.clear();
        self.cursor = 0;
        self.visible = false;
        self.confirming = false;
        self.error = None;
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn target(&self) -> Option<&Entry> {
        self.target.as_ref()
    }

    #[must_use]
    pub fn actions(&self) -> &[ActionKind] {
        &self.actions
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn selected(&self) -> Option<ActionKind> {
        self.actions.get(self.cursor).copied()
    }

    #[must_use]
    pub const fn is_confirming(&self) -> bool {
        self.confirming
    }

    pub fn cursor_up(&mut self) {
        if !self.actions.is_empty() {
            self.cursor = (self.cursor + self.actions.len() - 1) % self.actions.len();
            self.error = None;
        }
    }

    pub fn cursor_down(&mut self) {
        if !self.actions.is_empty() {
            self.cursor = (self.cursor + 1) % self.actions.len();
            self.error = None;
        }
    }

    /// Resolve the action under the cursor.
    #[must_use]
    pub fn activate(&mut self) -> Option<MenuResolution> {
        let target: Entry = self.target.clone()?;
        let action: ActionKind = self.selected()?;

        let resolution: MenuResolution = match action {
            ActionKind::Open if target.is_dir() => MenuResolution::Descend(target),
            ActionKind::Open => MenuResolution::OpenFile(target),
            ActionKind::Delete if self.confirm_delete => {
                self.confirming = true;
                MenuResolution::ConfirmDelete(target)
            }
            ActionKind::Delete => MenuResolution::Delete(target),
            a if a.needs_input() => MenuResolution::Prompt {
                action,
                context: target.path,
            },
            _ => MenuResolution::Batch { action, target },
        };

        debug!(action = %action, "Menu action activated");
        Some(resolution)
    }

    /// Answer a pending delete confirmation.
    #[must_use]
    pub fn confirm(&mut self, accepted: bool) -> Option<MenuResolution> {
        if !self.confirming {
            return None;
        }
        self.confirming = false;
        if accepted {
            self.target.clone().map(MenuResolution::Delete)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> MenuOptions {
        MenuOptions {
            convert_targets: vec![AudioFormat::Mp3, AudioFormat::Flac],
            quality: 256,
            confirm_delete: false,
        }
    }

    fn dir() -> Entry {
        Entry::new(PathBuf::from("/music/jazz"), EntryKind::Directory)
    }

    fn file() -> Entry {
        Entry::new(PathBuf::from("/music/notes.txt"), EntryKind::File)
    }

    fn labels(menu: &ActionMenu) -> Vec<String> {
        menu.actions().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn directory_and_file_action_sets() {
        let mut menu = ActionMenu::new();
        assert!(menu.open_for(&dir(), false, &options()));
        assert_eq!(
            labels(&menu),
            ["Open", "New File", "New Folder", "Rename", "Delete"]
        );

        assert!(menu.open_for(&file(), false, &options()));
        assert_eq!(labels(&menu), ["Open", "Rename", "Delete"]);
    }

    #[test]
    fn audio_actions_follow_the_base_set() {
        let mut menu = ActionMenu::new();
        let song = Entry::new(PathBuf::from("/music/a.wav"), EntryKind::File);
        menu.open_for(&song, true, &options());

        assert_eq!(
            labels(&menu),
            [
                "Open",
                "Rename",
                "Delete",
                "Show Metadata",
                "Edit Metadata",
                "Convert to MP3",
                "Convert to FLAC",
                "Preview Organize by Artist",
                "Preview Organize by Album",
                "Preview Organize by Genre",
                "Preview Organize by Year",
                "Organize by Artist",
                "Organize by Album",
                "Organize by Genre",
                "Organize by Year",
                "Analyze",
            ]
        );
        assert!(menu.actions().contains(&ActionKind::Convert {
            format: AudioFormat::Flac,
            quality: 256
        }));
    }

    #[test]
    fn every_action_resolves_to_prompt_or_batch_by_its_kind() {
        let mut menu = ActionMenu::new();
        let song = Entry::new(PathBuf::from("/music/a.wav"), EntryKind::File);
        menu.open_for(&song, true, &options());

        for idx in 0..menu.actions().len() {
            while menu.cursor() != idx {
                menu.cursor_down();
            }
            let action = menu.selected().unwrap();
            match menu.activate().unwrap() {
                MenuResolution::Prompt { action: a, .. } => {
                    assert!(a.needs_input(), "{a}");
                    assert!(!a.prompt_label().is_empty());
                }
                MenuResolution::Batch { action: a, .. } => assert!(a.is_batch(), "{a}"),
                _ => assert!(matches!(action, ActionKind::Open | ActionKind::Delete)),
            }
        }
    }

    #[test]
    fn placeholder_opens_nothing() {
        let mut menu = ActionMenu::new();
        let p = Entry::placeholder(
            std::path::Path::new("/locked"),
            crate::fs::entry::PlaceholderKind::PermissionDenied,
        );
        assert!(!menu.open_for(&p, true, &options()));
        assert!(!menu.is_visible());
        assert!(menu.actions().is_empty());
        assert!(menu.target().is_none());
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let mut menu = ActionMenu::new();
        menu.open_for(&file(), false, &options());

        menu.cursor_up();
        assert_eq!(menu.cursor(), 2);
        menu.cursor_down();
        assert_eq!(menu.cursor(), 0);
    }

    #[test]
    fn activation_resolves_by_kind() {
        let mut menu = ActionMenu::new();
        menu.open_for(&dir(), false, &options());
        assert_eq!(menu.activate(), Some(MenuResolution::Descend(dir())));

        menu.cursor_down();
        assert_eq!(
            menu.activate(),
            Some(MenuResolution::Prompt {
                action: ActionKind::NewFile,
                context: PathBuf::from("/music/jazz"),
            })
        );

        menu.open_for(&file(), false, &options());
        assert_eq!(menu.activate(), Some(MenuResolution::OpenFile(file())));
        menu.cursor_up();
        assert_eq!(menu.activate(), Some(MenuResolution::Delete(file())));
    }

    #[test]
    fn delete_confirmation_when_enabled() {
        let mut menu = ActionMenu::new();
        let opts = MenuOptions {
            confirm_delete: true,
            ..options()
        };
        menu.open_for(&file(), false, &opts);
        menu.cursor_up();

        assert_eq!(menu.activate(), Some(MenuResolution::ConfirmDelete(file())));
        assert!(menu.is_confirming());
        assert_eq!(menu.confirm(false), None);
        assert!(!menu.is_confirming());

        let _ = menu.activate();
        assert_eq!(menu.confirm(true), Some(MenuResolution::Delete(file())));
    }

    #[test]
    fn close_clears_everything() {
        let mut menu = ActionMenu::new();
        menu.open_for(&dir(), false, &options());
        menu.cursor_down();
        menu.close();

        assert!(!menu.is_visible());
        assert!(menu.target().is_none());
        assert!(menu.actions().is_empty());
        assert_eq!(menu.activate(), None);
    }
}
