//! src/view/icons.rs
//! ============================================================================
//! # Tree Icons (Nerd Fonts)

use crate::fs::entry::{EntryKind, PlaceholderKind};

pub const FOLDER_ICON: &str = "";
pub const FOLDER_OPEN_ICON: &str = "";
pub const FILE_ICON: &str = "";
pub const AUDIO_ICON: &str = "";
pub const LOCK_ICON: &str = "";
pub const WARN_ICON: &str = "";

#[must_use]
pub const fn for_row(kind: EntryKind, expanded: bool, is_audio: bool) -> &'static str {
    match kind {
        EntryKind::Directory if expanded => FOLDER_OPEN_ICON,
        EntryKind::Directory => FOLDER_ICON,
        EntryKind::File if is_audio => AUDIO_ICON,
        EntryKind::File => FILE_ICON,
        EntryKind::Placeholder(PlaceholderKind::PermissionDenied) => LOCK_ICON,
        EntryKind::Placeholder(PlaceholderKind::Error) => WARN_ICON,
    }
}
