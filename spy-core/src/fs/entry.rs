//! `src/fs/entry.rs`
//! ============================================================
//! One filesystem node as the navigator displays it.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use compact_str::CompactString;

/// Why a synthetic child stands in for a directory's real contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    PermissionDenied,
    Error,
}

impl PlaceholderKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Permission denied",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    /// Unexpandable stand-in produced by a failed listing
    Placeholder(PlaceholderKind),
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => write!(f, "Dir"),
            Self::File => write!(f, "File"),
            Self::Placeholder(kind) => write!(f, "{}", kind.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Absolute path
    pub path: PathBuf,

    pub name: CompactString,

    pub kind: EntryKind,

    pub children_loaded: bool,
}

impl Entry {
    #[must_use]
    pub fn new(path: PathBuf, kind: EntryKind) -> Self {
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .map_or_else(|| CompactString::new(path.to_string_lossy()), CompactString::new);

        Self {
            path,
            name,
            kind,
            children_loaded: false,
        }
    }

    /// Synthetic child of `parent` that records why its listing failed.
    #[must_use]
    pub fn placeholder(parent: &Path, kind: PlaceholderKind) -> Self {
        Self {
            path: parent.to_path_buf(),
            name: CompactString::const_new(""),
            kind: EntryKind::Placeholder(kind),
            children_loaded: true,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    #[inline]
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.kind, EntryKind::Placeholder(_))
    }

    /// Text shown in the tree.
    #[must_use]
    pub fn label(&self) -> &str {
        match self.kind {
            EntryKind::Placeholder(kind) => kind.label(),
            _ => self.name.as_str(),
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Directories first, then files; each group by case-insensitive name.
#[must_use]
pub fn display_order(a: &Entry, b: &Entry) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: EntryKind) -> Entry {
        Entry::new(PathBuf::from("/root").join(name), kind)
    }

    #[test]
    fn directories_sort_before_files_case_insensitively() {
        let mut entries = vec![
            entry("b.txt", EntryKind::File),
            entry("Zed", EntryKind::Directory),
            entry("A.mp3", EntryKind::File),
            entry("alpha", EntryKind::Directory),
        ];
        entries.sort_by(display_order);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha", "Zed", "A.mp3", "b.txt"]);
    }

    #[test]
    fn placeholder_uses_its_label() {
        let p = Entry::placeholder(Path::new("/locked"), PlaceholderKind::PermissionDenied);
        assert_eq!(p.label(), "Permission denied");
        assert!(!p.is_dir());
    }
}
