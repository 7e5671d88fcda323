//! `src/fs/tree.rs`
//! ============================================================================
//! # FileSystemTree: lazily expanded view of one root directory
//!
//! Only the root's immediate children are listed on [`FileSystemTree::load`].
//! A directory's children are read from disk the moment it is expanded and
//! dropped entirely when it is collapsed, so the next expansion lists the
//! disk again. Nothing is watched: [`FileSystemTree::reload_from`] and
//! [`FileSystemTree::refresh`] are the only ways to pick up outside changes.
//!
//! Listing failures never abort a load. The affected directory gets a single
//! unexpandable placeholder child instead.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::error::AppError;
use crate::fs::entry::{Entry, EntryKind, PlaceholderKind};
use crate::fs::operator::FileSystemOps;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub entry: Entry,

    /// Empty until the directory is expanded
    pub children: Vec<TreeNode>,

    pub expanded: bool,
}

impl TreeNode {
    #[must_use]
    pub fn new(entry: Entry) -> Self {
        Self {
            entry,
            children: Vec::new(),
            expanded: false,
        }
    }

    fn collect_expanded(&self, out: &mut HashSet<PathBuf>) {
        if self.expanded {
            out.insert(self.entry.path.clone());
        }
        for child in &self.children {
            child.collect_expanded(out);
        }
    }
}

/// One line of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub entry: Entry,
    pub depth: usize,
    pub expanded: bool,
}

pub struct FileSystemTree {
    fs: Arc<dyn FileSystemOps>,
    root: Option<TreeNode>,
    show_hidden: bool,
}

impl std::fmt::Debug for FileSystemTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemTree")
            .field("root", &self.root_path())
            .field("show_hidden", &self.show_hidden)
            .finish_non_exhaustive()
    }
}

impl FileSystemTree {
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystemOps>, show_hidden: bool) -> Self {
        Self {
            fs,
            root: None,
            show_hidden,
        }
    }

    #[must_use]
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn root_path(&self) -> Option<&Path> {
        self.root.as_ref().map(|r| r.entry.path.as_path())
    }

    #[must_use]
    pub const fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    /// Toggle hidden entries. Takes effect on the next listing.
    pub fn set_show_hidden(&mut self, show: bool) {
        self.show_hidden = show;
    }

    /// Replace the whole tree with `path` and its immediate children.
    ///
    /// Fails only when `path` does not exist; the previous tree is kept in
    /// that case.
    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    pub fn load(&mut self, path: &Path) -> Result<(), AppError> {
        let mut root = TreeNode::new(Entry::new(path.to_path_buf(), EntryKind::Directory));

        match self.fs.list_children(path) {
            Err(AppError::NotFound(p)) => return Err(AppError::NotFound(p)),
            result => {
                root.children = self.nodes_from_listing(path, result);
            }
        }
        root.expanded = true;
        root.entry.children_loaded = true;

        info!(
            marker = "TREE_LOAD",
            path = %path.display(),
            children = root.children.len(),
            "Tree root loaded"
        );
        self.root = Some(root);
        Ok(())
    }

    /// Populate `path` from disk if needed and mark it expanded.
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn expand(&mut self, path: &Path) -> Result<&[TreeNode], AppError> {
        let fs: &dyn FileSystemOps = self.fs.as_ref();
        let show_hidden: bool = self.show_hidden;

        let node: &mut TreeNode = self
            .root
            .as_mut()
            .and_then(|r| find_mut(r, path))
            .ok_or_else(|| AppError::NotFound(path.to_path_buf()))?;

        if !node.entry.is_dir() {
            return Err(AppError::collaborator("expand", path, "not a directory"));
        }

        if !node.entry.children_loaded {
            node.children = list_nodes(fs, path, show_hidden);
            node.entry.children_loaded = true;
            debug!(children = node.children.len(), "Directory listed on expand");
        }
        node.expanded = true;

        Ok(&node.children)
    }

    /// Hide `path`'s children and forget them.
    pub fn collapse(&mut self, path: &Path) {
        if let Some(node) = self.root.as_mut().and_then(|r| find_mut(r, path)) {
            node.expanded = false;
            node.children.clear();
            node.entry.children_loaded = false;
        }
    }

    pub fn toggle(&mut self, path: &Path) -> Result<(), AppError> {
        match self.find(path) {
            Some(node) if node.expanded => {
                self.collapse(path);
                Ok(())
            }
            _ => self.expand(path).map(|_| ()),
        }
    }

    #[must_use]
    pub fn find(&self, path: &Path) -> Option<&TreeNode> {
        self.root.as_ref().and_then(|r| find(r, path))
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.find(path).is_some()
    }

    /// Re-list the closest directory at or above `path` that is both in the
    /// tree and still on disk. Expanded subdirectories that survive stay
    /// expanded.
    #[instrument(level = "debug", skip(self), fields(path = %path.display(), reloaded))]
    pub fn reload_from(&mut self, path: &Path) -> Result<(), AppError> {
        let Some(root_path) = self.root_path().map(Path::to_path_buf) else {
            return Ok(());
        };

        for ancestor in path.ancestors() {
            if !ancestor.starts_with(&root_path) {
                break;
            }
            let is_loaded_dir: bool = self
                .find(ancestor)
                .is_some_and(|n| n.entry.is_dir() && n.entry.children_loaded);
            if !is_loaded_dir {
                continue;
            }

            match self.fs.list_children(ancestor) {
                Err(AppError::NotFound(_)) => continue,
                result => {
                    self.rebuild_node(ancestor, result);
                    tracing::Span::current().record(
                        "reloaded",
                        tracing::field::display(ancestor.display()),
                    );
                    return Ok(());
                }
            }
        }

        self.refresh()
    }

    /// Re-list the root, re-expanding directories that were expanded and
    /// still exist.
    #[instrument(level = "info", skip(self))]
    pub fn refresh(&mut self) -> Result<(), AppError> {
        let Some(root_path) = self.root_path().map(Path::to_path_buf) else {
            return Ok(());
        };

        let result = self.fs.list_children(&root_path);
        if let Err(AppError::NotFound(p)) = result {
            warn!(marker = "TREE_ROOT_GONE", path = %p.display(), "Root vanished on refresh");
            return Err(AppError::NotFound(p));
        }

        self.rebuild_node(&root_path, result);
        Ok(())
    }

    /// Depth-first flattening of everything currently shown. The root itself
    /// is not a row.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows: Vec<VisibleRow> = Vec::new();
        if let Some(root) = &self.root {
            for child in &root.children {
                push_rows(child, 0, &mut rows);
            }
        }
        rows
    }

    fn rebuild_node(&mut self, path: &Path, listing: Result<Vec<Entry>, AppError>) {
        let fs: &dyn FileSystemOps = self.fs.as_ref();
        let show_hidden: bool = self.show_hidden;

        let Some(node) = self.root.as_mut().and_then(|r| find_mut(r, path)) else {
            return;
        };

        let mut expanded: HashSet<PathBuf> = HashSet::new();
        node.collect_expanded(&mut expanded);

        let mut children: Vec<TreeNode> = build_nodes(path, listing, show_hidden);
        reexpand(fs, &mut children, &expanded, show_hidden);

        node.children = children;
        node.entry.children_loaded = true;
        node.expanded = true;
    }

    fn nodes_from_listing(
        &self,
        dir: &Path,
        listing: Result<Vec<Entry>, AppError>,
    ) -> Vec<TreeNode> {
        build_nodes(dir, listing, self.show_hidden)
    }
}

fn list_nodes(fs: &dyn FileSystemOps, dir: &Path, show_hidden: bool) -> Vec<TreeNode> {
    build_nodes(dir, fs.list_children(dir), show_hidden)
}

fn build_nodes(
    dir: &Path,
    listing: Result<Vec<Entry>, AppError>,
    show_hidden: bool,
) -> Vec<TreeNode> {
    match listing {
        // Already in display order
        Ok(entries) => entries
            .into_iter()
            .filter(|e| show_hidden || !e.is_hidden())
            .map(TreeNode::new)
            .collect(),
        Err(AppError::PermissionDenied(_)) => {
            debug!(dir = %dir.display(), "Listing denied");
            vec![TreeNode::new(Entry::placeholder(
                dir,
                PlaceholderKind::PermissionDenied,
            ))]
        }
        Err(e) => {
            warn!(marker = "TREE_LIST_ERROR", dir = %dir.display(), error = %e, "Listing failed");
            vec![TreeNode::new(Entry::placeholder(dir, PlaceholderKind::Error))]
        }
    }
}

fn reexpand(
    fs: &dyn FileSystemOps,
    nodes: &mut [TreeNode],
    expanded: &HashSet<PathBuf>,
    show_hidden: bool,
) {
    for node in nodes.iter_mut() {
        if node.entry.is_dir() && expanded.contains(&node.entry.path) {
            let mut children: Vec<TreeNode> = list_nodes(fs, &node.entry.path, show_hidden);
            reexpand(fs, &mut children, expanded, show_hidden);
            node.children = children;
            node.entry.children_loaded = true;
            node.expanded = true;
        }
    }
}

fn push_rows(node: &TreeNode, depth: usize, rows: &mut Vec<VisibleRow>) {
    rows.push(VisibleRow {
        entry: node.entry.clone(),
        depth,
        expanded: node.expanded,
    });
    if node.expanded {
        for child in &node.children {
            push_rows(child, depth + 1, rows);
        }
    }
}

fn find<'a>(node: &'a TreeNode, path: &Path) -> Option<&'a TreeNode> {
    if node.entry.path == path && !node.entry.is_placeholder() {
        return Some(node);
    }
    if !path.starts_with(&node.entry.path) {
        return None;
    }
    node.children.iter().find_map(|c| find(c, path))
}

fn find_mut<'a>(node: &'a mut TreeNode, path: &Path) -> Option<&'a mut TreeNode> {
    if node.entry.path == path && !node.entry.is_placeholder() {
        return Some(node);
    }
    if !path.starts_with(&node.entry.path) {
        return None;
    }
    node.children.iter_mut().find_map(|c| find_mut(c, path))
}
