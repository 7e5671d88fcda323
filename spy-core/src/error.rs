//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Navigator
//!
//! Every fallible operation in the navigator, the filesystem collaborator and
//! the audio collaborator returns `Result<T, AppError>`. None of these errors
//! is fatal to the session: the controller turns them into inline messages on
//! the menu or prompt that produced them.

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Unified error type for all navigator operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error that could not be classified further.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Permissions error for file/directory access.
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// Requested file or directory does not exist.
    #[error("File or directory not found: {0:?}")]
    NotFound(PathBuf),

    /// Target of a create/rename already exists.
    #[error("An entry named {0:?} already exists")]
    NameCollision(PathBuf),

    /// Name typed into the prompt is not a usable single path component.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The prompt was submitted with nothing but whitespace.
    #[error("Name cannot be empty")]
    EmptyInput,

    /// The filesystem or audio operation itself failed.
    #[error("{operation} failed on {path:?}: {reason}")]
    CollaboratorFailure {
        operation: String, // "create", "delete", "convert", ...
        path: PathBuf,
        reason: String,
    },

    /// Serialization or deserialization error (ffprobe JSON).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// External process failure (ffmpeg / ffprobe).
    #[error("External command failed: {cmd} (exit code: {code:?})\n{stderr}")]
    ExternalCmd {
        cmd: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Operation cancelled by user or system.
    #[error("Operation was cancelled")]
    Cancelled,

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Classify an `io::Error` raised by `operation` on `path`.
    pub fn from_io<S: Into<String>>(operation: S, path: &Path, err: io::Error) -> Self {
        match err.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),

            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),

            ErrorKind::AlreadyExists => Self::NameCollision(path.to_path_buf()),

            ErrorKind::InvalidInput => Self::InvalidName {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                reason: err.to_string(),
            },

            _ => Self::CollaboratorFailure {
                operation: operation.into(),
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        }
    }

    /// Create a collaborator failure error
    pub fn collaborator<S1, P, S2>(operation: S1, path: P, reason: S2) -> Self
    where
        S1: Into<String>,
        P: Into<PathBuf>,
        S2: Into<String>,
    {
        Self::CollaboratorFailure {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid name error
    pub fn invalid_name<S1: Into<String>, S2: Into<String>>(name: S1, reason: S2) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Short, human-readable form used for inline messages.
    #[must_use]
    pub fn inline_message(&self) -> String {
        match self {
            Self::PermissionDenied(path) => format!("Permission denied: {}", display_name(path)),
            Self::NotFound(path) => format!("Not found: {}", display_name(path)),
            Self::NameCollision(path) => format!("'{}' already exists", display_name(path)),
            Self::CollaboratorFailure { reason, .. } => reason.clone(),
            Self::ExternalCmd { cmd, stderr, .. } => {
                let last = stderr.lines().rev().find(|l| !l.trim().is_empty());
                format!("{cmd}: {}", last.unwrap_or("failed"))
            }
            other => other.to_string(),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// Manual Clone implementation to handle non-Clone fields
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
            Self::PermissionDenied(path) => Self::PermissionDenied(path.clone()),
            Self::NotFound(path) => Self::NotFound(path.clone()),
            Self::NameCollision(path) => Self::NameCollision(path.clone()),
            Self::InvalidName { name, reason } => Self::InvalidName {
                name: name.clone(),
                reason: reason.clone(),
            },
            Self::EmptyInput => Self::EmptyInput,
            Self::CollaboratorFailure {
                operation,
                path,
                reason,
            } => Self::CollaboratorFailure {
                operation: operation.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Serde(e) => Self::Other(format!("Serde error: {e}")),
            Self::ExternalCmd { cmd, code, stderr } => Self::ExternalCmd {
                cmd: cmd.clone(),
                code: *code,
                stderr: stderr.clone(),
            },
            Self::Cancelled => Self::Cancelled,
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
