//! src/model/input_prompt.rs
//! ============================================================================
//! # InputPrompt: single-line name entry bound to a pending action
//!
//! The prompt owns only the buffer and its validation. Running the bound
//! operation is the controller's job; the prompt stays open with its buffer
//! intact until the controller reports success.

use std::path::{Path, PathBuf};

use crate::audio::MetadataMap;
use crate::error::AppError;
use crate::model::action_menu::ActionKind;

/// A validated submission, ready to hand to a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSubmission {
    CreateFile(PathBuf),
    CreateDirectory(PathBuf),
    Rename { from: PathBuf, to: PathBuf },
    WriteMetadata { target: PathBuf, fields: MetadataMap },
}

#[derive(Debug, Clone, Default)]
pub struct InputPrompt {
    pending_action: Option<ActionKind>,
    context_path: Option<PathBuf>,
    buffer: String,

    /// Byte offset into `buffer`, always on a char boundary
    cursor: usize,

    pub error: Option<String>,
}

impl InputPrompt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, action: ActionKind, context: PathBuf) {
        self.pending_action = Some(action);
        self.context_path = Some(context);
        self.buffer.clear();
        self.cursor = 0;
        self.error = None;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.pending_action.is_some()
    }

    #[must_use]
    pub const fn pending_action(&self) -> Option<ActionKind> {
        self.pending_action
    }

    #[must_use]
    pub fn context_path(&self) -> Option<&Path> {
        self.context_path.as_deref()
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in characters, for placing the terminal cursor.
    #[must_use]
    pub fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        self.error = None;
    }

    pub fn delete_char_before(&mut self) -> bool {
        let Some((pos, _)) = self.buffer[..self.cursor].char_indices().next_back() else {
            return false;
        };
        self.buffer.remove(pos);
        self.cursor = pos;
        self.error = None;
        true
    }

    pub fn delete_char_at(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        self.buffer.remove(self.cursor);
        self.error = None;
        true
    }

    pub fn move_left(&mut self) {
        if let Some((pos, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = pos;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub const fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// Validate the buffer against the pending action.
    ///
    /// On failure the message is also stored in `error`; nothing else changes.
    pub fn submit(&mut self) -> Result<PromptSubmission, AppError> {
        let result: Result<PromptSubmission, AppError> = self.build_submission();
        if let Err(e) = &result {
            self.error = Some(e.inline_message());
        }
        result
    }

    fn build_submission(&self) -> Result<PromptSubmission, AppError> {
        let (Some(action), Some(context)) = (self.pending_action, self.context_path.as_ref())
        else {
            return Err(AppError::Other("no pending action".into()));
        };

        let value: &str = self.buffer.trim();
        if value.is_empty() {
            return Err(AppError::EmptyInput);
        }

        match action {
            ActionKind::NewFile => {
                validate_name(value)?;
                Ok(PromptSubmission::CreateFile(context.join(value)))
            }
            ActionKind::NewFolder => {
                validate_name(value)?;
                Ok(PromptSubmission::CreateDirectory(context.join(value)))
            }
            ActionKind::Rename => {
                validate_name(value)?;
                let parent: &Path = context.parent().ok_or_else(|| {
                    AppError::collaborator("rename", context.clone(), "cannot rename the root")
                })?;
                Ok(PromptSubmission::Rename {
                    from: context.clone(),
                    to: parent.join(value),
                })
            }
            ActionKind::EditMetadata => Ok(PromptSubmission::WriteMetadata {
                target: context.clone(),
                fields: parse_tag_assignment(value)?,
            }),
            other => Err(AppError::Other(format!("{other} takes no input"))),
        }
    }
}

/// A usable single path component.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name == "." || name == ".." {
        return Err(AppError::invalid_name(name, "reserved name"));
    }
    if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        return Err(AppError::invalid_name(name, "contains a path separator"));
    }
    if name.contains('\0') {
        return Err(AppError::invalid_name(name, "contains a NUL byte"));
    }
    Ok(())
}

/// `field=value`, with the field lower-cased.
fn parse_tag_assignment(input: &str) -> Result<MetadataMap, AppError> {
    let Some((field, value)) = input.split_once('=') else {
        return Err(AppError::invalid_name(input, "expected field=value"));
    };

    let field: String = field.trim().to_ascii_lowercase();
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::invalid_name(input, "field must be a plain tag name"));
    }

    let mut fields: MetadataMap = MetadataMap::new();
    fields.insert(field, value.trim().to_string());
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(action: ActionKind, context: &str) -> InputPrompt {
        let mut p = InputPrompt::new();
        p.open(action, PathBuf::from(context));
        p
    }

    fn type_str(p: &mut InputPrompt, s: &str) {
        for ch in s.chars() {
            p.insert_char(ch);
        }
    }

    #[test]
    fn cursor_editing() {
        let mut p = prompt(ActionKind::NewFile, "/music");
        type_str(&mut p, "sóng");
        p.move_left();
        p.move_left();
        p.delete_char_before();
        assert_eq!(p.buffer(), "sng");
        assert_eq!(p.cursor_column(), 1);

        p.move_home();
        p.delete_char_at();
        p.move_end();
        p.insert_char('!');
        assert_eq!(p.buffer(), "ng!");
        assert!(!p.delete_char_at());
    }

    #[test]
    fn blank_submit_is_rejected_and_keeps_prompt_open() {
        let mut p = prompt(ActionKind::NewFolder, "/music");
        type_str(&mut p, "   ");

        assert!(matches!(p.submit(), Err(AppError::EmptyInput)));
        assert!(p.is_open());
        assert_eq!(p.buffer(), "   ");
        assert!(p.error.is_some());
    }

    #[test]
    fn new_file_and_rename_targets() {
        let mut p = prompt(ActionKind::NewFile, "/music");
        type_str(&mut p, " a.mp3 ");
        assert_eq!(
            p.submit().unwrap(),
            PromptSubmission::CreateFile(PathBuf::from("/music/a.mp3"))
        );

        let mut p = prompt(ActionKind::Rename, "/music/old.mp3");
        type_str(&mut p, "new.mp3");
        assert_eq!(
            p.submit().unwrap(),
            PromptSubmission::Rename {
                from: PathBuf::from("/music/old.mp3"),
                to: PathBuf::from("/music/new.mp3"),
            }
        );
    }

    #[test]
    fn separators_and_dot_names_are_invalid() {
        for bad in ["a/b", ".", ".."] {
            let mut p = prompt(ActionKind::NewFolder, "/music");
            type_str(&mut p, bad);
            assert!(
                matches!(p.submit(), Err(AppError::InvalidName { .. })),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn edit_metadata_parses_assignment() {
        let mut p = prompt(ActionKind::EditMetadata, "/music/a.mp3");
        type_str(&mut p, "Artist = Nina Simone");
        let PromptSubmission::WriteMetadata { fields, .. } = p.submit().unwrap() else {
            panic!("wrong submission kind");
        };
        assert_eq!(fields["artist"], "Nina Simone");

        let mut p = prompt(ActionKind::EditMetadata, "/music/a.mp3");
        type_str(&mut p, "no equals sign");
        assert!(p.submit().is_err());
    }

    #[test]
    fn close_resets_state() {
        let mut p = prompt(ActionKind::NewFile, "/music");
        type_str(&mut p, "x");
        p.close();
        assert!(!p.is_open());
        assert!(p.buffer().is_empty());
        assert!(p.context_path().is_none());
    }
}
