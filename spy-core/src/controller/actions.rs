//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Navigator Commands
//!
//! Every key press is translated into one `Action` by the keymap before the
//! workflow controller sees it, so the controller never inspects raw terminal
//! events.

/// Represents a high-level command the navigator can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Browsing
    /// Move the tree cursor up.
    MoveSelectionUp,

    /// Move the tree cursor down.
    MoveSelectionDown,

    /// Expand the highlighted directory in place.
    Expand,

    /// Collapse the highlighted directory, or jump to its parent row.
    Collapse,

    /// Descend into the highlighted directory, or open the menu on a file.
    EnterSelected,

    /// Return to the previous root.
    GoBack,

    /// Open the action menu for the highlighted entry.
    ShowActions,

    /// Re-list the tree from disk.
    Refresh,

    ToggleShowHidden,

    /// Ask the running batch to stop after the current item.
    CancelBatch,

    /// Hide the finished batch report.
    DismissBatch,

    Quit,

    // Action menu
    MenuUp,
    MenuDown,
    MenuActivate,

    /// Answer to the delete confirmation.
    ConfirmDelete(bool),

    // Input prompt
    PromptInsert(char),
    PromptBackspace,
    PromptDelete,
    PromptLeft,
    PromptRight,
    PromptHome,
    PromptEnd,
    PromptSubmit,

    /// Leave the menu or prompt without side effects.
    Escape,

    /// Periodic redraw for progress and notification expiry.
    Tick,

    /// A terminal resize event.
    Resize(u16, u16),

    /// No operation. Used when an event is consumed but no state change is needed.
    NoOp,
}
