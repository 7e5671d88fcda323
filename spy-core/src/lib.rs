pub mod error;

pub mod config;

pub mod audio;

pub mod fs {
    pub mod entry;
    pub use entry::{Entry, EntryKind, PlaceholderKind};

    pub mod operator;
    pub use operator::{FileSystemOps, LocalFileSystem};

    pub mod tree;
    pub use tree::{FileSystemTree, TreeNode, VisibleRow};
}

pub mod model {
    pub mod navigation;
    pub use navigation::{NavigationOutcome, NavigationState};

    pub mod action_menu;
    pub use action_menu::{ActionKind, ActionMenu, MenuOptions, MenuResolution};

    pub mod input_prompt;
    pub use input_prompt::{InputPrompt, PromptSubmission};

    pub mod ui_state;
    pub use ui_state::{BatchSnapshot, Mode, Notification, NotificationLevel, UIState};
}

pub mod tasks {
    pub mod batch_runner;
    pub use batch_runner::{
        BatchDigest, BatchEvent, BatchHandle, BatchJob, BatchOutcome, BatchRunner, BatchSummary,
        OperationKind, OutcomeStatus,
    };
}

pub mod controller {
    pub mod actions;
    pub use actions::Action;

    pub mod keymap;
    pub use keymap::map_key;

    pub mod workflow;
    pub use workflow::Workflow;
}

pub mod view {
    pub mod icons;

    pub mod theme;
    pub use theme::Palette;

    pub mod ui;
    pub use ui::UIRenderer;

    pub mod components {
        pub mod action_menu_overlay;
        pub use action_menu_overlay::ActionMenuOverlay;
        pub mod batch_panel;
        pub use batch_panel::BatchPanel;
        pub mod input_prompt_overlay;
        pub use input_prompt_overlay::InputPromptOverlay;
        pub mod notification_overlay;
        pub use notification_overlay::NotificationOverlay;
        pub mod status_bar;
        pub use status_bar::StatusBar;
        pub mod tree_view;
        pub use tree_view::TreeView;
    }
}

pub mod logging;
pub use logging::Logger;

pub use error::AppError;
