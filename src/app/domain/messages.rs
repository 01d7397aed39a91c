use super::document::DocumentId;
use super::language::LanguageMode;

/// Where an editor content change came from.
///
/// Only user edits make a document dirty; programmatic loads (tab switch,
/// file open, session restore) must not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    User,
    Programmatic,
}

/// All commands a front end can send to `AppState::dispatch`.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // File
    FileNew,
    FileOpen,
    FileSave,
    FileSaveAs,

    // Tabs
    CloseTab(DocumentId),
    CloseActiveTab,
    SwitchTab(DocumentId),
    NextTab,
    PrevTab,
    MoveTab { from: usize, to: usize },

    // Edit
    InsertText(String),
    Undo,
    Redo,
    Copy,
    Paste,
    PasteFromHistory(usize),
    GoToLine(usize),
    FindNext(String),
    ReplaceAll { find: String, replace: String },

    // Tools
    DuplicateLine,
    MoveLineUp,
    MoveLineDown,
    SortLines,
    TrimWhitespace,
    UpperCase,
    LowerCase,

    // View
    SetLanguage(LanguageMode),
    ToggleTheme,
    ZoomIn,
    ZoomOut,
    ToggleWordWrap,
    TogglePreview,
}
