use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::language::LanguageMode;
use crate::app::services::text_ops::extract_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based cursor position. `column` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorPos {
    pub line: usize,
    pub column: usize,
}

impl CursorPos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPos {
    pub x: f64,
    pub y: f64,
}

/// Opaque undo/redo history owned by the editor widget.
///
/// The session only stores and hands it back; it never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UndoState(Value);

impl UndoState {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for UndoState {
    fn default() -> Self {
        Self(json!({ "done": [], "undone": [] }))
    }
}

/// Handle to the file a document was loaded from or saved to.
///
/// Only meaningful to the `FileStorage` that issued it and never persisted:
/// a restored session has no write-back targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef(String);

impl FileRef {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn locator(&self) -> &str {
        &self.0
    }

    /// Display name derived from the locator's last component.
    pub fn file_name(&self) -> String {
        extract_filename(&self.0)
    }
}

/// Lifecycle state derived from the file reference and dirty flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unsaved,
    Saved,
    Modified,
}

/// One open tab.
///
/// While a document is active its `content`, `cursor`, `scroll` and
/// `undo_state` are stale; the editor widget holds the live values until a
/// switch captures them back.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub content: String,
    pub file_ref: Option<FileRef>,
    pub language: LanguageMode,
    pub undo_state: Option<UndoState>,
    pub cursor: CursorPos,
    pub scroll: ScrollPos,
    is_dirty: bool,
}

impl Document {
    pub fn new(id: DocumentId, name: String, content: String, file_ref: Option<FileRef>) -> Self {
        let language = LanguageMode::from_file_name(&name);
        Self {
            id,
            name,
            content,
            file_ref,
            language,
            undo_state: None,
            cursor: CursorPos::default(),
            scroll: ScrollPos::default(),
            is_dirty: false,
        }
    }

    pub fn new_untitled(id: DocumentId, counter: u32) -> Self {
        let name = if counter <= 1 {
            "Untitled".to_string()
        } else {
            format!("Untitled {}", counter)
        };
        Self::new(id, name, String::new(), None)
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Restore a persisted dirty flag.
    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.is_dirty = dirty;
    }

    pub fn state(&self) -> DocumentState {
        match (self.is_dirty, self.file_ref.is_some()) {
            (true, _) => DocumentState::Modified,
            (false, true) => DocumentState::Saved,
            (false, false) => DocumentState::Unsaved,
        }
    }

    /// Never saved, never edited and empty: safe to replace with an opened file.
    pub fn is_pristine(&self) -> bool {
        self.file_ref.is_none() && !self.is_dirty && self.content.is_empty()
    }

    /// Adopt a new backing file after Save As.
    pub fn attach_file(&mut self, file_ref: FileRef) {
        self.name = file_ref.file_name();
        self.language = LanguageMode::from_file_name(&self.name);
        self.file_ref = Some(file_ref);
    }

    /// Tab label, with a trailing `*` while there are unsaved changes.
    pub fn tab_label(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}
