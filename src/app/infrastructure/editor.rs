use serde::{Deserialize, Serialize};

use crate::app::domain::{CursorPos, LanguageMode, ScrollPos, UndoState};
use crate::app::services::text_ops::{clamp_cursor, cursor_to_offset, offset_to_cursor};

/// The embedded text-editing widget.
///
/// The widget owns the live text, cursor, scroll offsets and undo history of
/// the active document. Only `replace_selection`, `apply_edit`, `undo` and
/// `redo` count as user edits; `set_content` is a programmatic load.
pub trait EditorWidget {
    fn content(&self) -> String;
    fn set_content(&mut self, text: &str);

    fn cursor(&self) -> CursorPos;
    fn set_cursor(&mut self, pos: CursorPos);

    fn scroll(&self) -> ScrollPos;
    fn set_scroll(&mut self, pos: ScrollPos);

    fn undo_state(&self) -> UndoState;
    fn set_undo_state(&mut self, state: UndoState);

    fn language_mode(&self) -> LanguageMode;
    fn set_language_mode(&mut self, mode: LanguageMode);

    /// Ordered `(from, to)` selection, `None` when nothing is selected.
    fn selection(&self) -> Option<(CursorPos, CursorPos)>;
    fn set_selection(&mut self, from: CursorPos, to: CursorPos);

    /// Replace the selection (or insert at the cursor) as a user edit.
    fn replace_selection(&mut self, text: &str);
    /// Replace the whole text as a single undoable user edit.
    fn apply_edit(&mut self, text: &str);

    fn undo(&mut self) -> bool;
    fn redo(&mut self) -> bool;

    fn selected_text(&self) -> String {
        match self.selection() {
            Some((from, to)) => {
                let text = self.content();
                let start = cursor_to_offset(&text, from);
                let end = cursor_to_offset(&text, to);
                text[start..end].to_string()
            }
            None => String::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct History {
    #[serde(default)]
    done: Vec<String>,
    #[serde(default)]
    undone: Vec<String>,
}

/// Headless editor widget with snapshot-based undo, used by the terminal
/// front end and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryEditor {
    text: String,
    cursor: CursorPos,
    anchor: Option<CursorPos>,
    scroll: ScrollPos,
    language: LanguageMode,
    done: Vec<String>,
    undone: Vec<String>,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_edit(&mut self) {
        self.done.push(self.text.clone());
        self.undone.clear();
    }
}

impl EditorWidget for MemoryEditor {
    fn content(&self) -> String {
        self.text.clone()
    }

    fn set_content(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = CursorPos::default();
        self.anchor = None;
        self.scroll = ScrollPos::default();
    }

    fn cursor(&self) -> CursorPos {
        self.cursor
    }

    fn set_cursor(&mut self, pos: CursorPos) {
        self.cursor = clamp_cursor(&self.text, pos);
        self.anchor = None;
    }

    fn scroll(&self) -> ScrollPos {
        self.scroll
    }

    fn set_scroll(&mut self, pos: ScrollPos) {
        self.scroll = pos;
    }

    fn undo_state(&self) -> UndoState {
        let history = History {
            done: self.done.clone(),
            undone: self.undone.clone(),
        };
        UndoState::from_value(serde_json::to_value(history).unwrap_or_default())
    }

    fn set_undo_state(&mut self, state: UndoState) {
        let history: History = serde_json::from_value(state.as_value().clone()).unwrap_or_default();
        self.done = history.done;
        self.undone = history.undone;
    }

    fn language_mode(&self) -> LanguageMode {
        self.language
    }

    fn set_language_mode(&mut self, mode: LanguageMode) {
        self.language = mode;
    }

    fn selection(&self) -> Option<(CursorPos, CursorPos)> {
        let anchor = self.anchor?;
        let a = cursor_to_offset(&self.text, anchor);
        let b = cursor_to_offset(&self.text, self.cursor);
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some((anchor, self.cursor)),
            std::cmp::Ordering::Greater => Some((self.cursor, anchor)),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn set_selection(&mut self, from: CursorPos, to: CursorPos) {
        self.anchor = Some(clamp_cursor(&self.text, from));
        self.cursor = clamp_cursor(&self.text, to);
    }

    fn replace_selection(&mut self, text: &str) {
        let (start, end) = match self.selection() {
            Some((from, to)) => (
                cursor_to_offset(&self.text, from),
                cursor_to_offset(&self.text, to),
            ),
            None => {
                let at = cursor_to_offset(&self.text, self.cursor);
                (at, at)
            }
        };
        self.record_edit();
        self.text.replace_range(start..end, text);
        self.cursor = offset_to_cursor(&self.text, start + text.len());
        self.anchor = None;
    }

    fn apply_edit(&mut self, text: &str) {
        if text == self.text {
            return;
        }
        self.record_edit();
        self.text = text.to_string();
        self.cursor = clamp_cursor(&self.text, self.cursor);
        self.anchor = None;
    }

    fn undo(&mut self) -> bool {
        match self.done.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.text, previous);
                self.undone.push(current);
                self.cursor = clamp_cursor(&self.text, self.cursor);
                self.anchor = None;
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.text, next);
                self.done.push(current);
                self.cursor = clamp_cursor(&self.text, self.cursor);
                self.anchor = None;
                true
            }
            None => false,
        }
    }
}
