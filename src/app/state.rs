use tracing::{debug, info, warn};

use super::controllers::clipboard::ClipboardHistory;
use super::controllers::tabs::TabManager;
use super::domain::{
    AppSettings, ChangeOrigin, CursorPos, DocumentId, FileRef, LanguageMode, Message,
};
use super::infrastructure::clipboard::Clipboard;
use super::infrastructure::editor::EditorWidget;
use super::infrastructure::error::{AppError, Result};
use super::infrastructure::kv_store::KeyValueStore;
use super::infrastructure::notifier::Notifier;
use super::infrastructure::storage::FileStorage;
use super::services::line_ops;
use super::services::preview::{render_markdown, supports_preview};
use super::services::session::{self, SessionData};
use super::services::text_ops::{
    TextStats, cursor_to_offset, find_next_wrapping, line_count, offset_to_cursor,
    replace_all_in_text, text_stats,
};

/// Snapshot of what the status bar shows.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub name: String,
    pub language: LanguageMode,
    pub is_dirty: bool,
    pub cursor: CursorPos,
    pub stats: TextStats,
}

/// Application coordinator: owns the document collection and drives the
/// editor widget, file storage, clipboard and persistent store.
pub struct AppState<F: FileStorage, C: Clipboard> {
    pub tab_manager: TabManager,
    pub settings: AppSettings,
    pub clipboard_history: ClipboardHistory,
    editor: Box<dyn EditorWidget>,
    storage: F,
    clipboard: C,
    store: Box<dyn KeyValueStore>,
    notifier: Box<dyn Notifier>,
}

impl<F: FileStorage, C: Clipboard> AppState<F, C> {
    pub fn new(
        editor: Box<dyn EditorWidget>,
        storage: F,
        clipboard: C,
        store: Box<dyn KeyValueStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let settings = AppSettings::load(store.as_ref());
        let clipboard_history = ClipboardHistory::new(settings.clipboard_history_limit);

        Self {
            tab_manager: TabManager::new(),
            settings,
            clipboard_history,
            editor,
            storage,
            clipboard,
            store,
            notifier,
        }
    }

    /// Restore the previous session (when asked to and one exists) or start
    /// with a single empty document. Without `restore` the saved session is
    /// discarded.
    pub fn start(&mut self, restore: bool) {
        if !restore {
            if let Err(e) = session::clear_session(self.store.as_mut()) {
                warn!("Failed to discard saved session: {}", e);
            }
        }
        if !(restore && self.restore_session()) {
            self.create_document(None, String::new(), None);
        }
    }

    pub fn editor(&self) -> &dyn EditorWidget {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> &mut dyn EditorWidget {
        self.editor.as_mut()
    }

    pub fn storage_mut(&mut self) -> &mut F {
        &mut self.storage
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    // --- Session manager ---

    /// Append a document and make it active. `None` names it Untitled.
    pub fn create_document(
        &mut self,
        name: Option<String>,
        content: String,
        file_ref: Option<FileRef>,
    ) -> DocumentId {
        let id = match name {
            Some(name) => self.tab_manager.add(name, content, file_ref),
            None => self.tab_manager.add_untitled(),
        };
        self.switch_to_document(id);
        id
    }

    /// Switch the editor to display a different document. Unknown ids and
    /// the already active document are no-ops.
    pub fn switch_to_document(&mut self, id: DocumentId) -> bool {
        if self.tab_manager.doc_by_id(id).is_none() {
            debug!("Ignoring switch to unknown document {}", id);
            return false;
        }
        if self.tab_manager.active_id() == Some(id) {
            return true;
        }

        self.capture_active_state();
        self.tab_manager.set_active(id);
        self.bind_active_document();
        self.persist_session();
        debug!("Switched to document {}", id);
        true
    }

    /// Close a tab by id. The collection is refilled with an empty document
    /// when the last tab closes.
    pub fn close_document(&mut self, id: DocumentId) -> bool {
        let was_active = self.tab_manager.active_id() == Some(id);
        let closed = match self.tab_manager.remove(id) {
            Some(doc) => doc,
            None => return false,
        };
        debug!("Closed {} ({})", closed.name, id);

        if self.tab_manager.is_empty() {
            let fresh = self.tab_manager.add_untitled();
            self.tab_manager.set_active(fresh);
        }
        if was_active {
            self.bind_active_document();
        }
        self.persist_session();
        true
    }

    pub fn close_active_document(&mut self) -> bool {
        match self.tab_manager.active_id() {
            Some(id) => self.close_document(id),
            None => false,
        }
    }

    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        let moved = self.tab_manager.move_tab(from, to);
        if moved {
            self.persist_session();
        }
        moved
    }

    pub fn switch_to_next_tab(&mut self) {
        if let Some(next_id) = self.tab_manager.next_doc_id() {
            self.switch_to_document(next_id);
        }
    }

    pub fn switch_to_previous_tab(&mut self) {
        if let Some(prev_id) = self.tab_manager.prev_doc_id() {
            self.switch_to_document(prev_id);
        }
    }

    /// Copy the live editor state into the active document.
    fn capture_active_state(&mut self) {
        if self.tab_manager.active_id().is_none() {
            return;
        }
        let content = self.editor.content();
        let undo_state = self.editor.undo_state();
        let cursor = self.editor.cursor();
        let scroll = self.editor.scroll();
        if let Some(doc) = self.tab_manager.active_doc_mut() {
            doc.content = content;
            doc.undo_state = Some(undo_state);
            doc.cursor = cursor;
            doc.scroll = scroll;
        }
    }

    /// Push the active document's stored state into the editor.
    fn bind_active_document(&mut self) {
        if let Some(doc) = self.tab_manager.active_doc() {
            self.editor.set_content(&doc.content);
            self.editor.set_language_mode(doc.language);
            self.editor
                .set_undo_state(doc.undo_state.clone().unwrap_or_default());
            self.editor.set_cursor(doc.cursor);
            self.editor.set_scroll(doc.scroll);
        }
    }

    /// Write the session snapshot to the store. Failures are logged only:
    /// the in-memory session stays authoritative.
    pub fn persist_session(&mut self) {
        self.capture_active_state();
        let data = SessionData::capture(self.tab_manager.documents(), self.tab_manager.active_id());
        if let Err(e) = session::save_session(self.store.as_mut(), &data) {
            warn!("Failed to save session: {}", e);
        }
    }

    /// Replace the collection with the stored session. Returns false when
    /// there was nothing usable to restore.
    pub fn restore_session(&mut self) -> bool {
        let data = match session::load_session(self.store.as_ref()) {
            Some(data) => data,
            None => return false,
        };
        let (documents, active_id) = data.into_documents();
        let count = documents.len();
        self.tab_manager.restore(documents, active_id);
        self.bind_active_document();
        info!("Restored session with {} documents", count);
        true
    }

    /// Persist the final state before the front end exits.
    pub fn shutdown(&mut self) {
        self.persist_session();
    }

    // --- Edits ---

    /// Change notification from the editor widget.
    pub fn on_editor_change(&mut self, origin: ChangeOrigin) {
        if origin == ChangeOrigin::Programmatic {
            return;
        }
        if let Some(doc) = self.tab_manager.active_doc_mut() {
            if !doc.is_dirty() {
                debug!("{} modified", doc.name);
                doc.mark_dirty();
            }
        }
    }

    fn apply_user_edit(&mut self, text: &str) {
        self.editor.apply_edit(text);
        self.on_editor_change(ChangeOrigin::User);
    }

    pub fn insert_text(&mut self, text: &str) {
        self.editor.replace_selection(text);
        self.on_editor_change(ChangeOrigin::User);
    }

    pub fn undo(&mut self) {
        if self.editor.undo() {
            self.on_editor_change(ChangeOrigin::User);
        }
    }

    pub fn redo(&mut self) {
        if self.editor.redo() {
            self.on_editor_change(ChangeOrigin::User);
        }
    }

    // --- File operations ---

    /// Open a document for a file, switching to it if it is already open
    /// and reusing a sole pristine Untitled tab.
    fn open_document(&mut self, name: String, content: String, file_ref: FileRef) -> DocumentId {
        if let Some(existing) = self.tab_manager.find_by_file(&file_ref) {
            self.switch_to_document(existing);
            return existing;
        }

        if let Some(index) = self.reusable_slot() {
            if let Some((id, replaced)) =
                self.tab_manager
                    .replace_at(index, name.clone(), content.clone(), Some(file_ref.clone()))
            {
                debug!("Reusing the slot of {}", replaced.name);
                self.tab_manager.set_active(id);
                self.bind_active_document();
                self.persist_session();
                return id;
            }
        }

        self.create_document(Some(name), content, Some(file_ref))
    }

    fn reusable_slot(&self) -> Option<usize> {
        let index = self.tab_manager.sole_pristine_index()?;
        let live_text_present =
            self.tab_manager.active_index() == Some(index) && !self.editor.content().is_empty();
        if live_text_present { None } else { Some(index) }
    }

    pub async fn file_open(&mut self) -> Result<()> {
        let picked = match self.storage.pick_readable_file().await? {
            Some(picked) => picked,
            None => {
                debug!("Open cancelled");
                return Ok(());
            }
        };
        let content = String::from_utf8_lossy(&picked.bytes).into_owned();
        info!("Opened {}", picked.file_ref.locator());
        self.open_document(picked.name, content, picked.file_ref);
        Ok(())
    }

    /// Open a file handed to the application directly (launch request or
    /// drag-and-drop), without a picker.
    pub async fn open_file_ref(&mut self, file_ref: FileRef) -> Result<DocumentId> {
        if let Some(existing) = self.tab_manager.find_by_file(&file_ref) {
            self.switch_to_document(existing);
            return Ok(existing);
        }
        let bytes = self.storage.read_all(&file_ref).await?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        info!("Opened {}", file_ref.locator());
        Ok(self.open_document(file_ref.file_name(), content, file_ref))
    }

    pub async fn file_save(&mut self) -> Result<()> {
        let (id, file_ref) = match self.tab_manager.active_doc() {
            Some(doc) => (doc.id, doc.file_ref.clone()),
            None => return Ok(()),
        };
        let file_ref = match file_ref {
            Some(file_ref) => file_ref,
            None => return self.file_save_as().await,
        };

        let text = self.editor.content();
        self.storage.write_all(&file_ref, text.as_bytes()).await?;
        if let Some(doc) = self.tab_manager.doc_by_id_mut(id) {
            doc.mark_clean();
        }
        info!("Saved {}", file_ref.locator());
        self.persist_session();
        Ok(())
    }

    pub async fn file_save_as(&mut self) -> Result<()> {
        let (id, suggested) = match self.tab_manager.active_doc() {
            Some(doc) => (doc.id, doc.name.clone()),
            None => return Ok(()),
        };
        let file_ref = match self.storage.pick_writable_file(&suggested).await? {
            Some(file_ref) => file_ref,
            None => {
                debug!("Save As cancelled");
                return Ok(());
            }
        };

        let text = self.editor.content();
        self.storage.write_all(&file_ref, text.as_bytes()).await?;
        info!("Saved {}", file_ref.locator());

        if let Some(doc) = self.tab_manager.doc_by_id_mut(id) {
            doc.attach_file(file_ref);
            doc.mark_clean();
            let language = doc.language;
            self.editor.set_language_mode(language);
        }
        self.persist_session();
        Ok(())
    }

    // --- Search ---

    /// Select the next case-insensitive match after the cursor, wrapping to
    /// the top. Returns whether the search wrapped.
    pub fn find_next(&mut self, query: &str) -> Result<bool> {
        let text = self.editor.content();
        let from = match self.editor.selection() {
            Some((_, to)) => cursor_to_offset(&text, to),
            None => cursor_to_offset(&text, self.editor.cursor()),
        };
        let (range, wrapped) = find_next_wrapping(&text, query, from)
            .ok_or_else(|| AppError::SearchNotFound(query.to_string()))?;
        self.editor.set_selection(
            offset_to_cursor(&text, range.start),
            offset_to_cursor(&text, range.end),
        );
        Ok(wrapped)
    }

    /// Case-insensitive literal replace-all. Returns the number of
    /// replacements.
    pub fn replace_all(&mut self, find: &str, replace: &str) -> Result<usize> {
        let text = self.editor.content();
        let (new_text, count) = replace_all_in_text(&text, find, replace);
        if count == 0 {
            return Err(AppError::SearchNotFound(find.to_string()));
        }
        self.apply_user_edit(&new_text);
        info!("Replaced {} occurrences", count);
        Ok(count)
    }

    /// Move the cursor to the start of a 1-based line.
    pub fn goto_line(&mut self, line: usize) -> Result<()> {
        let text = self.editor.content();
        if line == 0 || line > line_count(&text) {
            return Err(AppError::InvalidLine(line));
        }
        self.editor.set_cursor(CursorPos::new(line - 1, 0));
        Ok(())
    }

    // --- Tools ---

    pub fn duplicate_line(&mut self) {
        let cursor = self.editor.cursor();
        if let Some(text) = line_ops::duplicate_line(&self.editor.content(), cursor.line) {
            self.apply_user_edit(&text);
            self.editor.set_cursor(cursor);
        }
    }

    pub fn move_line_up(&mut self) {
        let cursor = self.editor.cursor();
        if let Some(text) = line_ops::move_line_up(&self.editor.content(), cursor.line) {
            self.apply_user_edit(&text);
            self.editor
                .set_cursor(CursorPos::new(cursor.line - 1, cursor.column));
        }
    }

    pub fn move_line_down(&mut self) {
        let cursor = self.editor.cursor();
        if let Some(text) = line_ops::move_line_down(&self.editor.content(), cursor.line) {
            self.apply_user_edit(&text);
            self.editor
                .set_cursor(CursorPos::new(cursor.line + 1, cursor.column));
        }
    }

    /// Sort the selected lines, or the whole document without a selection.
    pub fn sort_lines(&mut self) {
        let range = self.editor.selection().map(|(from, to)| (from.line, to.line));
        let text = line_ops::sort_lines(&self.editor.content(), range);
        self.apply_user_edit(&text);
    }

    pub fn trim_whitespace(&mut self) {
        let cursor = self.editor.cursor();
        let text = line_ops::trim_trailing_whitespace(&self.editor.content());
        self.apply_user_edit(&text);
        self.editor.set_cursor(cursor);
    }

    pub fn change_case(&mut self, upper: bool) {
        let selected = self.editor.selected_text();
        if selected.is_empty() {
            return;
        }
        self.editor
            .replace_selection(&line_ops::change_case(&selected, upper));
        self.on_editor_change(ChangeOrigin::User);
    }

    // --- Clipboard ---

    /// Copy the selection, or the whole document when nothing is selected.
    pub async fn copy(&mut self) -> Result<()> {
        let mut text = self.editor.selected_text();
        if text.is_empty() {
            text = self.editor.content();
        }
        if text.is_empty() {
            return Ok(());
        }
        self.clipboard.write_text(&text).await?;
        self.clipboard_history.push(&text);
        Ok(())
    }

    pub async fn paste(&mut self) -> Result<()> {
        let text = self.clipboard.read_text().await?;
        if text.is_empty() {
            return Ok(());
        }
        self.insert_text(&text);
        self.clipboard_history.push(&text);
        Ok(())
    }

    pub fn paste_from_history(&mut self, index: usize) {
        let text = match self.clipboard_history.get(index) {
            Some(text) => text.to_string(),
            None => return,
        };
        self.insert_text(&text);
    }

    // --- View ---

    /// Override the active document's language mode.
    pub fn set_language(&mut self, mode: LanguageMode) {
        if let Some(doc) = self.tab_manager.active_doc_mut() {
            doc.language = mode;
        }
        self.editor.set_language_mode(mode);
        self.persist_session();
    }

    fn save_settings(&mut self) -> Result<()> {
        self.clipboard_history
            .set_limit(self.settings.clipboard_history_limit);
        self.settings.save(self.store.as_mut())
    }

    pub fn toggle_theme(&mut self) -> Result<()> {
        self.settings.theme_mode = self.settings.theme_mode.toggled();
        self.save_settings()
    }

    pub fn zoom_in(&mut self) -> Result<()> {
        self.settings.zoom_in();
        self.save_settings()
    }

    pub fn zoom_out(&mut self) -> Result<()> {
        self.settings.zoom_out();
        self.save_settings()
    }

    pub fn toggle_word_wrap(&mut self) -> Result<()> {
        self.settings.word_wrap_enabled = !self.settings.word_wrap_enabled;
        self.save_settings()
    }

    pub fn toggle_preview(&mut self) -> Result<()> {
        self.settings.preview_enabled = !self.settings.preview_enabled;
        self.save_settings()
    }

    /// Rendered Markdown of the active document while the preview is on.
    pub fn preview_html(&self) -> Option<String> {
        if !self.settings.preview_enabled {
            return None;
        }
        let doc = self.tab_manager.active_doc()?;
        if !supports_preview(doc.language) {
            return None;
        }
        Some(render_markdown(&self.editor.content()))
    }

    pub fn status(&self) -> Option<StatusInfo> {
        let doc = self.tab_manager.active_doc()?;
        Some(StatusInfo {
            name: doc.name.clone(),
            language: doc.language,
            is_dirty: doc.is_dirty(),
            cursor: self.editor.cursor(),
            stats: text_stats(&self.editor.content()),
        })
    }

    // --- Dispatch ---

    /// Run a command, reporting any failure through the notifier.
    pub async fn dispatch(&mut self, message: Message) {
        if let Err(e) = self.handle(message).await {
            warn!("{}", e);
            self.notifier.alert(&e.to_string());
        }
    }

    async fn handle(&mut self, message: Message) -> Result<()> {
        match message {
            Message::FileNew => {
                self.create_document(None, String::new(), None);
            }
            Message::FileOpen => self.file_open().await?,
            Message::FileSave => self.file_save().await?,
            Message::FileSaveAs => self.file_save_as().await?,

            Message::CloseTab(id) => {
                self.close_document(id);
            }
            Message::CloseActiveTab => {
                self.close_active_document();
            }
            Message::SwitchTab(id) => {
                self.switch_to_document(id);
            }
            Message::NextTab => self.switch_to_next_tab(),
            Message::PrevTab => self.switch_to_previous_tab(),
            Message::MoveTab { from, to } => {
                self.move_tab(from, to);
            }

            Message::InsertText(text) => self.insert_text(&text),
            Message::Undo => self.undo(),
            Message::Redo => self.redo(),
            Message::Copy => self.copy().await?,
            Message::Paste => self.paste().await?,
            Message::PasteFromHistory(index) => self.paste_from_history(index),
            Message::GoToLine(line) => self.goto_line(line)?,
            Message::FindNext(query) => {
                self.find_next(&query)?;
            }
            Message::ReplaceAll { find, replace } => {
                self.replace_all(&find, &replace)?;
            }

            Message::DuplicateLine => self.duplicate_line(),
            Message::MoveLineUp => self.move_line_up(),
            Message::MoveLineDown => self.move_line_down(),
            Message::SortLines => self.sort_lines(),
            Message::TrimWhitespace => self.trim_whitespace(),
            Message::UpperCase => self.change_case(true),
            Message::LowerCase => self.change_case(false),

            Message::SetLanguage(mode) => self.set_language(mode),
            Message::ToggleTheme => self.toggle_theme()?,
            Message::ZoomIn => self.zoom_in()?,
            Message::ZoomOut => self.zoom_out()?,
            Message::ToggleWordWrap => self.toggle_word_wrap()?,
            Message::TogglePreview => self.toggle_preview()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::{DocumentState, ScrollPos, ThemeMode};
    use crate::app::infrastructure::clipboard::MemoryClipboard;
    use crate::app::infrastructure::editor::MemoryEditor;
    use crate::app::infrastructure::kv_store::MemoryStore;
    use crate::app::infrastructure::notifier::MemoryNotifier;
    use crate::app::infrastructure::storage::FsStorage;
    use crate::app::services::session::SESSION_KEY;

    type TestState = AppState<FsStorage, MemoryClipboard>;

    fn state_with(store: &MemoryStore, clipboard: MemoryClipboard) -> (TestState, MemoryNotifier) {
        let notifier = MemoryNotifier::new();
        let mut state = AppState::new(
            Box::new(MemoryEditor::new()),
            FsStorage::new(),
            clipboard,
            Box::new(store.clone()),
            Box::new(notifier.clone()),
        );
        state.start(true);
        (state, notifier)
    }

    fn new_state() -> (TestState, MemoryStore, MemoryNotifier) {
        let store = MemoryStore::new();
        let (state, notifier) = state_with(&store, MemoryClipboard::new());
        (state, store, notifier)
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_starts_with_one_untitled_document() {
        let (state, _, _) = new_state();
        assert_eq!(state.tab_manager.count(), 1);
        let doc = state.tab_manager.active_doc().unwrap();
        assert_eq!(doc.name, "Untitled");
        assert_eq!(doc.state(), DocumentState::Unsaved);
    }

    #[test]
    fn test_switch_preserves_editor_state() {
        let (mut state, _, _) = new_state();
        let first = state.tab_manager.active_id().unwrap();
        state.insert_text("line one\nline two\nline three");
        state.editor_mut().set_cursor(CursorPos::new(1, 4));
        state.editor_mut().set_scroll(ScrollPos { x: 3.0, y: 120.5 });

        let second = state.create_document(None, String::new(), None);
        assert_eq!(state.tab_manager.active_id(), Some(second));
        assert_eq!(state.editor().content(), "");
        state.insert_text("other");

        assert!(state.switch_to_document(first));
        assert_eq!(state.editor().content(), "line one\nline two\nline three");
        assert_eq!(state.editor().cursor(), CursorPos::new(1, 4));
        assert_eq!(state.editor().scroll(), ScrollPos { x: 3.0, y: 120.5 });

        assert!(state.switch_to_document(second));
        assert_eq!(state.editor().content(), "other");
    }

    #[test]
    fn test_undo_history_is_per_document() {
        let (mut state, _, _) = new_state();
        let first = state.tab_manager.active_id().unwrap();
        state.insert_text("a");
        state.insert_text("b");

        let second = state.create_document(None, String::new(), None);
        state.insert_text("z");
        state.switch_to_document(first);

        state.undo();
        assert_eq!(state.editor().content(), "a");

        state.switch_to_document(second);
        state.undo();
        assert_eq!(state.editor().content(), "");
        state.undo();
        assert_eq!(state.editor().content(), "");
    }

    #[test]
    fn test_switch_to_unknown_or_active_document() {
        let (mut state, _, _) = new_state();
        let active = state.tab_manager.active_id().unwrap();
        state.insert_text("keep");
        assert!(!state.switch_to_document(DocumentId(999)));
        assert!(state.switch_to_document(active));
        assert_eq!(state.editor().content(), "keep");
        assert_eq!(state.tab_manager.active_id(), Some(active));
    }

    #[test]
    fn test_close_active_activates_predecessor() {
        let (mut state, _, _) = new_state();
        let first = state.tab_manager.active_id().unwrap();
        state.insert_text("first");
        let second = state.create_document(None, String::new(), None);
        state.insert_text("second");
        let third = state.create_document(None, String::new(), None);

        state.switch_to_document(second);
        assert!(state.close_document(second));
        assert_eq!(state.tab_manager.active_id(), Some(first));
        assert_eq!(state.editor().content(), "first");
        assert_eq!(state.tab_manager.count(), 2);

        // Closing an inactive tab leaves the editor alone
        assert!(state.close_document(third));
        assert_eq!(state.editor().content(), "first");
        assert!(!state.close_document(third));
    }

    #[test]
    fn test_closing_last_document_leaves_fresh_untitled() {
        let (mut state, _, _) = new_state();
        state.insert_text("gone");
        assert!(state.close_active_document());
        assert_eq!(state.tab_manager.count(), 1);
        let doc = state.tab_manager.active_doc().unwrap();
        assert!(doc.is_pristine());
        assert_eq!(state.editor().content(), "");
    }

    #[test]
    fn test_collection_never_empty_after_close_sequence() {
        let (mut state, _, _) = new_state();
        for round in 0..20 {
            if round % 3 == 0 {
                state.create_document(None, String::new(), None);
            }
            if let Some(id) = state.tab_manager.active_id() {
                state.close_document(id);
            }
            assert!(state.tab_manager.count() >= 1);
            assert!(state.tab_manager.active_doc().is_some());
        }
    }

    #[tokio::test]
    async fn test_launch_reuses_pristine_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.md", "# Notes");
        let (mut state, _, _) = new_state();

        state.close_active_document();
        let id = state
            .open_file_ref(FileRef::new(path.to_string_lossy()))
            .await
            .unwrap();

        assert_eq!(state.tab_manager.count(), 1);
        assert_eq!(state.tab_manager.active_id(), Some(id));
        let doc = state.tab_manager.active_doc().unwrap();
        assert_eq!(doc.name, "notes.md");
        assert_eq!(doc.language, LanguageMode::Markdown);
        assert_eq!(state.editor().content(), "# Notes");
        assert_eq!(state.editor().language_mode(), LanguageMode::Markdown);
    }

    #[tokio::test]
    async fn test_open_keeps_edited_untitled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.txt", "file");
        let (mut state, _, _) = new_state();
        state.insert_text("draft");

        state.storage_mut().stage_open(&path);
        state.dispatch(Message::FileOpen).await;
        assert_eq!(state.tab_manager.count(), 2);
        assert_eq!(state.tab_manager.documents()[0].content, "draft");
    }

    #[tokio::test]
    async fn test_opening_open_file_switches_to_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.txt", "alpha");
        let (mut state, _, _) = new_state();

        let id = state
            .open_file_ref(FileRef::new(path.to_string_lossy()))
            .await
            .unwrap();
        state.create_document(None, String::new(), None);
        let again = state
            .open_file_ref(FileRef::new(path.to_string_lossy()))
            .await
            .unwrap();

        assert_eq!(again, id);
        assert_eq!(state.tab_manager.count(), 2);
        assert_eq!(state.tab_manager.active_id(), Some(id));
        assert_eq!(state.editor().content(), "alpha");
    }

    #[tokio::test]
    async fn test_edit_then_save_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.txt", "alpha");
        let (mut state, _, notifier) = new_state();

        state.storage_mut().stage_open(&path);
        state.dispatch(Message::FileOpen).await;
        assert!(!state.tab_manager.active_doc().unwrap().is_dirty());

        state.editor_mut().set_cursor(CursorPos::new(0, 5));
        state.dispatch(Message::InsertText("!".to_string())).await;
        let doc = state.tab_manager.active_doc().unwrap();
        assert!(doc.is_dirty());
        assert_eq!(doc.tab_label(), "a.txt*");

        state.dispatch(Message::FileSave).await;
        assert!(notifier.messages().is_empty());
        assert_eq!(state.tab_manager.active_doc().unwrap().state(), DocumentState::Saved);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "alpha!");
    }

    #[tokio::test]
    async fn test_save_without_file_goes_through_save_as() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("page.html");
        let (mut state, _, _) = new_state();
        state.insert_text("<p>hi</p>");

        state.storage_mut().stage_save(&target);
        state.dispatch(Message::FileSave).await;

        let doc = state.tab_manager.active_doc().unwrap();
        assert_eq!(doc.name, "page.html");
        assert_eq!(doc.language, LanguageMode::Html);
        assert_eq!(doc.state(), DocumentState::Saved);
        assert_eq!(state.editor().language_mode(), LanguageMode::Html);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_save_failure_keeps_dirty_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.txt");
        let (mut state, _, notifier) = new_state();
        state.insert_text("unsaved work");

        state.storage_mut().stage_save(&target);
        state.dispatch(Message::FileSaveAs).await;

        let doc = state.tab_manager.active_doc().unwrap();
        assert!(doc.is_dirty());
        assert!(doc.file_ref.is_none());
        assert_eq!(doc.name, "Untitled");
        assert!(notifier.last().unwrap().starts_with("Error saving file"));
    }

    #[tokio::test]
    async fn test_cancelled_pickers_change_nothing() {
        let (mut state, _, notifier) = new_state();
        state.insert_text("text");

        state.dispatch(Message::FileOpen).await;
        state.dispatch(Message::FileSaveAs).await;

        assert_eq!(state.tab_manager.count(), 1);
        let doc = state.tab_manager.active_doc().unwrap();
        assert!(doc.is_dirty());
        assert!(doc.file_ref.is_none());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_file_notifies() {
        let (mut state, _, notifier) = new_state();
        state.storage_mut().stage_open("/no/such/dir/file.txt");
        state.dispatch(Message::FileOpen).await;
        assert_eq!(state.tab_manager.count(), 1);
        assert!(notifier.last().unwrap().starts_with("Error opening file"));
    }

    #[test]
    fn test_programmatic_change_does_not_dirty() {
        let (mut state, _, _) = new_state();
        state.editor_mut().set_content("loaded");
        state.on_editor_change(ChangeOrigin::Programmatic);
        assert!(!state.tab_manager.active_doc().unwrap().is_dirty());
        state.on_editor_change(ChangeOrigin::User);
        assert!(state.tab_manager.active_doc().unwrap().is_dirty());
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "style.css", "body {}");
        let store = MemoryStore::new();
        {
            let (mut state, _) = state_with(&store, MemoryClipboard::new());
            state.insert_text("first doc");
            state
                .open_file_ref(FileRef::new(path.to_string_lossy()))
                .await
                .unwrap();
            state.create_document(None, String::new(), None);
            state.insert_text("third\ndoc");
            state.editor_mut().set_cursor(CursorPos::new(1, 2));
            let css_id = state.tab_manager.documents()[1].id;
            state.switch_to_document(css_id);
            state.shutdown();
        }

        let (state, _) = state_with(&store, MemoryClipboard::new());
        let docs = state.tab_manager.documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].content, "first doc");
        assert_eq!(docs[1].content, "body {}");
        assert_eq!(docs[1].language, LanguageMode::Css);
        assert_eq!(docs[2].content, "third\ndoc");
        assert_eq!(docs[2].cursor, CursorPos::new(1, 2));
        assert!(docs.iter().all(|d| d.file_ref.is_none()));
        assert!(docs[0].is_dirty());
        assert_eq!(state.tab_manager.active_index(), Some(1));
        assert_eq!(state.editor().content(), "body {}");
    }

    #[test]
    fn test_unsaved_edits_in_active_doc_are_persisted() {
        let store = MemoryStore::new();
        {
            let (mut state, _) = state_with(&store, MemoryClipboard::new());
            state.insert_text("typed but never switched away");
            state.shutdown();
        }
        let (state, _) = state_with(&store, MemoryClipboard::new());
        assert_eq!(state.editor().content(), "typed but never switched away");
    }

    #[test]
    fn test_start_without_restore_discards_session() {
        let store = MemoryStore::new();
        {
            let (mut state, _) = state_with(&store, MemoryClipboard::new());
            state.insert_text("old");
            state.shutdown();
        }
        let mut state = AppState::new(
            Box::new(MemoryEditor::new()),
            FsStorage::new(),
            MemoryClipboard::new(),
            Box::new(store.clone()),
            Box::new(MemoryNotifier::new()),
        );
        state.start(false);
        assert_eq!(state.tab_manager.count(), 1);
        assert_eq!(state.editor().content(), "");
        assert!(state.tab_manager.active_doc().unwrap().is_pristine());
    }

    #[test]
    fn test_create_switch_and_close_persist_immediately() {
        let store = MemoryStore::new();
        let (mut state, _) = state_with(&store, MemoryClipboard::new());
        let first = state.tab_manager.active_id().unwrap();
        state.insert_text("first");

        let second = state.create_document(None, String::new(), None);
        let saved = session::load_session(&store).unwrap();
        assert_eq!(saved.documents.len(), 2);
        assert_eq!(saved.active_id, Some(second));
        assert_eq!(saved.documents[0].content, "first");

        state.switch_to_document(first);
        let saved = session::load_session(&store).unwrap();
        assert_eq!(saved.active_id, Some(first));

        state.close_document(second);
        let saved = session::load_session(&store).unwrap();
        assert_eq!(saved.documents.len(), 1);
        assert_eq!(saved.documents[0].id, first);
    }

    #[test]
    fn test_out_of_range_session_ids_restore_without_panic() {
        let mut store = MemoryStore::new();
        store
            .set(
                SESSION_KEY,
                r#"{"documents":[{"id":18446744073709551615,"name":"a","content":"kept"}],"active_id":18446744073709551615}"#,
            )
            .unwrap();

        let (mut state, _) = state_with(&store, MemoryClipboard::new());
        assert_eq!(state.tab_manager.count(), 1);
        assert_eq!(state.editor().content(), "kept");

        let created = state.create_document(None, String::new(), None);
        assert_ne!(Some(created), state.tab_manager.documents().first().map(|d| d.id));
        assert!(state.tab_manager.documents().iter().all(|d| d.id.0 < u64::MAX));
    }

    #[test]
    fn test_restored_untitled_names_are_not_repeated() {
        let store = MemoryStore::new();
        {
            let (mut state, _) = state_with(&store, MemoryClipboard::new());
            state.insert_text("draft");
            state.shutdown();
        }
        let (mut state, _) = state_with(&store, MemoryClipboard::new());
        state.create_document(None, String::new(), None);
        let names: Vec<&str> = state
            .tab_manager
            .documents()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Untitled", "Untitled 2"]);
    }

    #[test]
    fn test_corrupt_session_falls_back_to_untitled() {
        let mut store = MemoryStore::new();
        store.set(SESSION_KEY, "{not json").unwrap();
        let (state, _) = state_with(&store, MemoryClipboard::new());
        assert_eq!(state.tab_manager.count(), 1);
        assert!(state.tab_manager.active_doc().unwrap().is_pristine());
    }

    #[test]
    fn test_move_tab_keeps_active_and_persists() {
        let store = MemoryStore::new();
        let (mut state, _) = state_with(&store, MemoryClipboard::new());
        let first = state.tab_manager.active_id().unwrap();
        let second = state.create_document(None, String::new(), None);

        assert!(state.move_tab(1, 0));
        assert_eq!(state.tab_manager.active_id(), Some(second));
        assert_eq!(state.tab_manager.documents()[1].id, first);

        let saved = session::load_session(&store).unwrap();
        assert_eq!(saved.documents[0].id, second);
        assert_eq!(saved.active_id, Some(second));
    }

    #[test]
    fn test_next_and_previous_tab_cycle() {
        let (mut state, _, _) = new_state();
        let first = state.tab_manager.active_id().unwrap();
        let second = state.create_document(None, String::new(), None);

        state.switch_to_next_tab();
        assert_eq!(state.tab_manager.active_id(), Some(first));
        state.switch_to_previous_tab();
        assert_eq!(state.tab_manager.active_id(), Some(second));
    }

    #[tokio::test]
    async fn test_replace_all_is_case_insensitive_and_idempotent() {
        let (mut state, _, notifier) = new_state();
        state.insert_text("foo FOO fOo baz");

        state
            .dispatch(Message::ReplaceAll {
                find: "foo".to_string(),
                replace: "Bar".to_string(),
            })
            .await;
        assert_eq!(state.editor().content(), "Bar Bar Bar baz");
        assert!(state.tab_manager.active_doc().unwrap().is_dirty());

        state
            .dispatch(Message::ReplaceAll {
                find: "foo".to_string(),
                replace: "Bar".to_string(),
            })
            .await;
        assert_eq!(state.editor().content(), "Bar Bar Bar baz");
        assert_eq!(notifier.last().as_deref(), Some("Not found: \"foo\""));
    }

    #[test]
    fn test_find_next_selects_and_wraps() {
        let (mut state, _, _) = new_state();
        state.insert_text("Cat dog cat");
        state.editor_mut().set_cursor(CursorPos::new(0, 0));

        assert!(!state.find_next("cat").unwrap());
        assert_eq!(state.editor().selected_text(), "Cat");
        assert!(!state.find_next("cat").unwrap());
        assert_eq!(state.editor().selection(), Some((CursorPos::new(0, 8), CursorPos::new(0, 11))));
        assert!(state.find_next("cat").unwrap());
        assert_eq!(state.editor().selected_text(), "Cat");

        assert!(matches!(state.find_next("bird"), Err(AppError::SearchNotFound(_))));
    }

    #[tokio::test]
    async fn test_goto_line() {
        let (mut state, _, notifier) = new_state();
        state.insert_text("a\nb\nc");

        state.dispatch(Message::GoToLine(2)).await;
        assert_eq!(state.editor().cursor(), CursorPos::new(1, 0));

        state.dispatch(Message::GoToLine(9)).await;
        assert_eq!(notifier.last().as_deref(), Some("Line 9 is out of range"));
        assert_eq!(state.editor().cursor(), CursorPos::new(1, 0));
    }

    #[tokio::test]
    async fn test_line_tools_mark_dirty() {
        let (mut state, _, _) = new_state();
        state.editor_mut().set_content("b\na\nc");
        state.editor_mut().set_cursor(CursorPos::new(1, 0));

        state.dispatch(Message::DuplicateLine).await;
        assert_eq!(state.editor().content(), "b\na\na\nc");
        assert!(state.tab_manager.active_doc().unwrap().is_dirty());

        state.dispatch(Message::MoveLineUp).await;
        assert_eq!(state.editor().content(), "a\nb\na\nc");
        assert_eq!(state.editor().cursor().line, 0);

        state.dispatch(Message::SortLines).await;
        assert_eq!(state.editor().content(), "a\na\nb\nc");
    }

    #[test]
    fn test_change_case_applies_to_selection() {
        let (mut state, _, _) = new_state();
        state.insert_text("hello world");
        state
            .editor_mut()
            .set_selection(CursorPos::new(0, 0), CursorPos::new(0, 5));
        state.change_case(true);
        assert_eq!(state.editor().content(), "HELLO world");
    }

    #[tokio::test]
    async fn test_copy_paste_and_history() {
        let (mut state, _, _) = new_state();
        state.insert_text("copy me");
        state
            .editor_mut()
            .set_selection(CursorPos::new(0, 0), CursorPos::new(0, 4));

        state.dispatch(Message::Copy).await;
        assert_eq!(state.clipboard().text(), "copy");
        assert_eq!(state.clipboard_history.get(0), Some("copy"));

        state.editor_mut().set_cursor(CursorPos::new(0, 7));
        state.dispatch(Message::Paste).await;
        assert_eq!(state.editor().content(), "copy mecopy");

        state.dispatch(Message::PasteFromHistory(0)).await;
        assert_eq!(state.editor().content(), "copy mecopycopy");
    }

    #[tokio::test]
    async fn test_denied_clipboard_notifies() {
        let store = MemoryStore::new();
        let (mut state, notifier) = state_with(&store, MemoryClipboard::denying_reads());
        state.dispatch(Message::Paste).await;
        assert_eq!(state.editor().content(), "");
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_language_override_is_persisted() {
        let store = MemoryStore::new();
        let (mut state, _) = state_with(&store, MemoryClipboard::new());
        state.dispatch(Message::SetLanguage(LanguageMode::Json)).await;
        assert_eq!(state.editor().language_mode(), LanguageMode::Json);

        let saved = session::load_session(&store).unwrap();
        assert_eq!(saved.documents[0].language, LanguageMode::Json);
    }

    #[tokio::test]
    async fn test_view_settings_are_saved() {
        let store = MemoryStore::new();
        let (mut state, _) = state_with(&store, MemoryClipboard::new());
        state.dispatch(Message::ToggleTheme).await;
        state.dispatch(Message::ZoomIn).await;
        state.dispatch(Message::ToggleWordWrap).await;

        let reloaded = AppSettings::load(&store);
        assert_eq!(reloaded.theme_mode, ThemeMode::Light);
        assert_eq!(reloaded.font_size, 16);
        assert!(!reloaded.word_wrap_enabled);
    }

    #[tokio::test]
    async fn test_markdown_preview() {
        let (mut state, _, _) = new_state();
        state.insert_text("# Title");
        assert_eq!(state.preview_html(), None);

        state.dispatch(Message::TogglePreview).await;
        assert_eq!(state.preview_html(), None);

        state.set_language(LanguageMode::Markdown);
        assert!(state.preview_html().unwrap().contains("<h1>Title</h1>"));
    }

    #[test]
    fn test_status() {
        let (mut state, _, _) = new_state();
        state.insert_text("two words\nthree");
        let status = state.status().unwrap();
        assert_eq!(status.name, "Untitled");
        assert!(status.is_dirty);
        assert_eq!(status.stats, TextStats { lines: 2, words: 3 });
        assert_eq!(status.cursor, CursorPos::new(1, 5));
    }
}
