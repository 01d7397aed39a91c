use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::app::domain::{CursorPos, Document, DocumentId, LanguageMode, ScrollPos, UndoState};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::kv_store::KeyValueStore;

/// Store key of the session snapshot.
pub const SESSION_KEY: &str = "notepad_session_v2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub documents: Vec<DocumentSession>,
    pub active_id: Option<DocumentId>,
}

/// Persisted form of a `Document`. File references are never stored;
/// restored documents come back detached from their files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSession {
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub language: LanguageMode,
    #[serde(default)]
    pub cursor: CursorPos,
    #[serde(default)]
    pub scroll: ScrollPos,
    #[serde(default)]
    pub undo_state: Option<UndoState>,
    #[serde(default)]
    pub was_dirty: bool,
}

impl SessionData {
    /// Snapshot the collection. Callers capture the live editor state into
    /// the active document first.
    pub fn capture(documents: &[Document], active_id: Option<DocumentId>) -> Self {
        let documents = documents
            .iter()
            .map(|doc| DocumentSession {
                id: doc.id,
                name: doc.name.clone(),
                content: doc.content.clone(),
                language: doc.language,
                cursor: doc.cursor,
                scroll: doc.scroll,
                undo_state: doc.undo_state.clone(),
                was_dirty: doc.is_dirty(),
            })
            .collect();
        Self {
            documents,
            active_id,
        }
    }

    /// Position of the active document, or 0 if it is not in the snapshot.
    pub fn active_index(&self) -> usize {
        self.active_id
            .and_then(|id| self.documents.iter().position(|d| d.id == id))
            .unwrap_or(0)
    }

    /// Rebuild documents. Restored documents have no file reference.
    pub fn into_documents(self) -> (Vec<Document>, Option<DocumentId>) {
        let documents = self
            .documents
            .into_iter()
            .map(|saved| {
                let mut doc = Document::new(saved.id, saved.name, saved.content, None);
                doc.language = saved.language;
                doc.cursor = saved.cursor;
                doc.scroll = saved.scroll;
                doc.undo_state = saved.undo_state;
                doc.set_dirty(saved.was_dirty);
                doc
            })
            .collect();
        (documents, self.active_id)
    }
}

/// Write the snapshot to the store.
pub fn save_session(store: &mut dyn KeyValueStore, data: &SessionData) -> Result<()> {
    let json = serde_json::to_string(data)?;
    store
        .set(SESSION_KEY, &json)
        .map_err(|e| AppError::Session(format!("Failed to write session: {}", e)))?;
    debug!("Saved session with {} documents", data.documents.len());
    Ok(())
}

/// Load the snapshot. Missing, unparseable and empty sessions all yield
/// `None`; a corrupt snapshot is discarded.
pub fn load_session(store: &dyn KeyValueStore) -> Option<SessionData> {
    let contents = store.get(SESSION_KEY)?;
    let session_data: SessionData = match serde_json::from_str(&contents) {
        Ok(data) => data,
        Err(e) => {
            warn!("Discarding corrupt session: {}", e);
            return None;
        }
    };

    if session_data.documents.is_empty() {
        return None;
    }

    Some(session_data)
}

pub fn clear_session(store: &mut dyn KeyValueStore) -> Result<()> {
    store.remove(SESSION_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::FileRef;
    use crate::app::infrastructure::kv_store::MemoryStore;

    fn sample_docs() -> Vec<Document> {
        let mut a = Document::new(DocumentId(1), "a.md".into(), "# A".into(), Some(FileRef::new("/tmp/a.md")));
        a.cursor = CursorPos::new(0, 2);
        let mut b = Document::new(DocumentId(4), "Untitled".into(), "draft".into(), None);
        b.mark_dirty();
        b.scroll = ScrollPos { x: 0.0, y: 120.0 };
        vec![a, b]
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let data = SessionData::capture(&sample_docs(), Some(DocumentId(4)));
        save_session(&mut store, &data).unwrap();

        let loaded = load_session(&store).unwrap();
        assert_eq!(loaded, data);
        assert_eq!(loaded.active_index(), 1);

        let (docs, active) = loaded.into_documents();
        assert_eq!(active, Some(DocumentId(4)));
        assert_eq!(docs[0].content, "# A");
        assert_eq!(docs[0].language, LanguageMode::Markdown);
        assert_eq!(docs[0].cursor, CursorPos::new(0, 2));
        assert!(docs[1].is_dirty());
        assert_eq!(docs[1].scroll.y, 120.0);
    }

    #[test]
    fn test_file_refs_are_not_persisted() {
        let data = SessionData::capture(&sample_docs(), Some(DocumentId(1)));
        let json = serde_json::to_string(&data).unwrap();
        assert!(!json.contains("/tmp/a.md"));

        let (docs, _) = data.into_documents();
        assert!(docs.iter().all(|d| d.file_ref.is_none()));
    }

    #[test]
    fn test_corrupt_session_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(SESSION_KEY, "{\"documents\": [").unwrap();
        assert!(load_session(&store).is_none());
    }

    #[test]
    fn test_empty_session_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(SESSION_KEY, r#"{"documents": [], "active_id": null}"#).unwrap();
        assert!(load_session(&store).is_none());
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(SESSION_KEY, r#"{"documents": [{"id": 7, "name": "x.txt"}], "active_id": 99}"#)
            .unwrap();
        let loaded = load_session(&store).unwrap();
        assert_eq!(loaded.active_index(), 0);
        assert_eq!(loaded.documents[0].content, "");
        assert_eq!(loaded.documents[0].cursor, CursorPos::default());
        assert!(!loaded.documents[0].was_dirty);
    }

    #[test]
    fn test_clear_session() {
        let mut store = MemoryStore::new();
        save_session(&mut store, &SessionData::capture(&sample_docs(), None)).unwrap();
        clear_session(&mut store).unwrap();
        assert!(load_session(&store).is_none());
    }
}
