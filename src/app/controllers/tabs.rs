use tracing::warn;

use crate::app::domain::document::{Document, DocumentId, FileRef};

/// Highest id a restored snapshot may carry. Larger ids only come from a
/// malformed snapshot; those documents are renumbered.
const MAX_RESTORED_ID: u64 = u32::MAX as u64;

/// Counter behind an `Untitled` / `Untitled N` name.
fn untitled_number(name: &str) -> Option<u32> {
    match name.strip_prefix("Untitled")? {
        "" => Some(1),
        rest => rest.strip_prefix(' ')?.parse().ok(),
    }
}

/// Ordered collection of open documents and the active id.
///
/// Pure bookkeeping: nothing here touches the editor widget. `AppState`
/// captures and restores live editor state around these calls.
pub struct TabManager {
    documents: Vec<Document>,
    active_id: Option<DocumentId>,
    next_id: u64,
    untitled_counter: u32,
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabManager {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            active_id: None,
            next_id: 1,
            untitled_counter: 0,
        }
    }

    fn next_document_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a document. The active document does not change.
    pub fn add(&mut self, name: String, content: String, file_ref: Option<FileRef>) -> DocumentId {
        let id = self.next_document_id();
        self.documents.push(Document::new(id, name, content, file_ref));
        id
    }

    /// Append an empty document named `Untitled`, `Untitled 2`, ...
    pub fn add_untitled(&mut self) -> DocumentId {
        self.untitled_counter += 1;
        let id = self.next_document_id();
        self.documents
            .push(Document::new_untitled(id, self.untitled_counter));
        id
    }

    /// Put a document at `index` in place of the one there, keeping the slot.
    /// The replaced document is returned; the new one gets a fresh id.
    pub fn replace_at(
        &mut self,
        index: usize,
        name: String,
        content: String,
        file_ref: Option<FileRef>,
    ) -> Option<(DocumentId, Document)> {
        if index >= self.documents.len() {
            return None;
        }
        let id = self.next_document_id();
        let old = std::mem::replace(
            &mut self.documents[index],
            Document::new(id, name, content, file_ref),
        );
        if self.active_id == Some(old.id) {
            self.active_id = None;
        }
        Some((id, old))
    }

    pub fn active_doc(&self) -> Option<&Document> {
        let active_id = self.active_id?;
        self.documents.iter().find(|d| d.id == active_id)
    }

    pub fn active_doc_mut(&mut self) -> Option<&mut Document> {
        let active_id = self.active_id?;
        self.documents.iter_mut().find(|d| d.id == active_id)
    }

    /// Returns false (and changes nothing) if `id` is not open.
    pub fn set_active(&mut self, id: DocumentId) -> bool {
        if self.documents.iter().any(|d| d.id == id) {
            self.active_id = Some(id);
            true
        } else {
            false
        }
    }

    /// Remove a document by id. If it was active, its predecessor becomes
    /// active, or its successor when it was first. Leaves no active document
    /// when the collection becomes empty.
    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        let idx = self.documents.iter().position(|d| d.id == id)?;
        let doc = self.documents.remove(idx);

        if self.active_id == Some(id) {
            self.active_id = if self.documents.is_empty() {
                None
            } else {
                let new_idx = idx.saturating_sub(1);
                Some(self.documents[new_idx].id)
            };
        }

        Some(doc)
    }

    /// Move a tab from one index to another. `to` is the index the tab ends
    /// up at and is clamped to the last position.
    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if from >= self.documents.len() {
            return false;
        }
        let to = to.min(self.documents.len() - 1);
        if from == to {
            return false;
        }
        let doc = self.documents.remove(from);
        self.documents.insert(to, doc);
        true
    }

    /// Replace the whole collection with restored documents.
    ///
    /// Duplicate ids get fresh ones and the id counter moves past every
    /// restored id so ids are never reused. Ids above `MAX_RESTORED_ID`
    /// renumber the whole snapshot. An unknown `active_id` falls back to the
    /// first document. The Untitled counter continues after the highest
    /// restored `Untitled N`.
    pub fn restore(&mut self, mut documents: Vec<Document>, active_id: Option<DocumentId>) {
        let mut active_id = active_id;
        let max_id = documents.iter().map(|d| d.id.0).max().unwrap_or(0);
        match max_id.checked_add(1).filter(|_| max_id <= MAX_RESTORED_ID) {
            Some(next) => self.next_id = self.next_id.max(next),
            None => {
                warn!("Renumbering restored documents: id {} is out of range", max_id);
                let active_index =
                    active_id.and_then(|id| documents.iter().position(|d| d.id == id));
                for doc in &mut documents {
                    doc.id = self.next_document_id();
                }
                active_id = active_index.map(|i| documents[i].id);
            }
        }

        let mut restored: Vec<Document> = Vec::with_capacity(documents.len());
        for mut doc in documents {
            if restored.iter().any(|d| d.id == doc.id) {
                doc.id = self.next_document_id();
            }
            restored.push(doc);
        }
        self.documents = restored;

        let highest_untitled = self
            .documents
            .iter()
            .filter_map(|d| untitled_number(&d.name))
            .max()
            .unwrap_or(0);
        self.untitled_counter = self.untitled_counter.max(highest_untitled);

        self.active_id = active_id
            .filter(|id| self.documents.iter().any(|d| d.id == *id))
            .or_else(|| self.documents.first().map(|d| d.id));
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active_id
    }

    pub fn active_index(&self) -> Option<usize> {
        let active_id = self.active_id?;
        self.index_of(active_id)
    }

    pub fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    /// Find a document by its backing file
    pub fn find_by_file(&self, file_ref: &FileRef) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|d| d.file_ref.as_ref() == Some(file_ref))
            .map(|d| d.id)
    }

    pub fn doc_by_id(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn doc_by_id_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    /// Index of the only document when it is a pristine Untitled one.
    pub fn sole_pristine_index(&self) -> Option<usize> {
        match self.documents.as_slice() {
            [only] if only.is_pristine() => Some(0),
            _ => None,
        }
    }

    /// Get the next document id (for tab cycling)
    pub fn next_doc_id(&self) -> Option<DocumentId> {
        let idx = self.active_index()?;
        let next_idx = (idx + 1) % self.documents.len();
        Some(self.documents[next_idx].id)
    }

    /// Get the previous document id (for tab cycling)
    pub fn prev_doc_id(&self) -> Option<DocumentId> {
        let idx = self.active_index()?;
        let prev_idx = if idx == 0 {
            self.documents.len() - 1
        } else {
            idx - 1
        };
        Some(self.documents[prev_idx].id)
    }
}
