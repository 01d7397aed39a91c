use std::collections::VecDeque;

/// Recently copied or pasted snippets, newest first.
#[derive(Debug, Clone)]
pub struct ClipboardHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl ClipboardHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Record a snippet. Empty text is ignored; a repeated snippet moves to
    /// the front instead of appearing twice.
    pub fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.entries.retain(|e| e != text);
        self.entries.push_front(text.to_string());
        self.entries.truncate(self.limit);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.entries.truncate(self.limit);
    }
}
