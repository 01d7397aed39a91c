//! Controllers layer - orchestration of the document collection.
//!
//! - Tab management (ordered documents, active id, id allocation)
//! - Clipboard history

pub mod clipboard;
pub mod tabs;
