//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Document, DocumentId and the per-document editing state
//! - Language modes
//! - Application settings
//! - Message types and keyboard shortcuts

pub mod document;
pub mod language;
pub mod messages;
pub mod settings;
pub mod shortcuts;

pub use document::{CursorPos, Document, DocumentId, DocumentState, FileRef, ScrollPos, UndoState};
pub use language::LanguageMode;
pub use messages::{ChangeOrigin, Message};
pub use settings::{AppSettings, ThemeMode};
pub use shortcuts::Command;
