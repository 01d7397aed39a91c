//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Document, LanguageMode, Settings, Messages)
//! - `controllers/` - Document collection management (TabManager, clipboard history)
//! - `services/` - Business operations (session, text_ops, line_ops, preview, offline cache)
//! - `infrastructure/` - Collaborator seams (editor widget, file storage, clipboard, store, error)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::clipboard::ClipboardHistory;
pub use controllers::tabs::TabManager;
pub use domain::{
    AppSettings, Command, CursorPos, Document, DocumentId, DocumentState, FileRef, LanguageMode,
    Message, ScrollPos, ThemeMode, UndoState,
};
pub use infrastructure::error::{AppError, Result};
pub use state::AppState;
