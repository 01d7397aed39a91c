//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains the seams to the outside world and their concrete
//! adapters:
//! - Editor widget
//! - File storage
//! - Clipboard
//! - Persistent key-value store
//! - User notifications
//! - Error types

pub mod clipboard;
pub mod editor;
pub mod error;
pub mod kv_store;
pub mod notifier;
pub mod storage;
