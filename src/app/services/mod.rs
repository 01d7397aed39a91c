//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Session persistence
//! - Text operations (search, replace, cursor math)
//! - Line tools
//! - Markdown preview
//! - Offline asset caching

pub mod line_ops;
pub mod offline;
pub mod preview;
pub mod session;
pub mod text_ops;
