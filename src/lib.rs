//! Notepad-- core: multi-document session state, text services and the
//! collaborator seams an editor front end plugs into.

pub mod app;
pub mod ui;
