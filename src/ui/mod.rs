//! Terminal front end: command parsing and text rendering of the tab bar
//! and status line.

pub mod shell;

pub use shell::{ShellCommand, ShellError, parse_command, render_status, render_tab_bar};
