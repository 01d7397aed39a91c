//! Line-oriented terminal front end.
//!
//! Each input line is parsed into a `ShellCommand`. Most commands map
//! straight onto an app `Message`; the rest need tab indices resolved or
//! only print state.

use std::path::PathBuf;

use thiserror::Error;

use crate::app::controllers::tabs::TabManager;
use crate::app::domain::{AppSettings, Command, LanguageMode, Message, ThemeMode};
use crate::app::state::StatusInfo;

#[derive(Debug, Error, PartialEq)]
pub enum ShellError {
    #[error("Unknown command: {0} (type `help`)")]
    UnknownCommand(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Not a number: {0}")]
    InvalidNumber(String),
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("No command is bound to {0}")]
    UnboundShortcut(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Run(Message),
    /// Open, staging the path first. `None` behaves like a dismissed picker.
    Open(Option<PathBuf>),
    SaveAs(Option<PathBuf>),
    /// 0-based tab index
    Switch(usize),
    Close(Option<usize>),
    Show,
    List,
    Status,
    History,
    Help,
    Quit,
    /// Shortcut bound to a command that needs arguments.
    Hint(&'static str),
    Empty,
}

pub const HELP: &str = "\
new | open [path] | save | saveas [path] | close [n] | switch <n> | next | prev | move <from> <to>
type <text> (\\n for newline) | undo | redo | copy | paste | paste <n> | history
goto <line> | find <text> | replace <find> -> <replace>
dup | up | down | sort | trim | upper | lower
lang <name> | theme | zoomin | zoomout | wrap | preview
key <chord> | show | list | status | help | quit";

fn parse_index(arg: &str) -> Result<usize, ShellError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(ShellError::InvalidNumber(arg.to_string())),
    }
}

fn required<'a>(arg: &'a str, what: &'static str) -> Result<&'a str, ShellError> {
    if arg.is_empty() {
        Err(ShellError::MissingArgument(what))
    } else {
        Ok(arg)
    }
}

fn optional_path(arg: &str) -> Option<PathBuf> {
    (!arg.is_empty()).then(|| PathBuf::from(arg))
}

fn parse_language(arg: &str) -> Result<LanguageMode, ShellError> {
    LanguageMode::all()
        .iter()
        .copied()
        .find(|mode| mode.display_name().eq_ignore_ascii_case(arg))
        .or_else(|| LanguageMode::from_mime(arg))
        .ok_or_else(|| ShellError::UnknownLanguage(arg.to_string()))
}

fn parse_key(chord: &str) -> Result<ShellCommand, ShellError> {
    let command =
        Command::from_shortcut(chord).ok_or_else(|| ShellError::UnboundShortcut(chord.to_string()))?;
    Ok(match command.to_message() {
        Some(message) => ShellCommand::Run(message),
        None if command == Command::JumpToLine => ShellCommand::Hint("goto <line>"),
        None => ShellCommand::Hint("find <text> | replace <find> -> <replace>"),
    })
}

pub fn parse_command(line: &str) -> Result<ShellCommand, ShellError> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "new" => ShellCommand::Run(Message::FileNew),
        "open" => ShellCommand::Open(optional_path(arg)),
        "save" => ShellCommand::Run(Message::FileSave),
        "saveas" => ShellCommand::SaveAs(optional_path(arg)),
        "close" if arg.is_empty() => ShellCommand::Close(None),
        "close" => ShellCommand::Close(Some(parse_index(arg)?)),
        "switch" => ShellCommand::Switch(parse_index(required(arg, "tab number")?)?),
        "next" => ShellCommand::Run(Message::NextTab),
        "prev" => ShellCommand::Run(Message::PrevTab),
        "move" => {
            let mut parts = arg.split_whitespace();
            let from = parse_index(parts.next().ok_or(ShellError::MissingArgument("from"))?)?;
            let to = parse_index(parts.next().ok_or(ShellError::MissingArgument("to"))?)?;
            ShellCommand::Run(Message::MoveTab { from, to })
        }
        "type" => ShellCommand::Run(Message::InsertText(
            required(arg, "text")?.replace("\\n", "\n"),
        )),
        "undo" => ShellCommand::Run(Message::Undo),
        "redo" => ShellCommand::Run(Message::Redo),
        "copy" => ShellCommand::Run(Message::Copy),
        "paste" if arg.is_empty() => ShellCommand::Run(Message::Paste),
        "paste" => ShellCommand::Run(Message::PasteFromHistory(parse_index(arg)?)),
        "history" => ShellCommand::History,
        "goto" => {
            let arg = required(arg, "line")?;
            let line = arg
                .parse()
                .map_err(|_| ShellError::InvalidNumber(arg.to_string()))?;
            ShellCommand::Run(Message::GoToLine(line))
        }
        "find" => ShellCommand::Run(Message::FindNext(required(arg, "text")?.to_string())),
        "replace" => {
            let (find, replace) = required(arg, "find")?
                .split_once(" -> ")
                .ok_or(ShellError::MissingArgument("-> replacement"))?;
            ShellCommand::Run(Message::ReplaceAll {
                find: find.to_string(),
                replace: replace.to_string(),
            })
        }
        "dup" => ShellCommand::Run(Message::DuplicateLine),
        "up" => ShellCommand::Run(Message::MoveLineUp),
        "down" => ShellCommand::Run(Message::MoveLineDown),
        "sort" => ShellCommand::Run(Message::SortLines),
        "trim" => ShellCommand::Run(Message::TrimWhitespace),
        "upper" => ShellCommand::Run(Message::UpperCase),
        "lower" => ShellCommand::Run(Message::LowerCase),
        "lang" => ShellCommand::Run(Message::SetLanguage(parse_language(required(
            arg, "language",
        )?)?)),
        "theme" => ShellCommand::Run(Message::ToggleTheme),
        "zoomin" => ShellCommand::Run(Message::ZoomIn),
        "zoomout" => ShellCommand::Run(Message::ZoomOut),
        "wrap" => ShellCommand::Run(Message::ToggleWordWrap),
        "preview" => ShellCommand::Run(Message::TogglePreview),
        "key" => parse_key(required(arg, "chord")?)?,
        "show" => ShellCommand::Show,
        "list" => ShellCommand::List,
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ShellError::UnknownCommand(other.to_string())),
    };
    Ok(command)
}

/// One line per tab; the active one is bracketed.
pub fn render_tab_bar(tabs: &TabManager) -> String {
    let active = tabs.active_id();
    tabs.documents()
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            if Some(doc.id) == active {
                format!("[{}:{}]", i + 1, doc.tab_label())
            } else {
                format!(" {}:{} ", i + 1, doc.tab_label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_status(status: &StatusInfo, settings: &AppSettings) -> String {
    let theme = match settings.theme_mode {
        ThemeMode::Light => "Light",
        ThemeMode::Dark => "Dark",
    };
    format!(
        "{}{} | {} | Ln {}, Col {} | {} lines, {} words | {} {}pt{}",
        status.name,
        if status.is_dirty { "*" } else { "" },
        status.language.display_name(),
        status.cursor.line + 1,
        status.cursor.column + 1,
        status.stats.lines,
        status.stats.words,
        theme,
        settings.font_size,
        if settings.word_wrap_enabled { " wrap" } else { "" },
    )
}
