//! Keyboard chords for the payload-free commands.
//!
//! Chords use the editor widget's notation: modifiers and key joined by `-`,
//! e.g. `Ctrl-Shift-Up`. Matching is case-insensitive and modifier order
//! does not matter.

use super::messages::Message;

/// A named editor command reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Save,
    SaveAs,
    Open,
    NewTab,
    CloseTab,
    NextTab,
    PrevTab,
    JumpToLine,
    DuplicateLine,
    MoveLineUp,
    MoveLineDown,
    FindReplace,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Chord {
    ctrl: bool,
    shift: bool,
    alt: bool,
}

const BINDINGS: &[(&str, Command)] = &[
    ("Ctrl-S", Command::Save),
    ("Ctrl-Shift-S", Command::SaveAs),
    ("Ctrl-O", Command::Open),
    ("Ctrl-N", Command::NewTab),
    ("Ctrl-W", Command::CloseTab),
    ("Ctrl-Tab", Command::NextTab),
    ("Ctrl-Shift-Tab", Command::PrevTab),
    ("Ctrl-G", Command::JumpToLine),
    ("Ctrl-D", Command::DuplicateLine),
    ("Ctrl-Shift-Up", Command::MoveLineUp),
    ("Ctrl-Shift-Down", Command::MoveLineDown),
    ("Ctrl-H", Command::FindReplace),
    ("Ctrl-Z", Command::Undo),
    ("Ctrl-Y", Command::Redo),
    ("Ctrl-=", Command::ZoomIn),
    ("Ctrl--", Command::ZoomOut),
];

/// Split a chord into modifiers and the lower-cased key name.
fn parse_chord(chord: &str) -> Option<(Chord, String)> {
    let chord = chord.trim();
    // "Ctrl--" ends with the minus key itself
    let (mods, key) = if let Some(rest) = chord.strip_suffix("--") {
        (rest, "-".to_string())
    } else {
        let (mods, key) = chord.rsplit_once('-').unwrap_or(("", chord));
        (mods, key.to_lowercase())
    };
    if key.is_empty() {
        return None;
    }

    let mut parsed = Chord::default();
    for m in mods.split('-').filter(|m| !m.is_empty()) {
        match m.to_lowercase().as_str() {
            "ctrl" | "cmd" | "control" => parsed.ctrl = true,
            "shift" => parsed.shift = true,
            "alt" | "option" => parsed.alt = true,
            _ => return None,
        }
    }
    Some((parsed, key))
}

impl Command {
    /// Look up the command bound to a chord such as `"Ctrl-Shift-S"`.
    pub fn from_shortcut(chord: &str) -> Option<Command> {
        let wanted = parse_chord(chord)?;
        BINDINGS
            .iter()
            .find(|(binding, _)| parse_chord(binding).as_ref() == Some(&wanted))
            .map(|(_, cmd)| *cmd)
    }

    pub fn shortcut(&self) -> &'static str {
        BINDINGS
            .iter()
            .find(|(_, cmd)| cmd == self)
            .map(|(binding, _)| *binding)
            .unwrap_or("")
    }

    /// Message for commands that need no further input. Jump-to-line and
    /// find/replace return `None`: the front end must ask for their arguments.
    pub fn to_message(self) -> Option<Message> {
        match self {
            Command::Save => Some(Message::FileSave),
            Command::SaveAs => Some(Message::FileSaveAs),
            Command::Open => Some(Message::FileOpen),
            Command::NewTab => Some(Message::FileNew),
            Command::CloseTab => Some(Message::CloseActiveTab),
            Command::NextTab => Some(Message::NextTab),
            Command::PrevTab => Some(Message::PrevTab),
            Command::DuplicateLine => Some(Message::DuplicateLine),
            Command::MoveLineUp => Some(Message::MoveLineUp),
            Command::MoveLineDown => Some(Message::MoveLineDown),
            Command::Undo => Some(Message::Undo),
            Command::Redo => Some(Message::Redo),
            Command::ZoomIn => Some(Message::ZoomIn),
            Command::ZoomOut => Some(Message::ZoomOut),
            Command::JumpToLine | Command::FindReplace => None,
        }
    }
}
