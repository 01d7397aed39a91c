use serde::{Deserialize, Serialize};

/// Syntax highlighting mode handed to the editor widget.
///
/// Serialized as the MIME-style identifier the widget understands, so a
/// persisted session stays readable by other front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LanguageMode {
    #[default]
    #[serde(rename = "text/plain")]
    PlainText,
    #[serde(rename = "text/html")]
    Html,
    #[serde(rename = "text/css")]
    Css,
    #[serde(rename = "text/javascript")]
    JavaScript,
    #[serde(rename = "application/x-httpd-php")]
    Php,
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "text/x-markdown")]
    Markdown,
}

impl LanguageMode {
    pub fn all() -> &'static [LanguageMode] {
        &[
            Self::PlainText,
            Self::Html,
            Self::Css,
            Self::JavaScript,
            Self::Php,
            Self::Json,
            Self::Markdown,
        ]
    }

    /// Detect the mode from a file name's extension. Unknown or missing
    /// extensions fall back to plain text.
    pub fn from_file_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => return Self::PlainText,
        };
        match ext.as_str() {
            "html" | "htm" => Self::Html,
            "css" | "scss" => Self::Css,
            "js" | "jsx" | "ts" => Self::JavaScript,
            "php" => Self::Php,
            "json" => Self::Json,
            "md" => Self::Markdown,
            _ => Self::PlainText,
        }
    }

    /// Parse a MIME-style identifier as picked from the language selector.
    /// An empty string selects plain text.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.is_empty() {
            return Some(Self::PlainText);
        }
        Self::all().iter().copied().find(|m| m.mime() == mime)
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
            Self::Css => "text/css",
            Self::JavaScript => "text/javascript",
            Self::Php => "application/x-httpd-php",
            Self::Json => "application/json",
            Self::Markdown => "text/x-markdown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PlainText => "Plain Text",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::JavaScript => "JavaScript",
            Self::Php => "PHP",
            Self::Json => "JSON",
            Self::Markdown => "Markdown",
        }
    }

    pub fn is_markdown(&self) -> bool {
        *self == Self::Markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(LanguageMode::from_file_name("index.html"), LanguageMode::Html);
        assert_eq!(LanguageMode::from_file_name("page.HTM"), LanguageMode::Html);
        assert_eq!(LanguageMode::from_file_name("site.scss"), LanguageMode::Css);
        assert_eq!(LanguageMode::from_file_name("app.tsx"), LanguageMode::PlainText);
        assert_eq!(LanguageMode::from_file_name("app.ts"), LanguageMode::JavaScript);
        assert_eq!(LanguageMode::from_file_name("index.php"), LanguageMode::Php);
        assert_eq!(LanguageMode::from_file_name("package.json"), LanguageMode::Json);
        assert_eq!(LanguageMode::from_file_name("README.md"), LanguageMode::Markdown);
    }

    #[test]
    fn test_detect_fallbacks() {
        assert_eq!(LanguageMode::from_file_name("Untitled"), LanguageMode::PlainText);
        assert_eq!(LanguageMode::from_file_name("notes.txt"), LanguageMode::PlainText);
        assert_eq!(LanguageMode::from_file_name(""), LanguageMode::PlainText);
    }

    #[test]
    fn test_mime_lookup() {
        for mode in LanguageMode::all() {
            assert_eq!(LanguageMode::from_mime(mode.mime()), Some(*mode));
        }
        assert_eq!(LanguageMode::from_mime(""), Some(LanguageMode::PlainText));
        assert_eq!(LanguageMode::from_mime("text/x-cobol"), None);
    }

    #[test]
    fn test_serializes_as_mime() {
        let json = serde_json::to_string(&LanguageMode::Markdown).unwrap();
        assert_eq!(json, "\"text/x-markdown\"");
        let mode: LanguageMode = serde_json::from_str("\"application/json\"").unwrap();
        assert_eq!(mode, LanguageMode::Json);
    }
}
