use pulldown_cmark::{Options, Parser, html};

use crate::app::domain::LanguageMode;

/// Render markdown text to HTML for the preview pane.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

/// Preview is only offered for Markdown documents.
pub fn supports_preview(mode: LanguageMode) -> bool {
    mode.is_markdown()
}
