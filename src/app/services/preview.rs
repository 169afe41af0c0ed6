use std::path::Path;

use pulldown_cmark::{Options, Parser, html};

/// Render markdown text to an HTML fragment.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut html_output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut html_output, parser);

    html_output
}

/// Wrap HTML in HelpView-compatible font tags.
///
/// HelpView only understands the legacy 1-7 `<font size>` scale, so the
/// editor's point size is mapped onto it.
pub fn wrap_html_for_helpview(html: &str, font_size: u32) -> String {
    let size = match font_size {
        0..=11 => 2,
        12..=14 => 3,
        15..=17 => 4,
        18..=22 => 5,
        _ => 6,
    };
    format!("<font face=\"Helvetica\" size=\"{}\">{}</font>", size, html)
}

/// Check if a file path points to a markdown file.
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_lowercase();
            matches!(lower.as_str(), "md" | "markdown" | "mdown" | "mkd")
        })
        .unwrap_or(false)
}
