//! Body post-processing: line endings, echoed title, markdown rendering.

use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

/// What to do with the first line of a generated body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleEchoPolicy {
    /// Drop the first line when it is a heading or repeats the title.
    #[default]
    DropFirstLine,
    /// Keep the body as generated.
    Keep,
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Remove the first line of `body` when it echoes the title.
///
/// A first line counts as an echo when it is a markdown heading, or when it
/// equals `title` ignoring case and surrounding whitespace. Any other first line
/// is content and is kept.
pub fn strip_echoed_title_line<'a>(body: &'a str, title: &str) -> &'a str {
    let (first, rest) = body.split_once('\n').unwrap_or((body, ""));
    if is_title_echo(first, title) {
        rest
    } else {
        body
    }
}

fn is_title_echo(line: &str, title: &str) -> bool {
    let line = line.trim();
    if line.starts_with('#') {
        return true;
    }
    let title = title.trim();
    !title.is_empty() && line.to_lowercase() == title.to_lowercase()
}

/// Normalise and optionally strip the echoed title; the result is trimmed.
pub fn clean_body(raw: &str, policy: TitleEchoPolicy, title: &str) -> String {
    let normalized = normalize_line_endings(raw);
    let body = match policy {
        TitleEchoPolicy::DropFirstLine => strip_echoed_title_line(normalized.trim_start(), title),
        TitleEchoPolicy::Keep => normalized.as_str(),
    };
    body.trim().to_string()
}

/// Render markdown to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
