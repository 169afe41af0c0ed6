//! Markdown language mode: assigns a [`TokenCategory`] to every byte of
//! the document.
//!
//! Block and inline structure comes from pulldown-cmark's offset iterator.
//! Fenced code blocks whose info string names a known language are
//! highlighted with syntect, and syntect scopes are folded back into token
//! categories so one style table covers prose and code alike.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use syntect::easy::ScopeRegionIterator;
use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::app::domain::theme::TokenCategory;

/// Languages recognised inside fenced code blocks.
#[derive(Clone)]
pub struct LanguageRegistry {
    syntaxes: Rc<SyntaxSet>,
}

impl LanguageRegistry {
    /// syntect's bundled syntax definitions.
    pub fn defaults() -> Self {
        Self { syntaxes: Rc::new(SyntaxSet::load_defaults_newlines()) }
    }

    /// Look up a fence info token (`rust`, `py`, `JavaScript`, ...).
    pub fn resolve(&self, token: &str) -> Option<&SyntaxReference> {
        let token = token.trim().trim_start_matches('.');
        if token.is_empty() {
            return None;
        }
        let lower = token.to_lowercase();
        let token = match lower.as_str() {
            "shell" | "zsh" | "console" => "sh",
            "c++" => "cpp",
            "yml" => "yaml",
            "golang" => "go",
            other => other,
        };
        self.syntaxes
            .find_syntax_by_token(token)
            .filter(|s| s.name != "Plain Text")
    }

    pub fn syntax_set(&self) -> &SyntaxSet {
        &self.syntaxes
    }

    pub fn len(&self) -> usize {
        self.syntaxes.syntaxes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.syntaxes.syntaxes().is_empty()
    }
}

impl fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("syntaxes", &self.len())
            .finish()
    }
}

/// Scope prefixes in priority order. The innermost scope that matches any
/// prefix decides the category.
const SCOPE_CATEGORIES: &[(&str, TokenCategory)] = &[
    ("comment", TokenCategory::Comment),
    ("string.regexp", TokenCategory::Regexp),
    ("string", TokenCategory::String),
    ("constant.numeric", TokenCategory::Number),
    ("constant.character.escape", TokenCategory::Escape),
    ("constant.language", TokenCategory::Atom),
    ("constant", TokenCategory::Constant),
    ("keyword.operator", TokenCategory::Operator),
    ("keyword", TokenCategory::Keyword),
    ("storage.modifier", TokenCategory::Modifier),
    ("storage.type", TokenCategory::Keyword),
    ("storage", TokenCategory::Keyword),
    ("entity.name.function", TokenCategory::Function),
    ("entity.name.namespace", TokenCategory::Namespace),
    ("entity.name.type", TokenCategory::TypeName),
    ("entity.name.class", TokenCategory::TypeName),
    ("entity.name.tag", TokenCategory::TypeName),
    ("entity.name", TokenCategory::Definition),
    ("entity.other.attribute-name", TokenCategory::PropertyName),
    ("support.function", TokenCategory::Function),
    ("support.type", TokenCategory::TypeName),
    ("support.class", TokenCategory::TypeName),
    ("support.constant", TokenCategory::Constant),
    ("variable.language", TokenCategory::Atom),
    ("variable.function", TokenCategory::Function),
    ("variable", TokenCategory::Name),
    ("meta.annotation", TokenCategory::Annotation),
    ("punctuation", TokenCategory::Separator),
    ("markup.inserted", TokenCategory::Inserted),
    ("markup.deleted", TokenCategory::Deleted),
    ("invalid", TokenCategory::Invalid),
];

fn category_for_scopes(scopes: &[Scope]) -> Option<TokenCategory> {
    scopes.iter().rev().find_map(|scope| {
        let name = scope.build_string();
        SCOPE_CATEGORIES
            .iter()
            .find(|(prefix, _)| {
                name.starts_with(prefix)
                    && (name.len() == prefix.len() || name.as_bytes()[prefix.len()] == b'.')
            })
            .map(|(_, category)| *category)
    })
}

struct CodeBlock {
    fenced: bool,
    language: Option<String>,
    block: Range<usize>,
    /// Text runs of the block body. Inside a quote or list these skip the
    /// container prefix of each line.
    texts: Vec<Range<usize>>,
}

pub struct MarkdownHighlighter {
    languages: LanguageRegistry,
    options: Options,
}

impl MarkdownHighlighter {
    pub fn new(languages: LanguageRegistry) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { languages, options }
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// One category per byte of `text`.
    pub fn categorize(&self, text: &str) -> Vec<TokenCategory> {
        let mut cats = vec![TokenCategory::Plain; text.len()];
        let mut code: Option<CodeBlock> = None;

        for (event, range) in Parser::new_ext(text, self.options).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    paint(&mut cats, range.clone(), TokenCategory::heading(heading_level(level)));
                    paint_heading_marks(text, &mut cats, range);
                }
                Event::Start(Tag::Emphasis) => paint(&mut cats, range, TokenCategory::Emphasis),
                Event::Start(Tag::Strong) => paint(&mut cats, range, TokenCategory::Strong),
                Event::Start(Tag::Strikethrough) => {
                    paint(&mut cats, range, TokenCategory::Strikethrough)
                }
                Event::Start(Tag::Link { .. }) | Event::Start(Tag::Image { .. }) => {
                    paint_link(text, &mut cats, range)
                }
                Event::Start(Tag::BlockQuote(..)) => {
                    paint(&mut cats, range.clone(), TokenCategory::Quote);
                    paint_line_markers(text, &mut cats, range, |line| {
                        line.starts_with('>').then_some(1)
                    });
                }
                Event::Start(Tag::Item) => paint_list_marker(text, &mut cats, range),
                Event::Start(Tag::CodeBlock(kind)) => {
                    let (fenced, language) = match kind {
                        CodeBlockKind::Fenced(info) => {
                            paint_fence_line(text, &mut cats, range.start);
                            (true, info.split_whitespace().next().map(str::to_string))
                        }
                        CodeBlockKind::Indented => (false, None),
                    };
                    code = Some(CodeBlock { fenced, language, block: range, texts: Vec::new() });
                }
                Event::Text(_) => {
                    if let Some(block) = code.as_mut() {
                        block.texts.push(range);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = code.take() {
                        self.finish_code_block(text, &mut cats, block);
                    }
                }
                Event::Code(_) => paint(&mut cats, range, TokenCategory::Monospace),
                Event::Html(_) | Event::InlineHtml(_) => {
                    paint(&mut cats, range, TokenCategory::Meta)
                }
                Event::Rule => paint(&mut cats, range, TokenCategory::ProcessingInstruction),
                Event::TaskListMarker(_) => paint(&mut cats, range, TokenCategory::Atom),
                _ => {}
            }
        }
        cats
    }

    /// FLTK style buffer contents for `text` (one style byte per text byte).
    pub fn style_string(&self, text: &str) -> String {
        self.categorize(text)
            .into_iter()
            .map(TokenCategory::style_char)
            .collect()
    }

    fn finish_code_block(&self, text: &str, cats: &mut [TokenCategory], block: CodeBlock) {
        for range in &block.texts {
            paint(cats, range.clone(), TokenCategory::Monospace);
        }
        if block.fenced {
            paint_closing_fence(text, cats, &block);
        }
        let Some(token) = block.language.as_deref() else {
            return;
        };
        if block.texts.is_empty() {
            return;
        }
        match self.languages.resolve(token) {
            Some(syntax) => self.paint_code(syntax, text, cats, &block.texts),
            None => log::trace!("No syntax for fence language {:?}", token),
        }
    }

    fn paint_code(
        &self,
        syntax: &SyntaxReference,
        text: &str,
        cats: &mut [TokenCategory],
        texts: &[Range<usize>],
    ) {
        let mut parse_state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let lines = texts.iter().flat_map(|range| {
            let code = text.get(range.clone()).unwrap_or_default();
            let mut line_start = range.start;
            LinesWithEndings::from(code).map(move |line| {
                let start = line_start;
                line_start += line.len();
                (start, line)
            })
        });

        for (line_start, line) in lines {
            let ops = match parse_state.parse_line(line, self.languages.syntax_set()) {
                Ok(ops) => ops,
                Err(e) => {
                    log::debug!("Stopped highlighting {} block: {}", syntax.name, e);
                    return;
                }
            };
            let mut pos = line_start;
            for (piece, op) in ScopeRegionIterator::new(&ops, line) {
                if stack.apply(op).is_err() {
                    return;
                }
                if piece.is_empty() {
                    continue;
                }
                let category = category_for_scopes(stack.as_slice())
                    .unwrap_or(TokenCategory::Monospace);
                paint(cats, pos..pos + piece.len(), category);
                pos += piece.len();
            }
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn paint(cats: &mut [TokenCategory], range: Range<usize>, category: TokenCategory) {
    let end = range.end.min(cats.len());
    if range.start < end {
        cats[range.start..end].fill(category);
    }
}

/// Leading `#` run of an ATX heading.
fn paint_heading_marks(text: &str, cats: &mut [TokenCategory], range: Range<usize>) {
    let Some(slice) = text.get(range.clone()) else {
        return;
    };
    let indent = slice.len() - slice.trim_start_matches(' ').len();
    let hashes = slice[indent..].bytes().take_while(|&b| b == b'#').count();
    if hashes > 0 {
        let start = range.start + indent;
        paint(cats, start..start + hashes, TokenCategory::ProcessingInstruction);
    }
}

/// The opening fence line (```` ```lang ````), excluding its newline.
fn paint_fence_line(text: &str, cats: &mut [TokenCategory], start: usize) {
    let end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    paint(cats, start..end, TokenCategory::ProcessingInstruction);
}

/// The closing fence of a fenced block, from the first fence character to
/// the end of its line. Container prefixes before it are left alone.
fn paint_closing_fence(text: &str, cats: &mut [TokenCategory], block: &CodeBlock) {
    let end = block.block.end.min(text.len());
    let body_end = match block.texts.last() {
        Some(last) => last.end,
        None => text[block.block.start..end]
            .find('\n')
            .map_or(end, |i| block.block.start + i + 1),
    };
    let Some(tail) = text.get(body_end.min(end)..end) else {
        return;
    };
    if let Some(i) = tail.find(['`', '~']) {
        let start = body_end + i;
        let stop = text[start..end].find('\n').map_or(end, |j| start + j);
        paint(cats, start..stop, TokenCategory::ProcessingInstruction);
    }
}

/// For each line in `range`, paint the marker `marker_len` reports after
/// the line's leading spaces.
fn paint_line_markers<F>(text: &str, cats: &mut [TokenCategory], range: Range<usize>, marker_len: F)
where
    F: Fn(&str) -> Option<usize>,
{
    let Some(slice) = text.get(range.clone()) else {
        return;
    };
    let mut offset = range.start;
    for line in LinesWithEndings::from(slice) {
        let trimmed = line.trim_start_matches(' ');
        let indent = line.len() - trimmed.len();
        if let Some(len) = marker_len(trimmed) {
            paint(cats, offset + indent..offset + indent + len, TokenCategory::ProcessingInstruction);
        }
        offset += line.len();
    }
}

fn paint_list_marker(text: &str, cats: &mut [TokenCategory], range: Range<usize>) {
    let Some(slice) = text.get(range.clone()) else {
        return;
    };
    if let Some(len) = list_marker_len(slice) {
        paint(cats, range.start..range.start + len, TokenCategory::ProcessingInstruction);
    }
}

/// Length of a bullet (`-`, `*`, `+`) or ordered (`12.`, `3)`) marker.
fn list_marker_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match bytes.first()? {
        b'-' | b'*' | b'+' => Some(1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            match bytes.get(digits) {
                Some(b'.') | Some(b')') if digits <= 9 => Some(digits + 1),
                _ => None,
            }
        }
        _ => None,
    }
}

fn paint_link(text: &str, cats: &mut [TokenCategory], range: Range<usize>) {
    let Some(slice) = text.get(range.clone()) else {
        return;
    };
    if slice.starts_with('<') {
        paint(cats, range, TokenCategory::Url);
        return;
    }
    paint(cats, range.clone(), TokenCategory::Link);
    // Inline form: [text](destination "title")
    if let Some(open) = slice.rfind("](") {
        let dest_start = range.start + open + 2;
        let dest_end = if slice.ends_with(')') { range.end - 1 } else { range.end };
        paint(cats, dest_start..dest_end, TokenCategory::Url);
    }
}
