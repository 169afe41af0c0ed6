//! Assembles the ordered extension list an editor instance is built from.

use std::fmt;
use std::rc::Rc;

use crate::app::domain::document::{Document, EditorState};
use crate::app::domain::keymap::Keymap;
use crate::app::domain::theme::{EditorChrome, StyleTable, Theme};
use crate::app::services::markdown::LanguageRegistry;

/// Invoked with the new state after every content change.
pub type ChangeCallback = Rc<dyn Fn(&EditorState)>;

/// Markdown parsing mode settings.
#[derive(Debug, Clone)]
pub struct MarkdownMode {
    /// Languages highlighted inside fenced code blocks.
    pub languages: LanguageRegistry,
    /// Add list/quote-aware Enter and Backspace bindings.
    pub add_keymap: bool,
}

/// One unit of editor behaviour.
#[derive(Clone)]
pub enum Extension {
    Keymap(Keymap),
    LineNumbers,
    History,
    IndentOnInput,
    BracketMatching,
    HighlightActiveLine,
    Markdown(MarkdownMode),
    Theme(EditorChrome),
    HighlightStyle(Rc<StyleTable>),
    LineWrapping,
    UpdateListener(ChangeCallback),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    Keymap,
    LineNumbers,
    History,
    IndentOnInput,
    BracketMatching,
    HighlightActiveLine,
    Markdown,
    Theme,
    HighlightStyle,
    LineWrapping,
    UpdateListener,
}

impl Extension {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Self::Keymap(_) => ExtensionKind::Keymap,
            Self::LineNumbers => ExtensionKind::LineNumbers,
            Self::History => ExtensionKind::History,
            Self::IndentOnInput => ExtensionKind::IndentOnInput,
            Self::BracketMatching => ExtensionKind::BracketMatching,
            Self::HighlightActiveLine => ExtensionKind::HighlightActiveLine,
            Self::Markdown(_) => ExtensionKind::Markdown,
            Self::Theme(_) => ExtensionKind::Theme,
            Self::HighlightStyle(_) => ExtensionKind::HighlightStyle,
            Self::LineWrapping => ExtensionKind::LineWrapping,
            Self::UpdateListener(_) => ExtensionKind::UpdateListener,
        }
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keymap(map) => write!(f, "Keymap({} bindings)", map.len()),
            Self::Markdown(mode) => write!(f, "Markdown({:?})", mode),
            Self::Theme(chrome) => write!(f, "Theme(dark: {})", chrome.is_dark),
            Self::HighlightStyle(table) => write!(f, "HighlightStyle({} styles)", table.len()),
            Self::UpdateListener(_) => f.write_str("UpdateListener"),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// Everything needed to construct one editor instance. Immutable once
/// built; reconfiguring means building a new instance.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    doc: Document,
    extensions: Vec<Extension>,
    tab_size: usize,
}

impl EditorConfig {
    pub fn builder(initial_doc: impl Into<Document>) -> EditorConfigBuilder {
        EditorConfigBuilder::new(initial_doc.into())
    }

    pub fn initial_doc(&self) -> &Document {
        &self.doc
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn has(&self, kind: ExtensionKind) -> bool {
        self.extensions.iter().any(|e| e.kind() == kind)
    }

    pub fn keymap(&self) -> Option<&Keymap> {
        self.extensions.iter().find_map(|e| match e {
            Extension::Keymap(map) => Some(map),
            _ => None,
        })
    }

    pub fn theme_chrome(&self) -> Option<&EditorChrome> {
        self.extensions.iter().find_map(|e| match e {
            Extension::Theme(chrome) => Some(chrome),
            _ => None,
        })
    }

    pub fn style_table(&self) -> Option<&Rc<StyleTable>> {
        self.extensions.iter().find_map(|e| match e {
            Extension::HighlightStyle(table) => Some(table),
            _ => None,
        })
    }

    pub fn markdown(&self) -> Option<&MarkdownMode> {
        self.extensions.iter().find_map(|e| match e {
            Extension::Markdown(mode) => Some(mode),
            _ => None,
        })
    }

    /// Deliver a change notification to every update listener, in order.
    pub fn notify(&self, state: &EditorState) {
        for extension in &self.extensions {
            if let Extension::UpdateListener(cb) = extension {
                cb(state);
            }
        }
    }
}

pub struct EditorConfigBuilder {
    doc: Document,
    theme: Option<Rc<Theme>>,
    languages: Option<LanguageRegistry>,
    tab_size: usize,
    on_change: Option<ChangeCallback>,
}

impl EditorConfigBuilder {
    fn new(doc: Document) -> Self {
        Self {
            doc,
            theme: None,
            languages: None,
            tab_size: 4,
            on_change: None,
        }
    }

    pub fn theme(mut self, theme: Rc<Theme>) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = Some(languages);
        self
    }

    pub fn tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size.max(1);
        self
    }

    pub fn on_change(mut self, callback: ChangeCallback) -> Self {
        self.on_change = Some(callback);
        self
    }

    pub fn build(self) -> EditorConfig {
        let theme = self.theme.unwrap_or_else(|| Rc::new(Theme::default()));
        let languages = self.languages.unwrap_or_else(LanguageRegistry::defaults);
        let on_change: ChangeCallback = match self.on_change {
            Some(cb) => cb,
            None => Rc::new(|_: &EditorState| {}),
        };

        let keymap = Keymap::compose([
            Keymap::markdown_keymap(),
            Keymap::default_keymap(),
            Keymap::history_keymap(),
        ]);

        let extensions = vec![
            Extension::Keymap(keymap),
            Extension::LineNumbers,
            Extension::History,
            Extension::IndentOnInput,
            Extension::BracketMatching,
            Extension::HighlightActiveLine,
            Extension::Markdown(MarkdownMode { languages, add_keymap: true }),
            Extension::Theme(theme.chrome),
            Extension::HighlightStyle(Rc::new(theme.styles.clone())),
            Extension::LineWrapping,
            Extension::UpdateListener(on_change),
        ];

        log::debug!("Built editor config with {} extensions", extensions.len());

        EditorConfig {
            doc: self.doc,
            extensions,
            tab_size: self.tab_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::app::domain::keymap::{Command, Key, KeyChord};
    use crate::app::domain::theme::TokenCategory;

    fn languages() -> LanguageRegistry {
        LanguageRegistry::defaults()
    }

    #[test]
    fn test_required_extensions_present_in_order() {
        let config = EditorConfig::builder("# hi").languages(languages()).build();
        let kinds: Vec<ExtensionKind> = config.extensions().iter().map(Extension::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ExtensionKind::Keymap,
                ExtensionKind::LineNumbers,
                ExtensionKind::History,
                ExtensionKind::IndentOnInput,
                ExtensionKind::BracketMatching,
                ExtensionKind::HighlightActiveLine,
                ExtensionKind::Markdown,
                ExtensionKind::Theme,
                ExtensionKind::HighlightStyle,
                ExtensionKind::LineWrapping,
                ExtensionKind::UpdateListener,
            ]
        );
        assert_eq!(config.initial_doc().as_str(), "# hi");
    }

    #[test]
    fn test_listener_present_without_callback() {
        let config = EditorConfig::builder("").languages(languages()).build();
        assert!(config.has(ExtensionKind::UpdateListener));
        // Must not panic
        config.notify(&EditorState::initial(Document::new("x")));
    }

    #[test]
    fn test_notify_invokes_callback_with_state() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let config = EditorConfig::builder("")
            .languages(languages())
            .on_change(Rc::new(move |state: &EditorState| {
                sink.borrow_mut().push(state.doc.to_string());
            }))
            .build();
        config.notify(&EditorState { doc: Document::new("a"), revision: 1 });
        config.notify(&EditorState { doc: Document::new("ab"), revision: 2 });
        assert_eq!(*seen.borrow(), vec!["a".to_string(), "ab".to_string()]);
    }

    #[test]
    fn test_keymap_prefers_markdown_enter() {
        let config = EditorConfig::builder("").languages(languages()).build();
        let keymap = config.keymap().unwrap();
        assert_eq!(
            keymap.lookup(KeyChord::plain(Key::Enter)),
            Some(Command::InsertNewlineContinueMarkup)
        );
        assert_eq!(keymap.lookup(KeyChord::ctrl(Key::Char('z'))), Some(Command::Undo));
    }

    #[test]
    fn test_theme_flows_into_extensions() {
        let theme = Rc::new(Theme::dark());
        let config = EditorConfig::builder("")
            .languages(languages())
            .theme(theme.clone())
            .build();
        assert!(config.theme_chrome().unwrap().is_dark);
        let table = config.style_table().unwrap();
        assert_eq!(**table, theme.styles);
        for category in TokenCategory::ALL {
            assert_eq!(table.style(category), theme.styles.style(category));
        }
        assert_eq!(
            table.style(TokenCategory::ActiveLine).background,
            Some(config.theme_chrome().unwrap().active_line)
        );
    }

    #[test]
    fn test_tab_size_has_floor() {
        let config = EditorConfig::builder("").languages(languages()).tab_size(0).build();
        assert_eq!(config.tab_size(), 1);
    }

    #[test]
    fn test_markdown_mode_has_code_languages() {
        let config = EditorConfig::builder("").languages(languages()).build();
        let mode = config.markdown().unwrap();
        assert!(mode.add_keymap);
        assert!(mode.languages.resolve("rust").is_some());
    }
}
