//! Editor theme: chrome colors plus the token style table.
//!
//! A [`Theme`] is built once and shared behind an `Rc`; nothing in it is
//! mutable after construction. Switching between light and dark mode means
//! building the other theme and recreating the editor.

use super::settings::ThemeMode;

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }
}

/// Syntactic class assigned to a span of text by the markdown mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Plain,
    Keyword,
    Name,
    PropertyName,
    Function,
    Constant,
    Definition,
    Separator,
    TypeName,
    Number,
    Annotation,
    Namespace,
    Operator,
    Modifier,
    Url,
    Escape,
    Regexp,
    Link,
    Meta,
    Comment,
    Strong,
    Emphasis,
    Strikethrough,
    Atom,
    ProcessingInstruction,
    String,
    Inserted,
    Deleted,
    Invalid,
    Monospace,
    Quote,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    MatchingBracket,
    NonMatchingBracket,
    /// Unhighlighted text on the line holding the cursor.
    ActiveLine,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 40] = [
        Self::Plain,
        Self::Keyword,
        Self::Name,
        Self::PropertyName,
        Self::Function,
        Self::Constant,
        Self::Definition,
        Self::Separator,
        Self::TypeName,
        Self::Number,
        Self::Annotation,
        Self::Namespace,
        Self::Operator,
        Self::Modifier,
        Self::Url,
        Self::Escape,
        Self::Regexp,
        Self::Link,
        Self::Meta,
        Self::Comment,
        Self::Strong,
        Self::Emphasis,
        Self::Strikethrough,
        Self::Atom,
        Self::ProcessingInstruction,
        Self::String,
        Self::Inserted,
        Self::Deleted,
        Self::Invalid,
        Self::Monospace,
        Self::Quote,
        Self::Heading1,
        Self::Heading2,
        Self::Heading3,
        Self::Heading4,
        Self::Heading5,
        Self::Heading6,
        Self::MatchingBracket,
        Self::NonMatchingBracket,
        Self::ActiveLine,
    ];

    /// Position of this category in [`TokenCategory::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Style byte used in the FLTK style buffer ('A' is the first entry).
    pub fn style_char(self) -> char {
        (b'A' + self.index() as u8) as char
    }

    /// Heading category for a 1-based ATX/setext level. Levels beyond 6 clamp.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => Self::Heading1,
            2 => Self::Heading2,
            3 => Self::Heading3,
            4 => Self::Heading4,
            5 => Self::Heading5,
            _ => Self::Heading6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// Display attributes for one token category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleRecord {
    /// `None` inherits the editor foreground.
    pub color: Option<Rgb>,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub decoration: TextDecoration,
    /// Multiplier applied to the editor font size.
    pub font_scale: f32,
    pub background: Option<Rgb>,
    /// Carry the background on to the right edge of the line.
    pub fill_line: bool,
}

impl StyleRecord {
    const PLAIN: StyleRecord = StyleRecord {
        color: None,
        weight: FontWeight::Normal,
        style: FontStyle::Normal,
        decoration: TextDecoration::None,
        font_scale: 1.0,
        background: None,
        fill_line: false,
    };

    const fn colored(color: Rgb) -> Self {
        Self { color: Some(color), ..Self::PLAIN }
    }

    const fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    const fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }

    const fn decorated(mut self, decoration: TextDecoration) -> Self {
        self.decoration = decoration;
        self
    }

    const fn scaled(mut self, font_scale: f32) -> Self {
        self.font_scale = font_scale;
        self
    }

    const fn on(mut self, background: Rgb) -> Self {
        self.background = Some(background);
        self
    }

    const fn filled(mut self) -> Self {
        self.fill_line = true;
        self
    }
}

/// Named colors a style table is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub violet: Rgb,
    pub coral: Rgb,
    pub malibu: Rgb,
    pub whiskey: Rgb,
    pub chalky: Rgb,
    pub cyan: Rgb,
    pub sage: Rgb,
    pub ivory: Rgb,
    pub stone: Rgb,
    pub invalid: Rgb,
    pub headings: [Rgb; 6],
    pub bracket: Rgb,
    pub bracket_mismatch: Rgb,
}

/// One style record per token category.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    records: Vec<StyleRecord>,
}

impl StyleTable {
    /// Token colors come from the palette; line-level backgrounds from the
    /// editor chrome.
    pub fn from_palette(p: &Palette, chrome: &EditorChrome) -> Self {
        let records = TokenCategory::ALL
            .iter()
            .map(|&category| record_for(category, p, chrome))
            .collect();
        Self { records }
    }

    pub fn style(&self, category: TokenCategory) -> &StyleRecord {
        &self.records[category.index()]
    }

    /// Records in [`TokenCategory::ALL`] order.
    pub fn records(&self) -> &[StyleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn record_for(category: TokenCategory, p: &Palette, chrome: &EditorChrome) -> StyleRecord {
    use TokenCategory as T;
    match category {
        T::Plain => StyleRecord::PLAIN,
        T::Keyword => StyleRecord::colored(p.violet),
        T::Name | T::PropertyName | T::Deleted => StyleRecord::colored(p.coral),
        T::Function => StyleRecord::colored(p.malibu),
        T::Constant | T::Atom => StyleRecord::colored(p.whiskey),
        T::Definition | T::Separator => StyleRecord::colored(p.ivory),
        T::TypeName | T::Number | T::Annotation | T::Modifier | T::Namespace => {
            StyleRecord::colored(p.chalky)
        }
        T::Operator | T::Url | T::Escape | T::Regexp => StyleRecord::colored(p.cyan),
        T::Meta | T::Comment => StyleRecord::colored(p.stone),
        T::Strong => StyleRecord::PLAIN.bold(),
        T::Emphasis => StyleRecord::PLAIN.italic(),
        T::Strikethrough => StyleRecord::PLAIN.decorated(TextDecoration::LineThrough),
        T::Link => StyleRecord::colored(p.stone).decorated(TextDecoration::Underline),
        T::ProcessingInstruction | T::String | T::Inserted => StyleRecord::colored(p.sage),
        T::Invalid => StyleRecord::colored(p.invalid),
        T::Monospace => StyleRecord::colored(p.coral),
        T::Quote => StyleRecord::colored(p.chalky).italic(),
        T::Heading1 => StyleRecord::colored(p.headings[0]).bold().scaled(1.8),
        T::Heading2 => StyleRecord::colored(p.headings[1]).bold().scaled(1.6),
        T::Heading3 => StyleRecord::colored(p.headings[2]).bold().scaled(1.4),
        T::Heading4 => StyleRecord::colored(p.headings[3]).bold().scaled(1.2),
        T::Heading5 => StyleRecord::colored(p.headings[4]).bold().scaled(1.0),
        T::Heading6 => StyleRecord::colored(p.headings[5]).bold().scaled(0.8),
        T::MatchingBracket => StyleRecord::PLAIN.bold().on(p.bracket),
        T::NonMatchingBracket => StyleRecord::colored(p.invalid).bold().on(p.bracket_mismatch),
        T::ActiveLine => StyleRecord::PLAIN.on(chrome.active_line).filled(),
    }
}

/// Colors of the editor surface itself (not of tokens).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorChrome {
    pub background: Rgb,
    pub foreground: Rgb,
    pub caret: Rgb,
    pub selection: Rgb,
    pub gutter_background: Rgb,
    pub gutter_foreground: Rgb,
    pub bracket_outline: Rgb,
    /// Background of the line holding the cursor.
    pub active_line: Rgb,
    pub is_dark: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub chrome: EditorChrome,
    pub styles: StyleTable,
}

const LIGHT_PALETTE: Palette = Palette {
    violet: Rgb::hex(0x26292A),
    coral: Rgb::hex(0x26292A),
    malibu: Rgb::hex(0x19E5C5),
    whiskey: Rgb::hex(0x19E5C5),
    chalky: Rgb::hex(0x807D7E),
    cyan: Rgb::hex(0x616061),
    sage: Rgb::hex(0x616061),
    ivory: Rgb::hex(0xE53525),
    stone: Rgb::hex(0xC8BFBF),
    invalid: Rgb::hex(0x26292A),
    headings: [
        Rgb::hex(0x26292A),
        Rgb::hex(0x616061),
        Rgb::hex(0x807D7E),
        Rgb::hex(0x9E999A),
        Rgb::hex(0xC8BFBF),
        Rgb::hex(0xC8BFBF),
    ],
    bracket: Rgb::hex(0xDDE3EE),
    bracket_mismatch: Rgb::hex(0xF6D5D2),
};

const DARK_PALETTE: Palette = Palette {
    violet: Rgb::hex(0xC678DD),
    coral: Rgb::hex(0xE06C75),
    malibu: Rgb::hex(0x61AFEF),
    whiskey: Rgb::hex(0xD19A66),
    chalky: Rgb::hex(0xE5C07B),
    cyan: Rgb::hex(0x56B6C2),
    sage: Rgb::hex(0x98C379),
    ivory: Rgb::hex(0xABB2BF),
    stone: Rgb::hex(0x7D8799),
    invalid: Rgb::hex(0xFFFFFF),
    headings: [
        Rgb::hex(0xE06C75),
        Rgb::hex(0xE5C07B),
        Rgb::hex(0x98C379),
        Rgb::hex(0x61AFEF),
        Rgb::hex(0xC678DD),
        Rgb::hex(0xC678DD),
    ],
    bracket: Rgb::hex(0x3E4451),
    bracket_mismatch: Rgb::hex(0x5C2B2E),
};

impl Theme {
    pub fn light() -> Self {
        let chrome = EditorChrome {
            background: Rgb::hex(0xFFFFFF),
            foreground: Rgb::hex(0x26292A),
            caret: Rgb::hex(0xE53525),
            selection: Rgb::hex(0x19E5C5),
            gutter_background: Rgb::hex(0xFFFFFF),
            gutter_foreground: Rgb::hex(0xC8BFBF),
            bracket_outline: Rgb::hex(0x515A6B),
            active_line: Rgb::hex(0xF4F6F6),
            is_dark: false,
        };
        Self {
            name: "Paper",
            styles: StyleTable::from_palette(&LIGHT_PALETTE, &chrome),
            chrome,
        }
    }

    pub fn dark() -> Self {
        let chrome = EditorChrome {
            background: Rgb::hex(0x282C34),
            foreground: Rgb::hex(0xABB2BF),
            caret: Rgb::hex(0x528BFF),
            selection: Rgb::hex(0x3E4451),
            gutter_background: Rgb::hex(0x282C34),
            gutter_foreground: Rgb::hex(0x7D8799),
            bracket_outline: Rgb::hex(0x515A6B),
            active_line: Rgb::hex(0x2C313C),
            is_dark: true,
        };
        Self {
            name: "Ink",
            styles: StyleTable::from_palette(&DARK_PALETTE, &chrome),
            chrome,
        }
    }

    /// Resolve a theme for the configured mode. `system_dark` is only
    /// consulted for [`ThemeMode::SystemDefault`].
    pub fn for_mode(mode: ThemeMode, system_dark: bool) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
            ThemeMode::SystemDefault if system_dark => Self::dark(),
            ThemeMode::SystemDefault => Self::light(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_record() {
        let theme = Theme::light();
        assert_eq!(theme.styles.len(), TokenCategory::ALL.len());
        for (i, category) in TokenCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i, "{:?} out of order in ALL", category);
            // Must not panic
            let _ = theme.styles.style(*category);
        }
    }

    #[test]
    fn test_style_chars_follow_index() {
        for (i, category) in TokenCategory::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), i);
            assert_eq!(category.style_char() as usize, 'A' as usize + i);
        }
        assert_eq!(TokenCategory::Plain.style_char(), 'A');
        assert_eq!(TokenCategory::ActiveLine.style_char(), 'h');
    }

    #[test]
    fn test_heading_scales_decrease() {
        let styles = Theme::light().styles;
        let scales: Vec<f32> = (1..=6)
            .map(|lvl| styles.style(TokenCategory::heading(lvl)).font_scale)
            .collect();
        assert_eq!(scales, vec![1.8, 1.6, 1.4, 1.2, 1.0, 0.8]);
        for lvl in 1..=6 {
            assert_eq!(styles.style(TokenCategory::heading(lvl)).weight, FontWeight::Bold);
        }
    }

    #[test]
    fn test_inline_markup_styles() {
        let styles = Theme::dark().styles;
        assert_eq!(styles.style(TokenCategory::Strong).weight, FontWeight::Bold);
        assert_eq!(styles.style(TokenCategory::Emphasis).style, FontStyle::Italic);
        assert_eq!(
            styles.style(TokenCategory::Strikethrough).decoration,
            TextDecoration::LineThrough
        );
        assert_eq!(styles.style(TokenCategory::Link).decoration, TextDecoration::Underline);
        assert!(styles.style(TokenCategory::Plain).color.is_none());
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(Rgb::hex(0x19E5C5), Rgb::new(0x19, 0xE5, 0xC5));
    }

    #[test]
    fn test_theme_for_mode() {
        assert!(!Theme::for_mode(ThemeMode::Light, true).chrome.is_dark);
        assert!(Theme::for_mode(ThemeMode::Dark, false).chrome.is_dark);
        assert!(Theme::for_mode(ThemeMode::SystemDefault, true).chrome.is_dark);
        assert!(!Theme::for_mode(ThemeMode::SystemDefault, false).chrome.is_dark);
    }

    #[test]
    fn test_heading_level_clamps() {
        assert_eq!(TokenCategory::heading(0), TokenCategory::Heading1);
        assert_eq!(TokenCategory::heading(9), TokenCategory::Heading6);
    }

    #[test]
    fn test_active_line_uses_chrome_background() {
        for theme in [Theme::light(), Theme::dark()] {
            let record = theme.styles.style(TokenCategory::ActiveLine);
            assert_eq!(record.background, Some(theme.chrome.active_line));
            assert!(record.fill_line);
            assert_eq!(record.color, None);
            assert_ne!(theme.chrome.active_line, theme.chrome.background);
        }
        assert!(!Theme::light().styles.style(TokenCategory::MatchingBracket).fill_line);
    }
}
