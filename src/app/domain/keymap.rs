//! Key bindings for the editor pane.
//!
//! A [`Keymap`] is an ordered list of bindings. Composing several keymaps
//! keeps the first binding seen for a chord, so earlier maps take precedence.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub const fn plain(key: Key) -> Self {
        Self { key, ctrl: false, shift: false, alt: false }
    }

    pub const fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true, shift: false, alt: false }
    }

    pub const fn ctrl_shift(key: Key) -> Self {
        Self { key, ctrl: true, shift: true, alt: false }
    }

    pub const fn shift(key: Key) -> Self {
        Self { key, ctrl: false, shift: true, alt: false }
    }

    /// Letters are matched case-insensitively; shift is carried by the flag.
    pub fn normalized(self) -> Self {
        match self.key {
            Key::Char(c) => Self { key: Key::Char(c.to_ascii_lowercase()), ..self },
            _ => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    IndentMore,
    IndentLess,
    InsertNewlineAndIndent,
    /// Enter inside a list or quote: continue the markup on the next line.
    InsertNewlineContinueMarkup,
    /// Backspace right after a list or quote marker removes the marker.
    DeleteMarkupBackward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub chord: KeyChord,
    pub command: Command,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    pub fn new(bindings: Vec<KeyBinding>) -> Self {
        let mut map = Self::default();
        for binding in bindings {
            map.push(binding);
        }
        map
    }

    /// Editing basics: clipboard, select all, indentation, newline.
    pub fn default_keymap() -> Self {
        Self::new(vec![
            bind(KeyChord::ctrl(Key::Char('x')), Command::Cut),
            bind(KeyChord::ctrl(Key::Char('c')), Command::Copy),
            bind(KeyChord::ctrl(Key::Char('v')), Command::Paste),
            bind(KeyChord::ctrl(Key::Char('a')), Command::SelectAll),
            bind(KeyChord::ctrl(Key::Char(']')), Command::IndentMore),
            bind(KeyChord::ctrl(Key::Char('[')), Command::IndentLess),
            bind(KeyChord::shift(Key::Tab), Command::IndentLess),
            bind(KeyChord::plain(Key::Enter), Command::InsertNewlineAndIndent),
        ])
    }

    pub fn history_keymap() -> Self {
        Self::new(vec![
            bind(KeyChord::ctrl(Key::Char('z')), Command::Undo),
            bind(KeyChord::ctrl(Key::Char('y')), Command::Redo),
            bind(KeyChord::ctrl_shift(Key::Char('z')), Command::Redo),
        ])
    }

    /// Markdown-aware Enter and Backspace.
    pub fn markdown_keymap() -> Self {
        Self::new(vec![
            bind(KeyChord::plain(Key::Enter), Command::InsertNewlineContinueMarkup),
            bind(KeyChord::plain(Key::Backspace), Command::DeleteMarkupBackward),
        ])
    }

    /// Merge keymaps in priority order.
    pub fn compose<I: IntoIterator<Item = Keymap>>(maps: I) -> Self {
        let mut out = Self::default();
        for map in maps {
            for binding in map.bindings {
                out.push(binding);
            }
        }
        out
    }

    fn push(&mut self, binding: KeyBinding) {
        let chord = binding.chord.normalized();
        if self.bindings.iter().any(|b| b.chord == chord) {
            return;
        }
        self.bindings.push(KeyBinding { chord, command: binding.command });
    }

    pub fn lookup(&self, chord: KeyChord) -> Option<Command> {
        let chord = chord.normalized();
        self.bindings
            .iter()
            .find(|b| b.chord == chord)
            .map(|b| b.command)
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn bind(chord: KeyChord, command: Command) -> KeyBinding {
    KeyBinding { chord, command }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = Keymap::history_keymap();
        assert_eq!(map.lookup(KeyChord::ctrl(Key::Char('Z'))), Some(Command::Undo));
        assert_eq!(map.lookup(KeyChord::ctrl_shift(Key::Char('Z'))), Some(Command::Redo));
        assert_eq!(map.lookup(KeyChord::plain(Key::Char('z'))), None);
    }

    #[test]
    fn test_compose_first_binding_wins() {
        let map = Keymap::compose([Keymap::markdown_keymap(), Keymap::default_keymap()]);
        assert_eq!(
            map.lookup(KeyChord::plain(Key::Enter)),
            Some(Command::InsertNewlineContinueMarkup)
        );

        let map = Keymap::compose([Keymap::default_keymap(), Keymap::markdown_keymap()]);
        assert_eq!(
            map.lookup(KeyChord::plain(Key::Enter)),
            Some(Command::InsertNewlineAndIndent)
        );
        // Backspace has no conflict, so it survives either order
        assert_eq!(
            map.lookup(KeyChord::plain(Key::Backspace)),
            Some(Command::DeleteMarkupBackward)
        );
    }

    #[test]
    fn test_compose_drops_duplicates() {
        let map = Keymap::compose([Keymap::history_keymap(), Keymap::history_keymap()]);
        assert_eq!(map.len(), Keymap::history_keymap().len());
    }

    #[test]
    fn test_alt_is_distinct() {
        let map = Keymap::default_keymap();
        let chord = KeyChord { alt: true, ..KeyChord::ctrl(Key::Char('c')) };
        assert_eq!(map.lookup(chord), None);
    }
}
