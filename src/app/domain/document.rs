use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Immutable snapshot of the full markdown source.
///
/// Cloning is a refcount bump. The shell replaces its snapshot wholesale on
/// every change notification.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Document(Rc<str>);

impl Document {
    pub fn new(text: &str) -> Self {
        Self(Rc::from(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a document from file contents. FLTK buffers are NUL-terminated,
    /// so embedded NUL bytes would cut the text short; they are removed.
    pub fn from_disk(content: String) -> Self {
        let nuls = content.bytes().filter(|&b| b == 0).count();
        if nuls == 0 {
            return Self::from(content);
        }
        log::warn!("Removed {} NUL bytes from loaded text", nuls);
        Self::from(content.replace('\0', ""))
    }

    /// True when both handles point at the same allocation.
    pub fn same_snapshot(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Document {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self(Rc::from(text))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document({} bytes)", self.0.len())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot handed to change listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub doc: Document,
    /// Number of content changes since the editor was constructed.
    pub revision: u64,
}

impl EditorState {
    pub fn initial(doc: Document) -> Self {
        Self { doc, revision: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_allocation() {
        let a = Document::new("# Title");
        let b = a.clone();
        assert!(a.same_snapshot(&b));
        assert!(!a.same_snapshot(&Document::new("# Title")));
        assert_eq!(a, Document::new("# Title"));
    }

    #[test]
    fn test_from_disk_drops_nul_bytes() {
        let doc = Document::from_disk(String::from("# a\0b\n\0tail"));
        assert_eq!(doc.as_str(), "# ab\ntail");

        let clean = Document::from_disk(String::from("plain\n"));
        assert_eq!(clean.as_str(), "plain\n");
    }

    #[test]
    fn test_debug_does_not_dump_content() {
        let doc = Document::from(String::from("secret notes"));
        assert_eq!(format!("{:?}", doc), "Document(12 bytes)");
        assert_eq!(doc.to_string(), "secret notes");
    }
}
