//! Top-level composition: the current document, the editor pane and the
//! preview pane.

use std::cell::RefCell;
use std::rc::Rc;

use crate::app::domain::document::{Document, EditorState};
use crate::app::domain::theme::Theme;
use crate::app::infrastructure::error::Result;
use crate::app::services::markdown::LanguageRegistry;

use super::binding::{EditorBackend, EditorBinding, EditorProps};
use super::config::ChangeCallback;

/// Something that displays the rendered document.
pub trait PreviewSink {
    fn render(&mut self, doc: &Document);
}

pub struct AppShell<B: EditorBackend, P: PreviewSink + 'static> {
    document: Rc<RefCell<Document>>,
    preview: Rc<RefCell<P>>,
    binding: EditorBinding<B>,
}

impl<B: EditorBackend, P: PreviewSink + 'static> AppShell<B, P> {
    pub fn new(
        initial_doc: Document,
        backend: B,
        preview: P,
        theme: Rc<Theme>,
        languages: LanguageRegistry,
        tab_size: usize,
    ) -> Self {
        let document = Rc::new(RefCell::new(initial_doc.clone()));
        let preview = Rc::new(RefCell::new(preview));

        let on_change: ChangeCallback = {
            let document = document.clone();
            let preview = preview.clone();
            Rc::new(move |state: &EditorState| {
                *document.borrow_mut() = state.doc.clone();
                match preview.try_borrow_mut() {
                    Ok(mut sink) => sink.render(&state.doc),
                    Err(_) => log::warn!("Preview busy, skipped render of revision {}", state.revision),
                }
            })
        };

        let props = EditorProps::new(initial_doc, languages)
            .with_on_change(on_change)
            .with_theme(theme)
            .with_tab_size(tab_size);

        Self {
            document,
            preview,
            binding: EditorBinding::new(backend, props),
        }
    }

    /// Mount the editor into `container` and render the preview once.
    pub fn mount(&mut self, container: &B::Container) -> Result<()> {
        self.binding.attach(container)?;
        self.render_preview();
        Ok(())
    }

    /// Rebuild the editor, keeping the current text. Used when the theme or
    /// indentation changes, since a built editor cannot be reconfigured.
    pub fn remount(&mut self, container: &B::Container, theme: Option<Rc<Theme>>) -> Result<()> {
        if let Some(theme) = theme {
            self.binding.set_theme(theme);
        }
        self.binding.set_initial_doc(self.document());
        self.binding.unmount();
        self.mount(container)
    }

    /// Replace the document wholesale (e.g. a file was opened).
    pub fn open_document(&mut self, container: &B::Container, doc: Document) -> Result<()> {
        *self.document.borrow_mut() = doc.clone();
        self.binding.set_initial_doc(doc);
        self.binding.unmount();
        self.mount(container)
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.binding.set_tab_size(tab_size);
    }

    pub fn unmount(&mut self) {
        self.binding.unmount();
    }

    pub fn render_preview(&self) {
        let doc = self.document();
        self.preview.borrow_mut().render(&doc);
    }

    /// Current document snapshot.
    pub fn document(&self) -> Document {
        self.document.borrow().clone()
    }

    pub fn with_preview<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.preview.borrow_mut())
    }

    pub fn binding(&self) -> &EditorBinding<B> {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut EditorBinding<B> {
        &mut self.binding
    }
}
