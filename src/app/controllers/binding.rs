//! Lifecycle adapter between a container widget and an editor instance.
//!
//! ```text
//! Unmounted --attach--> Initializing --create ok--> Ready
//!     ^                      |                        |
//!     +------ create err ----+                        |
//!     +------------------- unmount / drop ------------+
//! ```
//!
//! The instance is keyed on container identity: attaching the same
//! container again is a no-op, attaching a different one rebuilds.

use std::rc::Rc;

use crate::app::domain::document::{Document, EditorState};
use crate::app::domain::theme::Theme;
use crate::app::infrastructure::error::Result;
use crate::app::services::markdown::LanguageRegistry;

use super::config::{ChangeCallback, EditorConfig};

/// Identity of a container, stable for the container's lifetime.
pub type ContainerKey = usize;

/// A live editor built from an [`EditorConfig`].
///
/// Implementations must call [`EditorConfig::notify`] exactly once per
/// content change, synchronously, after the change is applied.
pub trait EditorInstance {
    fn state(&self) -> EditorState;

    /// Release everything the instance holds. Must be idempotent.
    fn destroy(&mut self);
}

/// The editor library seam.
pub trait EditorBackend {
    type Container;
    type Instance: EditorInstance;

    fn container_key(&self, container: &Self::Container) -> ContainerKey;

    fn create(&mut self, container: &Self::Container, config: EditorConfig) -> Result<Self::Instance>;
}

/// Inputs supplied by the owner of the binding.
#[derive(Clone)]
pub struct EditorProps {
    pub initial_doc: Document,
    pub on_change: Option<ChangeCallback>,
    pub theme: Rc<Theme>,
    pub languages: LanguageRegistry,
    pub tab_size: usize,
}

impl EditorProps {
    pub fn new(initial_doc: Document, languages: LanguageRegistry) -> Self {
        Self {
            initial_doc,
            on_change: None,
            theme: Rc::new(Theme::default()),
            languages,
            tab_size: 4,
        }
    }

    pub fn with_on_change(mut self, callback: ChangeCallback) -> Self {
        self.on_change = Some(callback);
        self
    }

    pub fn with_theme(mut self, theme: Rc<Theme>) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingPhase {
    Unmounted,
    Initializing,
    Ready,
}

pub struct EditorBinding<B: EditorBackend> {
    backend: B,
    props: EditorProps,
    phase: BindingPhase,
    container: Option<ContainerKey>,
    instance: Option<B::Instance>,
}

impl<B: EditorBackend> EditorBinding<B> {
    pub fn new(backend: B, props: EditorProps) -> Self {
        Self {
            backend,
            props,
            phase: BindingPhase::Unmounted,
            container: None,
            instance: None,
        }
    }

    /// Build the editor inside `container` unless it already lives there.
    pub fn attach(&mut self, container: &B::Container) -> Result<()> {
        let key = self.backend.container_key(container);
        if self.phase == BindingPhase::Ready && self.container == Some(key) {
            log::trace!("Editor already mounted in container {:#x}", key);
            return Ok(());
        }
        if self.instance.is_some() {
            log::debug!("Container changed to {:#x}, rebuilding editor", key);
            self.unmount();
        }

        self.phase = BindingPhase::Initializing;
        let config = self.build_config();
        match self.backend.create(container, config) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.container = Some(key);
                self.phase = BindingPhase::Ready;
                log::debug!(
                    "Editor mounted in container {:#x} ({} bytes)",
                    key,
                    self.props.initial_doc.len()
                );
                Ok(())
            }
            Err(e) => {
                self.phase = BindingPhase::Unmounted;
                log::warn!("Failed to create editor: {}", e);
                Err(e)
            }
        }
    }

    /// Destroy the live instance, if any. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.destroy();
            log::debug!("Editor unmounted from container {:#x}", self.container.unwrap_or(0));
        }
        self.container = None;
        self.phase = BindingPhase::Unmounted;
    }

    /// Record a new initial document. A live instance keeps its content;
    /// the new value is used the next time an instance is built.
    pub fn set_initial_doc(&mut self, doc: Document) {
        if self.phase == BindingPhase::Ready && doc != self.props.initial_doc {
            log::debug!("Initial document changed while mounted; applies on next mount");
        }
        self.props.initial_doc = doc;
    }

    /// Takes effect on the next mount.
    pub fn set_theme(&mut self, theme: Rc<Theme>) {
        self.props.theme = theme;
    }

    /// Takes effect on the next mount.
    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.props.tab_size = tab_size;
    }

    fn build_config(&self) -> EditorConfig {
        let mut builder = EditorConfig::builder(self.props.initial_doc.clone())
            .theme(self.props.theme.clone())
            .languages(self.props.languages.clone())
            .tab_size(self.props.tab_size);
        if let Some(cb) = &self.props.on_change {
            builder = builder.on_change(cb.clone());
        }
        builder.build()
    }

    pub fn phase(&self) -> BindingPhase {
        self.phase
    }

    pub fn container(&self) -> Option<ContainerKey> {
        self.container
    }

    pub fn instance(&self) -> Option<&B::Instance> {
        self.instance.as_ref()
    }

    #[cfg(test)]
    pub fn instance_mut(&mut self) -> Option<&mut B::Instance> {
        self.instance.as_mut()
    }

    /// Backend settings take effect on the next mount.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: EditorBackend> Drop for EditorBinding<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::app::controllers::test_support::{MemoryBackend, MemoryContainer, languages};

    fn props(doc: &str) -> EditorProps {
        EditorProps::new(Document::new(doc), languages())
    }

    #[test]
    fn test_mount_constructs_one_instance_with_initial_doc() {
        let backend = MemoryBackend::default();
        let stats = backend.stats();
        let mut binding = EditorBinding::new(backend, props("# Hello"));
        assert_eq!(binding.phase(), BindingPhase::Unmounted);
        assert!(binding.instance().is_none());

        let container = MemoryContainer::new(1);
        binding.attach(&container).unwrap();
        binding.attach(&container).unwrap();

        assert_eq!(binding.phase(), BindingPhase::Ready);
        assert_eq!(stats.created(), 1);
        assert_eq!(binding.container(), Some(1));
        assert_eq!(binding.instance().unwrap().state().doc.as_str(), "# Hello");
        assert_eq!(binding.instance().unwrap().state().revision, 0);
    }

    #[test]
    fn test_each_insertion_notifies_once_with_content_after() {
        let seen: Rc<RefCell<Vec<(String, u64)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let props = props("a").with_on_change(Rc::new(move |state: &EditorState| {
            sink.borrow_mut().push((state.doc.to_string(), state.revision));
        }));
        let mut binding = EditorBinding::new(MemoryBackend::default(), props);
        binding.attach(&MemoryContainer::new(7)).unwrap();

        let editor = binding.instance_mut().unwrap();
        for ch in ["b", "c", "d"] {
            editor.append(ch);
        }

        assert_eq!(
            *seen.borrow(),
            vec![
                ("ab".to_string(), 1),
                ("abc".to_string(), 2),
                ("abcd".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_unmount_destroys_instance() {
        let backend = MemoryBackend::default();
        let stats = backend.stats();
        let mut binding = EditorBinding::new(backend, props("x"));
        binding.attach(&MemoryContainer::new(1)).unwrap();

        binding.unmount();
        assert_eq!(binding.phase(), BindingPhase::Unmounted);
        assert_eq!(stats.destroyed(), 1);

        // A second unmount is a no-op
        binding.unmount();
        assert_eq!(stats.destroyed(), 1);
    }

    #[test]
    fn test_unmount_before_mount_is_harmless() {
        let mut binding = EditorBinding::new(MemoryBackend::default(), props("x"));
        binding.unmount();
        assert_eq!(binding.phase(), BindingPhase::Unmounted);
    }

    #[test]
    fn test_drop_disposes() {
        let backend = MemoryBackend::default();
        let stats = backend.stats();
        {
            let mut binding = EditorBinding::new(backend, props("x"));
            binding.attach(&MemoryContainer::new(1)).unwrap();
        }
        assert_eq!(stats.created(), 1);
        assert_eq!(stats.destroyed(), 1);
    }

    #[test]
    fn test_new_container_rebuilds() {
        let backend = MemoryBackend::default();
        let stats = backend.stats();
        let mut binding = EditorBinding::new(backend, props("x"));
        binding.attach(&MemoryContainer::new(1)).unwrap();
        binding.attach(&MemoryContainer::new(2)).unwrap();
        assert_eq!(stats.created(), 2);
        assert_eq!(stats.destroyed(), 1);
        assert_eq!(binding.container(), Some(2));
    }

    #[test]
    fn test_initial_doc_change_ignored_until_remount() {
        let mut binding = EditorBinding::new(MemoryBackend::default(), props("first"));
        let container = MemoryContainer::new(1);
        binding.attach(&container).unwrap();

        binding.set_initial_doc(Document::new("second"));
        binding.attach(&container).unwrap();
        assert_eq!(binding.instance().unwrap().state().doc.as_str(), "first");

        binding.unmount();
        binding.attach(&container).unwrap();
        assert_eq!(binding.instance().unwrap().state().doc.as_str(), "second");
    }

    #[test]
    fn test_create_failure_returns_to_unmounted() {
        let backend = MemoryBackend::failing();
        let mut binding = EditorBinding::new(backend, props("x"));
        let err = binding.attach(&MemoryContainer::new(1)).unwrap_err();
        assert!(err.to_string().contains("refused"));
        assert_eq!(binding.phase(), BindingPhase::Unmounted);
        assert!(binding.instance().is_none());
    }

    #[test]
    fn test_independent_instances_do_not_cross_talk() {
        let left_seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let right_seen = Rc::new(RefCell::new(Vec::<String>::new()));

        let sink = left_seen.clone();
        let mut left = EditorBinding::new(
            MemoryBackend::default(),
            props("left").with_on_change(Rc::new(move |s: &EditorState| {
                sink.borrow_mut().push(s.doc.to_string())
            })),
        );
        let sink = right_seen.clone();
        let mut right = EditorBinding::new(
            MemoryBackend::default(),
            props("right").with_on_change(Rc::new(move |s: &EditorState| {
                sink.borrow_mut().push(s.doc.to_string())
            })),
        );
        left.attach(&MemoryContainer::new(1)).unwrap();
        right.attach(&MemoryContainer::new(2)).unwrap();

        left.instance_mut().unwrap().append("!");
        right.instance_mut().unwrap().append("?");
        right.instance_mut().unwrap().append("?");

        assert_eq!(*left_seen.borrow(), vec!["left!".to_string()]);
        assert_eq!(*right_seen.borrow(), vec!["right?".to_string(), "right??".to_string()]);
        assert_eq!(left.instance().unwrap().state().doc.as_str(), "left!");
        assert_eq!(right.instance().unwrap().state().doc.as_str(), "right??");
    }
}
