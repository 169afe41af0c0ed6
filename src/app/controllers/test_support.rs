//! In-memory editor backend for exercising the binding and shell without a
//! display.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::app::domain::document::{Document, EditorState};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::markdown::LanguageRegistry;

use super::binding::{ContainerKey, EditorBackend, EditorInstance};
use super::config::EditorConfig;
use super::shell::PreviewSink;

thread_local! {
    static LANGUAGES: LanguageRegistry = LanguageRegistry::defaults();
}

/// Shared syntax set; loading it once keeps the test suite fast.
pub fn languages() -> LanguageRegistry {
    LANGUAGES.with(|l| l.clone())
}

pub struct MemoryContainer {
    id: usize,
}

impl MemoryContainer {
    pub fn new(id: usize) -> Self {
        Self { id }
    }
}

#[derive(Clone, Default)]
pub struct BackendStats {
    created: Rc<Cell<usize>>,
    destroyed: Rc<Cell<usize>>,
}

impl BackendStats {
    pub fn created(&self) -> usize {
        self.created.get()
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.get()
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    stats: BackendStats,
    fail: bool,
}

impl MemoryBackend {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn stats(&self) -> BackendStats {
        self.stats.clone()
    }
}

impl EditorBackend for MemoryBackend {
    type Container = MemoryContainer;
    type Instance = MemoryEditor;

    fn container_key(&self, container: &MemoryContainer) -> ContainerKey {
        container.id
    }

    fn create(&mut self, _container: &MemoryContainer, config: EditorConfig) -> Result<MemoryEditor> {
        if self.fail {
            return Err(AppError::Editor("backend refused to create editor".to_string()));
        }
        self.stats.created.set(self.stats.created.get() + 1);
        Ok(MemoryEditor {
            text: config.initial_doc().to_string(),
            config,
            revision: 0,
            alive: true,
            destroyed: self.stats.destroyed.clone(),
        })
    }
}

pub struct MemoryEditor {
    config: EditorConfig,
    text: String,
    revision: u64,
    alive: bool,
    destroyed: Rc<Cell<usize>>,
}

impl MemoryEditor {
    /// Simulate typing `s` at the end of the document.
    pub fn append(&mut self, s: &str) {
        let end = self.text.len();
        self.insert(end, s);
    }

    pub fn insert(&mut self, pos: usize, s: &str) {
        self.text.insert_str(pos, s);
        self.revision += 1;
        let state = self.state();
        self.config.notify(&state);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
}

impl EditorInstance for MemoryEditor {
    fn state(&self) -> EditorState {
        EditorState {
            doc: Document::new(&self.text),
            revision: self.revision,
        }
    }

    fn destroy(&mut self) {
        if self.alive {
            self.alive = false;
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }
}

/// Records every document it is asked to render.
#[derive(Clone, Default)]
pub struct RecordingPreview {
    renders: Rc<RefCell<Vec<String>>>,
}

impl RecordingPreview {
    pub fn renders(&self) -> Vec<String> {
        self.renders.borrow().clone()
    }
}

impl PreviewSink for RecordingPreview {
    fn render(&mut self, doc: &Document) {
        self.renders.borrow_mut().push(doc.to_string());
    }
}
