//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Document, Theme, Keymap, Settings, Messages)
//! - `controllers/` - Orchestration (config builder, editor binding, shell)
//! - `services/` - Business operations (markdown mode, text_ops, preview)
//! - `infrastructure/` - External integrations (FLTK buffer, platform, error)

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-exports for convenient external access
pub use controllers::binding::{BindingPhase, EditorBackend, EditorBinding, EditorInstance};
pub use controllers::config::{ChangeCallback, EditorConfig, Extension, ExtensionKind};
pub use controllers::shell::{AppShell, PreviewSink};
pub use domain::{AppSettings, Document, EditorState, FontChoice, Message, Theme, ThemeMode};
pub use infrastructure::error::{AppError, Result};
pub use infrastructure::platform::detect_system_dark_mode;
pub use services::markdown::{LanguageRegistry, MarkdownHighlighter};
