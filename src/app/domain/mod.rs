//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Document snapshots and editor state
//! - Theme, style table and keymap
//! - Application settings
//! - Message types for the event system

pub mod document;
pub mod keymap;
pub mod messages;
pub mod settings;
pub mod theme;

pub use document::{Document, EditorState};
pub use keymap::{Command, Key, KeyChord, Keymap};
pub use messages::Message;
pub use settings::{AppSettings, FontChoice, ThemeMode};
pub use theme::{EditorChrome, Rgb, StyleRecord, StyleTable, Theme, TokenCategory};
