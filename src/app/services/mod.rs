//! Services layer - business operations and utilities.
//!
//! This module contains the editor's non-UI logic:
//! - Markdown language mode and embedded code languages
//! - Text operations (indentation, list continuation, bracket matching)
//! - Preview rendering

pub mod markdown;
pub mod preview;
pub mod text_ops;
