//! Markpane: a markdown editor with a live rendered preview.

pub mod app;
pub mod ui;
