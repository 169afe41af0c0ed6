use std::path::{Path, PathBuf};

use fltk::dialog;

/// FLTK filter line for the open and save dialogs.
pub const MARKDOWN_FILTER: &str = "Markdown Files\t*.{md,markdown,mdown,mkd}\nText Files\t*.txt";

fn start_dir(current: Option<&Path>) -> String {
    current
        .and_then(Path::parent)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string())
}

pub fn open_markdown_dialog(current: Option<&Path>) -> Option<PathBuf> {
    dialog::file_chooser("Open File", MARKDOWN_FILTER, &start_dir(current), false).map(PathBuf::from)
}

/// Ask for a save location, adding `.md` when the name has no extension.
pub fn save_markdown_dialog(current: Option<&Path>) -> Option<PathBuf> {
    let chosen = dialog::file_chooser("Save As", MARKDOWN_FILTER, &start_dir(current), false)?;
    Some(with_default_extension(PathBuf::from(chosen)))
}

pub fn with_default_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("md")
    }
}
