use super::settings::FontChoice;

/// All messages that can be sent through the FLTK channel.
/// Each menu callback sends one of these; the dispatch loop in main handles them.
#[derive(Debug, Clone)]
pub enum Message {
    // File
    FileNew,
    FileOpen,
    FileSave,
    FileSaveAs,
    FileQuit,
    WindowClose,

    // View
    TogglePreview,
    ToggleDarkMode,

    // Format
    SetFont(FontChoice),
    SetFontSize(u32),
    SetTabSize(u32),

    // Help
    ShowAbout,
}
