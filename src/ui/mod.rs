pub mod editor_host;
pub mod file_dialogs;
pub mod main_window;
pub mod menu;
pub mod preview_pane;
pub mod theme;
