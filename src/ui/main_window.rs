use fltk::{
    group::{Flex, FlexType},
    menu::MenuBar,
    misc::HelpView,
    prelude::*,
    window::Window,
};

use crate::app::domain::settings::AppSettings;

pub const APP_NAME: &str = "Markpane";

pub struct MainWidgets {
    pub wind: Window,
    pub flex: Flex,
    pub menu: MenuBar,
    /// Row holding the editor pane and the preview side by side.
    pub panes: Flex,
    /// Container the editor instance is mounted into.
    pub editor_pane: Flex,
    pub preview_view: HelpView,
}

pub fn build_main_window(settings: &AppSettings) -> MainWidgets {
    let (w, h) = (settings.window_width, settings.window_height);
    let mut wind = Window::new(100, 100, w, h, None);
    wind.set_label(&window_title("Untitled", false));
    wind.set_xclass(APP_NAME);

    let mut flex = Flex::new(0, 0, w, h, None);
    flex.set_type(FlexType::Column);

    let menu = MenuBar::new(0, 0, 0, 30, "");
    flex.fixed(&menu, 30);

    let mut panes = Flex::default();
    panes.set_type(FlexType::Row);
    panes.set_pad(4);

    let mut editor_pane = Flex::default();
    editor_pane.set_type(FlexType::Column);
    editor_pane.end();

    let mut preview_view = HelpView::default();
    preview_view.set_text_size(settings.font_size as i32);

    panes.end();
    flex.end();
    wind.resizable(&flex);
    wind.end();

    MainWidgets {
        wind,
        flex,
        menu,
        panes,
        editor_pane,
        preview_view,
    }
}

pub fn window_title(name: &str, dirty: bool) -> String {
    let marker = if dirty { "*" } else { "" };
    format!("{}{} - {}", marker, name, APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_title_marks_unsaved() {
        assert_eq!(window_title("notes.md", false), "notes.md - Markpane");
        assert_eq!(window_title("notes.md", true), "*notes.md - Markpane");
    }
}
