use fltk::{
    app::Sender,
    enums::Shortcut,
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::domain::messages::Message;
use crate::app::domain::settings::{AppSettings, FontChoice};

fn toggle(on: bool) -> MenuFlag {
    if on { MenuFlag::Toggle | MenuFlag::Value } else { MenuFlag::Toggle }
}

fn radio(on: bool) -> MenuFlag {
    if on { MenuFlag::Radio | MenuFlag::Value } else { MenuFlag::Radio }
}

pub fn build_menu(menu: &mut MenuBar, sender: &Sender<Message>, settings: &AppSettings, initial_dark_mode: bool) {
    let s = sender;

    // File
    menu.add("File/New", Shortcut::Ctrl | 'n', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileNew) });
    menu.add("File/Open...", Shortcut::Ctrl | 'o', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileOpen) });
    menu.add("File/Save", Shortcut::Ctrl | 's', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileSave) });
    menu.add("File/Save As...", Shortcut::Ctrl | Shortcut::Shift | 's', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::FileSaveAs) });
    menu.add("File/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileQuit) });

    // View
    menu.add("View/Toggle Preview", Shortcut::Ctrl | 'm', toggle(settings.preview_enabled), { let s = *s; move |_| s.send(Message::TogglePreview) });
    menu.add("View/Toggle Dark Mode", Shortcut::None, toggle(initial_dark_mode), { let s = *s; move |_| s.send(Message::ToggleDarkMode) });

    // Format
    let fonts = [
        ("Format/Font/Courier", FontChoice::Courier),
        ("Format/Font/Helvetica", FontChoice::Helvetica),
        ("Format/Font/Screen", FontChoice::Screen),
    ];
    for (label, font) in fonts {
        menu.add(label, Shortcut::None, radio(settings.font == font), { let s = *s; move |_| s.send(Message::SetFont(font)) });
    }
    for (label, size) in [("Small (12)", 12), ("Medium (16)", 16), ("Large (20)", 20)] {
        menu.add(&format!("Format/Font Size/{}", label), Shortcut::None, radio(settings.font_size == size), { let s = *s; move |_| s.send(Message::SetFontSize(size)) });
    }
    for size in [2u32, 4, 8] {
        menu.add(&format!("Format/Indent Width/{} Spaces", size), Shortcut::None, radio(settings.tab_size == size), { let s = *s; move |_| s.send(Message::SetTabSize(size)) });
    }

    // Help
    menu.add("Help/About Markpane", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ShowAbout) });
}
