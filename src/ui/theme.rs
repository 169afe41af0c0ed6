use fltk::{
    enums::{Color, Font},
    group::Flex,
    menu::MenuBar,
    misc::HelpView,
    prelude::*,
    text::{StyleTableEntryExt, TextAttr, TextEditor},
    window::Window,
};

use crate::app::domain::settings::FontChoice;
use crate::app::domain::theme::{
    EditorChrome, FontStyle, FontWeight, Rgb, StyleRecord, StyleTable, TextDecoration,
};

pub fn to_color(rgb: Rgb) -> Color {
    Color::from_rgb(rgb.r, rgb.g, rgb.b)
}

/// Pick the FLTK face for a font family with the given weight and slant.
/// Screen has no italic face, so italics fall back to upright.
pub fn font_for(font: FontChoice, weight: FontWeight, style: FontStyle) -> Font {
    use FontStyle::Italic;
    use FontWeight::Bold;
    match (font, weight, style) {
        (FontChoice::Courier, Bold, Italic) => Font::CourierBoldItalic,
        (FontChoice::Courier, Bold, _) => Font::CourierBold,
        (FontChoice::Courier, _, Italic) => Font::CourierItalic,
        (FontChoice::Courier, _, _) => Font::Courier,
        (FontChoice::Helvetica, Bold, Italic) => Font::HelveticaBoldItalic,
        (FontChoice::Helvetica, Bold, _) => Font::HelveticaBold,
        (FontChoice::Helvetica, _, Italic) => Font::HelveticaItalic,
        (FontChoice::Helvetica, _, _) => Font::Helvetica,
        (FontChoice::Screen, Bold, _) => Font::ScreenBold,
        (FontChoice::Screen, _, _) => Font::Screen,
    }
}

/// Point size for a style, never below 6.
pub fn scaled_size(base: i32, scale: f32) -> i32 {
    ((base as f32) * scale).round().max(6.0) as i32
}

fn text_attr(record: &StyleRecord) -> TextAttr {
    match record.decoration {
        TextDecoration::Underline => TextAttr::Underline,
        TextDecoration::LineThrough => TextAttr::StrikeThrough,
        TextDecoration::None if record.background.is_some() && record.fill_line => TextAttr::BgColorExt,
        TextDecoration::None if record.background.is_some() => TextAttr::BgColor,
        TextDecoration::None => TextAttr::None,
    }
}

/// Convert a style table into FLTK style entries, indexed the same way as
/// the style characters the highlighter emits.
pub fn style_entries(
    table: &StyleTable,
    chrome: &EditorChrome,
    font: FontChoice,
    font_size: i32,
) -> Vec<StyleTableEntryExt> {
    table
        .records()
        .iter()
        .map(|record| StyleTableEntryExt {
            color: to_color(record.color.unwrap_or(chrome.foreground)),
            font: font_for(font, record.weight, record.style),
            size: scaled_size(font_size, record.font_scale),
            attr: text_attr(record),
            bgcolor: to_color(record.background.unwrap_or(chrome.background)),
        })
        .collect()
}

pub fn apply_editor_chrome(editor: &mut TextEditor, chrome: &EditorChrome) {
    editor.set_color(to_color(chrome.background));
    editor.set_text_color(to_color(chrome.foreground));
    editor.set_cursor_color(to_color(chrome.caret));
    editor.set_selection_color(to_color(chrome.selection));
    editor.set_linenumber_bgcolor(to_color(chrome.gutter_background));
    editor.set_linenumber_fgcolor(to_color(chrome.gutter_foreground));
    editor.redraw();
}

/// Color the window frame, menu bar and preview to match the editor.
pub fn apply_window_chrome(
    window: &mut Window,
    menu: &mut MenuBar,
    panes: &mut Flex,
    preview: &mut HelpView,
    chrome: &EditorChrome,
) {
    let (frame, text, hover) = if chrome.is_dark {
        (
            Color::from_rgb(25, 25, 25),
            Color::from_rgb(220, 220, 220),
            Color::from_rgb(60, 60, 60),
        )
    } else {
        (
            Color::from_rgb(240, 240, 240),
            Color::Black,
            Color::from_rgb(200, 200, 200),
        )
    };
    window.set_color(frame);
    window.set_label_color(text);
    menu.set_color(frame);
    menu.set_text_color(text);
    menu.set_selection_color(hover); // Hover color
    panes.set_color(frame);
    preview.set_color(to_color(chrome.background));
    preview.set_text_color(to_color(chrome.foreground));

    window.redraw();
    menu.redraw();
    preview.redraw();
}

/// Set Windows title bar theme (Windows 10 build 1809+)
/// Must be called AFTER window.show() to have a valid HWND
#[cfg(target_os = "windows")]
pub fn set_windows_titlebar_theme(window: &Window, is_dark: bool) {
    use std::mem::size_of;
    use std::ptr::from_ref;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::Graphics::Dwm::{DWMWINDOWATTRIBUTE, DwmSetWindowAttribute};

    let on: i32 = i32::from(is_dark);
    // SAFETY: the window is shown, so raw_handle is a live HWND, and `on`
    // outlives both calls.
    unsafe {
        let hwnd = HWND(window.raw_handle() as *mut std::ffi::c_void);
        // 20 is DWMWA_USE_IMMERSIVE_DARK_MODE; 19 is the pre-2004 value
        for attribute in [20, 19] {
            let _ = DwmSetWindowAttribute(
                hwnd,
                DWMWINDOWATTRIBUTE(attribute),
                from_ref(&on).cast(),
                size_of::<i32>() as u32,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::theme::{Theme, TokenCategory};

    #[test]
    fn test_font_faces() {
        assert_eq!(
            font_for(FontChoice::Courier, FontWeight::Bold, FontStyle::Italic),
            Font::CourierBoldItalic
        );
        assert_eq!(
            font_for(FontChoice::Helvetica, FontWeight::Normal, FontStyle::Italic),
            Font::HelveticaItalic
        );
        assert_eq!(
            font_for(FontChoice::Screen, FontWeight::Normal, FontStyle::Italic),
            Font::Screen
        );
    }

    #[test]
    fn test_style_entries_follow_table() {
        let theme = Theme::light();
        let entries = style_entries(&theme.styles, &theme.chrome, FontChoice::Courier, 16);
        assert_eq!(entries.len(), TokenCategory::ALL.len());

        let h1 = &entries[TokenCategory::Heading1.index()];
        assert!(h1.size > 16);
        assert_eq!(h1.font, Font::CourierBold);

        let strike = &entries[TokenCategory::Strikethrough.index()];
        assert_eq!(strike.attr, TextAttr::StrikeThrough);

        let bracket = &entries[TokenCategory::MatchingBracket.index()];
        assert_eq!(bracket.attr, TextAttr::BgColor);

        let active = &entries[TokenCategory::ActiveLine.index()];
        assert_eq!(active.attr, TextAttr::BgColorExt);
        assert_eq!(active.bgcolor, to_color(theme.chrome.active_line));
        assert_eq!(active.color, to_color(theme.chrome.foreground));
    }

    #[test]
    fn test_scaled_size_floor() {
        assert_eq!(scaled_size(16, 1.5), 24);
        assert_eq!(scaled_size(4, 0.8), 6);
    }
}
