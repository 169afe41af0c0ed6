//! FLTK implementation of the editor seam.
//!
//! [`FltkBackend::create`] builds a `TextEditor` inside the container flex,
//! applies each configured extension, and hooks a buffer modify callback
//! that restyles the document and forwards a change notification.
//! [`FltkEditor::destroy`] undoes all of it.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::ops::Range;
use std::rc::Rc;

use fltk::{
    app,
    enums::{Event, Key as FlKey},
    group::Flex,
    prelude::*,
    text::{TextBuffer, TextEditor, WrapMode},
};

use crate::app::controllers::binding::{ContainerKey, EditorBackend, EditorInstance};
use crate::app::controllers::config::{EditorConfig, Extension};
use crate::app::domain::document::{Document, EditorState};
use crate::app::domain::keymap::{Command, Key, KeyChord};
use crate::app::domain::settings::FontChoice;
use crate::app::domain::theme::TokenCategory;
use crate::app::infrastructure::buffer::{read_buffer_text, replace_style_range};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::markdown::MarkdownHighlighter;
use crate::app::services::text_ops::{
    self, NewlineAction, active_line_runs, continue_markup, find_matching_bracket,
    markup_marker_before, newline_indent, reindent_closing,
};

use super::theme::{apply_editor_chrome, font_for, style_entries};

/// The closure type stored behind the FFI `void* cbArg`.
type ModifyCb = dyn FnMut(i32, i32, i32, i32, *const std::ffi::c_char);

/// Single fixed C callback for every editor buffer. Because the function
/// pointer never changes, `Fl_Text_Buffer_remove_modify_callback` can find
/// the registration again on teardown (fltk-rs's own wrapper builds a fresh
/// shim per call and so can never be removed).
///
/// # Safety
///
/// `cb_arg` must be the pointer returned by `register_modify_callback` and
/// not yet released by `FltkEditor::destroy`.
unsafe extern "C" fn modify_shim(
    pos: std::ffi::c_int,
    n_inserted: std::ffi::c_int,
    n_deleted: std::ffi::c_int,
    n_restyled: std::ffi::c_int,
    deleted_text: *const std::ffi::c_char,
    cb_arg: *mut c_void,
) {
    if cb_arg.is_null() {
        log::warn!("modify_shim called with null callback argument");
        return;
    }
    // SAFETY: cb_arg came from Box::into_raw in register_modify_callback and
    // stays valid until destroy() unregisters the callback and frees it.
    unsafe {
        let cb: &mut Box<ModifyCb> = &mut *(cb_arg as *mut Box<ModifyCb>);
        cb(pos, n_inserted, n_deleted, n_restyled, deleted_text);
    }
}

type ModifyShim = unsafe extern "C" fn(
    std::ffi::c_int,
    std::ffi::c_int,
    std::ffi::c_int,
    std::ffi::c_int,
    *const std::ffi::c_char,
    *mut c_void,
);

unsafe extern "C" {
    fn Fl_Text_Buffer_add_modify_callback(buf: *mut c_void, cb: Option<ModifyShim>, cb_arg: *mut c_void);
    fn Fl_Text_Buffer_remove_modify_callback(buf: *mut c_void, cb: Option<ModifyShim>, cb_arg: *mut c_void);
}

fn register_modify_callback(buffer: &TextBuffer, cb: Box<ModifyCb>) -> *mut c_void {
    let data = Box::into_raw(Box::new(cb)) as *mut c_void;
    // SAFETY: `data` is a leaked Box<Box<ModifyCb>> that modify_shim knows how
    // to read. It is reclaimed in FltkEditor::destroy after the callback is
    // removed from the buffer.
    unsafe {
        Fl_Text_Buffer_add_modify_callback(buffer.as_ptr() as *mut c_void, Some(modify_shim), data);
    }
    data
}

/// Width of the line number gutter for `line_count` lines.
pub fn line_number_width(line_count: usize) -> i32 {
    let digits = ((line_count + 1) as f64).log10().floor() as i32 + 1;
    (digits * 8 + 16).max(40)
}

/// Which optional behaviours the config switched on.
#[derive(Debug, Default, Clone, Copy)]
struct Behaviours {
    line_numbers: bool,
    history: bool,
    indent_on_input: bool,
    bracket_matching: bool,
    active_line: bool,
    markdown_keys: bool,
}

/// State reachable from the modify callback and the key handler.
struct Shared {
    config: EditorConfig,
    buffer: TextBuffer,
    style_buffer: TextBuffer,
    editor: TextEditor,
    highlighter: Option<MarkdownHighlighter>,
    behaviours: Behaviours,
    revision: Cell<u64>,
    /// Style runs overwritten by the cursor overlays (active line, bracket
    /// pair), in painting order, to restore later.
    overlay: RefCell<Vec<(usize, String)>>,
}

impl Shared {
    fn on_modified(&self, inserted: i32, deleted: i32) {
        if inserted <= 0 && deleted <= 0 {
            return;
        }
        let text = read_buffer_text(&self.buffer);
        self.overlay.borrow_mut().clear();
        if let Some(highlighter) = &self.highlighter {
            let mut style_buffer = self.style_buffer.clone();
            style_buffer.set_text(&highlighter.style_string(&text));
        }
        if self.behaviours.line_numbers {
            let lines = text.bytes().filter(|&b| b == b'\n').count() + 1;
            let mut editor = self.editor.clone();
            editor.set_linenumber_width(line_number_width(lines));
        }

        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        self.config.notify(&EditorState { doc: Document::from(text), revision });
    }

    fn tab_size(&self) -> usize {
        self.config.tab_size()
    }

    fn cursor(&self) -> usize {
        self.editor.insert_position().max(0) as usize
    }

    fn move_cursor(&self, pos: usize) {
        let mut editor = self.editor.clone();
        editor.set_insert_position(pos as i32);
        editor.show_insert_position();
    }

    fn insert_at_cursor(&self, s: &str) {
        let mut buffer = self.buffer.clone();
        if buffer.selected() {
            buffer.remove_selection();
        }
        let pos = self.cursor();
        buffer.insert(pos as i32, s);
        self.move_cursor(pos + s.len());
    }

    fn handle_key(&self) -> bool {
        let Some(chord) = current_chord() else {
            return false;
        };
        if let Some(command) = self.config.keymap().and_then(|k| k.lookup(chord)) {
            return self.run(command);
        }
        if self.behaviours.indent_on_input && !chord.ctrl && !chord.alt {
            if let Key::Char(ch @ ('}' | ']' | ')')) = chord.key {
                return self.reindent_and_insert(ch);
            }
        }
        false
    }

    /// Returns true when the command consumed the key.
    fn run(&self, command: Command) -> bool {
        let mut editor = self.editor.clone();
        match command {
            Command::Undo | Command::Redo if !self.behaviours.history => true,
            Command::Undo => {
                let _ = editor.undo();
                true
            }
            Command::Redo => {
                let _ = editor.redo();
                true
            }
            Command::Cut => {
                let _ = editor.cut();
                true
            }
            Command::Copy => {
                let _ = editor.copy();
                true
            }
            Command::Paste => {
                let _ = editor.paste();
                true
            }
            Command::SelectAll => {
                let _ = editor.kf_select_all();
                true
            }
            Command::IndentMore => {
                self.shift_line(true);
                true
            }
            Command::IndentLess => {
                self.shift_line(false);
                true
            }
            Command::InsertNewlineAndIndent => {
                self.newline_and_indent();
                true
            }
            Command::InsertNewlineContinueMarkup if !self.behaviours.markdown_keys => {
                self.newline_and_indent();
                true
            }
            Command::InsertNewlineContinueMarkup => {
                self.newline_continue_markup();
                true
            }
            Command::DeleteMarkupBackward => {
                self.behaviours.markdown_keys && self.delete_markup_backward()
            }
        }
    }

    fn newline_and_indent(&self) {
        let indent = if self.behaviours.indent_on_input {
            let text = read_buffer_text(&self.buffer);
            newline_indent(&text, self.cursor(), self.tab_size())
        } else {
            String::new()
        };
        self.insert_at_cursor(&format!("\n{}", indent));
    }

    fn newline_continue_markup(&self) {
        let text = read_buffer_text(&self.buffer);
        match continue_markup(&text, self.cursor()) {
            NewlineAction::Continue(prefix) => self.insert_at_cursor(&format!("\n{}", prefix)),
            NewlineAction::ClearMarker { start, end } => {
                let mut buffer = self.buffer.clone();
                buffer.remove(start as i32, end as i32);
                self.move_cursor(start);
            }
            NewlineAction::Plain => self.newline_and_indent(),
        }
    }

    fn delete_markup_backward(&self) -> bool {
        if self.buffer.selected() {
            return false;
        }
        let text = read_buffer_text(&self.buffer);
        match markup_marker_before(&text, self.cursor()) {
            Some((start, end)) => {
                let mut buffer = self.buffer.clone();
                buffer.remove(start as i32, end as i32);
                self.move_cursor(start);
                true
            }
            None => false,
        }
    }

    fn reindent_and_insert(&self, closing: char) -> bool {
        let text = read_buffer_text(&self.buffer);
        let Some((start, end, indent)) = reindent_closing(&text, self.cursor(), closing, self.tab_size())
        else {
            return false;
        };
        let mut buffer = self.buffer.clone();
        buffer.replace(start as i32, end as i32, &format!("{}{}", indent, closing));
        self.move_cursor(start + indent.len() + closing.len_utf8());
        true
    }

    fn shift_line(&self, more: bool) {
        let text = read_buffer_text(&self.buffer);
        let cursor = self.cursor();
        let (start, end) = text_ops::line_bounds(&text, cursor);
        let line = &text[start..end];
        let mut buffer = self.buffer.clone();
        if more {
            let unit = text_ops::indent_unit(self.tab_size());
            buffer.insert(start as i32, &unit);
            self.move_cursor(cursor + unit.len());
        } else {
            let indent = text_ops::leading_indent(line);
            let remove = if indent.starts_with('\t') {
                1
            } else {
                indent.len().min(self.tab_size())
            };
            if remove > 0 {
                buffer.remove(start as i32, (start + remove) as i32);
                self.move_cursor(cursor.saturating_sub(remove).max(start));
            }
        }
    }

    /// Restore the styles under the previous overlays, then paint the
    /// cursor line and the bracket pair next to the cursor.
    fn refresh_overlays(&self) {
        let wanted = self.behaviours.bracket_matching || self.behaviours.active_line;
        if !wanted || self.highlighter.is_none() {
            return;
        }
        let mut style_buffer = self.style_buffer.clone();
        let mut overlay = self.overlay.borrow_mut();
        while let Some((pos, original)) = overlay.pop() {
            replace_style_range(&mut style_buffer, pos, &original);
        }

        let mut paint = |range: Range<usize>, category: TokenCategory| {
            let original = style_buffer
                .text_range(range.start as i32, range.end as i32)
                .unwrap_or_default();
            if original.len() != range.len() {
                return;
            }
            let mark = category.style_char().to_string().repeat(range.len());
            replace_style_range(&mut style_buffer, range.start, &mark);
            overlay.push((range.start, original));
        };

        let text = read_buffer_text(&self.buffer);
        let cursor = self.cursor();
        if self.behaviours.active_line {
            let styles = read_buffer_text(&self.style_buffer);
            for run in active_line_runs(&text, &styles, cursor) {
                paint(run, TokenCategory::ActiveLine);
            }
        }
        if self.behaviours.bracket_matching {
            if let Some(found) = find_matching_bracket(&text, cursor) {
                let category = if found.is_matched() {
                    TokenCategory::MatchingBracket
                } else {
                    TokenCategory::NonMatchingBracket
                };
                for pos in std::iter::once(found.at).chain(found.partner) {
                    paint(pos..pos + 1, category);
                }
            }
        }
        drop(overlay);
        let mut editor = self.editor.clone();
        editor.redraw();
    }
}

fn current_chord() -> Option<KeyChord> {
    let fl_key = app::event_key();
    let ctrl = app::is_event_ctrl() || app::is_event_command();
    let key = if fl_key == FlKey::Enter || fl_key == FlKey::KPEnter {
        Key::Enter
    } else if fl_key == FlKey::Tab {
        Key::Tab
    } else if fl_key == FlKey::BackSpace {
        Key::Backspace
    } else if ctrl {
        Key::Char(fl_key.to_char()?)
    } else {
        let ch = app::event_text().chars().next().or_else(|| fl_key.to_char())?;
        Key::Char(ch)
    };
    Some(KeyChord {
        key,
        ctrl,
        shift: app::is_event_shift(),
        alt: app::is_event_alt(),
    })
}

/// Builds [`FltkEditor`]s inside an editor pane `Flex`.
pub struct FltkBackend {
    font: FontChoice,
    font_size: i32,
}

impl FltkBackend {
    pub fn new(font: FontChoice, font_size: u32) -> Self {
        Self { font, font_size: font_size as i32 }
    }

    /// Takes effect for editors created afterwards.
    pub fn set_font(&mut self, font: FontChoice, font_size: u32) {
        self.font = font;
        self.font_size = font_size as i32;
    }
}

impl EditorBackend for FltkBackend {
    type Container = Flex;
    type Instance = FltkEditor;

    fn container_key(&self, container: &Flex) -> ContainerKey {
        container.as_widget_ptr() as ContainerKey
    }

    fn create(&mut self, container: &Flex, config: EditorConfig) -> Result<FltkEditor> {
        if container.was_deleted() {
            return Err(AppError::Container("editor pane was deleted".to_string()));
        }
        let mut pane = container.clone();

        let mut buffer = TextBuffer::default();
        let mut style_buffer = TextBuffer::default();
        buffer.set_text(config.initial_doc());

        pane.begin();
        let mut editor = TextEditor::default();
        pane.end();

        editor.set_buffer(buffer.clone());
        editor.set_text_font(font_for(self.font, Default::default(), Default::default()));
        editor.set_text_size(self.font_size);
        editor.set_linenumber_size((self.font_size - 2).max(8));

        let mut behaviours = Behaviours::default();
        let mut highlighter = None;

        for extension in config.extensions() {
            match extension {
                Extension::Keymap(_) | Extension::UpdateListener(_) => {}
                Extension::LineNumbers => behaviours.line_numbers = true,
                Extension::History => behaviours.history = true,
                Extension::IndentOnInput => behaviours.indent_on_input = true,
                Extension::BracketMatching => behaviours.bracket_matching = true,
                Extension::HighlightActiveLine => behaviours.active_line = true,
                Extension::Markdown(mode) => {
                    highlighter = Some(MarkdownHighlighter::new(mode.languages.clone()));
                    behaviours.markdown_keys = mode.add_keymap;
                }
                Extension::Theme(_) | Extension::HighlightStyle(_) => {}
                Extension::LineWrapping => editor.wrap_mode(WrapMode::AtBounds, 0),
            }
        }

        let chrome = config.theme_chrome().copied();
        if let Some(c) = &chrome {
            apply_editor_chrome(&mut editor, c);
        }
        let styles = config.style_table().cloned();

        buffer.can_undo(behaviours.history);
        if behaviours.line_numbers {
            let lines = config.initial_doc().bytes().filter(|&b| b == b'\n').count() + 1;
            editor.set_linenumber_width(line_number_width(lines));
        } else {
            editor.set_linenumber_width(0);
        }

        if let (Some(hl), Some(table), Some(chrome)) = (&highlighter, &styles, &chrome) {
            style_buffer.set_text(&hl.style_string(config.initial_doc()));
            editor.set_highlight_data_ext(
                style_buffer.clone(),
                style_entries(table, chrome, self.font, self.font_size),
            );
        } else {
            log::debug!("Highlighting disabled: markdown mode or style table missing");
        }

        let shared = Rc::new(Shared {
            config,
            buffer: buffer.clone(),
            style_buffer,
            editor: editor.clone(),
            highlighter,
            behaviours,
            revision: Cell::new(0),
            overlay: RefCell::new(Vec::new()),
        });

        let on_modify = shared.clone();
        let modify_cb_data = register_modify_callback(
            &buffer,
            Box::new(move |_pos, inserted, deleted, _restyled, _deleted_text| {
                on_modify.on_modified(inserted, deleted);
            }),
        );

        let on_event = shared.clone();
        editor.handle(move |_, event| match event {
            Event::KeyDown => on_event.handle_key(),
            Event::KeyUp | Event::Released => {
                on_event.refresh_overlays();
                false
            }
            _ => false,
        });

        pane.layout();
        pane.redraw();
        editor.set_insert_position(0);
        let _ = editor.take_focus();

        Ok(FltkEditor {
            shared,
            pane,
            modify_cb_data,
        })
    }
}

pub struct FltkEditor {
    shared: Rc<Shared>,
    pane: Flex,
    /// Pointer to the heap-allocated closure passed to FLTK's modify callback.
    /// Freed in destroy() after removing the callback.
    modify_cb_data: *mut c_void,
}

impl EditorInstance for FltkEditor {
    fn state(&self) -> EditorState {
        EditorState {
            doc: Document::from(read_buffer_text(&self.shared.buffer)),
            revision: self.shared.revision.get(),
        }
    }

    fn destroy(&mut self) {
        if self.modify_cb_data.is_null() {
            return;
        }

        // SAFETY: Remove the callback first so FLTK stops handing out the
        // pointer, then free the closure. Same shim and argument as at
        // registration, so FLTK finds the entry by pointer equality.
        unsafe {
            Fl_Text_Buffer_remove_modify_callback(
                self.shared.buffer.as_ptr() as *mut c_void,
                Some(modify_shim),
                self.modify_cb_data,
            );
            let _ = Box::from_raw(self.modify_cb_data as *mut Box<ModifyCb>);
        }
        self.modify_cb_data = std::ptr::null_mut();

        let mut editor = self.shared.editor.clone();
        editor.handle(|_, _| false);
        if !self.pane.was_deleted() {
            self.pane.remove(&editor);
            self.pane.layout();
            self.pane.redraw();
        }
        app::delete_widget(editor);

        self.shared.buffer.clone().set_text("");
        self.shared.style_buffer.clone().set_text("");
        log::debug!("Editor widget released after {} revisions", self.shared.revision.get());
    }
}

impl Drop for FltkEditor {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_number_width_grows_with_digits() {
        assert_eq!(line_number_width(1), 40);
        assert_eq!(line_number_width(99), 40);
        assert!(line_number_width(99_999) > line_number_width(999));
    }
}
