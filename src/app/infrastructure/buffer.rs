//! Helpers for moving text in and out of FLTK text buffers.

use fltk::text::TextBuffer;

/// Copy the full contents of `buf` into a Rust `String`.
///
/// `TextBuffer::text()` copies FLTK's `malloc`'d string but never frees it,
/// which leaks a buffer-sized allocation per call. The editor reads the
/// buffer on every keystroke, so this goes through the C API and frees the
/// copy itself. The copy ends at the first NUL, so documents are loaded
/// through `Document::from_disk`, which removes embedded NULs.
pub fn read_buffer_text(buf: &TextBuffer) -> String {
    unsafe extern "C" {
        fn Fl_Text_Buffer_text(buf: *mut std::ffi::c_void) -> *mut std::ffi::c_char;
        fn free(ptr: *mut std::ffi::c_void);
    }

    // SAFETY: `buf.as_ptr()` is the live Fl_Text_Buffer owned by `buf`.
    // Fl_Text_Buffer_text returns a malloc'd NUL-terminated copy (or null),
    // which we read once and release with the matching `free`.
    unsafe {
        let ptr = Fl_Text_Buffer_text(buf.as_ptr() as *mut std::ffi::c_void);
        if ptr.is_null() {
            return String::new();
        }
        let text = std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned();
        free(ptr as *mut std::ffi::c_void);
        text
    }
}

/// Replace a byte range of a style buffer with `style`, keeping lengths in
/// sync with the text buffer. `style` must be single-byte characters.
pub fn replace_style_range(style_buf: &mut TextBuffer, start: usize, style: &str) {
    let end = start + style.len();
    style_buf.replace(start as i32, end as i32, style);
}
