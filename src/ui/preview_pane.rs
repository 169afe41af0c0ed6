//! Rendered markdown beside the editor, drawn by FLTK's `HelpView`.

use fltk::{group::Flex, misc::HelpView, prelude::*};

use crate::app::controllers::shell::PreviewSink;
use crate::app::domain::document::Document;
use crate::app::services::preview::{render_markdown, wrap_html_for_helpview};

pub struct HtmlPreview {
    view: HelpView,
    panes: Flex,
    font_size: u32,
    enabled: bool,
    latest: Document,
    /// `latest` has not been rendered yet because the pane was hidden.
    stale: bool,
}

impl HtmlPreview {
    pub fn new(view: HelpView, panes: Flex, font_size: u32, enabled: bool) -> Self {
        let mut preview = Self {
            view,
            panes,
            font_size,
            enabled,
            latest: Document::default(),
            stale: false,
        };
        preview.apply_visibility();
        preview
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.apply_visibility();
        if enabled && self.stale {
            self.draw_latest();
        }
    }

    pub fn set_font_size(&mut self, font_size: u32) {
        self.font_size = font_size;
        self.view.set_text_size(font_size as i32);
        if self.enabled {
            self.draw_latest();
        } else {
            self.stale = true;
        }
    }

    fn apply_visibility(&mut self) {
        if self.enabled {
            self.view.show();
        } else {
            self.view.hide();
        }
        self.panes.layout();
        self.panes.redraw();
    }

    fn draw_latest(&mut self) {
        let html = wrap_html_for_helpview(&render_markdown(&self.latest), self.font_size);
        // Keep the reader's place while the document is being edited
        let top = self.view.top_line();
        self.view.set_value(&html);
        self.view.set_top_line(top);
        self.view.redraw();
        self.stale = false;
    }
}

impl PreviewSink for HtmlPreview {
    fn render(&mut self, doc: &Document) {
        self.latest = doc.clone();
        if self.enabled {
            self.draw_latest();
        } else {
            self.stale = true;
        }
    }
}
