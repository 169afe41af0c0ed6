use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use fltk::{app, dialog, enums::Event, prelude::*};

use markpane::app::services::preview::is_markdown_file;
use markpane::app::services::text_ops::extract_filename;
use markpane::app::{
    AppSettings, AppShell, Document, LanguageRegistry, Message, Result, Theme, ThemeMode,
    detect_system_dark_mode,
};
use markpane::ui::editor_host::FltkBackend;
use markpane::ui::file_dialogs::{open_markdown_dialog, save_markdown_dialog};
use markpane::ui::main_window::{MainWidgets, build_main_window, window_title};
use markpane::ui::menu::build_menu;
use markpane::ui::preview_pane::HtmlPreview;
use markpane::ui::theme::apply_window_chrome;

#[cfg(not(target_os = "windows"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

type Shell = AppShell<FltkBackend, HtmlPreview>;

struct Markpane {
    widgets: MainWidgets,
    shell: Shell,
    settings: AppSettings,
    is_dark: bool,
    path: Option<PathBuf>,
    /// Last text written to or read from disk.
    saved: Document,
    /// Document the title was last computed for.
    seen: Document,
}

impl Markpane {
    fn mount(&mut self) -> Result<()> {
        self.shell.mount(&self.widgets.editor_pane)
    }

    fn theme(&self) -> Rc<Theme> {
        let mode = if self.is_dark { ThemeMode::Dark } else { ThemeMode::Light };
        Rc::new(Theme::for_mode(mode, self.is_dark))
    }

    fn is_dirty(&self) -> bool {
        self.shell.document() != self.saved
    }

    fn refresh_title(&mut self) {
        let doc = self.shell.document();
        if doc.same_snapshot(&self.seen) {
            return;
        }
        self.seen = doc;
        self.update_title();
    }

    fn update_title(&mut self) {
        let name = match &self.path {
            Some(p) => extract_filename(p),
            None => "Untitled".to_string(),
        };
        let title = window_title(&name, self.is_dirty());
        self.widgets.wind.set_label(&title);
    }

    fn replace_document(&mut self, doc: Document, path: Option<PathBuf>) -> Result<()> {
        self.shell.open_document(&self.widgets.editor_pane, doc.clone())?;
        self.saved = doc;
        self.path = path;
        self.update_title();
        Ok(())
    }

    /// Ask what to do with unsaved changes. Returns false if the user cancelled.
    fn confirm_discard(&mut self) -> bool {
        if !self.is_dirty() {
            return true;
        }
        match dialog::choice2_default("Save changes to the current document?", "Save", "Discard", "Cancel") {
            Some(0) => self.save(false),
            Some(1) => true,
            _ => false,
        }
    }

    fn open(&mut self) -> Result<()> {
        if !self.confirm_discard() {
            return Ok(());
        }
        let Some(path) = open_markdown_dialog(self.path.as_deref()) else {
            return Ok(());
        };
        let content = fs::read_to_string(&path)?;
        log::info!("Opened {}", path.display());
        self.replace_document(Document::from_disk(content), Some(path))
    }

    /// Returns true when the document reached disk.
    fn save(&mut self, ask: bool) -> bool {
        let path = match (&self.path, ask) {
            (Some(p), false) => p.clone(),
            _ => match save_markdown_dialog(self.path.as_deref()) {
                Some(p) => p,
                None => return false,
            },
        };
        if ask && !is_markdown_file(&path) {
            log::warn!("Save As target {} has no markdown extension", path.display());
            let prompt = format!("{} is not a markdown file name. Save anyway?", extract_filename(&path));
            if dialog::choice2_default(&prompt, "Save", "Cancel", "") != Some(0) {
                return false;
            }
        }
        let doc = self.shell.document();
        match fs::write(&path, doc.as_str()) {
            Ok(()) => {
                log::info!("Saved {} ({} bytes)", path.display(), doc.len());
                self.saved = doc;
                self.path = Some(path);
                self.update_title();
                true
            }
            Err(e) => {
                log::error!("Failed to save {}: {}", path.display(), e);
                dialog::alert_default(&format!("Error saving file: {}", e));
                false
            }
        }
    }

    fn apply_chrome(&mut self, theme: &Theme) {
        let w = &mut self.widgets;
        apply_window_chrome(&mut w.wind, &mut w.menu, &mut w.panes, &mut w.preview_view, &theme.chrome);
        #[cfg(target_os = "windows")]
        markpane::ui::theme::set_windows_titlebar_theme(&w.wind, theme.chrome.is_dark);
    }

    fn rebuild_editor(&mut self, theme: Option<Rc<Theme>>) -> Result<()> {
        self.shell.remount(&self.widgets.editor_pane, theme)
    }

    /// Handle one message. Returns false when the app should exit.
    fn dispatch(&mut self, msg: Message) -> Result<bool> {
        match msg {
            Message::FileNew => {
                if self.confirm_discard() {
                    self.replace_document(Document::default(), None)?;
                }
            }
            Message::FileOpen => self.open()?,
            Message::FileSave => {
                self.save(false);
            }
            Message::FileSaveAs => {
                self.save(true);
            }
            Message::FileQuit | Message::WindowClose => return Ok(!self.confirm_discard()),
            Message::TogglePreview => {
                self.settings.preview_enabled = self.shell.with_preview(|p| {
                    let enabled = !p.is_enabled();
                    p.set_enabled(enabled);
                    enabled
                });
            }
            Message::ToggleDarkMode => {
                self.is_dark = !self.is_dark;
                self.settings.theme_mode = if self.is_dark { ThemeMode::Dark } else { ThemeMode::Light };
                let theme = self.theme();
                self.apply_chrome(&theme);
                self.rebuild_editor(Some(theme))?;
            }
            Message::SetFont(font) => {
                self.settings.font = font;
                let size = self.settings.font_size;
                self.shell.binding_mut().backend_mut().set_font(font, size);
                self.rebuild_editor(None)?;
            }
            Message::SetFontSize(size) => {
                self.settings.font_size = size;
                let font = self.settings.font;
                self.shell.binding_mut().backend_mut().set_font(font, size);
                self.shell.with_preview(|p| p.set_font_size(size));
                self.rebuild_editor(None)?;
            }
            Message::SetTabSize(size) => {
                self.settings.tab_size = size;
                self.shell.set_tab_size(size as usize);
                self.rebuild_editor(None)?;
            }
            Message::ShowAbout => dialog::message_default(&format!(
                "Markpane {}\nMarkdown editor with live preview.\n\nBuilt with Rust and FLTK.",
                env!("CARGO_PKG_VERSION")
            )),
        }
        Ok(true)
    }

    fn shutdown(mut self) {
        self.settings.window_width = self.widgets.wind.w();
        self.settings.window_height = self.widgets.wind.h();
        self.settings.last_document = self.path.clone();
        if let Err(e) = self.settings.save() {
            log::warn!("Failed to save settings: {}", e);
        }
        self.shell.unmount();
    }
}

/// Reopen the last document if it still exists.
fn initial_document(settings: &AppSettings) -> (Document, Option<PathBuf>) {
    let Some(path) = settings.last_document.clone() else {
        return (Document::default(), None);
    };
    match fs::read_to_string(&path) {
        Ok(content) => (Document::from_disk(content), Some(path)),
        Err(e) => {
            log::info!("Not reopening {}: {}", path.display(), e);
            (Document::default(), None)
        }
    }
}

fn run() -> Result<()> {
    let app = app::App::default();
    let settings = AppSettings::load();
    let is_dark = match settings.theme_mode {
        ThemeMode::Light => false,
        ThemeMode::Dark => true,
        ThemeMode::SystemDefault => detect_system_dark_mode(),
    };
    let theme = Rc::new(Theme::for_mode(settings.theme_mode, is_dark));

    let (sender, receiver) = app::channel::<Message>();
    let mut widgets = build_main_window(&settings);
    build_menu(&mut widgets.menu, &sender, &settings, is_dark);

    widgets.wind.set_callback(move |_| {
        if app::event() == Event::Close {
            sender.send(Message::WindowClose);
        }
    });

    let (doc, path) = initial_document(&settings);
    let preview = HtmlPreview::new(
        widgets.preview_view.clone(),
        widgets.panes.clone(),
        settings.font_size,
        settings.preview_enabled,
    );
    let shell = AppShell::new(
        doc.clone(),
        FltkBackend::new(settings.font, settings.font_size),
        preview,
        theme.clone(),
        LanguageRegistry::defaults(),
        settings.tab_size as usize,
    );

    let mut markpane = Markpane {
        widgets,
        shell,
        settings,
        is_dark,
        path,
        saved: doc.clone(),
        seen: doc,
    };
    markpane.widgets.wind.show();
    markpane.apply_chrome(&theme);
    markpane.mount()?;
    markpane.update_title();

    while app.wait() {
        if let Some(msg) = receiver.recv() {
            match markpane.dispatch(msg) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    log::error!("{}", e);
                    dialog::alert_default(&e.to_string());
                }
            }
        }
        markpane.refresh_title();
    }

    markpane.shutdown();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        log::error!("{}", e);
        dialog::alert_default(&format!("Markpane failed to start: {}", e));
        std::process::exit(1);
    }
}
