pub(crate) mod autosave;
pub(crate) mod config;
pub(crate) mod pages;
pub(crate) mod redraw;
pub(crate) mod undo;

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use gschem_core::{ObjectGraph, ReadOptions};

use self::{
    autosave::AutoSave,
    config::Config,
    pages::{Direction, EntryId, Page, PageError, PageId, Pages, UndoKind},
    redraw::{Notification, Notifier},
    undo::{UndoController, UndoError, UndoFiles},
};

/// Open pages with their undo histories.
///
/// Every edit of the current page should be followed by a `savestate` so it
/// can be undone.
#[derive(Debug)]
pub struct Editor {
    config: Config,
    pages: Pages,
    undo: UndoController,
    autosave: AutoSave,
    notifier: Notifier,
}

impl Editor {
    /// Editor keeping undo files in `$TMP` or /tmp
    pub fn new(config: Config) -> Editor {
        Editor::with_undo_files(config, UndoFiles::from_env())
    }

    pub fn with_undo_files(config: Config, files: UndoFiles) -> Editor {
        if !config.undo.enabled {
            log::info!("Undo/Redo disabled in config");
        }

        let undo = UndoController::new(&config, files);
        let autosave = AutoSave::new(config.autosave.interval, Instant::now());

        Editor {
            config,
            pages: Pages::default(),
            undo,
            autosave,
            notifier: Notifier::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn undo_files(&self) -> &UndoFiles {
        self.undo.files()
    }

    pub fn undo_controller(&self) -> &UndoController {
        &self.undo
    }

    /// Create an empty page and make it current
    pub fn new_page(&mut self, filename: impl Into<PathBuf>) -> PageId {
        let page = Page::new(filename.into(), ObjectGraph::new(), self.undo.new_history());
        self.add_page(page)
    }

    /// Read a schematic into a new page and make it current
    pub fn open_page(&mut self, path: &Path) -> Result<PageId, PageError> {
        if let Some(id) = self.pages.find(path) {
            log::info!("{path:?} already open");
            self.goto_page(id)?;
            return Ok(id);
        }

        let page = Page::from_file(path, self.undo.new_history(), ReadOptions::default())?;
        Ok(self.add_page(page))
    }

    fn add_page(&mut self, page: Page) -> PageId {
        let id = self.pages.insert(page);
        if let Err(e) = self.goto_page(id) {
            log::error!("Failed to select new page {id}: {e}");
        }

        // Opening state is the first undo level
        let _ = self.savestate(UndoKind::All);
        id
    }

    /// Close a page, its undo files are removed
    pub fn close_page(&mut self, id: PageId) -> Result<(), PageError> {
        let page = self.pages.remove(id).ok_or(PageError::NoPage)?;
        if page.is_changed() {
            log::warn!("Closing {:?} with unsaved changes", page.filename());
        }

        if let Some(current) = self.pages.current() {
            self.notifier.redraw(current);
        }
        Ok(())
    }

    pub fn goto_page(&mut self, id: PageId) -> Result<(), PageError> {
        self.pages.goto(id)?;
        self.notifier.redraw(id);
        self.update_menus();
        Ok(())
    }

    pub fn pages(&self) -> &Pages {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.pages.current()?)
    }

    pub fn current_page_mut(&mut self) -> Option<&mut Page> {
        let id = self.pages.current()?;
        self.pages.get_mut(id)
    }

    /// Save the current page to `path` or its own file
    pub fn save_page(&mut self, path: Option<&Path>) -> Result<(), PageError> {
        let page = self.current_page_mut().ok_or(PageError::NoPage)?;
        page.save(path)
    }

    /// Record an undo level for the current page. Writes pending auto-save
    /// backups first.
    ///
    /// A failure leaves the history as it was, the edit itself is kept but
    /// cannot be undone.
    pub fn savestate(&mut self, kind: UndoKind) -> Result<Option<EntryId>, UndoError> {
        autosave::write_backups(&mut self.pages);

        let result = self.undo.savestate(&mut self.pages, kind);
        if let Err(e) = &result {
            log::error!("Failed to save undo state: {e}");
        }
        result
    }

    /// Restore the previous undo level. Returns false if already at the
    /// oldest level.
    pub fn undo(&mut self) -> Result<bool, UndoError> {
        self.restore(Direction::Back)
    }

    /// Restore the next undo level. Returns false if already at the newest
    /// level.
    pub fn redo(&mut self) -> Result<bool, UndoError> {
        self.restore(Direction::Forward)
    }

    fn restore(&mut self, direction: Direction) -> Result<bool, UndoError> {
        let result = self
            .undo
            .restore(&mut self.pages, &mut self.notifier, direction);

        match &result {
            Err(UndoError::Disabled) => log::info!("Undo/Redo disabled in config"),
            Err(e) => log::error!("Failed to restore undo state: {e}"),
            Ok(_) => {}
        }
        result
    }

    /// Drop the newest undo level of the current page without restoring it,
    /// used when an action is cancelled.
    pub fn remove_last_undo(&mut self) {
        if let Err(e) = self.undo.remove_last_undo(&mut self.pages) {
            log::debug!("Nothing to remove: {e}");
        }
    }

    /// Trim the current page history now instead of waiting for the next
    /// periodic check. Returns the number of levels removed.
    pub fn trim_history(&mut self) -> usize {
        match self.current_page_mut() {
            Some(page) => page.history.trim(),
            None => 0,
        }
    }

    /// Drive the auto-save timer
    pub fn tick_autosave(&mut self, now: Instant) -> bool {
        self.autosave.tick(now, &mut self.pages)
    }

    pub fn set_dont_redraw(&mut self, dont_redraw: bool) {
        self.notifier.set_dont_redraw(dont_redraw);
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.take()
    }

    fn update_menus(&mut self) {
        let (can_undo, can_redo) = self
            .current_page()
            .map(|page| (page.history().can_undo(), page.history().can_redo()))
            .unwrap_or((false, false));
        self.notifier.menus(can_undo, can_redo);
    }

    /// Remove every undo file this process created
    pub fn cleanup(&mut self) {
        self.undo.cleanup();
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.cleanup();
    }
}
