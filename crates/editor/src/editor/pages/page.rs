mod history;
mod snapshot;

use std::{
    fs,
    path::{Path, PathBuf},
};

use gschem_core::{read_file, write_file, Bounds, ObjectGraph, ReadOptions};

use super::{PageError, PageId};

pub use self::history::{Direction, EntryId, UndoHistory, UndoKind, ViewState};
pub(crate) use self::snapshot::Snapshot;

/// World area shown for a page without any objects
pub const DEFAULT_VIEWPORT: Bounds = Bounds {
    left: 0,
    top: 0,
    right: 120000,
    bottom: 90000,
};

/// Margin added around the objects when a page is first shown
const VIEWPORT_MARGIN: i32 = 1000;

/// One open schematic document
#[derive(Debug)]
pub struct Page {
    pub(crate) id: PageId,

    objects: ObjectGraph,
    /// Undo timeline, survives reloading the page from a snapshot
    pub(crate) history: UndoHistory,

    pub(crate) viewport: Bounds,
    pub(crate) page_control: i32,
    pub(crate) up: Option<PageId>,

    filename: PathBuf,
    changed: bool,

    pub(crate) ops_since_last_backup: u32,
    pub(crate) do_autosave_backup: bool,
}

impl Page {
    pub(crate) fn new(filename: PathBuf, objects: ObjectGraph, history: UndoHistory) -> Page {
        let viewport = objects
            .bounds()
            .map(|b| b.expand(VIEWPORT_MARGIN))
            .unwrap_or(DEFAULT_VIEWPORT);

        Page {
            id: PageId::default(),
            objects,
            history,
            viewport,
            page_control: 0,
            up: None,
            filename,
            changed: false,
            ops_since_last_backup: 0,
            do_autosave_backup: false,
        }
    }

    pub(crate) fn from_file(
        path: &Path,
        history: UndoHistory,
        options: ReadOptions,
    ) -> Result<Page, PageError> {
        log::debug!("Opening page {path:?}");
        let objects = read_file(path, options).map_err(|source| PageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Page::new(path.to_path_buf(), objects, history))
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn objects(&self) -> &ObjectGraph {
        &self.objects
    }

    /// Mutable access to the document, marks the page as changed
    pub fn objects_mut(&mut self) -> &mut ObjectGraph {
        self.changed = true;
        &mut self.objects
    }

    /// Replace the document with a copy of the in-memory snapshot of
    /// `entry`. Returns false if the entry has no such snapshot.
    pub(crate) fn copy_from_snapshot(&mut self, entry: EntryId) -> bool {
        let Some(Snapshot::Memory(graph)) = self
            .history
            .get(entry)
            .and_then(|e| e.snapshot.as_ref())
        else {
            return false;
        };

        self.objects.clear();
        ObjectGraph::deep_copy_into(&mut self.objects, graph);
        true
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn viewport(&self) -> Bounds {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Bounds) {
        self.viewport = viewport;
    }

    pub fn page_control(&self) -> i32 {
        self.page_control
    }

    pub fn up(&self) -> Option<PageId> {
        self.up
    }

    pub fn set_navigation(&mut self, page_control: i32, up: Option<PageId>) {
        self.page_control = page_control;
        self.up = up;
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    pub fn ops_since_last_backup(&self) -> u32 {
        self.ops_since_last_backup
    }

    pub(crate) fn view_state(&self) -> ViewState {
        ViewState {
            bounds: self.viewport,
            page_control: self.page_control,
            up: self.up,
        }
    }

    /// Path of the auto-save backup, `#name#` next to the file
    pub fn backup_path(&self) -> Option<PathBuf> {
        let name = self.filename.file_name()?.to_string_lossy();
        let backup = format!("#{name}#");
        Some(self.filename.with_file_name(backup))
    }

    /// Save to `path` or the page filename. A successful save to the page
    /// file clears the changed flag and removes any backup.
    pub fn save(&mut self, path: Option<&Path>) -> Result<(), PageError> {
        let target = path.unwrap_or(&self.filename).to_path_buf();
        log::info!("Saving to {target:?}");
        write_file(&self.objects, &target).map_err(|source| PageError::Save {
            path: target.clone(),
            source,
        })?;

        if target == self.filename {
            self.changed = false;
            self.ops_since_last_backup = 0;
            self.do_autosave_backup = false;

            if let Some(backup) = self.backup_path() {
                if backup.exists() {
                    if let Err(e) = fs::remove_file(&backup) {
                        log::warn!("Failed to remove backup {backup:?}: {e}");
                    }
                }
            }
        }

        Ok(())
    }
}
