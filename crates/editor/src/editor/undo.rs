mod files;

use std::{io, path::PathBuf};

use gschem_core::{read_file, FormatError, ObjectGraph, ReadOptions};
use thiserror::Error;

use super::{
    config::{Config, UndoConfig},
    pages::{page::Snapshot, Direction, EntryId, Page, PageId, Pages, UndoHistory, UndoKind},
    redraw::Notifier,
};

pub use self::files::UndoFiles;
pub(crate) use self::files::UndoFile;

#[derive(Debug, Error)]
pub enum UndoError {
    #[error("Failed to capture undo snapshot: {0}")]
    CaptureFailed(#[source] FormatError),

    #[error("Undo history is empty")]
    HistoryEmpty,

    #[error("No older entry holds the document for this view change")]
    UnresolvableAncestor,

    #[error("Undo file {0:?} is missing")]
    RestoreSourceMissing(PathBuf),

    #[error("Failed to read undo file {path:?}: {source}")]
    RestoreFailed {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Undo/Redo disabled in config")]
    Disabled,

    #[error("No current page")]
    NoPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Committing,
    Restoring,
}

/// Where the restored document comes from
enum Source {
    File(ObjectGraph),
    Memory(EntryId),
    ViewOnly,
}

/// Records undo states after edits and restores them on undo and redo.
#[derive(Debug)]
pub struct UndoController {
    config: UndoConfig,
    /// Auto-save is on, count operations for it
    count_ops: bool,
    files: UndoFiles,
    state: ControllerState,
}

impl UndoController {
    pub fn new(config: &Config, files: UndoFiles) -> UndoController {
        UndoController {
            config: config.undo.clone(),
            count_ops: config.autosave.interval != 0,
            files,
            state: ControllerState::Idle,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn files(&self) -> &UndoFiles {
        &self.files
    }

    /// Empty history for a new page
    pub fn new_history(&self) -> UndoHistory {
        UndoHistory::new(self.config.levels, self.config.padding)
    }

    /// Record the state of the current page. Returns None if undo is
    /// disabled.
    pub fn savestate(
        &mut self,
        pages: &mut Pages,
        kind: UndoKind,
    ) -> Result<Option<EntryId>, UndoError> {
        if !self.config.enabled {
            return Ok(None);
        }

        self.state = ControllerState::Committing;
        let result = self.commit(pages, kind);
        self.state = ControllerState::Idle;
        result.map(Some)
    }

    fn commit(&mut self, pages: &mut Pages, kind: UndoKind) -> Result<EntryId, UndoError> {
        let page = current_page_mut(pages)?;

        let snapshot = match kind {
            UndoKind::All => Some(Snapshot::capture(
                page.objects(),
                self.config.mode,
                &mut self.files,
            )?),
            UndoKind::ViewportOnly => None,
        };

        if kind == UndoKind::All && self.count_ops {
            page.ops_since_last_backup += 1;
        }

        let view = page.view_state();
        let id = page.history.commit(kind, snapshot, view);

        let every = self.config.trim_every;
        if every != 0 && page.history.commits() % every == 0 {
            page.history.trim();
        }

        Ok(id)
    }

    /// Restore the entry before or after the current one. Returns false if
    /// there was nothing to restore in that direction.
    pub fn restore(
        &mut self,
        pages: &mut Pages,
        notifier: &mut Notifier,
        direction: Direction,
    ) -> Result<bool, UndoError> {
        if !self.config.enabled {
            return Err(UndoError::Disabled);
        }

        self.state = ControllerState::Restoring;
        let result = self.restore_entry(pages, notifier, direction);
        self.state = ControllerState::Idle;
        result
    }

    fn restore_entry(
        &mut self,
        pages: &mut Pages,
        notifier: &mut Notifier,
        direction: Direction,
    ) -> Result<bool, UndoError> {
        let page_id = pages.current().ok_or(UndoError::NoPage)?;
        let page = pages.get(page_id).ok_or(UndoError::NoPage)?;
        let history = page.history();

        let from = history.current().ok_or(UndoError::HistoryEmpty)?;
        let Some(target) = history.navigate(direction) else {
            log::debug!("Nothing to restore");
            return Ok(false);
        };

        let from_kind = history.kind(from).ok_or(UndoError::HistoryEmpty)?;
        let target_kind = history.kind(target).ok_or(UndoError::HistoryEmpty)?;
        let view = history.view(target).ok_or(UndoError::HistoryEmpty)?;

        let source = if history.has_snapshot(target) {
            Some(target)
        } else if from_kind == UndoKind::All && target_kind == UndoKind::ViewportOnly {
            let ancestor = history
                .resolve_snapshot(target)
                .ok_or(UndoError::UnresolvableAncestor)?;
            Some(ancestor)
        } else {
            None
        };

        // Load everything that can fail before touching the page
        let snapshot = source.and_then(|id| Some((id, history.get(id)?.snapshot.as_ref()?)));
        let source = match snapshot {
            Some((_, Snapshot::Disk(file))) => {
                let graph = read_file(file.path(), ReadOptions { quiet: true })
                    .map_err(|e| restore_error(file.path().to_path_buf(), e))?;
                Source::File(graph)
            }
            Some((id, Snapshot::Memory(_))) => Source::Memory(id),
            None => Source::ViewOnly,
        };

        let content = !matches!(source, Source::ViewOnly);

        let prev_redraw = notifier.suppress();
        let swapped = swap_content(pages, page_id, source);
        notifier.resume(prev_redraw);
        let page_id = swapped?;

        let page = pages.get_mut(page_id).ok_or(UndoError::NoPage)?;
        if content {
            page.set_navigation(view.page_control, view.up);
            page.set_changed(true);
        }
        page.set_viewport(view.bounds);
        page.history.step(direction);

        let can_undo = page.history.can_undo();
        let can_redo = page.history.can_redo();

        notifier.redraw(page_id);
        notifier.menus(can_undo, can_redo);

        Ok(true)
    }

    /// Forget the newest undo state without restoring anything
    pub fn remove_last_undo(&mut self, pages: &mut Pages) -> Result<(), UndoError> {
        let page = current_page_mut(pages)?;
        if page.history.is_empty() {
            return Err(UndoError::HistoryEmpty);
        }
        page.history.step(Direction::Back);
        Ok(())
    }

    /// Unlink every undo file ever allocated
    pub fn cleanup(&self) {
        self.files.cleanup();
    }
}

fn current_page_mut(pages: &mut Pages) -> Result<&mut Page, UndoError> {
    let id = pages.current().ok_or(UndoError::NoPage)?;
    pages.get_mut(id).ok_or(UndoError::NoPage)
}

/// Put the restored document in place. Returns the id of the page that now
/// holds it.
fn swap_content(
    pages: &mut Pages,
    page_id: PageId,
    source: Source,
) -> Result<PageId, UndoError> {
    match source {
        Source::File(graph) => replace_page(pages, page_id, graph),
        Source::Memory(entry) => {
            let page = pages.get_mut(page_id).ok_or(UndoError::NoPage)?;
            if !page.copy_from_snapshot(entry) {
                log::error!("Undo entry {entry:?} lost its snapshot");
                return Err(UndoError::UnresolvableAncestor);
            }
            Ok(page_id)
        }
        Source::ViewOnly => Ok(page_id),
    }
}

fn restore_error(path: PathBuf, err: FormatError) -> UndoError {
    match err {
        FormatError::Io(e) if e.kind() == io::ErrorKind::NotFound => {
            UndoError::RestoreSourceMissing(path)
        }
        source => UndoError::RestoreFailed { path, source },
    }
}

/// Replace the page with a new one holding `objects`. The history, filename
/// and backup state move to the new page and every reference to the old id
/// is pointed at the new one. Returns the new page id.
fn replace_page(
    pages: &mut Pages,
    old_id: PageId,
    objects: ObjectGraph,
) -> Result<PageId, UndoError> {
    let old = pages.remove(old_id).ok_or(UndoError::NoPage)?;
    let filename = old.filename().to_path_buf();

    let mut page = Page::new(filename, objects, old.history);
    page.ops_since_last_backup = old.ops_since_last_backup;
    page.do_autosave_backup = old.do_autosave_backup;
    page.page_control = old.page_control;
    page.up = old.up;

    let new_id = pages.insert(page);
    if let Err(e) = pages.goto(new_id) {
        log::error!("Failed to select restored page: {e}");
        return Err(UndoError::NoPage);
    }

    for (_, other) in pages.iter_mut() {
        if other.up == Some(old_id) {
            other.up = Some(new_id);
        }
        other.history.replace_up(old_id, new_id);
    }

    log::debug!("Page {old_id} replaced by {new_id}");
    Ok(new_id)
}
