pub(crate) mod page;

use std::path::{Path, PathBuf};

use gschem_core::FormatError;
use gschem_utils::{idmap::IdMap, key_type};
use thiserror::Error;

pub use self::page::{
    Direction, EntryId, Page, UndoHistory, UndoKind, ViewState, DEFAULT_VIEWPORT,
};

key_type!(pub PageId);

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Failed to save {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("No such page")]
    NoPage,
}

/// All open pages and the one being edited
#[derive(Debug, Default)]
pub struct Pages {
    pages: IdMap<PageId, Page>,
    current: Option<PageId>,
}

impl Pages {
    pub fn insert(&mut self, page: Page) -> PageId {
        let id = self.pages.insert(page);
        self.pages[id].id = id;
        id
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn get_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.get_mut(&id)
    }

    /// Remove a page, the current page moves to the newest remaining one
    pub fn remove(&mut self, id: PageId) -> Option<Page> {
        let page = self.pages.remove(&id)?;
        if self.current == Some(id) {
            self.current = self.pages.last_key();
        }
        Some(page)
    }

    pub fn current(&self) -> Option<PageId> {
        self.current
    }

    pub fn goto(&mut self, id: PageId) -> Result<(), PageError> {
        if !self.pages.contains(&id) {
            return Err(PageError::NoPage);
        }
        self.current = Some(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> gschem_utils::idmap::Iter<PageId, Page> {
        self.pages.iter()
    }

    pub fn iter_mut(&mut self) -> gschem_utils::idmap::IterMut<PageId, Page> {
        self.pages.iter_mut()
    }

    /// Find page with a filename
    pub fn find(&self, path: impl AsRef<Path>) -> Option<PageId> {
        let path = path.as_ref();
        self.pages
            .iter()
            .find(|(_, page)| page.filename() == path)
            .map(|(id, _)| id)
    }

    pub fn any_unsaved_changes(&self) -> Option<PageId> {
        self.pages
            .iter()
            .find(|(_, page)| page.is_changed())
            .map(|(id, _)| id)
    }
}
