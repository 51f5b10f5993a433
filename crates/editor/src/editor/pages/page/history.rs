use gschem_core::Bounds;
use slotmap::SlotMap;

use crate::editor::pages::PageId;

use super::snapshot::Snapshot;

slotmap::new_key_type!(
    pub struct EntryId;
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoKind {
    /// Whole document and view
    All,
    /// Only the view, content comes from an older entry
    ViewportOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Back,
    Forward,
}

/// View and navigation state recorded with every entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub bounds: Bounds,
    pub page_control: i32,
    pub up: Option<PageId>,
}

#[derive(Debug)]
pub(crate) struct UndoEntry {
    pub(crate) kind: UndoKind,
    pub(crate) snapshot: Option<Snapshot>,
    pub(crate) view: ViewState,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

impl UndoEntry {
    pub fn prev(&self) -> Option<EntryId> {
        self.prev
    }

    pub fn next(&self) -> Option<EntryId> {
        self.next
    }
}

/// Linear undo timeline of one page.
///
/// Entries live in an arena and link to their neighbours with ids. `bottom`
/// is the oldest entry, `top` the newest and `current` the state the
/// document is in. Everything after `current` can be redone until the next
/// commit discards it.
#[derive(Debug)]
pub struct UndoHistory {
    entries: SlotMap<EntryId, UndoEntry>,
    bottom: Option<EntryId>,
    top: Option<EntryId>,
    current: Option<EntryId>,

    depth_limit: usize,
    padding: usize,
    commits: u64,
}

impl UndoHistory {
    pub fn new(depth_limit: usize, padding: usize) -> UndoHistory {
        UndoHistory {
            entries: SlotMap::with_key(),
            bottom: None,
            top: None,
            current: None,
            depth_limit: depth_limit.max(1),
            padding,
            commits: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bottom(&self) -> Option<EntryId> {
        self.bottom
    }

    pub fn top(&self) -> Option<EntryId> {
        self.top
    }

    pub fn current(&self) -> Option<EntryId> {
        self.current
    }

    /// Number of commits since the history was created, trimming does not
    /// lower this.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&UndoEntry> {
        self.entries.get(id)
    }

    pub fn kind(&self, id: EntryId) -> Option<UndoKind> {
        self.entries.get(id).map(|e| e.kind)
    }

    pub fn view(&self, id: EntryId) -> Option<ViewState> {
        self.entries.get(id).map(|e| e.view)
    }

    pub fn has_snapshot(&self, id: EntryId) -> bool {
        self.entries
            .get(id)
            .map(|e| e.snapshot.is_some())
            .unwrap_or(false)
    }

    pub fn can_undo(&self) -> bool {
        self.navigate(Direction::Back).is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.navigate(Direction::Forward).is_some()
    }

    /// Record a new entry after `current`. Everything that could have been
    /// redone is discarded first.
    pub(crate) fn commit(
        &mut self,
        kind: UndoKind,
        snapshot: Option<Snapshot>,
        view: ViewState,
    ) -> EntryId {
        match self.current {
            Some(current) => {
                let rest = self.entries[current].next.take();
                self.remove_from(rest);
            }
            None => {
                let all = self.bottom.take();
                self.remove_from(all);
            }
        }

        let id = self.entries.insert(UndoEntry {
            kind,
            snapshot,
            view,
            prev: self.current,
            next: None,
        });

        if let Some(current) = self.current {
            self.entries[current].next = Some(id);
        }

        self.top = Some(id);
        self.current = Some(id);
        if self.bottom.is_none() {
            self.bottom = Some(id);
        }
        self.commits += 1;

        id
    }

    /// Entry that an undo or redo would restore, None at the ends.
    pub fn navigate(&self, direction: Direction) -> Option<EntryId> {
        let current = self.entries.get(self.current?)?;
        match direction {
            Direction::Back => current.prev,
            Direction::Forward => current.next,
        }
    }

    /// Move `current` one entry. At the ends `current` is re-selected as the
    /// bottom or top entry instead of running off the list.
    pub fn step(&mut self, direction: Direction) {
        if self.current.is_none() {
            return;
        }

        self.current = match self.navigate(direction) {
            Some(id) => Some(id),
            None => match direction {
                Direction::Back => self.bottom,
                Direction::Forward => self.top,
            },
        };
    }

    /// Entry whose snapshot should be used when restoring `id`. Viewport only
    /// entries borrow the snapshot of the closest older entry that has one.
    pub fn resolve_snapshot(&self, id: EntryId) -> Option<EntryId> {
        let mut cursor = Some(id);
        while let Some(cid) = cursor {
            let entry = self.entries.get(cid)?;
            if entry.snapshot.is_some() {
                return Some(cid);
            }
            cursor = entry.prev();
        }
        None
    }

    /// Drop the oldest entries so that `depth_limit` remain, but only once
    /// the history has grown `padding` entries past the limit. Never removes
    /// `current` or anything after it. Returns how many entries were
    /// removed.
    ///
    /// If the new bottom entry has no snapshot it takes over the newest
    /// removed one, so viewport only entries always resolve.
    pub fn trim(&mut self) -> usize {
        let levels = self.len();
        if levels < self.depth_limit + self.padding {
            return 0;
        }

        let mut count = (levels - self.depth_limit).min(self.position_of_current());
        let removed = count;
        log::debug!("Trimming: {count} levels");

        let mut carried = None;
        let mut cursor = self.bottom;
        while let Some(id) = cursor {
            if count == 0 {
                break;
            }
            let Some(entry) = self.entries.remove(id) else {
                cursor = None;
                break;
            };
            cursor = entry.next;
            if entry.snapshot.is_some() {
                carried = entry.snapshot;
            }
            count -= 1;
        }

        self.bottom = cursor;
        if let Some(bottom) = cursor {
            let entry = &mut self.entries[bottom];
            entry.prev = None;
            if entry.snapshot.is_none() {
                entry.snapshot = carried;
            }
        }

        removed
    }

    /// Point recorded parent pages at `new` instead of `old`
    pub(crate) fn replace_up(&mut self, old: PageId, new: PageId) {
        for (_, entry) in self.entries.iter_mut() {
            if entry.view.up == Some(old) {
                entry.view.up = Some(new);
            }
        }
    }

    /// Entries from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = EntryId> + '_ {
        std::iter::successors(self.bottom, move |id| {
            self.entries.get(*id).and_then(UndoEntry::next)
        })
    }

    /// How many entries are older than `current`
    fn position_of_current(&self) -> usize {
        match self.current {
            Some(current) => self.iter().take_while(|id| *id != current).count(),
            None => 0,
        }
    }

    fn remove_from(&mut self, start: Option<EntryId>) {
        let mut cursor = start;
        while let Some(id) = cursor {
            cursor = self.entries.remove(id).and_then(|e| e.next);
        }

        if self.current.is_none() {
            self.bottom = None;
        }
        self.top = self.current;
    }
}
