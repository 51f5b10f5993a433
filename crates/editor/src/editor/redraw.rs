use super::pages::PageId;

/// Requests for the user interface produced while editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Page contents or view changed
    Redraw(PageId),
    /// Undo and redo availability may have changed
    Menus { can_undo: bool, can_redo: bool },
}

/// Collects notifications until the interface takes them.
///
/// Logging and redraws are suppressed while a page is swapped during a
/// restore, the caller emits the final notifications once the page is
/// consistent again.
#[derive(Debug, Default)]
pub struct Notifier {
    dont_redraw: bool,
    suppressed: bool,
    pending: Vec<Notification>,
}

impl Notifier {
    pub fn dont_redraw(&self) -> bool {
        self.dont_redraw
    }

    pub fn set_dont_redraw(&mut self, dont_redraw: bool) {
        self.dont_redraw = dont_redraw;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Stop redraws, returns the previous redraw flag for `resume`
    pub(crate) fn suppress(&mut self) -> bool {
        self.suppressed = true;
        std::mem::replace(&mut self.dont_redraw, true)
    }

    pub(crate) fn resume(&mut self, dont_redraw: bool) {
        self.suppressed = false;
        self.dont_redraw = dont_redraw;
    }

    pub(crate) fn redraw(&mut self, page: PageId) {
        if self.dont_redraw {
            return;
        }
        self.pending.push(Notification::Redraw(page));
    }

    pub(crate) fn menus(&mut self, can_undo: bool, can_redo: bool) {
        self.pending.push(Notification::Menus { can_undo, can_redo });
    }

    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
