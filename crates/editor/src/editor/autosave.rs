use std::time::{Duration, Instant};

use gschem_core::write_file;

use super::pages::{Page, Pages};

/// Timer that arms backups of changed pages.
#[derive(Debug)]
pub struct AutoSave {
    interval: Option<Duration>,
    last: Instant,
}

impl AutoSave {
    pub fn new(interval_secs: u64, now: Instant) -> AutoSave {
        let interval = (interval_secs != 0).then(|| Duration::from_secs(interval_secs));
        AutoSave {
            interval,
            last: now,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// Arm a backup on every page once the interval has passed. Returns
    /// whether pages were armed.
    pub fn tick(&mut self, now: Instant, pages: &mut Pages) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };

        if now.saturating_duration_since(self.last) < interval {
            return false;
        }

        self.last = now;
        for (_, page) in pages.iter_mut() {
            page.do_autosave_backup = true;
        }
        true
    }
}

/// Write `#name#` backups of armed pages that were edited since the last
/// backup.
pub(crate) fn write_backups(pages: &mut Pages) {
    for (_, page) in pages.iter_mut() {
        if !page.do_autosave_backup {
            continue;
        }

        if page.ops_since_last_backup == 0 || !page.is_changed() {
            continue;
        }

        if write_backup(page) {
            page.ops_since_last_backup = 0;
            page.do_autosave_backup = false;
        }
    }
}

fn write_backup(page: &Page) -> bool {
    let Some(backup) = page.backup_path() else {
        return false;
    };

    log::info!("Autosaving to {backup:?}");
    match write_file(page.objects(), &backup) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Could not save backup file {backup:?}: {e}");
            false
        }
    }
}

#[cfg(test)]
mod test {
    use gschem_core::{Circle, ObjectGraph, ObjectKind, Point};

    use crate::editor::pages::UndoHistory;

    use super::*;

    #[test]
    fn zero_interval_never_arms() {
        let now = Instant::now();
        let mut autosave = AutoSave::new(0, now);
        let mut pages = Pages::default();
        let page = Page::new("a.sch".into(), ObjectGraph::new(), UndoHistory::new(10, 5));
        pages.insert(page);

        assert!(!autosave.is_enabled());
        assert!(!autosave.tick(now + Duration::from_secs(1000), &mut pages));
    }

    #[test]
    fn backups_written_for_armed_changed_pages() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let mut autosave = AutoSave::new(60, now);
        let mut pages = Pages::default();

        let history = UndoHistory::new(10, 5);
        let mut page = Page::new(dir.path().join("amp.sch"), ObjectGraph::new(), history);
        page.objects_mut()
            .add(ObjectKind::Circle(Circle::new(Point::new(0, 0), 10)));
        page.ops_since_last_backup = 2;
        let id = pages.insert(page);

        assert!(!autosave.tick(now + Duration::from_secs(30), &mut pages));
        write_backups(&mut pages);
        assert!(!dir.path().join("#amp.sch#").exists());

        assert!(autosave.tick(now + Duration::from_secs(60), &mut pages));
        write_backups(&mut pages);
        assert!(dir.path().join("#amp.sch#").exists());

        let page = pages.get(id).unwrap();
        assert_eq!(page.ops_since_last_backup(), 0);
        assert!(!page.do_autosave_backup);
    }
}
