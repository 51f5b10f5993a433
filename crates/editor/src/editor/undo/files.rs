use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

const PREFIX: &str = "gschem";
const EXTENSION: &str = "sch";

/// Hands out temporary file names for disk backed undo snapshots.
///
/// Names are `<dir>/gschem.save<pid>_<index>.sch` where the index grows for
/// every allocation and is never reused during the lifetime of the
/// allocator.
#[derive(Debug)]
pub struct UndoFiles {
    dir: PathBuf,
    pid: u32,
    next_index: u64,
}

impl UndoFiles {
    pub fn new(dir: impl Into<PathBuf>, pid: u32) -> UndoFiles {
        UndoFiles {
            dir: dir.into(),
            pid,
            next_index: 0,
        }
    }

    /// Use `$TMP` or /tmp and the id of this process
    pub fn from_env() -> UndoFiles {
        let dir = env::var_os("TMP")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        log::debug!("Undo files in {dir:?}");
        UndoFiles::new(dir, std::process::id())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// How many file names have been handed out
    pub fn allocated(&self) -> u64 {
        self.next_index
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.dir
            .join(format!("{PREFIX}.save{}_{index}.{EXTENSION}", self.pid))
    }

    pub(crate) fn allocate(&mut self) -> UndoFile {
        let path = self.path_for(self.next_index);
        self.next_index += 1;
        UndoFile { path }
    }

    /// Unlink every file ever allocated, including ones still referenced by
    /// a history. Call on shutdown.
    pub fn cleanup(&self) {
        for index in 0..self.next_index {
            remove_quietly(&self.path_for(index));
        }
    }
}

/// Owned temporary file, unlinked when dropped
#[derive(Debug)]
pub(crate) struct UndoFile {
    path: PathBuf,
}

impl UndoFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UndoFile {
    fn drop(&mut self) {
        log::debug!("Freeing: {:?}", self.path);
        remove_quietly(&self.path);
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("Failed to remove undo file {path:?}: {e}");
        }
    }
}
