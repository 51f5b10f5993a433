use gschem_core::{write_file, ObjectGraph};

use crate::editor::{
    config::UndoMode,
    undo::{UndoError, UndoFile, UndoFiles},
};

/// Copy of a whole document that an undo entry can be restored from.
///
/// Both variants own their resource, dropping the snapshot unlinks the file
/// or frees the copied graph.
#[derive(Debug)]
pub(crate) enum Snapshot {
    Disk(UndoFile),
    Memory(ObjectGraph),
}

impl Snapshot {
    /// Capture the document, nothing is left behind if this fails
    pub fn capture(
        objects: &ObjectGraph,
        mode: UndoMode,
        files: &mut UndoFiles,
    ) -> Result<Snapshot, UndoError> {
        match mode {
            UndoMode::Disk => {
                let file = files.allocate();
                write_file(objects, file.path()).map_err(UndoError::CaptureFailed)?;
                Ok(Snapshot::Disk(file))
            }
            UndoMode::Memory => Ok(Snapshot::Memory(objects.deep_copy())),
        }
    }
}
