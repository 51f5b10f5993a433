mod reader;
mod writer;

use std::{
    fs,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use thiserror::Error;

use crate::ObjectGraph;

pub use self::{reader::read, writer::write};

/// Release written to the version line of saved files
pub const RELEASE_VERSION: u32 = 20070216;
pub const FILEFORMAT_VERSION: u32 = 1;

/// Files from this release and older use the short object formats without
/// line and fill options.
pub const VERSION_20000704: u32 = 20000704;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Unknown object type '{kind}' on line {line}")]
    UnknownObject { line: usize, kind: char },

    #[error("Unexpected end of file")]
    UnexpectedEof,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Do not log recoverable problems found in the file
    pub quiet: bool,
}

pub fn read_file(path: &Path, options: ReadOptions) -> Result<ObjectGraph, FormatError> {
    let file = fs::File::open(path)?;
    read(BufReader::new(file), options)
}

/// Write the graph to `path` replacing anything that was there
pub fn write_file(graph: &ObjectGraph, path: &Path) -> Result<(), FormatError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(graph, &mut writer)?;
    writer.flush()?;
    Ok(())
}
