//! Input file access.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use crate::error::Error;

/// Raw bytes of the input file.
#[derive(Debug)]
pub enum InputData {
    Mapped(Mmap),
    Empty,
}

impl Deref for InputData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            InputData::Mapped(mmap) => mmap,
            InputData::Empty => &[],
        }
    }
}

/// Maps `path` into memory. Zero-length files are not mapped.
pub fn read_input(path: &Path) -> Result<InputData, Error> {
    let input_error = |source| Error::Input {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(input_error)?;
    if file.metadata().map_err(input_error)?.len() == 0 {
        return Ok(InputData::Empty);
    }
    // SAFETY: the file is opened read-only and is not expected to be
    // modified while the run is in progress.
    let mmap = unsafe { Mmap::map(&file) }.map_err(input_error)?;
    Ok(InputData::Mapped(mmap))
}
