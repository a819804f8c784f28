pub mod chunk;
pub mod codec;
pub mod cursor;
pub mod decoder;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use chunk::{Chunk, ChunkSource};
pub use codec::{DecodeOne, KvCodec, KvRecord, RecordCodec};
pub use cursor::{CursorState, RunCursor, RunRecords};
pub use decoder::{DecodeBatch, DecodeStatus, decode_all};

/// Describes one sorted run on disk.
///
/// Produced by the run-generation phase and handed to this layer, which
/// only ever reads the file. `total_len` is the run's declared byte
/// length — load-bearing for end-of-run detection, since a run may share
/// a file with others or the file may have been truncated underneath us.
#[derive(Debug, Clone)]
pub struct RunDescriptor {
    /// Location of the run file.
    pub path: PathBuf,
    /// Declared byte length of the run.
    pub total_len: u64,
    /// Chunk size to use when reading the run back.
    pub chunk_size: usize,
}

impl RunDescriptor {
    pub fn new(path: impl Into<PathBuf>, total_len: u64, chunk_size: usize) -> Self {
        Self {
            path: path.into(),
            total_len,
            chunk_size,
        }
    }

    /// Build a descriptor for a run that spans an entire file, taking the
    /// declared length from the file's metadata.
    pub fn for_file(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let total_len = std::fs::metadata(&path)?.len();
        Ok(Self {
            path,
            total_len,
            chunk_size,
        })
    }
}
