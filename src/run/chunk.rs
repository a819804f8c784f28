use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::Result;
use crate::io_stats::{IoStats, IoStatsTracker};
use crate::run::RunDescriptor;

/// A contiguous byte window read from a run.
///
/// Holds exactly the bytes the read returned — shorter than the
/// configured chunk size at the end of the run, empty once the run (or
/// the file) is exhausted.
#[derive(Debug)]
pub struct Chunk {
    data: Vec<u8>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Sequential chunk reader over a single run file.
///
/// Owns the file handle exclusively. Reads never go past the run's
/// declared length, so `bytes_read <= total_len` always holds and
/// [`bytes_remaining`](ChunkSource::bytes_remaining) cleanly separates
/// "end of run" from "record continues in the next chunk".
#[derive(Debug)]
pub struct ChunkSource {
    path: PathBuf,
    file: Option<File>,
    chunk_size: usize,
    total_len: u64,
    bytes_read: u64,
    reads: u64,
    tracker: Option<IoStatsTracker>,
}

impl ChunkSource {
    /// Open the run file for sequential chunk reads.
    pub fn open(run: &RunDescriptor) -> Result<Self> {
        Self::open_with_tracker(run, None)
    }

    /// Like [`open`](ChunkSource::open), additionally feeding every read
    /// into a shared [`IoStatsTracker`].
    pub fn open_with_tracker(
        run: &RunDescriptor,
        tracker: Option<IoStatsTracker>,
    ) -> Result<Self> {
        if run.chunk_size == 0 {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "chunk size must be non-zero",
            )
            .into());
        }

        let file = File::open(&run.path)?;
        let file_len = file.metadata()?.len();
        if file_len < run.total_len {
            // Still readable; the shortfall surfaces as a truncated run
            // once reads hit the end of the file.
            debug!(
                path = %run.path.display(),
                declared = run.total_len,
                actual = file_len,
                "run file shorter than declared length"
            );
        }

        Ok(Self {
            path: run.path.clone(),
            file: Some(file),
            chunk_size: run.chunk_size,
            total_len: run.total_len,
            bytes_read: 0,
            reads: 0,
            tracker,
        })
    }

    /// Read the next chunk: up to `chunk_size` bytes, capped at the run's
    /// remaining declared length. Returns an empty chunk at end of run or
    /// end of file. Counts one read per call that touches the file.
    pub fn read_next(&mut self) -> Result<Chunk> {
        let want = self.chunk_size.min(self.bytes_remaining() as usize);
        let Some(file) = self.file.as_mut() else {
            return Ok(Chunk { data: Vec::new() });
        };
        if want == 0 {
            return Ok(Chunk { data: Vec::new() });
        }

        let mut data = vec![0u8; want];
        let mut filled = 0;
        while filled < want {
            match file.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        data.truncate(filled);

        self.reads += 1;
        self.bytes_read += filled as u64;
        if let Some(tracker) = &self.tracker {
            tracker.record_read(filled as u64);
        }
        trace!(
            path = %self.path.display(),
            read = filled,
            offset = self.bytes_read,
            "read chunk"
        );

        Ok(Chunk { data })
    }

    /// Declared run length minus cumulative bytes read.
    pub fn bytes_remaining(&self) -> u64 {
        self.total_len - self.bytes_read
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn stats(&self) -> IoStats {
        IoStats {
            reads: self.reads,
            bytes_read: self.bytes_read,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the file handle. Subsequent reads return empty chunks.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            debug!(
                path = %self.path.display(),
                reads = self.reads,
                bytes_read = self.bytes_read,
                "closed run file"
            );
        }
    }
}
