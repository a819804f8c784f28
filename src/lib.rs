//! # Run Reader
//!
//! Read-side buffering for an external merge sort: turns a sorted run
//! file — a sequence of serialized records too large for memory — into a
//! lazily-produced, in-order stream of decoded records, using one small
//! fixed-size window per run.
//!
//! ## Core idea
//! A run is read back in fixed-size chunks, but records don't align to
//! chunk boundaries. The cursor keeps each chunk's undecoded suffix in a
//! carry-over buffer and prepends it to the next chunk before decoding,
//! so a record split across chunks is reassembled before the caller ever
//! sees it. Byte accounting against the run's declared length separates
//! a record continuing in the next chunk from a truncated run.
//!
//! Run generation and the k-way merge itself live upstream/downstream of
//! this crate; a merge holds one [`RunCursor`] per run and drains them
//! through [`has_next`](RunCursor::has_next)/[`next`](RunCursor::next)
//! or the [`Iterator`] adapter.

pub mod error;
pub mod io_stats;
pub mod run;
pub mod types;

// Public re-exports for the top-level API
pub use error::{Error, Result};
pub use io_stats::{IoStats, IoStatsTracker};
pub use run::{
    Chunk, ChunkSource, CursorState, DecodeBatch, DecodeOne, DecodeStatus, KvCodec, KvRecord,
    RecordCodec, RunCursor, RunDescriptor, RunRecords, decode_all,
};
