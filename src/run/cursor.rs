use std::collections::VecDeque;
use std::io;

use tracing::debug;

use crate::error::{Error, Result};
use crate::io_stats::{IoStats, IoStatsTracker};
use crate::run::RunDescriptor;
use crate::run::chunk::ChunkSource;
use crate::run::codec::RecordCodec;
use crate::run::decoder::{DecodeStatus, decode_all};

/// Where a cursor stands in its run's lifecycle.
///
/// Terminal states (`ExhaustedClean`, `ExhaustedCorrupt`, `Poisoned`)
/// release the file handle and are never left again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// Opened, nothing read yet.
    Unstarted,
    /// At least one decoded record is queued for `next()`.
    Buffered,
    /// The carried bytes are the partial start of a record whose
    /// remainder has not been read yet.
    NeedMoreData,
    /// Every byte of the run decoded cleanly.
    ExhaustedClean,
    /// The run does not parse as a record sequence; `offset` is the
    /// position of the first bad byte.
    ExhaustedCorrupt { offset: u64, reason: String },
    /// An earlier read failed; the run is unusable from here on.
    Poisoned { message: String },
}

/// Pull-based cursor over one sorted run: the leaf a k-way merge drains.
///
/// Composes a [`ChunkSource`] and a [`RecordCodec`] behind a
/// one-record-lookahead interface. A record whose encoded form straddles
/// a chunk boundary is reassembled in the cursor's private carry-over
/// buffer before decoding, so callers only ever see whole records.
///
/// Each cursor owns its entire decode state; advancing one cursor never
/// touches another, so a merge may drive its cursors from independent
/// threads (one owner per cursor).
///
/// Errors are sticky: after a corruption or read failure every further
/// call fails with the same diagnosis, never a quiet "no more records".
pub struct RunCursor<C: RecordCodec> {
    source: ChunkSource,
    codec: C,
    carry: Vec<u8>,
    pending: VecDeque<C::Record>,
    state: CursorState,
    decoded_bytes: u64,
    /// Set when `carry` already failed to decode; cleared when new bytes
    /// arrive. Skips pointless re-decodes of a known-starved suffix.
    carry_stalled: bool,
    /// Corruption found behind records that were decoded in the same
    /// pass; raised once those records have been served.
    deferred_corrupt: Option<String>,
}

impl<C: RecordCodec> RunCursor<C> {
    /// Open a cursor over `run`, decoding with `codec`.
    pub fn open(run: &RunDescriptor, codec: C) -> Result<Self> {
        Self::open_with_tracker(run, codec, None)
    }

    /// Like [`open`](RunCursor::open), additionally feeding chunk reads
    /// into a shared [`IoStatsTracker`].
    pub fn open_with_tracker(
        run: &RunDescriptor,
        codec: C,
        tracker: Option<IoStatsTracker>,
    ) -> Result<Self> {
        let source = ChunkSource::open_with_tracker(run, tracker)?;
        Ok(Self {
            source,
            codec,
            carry: Vec::new(),
            pending: VecDeque::new(),
            state: CursorState::Unstarted,
            decoded_bytes: 0,
            carry_stalled: false,
            deferred_corrupt: None,
        })
    }

    /// True iff `next()` would return a record. Reads ahead at most far
    /// enough to decode one record; once a record is buffered, repeated
    /// calls are pure queries.
    pub fn has_next(&mut self) -> Result<bool> {
        match &self.state {
            CursorState::ExhaustedClean => return Ok(false),
            CursorState::ExhaustedCorrupt { .. } | CursorState::Poisoned { .. } => {
                return Err(self.terminal_error());
            }
            _ => {}
        }
        if self.pending.is_empty() {
            self.refill()?;
        }
        Ok(!self.pending.is_empty())
    }

    /// Take the next record. Fails with [`Error::Exhausted`] when the run
    /// has no record left, or re-raises the run's terminal failure.
    pub fn next(&mut self) -> Result<C::Record> {
        if self.pending.is_empty() {
            match &self.state {
                CursorState::ExhaustedClean => return Err(Error::Exhausted),
                CursorState::ExhaustedCorrupt { .. } | CursorState::Poisoned { .. } => {
                    return Err(self.terminal_error());
                }
                _ => self.refill()?,
            }
        }

        let Some(record) = self.pending.pop_front() else {
            return Err(Error::Exhausted);
        };

        // Refill eagerly so the caller's following has_next() is usually
        // an O(1) query. A failure here is recorded in the state and
        // surfaces on that next call; the record in hand is still good.
        if self.pending.is_empty() && !self.is_terminal() {
            let _ = self.refill();
        }

        Ok(record)
    }

    /// Decode until at least one record is pending or a terminal state is
    /// reached. An explicit loop: one iteration per chunk, however many
    /// chunks the next record spans.
    fn refill(&mut self) -> Result<()> {
        loop {
            if !self.pending.is_empty() {
                self.state = CursorState::Buffered;
                return Ok(());
            }

            if let Some(reason) = self.deferred_corrupt.take() {
                return Err(self.fail_corrupt(reason));
            }

            if !self.carry.is_empty() && !self.carry_stalled {
                let batch = decode_all(&self.codec, &self.carry);
                self.decoded_bytes += batch.consumed as u64;
                self.carry.drain(..batch.consumed);
                self.pending.extend(batch.records);
                match batch.status {
                    DecodeStatus::Complete => {}
                    DecodeStatus::NeedMoreData => self.carry_stalled = true,
                    DecodeStatus::Corrupt { reason } => {
                        if self.pending.is_empty() {
                            return Err(self.fail_corrupt(reason));
                        }
                        // Serve the records decoded ahead of the damage;
                        // the failure is raised once they drain.
                        self.deferred_corrupt = Some(reason);
                    }
                }
                // Every byte read so far is either decoded or carried.
                debug_assert_eq!(
                    self.decoded_bytes + self.carry.len() as u64,
                    self.source.bytes_read()
                );
                continue;
            }

            if self.source.bytes_remaining() == 0 {
                if self.carry.is_empty() {
                    self.state = CursorState::ExhaustedClean;
                    self.source.close();
                    debug!(path = %self.source.path().display(), "run exhausted");
                    return Ok(());
                }
                // A partial record at true end-of-run is a truncated run,
                // not a clean end.
                return Err(self.fail_corrupt("run truncated mid-record"));
            }

            let chunk = match self.source.read_next() {
                Ok(chunk) => chunk,
                Err(Error::Io(e)) => return Err(self.fail_io(e)),
                Err(other) => return Err(other),
            };
            if chunk.is_empty() {
                // The declared length promises more bytes than the file has.
                return Err(self.fail_corrupt("run shorter than declared length"));
            }
            if self.carry.is_empty() {
                self.carry = chunk.into_bytes();
            } else {
                self.carry.extend_from_slice(chunk.bytes());
            }
            self.carry_stalled = false;
            self.state = CursorState::NeedMoreData;
        }
    }

    fn fail_corrupt(&mut self, reason: impl Into<String>) -> Error {
        let reason = reason.into();
        let offset = self.decoded_bytes;
        self.state = CursorState::ExhaustedCorrupt {
            offset,
            reason: reason.clone(),
        };
        self.source.close();
        debug!(
            path = %self.source.path().display(),
            offset,
            reason = %reason,
            "run corrupt"
        );
        Error::CorruptRun {
            path: self.source.path().to_path_buf(),
            offset,
            reason,
        }
    }

    fn fail_io(&mut self, e: io::Error) -> Error {
        self.state = CursorState::Poisoned {
            message: e.to_string(),
        };
        self.source.close();
        debug!(path = %self.source.path().display(), error = %e, "run read failed");
        Error::Io(e)
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            CursorState::ExhaustedClean
                | CursorState::ExhaustedCorrupt { .. }
                | CursorState::Poisoned { .. }
        )
    }

    /// Reconstruct the error recorded in a failed terminal state.
    fn terminal_error(&self) -> Error {
        match &self.state {
            CursorState::ExhaustedCorrupt { offset, reason } => Error::CorruptRun {
                path: self.source.path().to_path_buf(),
                offset: *offset,
                reason: reason.clone(),
            },
            CursorState::Poisoned { message } => Error::Io(io::Error::other(format!(
                "run cursor poisoned by earlier failure: {message}"
            ))),
            _ => Error::Exhausted,
        }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Chunk reads and bytes read so far for this run.
    pub fn io_stats(&self) -> IoStats {
        self.source.stats()
    }

    /// Bytes consumed by successful decodes so far.
    pub fn bytes_decoded(&self) -> u64 {
        self.decoded_bytes
    }

    /// Bytes currently held in the carry-over buffer.
    ///
    /// Together with [`bytes_decoded`](RunCursor::bytes_decoded) and the
    /// source's unread remainder this always accounts for the run's full
    /// declared length.
    pub fn buffered_bytes(&self) -> usize {
        self.carry.len()
    }

    /// Adapt the cursor into an iterator of `Result<Record>`. The
    /// iterator fuses after yielding an error.
    pub fn into_records(self) -> RunRecords<C> {
        RunRecords {
            cursor: self,
            done: false,
        }
    }
}

/// Iterator adapter over a [`RunCursor`], for heap-based merges that
/// prefer `Iterator` to the `has_next`/`next` pair.
pub struct RunRecords<C: RecordCodec> {
    cursor: RunCursor<C>,
    done: bool,
}

impl<C: RecordCodec> Iterator for RunRecords<C> {
    type Item = Result<C::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.has_next() {
            Ok(true) => match self.cursor.next() {
                Ok(record) => Some(Ok(record)),
                Err(e) => {
                    self.done = true;
                    Some(Err(e))
                }
            },
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
