use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of read-side I/O counters.
///
/// `reads` counts chunk-read operations, `bytes_read` the bytes they
/// returned. The owning sort job uses these to attribute I/O cost to
/// individual runs or to a whole merge pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub bytes_read: u64,
}

impl fmt::Display for IoStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reads={}, bytes_read={}", self.reads, self.bytes_read)
    }
}

/// Shared, thread-safe I/O counter.
///
/// Cloning is cheap and all clones feed the same counters, so one tracker
/// handed to every cursor of a merge pass aggregates the pass's total
/// read cost. Counters are write-only from the cursor side; consumers
/// call [`snapshot`](IoStatsTracker::snapshot).
#[derive(Debug, Clone, Default)]
pub struct IoStatsTracker {
    reads: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
}

impl IoStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chunk read that returned `bytes` bytes.
    pub fn record_read(&self, bytes: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Current counter values.
    pub fn snapshot(&self) -> IoStats {
        IoStats {
            reads: self.reads.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}
