#![allow(dead_code)]

use std::fs;

use run_reader::{KvRecord, RunDescriptor};

/// Build `count` small distinct key-value records.
pub fn sample_records(count: usize) -> Vec<KvRecord> {
    (0..count)
        .map(|i| {
            KvRecord::new(
                format!("key{i:04}").into_bytes(),
                format!("val{i:04}").into_bytes(),
            )
        })
        .collect()
}

/// Concatenated encoded length of `records`.
pub fn encoded_len(records: &[KvRecord]) -> u64 {
    records.iter().map(|r| r.encoded_size() as u64).sum()
}

/// Write `records` as one run file under `dir`, returning its descriptor.
pub fn write_run(
    dir: &tempfile::TempDir,
    name: &str,
    records: &[KvRecord],
    chunk_size: usize,
) -> RunDescriptor {
    let path = dir.path().join(name);
    let mut bytes = Vec::new();
    for record in records {
        bytes.extend_from_slice(&record.encode());
    }
    fs::write(&path, &bytes).unwrap();
    RunDescriptor::new(path, bytes.len() as u64, chunk_size)
}
