use crate::types::{Key, Value};

/// Outcome of attempting to decode one record from the front of a byte
/// window.
#[derive(Debug)]
pub enum DecodeOne<R> {
    /// A complete record occupying the first `consumed` bytes.
    Record { record: R, consumed: usize },
    /// The window ends partway through a record; the caller must supply
    /// more bytes before retrying.
    NeedMoreBytes,
    /// The window cannot be the start of a valid record.
    Corrupt { reason: String },
}

/// The decode seam between the run layer and the record serialization.
///
/// A codec is driven purely by its own framing — it must never assume a
/// length prefix unless its format has one, and it holds no state across
/// calls; all buffering lives in the caller. `decode_one` inspects only
/// the front of `buf` and never needs lookahead past the record's own
/// end.
pub trait RecordCodec {
    type Record;

    fn decode_one(&self, buf: &[u8]) -> DecodeOne<Self::Record>;
}

/// A key-value record in the default run format.
///
/// On-disk format:
/// ```text
/// ┌──────────┬────────────┬────────────┬───────────┬───────────┐
/// │ CRC (4B) │ Key Len(4B)│ Val Len(4B)│ Key (var) │ Val (var) │
/// └──────────┴────────────┴────────────┴───────────┴───────────┘
/// ```
///
/// CRC covers everything after the CRC field itself, so a damaged length
/// field is caught as a checksum mismatch rather than a wild read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvRecord {
    pub key: Key,
    pub value: Value,
}

// Header sizes
const CRC_SIZE: usize = 4;
const KEY_LEN_SIZE: usize = 4;
const VAL_LEN_SIZE: usize = 4;
const HEADER_SIZE: usize = CRC_SIZE + KEY_LEN_SIZE + VAL_LEN_SIZE;

impl KvRecord {
    pub fn new(key: Key, value: Value) -> Self {
        KvRecord { key, value }
    }

    /// Serialize this record to bytes (including CRC header).
    pub fn encode(&self) -> Vec<u8> {
        let total_len = self.encoded_size();
        let mut buf = Vec::with_capacity(total_len);

        // Reserve space for CRC (filled at the end)
        buf.extend_from_slice(&[0u8; CRC_SIZE]);

        buf.extend_from_slice(&(self.key.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(self.value.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);

        // CRC over everything after the CRC field
        let crc = crc32fast::hash(&buf[CRC_SIZE..]);
        buf[0..CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        buf
    }

    /// Size of this record when serialized on disk.
    pub fn encoded_size(&self) -> usize {
        HEADER_SIZE + self.key.len() + self.value.len()
    }
}

/// Codec for the default key-value run format.
#[derive(Debug, Clone, Copy, Default)]
pub struct KvCodec;

impl RecordCodec for KvCodec {
    type Record = KvRecord;

    fn decode_one(&self, buf: &[u8]) -> DecodeOne<KvRecord> {
        if buf.len() < HEADER_SIZE {
            return DecodeOne::NeedMoreBytes;
        }

        let stored_crc = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let key_len = u32::from_le_bytes(buf[4..8].try_into().unwrap()) as usize;
        let val_len = u32::from_le_bytes(buf[8..12].try_into().unwrap()) as usize;

        // u64 arithmetic: the lengths are attacker-controlled bytes and
        // must not overflow the total on 32-bit targets.
        let total = HEADER_SIZE as u64 + key_len as u64 + val_len as u64;
        if (buf.len() as u64) < total {
            return DecodeOne::NeedMoreBytes;
        }
        let total = total as usize;

        let computed_crc = crc32fast::hash(&buf[CRC_SIZE..total]);
        if stored_crc != computed_crc {
            return DecodeOne::Corrupt {
                reason: "record checksum mismatch".into(),
            };
        }

        let key_start = HEADER_SIZE;
        let val_start = key_start + key_len;
        let record = KvRecord {
            key: buf[key_start..val_start].to_vec(),
            value: buf[val_start..total].to_vec(),
        };

        DecodeOne::Record {
            record,
            consumed: total,
        }
    }
}
