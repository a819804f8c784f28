use crate::run::codec::{DecodeOne, RecordCodec};

/// Why a [`decode_all`] pass stopped.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The window was decoded down to zero leftover bytes.
    Complete,
    /// The trailing bytes are the partial start of another record; the
    /// caller must keep them and retry once more bytes arrive.
    NeedMoreData,
    /// The trailing bytes cannot be a valid record start.
    Corrupt { reason: String },
}

/// Result of decoding as many complete records as possible from the
/// front of a window. `consumed` covers only the fully decoded prefix;
/// the suffix `buf[consumed..]` is the caller's carry-over.
#[derive(Debug)]
pub struct DecodeBatch<R> {
    pub records: Vec<R>,
    pub consumed: usize,
    pub status: DecodeStatus,
}

/// Decode records off the front of `buf` until it is exhausted, starved,
/// or corrupt. Pure: all state lives in the caller.
///
/// A codec that reports consuming zero bytes or more bytes than it was
/// given would stall or overrun the carry accounting, so either is
/// surfaced as corruption instead of being trusted.
pub fn decode_all<C: RecordCodec>(codec: &C, buf: &[u8]) -> DecodeBatch<C::Record> {
    let mut records = Vec::new();
    let mut consumed = 0;

    loop {
        let window = &buf[consumed..];
        if window.is_empty() {
            return DecodeBatch {
                records,
                consumed,
                status: DecodeStatus::Complete,
            };
        }

        match codec.decode_one(window) {
            DecodeOne::Record { record, consumed: n } => {
                if n == 0 || n > window.len() {
                    return DecodeBatch {
                        records,
                        consumed,
                        status: DecodeStatus::Corrupt {
                            reason: format!(
                                "codec claimed {n} bytes from a {} byte window",
                                window.len()
                            ),
                        },
                    };
                }
                records.push(record);
                consumed += n;
            }
            DecodeOne::NeedMoreBytes => {
                return DecodeBatch {
                    records,
                    consumed,
                    status: DecodeStatus::NeedMoreData,
                };
            }
            DecodeOne::Corrupt { reason } => {
                return DecodeBatch {
                    records,
                    consumed,
                    status: DecodeStatus::Corrupt { reason },
                };
            }
        }
    }
}
