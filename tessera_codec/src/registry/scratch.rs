use crate::codec::{Codec, Encoding};
use std::cmp;
use tessera_types::Datum;
use tracing::warn;

/// One upper-bound allocation, reused by every encode whose size is not known upfront.
///
/// Exclusive access is enforced by `&mut self`. Between uses the region is all zeros.
#[derive(Debug)]
pub struct ScratchBuffer {
    buf: Vec<u8>,
}

impl ScratchBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Encodes `dat` here, then copies out exactly the bytes the encoding used.
    ///
    /// A value larger than the capacity is degraded the same way as in any other
    /// too-short buffer.
    pub fn encode(&mut self, codec: &Codec, dat: &Datum) -> Vec<u8> {
        let needed = codec.encoded_len(dat);
        let w_len = codec.encode_fresh(dat, &mut self.buf);
        if needed > w_len {
            warn!(
                needed,
                written = w_len,
                capacity = self.capacity(),
                "Scratch capacity exceeded; trailing data dropped"
            );
        }
        let out = self.buf[..w_len].to_vec();

        // Nothing writes past the full encoded size, so this restores all zeros.
        let touched = cmp::min(cmp::max(needed, w_len), self.buf.len());
        self.buf[..touched].fill(0);
        out
    }
}
