use derive_more::{Deref, From};
use std::mem;

pub const HEADER_INT_LEN: usize = mem::size_of::<u32>();

/// A little-endian `u32` header field: an item count, an end offset, or a used length.
#[derive(From, Deref, PartialEq, Eq, Clone, Copy, Debug)]
pub struct HeaderInt(u32);

impl HeaderInt {
    pub fn from_len(len: usize) -> Self {
        Self(u32::try_from(len).unwrap_or(u32::MAX))
    }

    pub fn read(bytes: &[u8], at: usize) -> Option<Self> {
        let buf = bytes.get(at..at + HEADER_INT_LEN)?;
        let mut int = [0u8; HEADER_INT_LEN];
        int.copy_from_slice(buf);
        Some(Self(u32::from_le_bytes(int)))
    }

    /// Reads a header field, treating a truncated buffer as zero.
    pub fn read_len(bytes: &[u8], at: usize) -> usize {
        Self::read(bytes, at).map_or(0, Self::as_usize)
    }

    /// @return Whether the field fit in `bytes`.
    pub fn write(self, bytes: &mut [u8], at: usize) -> bool {
        match bytes.get_mut(at..at + HEADER_INT_LEN) {
            None => false,
            Some(buf) => {
                buf.copy_from_slice(&self.0.to_le_bytes());
                true
            }
        }
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}
