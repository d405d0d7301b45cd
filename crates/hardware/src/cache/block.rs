//! Cache block (line) state.

/// One cache line.
///
/// All blocks start invalid. A block becomes valid when it is filled on a miss and is
/// overwritten when its set is full and a newer block must be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Holds meaningful data.
    pub valid: bool,
    /// Differs from the next level's copy (only meaningful under write-back).
    pub modified: bool,
    /// High-order address bits of the memory block held in this slot.
    pub tag: u32,
    /// Set this slot belongs to. Redundant with the slot's position; checked on every lookup.
    pub set_id: u32,
    /// Reference-counter value at the last touch; the smallest value in a set is the LRU block.
    pub last_reference: u64,
    /// Block contents, `block_size` bytes.
    pub data: Vec<u8>,
}

impl Block {
    /// Creates an invalid, zero-filled block belonging to `set_id`.
    pub fn empty(set_id: u32, block_size: u32) -> Self {
        Self {
            valid: false,
            modified: false,
            tag: 0,
            set_id,
            last_reference: 0,
            data: vec![0; block_size as usize],
        }
    }

    /// Creates a freshly filled, clean block.
    pub const fn filled(tag: u32, set_id: u32, last_reference: u64, data: Vec<u8>) -> Self {
        Self {
            valid: true,
            modified: false,
            tag,
            set_id,
            last_reference,
            data,
        }
    }

    /// Returns `true` if evicting this block requires a write-back under write-back policy.
    #[inline]
    pub const fn is_dirty(&self) -> bool {
        self.valid && self.modified
    }
}
