//! The `#GUID` heap.
//!
//! 16-byte entries addressed by a 1-based index; index 0 means "no GUID".

use uguid::Guid;

use crate::Result;

/// An owned, append-only `#GUID` heap
#[derive(Debug, Clone, Default)]
pub struct GuidHeap {
    entries: Vec<Guid>,
}

impl GuidHeap {
    /// Create an empty heap
    #[must_use]
    pub fn new() -> Self {
        GuidHeap {
            entries: Vec::new(),
        }
    }

    /// Returns the GUID at the 1-based `index`, the zero GUID for index 0
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` exceeds the number of entries.
    pub fn get(&self, index: u32) -> Result<Guid> {
        if index == 0 {
            return Ok(Guid::ZERO);
        }

        self.entries
            .get(index as usize - 1)
            .copied()
            .ok_or(out_of_bounds_error!())
    }

    /// Append `guid`, returning its 1-based index. Identical GUIDs share one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfMemory`] if the heap can not grow.
    pub fn add(&mut self, guid: Guid) -> Result<u32> {
        if let Some(position) = self.entries.iter().position(|entry| *entry == guid) {
            return Ok(position as u32 + 1);
        }

        self.entries.try_reserve(1)?;
        self.entries.push(guid);
        u32::try_from(self.entries.len()).map_err(|_| crate::Error::OutOfMemory)
    }

    /// Number of GUIDs in the heap
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the heap holds no GUID
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
