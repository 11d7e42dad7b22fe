//! The `#Blob` heap.
//!
//! Entries are stored back to back, each prefixed with its compressed length. Offset 0 always
//! holds the empty blob. Appending a blob that already exists returns the existing offset, so
//! the heap never holds two identical entries.

use std::collections::HashMap;

use crate::{
    utils::{write_compressed_uint, Parser},
    Result,
};

/// An owned, append-only `#Blob` heap
#[derive(Debug, Clone)]
pub struct BlobHeap {
    data: Vec<u8>,
    offsets: HashMap<Vec<u8>, u32>,
}

impl BlobHeap {
    /// Create a heap holding only the empty blob at offset 0
    #[must_use]
    pub fn new() -> Self {
        BlobHeap {
            data: vec![0],
            offsets: HashMap::from([(Vec::new(), 0)]),
        }
    }

    /// Returns the blob stored at `offset`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the entry at `offset` does not fit in the heap.
    pub fn get(&self, offset: u32) -> Result<&[u8]> {
        let offset = offset as usize;
        if offset >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[offset..]);
        let len = parser.read_compressed_uint()? as usize;
        parser.read_bytes(len)
    }

    /// Append `blob`, returning its offset. Identical blobs share one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfMemory`] if the heap can not grow, or
    /// [`crate::Error::InvalidArgument`] if the blob is too large to be length-prefixed.
    pub fn add(&mut self, blob: &[u8]) -> Result<u32> {
        if let Some(offset) = self.offsets.get(blob) {
            return Ok(*offset);
        }

        let offset = u32::try_from(self.data.len()).map_err(|_| crate::Error::OutOfMemory)?;
        let len = u32::try_from(blob.len()).map_err(|_| crate::Error::OutOfMemory)?;

        let mut entry = Vec::new();
        entry.try_reserve(blob.len() + 4)?;
        write_compressed_uint(len, &mut entry)?;
        entry.extend_from_slice(blob);

        self.data.try_reserve(entry.len())?;
        self.data.extend_from_slice(&entry);
        self.offsets.insert(blob.to_vec(), offset);

        Ok(offset)
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds only the empty blob
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }
}

impl Default for BlobHeap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_blob() {
        let heap = BlobHeap::new();
        assert_eq!(heap.get(0).unwrap(), &[] as &[u8]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_add_and_get() {
        let mut heap = BlobHeap::new();
        let first = heap.add(&[0x06, 0x08]).unwrap();
        let second = heap.add(&[0x20, 0x00, 0x01]).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 4);
        assert_eq!(heap.get(first).unwrap(), &[0x06, 0x08]);
        assert_eq!(heap.get(second).unwrap(), &[0x20, 0x00, 0x01]);
        assert_eq!(heap.add(&[]).unwrap(), 0);
    }

    #[test]
    fn test_deduplication() {
        let mut heap = BlobHeap::new();
        let first = heap.add(&[1, 2, 3]).unwrap();
        let len = heap.len();
        assert_eq!(heap.add(&[1, 2, 3]).unwrap(), first);
        assert_eq!(heap.len(), len);
    }

    #[test]
    fn test_large_blob_uses_long_prefix() {
        let mut heap = BlobHeap::new();
        let blob = vec![0xAB; 300];
        let offset = heap.add(&blob).unwrap();
        assert_eq!(heap.len(), 1 + 2 + 300);
        assert_eq!(heap.get(offset).unwrap(), blob.as_slice());
    }

    #[test]
    fn test_out_of_bounds() {
        let heap = BlobHeap::new();
        assert!(matches!(heap.get(10), Err(crate::Error::OutOfBounds)));
    }
}
