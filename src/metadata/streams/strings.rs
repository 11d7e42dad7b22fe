//! The `#Strings` heap.
//!
//! NUL-terminated UTF-8 strings addressed by byte offset. Offset 0 is the empty string.

use std::collections::HashMap;

use crate::Result;

/// An owned, append-only `#Strings` heap
#[derive(Debug, Clone)]
pub struct StringHeap {
    data: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringHeap {
    /// Create a heap holding only the empty string at offset 0
    #[must_use]
    pub fn new() -> Self {
        StringHeap {
            data: vec![0],
            offsets: HashMap::from([(String::new(), 0)]),
        }
    }

    /// Returns the string starting at `offset`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset` lies outside the heap, or
    /// [`crate::Error::CorruptMetadata`] if the entry is unterminated or not UTF-8.
    pub fn get(&self, offset: u32) -> Result<&str> {
        let offset = offset as usize;
        if offset >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let tail = &self.data[offset..];
        let Some(end) = tail.iter().position(|b| *b == 0) else {
            return Err(corrupt_error!("Unterminated string at offset {}", offset));
        };

        std::str::from_utf8(&tail[..end])
            .map_err(|_| corrupt_error!("Invalid UTF-8 string at offset {}", offset))
    }

    /// Append `value`, returning its offset. Identical strings share one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `value` contains a NUL byte, or
    /// [`crate::Error::OutOfMemory`] if the heap can not grow.
    pub fn add(&mut self, value: &str) -> Result<u32> {
        if let Some(offset) = self.offsets.get(value) {
            return Ok(*offset);
        }

        if value.contains('\0') {
            return Err(crate::Error::InvalidArgument(format!(
                "string {:?} contains a NUL byte",
                value
            )));
        }

        let offset = u32::try_from(self.data.len()).map_err(|_| crate::Error::OutOfMemory)?;
        self.data.try_reserve(value.len() + 1)?;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_string(), offset);

        Ok(offset)
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds only the empty string
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }
}

impl Default for StringHeap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut heap = StringHeap::new();
        let name = heap.add("Bar").unwrap();
        let namespace = heap.add("Foo").unwrap();

        assert_eq!(name, 1);
        assert_eq!(namespace, 5);
        assert_eq!(heap.get(name).unwrap(), "Bar");
        assert_eq!(heap.get(namespace).unwrap(), "Foo");
        assert_eq!(heap.get(0).unwrap(), "");
        assert_eq!(heap.add("").unwrap(), 0);
    }

    #[test]
    fn test_suffix_offsets() {
        let mut heap = StringHeap::new();
        let offset = heap.add("System").unwrap();
        assert_eq!(heap.get(offset + 3).unwrap(), "tem");
    }

    #[test]
    fn test_deduplication() {
        let mut heap = StringHeap::new();
        let first = heap.add("mscorlib").unwrap();
        assert_eq!(heap.add("mscorlib").unwrap(), first);
        assert_eq!(heap.len(), 1 + "mscorlib".len() + 1);
    }

    #[test]
    fn test_rejects_nul() {
        let mut heap = StringHeap::new();
        assert!(heap.add("a\0b").is_err());
    }

    #[test]
    fn test_out_of_bounds() {
        let heap = StringHeap::new();
        assert!(matches!(heap.get(1), Err(crate::Error::OutOfBounds)));
    }
}
