//! The storage engine boundary.
//!
//! The importer never touches physical table layout. It reads and writes rows through the
//! [`TableStore`] capability trait, addressed by `(column, 1-based row)`, and asks the engine for
//! sorted range lookups that an engine is free to decline with [`RangeLookup::Unsupported`].
//!
//! # Key Components
//!
//! - [`TableStore`] - The capability interface an engine implements
//! - [`CellValue`] - A decoded column value, heap indices already resolved
//! - [`RangeLookup`] - Result of a sorted-key query
//! - [`MemoryTables`] - The in-memory engine shipped with this crate
//! - [`ImageBuilder`] - Fluent construction of in-memory images
//!
//! # Thread Safety
//!
//! Engines are `Send + Sync` and are only ever used behind the lock owned by
//! [`crate::metadata::image::Image`]; they perform no locking of their own.

mod builder;
mod memory;

pub use builder::ImageBuilder;
pub use memory::MemoryTables;

use uguid::Guid;

use crate::{
    metadata::{
        tables::{Column, TableId},
        token::Token,
    },
    Result,
};

/// A decoded column value.
///
/// Heap-backed columns are resolved to owned data, so a value stays valid after the lock that
/// guarded the read has been released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Flags, versions and other fixed-size constants
    Constant(u32),
    /// A `#Strings` heap entry
    String(String),
    /// A `#Blob` heap entry
    Blob(Vec<u8>),
    /// A `#GUID` heap entry
    Guid(Guid),
    /// A table, coded or list index, expressed as a token
    Token(Token),
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Constant(value)
    }
}

impl From<u16> for CellValue {
    fn from(value: u16) -> Self {
        CellValue::Constant(u32::from(value))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&[u8]> for CellValue {
    fn from(value: &[u8]) -> Self {
        CellValue::Blob(value.to_vec())
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(value: Vec<u8>) -> Self {
        CellValue::Blob(value)
    }
}

impl From<Guid> for CellValue {
    fn from(value: Guid) -> Self {
        CellValue::Guid(value)
    }
}

impl From<Token> for CellValue {
    fn from(value: Token) -> Self {
        CellValue::Token(value)
    }
}

/// Result of a sorted-key range query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeLookup {
    /// Rows `start..end` (1-based, end exclusive) carry the key
    Range {
        /// First matching row
        start: u32,
        /// One past the last matching row
        end: u32,
    },
    /// The table is sorted by the column and no row carries the key
    NotFound,
    /// The engine can not answer this query with a range, the caller must scan
    Unsupported,
}

/// The capability interface of a metadata table and heap storage engine.
///
/// Rows are addressed by `(table, 1-based row)`; columns by [`Column`], which also names the
/// table. Engines must keep every row they hand out fully populated: a row becomes visible
/// through [`TableStore::row_count`] only once [`TableStore::append_row`] has written all of
/// its columns.
pub trait TableStore: Send + Sync {
    /// Number of rows in `table`
    fn row_count(&self, table: TableId) -> u32;

    /// Read the value of `column` in `row`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if the row does not exist.
    fn get(&self, row: u32, column: Column) -> Result<CellValue>;

    /// Overwrite the value of `column` in `row`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if the row does not exist, or
    /// [`crate::Error::InvalidArgument`] if the value does not fit the column.
    fn set(&mut self, row: u32, column: Column, value: CellValue) -> Result<()>;

    /// Append a row to `table` with the given column values, returning its row index.
    /// Columns not mentioned are zero (empty string, empty blob, Nil token).
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if a column belongs to another table or a
    /// value does not fit its column.
    fn append_row(&mut self, table: TableId, values: &[(Column, CellValue)]) -> Result<u32>;

    /// Find the rows whose `column` equals `key` in a table sorted by `column`
    ///
    /// # Errors
    /// Returns an error only if the engine fails; an unsorted table yields
    /// [`RangeLookup::Unsupported`].
    fn find_range(&self, column: Column, key: &CellValue) -> Result<RangeLookup>;

    /// Map an index in the logical list space of `table` to its row, following the pointer
    /// table when one is present
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if the pointer row does not exist.
    fn resolve_indirect(&self, table: TableId, index: u32) -> Result<u32>;

    /// Returns true if list columns into `table` go through a pointer table
    fn has_indirection(&self, table: TableId) -> bool;
}
