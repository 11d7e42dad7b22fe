//! Metadata representation and manipulation for ECMA-335 images.
//!
//! This module holds everything the importer needs below the import logic itself: tokens and
//! table descriptions, the row storage facade, enumeration of rows, content lookups, row
//! emission, assembly identities and the signature codec.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references
//! - [`tables`] - Table identifiers, columns, coded indices and flag values
//! - [`streams`] - Owned string, blob and GUID heaps
//! - [`storage`] - The [`storage::TableStore`] trait, the in-memory engine and a builder
//! - [`image`] - The shared, lock-guarded [`image::Image`] facade
//! - [`cursor`] / [`enumerator`] - Row positions and token enumerations
//! - [`identity`] - Assembly identities and strong name tokens
//! - [`signatures`] - Signature rewriting
//!
//! # Examples
//!
//! ```rust
//! use dotlink::metadata::{storage::ImageBuilder, tables::TableId};
//! use uguid::guid;
//!
//! let mut builder = ImageBuilder::new("Lib.dll", guid!("6d6f7a7b-4d61-4a8a-9f1c-31c6d9e8a001"))?;
//! builder.type_def("Lib", "Widget", 0)?;
//! let image = builder.build();
//!
//! assert_eq!(image.row_count(TableId::TypeDef)?, 2);
//! assert!(image.find_type_def("Lib", "Widget", None)?.is_some());
//! # Ok::<(), dotlink::Error>(())
//! ```

/// Row positions inside a table
pub mod cursor;
mod emit;
/// Token enumerations over contiguous ranges or collected lists
pub mod enumerator;
/// Assembly identities, strong name tokens and `AssemblyRef` resolution
pub mod identity;
/// The shared image facade
pub mod image;
mod lookup;
/// Signature rewriting
pub mod signatures;
/// Row storage engines
pub mod storage;
/// Owned metadata heaps
pub mod streams;
/// Table identifiers, columns and flags
pub mod tables;
/// Commonly used metadata token type
pub mod token;
