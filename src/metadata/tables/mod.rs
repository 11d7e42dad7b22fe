//! Metadata table identifiers, column addressing and flag constants.
//!
//! This module describes the shape of the tables without owning any rows; rows live behind
//! the [`crate::metadata::storage::TableStore`] trait.
//!
//! # Key Components
//!
//! - [`TableId`] - The ECMA-335 table kinds, high byte of every token
//! - [`Column`] / [`ColumnKind`] - Typed addressing of the columns the importer touches
//! - [`CodedIndexType`] - Multi-table index columns and their encoding
//! - [`AssemblyFlags`], [`AssemblyHashAlgorithm`], [`TypeAttributes`], [`FileAttributes`] - Flag values

mod codedindex;
mod column;
mod flags;
mod tableid;

pub use codedindex::CodedIndexType;
pub use column::{Column, ColumnKind};
pub use flags::{AssemblyFlags, AssemblyHashAlgorithm, FileAttributes, TypeAttributes};
pub use tableid::TableId;
