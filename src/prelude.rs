//! # dotlink Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotlink library. Import this module to get quick access to the essential
//! types for building images and importing references.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotlink operations
pub use crate::Error;

/// The result type used throughout dotlink
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Reference import
pub use crate::import::{ImportContext, ImportOptions};

/// Shared image handle and the in-memory engine behind it
pub use crate::metadata::{
    image::Image,
    storage::{CellValue, ImageBuilder, MemoryTables, RangeLookup, TableStore},
};

/// Low-level blob parsing
pub use crate::Parser;

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Table identifiers, columns and flags
pub use crate::metadata::tables::{
    AssemblyFlags, AssemblyHashAlgorithm, CodedIndexType, Column, ColumnKind, FileAttributes,
    TableId, TypeAttributes,
};

/// Row enumeration
pub use crate::metadata::{cursor::Cursor, enumerator::TokenEnum};

// ================================================================================================
// Identity and Signatures
// ================================================================================================

/// Assembly identities and strong names
pub use crate::metadata::identity::{
    assembly_ref_points_to_assembly, find_assembly_ref, AssemblyIdentity, AssemblyVersion,
    StrongNameToken, VersionMatcher, ECMA_PUBLIC_KEY,
};

/// Signature codec
pub use crate::metadata::signatures::{
    import_signature, import_type_spec_blob, project_method_def_sig, TokenTranslator,
};
