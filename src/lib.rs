// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotlink
//!
//! Cross-module and cross-assembly reference import for ECMA-335 metadata.
//!
//! When a linker, a compiler back end or a metadata merge tool moves code from one .NET module
//! into another, every token the code mentions has to be re-expressed in terms of the
//! destination module: type definitions become `TypeRef` rows under the right `ModuleRef` or
//! `AssemblyRef`, type references are re-scoped, type specifications and member signatures are
//! rewritten with translated tokens. `dotlink` implements that translation on top of a small,
//! shareable metadata facade.
//!
//! ## Features
//!
//! - **Reference import** - `TypeDef`, `TypeRef`, `TypeSpec` and member import across modules
//!   and assemblies, including nested types, type forwarders and references that point back
//!   at the destination assembly
//! - **Signature codec** - Token-rewriting walk over every ECMA-335 signature kind, plus vararg
//!   call-site projection
//! - **Strong names** - Public key validation and public key token computation
//! - **Assembly resolution** - Finding the `AssemblyRef` row that names an identity
//! - **Shared images** - Lock-guarded table storage usable from many threads at once
//!
//! ## Quick Start
//!
//! ```rust
//! use dotlink::prelude::*;
//! use uguid::guid;
//!
//! // the source assembly defines Lib.Widget
//! let mut lib = ImageBuilder::new("Lib.dll", guid!("5a0e1c9d-7b32-4f0e-9d1a-2c3b4d5e6f01"))?;
//! lib.assembly(&AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0)))?;
//! let widget = lib.type_def("Lib", "Widget", 0)?;
//! let lib = lib.build();
//!
//! // the destination assembly is an empty application
//! let mut app = ImageBuilder::new("App.exe", guid!("5a0e1c9d-7b32-4f0e-9d1a-2c3b4d5e6f02"))?;
//! app.assembly(&AssemblyIdentity::new("App", AssemblyVersion::new(1, 0, 0, 0)))?;
//! let app = app.build();
//!
//! let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone());
//! let type_ref = context.import_reference_to_type_def_or_ref_or_spec(widget, &mut |row| {
//!     println!("added {}", row);
//! })?;
//!
//! assert_eq!(app.get_string(type_ref, Column::TypeRefNamespace)?, "Lib");
//! # Ok::<(), dotlink::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Tokens, tables, storage, enumeration, identities and signatures
//! - [`import`] - The reference importer
//! - [`utils`] - Compressed integer encoding and the byte [`Parser`]
//!
//! All fallible operations return [`Result`]; every failure is one of the [`Error`] variants.
//! Diagnostic output goes through the [`log`](https://docs.rs/log) facade: row creation is
//! logged at `trace`, import decisions at `debug`.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotlink::prelude::*;
///
/// let token = StrongNameToken::from_public_key(&ECMA_PUBLIC_KEY)?;
/// assert_eq!(token.to_string(), "b77a5c561934e089");
/// # Ok::<(), dotlink::Error>(())
/// ```
pub mod prelude;

/// Cross-module and cross-assembly reference import
pub mod import;

/// Metadata representation based on ECMA-335
///
/// # Key Components
///
/// - [`metadata::image::Image`] - Shared handle to the tables of one module
/// - [`metadata::storage`] - The storage trait, the in-memory engine and the image builder
/// - [`metadata::identity`] - Assembly identities and strong name tokens
/// - [`metadata::signatures`] - The signature codec
/// - [`metadata::token`] - Metadata tokens
pub mod metadata;

/// Byte-level helpers: the [`Parser`] and the compressed integer writers
pub mod utils;

/// `dotlink` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use dotlink::{metadata::identity::StrongNameToken, Result};
///
/// fn token_of(key: &[u8]) -> Result<String> {
///     Ok(StrongNameToken::from_public_key(key)?.to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `dotlink` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dotlink::{metadata::signatures::import_signature, Error, Token};
///
/// let mut keep = |token: Token| -> dotlink::Result<Token> { Ok(token) };
/// match import_signature(&[0x06, 0x21], &mut keep, 64) {
///     Ok(blob) => println!("{} bytes", blob.len()),
///     Err(Error::CorruptMetadata { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// The importer entry point and its options.
///
/// See [`import::ImportContext`].
pub use import::{ImportContext, ImportOptions};

/// The shared image handle.
///
/// See [`metadata::image::Image`].
pub use metadata::image::Image;

/// Metadata token type, see [`metadata::token::Token`].
pub use metadata::token::Token;

/// Provides access to low-level blob parsing.
///
/// # Example
///
/// ```rust
/// use dotlink::Parser;
/// let blob = [0x81, 0x00];
/// let mut parser = Parser::new(&blob);
/// assert_eq!(parser.read_compressed_uint()?, 0x100);
/// # Ok::<(), dotlink::Error>(())
/// ```
pub use utils::Parser;
