//! Cross-module and cross-assembly reference import.
//!
//! An [`ImportContext`] ties together four images: the module a token was read from, the
//! manifest module of that module's assembly, the module the reference is emitted into and the
//! manifest module of the destination assembly. A single module assembly simply passes the
//! same [`Image`] twice.
//!
//! Importing a token produces the token that names the same entity from the destination
//! module's point of view, creating `AssemblyRef`, `ModuleRef`, `TypeRef`, `TypeSpec` and
//! `MemberRef` rows as needed. Existing rows are found and reused wherever the content matches.
//! Every row created is reported through the `on_row_added` callback after it is fully written.
//!
//! # Key Components
//!
//! - [`ImportContext`] - The four images and the options of an import
//! - [`ImportOptions`] - Depth limit and reuse switches
//!
//! # Examples
//!
//! ```rust
//! use dotlink::{
//!     metadata::{identity::{AssemblyIdentity, AssemblyVersion}, storage::ImageBuilder, tables::{Column, TableId}},
//!     ImportContext,
//! };
//! use uguid::guid;
//!
//! let mut lib = ImageBuilder::new("Lib.dll", guid!("0b2a5d36-1f0e-4c1a-9d62-6b3c7e5a1001"))?;
//! lib.assembly(&AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0)))?;
//! let widget = lib.type_def("Lib", "Widget", 0)?;
//! let lib = lib.build();
//!
//! let mut app = ImageBuilder::new("App.exe", guid!("0b2a5d36-1f0e-4c1a-9d62-6b3c7e5a2002"))?;
//! app.assembly(&AssemblyIdentity::new("App", AssemblyVersion::new(1, 0, 0, 0)))?;
//! let app = app.build();
//!
//! let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone());
//! let mut added = Vec::new();
//! let type_ref = context.import_reference_to_type_def(widget, false, &mut |token| added.push(token))?;
//!
//! assert!(type_ref.is_table(TableId::TypeRef));
//! assert_eq!(app.get_string(type_ref, Column::TypeRefName)?, "Widget");
//! assert_eq!(added.len(), 2); // AssemblyRef + TypeRef
//! # Ok::<(), dotlink::Error>(())
//! ```

mod assembly;
mod member;
mod options;
mod scope;
mod typedef;
mod typeref;

pub use options::ImportOptions;

use std::fmt;

use crate::{
    metadata::{
        image::Image,
        signatures,
        tables::{Column, TableId},
        token::Token,
    },
    Error, Result,
};

/// How the source module relates to the destination module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    /// Both are the same module of the same assembly
    SameModule,
    /// Different modules of one assembly
    SameAssembly,
    /// Different assemblies
    DifferentAssembly,
}

/// Namespace and name of one level of a type chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeName {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

/// The images taking part in an import and the options steering it.
///
/// All images are shared handles, so a context is cheap to build per import and may be used
/// from several threads at once. Two contexts importing into the same destination at the same
/// time can both create an equal row; either row is a valid reference.
#[derive(Debug, Clone)]
pub struct ImportContext {
    source_assembly: Image,
    source_module: Image,
    source_assembly_hash: Vec<u8>,
    dest_assembly: Image,
    dest_module: Image,
    options: ImportOptions,
}

impl ImportContext {
    /// Create a context importing from `source_module` (whose manifest lives in
    /// `source_assembly`) into `dest_module` (whose manifest lives in `dest_assembly`)
    #[must_use]
    pub fn new(
        source_assembly: Image,
        source_module: Image,
        dest_assembly: Image,
        dest_module: Image,
    ) -> Self {
        ImportContext {
            source_assembly,
            source_module,
            source_assembly_hash: Vec::new(),
            dest_assembly,
            dest_module,
            options: ImportOptions::default(),
        }
    }

    /// Hash value stored in `AssemblyRef` rows created for the source assembly
    #[must_use]
    pub fn with_source_assembly_hash(mut self, hash: &[u8]) -> Self {
        self.source_assembly_hash = hash.to_vec();
        self
    }

    /// Replace the import options
    #[must_use]
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// The import options
    #[must_use]
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// The image holding the source assembly's manifest
    #[must_use]
    pub fn source_assembly(&self) -> &Image {
        &self.source_assembly
    }

    /// The image tokens are imported from
    #[must_use]
    pub fn source_module(&self) -> &Image {
        &self.source_module
    }

    /// The image holding the destination assembly's manifest
    #[must_use]
    pub fn dest_assembly(&self) -> &Image {
        &self.dest_assembly
    }

    /// The image references are emitted into
    #[must_use]
    pub fn dest_module(&self) -> &Image {
        &self.dest_module
    }

    /// Import a `TypeDef`, `TypeRef` or `TypeSpec` token of the source module.
    ///
    /// Type definitions are always imported as references, even within one module.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for other token kinds, and the errors of the
    /// individual importers.
    pub fn import_reference_to_type_def_or_ref_or_spec(
        &self,
        token: Token,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        self.import_type_token(token, 0, on_row_added)
    }

    /// Rewrite a signature blob of the source module for the destination module
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptMetadata`] for malformed signatures,
    /// [`crate::Error::RecursionLimit`] for signatures nested deeper than
    /// [`ImportOptions::max_signature_depth`], and the errors of importing embedded tokens.
    pub fn import_signature(
        &self,
        blob: &[u8],
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Vec<u8>> {
        self.import_blob(blob, false, 0, on_row_added)
    }

    /// Rewrite a `TypeSpec` blob of the source module for the destination module
    ///
    /// # Errors
    /// Same conditions as [`ImportContext::import_signature`].
    pub fn import_type_spec_blob(
        &self,
        blob: &[u8],
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Vec<u8>> {
        self.import_blob(blob, true, 0, on_row_added)
    }

    pub(crate) fn relation(&self) -> Result<Relation> {
        let same_module = self.source_module.mvid()? == self.dest_module.mvid()?;
        let same_assembly = self.source_assembly.mvid()? == self.dest_assembly.mvid()?;

        match (same_module, same_assembly) {
            (true, true) => Ok(Relation::SameModule),
            (false, true) => Ok(Relation::SameAssembly),
            (false, false) => Ok(Relation::DifferentAssembly),
            (true, false) => Err(corrupt_error!(
                "Source and destination share module {} but not their assembly",
                self.source_module.mvid()?
            )),
        }
    }

    /// The `Module` row 1 token of the destination
    pub(crate) fn dest_module_token() -> Token {
        Token::from_parts(TableId::Module, 1)
    }

    fn import_type_token(
        &self,
        token: Token,
        spec_depth: usize,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        match token.table_id() {
            Some(TableId::TypeDef) => self.import_reference_to_type_def(token, true, on_row_added),
            Some(TableId::TypeRef) => self.import_reference_to_type_ref(token, on_row_added),
            Some(TableId::TypeSpec) => self.import_type_spec(token, spec_depth, on_row_added),
            _ => Err(Error::InvalidArgument(format!(
                "token {} is not a TypeDef, TypeRef or TypeSpec",
                token
            ))),
        }
    }

    fn import_type_spec(
        &self,
        type_spec: Token,
        spec_depth: usize,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if spec_depth >= self.options.max_signature_depth {
            return Err(Error::RecursionLimit(self.options.max_signature_depth));
        }

        let blob = self
            .source_module
            .get_blob(type_spec, Column::TypeSpecSignature)?;
        let imported = self.import_blob(&blob, true, spec_depth + 1, on_row_added)?;

        log::debug!("importing TypeSpec {}", type_spec);
        self.dest_module.define_type_spec(&imported, on_row_added)
    }

    fn import_blob(
        &self,
        blob: &[u8],
        type_spec: bool,
        spec_depth: usize,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Vec<u8>> {
        let mut translator = |token: Token| -> Result<Token> {
            self.import_type_token(token, spec_depth, &mut *on_row_added)
        };

        let max_depth = self.options.max_signature_depth;
        if type_spec {
            signatures::import_type_spec_blob(blob, &mut translator, max_depth)
        } else {
            signatures::import_signature(blob, &mut translator, max_depth)
        }
    }
}
