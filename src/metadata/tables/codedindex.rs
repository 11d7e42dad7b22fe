//! Coded index types.
//!
//! A coded index is a column (or signature element) whose value may point into one of several
//! tables. The low bits select the table, the remaining bits carry the row. The storage facade
//! uses [`CodedIndexType::tables`] to reject tokens of the wrong kind on write, and the
//! signature codec uses [`CodedIndexType::TypeDefOrRef`] to decode and re-encode the class
//! tokens embedded in signature blobs.

use strum::{EnumCount, EnumIter};

use crate::{
    metadata::{tables::TableId, token::Token},
    Result,
};

/// The coded index kinds used by the tables the importer reads and writes.
///
/// ## Reference
/// * [ECMA-335 Partition II, Section 24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Coded indices
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef` or `TypeSpec`
    TypeDefOrRef,
    /// Parent of a `MemberRef`
    MemberRefParent,
    /// `MethodDef` or `MemberRef`
    MethodDefOrRef,
    /// Implementation of an `ExportedType`
    Implementation,
    /// Resolution scope of a `TypeRef`
    ResolutionScope,
}

impl CodedIndexType {
    /// The tables this coded index may point into, in tag order
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
        }
    }

    /// Number of low bits used for the table tag
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        let tables = self.tables().len() as u32;
        u32::BITS - (tables - 1).leading_zeros()
    }

    /// Returns true if `token` may be stored in a column of this kind.
    ///
    /// The null token is accepted by every coded index, it encodes as 0.
    #[must_use]
    pub fn accepts(&self, token: Token) -> bool {
        token.is_null()
            || token
                .table_id()
                .is_some_and(|table| self.tables().contains(&table))
    }

    /// Encodes a token as a coded index value.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the token's table is not one of
    /// [`CodedIndexType::tables`].
    pub fn encode(&self, token: Token) -> Result<u32> {
        let tag = token
            .table_id()
            .and_then(|table| self.tables().iter().position(|t| *t == table))
            .ok_or_else(|| {
                crate::Error::InvalidArgument(format!(
                    "token {} can not be encoded as {:?}",
                    token, self
                ))
            })?;

        Ok((token.row() << self.tag_bits()) | tag as u32)
    }

    /// Decodes a coded index value back into a token.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptMetadata`] if the tag selects no table.
    pub fn decode(&self, value: u32) -> Result<Token> {
        let bits = self.tag_bits();
        let tag = (value & ((1 << bits) - 1)) as usize;
        let row = value >> bits;

        match self.tables().get(tag) {
            Some(table) => Ok(Token::from_parts(*table, row)),
            None => Err(corrupt_error!(
                "Invalid {:?} coded index - 0x{:x}",
                self,
                value
            )),
        }
    }
}
