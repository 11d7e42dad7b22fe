//! Fluent construction of in-memory images.
//!
//! [`ImageBuilder`] creates the `Module` row and the `<Module>` pseudo-type up front, then
//! appends rows in the order the ECMA-335 layout expects: a type definition claims the fields
//! and methods defined after it, and nested types are registered in `NestedClass` as they are
//! created.

use uguid::Guid;

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        image::Image,
        storage::{CellValue, MemoryTables, TableStore},
        tables::{AssemblyHashAlgorithm, Column, TableId, TypeAttributes},
        token::Token,
    },
    Result,
};

/// Builds an [`Image`] backed by [`MemoryTables`]
#[derive(Debug)]
pub struct ImageBuilder {
    tables: MemoryTables,
}

impl ImageBuilder {
    /// Start an image with module `name` and version id `mvid`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `name` contains a NUL byte.
    pub fn new(name: &str, mvid: Guid) -> Result<Self> {
        let mut tables = MemoryTables::new();
        tables.append_row(
            TableId::Module,
            &[
                (Column::ModuleName, name.into()),
                (Column::ModuleMvid, mvid.into()),
            ],
        )?;

        let mut builder = ImageBuilder { tables };
        builder.type_def("", "<Module>", 0)?;
        Ok(builder)
    }

    /// Enable or disable sorted range queries on the underlying engine
    #[must_use]
    pub fn with_range_queries(mut self, enabled: bool) -> Self {
        self.tables = self.tables.with_range_queries(enabled);
        self
    }

    /// Append an arbitrary row
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if a value does not fit its column.
    pub fn row(&mut self, table: TableId, values: &[(Column, CellValue)]) -> Result<Token> {
        let row = self.tables.append_row(table, values)?;
        Ok(Token::from_parts(table, row))
    }

    /// Add the `Assembly` manifest row
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the image already has a manifest.
    pub fn assembly(&mut self, identity: &AssemblyIdentity) -> Result<Token> {
        if self.tables.row_count(TableId::Assembly) > 0 {
            return Err(crate::Error::InvalidArgument(
                "image already has an Assembly row".to_string(),
            ));
        }

        self.row(
            TableId::Assembly,
            &[
                (
                    Column::AssemblyHashAlgId,
                    AssemblyHashAlgorithm::SHA1.into(),
                ),
                (Column::AssemblyMajorVersion, identity.version.major.into()),
                (Column::AssemblyMinorVersion, identity.version.minor.into()),
                (Column::AssemblyBuildNumber, identity.version.build.into()),
                (
                    Column::AssemblyRevisionNumber,
                    identity.version.revision.into(),
                ),
                (Column::AssemblyFlags, identity.flags.into()),
                (
                    Column::AssemblyPublicKey,
                    identity.public_key_or_token.clone().into(),
                ),
                (Column::AssemblyName, identity.name.as_str().into()),
                (Column::AssemblyCulture, identity.culture.as_str().into()),
            ],
        )
    }

    /// Add an `AssemblyRef` row
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn assembly_ref(&mut self, identity: &AssemblyIdentity) -> Result<Token> {
        self.row(TableId::AssemblyRef, &identity.assembly_ref_row(&[]))
    }

    /// Add a `ModuleRef` row
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn module_ref(&mut self, name: &str) -> Result<Token> {
        self.row(TableId::ModuleRef, &[(Column::ModuleRefName, name.into())])
    }

    /// Add a `File` row
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn file(&mut self, name: &str, flags: u32, hash: &[u8]) -> Result<Token> {
        self.row(
            TableId::File,
            &[
                (Column::FileFlags, flags.into()),
                (Column::FileName, name.into()),
                (Column::FileHashValue, hash.into()),
            ],
        )
    }

    /// Add a type definition that owns the fields and methods added after it
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn type_def(&mut self, namespace: &str, name: &str, flags: u32) -> Result<Token> {
        let field_list = self.next_list_row(TableId::Field);
        let method_list = self.next_list_row(TableId::MethodDef);

        self.row(
            TableId::TypeDef,
            &[
                (Column::TypeDefFlags, flags.into()),
                (Column::TypeDefName, name.into()),
                (Column::TypeDefNamespace, namespace.into()),
                (Column::TypeDefFieldList, field_list.into()),
                (Column::TypeDefMethodList, method_list.into()),
            ],
        )
    }

    /// Add a type definition nested in `enclosing`
    ///
    /// # Errors
    /// Returns an error if the rows can not be stored.
    pub fn nested_type_def(&mut self, enclosing: Token, name: &str, flags: u32) -> Result<Token> {
        let nested = self.type_def("", name, flags | TypeAttributes::NESTED_PUBLIC)?;
        self.nested_class(nested, enclosing)?;
        Ok(nested)
    }

    /// Add a `NestedClass` row
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn nested_class(&mut self, nested: Token, enclosing: Token) -> Result<Token> {
        self.row(
            TableId::NestedClass,
            &[
                (Column::NestedClassNestedClass, nested.into()),
                (Column::NestedClassEnclosingClass, enclosing.into()),
            ],
        )
    }

    /// Add a field to the last type definition
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn field(&mut self, name: &str, signature: &[u8], flags: u32) -> Result<Token> {
        self.row(
            TableId::Field,
            &[
                (Column::FieldFlags, flags.into()),
                (Column::FieldName, name.into()),
                (Column::FieldSignature, signature.into()),
            ],
        )
    }

    /// Add a `FieldPtr` row pointing at `field`
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn field_ptr(&mut self, field: Token) -> Result<Token> {
        self.row(TableId::FieldPtr, &[(Column::FieldPtrField, field.into())])
    }

    /// Add a method to the last type definition
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn method(&mut self, name: &str, signature: &[u8], flags: u32) -> Result<Token> {
        let param_list = self.next_list_row(TableId::Param);
        self.row(
            TableId::MethodDef,
            &[
                (Column::MethodDefFlags, flags.into()),
                (Column::MethodDefName, name.into()),
                (Column::MethodDefSignature, signature.into()),
                (Column::MethodDefParamList, param_list.into()),
            ],
        )
    }

    /// Add a `TypeRef` row
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `scope` is not a resolution scope.
    pub fn type_ref(&mut self, scope: Token, namespace: &str, name: &str) -> Result<Token> {
        self.row(
            TableId::TypeRef,
            &[
                (Column::TypeRefResolutionScope, scope.into()),
                (Column::TypeRefName, name.into()),
                (Column::TypeRefNamespace, namespace.into()),
            ],
        )
    }

    /// Add a `TypeSpec` row
    ///
    /// # Errors
    /// Returns an error if the row can not be stored.
    pub fn type_spec(&mut self, signature: &[u8]) -> Result<Token> {
        self.row(
            TableId::TypeSpec,
            &[(Column::TypeSpecSignature, signature.into())],
        )
    }

    /// Add a `MemberRef` row
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `parent` is not a member parent.
    pub fn member_ref(&mut self, parent: Token, name: &str, signature: &[u8]) -> Result<Token> {
        self.row(
            TableId::MemberRef,
            &[
                (Column::MemberRefClass, parent.into()),
                (Column::MemberRefName, name.into()),
                (Column::MemberRefSignature, signature.into()),
            ],
        )
    }

    /// Add an `ExportedType` row
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `implementation` is not a `File`,
    /// `AssemblyRef` or `ExportedType` token.
    pub fn exported_type(
        &mut self,
        namespace: &str,
        name: &str,
        implementation: Token,
    ) -> Result<Token> {
        self.row(
            TableId::ExportedType,
            &[
                (Column::ExportedTypeFlags, TypeAttributes::PUBLIC.into()),
                (Column::ExportedTypeName, name.into()),
                (Column::ExportedTypeNamespace, namespace.into()),
                (Column::ExportedTypeImplementation, implementation.into()),
            ],
        )
    }

    /// Finish the image
    #[must_use]
    pub fn build(self) -> Image {
        Image::new(self.tables)
    }

    fn next_list_row(&self, table: TableId) -> Token {
        Token::from_parts(table, self.tables.row_count(table) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::AssemblyVersion;
    use crate::test::factories::mvid_a;

    #[test]
    fn test_module_rows() {
        let image = ImageBuilder::new("A.dll", mvid_a()).unwrap().build();

        assert_eq!(image.row_count(TableId::Module).unwrap(), 1);
        assert_eq!(image.row_count(TableId::TypeDef).unwrap(), 1);
        assert_eq!(
            image
                .get_string(Token::new(0x0200_0001), Column::TypeDefName)
                .unwrap(),
            "<Module>"
        );
    }

    #[test]
    fn test_single_manifest() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let identity = AssemblyIdentity::new("A", AssemblyVersion::new(1, 0, 0, 0));
        assert_eq!(
            builder.assembly(&identity).unwrap(),
            Token::new(0x2000_0001)
        );
        assert!(builder.assembly(&identity).is_err());
    }

    #[test]
    fn test_nested_type_def() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let outer = builder.type_def("N", "Outer", TypeAttributes::PUBLIC).unwrap();
        let inner = builder.nested_type_def(outer, "Inner", 0).unwrap();
        let image = builder.build();

        let row = Token::from_parts(TableId::NestedClass, 1);
        assert_eq!(
            image
                .get_token(row, Column::NestedClassNestedClass)
                .unwrap(),
            inner
        );
        assert_eq!(
            image
                .get_token(row, Column::NestedClassEnclosingClass)
                .unwrap(),
            outer
        );
        assert_eq!(
            image.get_string(inner, Column::TypeDefNamespace).unwrap(),
            ""
        );
    }

    #[test]
    fn test_rejects_bad_scope() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        assert!(builder
            .type_ref(Token::new(0x0200_0001), "System", "Object")
            .is_err());
    }
}
