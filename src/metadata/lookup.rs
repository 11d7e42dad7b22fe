//! Row lookups by content.
//!
//! The importer deduplicates the rows it emits by searching the destination image for an
//! existing row with the same content. All searches are linear scans in row order and return
//! the first match.

use crate::{
    metadata::{
        image::Image,
        tables::{Column, TableId},
        token::Token,
    },
    Result,
};

impl Image {
    /// Find the first `ModuleRef` row named `name`
    ///
    /// # Errors
    /// Returns an error if a row can not be read.
    pub fn find_module_ref(&self, name: &str) -> Result<Option<Token>> {
        for module_ref in self.enum_table(TableId::ModuleRef)? {
            if self.get_string(module_ref, Column::ModuleRefName)? == name {
                return Ok(Some(module_ref));
            }
        }
        Ok(None)
    }

    /// Find the first `TypeRef` row with the given resolution scope, name and namespace
    ///
    /// # Errors
    /// Returns an error if a row can not be read.
    pub fn find_type_ref(&self, scope: Token, namespace: &str, name: &str) -> Result<Option<Token>> {
        let scope = nil_to_null(scope);
        for type_ref in self.enum_table(TableId::TypeRef)? {
            if self.get_token(type_ref, Column::TypeRefResolutionScope)? == scope
                && self.get_string(type_ref, Column::TypeRefName)? == name
                && self.get_string(type_ref, Column::TypeRefNamespace)? == namespace
            {
                return Ok(Some(type_ref));
            }
        }
        Ok(None)
    }

    /// Find the first `MemberRef` row with the given parent, name and signature
    ///
    /// # Errors
    /// Returns an error if a row can not be read.
    pub fn find_member_ref(
        &self,
        parent: Token,
        name: &str,
        signature: &[u8],
    ) -> Result<Option<Token>> {
        let parent = nil_to_null(parent);
        for member_ref in self.enum_table(TableId::MemberRef)? {
            if self.get_token(member_ref, Column::MemberRefClass)? == parent
                && self.get_string(member_ref, Column::MemberRefName)? == name
                && self.get_blob(member_ref, Column::MemberRefSignature)? == signature
            {
                return Ok(Some(member_ref));
            }
        }
        Ok(None)
    }

    /// Find the first `ExportedType` row with the given name and namespace
    ///
    /// # Errors
    /// Returns an error if a row can not be read.
    pub fn find_exported_type(&self, namespace: &str, name: &str) -> Result<Option<Token>> {
        for exported in self.enum_table(TableId::ExportedType)? {
            if self.get_string(exported, Column::ExportedTypeName)? == name
                && self.get_string(exported, Column::ExportedTypeNamespace)? == namespace
            {
                return Ok(Some(exported));
            }
        }
        Ok(None)
    }

    /// Find the first type definition with the given name and namespace whose enclosing type is
    /// `enclosing`; `None` looks for a top-level type. The `<Module>` type is never returned.
    ///
    /// # Errors
    /// Returns an error if a row can not be read.
    pub fn find_type_def(
        &self,
        namespace: &str,
        name: &str,
        enclosing: Option<Token>,
    ) -> Result<Option<Token>> {
        for type_def in self.enum_table(TableId::TypeDef)? {
            if self.get_string(type_def, Column::TypeDefName)? == name
                && self.get_string(type_def, Column::TypeDefNamespace)? == namespace
                && self.enclosing_class(type_def)? == enclosing
            {
                return Ok(Some(type_def));
            }
        }
        Ok(None)
    }

    /// The type definition `type_def` is nested in, `None` for top-level types
    ///
    /// # Errors
    /// Returns an error if a row can not be read.
    pub fn enclosing_class(&self, type_def: Token) -> Result<Option<Token>> {
        let mut rows = self.enum_by_key(Column::NestedClassNestedClass, type_def)?;
        match rows.next() {
            Some(row) => {
                let enclosing = self.get_token(row, Column::NestedClassEnclosingClass)?;
                if enclosing.is_nil() {
                    return Err(corrupt_error!(
                        "NestedClass row {} has no enclosing class",
                        row
                    ));
                }
                Ok(Some(enclosing))
            }
            None => Ok(None),
        }
    }
}

/// Stored Nil tokens read back as 0
pub(crate) fn nil_to_null(token: Token) -> Token {
    if token.is_nil() {
        Token::new(0)
    } else {
        token
    }
}

#[cfg(test)]
mod tests {
    use crate::metadata::{storage::ImageBuilder, tables::TableId, token::Token};
    use crate::test::factories::mvid_a;

    #[test]
    fn test_find_module_ref() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        builder.module_ref("First.dll").unwrap();
        let second = builder.module_ref("Second.dll").unwrap();
        builder.module_ref("Second.dll").unwrap();
        let image = builder.build();

        assert_eq!(image.find_module_ref("Second.dll").unwrap(), Some(second));
        assert_eq!(image.find_module_ref("second.dll").unwrap(), None);
    }

    #[test]
    fn test_find_type_ref() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let scope = builder.module_ref("Other.dll").unwrap();
        let type_ref = builder.type_ref(scope, "N", "T").unwrap();
        let nil_scoped = builder.type_ref(Token::new(0), "N", "T").unwrap();
        let image = builder.build();

        assert_eq!(image.find_type_ref(scope, "N", "T").unwrap(), Some(type_ref));
        assert_eq!(
            image
                .find_type_ref(Token::nil(TableId::AssemblyRef), "N", "T")
                .unwrap(),
            Some(nil_scoped)
        );
        assert_eq!(image.find_type_ref(scope, "", "T").unwrap(), None);
    }

    #[test]
    fn test_find_member_ref() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let parent = builder.type_ref(Token::new(0), "N", "T").unwrap();
        builder.member_ref(parent, "f", &[0x06, 0x08]).unwrap();
        let string_field = builder.member_ref(parent, "f", &[0x06, 0x0E]).unwrap();
        let image = builder.build();

        assert_eq!(
            image.find_member_ref(parent, "f", &[0x06, 0x0E]).unwrap(),
            Some(string_field)
        );
        assert_eq!(image.find_member_ref(parent, "g", &[0x06, 0x0E]).unwrap(), None);
    }

    #[test]
    fn test_find_type_def_respects_nesting() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let outer = builder.type_def("N", "Outer", 0).unwrap();
        let nested = builder.nested_type_def(outer, "Item", 0).unwrap();
        let top_level = builder.type_def("", "Item", 0).unwrap();
        let image = builder.build();

        assert_eq!(image.find_type_def("", "Item", None).unwrap(), Some(top_level));
        assert_eq!(
            image.find_type_def("", "Item", Some(outer)).unwrap(),
            Some(nested)
        );
        assert_eq!(image.find_type_def("", "<Module>", None).unwrap(), None);
        assert_eq!(image.enclosing_class(nested).unwrap(), Some(outer));
        assert_eq!(image.enclosing_class(outer).unwrap(), None);
    }

    #[test]
    fn test_find_exported_type() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let file = builder.file("B.netmodule", 0, &[]).unwrap();
        let exported = builder.exported_type("N", "T", file).unwrap();
        let image = builder.build();

        assert_eq!(image.find_exported_type("N", "T").unwrap(), Some(exported));
        assert_eq!(image.find_exported_type("M", "T").unwrap(), None);
    }
}
