use std::collections::HashSet;

use crate::{
    import::{ImportContext, Relation, TypeName},
    metadata::{
        identity::assembly_ref_points_to_assembly,
        image::Image,
        tables::{Column, TableId},
        token::Token,
    },
    Error, Result,
};

impl ImportContext {
    /// Import the type reference `type_ref` of the source module.
    ///
    /// The `TypeRef` scope chain is climbed to its outermost resolution scope, which is then
    /// mapped into the destination. A scope that turns out to be the destination module itself
    /// resolves to the matching type definition; any other scope receives one `TypeRef` per
    /// nesting level.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `type_ref` is not a type reference,
    /// [`crate::Error::CorruptMetadata`] for cyclic scope chains, dangling scopes or
    /// `ExportedType` chains, [`crate::Error::RecordNotFound`] if the type is missing from the
    /// assembly the reference resolves to, or an error if a row can not be read or appended.
    pub fn import_reference_to_type_ref(
        &self,
        type_ref: Token,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if !type_ref.is_table(TableId::TypeRef) || type_ref.is_nil() {
            return Err(Error::InvalidArgument(format!(
                "token {} is not a TypeRef",
                type_ref
            )));
        }

        let relation = self.relation()?;
        if relation == Relation::SameModule {
            return Ok(type_ref);
        }

        let (chain, root_scope) = type_ref_chain(&self.source_module, type_ref)?;
        let outermost = chain
            .last()
            .cloned()
            .ok_or_else(|| corrupt_error!("TypeRef {} has no name chain", type_ref))?;
        log::debug!(
            "importing TypeRef {} '{}' with root scope {}",
            type_ref,
            outermost,
            root_scope
        );

        let scope = if relation == Relation::SameAssembly {
            self.sibling_module_scope(root_scope, on_row_added)?
        } else {
            self.foreign_assembly_scope(root_scope, &outermost, on_row_added)?
        };

        if scope == ImportContext::dest_module_token() {
            return self.resolve_in_destination(chain);
        }
        self.emit_type_ref_chain(scope, chain, on_row_added)
    }

    /// Map the root scope of a reference written by another module of the destination
    /// assembly
    fn sibling_module_scope(
        &self,
        root_scope: Token,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if root_scope.is_nil() {
            return Ok(Token::new(0));
        }

        match root_scope.table_id() {
            Some(TableId::Module) => {
                let module_name = self.source_module.module_name()?;
                self.dest_module
                    .define_module_ref(&module_name, on_row_added)
            }
            Some(TableId::ModuleRef) => {
                let name = self
                    .source_module
                    .get_string(root_scope, Column::ModuleRefName)?;
                if name == self.dest_module.module_name()? {
                    Ok(ImportContext::dest_module_token())
                } else {
                    self.dest_module.define_module_ref(&name, on_row_added)
                }
            }
            Some(TableId::AssemblyRef) => {
                self.import_assembly_ref(&self.source_module, root_scope, on_row_added)
            }
            _ => Err(corrupt_error!(
                "{} is not a valid resolution scope",
                root_scope
            )),
        }
    }

    /// Map the root scope of a reference written by a module of another assembly
    fn foreign_assembly_scope(
        &self,
        root_scope: Token,
        outermost: &TypeName,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if root_scope.is_nil() {
            return self.exported_type_scope(outermost, on_row_added);
        }

        match root_scope.table_id() {
            Some(TableId::Module) | Some(TableId::ModuleRef) => self.import_assembly(on_row_added),
            Some(TableId::AssemblyRef) => {
                self.assembly_ref_scope(&self.source_module, root_scope, outermost, on_row_added)
            }
            _ => Err(corrupt_error!(
                "{} is not a valid resolution scope",
                root_scope
            )),
        }
    }

    /// A Nil resolution scope names a type through the `ExportedType` table of the source
    /// assembly
    fn exported_type_scope(
        &self,
        outermost: &TypeName,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        let Some(exported) = self
            .source_assembly
            .find_exported_type(&outermost.namespace, &outermost.name)?
        else {
            if self
                .source_assembly
                .find_type_def(&outermost.namespace, &outermost.name, None)?
                .is_some()
            {
                return self.import_assembly(on_row_added);
            }
            return Err(Error::RecordNotFound(format!(
                "{} in assembly of module '{}'",
                outermost,
                self.source_assembly.module_name()?
            )));
        };

        let implementation = self
            .source_assembly
            .get_token(exported, Column::ExportedTypeImplementation)?;
        if implementation.is_nil() {
            return Err(corrupt_error!("ExportedType {} has no implementation", exported));
        }

        match implementation.table_id() {
            Some(TableId::File) => self.import_assembly(on_row_added),
            Some(TableId::AssemblyRef) => self.assembly_ref_scope(
                &self.source_assembly,
                implementation,
                outermost,
                on_row_added,
            ),
            _ => Err(corrupt_error!(
                "ExportedType {} of '{}' is implemented by {}",
                exported,
                outermost,
                implementation
            )),
        }
    }

    /// Map an `AssemblyRef` scope of `image`, detecting references back into the destination
    /// assembly
    fn assembly_ref_scope(
        &self,
        image: &Image,
        assembly_ref: Token,
        outermost: &TypeName,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if assembly_ref_points_to_assembly(image, assembly_ref, &self.dest_assembly)? {
            log::debug!(
                "AssemblyRef {} points back at the destination assembly",
                assembly_ref
            );
            return self.scope_for_type_by_name_in_assembly(
                &outermost.namespace,
                &outermost.name,
                on_row_added,
            );
        }

        self.import_assembly_ref(image, assembly_ref, on_row_added)
    }

    /// Resolve a name chain to the type definitions of the destination module, outermost
    /// first
    fn resolve_in_destination(&self, mut chain: Vec<TypeName>) -> Result<Token> {
        let mut enclosing = None;
        while let Some(level) = chain.pop() {
            let type_def = self
                .dest_module
                .find_type_def(&level.namespace, &level.name, enclosing)?
                .ok_or_else(|| {
                    Error::RecordNotFound(format!(
                        "{} in destination module",
                        level
                    ))
                })?;
            enclosing = Some(type_def);
        }

        enclosing.ok_or_else(|| corrupt_error!("empty type name chain"))
    }
}

/// The names of `type_ref` and every `TypeRef` it is scoped to, innermost first, and the
/// scope of the outermost one
pub(crate) fn type_ref_chain(image: &Image, type_ref: Token) -> Result<(Vec<TypeName>, Token)> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = type_ref;

    loop {
        if !visited.insert(current) {
            return Err(corrupt_error!(
                "Resolution scope chain of {} loops at {}",
                type_ref,
                current
            ));
        }

        chain.push(TypeName {
            namespace: image.get_string(current, Column::TypeRefNamespace)?,
            name: image.get_string(current, Column::TypeRefName)?,
        });

        let scope = image.get_token(current, Column::TypeRefResolutionScope)?;
        if scope.is_nil() || !scope.is_table(TableId::TypeRef) {
            return Ok((chain, scope));
        }
        current = scope;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::storage::ImageBuilder,
        test::factories::{assembly_image, mvid_a, mvid_b},
    };

    #[test]
    fn test_chain_reports_root_scope() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let module_ref = builder.module_ref("B.dll").unwrap();
        let outer = builder.type_ref(module_ref, "N", "Outer").unwrap();
        let inner = builder.type_ref(outer, "", "Inner").unwrap();
        let image = builder.build();

        let (chain, scope) = type_ref_chain(&image, inner).unwrap();
        assert_eq!(scope, module_ref);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].to_string(), "Inner");
        assert_eq!(chain[1].to_string(), "N.Outer");
    }

    #[test]
    fn test_chain_cycle_is_corrupt() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let first = builder
            .type_ref(Token::from_parts(TableId::TypeRef, 2), "", "First")
            .unwrap();
        builder.type_ref(first, "", "Second").unwrap();
        let image = builder.build();

        assert!(matches!(
            type_ref_chain(&image, first),
            Err(Error::CorruptMetadata { .. })
        ));
    }

    #[test]
    fn test_same_module_returns_reference() {
        let mut builder = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        let type_ref = builder.type_ref(Token::new(0), "N", "T").unwrap();
        let image = builder.build();
        let context = ImportContext::new(image.clone(), image.clone(), image.clone(), image);

        assert_eq!(
            context
                .import_reference_to_type_ref(type_ref, &mut |_| {})
                .unwrap(),
            type_ref
        );
    }

    #[test]
    fn test_sibling_module_ref_resolves_to_definition() {
        let mut manifest = ImageBuilder::new("A.dll", mvid_a()).unwrap();
        manifest
            .assembly(&crate::metadata::identity::AssemblyIdentity::new(
                "A",
                crate::metadata::identity::AssemblyVersion::new(1, 0, 0, 0),
            ))
            .unwrap();
        let widget = manifest.type_def("N", "Widget", 0).unwrap();
        let manifest = manifest.build();

        let mut part = ImageBuilder::new("A.Part.netmodule", mvid_b()).unwrap();
        let back = part.module_ref("A.dll").unwrap();
        let type_ref = part.type_ref(back, "N", "Widget").unwrap();
        let missing = part.type_ref(back, "N", "Gadget").unwrap();
        let part = part.build();

        let context = ImportContext::new(manifest.clone(), part, manifest.clone(), manifest);
        assert_eq!(
            context
                .import_reference_to_type_ref(type_ref, &mut |_| {})
                .unwrap(),
            widget
        );
        assert!(matches!(
            context.import_reference_to_type_ref(missing, &mut |_| {}),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_other_tokens() {
        let image = assembly_image("A.dll", mvid_a(), "A", &[]);
        let context = ImportContext::new(image.clone(), image.clone(), image.clone(), image);
        assert!(matches!(
            context.import_reference_to_type_ref(Token::new(0x0200_0002), &mut |_| {}),
            Err(Error::InvalidArgument(_))
        ));
    }
}
