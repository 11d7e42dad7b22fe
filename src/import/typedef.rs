use std::collections::HashSet;

use crate::{
    import::{ImportContext, Relation, TypeName},
    metadata::{
        image::Image,
        tables::{Column, TableId},
        token::Token,
    },
    Error, Result,
};

impl ImportContext {
    /// Import a reference to the type definition `type_def` of the source module.
    ///
    /// Within one module the definition itself is returned unless `always_import` is set, in
    /// which case a `TypeRef` scoped to the destination module is produced. Otherwise the
    /// outermost scope is a `ModuleRef` (same assembly) or an `AssemblyRef` (other assembly),
    /// and one `TypeRef` is found or created per nesting level, outermost first.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `type_def` is not a type definition or is
    /// the `<Module>` type, [`crate::Error::CorruptMetadata`] for broken or cyclic nesting, or
    /// an error if a row can not be read or appended.
    pub fn import_reference_to_type_def(
        &self,
        type_def: Token,
        always_import: bool,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if !type_def.is_table(TableId::TypeDef) || type_def.is_nil() {
            return Err(Error::InvalidArgument(format!(
                "token {} is not a TypeDef",
                type_def
            )));
        }
        if type_def.row() == 1 {
            return Err(Error::InvalidArgument(
                "the <Module> type can not be referenced".to_string(),
            ));
        }

        let scope = match self.relation()? {
            Relation::SameModule if !always_import => return Ok(type_def),
            Relation::SameModule => ImportContext::dest_module_token(),
            Relation::SameAssembly => {
                let module_name = self.source_module.module_name()?;
                self.dest_module
                    .define_module_ref(&module_name, on_row_added)?
            }
            Relation::DifferentAssembly => self.import_assembly(on_row_added)?,
        };

        let chain = type_def_chain(&self.source_module, type_def)?;
        log::debug!(
            "importing TypeDef {} '{}' into scope {}",
            type_def,
            chain[0],
            scope
        );

        self.emit_type_ref_chain(scope, chain, on_row_added)
    }

    /// Find or create one `TypeRef` per level of `chain`, popping the outermost level first
    /// and scoping each level to the row created for the previous one.
    pub(crate) fn emit_type_ref_chain(
        &self,
        scope: Token,
        mut chain: Vec<TypeName>,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        let mut scope = scope;
        while let Some(level) = chain.pop() {
            scope = self.dest_module.define_type_ref(
                scope,
                &level.namespace,
                &level.name,
                self.options.reuse_existing_type_refs,
                on_row_added,
            )?;
        }
        Ok(scope)
    }
}

/// The names of `type_def` and all its enclosing types, innermost first
pub(crate) fn type_def_chain(image: &Image, type_def: Token) -> Result<Vec<TypeName>> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = type_def;

    loop {
        if !visited.insert(current) {
            return Err(corrupt_error!(
                "NestedClass chain of {} loops at {}",
                type_def,
                current
            ));
        }

        chain.push(TypeName {
            namespace: image.get_string(current, Column::TypeDefNamespace)?,
            name: image.get_string(current, Column::TypeDefName)?,
        });

        match image.enclosing_class(current)? {
            Some(enclosing) if enclosing.is_table(TableId::TypeDef) => current = enclosing,
            Some(enclosing) => {
                return Err(corrupt_error!(
                    "NestedClass row of {} names {} as enclosing class",
                    current,
                    enclosing
                ))
            }
            None => return Ok(chain),
        }
    }
}
