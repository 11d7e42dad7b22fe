use crate::{
    import::ImportContext,
    metadata::{
        tables::{Column, TableId},
        token::Token,
    },
    Error, Result,
};

impl ImportContext {
    /// The resolution scope under which the destination module reaches the top-level type
    /// `namespace.name` of its own assembly.
    ///
    /// An `ExportedType` entry of the destination manifest decides first: a `File`
    /// implementation yields the destination module when the file is that module and a
    /// `ModuleRef` to the file otherwise, an `AssemblyRef` implementation (a type forward) is
    /// imported. Without an entry the type must be defined in the manifest module, which is
    /// reached as the destination module itself or through a `ModuleRef`.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptMetadata`] for an `ExportedType` chained to another
    /// `ExportedType` or to an invalid implementation, [`crate::Error::RecordNotFound`] if the
    /// assembly neither exports nor defines the type, or an error if a row can not be read or
    /// appended.
    pub fn scope_for_type_by_name_in_assembly(
        &self,
        namespace: &str,
        name: &str,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if let Some(exported) = self.dest_assembly.find_exported_type(namespace, name)? {
            let implementation = self
                .dest_assembly
                .get_token(exported, Column::ExportedTypeImplementation)?;
            if implementation.is_nil() {
                return Err(corrupt_error!("ExportedType {} has no implementation", exported));
            }

            return match implementation.table_id() {
                Some(TableId::File) => {
                    let file_name = self
                        .dest_assembly
                        .get_string(implementation, Column::FileName)?;
                    if file_name == self.dest_module.module_name()? {
                        Ok(ImportContext::dest_module_token())
                    } else {
                        self.dest_module
                            .define_module_ref(&file_name, on_row_added)
                    }
                }
                Some(TableId::AssemblyRef) => {
                    self.import_assembly_ref(&self.dest_assembly, implementation, on_row_added)
                }
                _ => Err(corrupt_error!(
                    "ExportedType {} is implemented by {}",
                    exported,
                    implementation
                )),
            };
        }

        if self
            .dest_assembly
            .find_type_def(namespace, name, None)?
            .is_none()
        {
            return Err(Error::RecordNotFound(format!(
                "{}{}{} in destination assembly",
                namespace,
                if namespace.is_empty() { "" } else { "." },
                name
            )));
        }

        let manifest_name = self.dest_assembly.module_name()?;
        if self.dest_assembly.same_image(&self.dest_module)
            || manifest_name == self.dest_module.module_name()?
        {
            Ok(ImportContext::dest_module_token())
        } else {
            self.dest_module
                .define_module_ref(&manifest_name, on_row_added)
        }
    }
}
