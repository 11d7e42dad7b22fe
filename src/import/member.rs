use crate::{
    import::ImportContext,
    metadata::{
        tables::{CodedIndexType, Column, TableId},
        token::Token,
    },
    Error, Result,
};

impl ImportContext {
    /// Import a reference to the method or field `member` of the source module as a
    /// `MemberRef` of the destination module.
    ///
    /// `parent` is the destination token the member belongs to, usually the result of
    /// importing the member's declaring type. A Nil `parent` marks a global member: it is
    /// parented to the `<Module>` type within one module and to a `ModuleRef` naming the source
    /// module otherwise. The member's signature is imported along with it.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `member` is not a `MethodDef` or `Field`
    /// or `parent` can not own a member reference, or the errors of importing the signature.
    pub fn import_member(
        &self,
        member: Token,
        parent: Token,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        let (name_column, signature_column) = match member.table_id() {
            Some(TableId::MethodDef) if !member.is_nil() => {
                (Column::MethodDefName, Column::MethodDefSignature)
            }
            Some(TableId::Field) if !member.is_nil() => (Column::FieldName, Column::FieldSignature),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "token {} is not a MethodDef or Field",
                    member
                )))
            }
        };

        let parent = if parent.is_nil() {
            if self.source_module.mvid()? == self.dest_module.mvid()? {
                Token::from_parts(TableId::TypeDef, 1)
            } else {
                let module_name = self.source_module.module_name()?;
                self.dest_module
                    .define_module_ref(&module_name, on_row_added)?
            }
        } else if CodedIndexType::MemberRefParent.accepts(parent) {
            parent
        } else {
            return Err(Error::InvalidArgument(format!(
                "token {} can not own a member reference",
                parent
            )));
        };

        let name = self.source_module.get_string(member, name_column)?;
        let signature = self.source_module.get_blob(member, signature_column)?;
        let signature = self.import_signature(&signature, on_row_added)?;

        log::debug!("importing member {} '{}' on {}", member, name, parent);
        self.dest_module.define_member_ref(
            parent,
            &name,
            &signature,
            self.options.reuse_existing_member_refs,
            on_row_added,
        )
    }
}
