//! Find-or-create row emission.
//!
//! Each `define_*` operation first searches the image for an equal row and only appends when
//! none exists. The search and the append are separate facade calls, so two importers racing on
//! the same destination may both append; the resulting rows are equal and either is valid.
//! Every appended row is reported to the caller's callback after it is fully written.

use crate::{
    metadata::{
        identity::{find_assembly_ref, AssemblyIdentity},
        image::Image,
        tables::{CodedIndexType, Column, TableId},
        token::Token,
    },
    Result,
};

impl Image {
    /// Find or create a `ModuleRef` row named `name`
    ///
    /// # Errors
    /// Returns an error if a row can not be read or appended.
    pub fn define_module_ref(
        &self,
        name: &str,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if let Some(existing) = self.find_module_ref(name)? {
            return Ok(existing);
        }

        let token = self.append_row(TableId::ModuleRef, &[(Column::ModuleRefName, name.into())])?;
        log::trace!("added ModuleRef {} '{}'", token, name);
        on_row_added(token);
        Ok(token)
    }

    /// Find or create a `TypeRef` row. With `reuse` unset a new row is always appended.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `scope` is not a resolution scope, or an
    /// error if a row can not be read or appended.
    pub fn define_type_ref(
        &self,
        scope: Token,
        namespace: &str,
        name: &str,
        reuse: bool,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if !CodedIndexType::ResolutionScope.accepts(scope) && !scope.is_nil() {
            return Err(crate::Error::InvalidArgument(format!(
                "token {} is not a resolution scope",
                scope
            )));
        }

        if reuse {
            if let Some(existing) = self.find_type_ref(scope, namespace, name)? {
                return Ok(existing);
            }
        }

        let token = self.append_row(
            TableId::TypeRef,
            &[
                (Column::TypeRefResolutionScope, scope.into()),
                (Column::TypeRefName, name.into()),
                (Column::TypeRefNamespace, namespace.into()),
            ],
        )?;
        log::trace!("added TypeRef {} '{}.{}' in {}", token, namespace, name, scope);
        on_row_added(token);
        Ok(token)
    }

    /// Find or create a `MemberRef` row. With `reuse` unset a new row is always appended.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `parent` is not a member parent, or an
    /// error if a row can not be read or appended.
    pub fn define_member_ref(
        &self,
        parent: Token,
        name: &str,
        signature: &[u8],
        reuse: bool,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if !CodedIndexType::MemberRefParent.accepts(parent) {
            return Err(crate::Error::InvalidArgument(format!(
                "token {} is not a member parent",
                parent
            )));
        }

        if reuse {
            if let Some(existing) = self.find_member_ref(parent, name, signature)? {
                return Ok(existing);
            }
        }

        let token = self.append_row(
            TableId::MemberRef,
            &[
                (Column::MemberRefClass, parent.into()),
                (Column::MemberRefName, name.into()),
                (Column::MemberRefSignature, signature.into()),
            ],
        )?;
        log::trace!("added MemberRef {} '{}' on {}", token, name, parent);
        on_row_added(token);
        Ok(token)
    }

    /// Append a `TypeSpec` row. Type specifications are never deduplicated.
    ///
    /// # Errors
    /// Returns an error if the row can not be appended.
    pub fn define_type_spec(
        &self,
        signature: &[u8],
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        let token = self.append_row(
            TableId::TypeSpec,
            &[(Column::TypeSpecSignature, signature.into())],
        )?;
        log::trace!("added TypeSpec {}", token);
        on_row_added(token);
        Ok(token)
    }

    /// Find or create an `AssemblyRef` row naming `identity`, storing `hash` as its hash value
    /// when a row is created.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPublicKey`] if a key has to be reduced to a token and is
    /// malformed, or an error if a row can not be read or appended.
    pub fn define_assembly_ref(
        &self,
        identity: &AssemblyIdentity,
        hash: &[u8],
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        if let Some(existing) = find_assembly_ref(self, identity)? {
            return Ok(existing);
        }

        let token = self.append_row(TableId::AssemblyRef, &identity.assembly_ref_row(hash))?;
        log::trace!("added AssemblyRef {} '{}'", token, identity);
        on_row_added(token);
        Ok(token)
    }
}
