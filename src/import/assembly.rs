use crate::{
    import::ImportContext,
    metadata::{identity::AssemblyIdentity, image::Image, token::Token},
    Result,
};

impl ImportContext {
    /// Find or create the `AssemblyRef` naming the source assembly.
    ///
    /// The row goes into the destination module and, for a multi-module destination assembly,
    /// into the destination manifest module as well. The manifest's public key is stored as
    /// its token. Returns the destination module's row.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptMetadata`] if the source assembly image has no manifest,
    /// [`crate::Error::InvalidPublicKey`] if its key is malformed, or an error if a row can
    /// not be read or appended.
    pub fn import_assembly(&self, on_row_added: &mut dyn FnMut(Token)) -> Result<Token> {
        let identity = AssemblyIdentity::from_assembly(&self.source_assembly)?.to_reference()?;
        self.define_in_destination(&identity, &self.source_assembly_hash, on_row_added)
    }

    /// Find or create a copy of the `AssemblyRef` row `assembly_ref` of `image` in the
    /// destination, in the same images [`ImportContext::import_assembly`] writes to.
    ///
    /// The hash value of the original row is not carried over.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if `assembly_ref` is not an `AssemblyRef` row of
    /// `image`, or an error if a row can not be read or appended.
    pub fn import_assembly_ref(
        &self,
        image: &Image,
        assembly_ref: Token,
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        let identity = AssemblyIdentity::from_assembly_ref(image, assembly_ref)?;
        self.define_in_destination(&identity, &[], on_row_added)
    }

    fn define_in_destination(
        &self,
        identity: &AssemblyIdentity,
        hash: &[u8],
        on_row_added: &mut dyn FnMut(Token),
    ) -> Result<Token> {
        log::debug!("importing assembly reference '{}'", identity);

        let token = self
            .dest_module
            .define_assembly_ref(identity, hash, on_row_added)?;
        if !self.dest_assembly.same_image(&self.dest_module) {
            self.dest_assembly
                .define_assembly_ref(identity, hash, on_row_added)?;
        }
        Ok(token)
    }
}
