//! Matching assembly identities against `AssemblyRef` rows.

use crate::{
    metadata::{
        identity::{AssemblyIdentity, StrongNameToken, VersionMatcher},
        image::Image,
        tables::TableId,
        token::Token,
    },
    Result,
};

/// Find the first `AssemblyRef` row of `image` that names `identity`.
///
/// Names and cultures compare exactly; versions compare according to
/// [`VersionMatcher::for_name`]. Both sides must agree on having a public key or token. When
/// one side holds a full key and the other a token, the key is reduced to its token first.
///
/// # Errors
/// Returns [`crate::Error::InvalidPublicKey`] if a key that has to be reduced is malformed, or
/// an error if a row can not be read.
pub fn find_assembly_ref(image: &Image, identity: &AssemblyIdentity) -> Result<Option<Token>> {
    let matcher = VersionMatcher::for_name(&identity.name);
    let mut wanted_token: Option<StrongNameToken> = None;

    for assembly_ref in image.enum_table(TableId::AssemblyRef)? {
        let candidate = AssemblyIdentity::from_assembly_ref(image, assembly_ref)?;

        if !matcher.matches(&identity.version, &candidate.version)
            || candidate.name != identity.name
            || candidate.culture != identity.culture
            || candidate.is_strong_named() != identity.is_strong_named()
        {
            continue;
        }

        if identity.is_strong_named() {
            if identity.has_public_key() == candidate.has_public_key() {
                if identity.public_key_or_token != candidate.public_key_or_token {
                    continue;
                }
            } else {
                if wanted_token.is_none() {
                    wanted_token = identity.public_key_token()?;
                }
                if wanted_token != candidate.public_key_token()? {
                    continue;
                }
            }
        }

        return Ok(Some(assembly_ref));
    }

    Ok(None)
}

/// Returns true if the `AssemblyRef` row `assembly_ref` of `ref_image` names the manifest
/// assembly of `assembly_image`.
///
/// All four version components must match. An image without an `Assembly` row is never the
/// target of a reference.
///
/// # Errors
/// Returns [`crate::Error::InvalidPublicKey`] if the manifest key is malformed, or an error if
/// a row can not be read.
pub fn assembly_ref_points_to_assembly(
    ref_image: &Image,
    assembly_ref: Token,
    assembly_image: &Image,
) -> Result<bool> {
    if !assembly_image.has_assembly()? {
        return Ok(false);
    }

    let reference = AssemblyIdentity::from_assembly_ref(ref_image, assembly_ref)?;
    let assembly = AssemblyIdentity::from_assembly(assembly_image)?;

    if reference.version != assembly.version
        || reference.name != assembly.name
        || reference.culture != assembly.culture
        || reference.is_strong_named() != assembly.is_strong_named()
    {
        return Ok(false);
    }

    if !reference.is_strong_named() {
        return Ok(true);
    }

    if reference.has_public_key() {
        return Ok(reference.public_key_or_token == assembly.public_key_or_token);
    }

    let token = assembly.public_key_token()?;
    Ok(token.is_some_and(|token| token.as_bytes().as_slice() == reference.public_key_or_token))
}
