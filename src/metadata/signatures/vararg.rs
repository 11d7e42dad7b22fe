use crate::{
    metadata::{
        signatures::{
            signature_kind, CallingConventionFlags, SignatureImporter, CALLING_CONVENTION,
            DEFAULT_MAX_DEPTH, ELEMENT_TYPE,
        },
        token::Token,
    },
    utils::write_compressed_uint,
    Error, Parser, Result,
};

/// Reduce a vararg call-site signature to the signature of the method definition it calls
///
/// Everything from the `SENTINEL` on is dropped and the parameter count is rewritten to the
/// number of fixed parameters. The new count may need fewer bytes than the old one, so the
/// result is never longer than `method_ref_sig`. Signatures without a vararg tail are returned
/// unchanged.
///
/// ```rust
/// use dotlink::metadata::signatures::project_method_def_sig;
///
/// // vararg void M(int32, ..., string)
/// let call_site = [0x05, 0x02, 0x01, 0x08, 0x41, 0x0E];
/// assert_eq!(project_method_def_sig(&call_site)?, vec![0x05, 0x01, 0x01, 0x08]);
/// # Ok::<(), dotlink::Error>(())
/// ```
///
/// # Errors
/// Returns [`crate::Error::CorruptMetadata`] if the signature is malformed.
pub fn project_method_def_sig(method_ref_sig: &[u8]) -> Result<Vec<u8>> {
    let mut header_parser = Parser::new(method_ref_sig);
    let header = header_parser.peek_byte().map_err(truncated)?;
    if signature_kind(header) != CALLING_CONVENTION::VARARG {
        return Ok(method_ref_sig.to_vec());
    }

    header_parser.read_u8().map_err(truncated)?;
    if CallingConventionFlags::from_header(header).contains(CallingConventionFlags::GENERIC) {
        header_parser.read_compressed_uint().map_err(truncated)?;
    }
    let count_start = header_parser.pos();
    let param_count = header_parser.read_compressed_uint().map_err(truncated)?;
    let count_end = header_parser.pos();

    let mut untranslated = |token: Token| -> Result<Token> { Ok(token) };
    let mut walker = SignatureImporter::new(method_ref_sig, &mut untranslated, DEFAULT_MAX_DEPTH)?;
    walker.seek(count_end)?;
    walker.type_sig().map_err(truncated)?;

    for fixed in 0..param_count {
        if walker.peek().map_err(truncated)? == ELEMENT_TYPE::SENTINEL {
            let cut = walker.pos();

            let mut projected = Vec::new();
            projected.try_reserve(cut)?;
            projected.extend_from_slice(&method_ref_sig[..count_start]);
            write_compressed_uint(fixed, &mut projected)?;
            projected.extend_from_slice(&method_ref_sig[count_end..cut]);
            return Ok(projected);
        }
        walker.type_sig().map_err(truncated)?;
    }

    Ok(method_ref_sig.to_vec())
}

fn truncated(error: Error) -> Error {
    match error {
        Error::OutOfBounds => corrupt_error!("method signature ends prematurely"),
        other => other,
    }
}
