//! Signature blob rewriting.
//!
//! Signatures embed `TypeDefOrRef` tokens of the image they were written for. Moving a
//! signature to another image means walking its grammar, copying every byte and replacing each
//! embedded token by the token a [`TokenTranslator`] hands back. The walker understands every
//! signature kind of ECMA-335 II.23.2: field, method (definition, reference and stand-alone),
//! property, local variable, generic method instantiation and type specification.
//!
//! # Key Components
//!
//! - [`import_signature`] - Rewrite a whole signature blob
//! - [`import_type_spec_blob`] - Rewrite a blob that holds a single type
//! - [`project_method_def_sig`] - Strip the vararg tail of a call-site signature
//! - [`TokenTranslator`] - The token mapping used while rewriting
//! - [`ELEMENT_TYPE`], [`CALLING_CONVENTION`], [`CallingConventionFlags`] - Grammar constants
//!
//! # Examples
//!
//! ```rust
//! use dotlink::{metadata::signatures::import_signature, Token};
//!
//! // field of type `class 0x01000001`
//! let field = [0x06, 0x12, 0x05];
//! let mut to_type_ref_2 = |_token: Token| -> dotlink::Result<Token> { Ok(Token::new(0x0100_0002)) };
//! let imported = import_signature(&field, &mut to_type_ref_2, 64)?;
//! assert_eq!(imported, vec![0x06, 0x12, 0x09]);
//! # Ok::<(), dotlink::Error>(())
//! ```
//!
//! ## Reference
//! * [ECMA-335 Partition II, Section 23.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Blobs and signatures

mod importer;
mod vararg;

pub use importer::{import_signature, import_type_spec_blob, TokenTranslator};
pub use vararg::project_method_def_sig;

pub(crate) use importer::SignatureImporter;

use bitflags::bitflags;

/// Default nesting limit for signature walks
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[allow(non_snake_case, dead_code, missing_docs)]
/// Possible bytes that represent the element types of a signature
pub mod ELEMENT_TYPE {
    //Marks end of a list
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    // type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    // Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // Followed by full method signature
    pub const FNPTR: u8 = 0x1b;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter in a generic method definition,represented as number
    pub const MVAR: u8 = 0x1e;
    // Required modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_REQD: u8 = 0x1f;
    // Optional modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_OPT: u8 = 0x20;
    // Implemented within the CLI
    pub const INTERNAL: u8 = 0x21;
    // Or’d with following element types
    pub const MODIFIER: u8 = 0x40;
    // Sentinel for vararg method signature
    pub const SENTINEL: u8 = 0x41;
    // Denotes a local variable that points at a pinned object
    pub const PINNED: u8 = 0x45;
}

#[allow(non_snake_case, dead_code, missing_docs)]
/// Signature kinds, the low nibble of the first signature byte
pub mod CALLING_CONVENTION {
    pub const DEFAULT: u8 = 0x00;
    pub const C: u8 = 0x01;
    pub const STDCALL: u8 = 0x02;
    pub const THISCALL: u8 = 0x03;
    pub const FASTCALL: u8 = 0x04;
    pub const VARARG: u8 = 0x05;
    pub const FIELD: u8 = 0x06;
    pub const LOCAL_SIG: u8 = 0x07;
    pub const PROPERTY: u8 = 0x08;
    pub const UNMANAGED: u8 = 0x09;
    pub const GENERICINST: u8 = 0x0a;
    pub const NATIVEVARARG: u8 = 0x0b;
    // Mask selecting the kind from the first byte
    pub const KIND_MASK: u8 = 0x0f;
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// Flags in the high nibble of the first signature byte
    pub struct CallingConventionFlags: u8 {
        /// The method has a generic parameter count
        const GENERIC = 0x10;
        /// The method takes an instance pointer
        const HAS_THIS = 0x20;
        /// The instance pointer is listed as the first parameter
        const EXPLICIT_THIS = 0x40;
    }
}

impl CallingConventionFlags {
    /// Extract the flags from a signature header byte
    #[must_use]
    pub fn from_header(header: u8) -> Self {
        CallingConventionFlags::from_bits_truncate(header)
    }
}

/// Extract the signature kind from a signature header byte
#[must_use]
pub fn signature_kind(header: u8) -> u8 {
    header & CALLING_CONVENTION::KIND_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_split() {
        let header = 0x30; // HASTHIS | GENERIC | DEFAULT
        assert_eq!(signature_kind(header), CALLING_CONVENTION::DEFAULT);
        assert_eq!(
            CallingConventionFlags::from_header(header),
            CallingConventionFlags::GENERIC | CallingConventionFlags::HAS_THIS
        );

        assert_eq!(signature_kind(0x25), CALLING_CONVENTION::VARARG);
        assert!(CallingConventionFlags::from_header(0x06).is_empty());
    }
}
