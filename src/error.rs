use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! corrupt_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::CorruptMetadata {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::CorruptMetadata {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every fallible operation in the importer, the signature codec, the strong-name calculator and
/// the storage facade reports through this enum. Failures are deterministic functions of the
/// input metadata, so no variant carries retry semantics.
///
/// # Error Categories
///
/// ## Identity Errors
/// - [`Error::InvalidPublicKey`] - A public key blob failed validation
///
/// ## Metadata Errors
/// - [`Error::CorruptMetadata`] - Structurally inconsistent rows or a signature grammar violation
/// - [`Error::RecordNotFound`] - A required definition could not be located
/// - [`Error::OutOfBounds`] - A read ran past the end of a blob or heap
/// - [`Error::RecursionLimit`] - Signature nesting exceeded the configured depth
///
/// ## Caller Errors
/// - [`Error::InvalidArgument`] - A token of the wrong kind was handed to an entry point
/// - [`Error::InvalidToken`] - A token that does not address an existing row
///
/// ## Resource Errors
/// - [`Error::OutOfMemory`] - A heap or blob buffer could not grow
/// - [`Error::LockError`] - The lock guarding an image was poisoned
///
/// # Examples
///
/// ```rust
/// use dotlink::{Error, metadata::identity::StrongNameToken};
///
/// match StrongNameToken::from_public_key(&[0x01, 0x02]) {
///     Ok(token) => println!("token: {}", token),
///     Err(Error::InvalidPublicKey) => eprintln!("not a public key blob"),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The public key blob is malformed or uses an unsupported algorithm.
    ///
    /// Raised by the strong-name token calculator when the blob header is truncated, the
    /// declared key length does not match, the hash or signature algorithm class is wrong,
    /// or the key does not start with a `PUBLICKEYBLOB` marker.
    #[error("Invalid public key blob")]
    InvalidPublicKey,

    /// The metadata is structurally inconsistent.
    ///
    /// Covers dangling resolution scopes, cyclic or broken nested-class chains, `ExportedType`
    /// entries pointing at an unresolvable implementation and signature grammar violations. The
    /// error includes the source location where the inconsistency was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was inconsistent
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Corrupt metadata - {file}:{line}: {message}")]
    CorruptMetadata {
        /// The message to be printed for the CorruptMetadata error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A lookup found nothing where a definition must exist.
    ///
    /// For example a `TypeRef` claiming to resolve into an assembly that neither exports nor
    /// defines a type of that name.
    #[error("Record not found - {0}")]
    RecordNotFound(String),

    /// A heap or blob buffer could not be grown.
    #[error("Out of memory while growing a buffer")]
    OutOfMemory,

    /// The caller passed a token or value outside the domain the entry point accepts.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// The token does not address an existing row of its table.
    #[error("Invalid token - {0}")]
    InvalidToken(Token),

    /// An out of bound access was attempted while reading a blob or heap.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Recursion limit reached.
    ///
    /// To prevent stack overflow while walking deeply nested signatures, a maximum depth is
    /// enforced. The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to lock target.
    ///
    /// This error occurs when the lock guarding an [`crate::metadata::image::Image`] was
    /// poisoned by a panicking writer.
    #[error("Failed to lock target")]
    LockError,
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_error_records_location() {
        let error = corrupt_error!("dangling scope {}", 7);
        match error {
            Error::CorruptMetadata {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "dangling scope 7");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::RecordNotFound("Foo.Bar".to_string()).to_string(),
            "Record not found - Foo.Bar"
        );
        assert_eq!(
            Error::InvalidToken(Token::new(0x0100_0005)).to_string(),
            "Invalid token - 0x01000005"
        );
        assert_eq!(
            Error::RecursionLimit(64).to_string(),
            "Reach the maximum recursion level allowed - 64"
        );
    }

    #[test]
    fn test_try_reserve_maps_to_out_of_memory() {
        let mut buffer: Vec<u8> = Vec::new();
        let error: Error = buffer.try_reserve(usize::MAX).unwrap_err().into();
        assert!(matches!(error, Error::OutOfMemory));
    }
}
