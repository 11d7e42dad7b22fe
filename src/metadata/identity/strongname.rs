//! Strong name tokens.
//!
//! A strong name token is the short form of an assembly's public key: the last 8 bytes of the
//! SHA-1 hash of the full public key blob, in reversed byte order. Keys shipped with the .NET
//! SDK, and the ECMA pseudo-key, are looked up in a fixed table before anything is hashed.
//!
//! A public key blob starts with a 12-byte header of three little-endian `u32` values
//! (signature algorithm, hash algorithm, key length) followed by the key itself.
//!
//! # Examples
//!
//! ```rust
//! use dotlink::metadata::identity::StrongNameToken;
//!
//! let ecma = [0u8, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];
//! let token = StrongNameToken::from_public_key(&ecma)?;
//! assert_eq!(token.to_string(), "b77a5c561934e089");
//! # Ok::<(), dotlink::Error>(())
//! ```
//!
//! ## Reference
//! * [ECMA-335 Partition II, Section 6.2.1.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Originator's public key

use std::fmt;

use sha1::{Digest, Sha1};

use crate::{utils::Parser, Error, Result};

/// Size of a strong name token in bytes
pub const STRONG_NAME_TOKEN_SIZE: usize = 8;

/// Size of the public key blob header
const PUBLIC_KEY_HEADER_SIZE: usize = 12;

const ALG_CLASS_MASK: u32 = 7 << 13;
const ALG_CLASS_SIGNATURE: u32 = 1 << 13;
const ALG_CLASS_HASH: u32 = 4 << 13;
const ALG_SID_MASK: u32 = 511;
const ALG_SID_SHA1: u32 = 4;

/// `PUBLICKEYBLOB`, the first byte of every key that follows the header
const PUBLIC_KEY_BLOB: u8 = 0x06;

/// The ECMA pseudo public key
pub const ECMA_PUBLIC_KEY: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];
const ECMA_TOKEN: [u8; 8] = [0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89];

/// SDK strong name key `Microsoft`
const MICROSOFT_KEY: [u8; 160] = [
    0x00, 0x24, 0x00, 0x00, 0x04, 0x80, 0x00, 0x00, 0x94, 0x00, 0x00, 0x00, 0x06, 0x02, 0x00, 0x00,
    0x00, 0x24, 0x00, 0x00, 0x52, 0x53, 0x41, 0x31, 0x00, 0x04, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x07, 0xd1, 0xfa, 0x57, 0xc4, 0xae, 0xd9, 0xf0, 0xa3, 0x2e, 0x84, 0xaa, 0x0f, 0xae, 0xfd, 0x0d,
    0xe9, 0xe8, 0xfd, 0x6a, 0xec, 0x8f, 0x87, 0xfb, 0x03, 0x76, 0x6c, 0x83, 0x4c, 0x99, 0x92, 0x1e,
    0xb2, 0x3b, 0xe7, 0x9a, 0xd9, 0xd5, 0xdc, 0xc1, 0xdd, 0x9a, 0xd2, 0x36, 0x13, 0x21, 0x02, 0x90,
    0x0b, 0x72, 0x3c, 0xf9, 0x80, 0x95, 0x7f, 0xc4, 0xe1, 0x77, 0x10, 0x8f, 0xc6, 0x07, 0x77, 0x4f,
    0x29, 0xe8, 0x32, 0x0e, 0x92, 0xea, 0x05, 0xec, 0xe4, 0xe8, 0x21, 0xc0, 0xa5, 0xef, 0xe8, 0xf1,
    0x64, 0x5c, 0x4c, 0x0c, 0x93, 0xc1, 0xab, 0x99, 0x28, 0x5d, 0x62, 0x2c, 0xaa, 0x65, 0x2c, 0x1d,
    0xfa, 0xd6, 0x3d, 0x74, 0x5d, 0x6f, 0x2d, 0xe5, 0xf1, 0x7e, 0x5e, 0xaf, 0x0f, 0xc4, 0x96, 0x3d,
    0x26, 0x1c, 0x8a, 0x12, 0x43, 0x65, 0x18, 0x20, 0x6d, 0xc0, 0x93, 0x34, 0x4d, 0x5a, 0xd2, 0x93,
];
const MICROSOFT_TOKEN: [u8; 8] = [0xb0, 0x3f, 0x5f, 0x7f, 0x11, 0xd5, 0x0a, 0x3a];

/// SDK strong name key `SilverlightPlatform`
const SILVERLIGHT_PLATFORM_KEY: [u8; 160] = [
    0x00, 0x24, 0x00, 0x00, 0x04, 0x80, 0x00, 0x00, 0x94, 0x00, 0x00, 0x00, 0x06, 0x02, 0x00, 0x00,
    0x00, 0x24, 0x00, 0x00, 0x52, 0x53, 0x41, 0x31, 0x00, 0x04, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x8d, 0x56, 0xc7, 0x6f, 0x9e, 0x86, 0x49, 0x38, 0x30, 0x49, 0xf3, 0x83, 0xc4, 0x4b, 0xe0, 0xec,
    0x20, 0x41, 0x81, 0x82, 0x2a, 0x6c, 0x31, 0xcf, 0x5e, 0xb7, 0xef, 0x48, 0x69, 0x44, 0xd0, 0x32,
    0x18, 0x8e, 0xa1, 0xd3, 0x92, 0x07, 0x63, 0x71, 0x2c, 0xcb, 0x12, 0xd7, 0x5f, 0xb7, 0x7e, 0x98,
    0x11, 0x14, 0x9e, 0x61, 0x48, 0xe5, 0xd3, 0x2f, 0xba, 0xab, 0x37, 0x61, 0x1c, 0x18, 0x78, 0xdd,
    0xc1, 0x9e, 0x20, 0xef, 0x13, 0x5d, 0x0c, 0xb2, 0xcf, 0xf2, 0xbf, 0xec, 0x3d, 0x11, 0x58, 0x10,
    0xc3, 0xd9, 0x06, 0x96, 0x38, 0xfe, 0x4b, 0xe2, 0x15, 0xdb, 0xf7, 0x95, 0x86, 0x19, 0x20, 0xe5,
    0xab, 0x6f, 0x7d, 0xb2, 0xe2, 0xce, 0xef, 0x13, 0x6a, 0xc2, 0x3d, 0x5d, 0xd2, 0xbf, 0x03, 0x17,
    0x00, 0xae, 0xc2, 0x32, 0xf6, 0xc6, 0xb1, 0xc7, 0x85, 0xb4, 0x30, 0x5c, 0x12, 0x3b, 0x37, 0xab,
];
const SILVERLIGHT_PLATFORM_TOKEN: [u8; 8] = [0x7c, 0xec, 0x85, 0xd7, 0xbe, 0xa7, 0x79, 0x8e];

/// SDK strong name key `MicrosoftShared`
const MICROSOFT_SHARED_KEY: [u8; 160] = [
    0x00, 0x24, 0x00, 0x00, 0x04, 0x80, 0x00, 0x00, 0x94, 0x00, 0x00, 0x00, 0x06, 0x02, 0x00, 0x00,
    0x00, 0x24, 0x00, 0x00, 0x52, 0x53, 0x41, 0x31, 0x00, 0x04, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0xb5, 0xfc, 0x90, 0xe7, 0x02, 0x7f, 0x67, 0x87, 0x1e, 0x77, 0x3a, 0x8f, 0xde, 0x89, 0x38, 0xc8,
    0x1d, 0xd4, 0x02, 0xba, 0x65, 0xb9, 0x20, 0x1d, 0x60, 0x59, 0x3e, 0x96, 0xc4, 0x92, 0x65, 0x1e,
    0x88, 0x9c, 0xc1, 0x3f, 0x14, 0x15, 0xeb, 0xb5, 0x3f, 0xac, 0x11, 0x31, 0xae, 0x0b, 0xd3, 0x33,
    0xc5, 0xee, 0x60, 0x21, 0x67, 0x2d, 0x97, 0x18, 0xea, 0x31, 0xa8, 0xae, 0xbd, 0x0d, 0xa0, 0x07,
    0x2f, 0x25, 0xd8, 0x7d, 0xba, 0x6f, 0xc9, 0x0f, 0xfd, 0x59, 0x8e, 0xd4, 0xda, 0x35, 0xe4, 0x4c,
    0x39, 0x8c, 0x45, 0x43, 0x07, 0xe8, 0xe3, 0x3b, 0x84, 0x26, 0x14, 0x3d, 0xae, 0xc9, 0xf5, 0x96,
    0x83, 0x6f, 0x97, 0xc8, 0xf7, 0x47, 0x50, 0xe5, 0x97, 0x5c, 0x64, 0xe2, 0x18, 0x9f, 0x45, 0xde,
    0xf4, 0x6b, 0x2a, 0x2b, 0x12, 0x47, 0xad, 0xc3, 0x65, 0x2b, 0xf5, 0xc3, 0x08, 0x05, 0x5d, 0xa9,
];
const MICROSOFT_SHARED_TOKEN: [u8; 8] = [0x31, 0xbf, 0x38, 0x56, 0xad, 0x36, 0x4e, 0x35];

/// SDK strong name key `MicrosoftAspNetCore`
const ASP_NET_CORE_KEY: [u8; 160] = [
    0x00, 0x24, 0x00, 0x00, 0x04, 0x80, 0x00, 0x00, 0x94, 0x00, 0x00, 0x00, 0x06, 0x02, 0x00, 0x00,
    0x00, 0x24, 0x00, 0x00, 0x52, 0x53, 0x41, 0x31, 0x00, 0x04, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0xf3, 0x3a, 0x29, 0x04, 0x4f, 0xa9, 0xd7, 0x40, 0xc9, 0xb3, 0x21, 0x3a, 0x93, 0xe5, 0x7c, 0x84,
    0xb4, 0x72, 0xc8, 0x4e, 0x0b, 0x8a, 0x0e, 0x1a, 0xe4, 0x8e, 0x67, 0xa9, 0xf8, 0xf6, 0xde, 0x9d,
    0x5f, 0x7f, 0x3d, 0x52, 0xac, 0x23, 0xe4, 0x8a, 0xc5, 0x18, 0x01, 0xf1, 0xdc, 0x95, 0x0a, 0xbe,
    0x90, 0x1d, 0xa3, 0x4d, 0x2a, 0x9e, 0x3b, 0xaa, 0xdb, 0x14, 0x1a, 0x17, 0xc7, 0x7e, 0xf3, 0xc5,
    0x65, 0xdd, 0x5e, 0xe5, 0x05, 0x4b, 0x91, 0xcf, 0x63, 0xbb, 0x3c, 0x6a, 0xb8, 0x3f, 0x72, 0xab,
    0x3a, 0xaf, 0xe9, 0x3d, 0x0f, 0xc3, 0xc2, 0x34, 0x8b, 0x76, 0x4f, 0xaf, 0xb0, 0xb1, 0xc0, 0x73,
    0x3d, 0xe5, 0x14, 0x59, 0xae, 0xab, 0x46, 0x58, 0x03, 0x84, 0xbf, 0x9d, 0x74, 0xc4, 0xe2, 0x81,
    0x64, 0xb7, 0xcd, 0xe2, 0x47, 0xf8, 0x91, 0xba, 0x07, 0x89, 0x1c, 0x9d, 0x87, 0x2a, 0xd2, 0xbb,
];
const ASP_NET_CORE_TOKEN: [u8; 8] = [0xad, 0xb9, 0x79, 0x38, 0x29, 0xdd, 0xae, 0x60];

/// SDK strong name key `Open`
const OPEN_KEY: [u8; 160] = [
    0x00, 0x24, 0x00, 0x00, 0x04, 0x80, 0x00, 0x00, 0x94, 0x00, 0x00, 0x00, 0x06, 0x02, 0x00, 0x00,
    0x00, 0x24, 0x00, 0x00, 0x52, 0x53, 0x41, 0x31, 0x00, 0x04, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x4b, 0x86, 0xc4, 0xcb, 0x78, 0x54, 0x9b, 0x34, 0xba, 0xb6, 0x1a, 0x3b, 0x18, 0x00, 0xe2, 0x3b,
    0xfe, 0xb5, 0xb3, 0xec, 0x39, 0x00, 0x74, 0x04, 0x15, 0x36, 0xa7, 0xe3, 0xcb, 0xd9, 0x7f, 0x5f,
    0x04, 0xcf, 0x0f, 0x85, 0x71, 0x55, 0xa8, 0x92, 0x8e, 0xaa, 0x29, 0xeb, 0xfd, 0x11, 0xcf, 0xbb,
    0xad, 0x3b, 0xa7, 0x0e, 0xfe, 0xa7, 0xbd, 0xa3, 0x22, 0x6c, 0x6a, 0x8d, 0x37, 0x0a, 0x4c, 0xd3,
    0x03, 0xf7, 0x14, 0x48, 0x6b, 0x6e, 0xbc, 0x22, 0x59, 0x85, 0xa6, 0x38, 0x47, 0x1e, 0x6e, 0xf5,
    0x71, 0xcc, 0x92, 0xa4, 0x61, 0x3c, 0x00, 0xb8, 0xfa, 0x65, 0xd6, 0x1c, 0xce, 0xe0, 0xcb, 0xe5,
    0xf3, 0x63, 0x30, 0xc9, 0xa0, 0x1f, 0x41, 0x83, 0x55, 0x9f, 0x1b, 0xef, 0x24, 0xcc, 0x29, 0x17,
    0xc6, 0xd9, 0x13, 0xe3, 0xa5, 0x41, 0x33, 0x3a, 0x1d, 0x05, 0xd9, 0xbe, 0xd2, 0x2b, 0x38, 0xcb,
];
const OPEN_TOKEN: [u8; 8] = [0xcc, 0x7b, 0x13, 0xff, 0xcd, 0x2d, 0xdd, 0x51];

/// Full key blobs whose tokens are known without hashing
static WELL_KNOWN_KEYS: [(&[u8], [u8; 8]); 6] = [
    (&ECMA_PUBLIC_KEY, ECMA_TOKEN),
    (&MICROSOFT_KEY, MICROSOFT_TOKEN),
    (&SILVERLIGHT_PLATFORM_KEY, SILVERLIGHT_PLATFORM_TOKEN),
    (&MICROSOFT_SHARED_KEY, MICROSOFT_SHARED_TOKEN),
    (&ASP_NET_CORE_KEY, ASP_NET_CORE_TOKEN),
    (&OPEN_KEY, OPEN_TOKEN),
];

/// The 8-byte short form of a public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrongNameToken([u8; STRONG_NAME_TOKEN_SIZE]);

impl StrongNameToken {
    /// Wrap raw token bytes
    #[must_use]
    pub fn new(bytes: [u8; STRONG_NAME_TOKEN_SIZE]) -> Self {
        StrongNameToken(bytes)
    }

    /// Read a token from a `PublicKeyOrToken` blob that holds one
    ///
    /// # Errors
    /// Returns [`Error::InvalidPublicKey`] if the blob is not exactly 8 bytes long.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let bytes: [u8; STRONG_NAME_TOKEN_SIZE] =
            data.try_into().map_err(|_| Error::InvalidPublicKey)?;
        Ok(StrongNameToken(bytes))
    }

    /// Compute the token of a full public key blob.
    ///
    /// Well-known keys resolve through a table lookup; this is also the only way the ECMA
    /// pseudo-key resolves, since it fails blob validation. Any other blob must carry a
    /// consistent header and a `PUBLICKEYBLOB` key before it is hashed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPublicKey`] if the blob is malformed.
    pub fn from_public_key(blob: &[u8]) -> Result<Self> {
        if let Some((_, token)) = WELL_KNOWN_KEYS.iter().find(|(key, _)| *key == blob) {
            return Ok(StrongNameToken(*token));
        }

        validate_public_key(blob)?;

        let mut hasher = Sha1::new();
        hasher.update(blob);
        let hash = hasher.finalize();

        let mut token = [0u8; STRONG_NAME_TOKEN_SIZE];
        token.copy_from_slice(&hash[hash.len() - STRONG_NAME_TOKEN_SIZE..]);
        token.reverse();

        Ok(StrongNameToken(token))
    }

    /// The token bytes in blob order
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; STRONG_NAME_TOKEN_SIZE] {
        &self.0
    }
}

fn validate_public_key(blob: &[u8]) -> Result<()> {
    if blob.len() < PUBLIC_KEY_HEADER_SIZE {
        return Err(Error::InvalidPublicKey);
    }

    let mut parser = Parser::new(blob);
    let sig_alg_id = parser.read_u32_le()?;
    let hash_alg_id = parser.read_u32_le()?;
    let key_length = parser.read_u32_le()? as usize;

    if key_length != blob.len() - PUBLIC_KEY_HEADER_SIZE {
        return Err(Error::InvalidPublicKey);
    }

    if hash_alg_id != 0
        && (hash_alg_id & ALG_CLASS_MASK != ALG_CLASS_HASH
            || hash_alg_id & ALG_SID_MASK < ALG_SID_SHA1)
    {
        return Err(Error::InvalidPublicKey);
    }

    if sig_alg_id != 0 && sig_alg_id & ALG_CLASS_MASK != ALG_CLASS_SIGNATURE {
        return Err(Error::InvalidPublicKey);
    }

    if key_length == 0 || parser.read_u8()? != PUBLIC_KEY_BLOB {
        return Err(Error::InvalidPublicKey);
    }

    Ok(())
}

impl fmt::Display for StrongNameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for StrongNameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrongNameToken({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashed(blob: &[u8]) -> StrongNameToken {
        validate_public_key(blob).unwrap();
        let hash = Sha1::digest(blob);
        let mut token = [0u8; 8];
        token.copy_from_slice(&hash[12..]);
        token.reverse();
        StrongNameToken(token)
    }

    #[test]
    fn test_ecma_key() {
        let token = StrongNameToken::from_public_key(&ECMA_PUBLIC_KEY).unwrap();
        assert_eq!(token.as_bytes(), &ECMA_TOKEN);
        assert!(validate_public_key(&ECMA_PUBLIC_KEY).is_err());
    }

    #[test]
    fn test_well_known_keys_match_hash() {
        for (key, token) in WELL_KNOWN_KEYS.iter().skip(1) {
            assert_eq!(hashed(key).as_bytes(), token);
            assert_eq!(StrongNameToken::from_public_key(key).unwrap().as_bytes(), token);
        }
    }

    #[test]
    fn test_microsoft_key() {
        let token = StrongNameToken::from_public_key(&MICROSOFT_KEY).unwrap();
        assert_eq!(token.to_string(), "b03f5f7f11d50a3a");
    }

    #[test]
    fn test_microsoft_shared_key() {
        let token = StrongNameToken::from_public_key(&MICROSOFT_SHARED_KEY).unwrap();
        assert_eq!(token.as_bytes(), &MICROSOFT_SHARED_TOKEN);
        assert_eq!(token.to_string(), "31bf3856ad364e35");
    }

    #[test]
    fn test_hashed_key() {
        let mut key = MICROSOFT_KEY.to_vec();
        key[40] ^= 0xFF;

        let token = StrongNameToken::from_public_key(&key).unwrap();
        assert_ne!(token.as_bytes(), &MICROSOFT_TOKEN);
        assert_eq!(token, hashed(&key));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            StrongNameToken::from_public_key(&[0; 11]),
            Err(Error::InvalidPublicKey)
        ));

        // length field disagrees with the blob
        let mut key = MICROSOFT_KEY.to_vec();
        key.push(0);
        assert!(StrongNameToken::from_public_key(&key).is_err());

        // hash algorithm of the wrong class
        let mut key = MICROSOFT_KEY.to_vec();
        key[5] = 0x20;
        assert!(StrongNameToken::from_public_key(&key).is_err());

        // hash algorithm weaker than SHA-1
        let mut key = MICROSOFT_KEY.to_vec();
        key[4] = 0x03;
        assert!(StrongNameToken::from_public_key(&key).is_err());

        // signature algorithm of the wrong class
        let mut key = MICROSOFT_KEY.to_vec();
        key[1] = 0x80;
        assert!(StrongNameToken::from_public_key(&key).is_err());

        // key is not a PUBLICKEYBLOB
        let mut key = MICROSOFT_KEY.to_vec();
        key[12] = 0x07;
        assert!(StrongNameToken::from_public_key(&key).is_err());

        // empty key
        assert!(StrongNameToken::from_public_key(&[0; 12]).is_err());
    }

    #[test]
    fn test_zero_algorithms_are_accepted() {
        let mut key = MICROSOFT_KEY.to_vec();
        key[..8].fill(0);
        assert_eq!(
            StrongNameToken::from_public_key(&key).unwrap(),
            hashed(&key)
        );
    }

    #[test]
    fn test_from_bytes() {
        let token = StrongNameToken::from_bytes(&ECMA_TOKEN).unwrap();
        assert_eq!(token.as_bytes(), &ECMA_TOKEN);
        assert!(StrongNameToken::from_bytes(&[1, 2, 3]).is_err());
    }
}
