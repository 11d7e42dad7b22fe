//! Assembly identities.
//!
//! An [`AssemblyIdentity`] is the tuple that names an assembly across image boundaries: simple
//! name, four-part version, culture and public key or token. Identities are read from the
//! `Assembly` row of a manifest image or from any `AssemblyRef` row, and written back as
//! `AssemblyRef` rows by the importer.
//!
//! # ECMA-335 References
//!
//! - **Section II.6.2.1**: Assembly versioning
//! - **Section II.6.2.1.3**: Public key and token
//! - **Section II.22.2**: Assembly table
//! - **Section II.22.5**: AssemblyRef table

use std::fmt;

use crate::{
    metadata::{
        identity::StrongNameToken,
        image::Image,
        storage::CellValue,
        tables::{AssemblyFlags, Column, TableId},
        token::Token,
    },
    Result,
};

/// Four-part version numbering for .NET assemblies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version component
    pub major: u16,
    /// Minor version component
    pub minor: u16,
    /// Build version component
    pub build: u16,
    /// Revision version component
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a new assembly version with the specified components
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Create an `AssemblyVersion` from the u32 column values, saturating components that do
    /// not fit in 16 bits
    #[must_use]
    pub fn from_u32(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        AssemblyVersion::new(
            u16::try_from(major).unwrap_or(u16::MAX),
            u16::try_from(minor).unwrap_or(u16::MAX),
            u16::try_from(build).unwrap_or(u16::MAX),
            u16::try_from(revision).unwrap_or(u16::MAX),
        )
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// How two versions are compared when matching an assembly reference.
///
/// References to `mscorlib` and `Microsoft.VisualC` ignore build and revision numbers, so that
/// all references to those assemblies collapse onto one row. Every other name compares all
/// four components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMatcher {
    /// Compare major and minor only
    Relaxed,
    /// Compare all four components
    Strict,
}

impl VersionMatcher {
    /// Select the matcher that applies to the assembly `name`
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("mscorlib") || name.eq_ignore_ascii_case("microsoft.visualc")
        {
            VersionMatcher::Relaxed
        } else {
            VersionMatcher::Strict
        }
    }

    /// Returns true if `candidate` satisfies `wanted` under this matcher
    #[must_use]
    pub fn matches(&self, wanted: &AssemblyVersion, candidate: &AssemblyVersion) -> bool {
        match self {
            VersionMatcher::Relaxed => {
                wanted.major == candidate.major && wanted.minor == candidate.minor
            }
            VersionMatcher::Strict => wanted == candidate,
        }
    }
}

/// The identity of an assembly, as stored in an `Assembly` or `AssemblyRef` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyIdentity {
    /// Simple assembly name
    pub name: String,
    /// Four-part version
    pub version: AssemblyVersion,
    /// Culture name, empty for culture-neutral assemblies
    pub culture: String,
    /// `AssemblyFlags`; [`AssemblyFlags::PUBLIC_KEY`] tells whether
    /// `public_key_or_token` holds a full key
    pub flags: u32,
    /// Full public key blob, 8-byte token, or empty
    pub public_key_or_token: Vec<u8>,
}

impl AssemblyIdentity {
    /// Create a culture-neutral identity without a strong name
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture: String::new(),
            flags: 0,
            public_key_or_token: Vec::new(),
        }
    }

    /// Set the culture
    #[must_use]
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = culture.into();
        self
    }

    /// Attach a full public key blob
    #[must_use]
    pub fn with_public_key(mut self, key: &[u8]) -> Self {
        self.public_key_or_token = key.to_vec();
        self.flags |= AssemblyFlags::PUBLIC_KEY;
        self
    }

    /// Attach a public key token
    #[must_use]
    pub fn with_public_key_token(mut self, token: StrongNameToken) -> Self {
        self.public_key_or_token = token.as_bytes().to_vec();
        self.flags &= !AssemblyFlags::PUBLIC_KEY;
        self
    }

    /// Read the identity stored in an `AssemblyRef` row
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if `assembly_ref` does not address an
    /// `AssemblyRef` row of `image`.
    pub fn from_assembly_ref(image: &Image, assembly_ref: Token) -> Result<Self> {
        Ok(AssemblyIdentity {
            name: image.get_string(assembly_ref, Column::AssemblyRefName)?,
            version: AssemblyVersion::from_u32(
                image.get_constant(assembly_ref, Column::AssemblyRefMajorVersion)?,
                image.get_constant(assembly_ref, Column::AssemblyRefMinorVersion)?,
                image.get_constant(assembly_ref, Column::AssemblyRefBuildNumber)?,
                image.get_constant(assembly_ref, Column::AssemblyRefRevisionNumber)?,
            ),
            culture: image.get_string(assembly_ref, Column::AssemblyRefCulture)?,
            flags: image.get_constant(assembly_ref, Column::AssemblyRefFlags)?,
            public_key_or_token: image.get_blob(assembly_ref, Column::AssemblyRefPublicKeyOrToken)?,
        })
    }

    /// Read the identity of the manifest in `Assembly` row 1.
    ///
    /// A non-empty public key is reported as a full key whatever the stored flags say.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptMetadata`] if the image has no `Assembly` row.
    pub fn from_assembly(image: &Image) -> Result<Self> {
        if !image.has_assembly()? {
            return Err(corrupt_error!("Image has no Assembly row"));
        }

        let assembly = Token::from_parts(TableId::Assembly, 1);
        let public_key = image.get_blob(assembly, Column::AssemblyPublicKey)?;
        let mut flags = image.get_constant(assembly, Column::AssemblyFlags)?;
        if public_key.is_empty() {
            flags &= !AssemblyFlags::PUBLIC_KEY;
        } else {
            flags |= AssemblyFlags::PUBLIC_KEY;
        }

        Ok(AssemblyIdentity {
            name: image.get_string(assembly, Column::AssemblyName)?,
            version: AssemblyVersion::from_u32(
                image.get_constant(assembly, Column::AssemblyMajorVersion)?,
                image.get_constant(assembly, Column::AssemblyMinorVersion)?,
                image.get_constant(assembly, Column::AssemblyBuildNumber)?,
                image.get_constant(assembly, Column::AssemblyRevisionNumber)?,
            ),
            culture: image.get_string(assembly, Column::AssemblyCulture)?,
            flags,
            public_key_or_token: public_key,
        })
    }

    /// Returns true if `public_key_or_token` holds a full public key
    #[must_use]
    pub fn has_public_key(&self) -> bool {
        self.flags & AssemblyFlags::PUBLIC_KEY != 0 && !self.public_key_or_token.is_empty()
    }

    /// Returns true if the identity carries a public key or token
    #[must_use]
    pub fn is_strong_named(&self) -> bool {
        !self.public_key_or_token.is_empty()
    }

    /// The public key token, derived from the full key if needed
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPublicKey`] if the key is malformed or the token is not
    /// 8 bytes long.
    pub fn public_key_token(&self) -> Result<Option<StrongNameToken>> {
        if self.public_key_or_token.is_empty() {
            return Ok(None);
        }

        if self.has_public_key() {
            StrongNameToken::from_public_key(&self.public_key_or_token).map(Some)
        } else {
            StrongNameToken::from_bytes(&self.public_key_or_token).map(Some)
        }
    }

    /// The form this identity takes when referenced from another image: a full key is
    /// replaced by its token.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPublicKey`] if the key is malformed.
    pub fn to_reference(&self) -> Result<Self> {
        let mut reference = self.clone();
        if self.has_public_key() {
            if let Some(token) = self.public_key_token()? {
                reference = reference.with_public_key_token(token);
            }
        }
        Ok(reference)
    }

    /// The column values of an `AssemblyRef` row naming this identity
    #[must_use]
    pub fn assembly_ref_row(&self, hash: &[u8]) -> Vec<(Column, CellValue)> {
        vec![
            (Column::AssemblyRefMajorVersion, self.version.major.into()),
            (Column::AssemblyRefMinorVersion, self.version.minor.into()),
            (Column::AssemblyRefBuildNumber, self.version.build.into()),
            (Column::AssemblyRefRevisionNumber, self.version.revision.into()),
            (Column::AssemblyRefFlags, self.flags.into()),
            (
                Column::AssemblyRefPublicKeyOrToken,
                self.public_key_or_token.clone().into(),
            ),
            (Column::AssemblyRefName, self.name.as_str().into()),
            (Column::AssemblyRefCulture, self.culture.as_str().into()),
            (Column::AssemblyRefHashValue, hash.into()),
        ]
    }

    /// Format the identity as a display name
    /// (`Name, Version=1.0.0.0, Culture=neutral, PublicKeyToken=...`)
    #[must_use]
    pub fn display_name(&self) -> String {
        let culture = if self.culture.is_empty() {
            "neutral"
        } else {
            &self.culture
        };

        let token = match self.public_key_token() {
            Ok(Some(token)) => token.to_string(),
            _ => "null".to_string(),
        };

        format!(
            "{}, Version={}, Culture={}, PublicKeyToken={}",
            self.name, self.version, culture, token
        )
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
