//! Configuration for the reference importer.

use crate::metadata::signatures::DEFAULT_MAX_DEPTH;

/// Configuration for an [`crate::ImportContext`].
///
/// Controls how deep signatures may nest and whether existing reference rows of the
/// destination are reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Maximum nesting of types and function pointers in a signature (default: 64).
    ///
    /// Also bounds how deep `TypeSpec` rows may refer to other `TypeSpec` rows.
    pub max_signature_depth: usize,

    /// Reuse an existing `TypeRef` with equal scope, name and namespace (default: true).
    pub reuse_existing_type_refs: bool,

    /// Reuse an existing `MemberRef` with equal parent, name and signature (default: true).
    pub reuse_existing_member_refs: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_signature_depth: DEFAULT_MAX_DEPTH,
            reuse_existing_type_refs: true,
            reuse_existing_member_refs: true,
        }
    }
}

impl ImportOptions {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum signature nesting depth.
    #[must_use]
    pub fn with_max_signature_depth(mut self, depth: usize) -> Self {
        self.max_signature_depth = depth;
        self
    }

    /// Enable or disable reuse of existing `TypeRef` rows.
    #[must_use]
    pub fn with_type_ref_reuse(mut self, enabled: bool) -> Self {
        self.reuse_existing_type_refs = enabled;
        self
    }

    /// Enable or disable reuse of existing `MemberRef` rows.
    #[must_use]
    pub fn with_member_ref_reuse(mut self, enabled: bool) -> Self {
        self.reuse_existing_member_refs = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::new();
        assert_eq!(options.max_signature_depth, 64);
        assert!(options.reuse_existing_type_refs);
        assert!(options.reuse_existing_member_refs);
    }

    #[test]
    fn test_builders() {
        let options = ImportOptions::new()
            .with_max_signature_depth(8)
            .with_type_ref_reuse(false)
            .with_member_ref_reuse(false);

        assert_eq!(options.max_signature_depth, 8);
        assert!(!options.reuse_existing_type_refs);
        assert!(!options.reuse_existing_member_refs);
    }
}
