//! Assembly identity and strong names.
//!
//! This module answers the question "which assembly is this?" across image boundaries. It
//! computes strong name tokens from public keys, reads identities from `Assembly` and
//! `AssemblyRef` rows and finds the `AssemblyRef` row of an image that names a given identity.
//!
//! # ECMA-335 References
//!
//! - **Section II.6.2.1.3**: Public key and token
//! - **Section II.22.2**: Assembly table
//! - **Section II.22.5**: AssemblyRef table
//!
//! # Key Components
//!
//! - [`StrongNameToken`] - 8-byte short form of a public key
//! - [`AssemblyIdentity`] / [`AssemblyVersion`] - Name, version, culture and key of an assembly
//! - [`VersionMatcher`] - Version comparison rules for reference matching
//! - [`find_assembly_ref`] - Locate the `AssemblyRef` row naming an identity
//! - [`assembly_ref_points_to_assembly`] - Check whether a reference names a manifest

mod assembly;
mod resolve;
mod strongname;

pub use assembly::{AssemblyIdentity, AssemblyVersion, VersionMatcher};
pub use resolve::{assembly_ref_points_to_assembly, find_assembly_ref};
pub use strongname::{StrongNameToken, ECMA_PUBLIC_KEY, STRONG_NAME_TOKEN_SIZE};
