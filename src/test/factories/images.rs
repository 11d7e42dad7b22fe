//! Factory methods for in-memory images.
//!
//! Every image built here uses one of a handful of fixed module version ids. Tests that need
//! two distinct modules pick two different ids; tests that need one module seen from two sides
//! pass clones of the same [`Image`].

use uguid::{guid, Guid};

use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion},
    image::Image,
    storage::ImageBuilder,
};

/// First module version id
pub fn mvid_a() -> Guid {
    guid!("1c4e8f9a-2b3d-4c5e-8f60-718293a4b5c6")
}

/// Second module version id
pub fn mvid_b() -> Guid {
    guid!("2d5f90ab-3c4e-4d6f-9071-8293a4b5c6d7")
}

/// Third module version id
pub fn mvid_c() -> Guid {
    guid!("3e60a1bc-4d5f-4e70-8182-93a4b5c6d7e8")
}

/// A module named `A.dll` holding only the `<Module>` type
pub fn simple_image() -> Image {
    ImageBuilder::new("A.dll", mvid_a())
        .expect("module row")
        .build()
}

/// A manifest module: `module_name` with an `Assembly` row for `asm_name` version 1.0.0.0,
/// strong named with `key` unless it is empty
pub fn assembly_image(module_name: &str, mvid: Guid, asm_name: &str, key: &[u8]) -> Image {
    let mut identity = AssemblyIdentity::new(asm_name, AssemblyVersion::new(1, 0, 0, 0));
    if !key.is_empty() {
        identity = identity.with_public_key(key);
    }

    let mut builder = ImageBuilder::new(module_name, mvid).expect("module row");
    builder.assembly(&identity).expect("assembly row");
    builder.build()
}
