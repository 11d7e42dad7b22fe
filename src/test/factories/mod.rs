//! Factory methods for test images.

mod images;

pub use images::*;
