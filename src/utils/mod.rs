//! Byte-level helpers shared by the heaps and the signature codec.

mod compression;
mod parser;

pub use compression::{
    compressed_uint_size, write_compressed_int, write_compressed_token, write_compressed_uint,
    MAX_COMPRESSED_UINT,
};
pub use parser::Parser;
