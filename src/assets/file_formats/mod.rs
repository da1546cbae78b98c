//! On-disk encodings. Every asset exists as whitespace separated ASCII and as
//! little-endian binary; both carry the same fields in the same order.

pub mod animationfile;
pub mod hierarchyfile;
pub mod meshfile;
pub mod reader;
pub mod vertex_format;
pub mod writer;

/// ASCII marker closing the scope of the current hierarchy node.
pub const CHILD_END_TRANSFORM: &str = "ChildEndTransform";

/// ASCII spelling of a material texture slot without a texture.
pub const NULL_TEXTURE: &str = "null";
