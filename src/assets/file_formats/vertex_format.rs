use bitflags::bitflags;

use crate::error::{AssetError, Result};

bitflags! {
    /// Per-vertex attributes present in a mesh block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexFormat: u16 {
        const POSITION = 0x0001;
        const NORMAL = 0x0002;
        const TANGENT = 0x0004;
        const UV1 = 0x0008;
        const UV2 = 0x0010;
        const UV3 = 0x0020;
        const UV4 = 0x0040;
        const UV5 = 0x0080;
        const UV6 = 0x0100;
        const UV7 = 0x0200;
        const UV8 = 0x0400;
        const COLOR = 0x0800;
    }
}

/// Bone index (4 x u32) and bone weight (4 x f32) appended to skinned vertices.
pub const SKIN_ATTRIBUTE_BYTES: usize = 32;

/// Attribute order in the vertex stream, with byte size per attribute.
const ATTRIBUTE_SIZES: [(VertexFormat, usize); 12] = [
    (VertexFormat::POSITION, 12),
    (VertexFormat::NORMAL, 12),
    (VertexFormat::TANGENT, 12),
    (VertexFormat::UV1, 8),
    (VertexFormat::UV2, 8),
    (VertexFormat::UV3, 8),
    (VertexFormat::UV4, 8),
    (VertexFormat::UV5, 8),
    (VertexFormat::UV6, 8),
    (VertexFormat::UV7, 8),
    (VertexFormat::UV8, 8),
    (VertexFormat::COLOR, 16),
];

impl VertexFormat {
    /// Unknown bits are dropped.
    pub fn from_mask(mask: i16) -> Self {
        Self::from_bits_truncate(mask as u16)
    }

    pub fn mask(&self) -> i16 {
        self.bits() as i16
    }

    /// Set attributes with their byte sizes, in stream order.
    pub fn attributes(&self) -> impl Iterator<Item = (VertexFormat, usize)> + '_ {
        ATTRIBUTE_SIZES
            .iter()
            .copied()
            .filter(move |(flag, _)| self.contains(*flag))
    }

    pub fn byte_size(&self, skinned: bool) -> usize {
        let attributes: usize = self.attributes().map(|(_, size)| size).sum();
        if skinned {
            attributes + SKIN_ATTRIBUTE_BYTES
        } else {
            attributes
        }
    }

    /// Checks the declared layout against the size of the caller's vertex type.
    pub fn validate(&self, skinned: bool, vertex_size: usize) -> Result<()> {
        let expected = self.byte_size(skinned);
        if expected != vertex_size {
            return Err(AssetError::FormatMismatch { expected, actual: vertex_size });
        }
        Ok(())
    }
}
