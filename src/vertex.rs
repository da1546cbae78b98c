use glam::Mat4;

use crate::assets::file_formats::vertex_format::VertexFormat;

/// Size of the bone palette the skinning shader declares.
pub const MAX_BONES: usize = 200;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StaticVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}
impl StaticVertex {
    pub const FORMAT: VertexFormat = VertexFormat::POSITION
        .union(VertexFormat::NORMAL)
        .union(VertexFormat::UV1)
        .union(VertexFormat::COLOR);
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub bone_indices: [u32; 4],
    pub bone_weights: [f32; 4],
}
impl SkinnedVertex {
    pub const FORMAT: VertexFormat = VertexFormat::POSITION
        .union(VertexFormat::NORMAL)
        .union(VertexFormat::UV1);
}

/// One palette entry as uploaded to the skinning shader: the rows of the
/// skinning matrix.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BoneMatrix {
    pub rows: [[f32; 4]; 4],
}

impl Default for BoneMatrix {
    fn default() -> Self {
        Self::from(Mat4::IDENTITY)
    }
}
impl BoneMatrix {
    pub fn from(skinning: Mat4) -> Self {
        Self {
            rows: skinning.transpose().to_cols_array_2d(),
        }
    }
}
