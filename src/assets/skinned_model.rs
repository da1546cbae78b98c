use std::io::Read;
use std::path::Path;

use bytemuck::Pod;
use glam::Mat4;

use super::file_formats::hierarchyfile::{read_hierarchy, write_hierarchy};
use super::file_formats::meshfile::{read_mesh_block, write_mesh_block, MeshView};
use super::file_formats::reader::{AsciiReader, AssetReader, BinaryReader};
use super::file_formats::vertex_format::VertexFormat;
use super::file_formats::writer::{AsciiWriter, AssetWriter, BinaryWriter};
use super::material::{intern_material, Material};
use super::{asset_directory, create_file, open_file, vertices_from_bytes, AssetEncoding};
use crate::error::{AssetError, Result};
use crate::scene::{Hierarchy, TransformId};
use crate::vertex::{BoneMatrix, MAX_BONES};

#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub bind_pose_inverse: Mat4,
    pub transform: TransformId,
}

#[derive(Clone, Debug)]
pub struct SkinnedMesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
    /// palette order, referenced by the vertex bone indices
    pub bones: Vec<Bone>,
    pub material: usize,
}
impl<V: Pod> SkinnedMesh<V> {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
impl<V> SkinnedMesh<V> {
    /// World matrix of every bone composed with its inverse bind pose.
    /// Panics if a bone is not part of `hierarchy`.
    pub fn skinning_matrices(&self, hierarchy: &Hierarchy) -> Vec<Mat4> {
        self.bones
            .iter()
            .map(|bone| hierarchy.local_to_world_matrix(bone.transform) * bone.bind_pose_inverse)
            .collect()
    }

    pub fn skinning_palette(&self, hierarchy: &Hierarchy) -> Vec<BoneMatrix> {
        if self.bones.len() > MAX_BONES {
            log::warn!("mesh has {} bones, the skinning palette holds {}", self.bones.len(), MAX_BONES);
        }
        self.skinning_matrices(hierarchy)
            .into_iter()
            .map(BoneMatrix::from)
            .collect()
    }
}

/// Skinned meshes together with the hierarchy their bones live in.
#[derive(Clone, Debug)]
pub struct SkinnedModel<V> {
    pub format: VertexFormat,
    pub hierarchy: Hierarchy,
    pub meshes: Vec<SkinnedMesh<V>>,
    pub materials: Vec<Material>,
}
impl<V: Pod> SkinnedModel<V> {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match AssetEncoding::from_path(path)? {
            AssetEncoding::Ascii => Self::load_ascii(path),
            AssetEncoding::Binary => Self::load_binary(path),
        }
    }

    pub fn load_ascii(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::read_ascii(open_file(path)?, path)
    }

    pub fn load_binary(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::read_binary(open_file(path)?, path)
    }

    pub fn read_ascii<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut AsciiReader::from_reader(reader, origin.as_ref())?)
    }

    pub fn read_binary<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut BinaryReader::new(reader, origin.as_ref()))
    }

    pub fn read<R: AssetReader>(reader: &mut R) -> Result<Self> {
        let hierarchy = read_hierarchy(reader)?;
        let directory = asset_directory(reader.origin());
        let block = read_mesh_block(reader, &directory, true, std::mem::size_of::<V>())?;
        let stride = block.format.byte_size(true);

        let mut materials = vec![];
        let mut meshes = Vec::with_capacity(block.meshes.len());
        for record in block.meshes {
            let mut bones = Vec::with_capacity(record.bones.len());
            for bone in record.bones {
                let transform = hierarchy
                    .find(&bone.name)
                    .ok_or_else(|| AssetError::HierarchyResolution { name: bone.name.clone() })?;
                bones.push(Bone {
                    name: bone.name,
                    bind_pose_inverse: bone.bind_pose_inverse,
                    transform,
                });
            }
            let count = record.vertices.len() / stride;
            meshes.push(SkinnedMesh {
                vertices: vertices_from_bytes(&record.vertices, count),
                indices: record.indices,
                bones,
                material: intern_material(&mut materials, record.material),
            });
        }
        log::info!(
            "loaded skinned model {} ({} transforms, {} meshes, {} materials)",
            reader.origin().display(),
            hierarchy.len(),
            meshes.len(),
            materials.len()
        );
        Ok(Self { format: block.format, hierarchy, meshes, materials })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match AssetEncoding::from_path(path)? {
            AssetEncoding::Ascii => self.write_ascii(path),
            AssetEncoding::Binary => self.write_binary(path),
        }
    }

    pub fn write_ascii(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write(&mut AsciiWriter::new(create_file(path)?, path))
    }

    pub fn write_binary(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write(&mut BinaryWriter::new(create_file(path)?, path))
    }

    pub fn write<W: AssetWriter>(&self, writer: &mut W) -> Result<()> {
        self.format.validate(true, std::mem::size_of::<V>())?;
        let mut views = Vec::with_capacity(self.meshes.len());
        for mesh in &self.meshes {
            views.push(MeshView {
                vertices: mesh.vertex_bytes(),
                indices: &mesh.indices,
                bones: mesh
                    .bones
                    .iter()
                    .map(|bone| (bone.name.as_str(), bone.bind_pose_inverse))
                    .collect(),
                material: self.material(mesh)?,
            });
        }
        write_hierarchy(writer, &self.hierarchy)?;
        write_mesh_block(writer, self.format, true, &views)?;
        writer.flush()
    }

    pub fn material(&self, mesh: &SkinnedMesh<V>) -> Result<&Material> {
        self.materials.get(mesh.material).ok_or(AssetError::MaterialReference {
            index: mesh.material,
            count: self.materials.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::scene::Transform;

    fn arm() -> (Hierarchy, SkinnedMesh<[f32; 11]>) {
        let mut hierarchy = Hierarchy::new(Transform::new("Root"));
        let shoulder = hierarchy
            .add_child(hierarchy.root(), Transform::with_trs("Shoulder", Vec3::Y, Quat::IDENTITY, Vec3::ONE))
            .unwrap();
        let elbow = hierarchy
            .add_child(shoulder, Transform::with_trs("Elbow", Vec3::X, Quat::IDENTITY, Vec3::ONE))
            .unwrap();
        let bones = [shoulder, elbow]
            .into_iter()
            .map(|id| Bone {
                name: hierarchy[id].name().to_string(),
                bind_pose_inverse: hierarchy.local_to_world_matrix(id).inverse(),
                transform: id,
            })
            .collect();
        let mesh = SkinnedMesh { vertices: vec![], indices: vec![], bones, material: 0 };
        (hierarchy, mesh)
    }

    #[test]
    fn bind_pose_skins_to_identity() {
        let (hierarchy, mesh) = arm();
        for m in mesh.skinning_matrices(&hierarchy) {
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        }
    }

    #[test]
    fn moving_a_bone_moves_its_descendants() {
        let (mut hierarchy, mesh) = arm();
        let shoulder = mesh.bones[0].transform;
        hierarchy[shoulder].position += Vec3::Z;
        let palette = mesh.skinning_palette(&hierarchy);
        assert_eq!(palette.len(), 2);
        for entry in palette {
            assert!((entry.rows[2][3] - 1.0).abs() < 1e-5);
        }
    }
}
