use std::io::Read;
use std::path::Path;

use bytemuck::Pod;

use super::file_formats::meshfile::{read_mesh_block, write_mesh_block, MeshView};
use super::file_formats::reader::{AsciiReader, AssetReader, BinaryReader};
use super::file_formats::vertex_format::VertexFormat;
use super::file_formats::writer::{AsciiWriter, AssetWriter, BinaryWriter};
use super::material::{intern_material, Material};
use super::{asset_directory, create_file, open_file, vertices_from_bytes, AssetEncoding};
use crate::error::{AssetError, Result};

#[derive(Clone, Debug)]
pub struct Mesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
    /// index into the owning model's materials
    pub material: usize,
}
impl<V: Pod> Mesh<V> {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Static meshes sharing a vertex format, with their deduplicated materials.
#[derive(Clone, Debug)]
pub struct Model<V> {
    pub format: VertexFormat,
    pub meshes: Vec<Mesh<V>>,
    pub materials: Vec<Material>,
}
impl<V: Pod> Model<V> {
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

    /// `origin` names the source in errors and qualifies texture names.
    pub fn read_ascii<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut AsciiReader::from_reader(reader, origin.as_ref())?)
    }

    pub fn read_binary<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut BinaryReader::new(reader, origin.as_ref()))
    }

    pub fn read<R: AssetReader>(reader: &mut R) -> Result<Self> {
        let directory = asset_directory(reader.origin());
        let block = read_mesh_block(reader, &directory, false, std::mem::size_of::<V>())?;
        let stride = block.format.byte_size(false);

        let mut materials = vec![];
        let mut meshes = Vec::with_capacity(block.meshes.len());
        for record in block.meshes {
            let count = if stride == 0 { 0 } else { record.vertices.len() / stride };
            meshes.push(Mesh {
                vertices: vertices_from_bytes(&record.vertices, count),
                indices: record.indices,
                material: intern_material(&mut materials, record.material),
            });
        }
        log::info!(
            "loaded model {} ({} meshes, {} materials)",
            reader.origin().display(),
            meshes.len(),
            materials.len()
        );
        Ok(Self { format: block.format, meshes, materials })
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
        self.format.validate(false, std::mem::size_of::<V>())?;
        let mut views = Vec::with_capacity(self.meshes.len());
        for mesh in &self.meshes {
            views.push(MeshView {
                vertices: mesh.vertex_bytes(),
                indices: &mesh.indices,
                bones: vec![],
                material: self.material(mesh)?,
            });
        }
        write_mesh_block(writer, self.format, false, &views)?;
        writer.flush()
    }

    pub fn material(&self, mesh: &Mesh<V>) -> Result<&Material> {
        self.materials.get(mesh.material).ok_or(AssetError::MaterialReference {
            index: mesh.material,
            count: self.materials.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_index_is_range_checked() {
        let model = Model::<[f32; 3]> {
            format: VertexFormat::POSITION,
            meshes: vec![Mesh { vertices: vec![[0.0; 3]], indices: vec![0], material: 1 }],
            materials: vec![Material::new("Only")],
        };
        match model.material(&model.meshes[0]) {
            Err(AssetError::MaterialReference { index, count }) => {
                assert_eq!(index, 1);
                assert_eq!(count, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(model.write(&mut BinaryWriter::new(Vec::new(), "mem")).is_err());
    }

    #[test]
    fn byte_views() {
        let mesh = Mesh::<[f32; 3]> { vertices: vec![[1.0, 2.0, 3.0]; 2], indices: vec![0, 1, 1], material: 0 };
        assert_eq!(mesh.vertex_bytes().len(), 24);
        assert_eq!(mesh.index_bytes().len(), 12);
    }
}
