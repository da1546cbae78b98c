use std::path::Path;

use glam::Mat4;

use crate::assets::material::Material;
use crate::error::{AssetError, Result};

use super::reader::AssetReader;
use super::vertex_format::VertexFormat;
use super::writer::AssetWriter;

/// Bone as stored in a mesh record; resolution against a hierarchy happens
/// in the skinned model loader.
#[derive(Clone, Debug)]
pub struct BoneRecord {
    pub name: String,
    pub bind_pose_inverse: Mat4,
}

#[derive(Clone, Debug)]
pub struct MeshRecord {
    pub vertices: Vec<u8>,
    pub indices: Vec<u32>,
    pub bones: Vec<BoneRecord>,
    pub material: Material,
}

#[derive(Clone, Debug)]
pub struct MeshBlock {
    pub format: VertexFormat,
    pub meshes: Vec<MeshRecord>,
}

/// Borrowed view of one mesh for the writers.
pub struct MeshView<'a> {
    pub vertices: &'a [u8],
    pub indices: &'a [u32],
    pub bones: Vec<(&'a str, Mat4)>,
    pub material: &'a Material,
}

/// Reads the vertex format, validates it against `vertex_size` and reads all
/// mesh records. Texture names are resolved against `directory`.
pub fn read_mesh_block<R: AssetReader>(
    reader: &mut R,
    directory: &Path,
    skinned: bool,
    vertex_size: usize,
) -> Result<MeshBlock> {
    let format = VertexFormat::from_mask(reader.read_i16("vertex format")?);
    format.validate(skinned, vertex_size)?;

    let mesh_count = reader.read_u16("mesh count")?;
    let mut meshes = Vec::with_capacity(mesh_count as usize);
    for _ in 0..mesh_count {
        meshes.push(read_mesh(reader, directory, format, skinned)?);
    }
    log::debug!("read {} meshes ({:?}) from {}", meshes.len(), format, reader.origin().display());
    Ok(MeshBlock { format, meshes })
}

fn read_mesh<R: AssetReader>(
    reader: &mut R,
    directory: &Path,
    format: VertexFormat,
    skinned: bool,
) -> Result<MeshRecord> {
    let vertex_count = reader.read_u32("vertex count")? as usize;
    let vertices = reader.read_vertices(format, skinned, vertex_count, "vertices")?;

    let index_count = reader.read_u32("index count")? as usize;
    let indices = reader.read_u32s(index_count, "indices")?;

    // static meshes go straight from indices to the material
    let bones = if skinned { read_bones(reader)? } else { vec![] };

    let material = read_material(reader, directory)?;
    Ok(MeshRecord { vertices, indices, bones, material })
}

fn read_bones<R: AssetReader>(reader: &mut R) -> Result<Vec<BoneRecord>> {
    let bone_count = reader.read_u16("bone count")?;
    let mut bones = Vec::with_capacity(bone_count as usize);
    for _ in 0..bone_count {
        let name = reader.read_string("bone name")?;
        let values = reader.read_f32s(16, "bind pose")?;
        let mut cols = [0.0; 16];
        cols.copy_from_slice(&values);
        // stored row-major
        bones.push(BoneRecord {
            name,
            bind_pose_inverse: Mat4::from_cols_array(&cols).transpose(),
        });
    }
    Ok(bones)
}

pub fn read_material<R: AssetReader>(reader: &mut R, directory: &Path) -> Result<Material> {
    let mut material = Material::new(&reader.read_string("material name")?);

    let color_count = reader.read_u16("color property count")?;
    for _ in 0..color_count {
        let property = reader.read_string("color property name")?;
        let color = reader.read_vec4("color")?;
        material.add_color(&property, color);
    }

    let texture_count = reader.read_u16("texture property count")?;
    for _ in 0..texture_count {
        let property = reader.read_string("texture property name")?;
        let file_name = reader.read_texture_name("texture name")?;
        material.add_texture(&property, file_name.as_deref(), directory);
    }
    Ok(material)
}

pub fn write_mesh_block<'a, W: AssetWriter>(
    writer: &mut W,
    format: VertexFormat,
    skinned: bool,
    meshes: &[MeshView<'a>],
) -> Result<()> {
    writer.write_i16(format.mask())?;
    writer.end_record()?;
    writer.write_u16(count("mesh count", meshes.len())?)?;
    writer.end_record()?;
    let stride = format.byte_size(skinned);
    for mesh in meshes {
        write_mesh(writer, format, skinned, stride, mesh)?;
    }
    Ok(())
}

fn write_mesh<W: AssetWriter>(
    writer: &mut W,
    format: VertexFormat,
    skinned: bool,
    stride: usize,
    mesh: &MeshView,
) -> Result<()> {
    let vertex_count = if stride == 0 { 0 } else { mesh.vertices.len() / stride };
    writer.write_u32(count("vertex count", vertex_count)?)?;
    writer.end_record()?;
    writer.write_vertices(format, skinned, mesh.vertices)?;

    writer.write_u32(count("index count", mesh.indices.len())?)?;
    writer.end_record()?;
    writer.write_u32s(mesh.indices)?;
    writer.end_record()?;

    if skinned {
        writer.write_u16(count("bone count", mesh.bones.len())?)?;
        writer.end_record()?;
        for (name, bind_pose_inverse) in &mesh.bones {
            writer.write_string("bone name", name)?;
            writer.end_record()?;
            writer.write_f32s(&bind_pose_inverse.transpose().to_cols_array())?;
            writer.end_record()?;
        }
    } else if !mesh.bones.is_empty() {
        return Err(AssetError::Encode {
            field: "bone count".to_string(),
            value: mesh.bones.len().to_string(),
        });
    }

    write_material(writer, mesh.material)
}

pub fn write_material<W: AssetWriter>(writer: &mut W, material: &Material) -> Result<()> {
    writer.write_string("material name", &material.name)?;
    writer.end_record()?;

    writer.write_u16(count("color property count", material.colors().len())?)?;
    writer.end_record()?;
    for color in material.colors() {
        writer.write_string("color property name", &color.property)?;
        writer.write_vec4(color.color)?;
        writer.end_record()?;
    }

    writer.write_u16(count("texture property count", material.textures().len())?)?;
    writer.end_record()?;
    for texture in material.textures() {
        writer.write_string("texture property name", &texture.property)?;
        writer.write_texture_name(texture.file_name.as_deref())?;
        writer.end_record()?;
    }
    Ok(())
}

fn count<T: TryFrom<usize>>(field: &str, len: usize) -> Result<T> {
    T::try_from(len).map_err(|_| AssetError::Encode {
        field: field.to_string(),
        value: len.to_string(),
    })
}
