use crate::error::Result;
use crate::scene::{Hierarchy, Transform, TransformId};

use super::reader::AssetReader;
use super::writer::AssetWriter;

/// Reads a pre-order node list in which every node, the root included, is
/// closed by an end marker. Reading stops once the root is closed.
pub fn read_hierarchy<R: AssetReader>(reader: &mut R) -> Result<Hierarchy> {
    let Some(root_name) = reader.read_node_name("root transform name")? else {
        return Err(reader.malformed("root transform name", "hierarchy starts with an end marker"));
    };
    let mut hierarchy = Hierarchy::new(read_transform(reader, &root_name)?);

    let mut active = Some(hierarchy.root());
    while let Some(parent) = active {
        active = match reader.read_node_name("transform name")? {
            None => hierarchy[parent].parent(),
            Some(name) => {
                let transform = read_transform(reader, &name)?;
                hierarchy.add_child(parent, transform)
            }
        };
    }
    log::debug!("read hierarchy with {} transforms from {}", hierarchy.len(), reader.origin().display());
    Ok(hierarchy)
}

fn read_transform<R: AssetReader>(reader: &mut R, name: &str) -> Result<Transform> {
    let position = reader.read_vec3("transform position")?;
    let euler = reader.read_vec3("transform rotation")?;
    let scale = reader.read_vec3("transform scale")?;
    Ok(Transform::from_euler_degrees(name, position, euler, scale))
}

pub fn write_hierarchy<W: AssetWriter>(writer: &mut W, hierarchy: &Hierarchy) -> Result<()> {
    write_node(writer, hierarchy, hierarchy.root())
}

fn write_node<W: AssetWriter>(writer: &mut W, hierarchy: &Hierarchy, id: TransformId) -> Result<()> {
    let node = &hierarchy[id];
    writer.write_node_name(Some(node.name()))?;
    writer.end_record()?;
    writer.write_vec3(node.position)?;
    writer.write_vec3(node.euler_degrees())?;
    writer.write_vec3(node.scale)?;
    writer.end_record()?;
    for child in node.children() {
        write_node(writer, hierarchy, *child)?;
    }
    writer.write_node_name(None)?;
    writer.end_record()
}
