use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Vec4;

use crate::name_hash;

#[derive(Clone, Debug)]
pub struct ColorProperty {
    pub property: String,
    pub color: Vec4,
}

#[derive(Clone, Debug)]
pub struct TextureProperty {
    pub property: String,
    /// Texture name as stored in the asset, relative to the asset directory.
    pub file_name: Option<String>,
    /// `file_name` qualified by the asset directory.
    pub path: Option<PathBuf>,
}

/// Named set of colour and texture properties, looked up by property name
/// hash. Two materials are equal when their names are.
#[derive(Clone, Debug, Default)]
pub struct Material {
    pub name: String,
    colors: Vec<ColorProperty>,
    color_lookup: HashMap<u64, usize>,
    textures: Vec<TextureProperty>,
    texture_lookup: HashMap<u64, usize>,
}
impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// A property that is already present keeps its first value.
    pub fn add_color(&mut self, property: &str, color: Vec4) {
        let hash = name_hash(property);
        if self.color_lookup.contains_key(&hash) {
            return;
        }
        self.color_lookup.insert(hash, self.colors.len());
        self.colors.push(ColorProperty { property: property.to_string(), color });
    }

    /// A property that is already present keeps its first value.
    pub fn add_texture(&mut self, property: &str, file_name: Option<&str>, directory: &Path) {
        let hash = name_hash(property);
        if self.texture_lookup.contains_key(&hash) {
            return;
        }
        self.texture_lookup.insert(hash, self.textures.len());
        self.textures.push(TextureProperty {
            property: property.to_string(),
            file_name: file_name.map(str::to_string),
            path: file_name.map(|name| directory.join(name)),
        });
    }

    pub fn color(&self, property: &str) -> Option<Vec4> {
        self.color_by_hash(name_hash(property))
    }

    pub fn color_by_hash(&self, hash: u64) -> Option<Vec4> {
        self.color_lookup.get(&hash).map(|&idx| self.colors[idx].color)
    }

    /// Resolved path of the texture bound to `property`, `None` when the
    /// property is missing or was stored without a texture.
    pub fn texture(&self, property: &str) -> Option<&Path> {
        self.texture_by_hash(name_hash(property))
    }

    pub fn texture_by_hash(&self, hash: u64) -> Option<&Path> {
        self.texture_lookup
            .get(&hash)
            .and_then(|&idx| self.textures[idx].path.as_deref())
    }

    pub fn colors(&self) -> &[ColorProperty] {
        &self.colors
    }

    pub fn textures(&self) -> &[TextureProperty] {
        &self.textures
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl PartialEq<str> for Material {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

/// Index of the material named like `material`, appending it first when no
/// such material exists yet.
pub fn intern_material(materials: &mut Vec<Material>, material: Material) -> usize {
    match materials.iter().position(|m| *m == material) {
        Some(idx) => idx,
        None => {
            materials.push(material);
            materials.len() - 1
        }
    }
}
