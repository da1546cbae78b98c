use std::hash::{DefaultHasher, Hash, Hasher};

pub mod animation;
pub mod assets;
pub mod error;
pub mod scene;
pub mod vertex;

pub use animation::{AnimationPlayer, Curve, SkinnedAnimation, TimeWrapMode, Track};
pub use assets::file_formats::vertex_format::VertexFormat;
pub use assets::manifest::AssetManifest;
pub use assets::material::Material;
pub use assets::model::{Mesh, Model};
pub use assets::skinned_model::{Bone, SkinnedMesh, SkinnedModel};
pub use assets::{AssetEncoding, AssetKind};
pub use error::{AssetError, Result};
pub use scene::{Hierarchy, Transform, TransformId};
pub use vertex::{BoneMatrix, SkinnedVertex, StaticVertex, MAX_BONES};

/// Hash used for transform and material property lookups.
pub fn name_hash(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}
