pub mod hierarchy;
pub mod transform;

pub use hierarchy::Hierarchy;
pub use transform::{Transform, TransformId};
