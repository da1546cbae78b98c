pub mod curve;
pub mod player;
pub mod skinned_animation;

pub use curve::Curve;
pub use player::{AnimationPlayer, TimeWrapMode};
pub use skinned_animation::{SkinnedAnimation, Track};
