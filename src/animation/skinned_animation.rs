use std::io::Read;
use std::path::Path;

use glam::{Quat, Vec3};

use crate::assets::file_formats::animationfile::{read_tracks, write_tracks};
use crate::assets::file_formats::reader::{AsciiReader, AssetReader, BinaryReader};
use crate::assets::file_formats::writer::{AsciiWriter, AssetWriter, BinaryWriter};
use crate::assets::{create_file, open_file, AssetEncoding};
use crate::error::Result;
use crate::scene::{Hierarchy, Transform, TransformId};

use super::curve::Curve;

pub const CURVE_COUNT: usize = 10;

/// Curve order within a track.
pub const CHANNEL_NAMES: [&str; CURVE_COUNT] = [
    "posX", "posY", "posZ", "rotX", "rotY", "rotZ", "rotW", "scaleX", "scaleY", "scaleZ",
];

/// Curves for one transform, matched by name once at load.
#[derive(Clone, Debug)]
pub struct Track {
    pub target: String,
    pub transform: Option<TransformId>,
    pub curves: [Curve; CURVE_COUNT],
}
impl Track {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            transform: None,
            curves: Default::default(),
        }
    }

    /// Evaluates all curves at `time`. Components whose curve is empty keep
    /// the value from `base`. The rotation is the raw interpolated quaternion.
    pub fn sample(&self, time: f32, base: &Transform) -> (Vec3, Quat, Vec3) {
        let channel = |idx: usize, fallback: f32| self.curves[idx].sample(time).unwrap_or(fallback);
        let position = Vec3::new(
            channel(0, base.position.x),
            channel(1, base.position.y),
            channel(2, base.position.z),
        );
        let rotation = Quat::from_xyzw(
            channel(3, base.rotation.x),
            channel(4, base.rotation.y),
            channel(5, base.rotation.z),
            channel(6, base.rotation.w),
        );
        let scale = Vec3::new(
            channel(7, base.scale.x),
            channel(8, base.scale.y),
            channel(9, base.scale.z),
        );
        (position, rotation, scale)
    }

    fn end_time(&self) -> Option<f32> {
        self.curves.iter().filter_map(Curve::end_time).reduce(f32::max)
    }
}

/// Keyframed clip driving transforms of a [`Hierarchy`].
#[derive(Clone, Debug, Default)]
pub struct SkinnedAnimation {
    tracks: Vec<Track>,
    max_animation_time: f32,
}
impl SkinnedAnimation {
    pub fn new(tracks: Vec<Track>) -> Self {
        let max_animation_time = tracks
            .iter()
            .filter_map(Track::end_time)
            .fold(0.0, f32::max);
        Self { tracks, max_animation_time }
    }

    /// Loads a clip and binds its tracks against `hierarchy`, picking the
    /// encoding from the file extension.
    pub fn load(path: impl AsRef<Path>, hierarchy: &Hierarchy) -> Result<Self> {
        let path = path.as_ref();
        let mut animation = Self::load_unbound(path)?;
        animation.bind(hierarchy);
        Ok(animation)
    }

    pub fn load_ascii(path: impl AsRef<Path>, hierarchy: &Hierarchy) -> Result<Self> {
        let path = path.as_ref();
        let mut animation = Self::read_ascii(open_file(path)?, path)?;
        animation.bind(hierarchy);
        Ok(animation)
    }

    pub fn load_binary(path: impl AsRef<Path>, hierarchy: &Hierarchy) -> Result<Self> {
        let path = path.as_ref();
        let mut animation = Self::read_binary(open_file(path)?, path)?;
        animation.bind(hierarchy);
        Ok(animation)
    }

    /// Loads a clip without binding any track.
    pub fn load_unbound(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open_file(path)?;
        match AssetEncoding::from_path(path)? {
            AssetEncoding::Ascii => Self::read_ascii(file, path),
            AssetEncoding::Binary => Self::read_binary(file, path),
        }
    }

    pub fn read_ascii<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut AsciiReader::from_reader(reader, origin.as_ref())?)
    }

    pub fn read_binary<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut BinaryReader::new(reader, origin.as_ref()))
    }

    fn read<R: AssetReader>(reader: &mut R) -> Result<Self> {
        let animation = Self::new(read_tracks(reader)?);
        log::info!(
            "loaded animation {} ({} tracks, {:.3}s)",
            reader.origin().display(),
            animation.tracks.len(),
            animation.max_animation_time
        );
        Ok(animation)
    }

    /// Resolves every track target by name from the hierarchy root. Returns
    /// the number of tracks left unbound.
    pub fn bind(&mut self, hierarchy: &Hierarchy) -> usize {
        let mut unbound = 0;
        for track in &mut self.tracks {
            track.transform = hierarchy.find(&track.target);
            if track.transform.is_none() {
                log::warn!("animation track '{}' has no matching transform", track.target);
                unbound += 1;
            }
        }
        unbound
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
        write_tracks(writer, &self.tracks)?;
        writer.flush()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Latest key time over all curves, 0 for a clip without keys.
    pub fn max_animation_time(&self) -> f32 {
        self.max_animation_time
    }

    /// Writes the pose at `time` into the bound transforms. Later tracks win
    /// when two tracks target the same transform.
    pub fn set_transform(&self, time: f32, hierarchy: &mut Hierarchy) {
        for track in &self.tracks {
            let Some(transform) = track.transform.and_then(|id| hierarchy.get_mut(id)) else {
                continue;
            };
            let (position, rotation, scale) = track.sample(time, transform);
            transform.position = position;
            transform.rotation = rotation;
            transform.scale = scale;
        }
    }

    /// Pose of one track at `time` without touching the hierarchy. `None`
    /// for an unbound track or an out of range index.
    pub fn sample(&self, track: usize, time: f32, hierarchy: &Hierarchy) -> Option<(Vec3, Quat, Vec3)> {
        let track = self.tracks.get(track)?;
        let base = hierarchy.get(track.transform?)?;
        Some(track.sample(time, base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> Hierarchy {
        let mut hierarchy = Hierarchy::new(Transform::new("Root"));
        let hips = hierarchy.add_child(hierarchy.root(), Transform::new("Hips")).unwrap();
        hierarchy.add_child(hips, Transform::new("Spine")).unwrap();
        hierarchy
    }

    fn slide(target: &str, to: f32) -> Track {
        let mut track = Track::new(target);
        track.curves[0] = Curve::new(vec![0.0, 2.0], vec![0.0, to]);
        track
    }

    #[test]
    fn max_time_covers_every_curve() {
        let mut a = slide("Hips", 1.0);
        a.curves[8] = Curve::new(vec![0.5, 3.5], vec![1.0, 2.0]);
        let animation = SkinnedAnimation::new(vec![a, slide("Spine", 1.0)]);
        assert_eq!(animation.max_animation_time(), 3.5);
        assert_eq!(SkinnedAnimation::new(vec![]).max_animation_time(), 0.0);
        assert_eq!(SkinnedAnimation::new(vec![Track::new("Hips")]).max_animation_time(), 0.0);
    }

    #[test]
    fn empty_curves_keep_current_values() {
        let mut hierarchy = skeleton();
        let hips = hierarchy.find("Hips").unwrap();
        hierarchy[hips].position = Vec3::new(7.0, 8.0, 9.0);
        hierarchy[hips].scale = Vec3::splat(2.0);

        let mut animation = SkinnedAnimation::new(vec![slide("Hips", 4.0)]);
        assert_eq!(animation.bind(&hierarchy), 0);
        animation.set_transform(1.0, &mut hierarchy);

        assert_eq!(hierarchy[hips].position, Vec3::new(2.0, 8.0, 9.0));
        assert_eq!(hierarchy[hips].scale, Vec3::splat(2.0));
        assert_eq!(hierarchy[hips].rotation, Quat::IDENTITY);
    }

    #[test]
    fn unbound_track_is_a_no_op() {
        let mut hierarchy = skeleton();
        let mut animation = SkinnedAnimation::new(vec![slide("Tail", 5.0), slide("Spine", 4.0)]);
        assert_eq!(animation.bind(&hierarchy), 1);
        assert!(animation.tracks()[0].transform.is_none());
        assert_eq!(animation.sample(0, 1.0, &hierarchy), None);

        animation.set_transform(2.0, &mut hierarchy);
        let spine = hierarchy.find("Spine").unwrap();
        assert_eq!(hierarchy[spine].position.x, 4.0);
        for id in hierarchy.iter().filter(|&id| id != spine) {
            assert_eq!(hierarchy[id].position, Vec3::ZERO);
        }
    }

    #[test]
    fn later_track_wins_on_shared_target() {
        let mut hierarchy = skeleton();
        let mut animation = SkinnedAnimation::new(vec![slide("Hips", 2.0), slide("Hips", 6.0)]);
        animation.bind(&hierarchy);
        animation.set_transform(2.0, &mut hierarchy);
        let hips = hierarchy.find("Hips").unwrap();
        assert_eq!(hierarchy[hips].position.x, 6.0);
    }

    #[test]
    fn sample_does_not_mutate() {
        let hierarchy = skeleton();
        let mut animation = SkinnedAnimation::new(vec![slide("Spine", 4.0)]);
        animation.bind(&hierarchy);
        let (position, rotation, scale) = animation.sample(0, 1.0, &hierarchy).unwrap();
        assert_eq!(position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(rotation, Quat::IDENTITY);
        assert_eq!(scale, Vec3::ONE);
        assert_eq!(hierarchy[hierarchy.find("Spine").unwrap()].position, Vec3::ZERO);
    }
}
