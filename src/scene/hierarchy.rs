use generational_arena::Arena;
use glam::{Mat4, Vec3};

use super::transform::{Transform, TransformId};
use crate::name_hash;

/// Owns every transform of a skeleton. Parent and child links are ids into
/// the arena, the root is stored alongside the other nodes.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    root: TransformId,
    nodes: Arena<Transform>,
}
impl Hierarchy {
    pub fn new(mut root: Transform) -> Self {
        root.parent = None;
        root.children.clear();
        let mut nodes = Arena::new();
        let root = TransformId(nodes.insert(root));
        Self { root, nodes }
    }

    pub fn root(&self) -> TransformId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: TransformId) -> Option<&Transform> {
        self.nodes.get(id.into())
    }

    pub fn get_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.nodes.get_mut(id.into())
    }

    /// Appends `transform` as the last child of `parent`. Returns `None` if
    /// `parent` is not part of this hierarchy.
    pub fn add_child(&mut self, parent: TransformId, mut transform: Transform) -> Option<TransformId> {
        if !self.nodes.contains(parent.into()) {
            return None;
        }
        transform.parent = Some(parent);
        transform.children.clear();
        let id = TransformId(self.nodes.insert(transform));
        self.nodes.get_mut(parent.into())?.children.push(id);
        Some(id)
    }

    pub fn find(&self, name: &str) -> Option<TransformId> {
        self.find_from(self.root, name)
    }

    /// Depth-first, pre-order search of the subtree rooted at `from`,
    /// visiting children in insertion order. With duplicate names the first
    /// node reached wins.
    pub fn find_from(&self, from: TransformId, name: &str) -> Option<TransformId> {
        let hash = name_hash(name);
        self.pre_order_from(from).find(|&id| {
            let node = &self.nodes[id.0];
            node.hash() == hash && node.name() == name
        })
    }

    pub fn iter(&self) -> PreOrder<'_> {
        self.pre_order_from(self.root)
    }

    pub fn pre_order_from(&self, from: TransformId) -> PreOrder<'_> {
        let stack = if self.nodes.contains(from.into()) { vec![from] } else { vec![] };
        PreOrder { hierarchy: self, stack }
    }

    /// Local matrix composed with every ancestor up to the root. Recomputed
    /// on every call.
    ///
    /// # Panics
    ///
    /// If `id` is not part of this hierarchy, same as indexing.
    pub fn local_to_world_matrix(&self, id: TransformId) -> Mat4 {
        let mut node = &self[id];
        let mut matrix = node.local_matrix();
        while let Some(parent) = node.parent {
            node = &self[parent];
            matrix = node.local_matrix() * matrix;
        }
        matrix
    }

    /// [`Self::local_to_world_matrix`], or `None` for an id from another hierarchy.
    pub fn try_local_to_world_matrix(&self, id: TransformId) -> Option<Mat4> {
        let mut node = self.get(id)?;
        let mut matrix = node.local_matrix();
        while let Some(parent) = node.parent {
            node = self.get(parent)?;
            matrix = node.local_matrix() * matrix;
        }
        Some(matrix)
    }

    pub fn world_position(&self, id: TransformId) -> Vec3 {
        self.local_to_world_matrix(id).transform_point3(Vec3::ZERO)
    }
}

impl std::ops::Index<TransformId> for Hierarchy {
    type Output = Transform;

    fn index(&self, id: TransformId) -> &Transform {
        &self.nodes[id.0]
    }
}

impl std::ops::IndexMut<TransformId> for Hierarchy {
    fn index_mut(&mut self, id: TransformId) -> &mut Transform {
        &mut self.nodes[id.0]
    }
}

pub struct PreOrder<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<TransformId>,
}
impl Iterator for PreOrder<'_> {
    type Item = TransformId;

    fn next(&mut self) -> Option<TransformId> {
        let id = self.stack.pop()?;
        let node = &self.hierarchy.nodes[id.0];
        self.stack.extend(node.children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;

    fn chain() -> (Hierarchy, TransformId, TransformId) {
        let mut h = Hierarchy::new(Transform::new("root"));
        let a = h
            .add_child(h.root(), Transform::with_trs("A", Vec3::X, Quat::IDENTITY, Vec3::ONE))
            .unwrap();
        let b = h
            .add_child(a, Transform::with_trs("B", Vec3::Y, Quat::IDENTITY, Vec3::ONE))
            .unwrap();
        (h, a, b)
    }

    #[test]
    fn chain_world_position() {
        let (h, _, b) = chain();
        assert!(h.world_position(b).abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn root_world_is_local() {
        let mut h = Hierarchy::new(Transform::with_trs(
            "root",
            Vec3::new(3.0, 2.0, 1.0),
            Quat::from_rotation_z(0.5),
            Vec3::splat(2.0),
        ));
        let root = h.root();
        assert_eq!(h.local_to_world_matrix(root), h[root].local_matrix());
        h[root].position = Vec3::ZERO;
        assert_eq!(h.local_to_world_matrix(root), h[root].local_matrix());
    }

    #[test]
    fn child_world_is_parent_world_times_local() {
        let (mut h, a, b) = chain();
        h[a].rotation = Quat::from_rotation_y(1.0);
        h[a].scale = Vec3::new(1.0, 2.0, 3.0);
        let expected = h.local_to_world_matrix(a) * h[b].local_matrix();
        assert!(h.local_to_world_matrix(b).abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn find_is_pre_order_and_scoped() {
        let mut h = Hierarchy::new(Transform::new("root"));
        let left = h.add_child(h.root(), Transform::new("left")).unwrap();
        let right = h.add_child(h.root(), Transform::new("right")).unwrap();
        let deep = h.add_child(left, Transform::new("dup")).unwrap();
        let shallow = h.add_child(right, Transform::new("dup")).unwrap();

        assert_eq!(h.find("dup"), Some(deep));
        assert_eq!(h.find("dup"), Some(deep));
        assert_eq!(h.find_from(right, "dup"), Some(shallow));
        assert_eq!(h.find_from(right, "left"), None);
        assert_eq!(h.find("missing"), None);
        assert_eq!(h.find("root"), Some(h.root()));
    }

    #[test]
    fn find_follows_renames() {
        let (mut h, a, _) = chain();
        h[a].rename("Pelvis");
        assert_eq!(h[a].hash(), name_hash("Pelvis"));
        assert_eq!(h.find("Pelvis"), Some(a));
        assert_eq!(h.find("A"), None);
    }

    #[test]
    fn foreign_ids_have_no_world_matrix() {
        let (other, _, b) = chain();
        let h = Hierarchy::new(Transform::new("root"));
        assert_eq!(h.try_local_to_world_matrix(h.root()), Some(Mat4::IDENTITY));
        assert_eq!(h.try_local_to_world_matrix(b), None);
        assert_eq!(other.try_local_to_world_matrix(b), Some(other.local_to_world_matrix(b)));
    }

    #[test]
    #[should_panic]
    fn foreign_id_world_matrix_panics() {
        let (_, _, b) = chain();
        Hierarchy::new(Transform::new("root")).local_to_world_matrix(b);
    }

    #[test]
    fn iter_visits_children_in_order() {
        let (mut h, a, b) = chain();
        let c = h.add_child(h.root(), Transform::new("C")).unwrap();
        let order: Vec<_> = h.iter().collect();
        assert_eq!(order, vec![h.root(), a, b, c]);
    }
}
