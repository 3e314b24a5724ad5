//! Static collision world built from triangle meshes, used only for ray queries.

use glam::Vec3;
use map_core::Ray;
use rapier3d::prelude::*;

/// Ownership path stored on each collider: which group and which mesh
/// within that group the triangles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickTag {
    pub group: u32,
    pub mesh: u32,
}

impl PickTag {
    pub fn new(group: u32, mesh: u32) -> Self {
        Self { group, mesh }
    }

    fn to_user_data(self) -> u128 {
        ((self.group as u128) << 32) | self.mesh as u128
    }

    fn from_user_data(data: u128) -> Self {
        Self {
            group: (data >> 32) as u32,
            mesh: data as u32,
        }
    }
}

/// Result of a pick query.
#[derive(Debug, Clone, Copy)]
pub struct PickHit {
    pub tag: PickTag,
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
}

/// Colliders for every pickable mesh. Nothing here is simulated.
pub struct PickWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub query_pipeline: QueryPipeline,
    dirty: bool,
}

impl Default for PickWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PickWorld {
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.collider_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collider_set.is_empty()
    }

    /// Add a static triangle mesh in world space. Returns `None` for meshes
    /// with no complete triangle.
    pub fn add_trimesh(&mut self, positions: &[Vec3], indices: &[u32], tag: PickTag) -> Option<ColliderHandle> {
        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .filter(|t| t.iter().all(|&i| (i as usize) < positions.len()))
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        if triangles.is_empty() {
            log::debug!("Skipping pick mesh {tag:?} with no triangles");
            return None;
        }

        let vertices: Vec<Point<Real>> = positions.iter().map(|p| point![p.x, p.y, p.z]).collect();
        let collider = ColliderBuilder::trimesh(vertices, triangles)
            .user_data(tag.to_user_data())
            .build();
        self.dirty = true;
        Some(self.collider_set.insert(collider))
    }

    /// Rebuild the acceleration structure after colliders changed.
    pub fn update(&mut self) {
        if self.dirty {
            self.query_pipeline.update(&self.collider_set);
            self.dirty = false;
        }
    }

    /// Nearest hit along `ray` within `max_distance`.
    ///
    /// Call [`PickWorld::update`] after adding meshes; stale structures miss
    /// newly added colliders.
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<PickHit> {
        let rapier_ray = rapier3d::prelude::Ray::new(
            point![ray.origin.x, ray.origin.y, ray.origin.z],
            vector![ray.direction.x, ray.direction.y, ray.direction.z],
        );

        let (collider, distance) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &rapier_ray,
            max_distance,
            true,
            QueryFilter::default(),
        )?;
        let tag = PickTag::from_user_data(self.collider_set.get(collider)?.user_data);
        Some(PickHit {
            tag,
            collider,
            distance,
            point: ray.at(distance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_at(z: f32, offset: Vec3) -> (Vec<Vec3>, Vec<u32>) {
        let positions = vec![
            Vec3::new(0.0, 0.0, z) + offset,
            Vec3::new(1.0, 0.0, z) + offset,
            Vec3::new(1.0, 1.0, z) + offset,
            Vec3::new(0.0, 1.0, z) + offset,
        ];
        (positions, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn tag_survives_user_data() {
        let tag = PickTag::new(7, 3);
        assert_eq!(PickTag::from_user_data(tag.to_user_data()), tag);
    }

    #[test]
    fn nearest_hit_wins() {
        let mut world = PickWorld::new();
        let (p, i) = square_at(0.0, Vec3::ZERO);
        world.add_trimesh(&p, &i, PickTag::new(0, 0));
        let (p, i) = square_at(2.0, Vec3::ZERO);
        world.add_trimesh(&p, &i, PickTag::new(1, 0));
        world.update();

        let ray = Ray::new(Vec3::new(0.5, 0.5, 10.0), Vec3::NEG_Z);
        let hit = world.raycast(&ray, 100.0).unwrap();
        assert_eq!(hit.tag, PickTag::new(1, 0));
        assert!((hit.distance - 8.0).abs() < 1e-4);
        assert!((hit.point.z - 2.0).abs() < 1e-4);
    }

    #[test]
    fn miss_returns_none() {
        let mut world = PickWorld::new();
        let (p, i) = square_at(0.0, Vec3::ZERO);
        world.add_trimesh(&p, &i, PickTag::new(0, 0));
        world.update();
        let ray = Ray::new(Vec3::new(5.0, 5.0, 10.0), Vec3::NEG_Z);
        assert!(world.raycast(&ray, 100.0).is_none());
    }

    #[test]
    fn repeated_queries_agree() {
        let mut world = PickWorld::new();
        for g in 0..4 {
            let (p, i) = square_at(0.0, Vec3::new(g as f32 * 2.0, 0.0, 0.0));
            world.add_trimesh(&p, &i, PickTag::new(g, 0));
        }
        world.update();
        let ray = Ray::new(Vec3::new(4.5, 0.5, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let first = world.raycast(&ray, 100.0).map(|h| h.tag);
        for _ in 0..10 {
            assert_eq!(world.raycast(&ray, 100.0).map(|h| h.tag), first);
        }
        assert_eq!(first, Some(PickTag::new(2, 0)));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let mut world = PickWorld::new();
        assert!(world.add_trimesh(&[Vec3::ZERO], &[], PickTag::new(0, 0)).is_none());
        assert!(world.is_empty());
    }
}
