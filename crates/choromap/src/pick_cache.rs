//! Pick cache: one collider per region solid, tagged with its ownership path.

use crate::scene::{MapScene, RegionId};
use map_core::Ray;
use picking::{PickTag, PickWorld};

/// Farther than any camera far plane the viewer uses.
const MAX_PICK_DISTANCE: f32 = 1.0e5;

/// Ray-cast index over every region solid of one scene.
pub struct RegionPicker {
    world: PickWorld,
}

impl RegionPicker {
    pub fn from_scene(scene: &MapScene) -> Self {
        let mut world = PickWorld::new();
        for group in &scene.regions {
            for (mesh_index, mesh) in group.meshes.iter().enumerate() {
                world.add_trimesh(
                    &mesh.world_positions(),
                    &mesh.geometry.indices,
                    PickTag::new(group.id.0 as u32, mesh_index as u32),
                );
            }
        }
        world.update();
        log::debug!("Built pick cache with {} colliders", world.len());
        Self { world }
    }

    pub fn collider_count(&self) -> usize {
        self.world.len()
    }

    /// Region and mesh index of the nearest solid hit by `ray`.
    pub fn pick(&self, ray: &Ray) -> Option<(RegionId, usize)> {
        let hit = self.world.raycast(ray, MAX_PICK_DISTANCE)?;
        Some((RegionId(hit.tag.group as usize), hit.tag.mesh as usize))
    }
}
