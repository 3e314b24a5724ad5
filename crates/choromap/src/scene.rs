//! The assembled map: region groups, the outline layers and labels.

use crate::dataset::RegionFeature;
use glam::Vec3;
use map_core::Transform;
use mapgen::Renderable;
use std::fmt;
use std::sync::Arc;

/// Index of a region group within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Projected copy of a feature's geometry, in map units at `z = 0`.
#[derive(Debug, Clone, Default)]
pub struct ProjectedFeature {
    pub center: Vec3,
    /// Per polygon: exterior ring followed by holes.
    pub polygons: Vec<Vec<Vec<Vec3>>>,
}

/// All meshes built for one region, with a link back to its feature.
#[derive(Debug, Clone)]
pub struct RegionGroup {
    pub id: RegionId,
    pub feature: Arc<RegionFeature>,
    pub projected: ProjectedFeature,
    /// One extruded solid per drawable exterior ring.
    pub meshes: Vec<Renderable>,
}

impl RegionGroup {
    pub fn name(&self) -> &str {
        &self.feature.name
    }
}

/// Every outline strip of the map, drawn once per layer transform.
#[derive(Debug, Clone, Default)]
pub struct OutlineGroup {
    pub lines: Vec<Renderable>,
    pub layers: Vec<Transform>,
}

impl OutlineGroup {
    /// Surface layer plus a copy moved down to `floor_z`.
    pub fn with_floor(lines: Vec<Renderable>, floor_z: f32) -> Self {
        Self {
            lines,
            layers: vec![
                Transform::IDENTITY,
                Transform::from_position(Vec3::new(0.0, 0.0, floor_z)),
            ],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapScene {
    pub regions: Vec<RegionGroup>,
    pub outlines: OutlineGroup,
    /// One label per region, in region order.
    pub labels: Vec<Renderable>,
}

impl MapScene {
    pub fn region(&self, id: RegionId) -> Option<&RegionGroup> {
        self.regions.get(id.0)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut RegionGroup> {
        self.regions.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<&RegionGroup> {
        self.regions.iter().find(|g| g.name() == name)
    }

    pub fn mesh_count(&self) -> usize {
        self.regions.iter().map(|g| g.meshes.len()).sum()
    }
}
