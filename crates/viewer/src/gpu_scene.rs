//! GPU copies of the map scene and overlay, and the per-frame draw list.

use choromap::{LightBarMap, RegionMap};
use glam::Mat4;
use hecs::Entity;
use mapgen::Renderable;
use renderer::{DrawItem, MeshCache};

/// Where a scene mesh came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneMesh {
    Region { region: usize, mesh: usize },
    Outline(usize),
    Label(usize),
}

/// Uploaded meshes. Scene meshes are keyed by position and dropped when
/// the map is rebuilt; overlay meshes follow their entities.
#[derive(Default)]
pub struct GpuScene {
    generation: u64,
    scene: MeshCache<SceneMesh>,
    overlay: MeshCache<Entity>,
}

impl GpuScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload anything new, re-upload recoloured fly lines, drop despawned entities.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, map: &mut LightBarMap<RegionMap>) {
        let generation = map.base().generation();
        if generation != self.generation {
            log::debug!("Map rebuilt (generation {generation}); dropping {} scene meshes", self.scene.len());
            self.scene.clear();
            self.generation = generation;
        }

        if let Some(scene) = map.base().scene() {
            for (r, group) in scene.regions.iter().enumerate() {
                for (m, solid) in group.meshes.iter().enumerate() {
                    self.scene.ensure(device, SceneMesh::Region { region: r, mesh: m }, &solid.geometry);
                }
            }
            for (i, line) in scene.outlines.lines.iter().enumerate() {
                self.scene.ensure(device, SceneMesh::Outline(i), &line.geometry);
            }
            for (i, label) in scene.labels.iter().enumerate() {
                self.scene.ensure(device, SceneMesh::Label(i), &label.geometry);
            }
        }

        let dirty = map.overlay_mut().take_dirty_lines();
        let world = map.overlay().world();
        self.overlay.retain(|e| world.contains(*e));
        for entity in dirty {
            if let Ok(renderable) = world.get::<&Renderable>(entity) {
                self.overlay.refresh(device, queue, entity, &renderable.geometry);
            }
        }
        for (entity, renderable) in world.query::<&Renderable>().iter() {
            self.overlay.ensure(device, entity, &renderable.geometry);
        }
    }

    /// Everything uploaded, in scene order: regions, both outline layers, labels, overlay.
    pub fn draw_items<'a>(&'a self, map: &LightBarMap<RegionMap>) -> Vec<DrawItem<'a>> {
        let mut items = Vec::new();

        if let Some(scene) = map.base().scene() {
            for (r, group) in scene.regions.iter().enumerate() {
                for (m, solid) in group.meshes.iter().enumerate() {
                    if let Some(mesh) = self.scene.get(&SceneMesh::Region { region: r, mesh: m }) {
                        items.push(DrawItem::from_renderable(mesh, solid, Mat4::IDENTITY));
                    }
                }
            }
            for layer in &scene.outlines.layers {
                let parent = layer.to_matrix();
                for (i, line) in scene.outlines.lines.iter().enumerate() {
                    if let Some(mesh) = self.scene.get(&SceneMesh::Outline(i)) {
                        items.push(DrawItem::from_renderable(mesh, line, parent));
                    }
                }
            }
            for (i, label) in scene.labels.iter().enumerate() {
                if let Some(mesh) = self.scene.get(&SceneMesh::Label(i)) {
                    items.push(DrawItem::from_renderable(mesh, label, Mat4::IDENTITY));
                }
            }
        }

        for (entity, renderable) in map.overlay().world().query::<&Renderable>().iter() {
            if let Some(mesh) = self.overlay.get(&entity) {
                items.push(DrawItem::from_renderable(mesh, renderable, Mat4::IDENTITY));
            }
        }
        items
    }

    pub fn mesh_count(&self) -> usize {
        self.scene.len() + self.overlay.len()
    }
}
