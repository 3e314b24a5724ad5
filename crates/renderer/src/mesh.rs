//! GPU meshes uploaded from [`GeometryData`] and a keyed cache of them.

use crate::vertex::Vertex;
use mapgen::{GeometryData, Topology};
use std::collections::HashMap;
use std::hash::Hash;
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub num_vertices: u32,
    pub topology: Topology,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32], topology: Topology) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            num_vertices: vertices.len() as u32,
            topology,
        }
    }

    /// Returns `None` for geometry with nothing to draw; wgpu rejects empty buffers.
    pub fn from_geometry(device: &wgpu::Device, geometry: &GeometryData) -> Option<Self> {
        if geometry.is_empty() || geometry.vertex_count() == 0 {
            return None;
        }
        Some(Self::new(device, &Vertex::from_geometry(geometry), &geometry.indices, geometry.topology))
    }

    /// Rewrite the vertex buffer in place. The vertex count must not change.
    pub fn write_vertices(&self, queue: &wgpu::Queue, geometry: &GeometryData) -> bool {
        if geometry.vertex_count() != self.num_vertices as usize {
            log::warn!(
                "Vertex rewrite skipped: {} vertices into a buffer of {}",
                geometry.vertex_count(),
                self.num_vertices
            );
            return false;
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&Vertex::from_geometry(geometry)));
        true
    }
}

/// GPU meshes keyed by whatever owns the source geometry.
pub struct MeshCache<K> {
    meshes: HashMap<K, Mesh>,
}

impl<K: Hash + Eq> Default for MeshCache<K> {
    fn default() -> Self {
        Self { meshes: HashMap::new() }
    }
}

impl<K: Hash + Eq> MeshCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.meshes.contains_key(key)
    }

    /// Upload `geometry` under `key` unless a mesh is already cached there.
    pub fn ensure(&mut self, device: &wgpu::Device, key: K, geometry: &GeometryData) -> Option<&Mesh> {
        use std::collections::hash_map::Entry;
        match self.meshes.entry(key) {
            Entry::Occupied(entry) => Some(&*entry.into_mut()),
            Entry::Vacant(entry) => Mesh::from_geometry(device, geometry).map(|mesh| &*entry.insert(mesh)),
        }
    }

    /// Push new vertex data for an already cached mesh, re-uploading if the size changed.
    pub fn refresh(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, key: K, geometry: &GeometryData) {
        let rewritten = self
            .meshes
            .get(&key)
            .is_some_and(|mesh| mesh.num_vertices as usize == geometry.vertex_count() && mesh.write_vertices(queue, geometry));
        if !rewritten {
            match Mesh::from_geometry(device, geometry) {
                Some(mesh) => {
                    self.meshes.insert(key, mesh);
                }
                None => {
                    self.meshes.remove(&key);
                }
            }
        }
    }

    /// Drop every mesh whose key fails `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.meshes.retain(|k, _| keep(k));
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}
