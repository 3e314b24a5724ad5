//! Animated overlay drawn on top of a region map: light bars standing on
//! region centers and fly lines arcing between them.
//!
//! Overlay entities live in their own `hecs::World`. Each draw call replaces
//! the previous batch of the same kind; [`OverlayLayer::animate`] advances
//! the shared phase and updates ring pulses and fly-line colours.

pub mod animator;
pub mod components;
pub mod fly_line;
pub mod light_bar;

pub use animator::*;
pub use components::*;
pub use fly_line::{FlyLineDatum, RegionRef};
pub use light_bar::LightBarDatum;

use crate::dataset::{FeatureCollection, NamedCoordinateIndex};
use crate::map::MapSurface;
use crate::style::OverlayStyle;
use glam::Vec3;
use hecs::{Entity, World};
use mapgen::{MercatorProjection, Renderable};
use std::time::{Duration, Instant};

/// Outcome of a draw call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Entries that produced geometry.
    pub drawn: usize,
    /// Names that could not be resolved to a region; their entries were skipped.
    pub skipped: Vec<String>,
}

/// Overlay entities, the name index they are placed by, and the animator.
pub struct OverlayLayer {
    world: World,
    index: NamedCoordinateIndex,
    style: OverlayStyle,
    animator: OverlayAnimator,
}

impl OverlayLayer {
    pub fn new(index: NamedCoordinateIndex, style: OverlayStyle) -> Self {
        let animator = OverlayAnimator::new(
            style.fly_segments,
            Duration::from_millis(style.animation_interval_ms),
        );
        Self {
            world: World::new(),
            index,
            style,
            animator,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn animator(&self) -> &OverlayAnimator {
        &self.animator
    }

    /// Number of live entities produced by draw calls of `kind`.
    pub fn count(&self, kind: OverlayKind) -> usize {
        self.world
            .query::<&OverlayPart>()
            .iter()
            .filter(|(_, part)| part.kind == kind)
            .count()
    }

    fn clear(&mut self, kind: OverlayKind) {
        let stale: Vec<Entity> = self
            .world
            .query::<&OverlayPart>()
            .iter()
            .filter(|(_, part)| part.kind == kind)
            .map(|(e, _)| e)
            .collect();
        for e in stale {
            self.world.despawn(e).ok();
        }
    }

    fn resolve(&self, projection: &MercatorProjection, name: &str) -> Option<Vec3> {
        self.index.get(name).map(|c| projection.project_point(c))
    }

    /// Replace all light bars with one per resolvable entry.
    pub fn draw_light_bars(&mut self, projection: &MercatorProjection, data: &[LightBarDatum]) -> OverlayReport {
        self.clear(OverlayKind::LightBar);
        let mut report = OverlayReport::default();
        for (i, datum) in data.iter().enumerate() {
            let Some(anchor) = self.resolve(projection, &datum.name) else {
                log::warn!("Light bar for unknown region '{}' skipped", datum.name);
                report.skipped.push(datum.name.clone());
                continue;
            };
            light_bar::spawn_light_bar(&mut self.world, &self.style, i, datum, anchor);
            report.drawn += 1;
        }
        log::info!("Drew {} light bars ({} skipped)", report.drawn, report.skipped.len());
        report
    }

    /// Replace all fly lines with one per entry whose endpoints both resolve.
    pub fn draw_fly_lines(&mut self, projection: &MercatorProjection, data: &[FlyLineDatum]) -> OverlayReport {
        self.clear(OverlayKind::FlyLine);
        let mut report = OverlayReport::default();
        for (i, datum) in data.iter().enumerate() {
            let source = self.resolve(projection, &datum.source.name);
            let target = self.resolve(projection, &datum.target.name);
            let (Some(start), Some(end)) = (source, target) else {
                for (name, found) in [(&datum.source.name, source), (&datum.target.name, target)] {
                    if found.is_none() {
                        log::warn!("Fly line endpoint '{name}' is not a known region; line skipped");
                        report.skipped.push(name.clone());
                    }
                }
                continue;
            };
            fly_line::spawn_fly_line(&mut self.world, &self.style, i, datum, start, end);
            report.drawn += 1;
        }
        log::info!("Drew {} fly lines ({} skipped)", report.drawn, report.skipped.len());
        report
    }

    /// Advance the animation if the throttle interval has elapsed.
    /// Returns whether anything changed.
    pub fn animate(&mut self, now: Instant) -> bool {
        let Some(tick) = self.animator.tick(now) else {
            return false;
        };
        log::trace!("Overlay tick phase {}", tick.phase);

        for (_, (line, renderable)) in self.world.query_mut::<(&mut FlyLine, &mut Renderable)>() {
            fly_line::recolor(&mut renderable.geometry, tick, &self.style);
            line.dirty = true;
        }

        let grow = 1.0 + tick.ratio;
        for (_, (_, renderable)) in self.world.query_mut::<(&PulseRing, &mut Renderable)>() {
            let z = renderable.transform.scale.z;
            renderable.transform.scale = Vec3::new(grow, grow, z);
            renderable.material.opacity = 1.0 - tick.ratio;
        }
        true
    }

    /// Fly lines whose vertex colours changed since the last call.
    pub fn take_dirty_lines(&mut self) -> Vec<Entity> {
        self.world
            .query_mut::<&mut FlyLine>()
            .into_iter()
            .filter(|(_, line)| line.dirty)
            .map(|(e, line)| {
                line.dirty = false;
                e
            })
            .collect()
    }
}

/// A map with the light-bar and fly-line overlay on top.
pub struct LightBarMap<M: MapSurface> {
    base: M,
    overlay: OverlayLayer,
}

impl<M: MapSurface> LightBarMap<M> {
    /// The region name index is built once, from the base map's dataset.
    pub fn new(base: M, style: OverlayStyle) -> Self {
        let index = base
            .dataset()
            .map(NamedCoordinateIndex::from_collection)
            .unwrap_or_default();
        if index.is_empty() {
            log::warn!("Overlay has no regions to place entries on");
        }
        Self {
            base,
            overlay: OverlayLayer::new(index, style),
        }
    }

    pub fn base(&self) -> &M {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut M {
        &mut self.base
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayLayer {
        &mut self.overlay
    }

    pub fn draw_light_bar(&mut self, data: &[LightBarDatum]) -> OverlayReport {
        self.overlay.draw_light_bars(self.base.projection(), data)
    }

    pub fn draw_fly_line(&mut self, data: &[FlyLineDatum]) -> OverlayReport {
        self.overlay.draw_fly_lines(self.base.projection(), data)
    }

    pub fn animate(&mut self, now: Instant) -> bool {
        self.overlay.animate(now)
    }
}

impl<M: MapSurface> MapSurface for LightBarMap<M> {
    fn projection(&self) -> &MercatorProjection {
        self.base.projection()
    }

    fn dataset(&self) -> Option<&FeatureCollection> {
        self.base.dataset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::RegionMap;
    use crate::style::MapStyle;
    use crate::test_support::test_dataset;
    use map_core::Color;

    fn overlay_map() -> LightBarMap<RegionMap> {
        LightBarMap::new(
            RegionMap::new(Some(test_dataset()), MapStyle::default()),
            OverlayStyle::default(),
        )
    }

    fn bounds(points: &[Vec3]) -> (Vec3, Vec3) {
        points
            .iter()
            .fold((Vec3::MAX, Vec3::MIN), |(lo, hi), p| (lo.min(*p), hi.max(*p)))
    }

    #[test]
    fn light_bar_height_follows_value() {
        let mut map = overlay_map();
        let report = map.draw_light_bar(&[LightBarDatum::new("Test", 50.0)]);
        assert_eq!(report, OverlayReport { drawn: 1, skipped: Vec::new() });

        let anchor = map.base().projection().project_point(test_dataset().find("Test").unwrap().center);
        let world = map.overlay().world();
        let mut bars = 0;
        for (_, (bar, renderable)) in world.query::<(&GlowBar, &Renderable)>().iter() {
            bars += 1;
            assert!((bar.height - 5.0).abs() < 1e-6);
            let (lo, hi) = bounds(&renderable.world_positions());
            assert!((lo.z - anchor.z).abs() < 1e-4);
            assert!((hi.z - anchor.z - 5.0).abs() < 1e-4);
            assert!(!renderable.material.depth_test);
            assert_eq!(renderable.material.blending, map_core::Blending::Additive);
        }
        assert_eq!(bars, 2);
        assert_eq!(map.overlay().count(OverlayKind::LightBar), 4);
    }

    #[test]
    fn bars_are_crossed() {
        let mut map = overlay_map();
        map.draw_light_bar(&[LightBarDatum::new("East", 20.0)]);
        let spans: Vec<Vec3> = map
            .overlay()
            .world()
            .query::<(&GlowBar, &Renderable)>()
            .iter()
            .map(|(_, (_, r))| {
                let (lo, hi) = bounds(&r.world_positions());
                hi - lo
            })
            .collect();
        assert_eq!(spans.len(), 2);
        let along_x = spans.iter().filter(|s| (s.x - 1.0).abs() < 1e-4 && s.y < 1e-4).count();
        let along_y = spans.iter().filter(|s| (s.y - 1.0).abs() < 1e-4 && s.x < 1e-4).count();
        assert_eq!((along_x, along_y), (1, 1));
    }

    #[test]
    fn unknown_names_are_skipped_and_reported() {
        let mut map = overlay_map();
        let report = map.draw_light_bar(&[
            LightBarDatum::new("Atlantis", 10.0),
            LightBarDatum::new("East", 30.0),
        ]);
        assert_eq!(report.drawn, 1);
        assert_eq!(report.skipped, vec!["Atlantis".to_string()]);

        // Palette still follows the input position.
        let world = map.overlay().world();
        for (_, (part, renderable)) in world.query::<(&OverlayPart, &Renderable)>().iter() {
            assert_eq!(part.entry, 1);
            assert_eq!(renderable.material.color, map.overlay().style().palette_color(1));
        }
    }

    #[test]
    fn markers_sit_just_above_centers_in_alternating_colours() {
        let mut map = overlay_map();
        let report = map.draw_light_bar(&[LightBarDatum::new("Test", 10.0), LightBarDatum::new("East", 20.0)]);
        assert_eq!(report.drawn, 2);

        let dataset = test_dataset();
        let projection = *map.base().projection();
        let anchors = ["Test", "East"].map(|name| projection.project_point(dataset.find(name).unwrap().center));
        let colors = [Color::WHITE, Color::from_hex("#ffff00").unwrap()];

        let world = map.overlay().world();
        let mut markers = 0;
        for (_, (part, _, r)) in world.query::<(&OverlayPart, &HexMarker, &Renderable)>().iter() {
            markers += 1;
            let anchor = anchors[part.entry];
            assert!((r.transform.position.z - (anchor.z + 0.1)).abs() < 1e-6);
            assert!(r.transform.position.truncate().distance(anchor.truncate()) < 1e-6);
            assert_eq!(r.material.color, colors[part.entry]);
        }
        let mut rings = 0;
        for (_, (part, _, r)) in world.query::<(&OverlayPart, &PulseRing, &Renderable)>().iter() {
            rings += 1;
            assert!((r.transform.position.z - (anchors[part.entry].z + 0.1)).abs() < 1e-6);
            assert_eq!(r.material.color, colors[part.entry]);
        }
        for (_, (part, _, r)) in world.query::<(&OverlayPart, &GlowBar, &Renderable)>().iter() {
            assert_eq!(r.material.color, colors[part.entry]);
        }
        assert_eq!((markers, rings), (2, 2));
    }

    #[test]
    fn redraw_replaces_previous_batch() {
        let mut map = overlay_map();
        map.draw_light_bar(&[LightBarDatum::new("Test", 10.0), LightBarDatum::new("East", 10.0)]);
        map.draw_fly_line(&[FlyLineDatum::new("Test", "East")]);
        assert_eq!(map.overlay().count(OverlayKind::LightBar), 8);

        map.draw_light_bar(&[LightBarDatum::new("East", 10.0)]);
        assert_eq!(map.overlay().count(OverlayKind::LightBar), 4);
        assert_eq!(map.overlay().count(OverlayKind::FlyLine), 1);
    }

    #[test]
    fn fly_line_arcs_between_centers() {
        let mut map = overlay_map();
        let report = map.draw_fly_line(&[FlyLineDatum::new("Test", "East"), FlyLineDatum::new("Test", "Nowhere")]);
        assert_eq!(report.drawn, 1);
        assert_eq!(report.skipped, vec!["Nowhere".to_string()]);

        let world = map.overlay().world();
        let mut query = world.query::<(&FlyLine, &Renderable)>();
        let (_, (_, line)) = query.iter().next().unwrap();
        let g = &line.geometry;
        assert_eq!(g.vertex_count(), 21);
        assert_eq!(g.segment_count(), 20);
        let base = map.overlay().style().fly_base_color.with_alpha(1.0);
        assert!(g.colors.iter().all(|c| *c == base));
        let (_, hi) = bounds(&g.positions);
        assert!((hi.z - 5.0).abs() < 1e-4);
    }

    #[test]
    fn animation_moves_the_highlighted_vertex() {
        let mut map = overlay_map();
        map.draw_fly_line(&[FlyLineDatum::new("Test", "East")]);
        let style = map.overlay().style().clone();
        let head = style.fly_head_color.with_alpha(1.0);
        let trail = style.fly_trail_color.with_alpha(1.0);

        let start = Instant::now();
        let colors = |map: &LightBarMap<RegionMap>| -> Vec<[f32; 4]> {
            let world = map.overlay().world();
            let mut query = world.query::<(&FlyLine, &Renderable)>();
            let (_, (_, r)) = query.iter().next().unwrap();
            r.geometry.colors.clone()
        };

        assert!(map.animate(start));
        let c = colors(&map);
        assert_eq!(c[0], head);
        assert!(c[1..].iter().all(|x| *x == trail));

        assert!(!map.animate(start + Duration::from_millis(10)));
        assert!(map.animate(start + Duration::from_millis(30)));
        let c = colors(&map);
        assert_eq!(c[1], head);
        assert_eq!(c[0], trail);
    }

    #[test]
    fn pulse_rings_grow_and_fade() {
        let mut map = overlay_map();
        map.draw_light_bar(&[LightBarDatum::new("Test", 10.0)]);
        let start = Instant::now();
        map.animate(start);
        map.animate(start + Duration::from_millis(30));

        let world = map.overlay().world();
        let mut query = world.query::<(&PulseRing, &Renderable)>();
        let (_, (_, ring)) = query.iter().next().unwrap();
        assert!((ring.transform.scale.x - 1.05).abs() < 1e-6);
        assert!((ring.transform.scale.y - 1.05).abs() < 1e-6);
        assert_eq!(ring.transform.scale.z, 1.0);
        assert!((ring.material.opacity - 0.95).abs() < 1e-6);
    }

    #[test]
    fn dirty_lines_are_taken_once() {
        let mut map = overlay_map();
        map.draw_fly_line(&[FlyLineDatum::new("Test", "East")]);
        assert_eq!(map.overlay_mut().take_dirty_lines().len(), 1);
        assert!(map.overlay_mut().take_dirty_lines().is_empty());
        map.animate(Instant::now());
        assert_eq!(map.overlay_mut().take_dirty_lines().len(), 1);
    }
}
