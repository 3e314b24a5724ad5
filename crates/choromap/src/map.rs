//! The region map context: owns the projection, dataset and assembled scene,
//! and turns pointer clicks into region hits and highlights.

use crate::assemble::draw_map;
use crate::dataset::FeatureCollection;
use crate::error::MapError;
use crate::pick_cache::RegionPicker;
use crate::scene::{MapScene, RegionGroup, RegionId};
use crate::style::MapStyle;
use glam::Vec2;
use map_core::{Camera, Color};
use mapgen::{FontError, GlyphSource, MercatorProjection};
use std::future::Future;

/// Events a map can dispatch to a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    Click,
}

/// A pointer click in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    pub screen: Vec2,
    pub viewport: Vec2,
}

impl ClickEvent {
    pub fn new(screen: Vec2, viewport: Vec2) -> Self {
        Self { screen, viewport }
    }
}

type ClickHandler = Box<dyn FnMut(&ClickEvent, &RegionGroup)>;

/// What overlays need from the map underneath them.
pub trait MapSurface {
    fn projection(&self) -> &MercatorProjection;
    fn dataset(&self) -> Option<&FeatureCollection>;
}

pub struct RegionMap {
    projection: MercatorProjection,
    dataset: Option<FeatureCollection>,
    style: MapStyle,
    scene: Option<MapScene>,
    /// Built on first click, dropped whenever the scene is rebuilt.
    picker: Option<RegionPicker>,
    click_handler: Option<ClickHandler>,
    active: Option<RegionId>,
    generation: u64,
}

impl RegionMap {
    pub fn new(dataset: Option<FeatureCollection>, style: MapStyle) -> Self {
        Self {
            projection: MercatorProjection::default(),
            dataset,
            style,
            scene: None,
            picker: None,
            click_handler: None,
            active: None,
            generation: 0,
        }
    }

    pub fn with_projection(mut self, projection: MercatorProjection) -> Self {
        self.projection = projection;
        self
    }

    pub fn style(&self) -> &MapStyle {
        &self.style
    }

    pub fn scene(&self) -> Option<&MapScene> {
        self.scene.as_ref()
    }

    pub fn active_region(&self) -> Option<RegionId> {
        self.active
    }

    /// Bumped every time a new scene replaces the old one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Assemble the scene. On failure the previous scene, if any, is kept.
    pub fn build(&mut self, font: &dyn GlyphSource) -> Result<(), MapError> {
        let scene = draw_map(self.dataset.as_ref(), &self.projection, font, &self.style)?;
        self.scene = Some(scene);
        self.picker = None;
        self.active = None;
        self.generation += 1;
        Ok(())
    }

    /// Wait for the font, then build. The font is handed back for reuse.
    pub async fn build_when_ready<F, G>(&mut self, font: F) -> Result<G, MapError>
    where
        F: Future<Output = Result<G, FontError>>,
        G: GlyphSource,
    {
        let font = font.await?;
        self.build(&font)?;
        Ok(font)
    }

    /// Register the handler for `event`, replacing any earlier one.
    pub fn on<H>(&mut self, event: MapEvent, handler: H)
    where
        H: FnMut(&ClickEvent, &RegionGroup) + 'static,
    {
        match event {
            MapEvent::Click => self.click_handler = Some(Box::new(handler)),
        }
    }

    /// Cast a ray through the clicked pixel and report the nearest region.
    ///
    /// The click handler, if any, runs with the hit group. Clicks that miss
    /// every solid, or arrive before the scene exists, do nothing.
    pub fn handle_click(&mut self, event: &ClickEvent, camera: &Camera) -> Option<RegionId> {
        if event.viewport.x <= 0.0 || event.viewport.y <= 0.0 {
            return None;
        }
        let scene = self.scene.as_ref()?;
        let picker = self.picker.get_or_insert_with(|| RegionPicker::from_scene(scene));

        let ndc = Camera::screen_to_ndc(event.screen, event.viewport);
        let ray = camera.ray_from_ndc(ndc);
        let (id, mesh) = picker.pick(&ray)?;
        let group = scene.region(id)?;
        log::debug!("Click hit region '{}' ({id}, mesh {mesh})", group.name());

        if let Some(handler) = self.click_handler.as_mut() {
            handler(event, group);
        }
        Some(id)
    }

    /// Repaint every region with the base colour, then `region` with `color`.
    pub fn set_active_color(&mut self, region: RegionId, color: Color) -> Result<(), MapError> {
        let scene = self
            .scene
            .as_mut()
            .filter(|s| region.0 < s.regions.len())
            .ok_or(MapError::UnknownRegionId(region.0))?;

        let base = self.style.region_color;
        for group in &mut scene.regions {
            for mesh in &mut group.meshes {
                mesh.material.color = base;
            }
        }
        for mesh in &mut scene.regions[region.0].meshes {
            mesh.material.color = color;
        }
        self.active = Some(region);
        Ok(())
    }

    /// [`RegionMap::set_active_color`] with the style's highlight colour.
    pub fn highlight(&mut self, region: RegionId) -> Result<(), MapError> {
        self.set_active_color(region, self.style.highlight_color)
    }
}

impl MapSurface for RegionMap {
    fn projection(&self) -> &MercatorProjection {
        &self.projection
    }

    fn dataset(&self) -> Option<&FeatureCollection> {
        self.dataset.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_dataset, BoxFont};
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn built_map() -> RegionMap {
        let mut map = RegionMap::new(Some(test_dataset()), MapStyle::default());
        map.build(&BoxFont).unwrap();
        map
    }

    fn camera() -> Camera {
        let mut camera = Camera::default();
        camera.set_aspect(VIEWPORT.x as u32, VIEWPORT.y as u32);
        camera
    }

    /// Window position of a world point.
    fn screen_of(camera: &Camera, point: Vec3) -> Vec2 {
        let ndc = camera.world_to_ndc(point);
        Camera::ndc_to_screen(Vec2::new(ndc.x, ndc.y), VIEWPORT)
    }

    #[test]
    fn clicking_a_region_center_reports_it() {
        let mut map = built_map();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        map.on(MapEvent::Click, move |_, group| sink.borrow_mut().push(group.name().to_string()));

        let camera = camera();
        let center = map.scene().unwrap().find("Test").unwrap().projected.center;
        let click = ClickEvent::new(screen_of(&camera, center), VIEWPORT);

        assert_eq!(map.handle_click(&click, &camera), Some(RegionId(0)));
        assert_eq!(*seen.borrow(), vec!["Test".to_string()]);
    }

    #[test]
    fn unit_square_region_is_one_group_and_clickable() {
        use crate::dataset::{Polygon, RegionFeature};
        use glam::DVec2;

        let ring = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        let feature = RegionFeature::new("Test", DVec2::new(0.5, 0.5), vec![Polygon::new(ring)]);
        let dataset = FeatureCollection::new(vec![feature]).unwrap();
        let mut map = RegionMap::new(Some(dataset), MapStyle::default());
        map.build(&BoxFont).unwrap();

        let scene = map.scene().unwrap();
        assert_eq!(scene.regions.len(), 1);
        assert_eq!(scene.regions[0].name(), "Test");
        assert_eq!(scene.regions[0].meshes.len(), 1);
        assert_eq!(scene.outlines.lines.len(), 1);

        let center = scene.regions[0].projected.center;
        let mut camera = camera();
        camera.target = center;
        camera.position = center + Vec3::new(40.0, 0.0, 60.0);
        let click = ClickEvent::new(screen_of(&camera, center), VIEWPORT);
        assert_eq!(map.handle_click(&click, &camera), Some(RegionId(0)));
    }

    #[test]
    fn clicking_twice_hits_the_same_region() {
        let mut map = built_map();
        let camera = camera();
        let center = map.scene().unwrap().find("East").unwrap().projected.center;
        let click = ClickEvent::new(screen_of(&camera, center), VIEWPORT);
        let first = map.handle_click(&click, &camera);
        assert_eq!(first, Some(RegionId(1)));
        assert_eq!(map.handle_click(&click, &camera), first);
    }

    #[test]
    fn miss_is_a_no_op() {
        let mut map = built_map();
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        map.on(MapEvent::Click, move |_, _| *sink.borrow_mut() += 1);
        let click = ClickEvent::new(Vec2::ZERO, VIEWPORT);
        assert_eq!(map.handle_click(&click, &camera()), None);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn re_registering_replaces_the_handler() {
        let mut map = built_map();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        map.on(MapEvent::Click, move |_, _| first.borrow_mut().push("first"));
        let second = Rc::clone(&log);
        map.on(MapEvent::Click, move |_, _| second.borrow_mut().push("second"));

        let camera = camera();
        let center = map.scene().unwrap().find("Test").unwrap().projected.center;
        map.handle_click(&ClickEvent::new(screen_of(&camera, center), VIEWPORT), &camera);
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn highlight_is_a_full_idempotent_repaint() {
        let mut map = built_map();
        let yellow = Color::from_u32(0xffff00);
        let base = map.style().region_color;

        map.set_active_color(RegionId(1), yellow).unwrap();
        map.set_active_color(RegionId(0), yellow).unwrap();
        let once: Vec<_> = map
            .scene()
            .unwrap()
            .regions
            .iter()
            .flat_map(|g| g.meshes.iter().map(|m| m.material))
            .collect();
        map.set_active_color(RegionId(0), yellow).unwrap();
        let twice: Vec<_> = map
            .scene()
            .unwrap()
            .regions
            .iter()
            .flat_map(|g| g.meshes.iter().map(|m| m.material))
            .collect();
        assert_eq!(once, twice);

        let scene = map.scene().unwrap();
        assert!(scene.regions[0].meshes.iter().all(|m| m.material.color == yellow));
        assert!(scene.regions[1].meshes.iter().all(|m| m.material.color == base));
        assert_eq!(map.active_region(), Some(RegionId(0)));
    }

    #[test]
    fn unknown_region_is_rejected() {
        let mut map = built_map();
        assert!(matches!(
            map.set_active_color(RegionId(99), Color::WHITE),
            Err(MapError::UnknownRegionId(99))
        ));
    }

    #[test]
    fn missing_dataset_leaves_no_scene() {
        let mut map = RegionMap::new(None, MapStyle::default());
        assert!(matches!(map.build(&BoxFont), Err(MapError::MissingDataset)));
        assert!(map.scene().is_none());
        assert_eq!(map.generation(), 0);
    }

    #[test]
    fn builds_once_the_font_resolves() {
        let mut map = RegionMap::new(Some(test_dataset()), MapStyle::default());
        let font = pollster::block_on(map.build_when_ready(std::future::ready(Ok::<_, FontError>(BoxFont))));
        assert!(font.is_ok());
        assert_eq!(map.scene().unwrap().regions.len(), 2);
        assert_eq!(map.generation(), 1);
    }

    #[test]
    fn rebuild_resets_highlight_and_pick_cache() {
        let mut map = built_map();
        let camera = camera();
        let center = map.scene().unwrap().find("Test").unwrap().projected.center;
        map.handle_click(&ClickEvent::new(screen_of(&camera, center), VIEWPORT), &camera);
        map.highlight(RegionId(0)).unwrap();
        assert!(map.picker.is_some());

        map.build(&BoxFont).unwrap();
        assert!(map.picker.is_none());
        assert_eq!(map.active_region(), None);
        assert_eq!(map.generation(), 2);
    }
}
