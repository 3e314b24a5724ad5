//! Viewer state: the map, camera, input and GPU resources, plus the frame tick.

use crate::config::ViewerConfig;
use crate::gpu_scene::GpuScene;
use anyhow::Result;
use choromap::{ClickEvent, FeatureCollection, LightBarMap, MapEvent, RegionMap};
use glam::Vec2;
use input::{InputState, KeyCode};
use map_core::{Camera, Color, Time};
use mapgen::FontLoader;
use renderer::Renderer;
use std::sync::Arc;
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::window::Window;

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

pub struct ViewerState {
    pub renderer: Renderer,
    input: InputState,
    camera: Camera,
    /// Camera restored by `R`.
    home: Camera,
    time: Time,
    map: LightBarMap<RegionMap>,
    gpu: GpuScene,
    pub running: bool,
}

impl ViewerState {
    pub async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let mut renderer = Renderer::new(window, config.vsync).await?;
        renderer.set_clear_color(config.clear_color);
        for id in &config.overlay_style.glow_textures {
            renderer.register_glow(*id, Color::WHITE);
        }

        let dataset = match FeatureCollection::from_path(&config.dataset_path) {
            Ok(dataset) => {
                log::info!("Loaded {} regions from {:?}", dataset.len(), config.dataset_path);
                Some(dataset)
            }
            Err(e) => {
                log::error!("Could not load dataset {:?}: {}", config.dataset_path, e);
                None
            }
        };

        let mut region_map = RegionMap::new(dataset, config.map_style.clone());
        if let Err(e) = region_map.build_when_ready(FontLoader::load(&config.font_path)).await {
            log::error!("Map not built: {}", e);
        }
        region_map.on(MapEvent::Click, |event, group| {
            log::info!("Clicked {} ({}) at {:?}", group.name(), group.id, event.screen);
        });

        let mut map = LightBarMap::new(region_map, config.overlay_style.clone());
        map.draw_light_bar(&config.light_bars);
        map.draw_fly_line(&config.fly_lines);

        let mut camera = config.camera.to_camera();
        let (width, height) = renderer.dimensions();
        camera.set_aspect(width, height);

        Ok(Self {
            renderer,
            input: InputState::new(),
            home: camera.clone(),
            camera,
            time: Time::new(),
            map,
            gpu: GpuScene::new(),
            running: true,
        })
    }

    /// Returns true when the app should exit.
    pub fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.camera.set_aspect(size.width, size.height);
                self.home.set_aspect(size.width, size.height);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key) = event.physical_key {
                    self.input.process_keyboard(key, event.state);
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.process_mouse_button(button, state);
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.process_cursor_position((position.x, position.y));
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.input.process_scroll(lines);
                false
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    log::error!("Render error: {}", e);
                }
                self.renderer.window.request_redraw();
                !self.running
            }
            _ => false,
        }
    }

    /// One tick: camera, click picking, overlay animation.
    fn update(&mut self) {
        self.time.update();
        let (width, height) = self.renderer.dimensions();
        let viewport = Vec2::new(width as f32, height as f32);

        if self.input.is_key_pressed(KeyCode::Escape) {
            self.running = false;
        }
        if self.input.is_key_pressed(KeyCode::KeyR) {
            self.camera = self.home.clone();
        }

        let drag = self.input.take_drag_delta();
        if drag != Vec2::ZERO {
            self.camera.orbit(drag, viewport.y);
        }
        let scroll = self.input.scroll();
        if scroll != 0.0 {
            self.camera.zoom(scroll);
        }

        if let Some(screen) = self.input.take_click() {
            let click = ClickEvent::new(screen, viewport);
            let base = self.map.base_mut();
            if let Some(region) = base.handle_click(&click, &self.camera) {
                if let Err(e) = base.highlight(region) {
                    log::warn!("Highlight failed: {}", e);
                }
            }
        }

        self.map.animate(self.time.now());
        self.input.begin_frame();
    }

    fn render(&mut self) -> Result<()> {
        self.gpu.sync(&self.renderer.device, &self.renderer.queue, &mut self.map);
        self.renderer.update_camera(&self.camera);
        let items = self.gpu.draw_items(&self.map);
        log::trace!("Drawing {} items from {} meshes", items.len(), self.gpu.mesh_count());
        self.renderer.render(&items)
    }
}
