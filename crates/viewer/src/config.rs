//! Viewer configuration (window, data paths, camera, styles and demo data).
//! Loaded from config.ron at startup.

use choromap::{FlyLineDatum, LightBarDatum, MapStyle, OverlayStyle};
use map_core::{Camera, Color, Vec3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Starting view. The camera always looks at the map origin with +Z up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
}

fn default_camera_position() -> [f32; 3] {
    [150.0, 0.0, 150.0]
}
fn default_fov() -> f32 {
    10.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            fov_degrees: default_fov(),
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera {
            fov_degrees: self.fov_degrees,
            ..Camera::new(Vec3::from_array(self.position))
        }
    }
}

/// Persistent viewer settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// GeoJSON region dataset.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    /// Typeface JSON font used for region labels.
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "default_clear_color")]
    pub clear_color: Color,
    #[serde(default)]
    pub map_style: MapStyle,
    #[serde(default)]
    pub overlay_style: OverlayStyle,
    #[serde(default = "default_light_bars")]
    pub light_bars: Vec<LightBarDatum>,
    #[serde(default = "default_fly_lines")]
    pub fly_lines: Vec<FlyLineDatum>,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_dataset_path() -> PathBuf {
    PathBuf::from("assets/map/china.json")
}
fn default_font_path() -> PathBuf {
    PathBuf::from("assets/fonts/chinese.json")
}
fn default_clear_color() -> Color {
    Color::BLACK
}

fn default_light_bars() -> Vec<LightBarDatum> {
    [
        ("海南省", 60.0),
        ("北京市", 100.0),
        ("山东省", 80.0),
        ("海南省", 100.0),
        ("四川省", 100.0),
        ("台湾", 70.0),
        ("黑龙江省", 80.0),
        ("湖北省", 70.0),
        ("内蒙古自治区", 50.0),
        ("西藏自治区", 50.0),
        ("新疆维吾尔自治区", 63.0),
        ("甘肃省", 63.0),
        ("山西省", 83.0),
        ("上海市", 73.0),
        ("福建省", 63.0),
        ("广东省", 53.0),
        ("云南省", 43.0),
        ("辽宁省", 63.0),
        ("青海省", 90.0),
    ]
    .into_iter()
    .map(|(name, value)| LightBarDatum::new(name, value))
    .collect()
}

fn default_fly_lines() -> Vec<FlyLineDatum> {
    [
        "海南省",
        "北京市",
        "山东省",
        "台湾",
        "黑龙江省",
        "湖北省",
        "内蒙古自治区",
        "西藏自治区",
        "新疆维吾尔自治区",
        "青海省",
    ]
    .into_iter()
    .map(|source| FlyLineDatum::new(source, "四川省"))
    .collect()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            dataset_path: default_dataset_path(),
            font_path: default_font_path(),
            camera: CameraConfig::default(),
            clear_color: default_clear_color(),
            map_style: MapStyle::default(),
            overlay_style: OverlayStyle::default(),
            light_bars: default_light_bars(),
            fly_lines: default_fly_lines(),
        }
    }
}

impl ViewerConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(data) => Self::from_ron(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(_) => {
                log::info!("No config at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ViewerConfig::from_ron("()").unwrap();
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.map_style, MapStyle::default());
        assert_eq!(config.light_bars.len(), 19);
        assert_eq!(config.fly_lines.len(), 10);
        assert!(config.fly_lines.iter().all(|l| l.target.name == "四川省"));
    }

    #[test]
    fn partial_style_overrides_keep_other_defaults() {
        let config = ViewerConfig::from_ron(
            r##"(
                vsync: false,
                map_style: (highlight_color: "#ff0000"),
                overlay_style: (bar_height_per_value: 0.2),
                light_bars: [(name: "Test", value: 10.0)],
                fly_lines: [(source: (name: "East"), target: (name: "Test"))],
            )"##,
        )
        .unwrap();
        assert!(!config.vsync);
        assert_eq!(config.map_style.highlight_color, Color::from_u32(0xff0000));
        assert_eq!(config.map_style.region_opacity, MapStyle::default().region_opacity);
        assert_eq!(config.overlay_style.bar_height(10.0), 2.0);
        assert_eq!(config.light_bars, vec![LightBarDatum::new("Test", 10.0)]);
        assert_eq!(config.fly_lines, vec![FlyLineDatum::new("East", "Test")]);
    }

    #[test]
    fn camera_config_builds_a_camera() {
        let camera = CameraConfig {
            position: [0.0, -100.0, 80.0],
            fov_degrees: 20.0,
        }
        .to_camera();
        assert_eq!(camera.position, Vec3::new(0.0, -100.0, 80.0));
        assert_eq!(camera.fov_degrees, 20.0);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        assert!(ViewerConfig::from_ron("(window_width: \"wide\")").is_err());
    }
}
