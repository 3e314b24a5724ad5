//! Fixtures shared by this crate's unit tests.

use crate::dataset::{FeatureCollection, Polygon, RegionFeature};
use glam::{DVec2, Vec2};
use mapgen::{GlyphSource, Shape};

/// Draws every character as a filled square.
pub struct BoxFont;

impl GlyphSource for BoxFont {
    fn generate_shapes(&self, text: &str, size: f32) -> Vec<Shape> {
        text.chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| {
                let x = i as f32 * size * 0.6;
                let s = size * 0.5;
                Shape::from_ring(&[
                    Vec2::new(x, 0.0),
                    Vec2::new(x + s, 0.0),
                    Vec2::new(x + s, s),
                    Vec2::new(x, s),
                ])
            })
            .collect()
    }
}

fn square(lon: f64, lat: f64) -> Vec<DVec2> {
    vec![
        DVec2::new(lon, lat),
        DVec2::new(lon + 1.0, lat),
        DVec2::new(lon + 1.0, lat + 1.0),
        DVec2::new(lon, lat + 1.0),
        DVec2::new(lon, lat),
    ]
}

/// "Test": a one-degree square just south-west of the projection center.
/// "East": the same square two degrees further east.
pub fn test_dataset() -> FeatureCollection {
    FeatureCollection::new(vec![
        RegionFeature::new("Test", DVec2::new(108.5, 32.5), vec![Polygon::new(square(108.0, 32.0))]),
        RegionFeature::new("East", DVec2::new(110.5, 32.5), vec![Polygon::new(square(110.0, 32.0))]),
    ])
    .expect("fixture is valid")
}
