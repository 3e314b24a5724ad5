//! Typeface fonts: JSON glyph outlines turned into 2D shapes.
//!
//! The file format is the common "typeface" JSON: a `glyphs` table keyed by
//! character, each glyph carrying its advance `ha` and an outline string `o`
//! of `m`/`l`/`q`/`b` commands in font units; plus `resolution`,
//! `boundingBox` and `underlineThickness` used for scaling and line spacing.

use crate::shape::{contains_point, signed_area, Path, Shape};
use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::SplitWhitespace;
use thiserror::Error;

/// Character drawn in place of glyphs missing from the font.
pub const FALLBACK_GLYPH: char = '?';

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid typeface JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("glyph '{glyph}': {reason}")]
    Outline { glyph: char, reason: String },
    #[error("font resolution must be positive, got {0}")]
    Resolution(f32),
}

/// Anything that can lay out text as filled 2D shapes.
pub trait GlyphSource {
    /// Shapes for `text` at nominal `size`, baseline at `y = 0`, starting at
    /// `x = 0`. Each `\n` starts a new line below the previous one.
    fn generate_shapes(&self, text: &str, size: f32) -> Vec<Shape>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Move(Vec2),
    Line(Vec2),
    Quadratic { control: Vec2, end: Vec2 },
    Cubic { c1: Vec2, c2: Vec2, end: Vec2 },
}

#[derive(Debug, Clone)]
struct Glyph {
    advance: f32,
    commands: Vec<Command>,
}

#[derive(Deserialize)]
struct RawGlyph {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoundingBox {
    y_min: f32,
    y_max: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeface {
    glyphs: HashMap<String, RawGlyph>,
    resolution: f32,
    bounding_box: RawBoundingBox,
    #[serde(default)]
    underline_thickness: f32,
    #[serde(default)]
    family_name: Option<String>,
}

fn next_point(tokens: &mut SplitWhitespace<'_>, glyph: char) -> Result<Vec2, FontError> {
    let mut coord = || -> Result<f32, FontError> {
        let token = tokens.next().ok_or_else(|| FontError::Outline {
            glyph,
            reason: "outline ends mid-command".to_string(),
        })?;
        token.parse::<f32>().map_err(|_| FontError::Outline {
            glyph,
            reason: format!("'{token}' is not a number"),
        })
    };
    let x = coord()?;
    let y = coord()?;
    Ok(Vec2::new(x, y))
}

fn parse_outline(glyph: char, outline: &str) -> Result<Vec<Command>, FontError> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();
    while let Some(action) = tokens.next() {
        let command = match action {
            "m" => Command::Move(next_point(&mut tokens, glyph)?),
            "l" => Command::Line(next_point(&mut tokens, glyph)?),
            // End point precedes the control point.
            "q" => {
                let end = next_point(&mut tokens, glyph)?;
                let control = next_point(&mut tokens, glyph)?;
                Command::Quadratic { control, end }
            }
            "b" => {
                let end = next_point(&mut tokens, glyph)?;
                let c1 = next_point(&mut tokens, glyph)?;
                let c2 = next_point(&mut tokens, glyph)?;
                Command::Cubic { c1, c2, end }
            }
            "z" => continue,
            other => {
                return Err(FontError::Outline {
                    glyph,
                    reason: format!("unknown command '{other}'"),
                })
            }
        };
        commands.push(command);
    }
    Ok(commands)
}

/// A parsed typeface font.
#[derive(Debug, Clone)]
pub struct TypefaceFont {
    family_name: Option<String>,
    resolution: f32,
    /// Line advance in font units.
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

impl TypefaceFont {
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let raw: RawTypeface = serde_json::from_str(json)?;
        if raw.resolution.is_nan() || raw.resolution <= 0.0 {
            return Err(FontError::Resolution(raw.resolution));
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                log::debug!("Skipping multi-character glyph key {key:?}");
                continue;
            };
            let commands = match glyph.o.as_deref() {
                Some(o) => parse_outline(c, o)?,
                None => Vec::new(),
            };
            glyphs.insert(
                c,
                Glyph {
                    advance: glyph.ha,
                    commands,
                },
            );
        }

        Ok(Self {
            family_name: raw.family_name,
            resolution: raw.resolution,
            line_height: raw.bounding_box.y_max - raw.bounding_box.y_min + raw.underline_thickness,
            glyphs,
        })
    }

    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn has_glyph(&self, c: char) -> bool {
        self.glyphs.contains_key(&c)
    }

    /// Contours of one glyph scaled and offset into text space, and the
    /// advance to the next glyph.
    fn glyph_paths(&self, c: char, scale: f32, offset: Vec2) -> Option<(Vec<Path>, f32)> {
        let glyph = self.glyphs.get(&c).or_else(|| self.glyphs.get(&FALLBACK_GLYPH));
        let Some(glyph) = glyph else {
            log::error!(
                "Character '{c}' does not exist in font family {}",
                self.family_name.as_deref().unwrap_or("<unnamed>")
            );
            return None;
        };

        let place = |p: Vec2| p * scale + offset;
        let mut paths = Vec::new();
        let mut current = Path::new();
        for command in &glyph.commands {
            match *command {
                Command::Move(p) => {
                    if !current.is_empty() {
                        paths.push(std::mem::take(&mut current));
                    }
                    current.move_to(place(p));
                }
                Command::Line(p) => current.line_to(place(p)),
                Command::Quadratic { control, end } => {
                    current.quadratic_curve_to(place(control), place(end))
                }
                Command::Cubic { c1, c2, end } => {
                    current.bezier_curve_to(place(c1), place(c2), place(end))
                }
            }
        }
        if !current.is_empty() {
            paths.push(current);
        }
        Some((paths, glyph.advance * scale))
    }
}

/// Group contours into shapes: contours wound like the first one are solids,
/// the others are holes of the solid that contains them.
fn contours_to_shapes(paths: Vec<Path>, divisions: usize) -> Vec<Shape> {
    let sampled: Vec<(Path, Vec<Vec2>)> = paths
        .into_iter()
        .map(|p| {
            let pts = p.points(divisions);
            (p, pts)
        })
        .filter(|(_, pts)| pts.len() >= 3)
        .collect();
    let Some(first) = sampled.first() else {
        return Vec::new();
    };
    let solid_ccw = signed_area(&first.1) > 0.0;

    let mut solids: Vec<(Shape, Vec<Vec2>)> = Vec::new();
    let mut holes = Vec::new();
    for (path, pts) in sampled {
        if (signed_area(&pts) > 0.0) == solid_ccw {
            solids.push((Shape::new(path), pts));
        } else {
            holes.push((path, pts));
        }
    }

    for (hole, pts) in holes {
        let owner = solids
            .iter()
            .position(|(_, outer)| contains_point(outer, pts[0]))
            .or(solids.len().checked_sub(1));
        if let Some(i) = owner {
            solids[i].0.holes.push(hole);
        }
    }
    solids.into_iter().map(|(s, _)| s).collect()
}

impl GlyphSource for TypefaceFont {
    fn generate_shapes(&self, text: &str, size: f32) -> Vec<Shape> {
        let scale = size / self.resolution;
        let line_height = self.line_height * scale;
        let mut offset = Vec2::ZERO;
        let mut shapes = Vec::new();
        for c in text.chars() {
            if c == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            if let Some((paths, advance)) = self.glyph_paths(c, scale, offset) {
                shapes.extend(contours_to_shapes(paths, crate::extrude::CURVE_SEGMENTS));
                offset.x += advance;
            }
        }
        shapes
    }
}

/// Loads typeface fonts from disk.
pub struct FontLoader;

impl FontLoader {
    /// Resolves once with the parsed font, or the reason it could not be loaded.
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<TypefaceFont, FontError> {
        let path = path.as_ref();
        log::info!("Loading font {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let font = TypefaceFont::from_json(&json)?;
        log::info!("Loaded font with {} glyphs", font.glyph_count());
        Ok(font)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal font: 'A' is a square, 'O' a square with a square hole, '?' a
    /// thin bar. Resolution 1000, advance 600.
    pub(crate) const TEST_FONT: &str = r#"{
        "familyName": "Test Sans",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "yMin": -200, "yMax": 950 },
        "glyphs": {
            "A": { "ha": 600, "x_min": 0, "x_max": 500, "o": "m 0 0 l 500 0 l 500 500 l 0 500 z" },
            "O": { "ha": 600, "x_min": 0, "x_max": 500,
                   "o": "m 0 0 l 500 0 l 500 500 l 0 500 z m 100 100 l 100 400 l 400 400 l 400 100 z" },
            "C": { "ha": 600, "o": "m 0 0 l 500 0 q 0 500 500 500 z" },
            "?": { "ha": 300, "o": "m 0 0 l 100 0 l 100 500 l 0 500 z" },
            " ": { "ha": 250 }
        }
    }"#;

    pub(crate) fn test_font() -> TypefaceFont {
        TypefaceFont::from_json(TEST_FONT).unwrap()
    }

    #[test]
    fn parses_glyph_table() {
        let font = test_font();
        assert_eq!(font.glyph_count(), 5);
        assert_eq!(font.family_name(), Some("Test Sans"));
        assert!(font.has_glyph(' '));
    }

    #[test]
    fn glyphs_advance_by_scaled_width() {
        let font = test_font();
        let shapes = font.generate_shapes("AA", 100.0);
        assert_eq!(shapes.len(), 2);
        let first = shapes[0].outer.points(1);
        let second = shapes[1].outer.points(1);
        assert!((second[0].x - first[0].x - 60.0).abs() < 1e-4);
    }

    #[test]
    fn inner_contour_becomes_hole() {
        let shapes = test_font().generate_shapes("O", 100.0);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
    }

    #[test]
    fn missing_glyph_falls_back() {
        let shapes = test_font().generate_shapes("Z", 100.0);
        assert_eq!(shapes.len(), 1);
        let (min_x, max_x) = shapes[0]
            .outer
            .points(1)
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        assert!((max_x - min_x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn newline_moves_down_one_line() {
        let shapes = test_font().generate_shapes("A\nA", 100.0);
        assert_eq!(shapes.len(), 2);
        let y0 = shapes[0].outer.points(1)[0].y;
        let y1 = shapes[1].outer.points(1)[0].y;
        // (950 + 200 + 50) * 0.1
        assert!((y0 - y1 - 120.0).abs() < 1e-3);
        assert_eq!(shapes[1].outer.points(1)[0].x, 0.0);
    }

    #[test]
    fn curve_commands_are_sampled() {
        let shapes = test_font().generate_shapes("C", 100.0);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].outer.points(12).len() > 4);
    }

    #[test]
    fn bad_outline_is_an_error() {
        let json = r#"{"resolution": 1000, "boundingBox": {"yMin": 0, "yMax": 1},
                       "glyphs": {"x": {"ha": 1, "o": "m 0 zero"}}}"#;
        assert!(matches!(
            TypefaceFont::from_json(json),
            Err(FontError::Outline { glyph: 'x', .. })
        ));
    }

    #[test]
    fn loader_reports_missing_file() {
        let result = pollster::block_on(FontLoader::load("/nonexistent/font.json"));
        assert!(matches!(result, Err(FontError::Io(_))));
    }
}
