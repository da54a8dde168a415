//! Typeface JSON fonts.
//!
//! The format is the one produced by facetype.js and shipped with the three.js
//! examples: a `resolution` (font units per em), optional metrics and a
//! `glyphs` table whose entries carry an advance (`ha`) and an outline string
//! (`o`). Outline commands are whitespace separated:
//!
//! - `m x y` starts a contour
//! - `l x y` draws a line
//! - `q x y cx cy` draws a quadratic curve; end point first, control point second
//! - `b x y c1x c1y c2x c2y` draws a cubic curve; end point first
//!
//! A `z` closes nothing and is accepted for compatibility; contours are always
//! treated as closed.

use std::collections::HashMap;

use cgmath::Point2;
use serde::Deserialize;

use crate::resources::{LoadError, load_string};

/// Glyph used when a requested character is missing from the font.
pub const FALLBACK_GLYPH: char = '?';

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("could not load font: {0}")]
    Load(#[from] LoadError),
    #[error("malformed typeface json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("font resolution must be positive, got {0}")]
    Resolution(f32),
    #[error("font has neither a glyph for {0:?} nor a fallback glyph")]
    MissingGlyph(char),
    #[error("glyph {glyph:?} has a malformed outline: {reason}")]
    Outline { glyph: char, reason: String },
    #[error("could not tessellate text: {0}")]
    Tessellation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "xMin")]
    pub x_min: f32,
    #[serde(rename = "xMax")]
    pub x_max: f32,
    #[serde(rename = "yMin")]
    pub y_min: f32,
    #[serde(rename = "yMax")]
    pub y_max: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub ha: f32,
    /// Outline command string; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2<f32>),
    LineTo(Point2<f32>),
    QuadTo {
        ctrl: Point2<f32>,
        to: Point2<f32>,
    },
    CubicTo {
        ctrl1: Point2<f32>,
        ctrl2: Point2<f32>,
        to: Point2<f32>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Font {
    #[serde(rename = "familyName", default)]
    pub family_name: Option<String>,
    pub resolution: f32,
    #[serde(rename = "boundingBox", default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: Option<f32>,
    glyphs: HashMap<String, Glyph>,
}

impl Font {
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let font: Font = serde_json::from_str(json)?;
        if !(font.resolution > 0.0) {
            return Err(FontError::Resolution(font.resolution));
        }
        Ok(font)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Looks up `ch`, falling back to [`FALLBACK_GLYPH`].
    pub fn glyph(&self, ch: char) -> Result<&Glyph, FontError> {
        if let Some(glyph) = self.glyphs.get(ch.to_string().as_str()) {
            return Ok(glyph);
        }
        log::warn!(
            "font {:?} has no glyph for {:?}, using {:?}",
            self.family_name.as_deref().unwrap_or("<unnamed>"),
            ch,
            FALLBACK_GLYPH
        );
        self.glyphs
            .get(FALLBACK_GLYPH.to_string().as_str())
            .ok_or(FontError::MissingGlyph(ch))
    }

    /// Distance between baselines of consecutive lines, in font units.
    fn line_height(&self) -> f32 {
        match self.bounding_box {
            Some(bb) => bb.y_max - bb.y_min + self.underline_thickness.unwrap_or(0.0),
            None => self.resolution,
        }
    }

    /// Lays out `text` at `size` world units per em and returns the outline of
    /// every glyph as path commands. `\n` starts a new line below.
    pub fn layout(&self, text: &str, size: f32) -> Result<Vec<PathCommand>, FontError> {
        let scale = size / self.resolution;
        let line_height = self.line_height() * scale;
        let mut commands = Vec::new();
        let (mut offset_x, mut offset_y) = (0.0, 0.0);

        for ch in text.chars() {
            if ch == '\n' {
                offset_x = 0.0;
                offset_y -= line_height;
                continue;
            }
            let glyph = self.glyph(ch)?;
            if let Some(outline) = &glyph.o {
                commands.extend(parse_outline(ch, outline, scale, offset_x, offset_y)?);
            }
            offset_x += glyph.ha * scale;
        }
        Ok(commands)
    }
}

fn parse_outline(
    glyph: char,
    outline: &str,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
) -> Result<Vec<PathCommand>, FontError> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();
    let point = |tokens: &mut std::str::SplitWhitespace<'_>| -> Result<Point2<f32>, FontError> {
        let mut coord = || -> Result<f32, FontError> {
            let token = tokens.next().ok_or_else(|| FontError::Outline {
                glyph,
                reason: "outline ends in the middle of a command".to_string(),
            })?;
            token.parse::<f32>().map_err(|_| FontError::Outline {
                glyph,
                reason: format!("`{}` is not a number", token),
            })
        };
        let x = coord()?;
        let y = coord()?;
        Ok(Point2::new(x * scale + offset_x, y * scale + offset_y))
    };

    let mut started = false;
    while let Some(action) = tokens.next() {
        let command = match action {
            "m" => {
                started = true;
                PathCommand::MoveTo(point(&mut tokens)?)
            }
            "z" => continue,
            "l" | "q" | "b" if !started => {
                return Err(FontError::Outline {
                    glyph,
                    reason: format!("`{}` before the first `m`", action),
                });
            }
            "l" => PathCommand::LineTo(point(&mut tokens)?),
            "q" => {
                let to = point(&mut tokens)?;
                let ctrl = point(&mut tokens)?;
                PathCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = point(&mut tokens)?;
                let ctrl1 = point(&mut tokens)?;
                let ctrl2 = point(&mut tokens)?;
                PathCommand::CubicTo { ctrl1, ctrl2, to }
            }
            other => {
                return Err(FontError::Outline {
                    glyph,
                    reason: format!("unknown command `{}`", other),
                });
            }
        };
        commands.push(command);
    }
    Ok(commands)
}

/// Fetches and parses a typeface JSON file.
pub async fn load_font(source: &str) -> Result<Font, FontError> {
    log::info!("loading font from {}", source);
    let json = load_string(source).await?;
    let font = Font::from_json(&json)?;
    log::info!(
        "loaded font {:?} with {} glyphs",
        font.family_name.as_deref().unwrap_or("<unnamed>"),
        font.glyph_count()
    );
    Ok(font)
}
