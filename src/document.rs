use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Extent used for any size axis a part leaves out.
pub const DEFAULT_EXTENT: f32 = 0.5;

/// Character definition as stored under `data/characters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDocument {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<PartSpec>,
    #[serde(default)]
    pub welds: Vec<WeldSpec>,
}

impl CharacterDocument {
    pub fn part(&self, name: &str) -> Option<&PartSpec> {
        self.parts.iter().find(|part| part.name == name)
    }
}

/// Category of a character, used for placement and fallback styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Ally,
    Enemy,
    MiniBoss,
    Boss,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Ally => "ally",
            Role::Enemy => "enemy",
            Role::MiniBoss => "mini-boss",
            Role::Boss => "boss",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rigid piece of a character model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    pub name: String,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub size: Vec<f32>,
    #[serde(default)]
    pub color: ColorValue,
    #[serde(default)]
    pub position: Vec3,
}

impl PartSpec {
    /// Returns the size component for `axis`, falling back to [`DEFAULT_EXTENT`].
    pub fn extent(&self, axis: usize) -> f32 {
        self.size.get(axis).copied().unwrap_or(DEFAULT_EXTENT)
    }
}

/// Primitive shape requested by a part. Parsing is case-insensitive and
/// anything unrecognized becomes a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Shape {
    Sphere,
    #[default]
    Box,
    Cylinder,
    Plane,
}

impl Shape {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "sphere" => Shape::Sphere,
            "cylinder" => Shape::Cylinder,
            "plane" => Shape::Plane,
            _ => Shape::Box,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Sphere => "sphere",
            Shape::Box => "box",
            Shape::Cylinder => "cylinder",
            Shape::Plane => "plane",
        }
    }
}

impl From<String> for Shape {
    fn from(value: String) -> Self {
        Shape::parse(&value)
    }
}

impl From<Shape> for String {
    fn from(shape: Shape) -> Self {
        shape.as_str().to_string()
    }
}

/// Parent-child attachment between two named parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeldSpec {
    pub part0: String,
    pub part1: String,
}

/// Color as written in the data files: either a packed `0xRRGGBB` number or
/// a string (`#rrggbb`, `#rgb`, `0xrrggbb` or a basic CSS color name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Packed(u32),
    Text(String),
}

impl Default for ColorValue {
    fn default() -> Self {
        ColorValue::Packed(0xffffff)
    }
}

impl ColorValue {
    /// Converts the value to RGB components in `0..=1`, or `None` when the
    /// text form cannot be understood.
    pub fn to_rgb(&self) -> Option<Vec3> {
        match self {
            ColorValue::Packed(value) => Some(unpack_rgb(*value)),
            ColorValue::Text(text) => parse_color_text(text),
        }
    }
}

fn unpack_rgb(value: u32) -> Vec3 {
    let r = (value >> 16) & 0xff;
    let g = (value >> 8) & 0xff;
    let b = value & 0xff;
    Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

fn parse_color_text(text: &str) -> Option<Vec3> {
    let text = text.trim();
    let hex = text
        .strip_prefix('#')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"));
    if let Some(hex) = hex {
        return match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(unpack_rgb),
            3 => {
                let short = u32::from_str_radix(hex, 16).ok()?;
                let r = (short >> 8) & 0xf;
                let g = (short >> 4) & 0xf;
                let b = short & 0xf;
                Some(unpack_rgb((r * 17) << 16 | (g * 17) << 8 | b * 17))
            }
            _ => None,
        };
    }
    named_color(&text.to_ascii_lowercase()).map(unpack_rgb)
}

fn named_color(name: &str) -> Option<u32> {
    Some(match name {
        "black" => 0x000000,
        "white" => 0xffffff,
        "red" => 0xff0000,
        "lime" => 0x00ff00,
        "green" => 0x008000,
        "blue" => 0x0000ff,
        "yellow" => 0xffff00,
        "cyan" | "aqua" => 0x00ffff,
        "magenta" | "fuchsia" => 0xff00ff,
        "gray" | "grey" => 0x808080,
        "silver" => 0xc0c0c0,
        "orange" => 0xffa500,
        "purple" => 0x800080,
        "brown" => 0xa52a2a,
        "pink" => 0xffc0cb,
        "gold" => 0xffd700,
        _ => return None,
    })
}

/// Dimension definition as stored under `data/dimensions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDocument {
    pub name: String,
    pub difficulty_level: u32,
}
