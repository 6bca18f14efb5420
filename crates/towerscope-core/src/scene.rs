//! Static scene graph: the tower, its surroundings and the star field.
//!
//! The graph is built once and never mutated. Everything that moves (the
//! building's slow bob) is a pure function of elapsed time, so the same
//! parameters always produce the same frame.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Primitive used to draw an element. Every primitive is unit-sized and
/// scaled by [`SceneElement::size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Box,
    Cylinder,
    Sphere,
}

/// Surface appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Base color as `0xRRGGBB`.
    pub color: u32,
    /// Emissive color as `0xRRGGBB`.
    pub emissive: u32,
    pub emissive_intensity: f32,
    /// 1.0 is opaque.
    pub opacity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: 0x0080_8080,
            emissive: 0,
            emissive_intensity: 0.0,
            opacity: 1.0,
        }
    }
}

impl Material {
    /// Opaque material without emission.
    pub fn solid(color: u32) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Material that glows with `emissive` at `intensity`.
    pub fn glowing(color: u32, emissive: u32, intensity: f32) -> Self {
        Self {
            color,
            emissive,
            emissive_intensity: intensity,
            opacity: 1.0,
        }
    }
}

/// One drawable primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub name: String,
    pub shape: Shape,
    /// Center in world space, before the building bob.
    pub center: Vec3,
    /// Extent along each local axis.
    pub size: Vec3,
    /// Rotation around the vertical axis, radians.
    #[serde(default)]
    pub rotation_y: f32,
    #[serde(default)]
    pub material: Material,
    /// Whether the element moves with the building bob.
    #[serde(default)]
    pub bobs: bool,
}

impl SceneElement {
    fn new(name: impl Into<String>, shape: Shape, center: Vec3, size: Vec3, material: Material) -> Self {
        Self {
            name: name.into(),
            shape,
            center,
            size,
            rotation_y: 0.0,
            material,
            bobs: false,
        }
    }

    fn rotated(mut self, rotation_y: f32) -> Self {
        self.rotation_y = rotation_y;
        self
    }

    fn bobbing(mut self) -> Self {
        self.bobs = true;
        self
    }

    /// Model matrix at elapsed time `t`.
    pub fn transform(&self, t: f32) -> Mat4 {
        let lift = if self.bobs { building_bob(t) } else { 0.0 };
        Mat4::from_scale_rotation_translation(
            self.size,
            Quat::from_rotation_y(self.rotation_y),
            self.center + Vec3::Y * lift,
        )
    }
}

/// Ground grid lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    /// Side length of the square grid.
    pub size: f32,
    pub divisions: u32,
    /// Color of the two center lines as `0xRRGGBB`.
    pub center_color: u32,
    /// Color of all other lines as `0xRRGGBB`.
    pub line_color: u32,
    /// Ground plane color as `0xRRGGBB`.
    pub ground_color: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size: 100.0,
            divisions: 50,
            center_color: 0x000a_3040,
            line_color: 0x0005_1520,
            ground_color: 0x0005_0510,
        }
    }
}

/// A background star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    /// Relative size in `[0.5, 1.5)`.
    pub size: f32,
}

/// Geometry loaded from a JSON scene file, replacing the built-in tower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    pub elements: Vec<SceneElement>,
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub star_count: Option<u32>,
}

impl SceneDescription {
    /// Parses a scene description from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let desc: Self = serde_json::from_str(json)?;
        if desc.elements.is_empty() {
            return Err(ViewerError::SceneLoad("scene has no elements".to_string()));
        }
        Ok(desc)
    }

    /// Reads a scene description from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ViewerError::SceneLoad(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}

/// The immutable scene.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    elements: Vec<SceneElement>,
    stars: Vec<Star>,
    grid: Grid,
}

impl SceneGraph {
    /// Builds the glass tower facility with `star_count` background stars.
    pub fn facility(star_count: u32) -> Self {
        let mut elements = Vec::new();
        tower(&mut elements);
        entrance(&mut elements);
        let graph = Self {
            elements,
            stars: star_field(star_count),
            grid: Grid::default(),
        };
        log::debug!(
            "built facility scene: {} elements, {} stars",
            graph.elements.len(),
            graph.stars.len()
        );
        graph
    }

    /// Builds a scene from a loaded description.
    pub fn from_description(desc: SceneDescription, default_star_count: u32) -> Self {
        let stars = star_field(desc.star_count.unwrap_or(default_star_count));
        Self {
            elements: desc.elements,
            stars,
            grid: desc.grid,
        }
    }

    /// All primitives.
    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    /// Looks up an element by name.
    pub fn element(&self, name: &str) -> Option<&SceneElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Background stars.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Ground grid parameters.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

/// Vertical offset of the building at elapsed time `t`.
pub fn building_bob(t: f32) -> f32 {
    (t * 0.3).sin() * 0.1
}

/// Whether window `window` on floor `floor` has its lights on.
///
/// Windows are numbered per floor: front 0..4, back 4..8, right 8..11, left 11..14.
pub fn window_lit(floor: u32, window: u32) -> bool {
    ((floor * 10 + window) * 7 + 3) % 5 != 0
}

const FLOORS: u32 = 8;
const PANE: f32 = 1.6;
const PANE_DEPTH: f32 = 0.02;

const GLASS: u32 = 0x001a_2a3a;
const STEEL: u32 = 0x002a_3a4a;
const WINDOW_DARK: u32 = 0x000a_1520;
const WINDOW_LIT: u32 = 0x001a_1812;
const WARM_WHITE: u32 = 0x00ff_f8e8;

fn window_material(floor: u32, window: u32) -> Material {
    if window_lit(floor, window) {
        Material::glowing(WINDOW_LIT, WARM_WHITE, 0.6)
    } else {
        Material::solid(WINDOW_DARK)
    }
}

fn tower(out: &mut Vec<SceneElement>) {
    // The building group sits on a plinth; its local origin is 8 units up.
    let origin = Vec3::new(0.0, 8.0, 0.0);

    out.push(
        SceneElement::new(
            "core",
            Shape::Box,
            origin,
            Vec3::new(8.0, 16.0, 6.0),
            Material {
                color: GLASS,
                emissive: 0,
                emissive_intensity: 0.0,
                opacity: 0.85,
            },
        )
        .bobbing(),
    );

    let pane = Vec3::new(PANE, PANE, PANE_DEPTH);
    for floor in 0..FLOORS {
        #[allow(clippy::cast_precision_loss)]
        let y = origin.y - 6.0 + floor as f32 * 2.0;
        for i in 0..4u32 {
            #[allow(clippy::cast_precision_loss)]
            let x = -3.0 + i as f32 * 2.0;
            out.push(
                SceneElement::new(
                    format!("window-f{floor}-front-{i}"),
                    Shape::Box,
                    Vec3::new(x, y, 3.01),
                    pane,
                    window_material(floor, i),
                )
                .bobbing(),
            );
            out.push(
                SceneElement::new(
                    format!("window-f{floor}-back-{i}"),
                    Shape::Box,
                    Vec3::new(x, y, -3.01),
                    pane,
                    window_material(floor, i + 4),
                )
                .rotated(PI)
                .bobbing(),
            );
        }
        for i in 0..3u32 {
            #[allow(clippy::cast_precision_loss)]
            let z = -2.0 + i as f32 * 2.0;
            out.push(
                SceneElement::new(
                    format!("window-f{floor}-right-{i}"),
                    Shape::Box,
                    Vec3::new(4.01, y, z),
                    pane,
                    window_material(floor, i + 8),
                )
                .rotated(FRAC_PI_2)
                .bobbing(),
            );
            out.push(
                SceneElement::new(
                    format!("window-f{floor}-left-{i}"),
                    Shape::Box,
                    Vec3::new(-4.01, y, z),
                    pane,
                    window_material(floor, i + 11),
                )
                .rotated(-FRAC_PI_2)
                .bobbing(),
            );
        }
    }

    for i in 0..9u8 {
        out.push(
            SceneElement::new(
                format!("beam-{i}"),
                Shape::Box,
                origin + Vec3::new(0.0, -7.0 + f32::from(i) * 2.0, 3.05),
                Vec3::new(8.2, 0.15, 0.1),
                Material::solid(STEEL),
            )
            .bobbing(),
        );
    }
    for i in 0..5u8 {
        out.push(
            SceneElement::new(
                format!("pillar-{i}"),
                Shape::Box,
                origin + Vec3::new(-4.0 + f32::from(i) * 2.0, 0.0, 3.05),
                Vec3::new(0.15, 16.2, 0.1),
                Material::solid(STEEL),
            )
            .bobbing(),
        );
    }

    let roof = [
        SceneElement::new(
            "roof-slab",
            Shape::Box,
            origin + Vec3::new(0.0, 8.2, 0.0),
            Vec3::new(8.5, 0.4, 6.5),
            Material::solid(0x001a_2530),
        ),
        SceneElement::new(
            "roof-equipment",
            Shape::Box,
            origin + Vec3::new(-2.0, 8.8, 1.0),
            Vec3::new(1.5, 1.0, 1.2),
            Material::solid(STEEL),
        ),
        SceneElement::new(
            "roof-unit",
            Shape::Cylinder,
            origin + Vec3::new(2.0, 8.6, -1.0),
            Vec3::new(0.8, 0.8, 0.8),
            Material::solid(0x003a_4a5a),
        ),
        SceneElement::new(
            "antenna",
            Shape::Cylinder,
            origin + Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.1, 3.0, 0.1),
            Material::solid(0x004a_5a6a),
        ),
        SceneElement::new(
            "beacon",
            Shape::Sphere,
            origin + Vec3::new(0.0, 11.5, 0.0),
            Vec3::splat(0.3),
            Material::glowing(0x00ff_3333, 0x00ff_0000, 2.0),
        ),
    ];
    out.extend(roof.into_iter().map(SceneElement::bobbing));
}

fn entrance(out: &mut Vec<SceneElement>) {
    out.push(SceneElement::new(
        "plinth",
        Shape::Box,
        Vec3::new(0.0, 0.25, 0.0),
        Vec3::new(10.0, 0.5, 8.0),
        Material::solid(0x001a_1a2a),
    ));
    out.push(SceneElement::new(
        "canopy",
        Shape::Box,
        Vec3::new(0.0, 1.5, 4.5),
        Vec3::new(4.0, 0.15, 2.0),
        Material::glowing(STEEL, 0x0022_d3ee, 0.1),
    ));
    for (side, x) in [("left", -1.5), ("right", 1.5)] {
        out.push(SceneElement::new(
            format!("canopy-pillar-{side}"),
            Shape::Cylinder,
            Vec3::new(x, 0.75, 4.5),
            Vec3::new(0.2, 1.5, 0.2),
            Material::solid(0x003a_4a5a),
        ));
    }
}

/// Stable 32-bit integer hash (lowbias32).
fn hash(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

#[allow(clippy::cast_precision_loss)]
fn unit(x: u32) -> f32 {
    (x >> 8) as f32 / (1u32 << 24) as f32
}

/// Position of star `index` on a shell between radius 100 and 150.
pub fn star_position(index: u32) -> Vec3 {
    let seed = index.wrapping_mul(4);
    let u = unit(hash(seed));
    let v = unit(hash(seed + 1));
    let w = unit(hash(seed + 2));

    let theta = TAU * u;
    let cos_phi = 1.0 - 2.0 * v;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let radius = 100.0 + 50.0 * w;
    Vec3::new(
        radius * sin_phi * theta.cos(),
        radius * cos_phi,
        radius * sin_phi * theta.sin(),
    )
}

fn star_field(count: u32) -> Vec<Star> {
    (0..count)
        .map(|i| Star {
            position: star_position(i),
            size: 0.5 + unit(hash(i.wrapping_mul(4) + 3)),
        })
        .collect()
}
