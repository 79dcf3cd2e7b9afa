use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Mat3, Quat, Vec3};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::document::{CharacterDocument, Role};
use crate::model::{CharacterModel, Geometry, ModelLibrary, Primitive};
use crate::raycast::{Aabb, Ray};

/// Spacing between neighbours in a formation row.
pub const ROW_SPACING: f32 = 1.5;
/// Height above the ground at which characters are placed.
pub const ROW_HEIGHT: f32 = 0.5;

/// Rectangle on the XZ plane the player may move within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min_x: -9.0,
            max_x: 9.0,
            min_z: -9.0,
            max_z: 9.0,
        }
    }
}

impl ArenaBounds {
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.min_x, self.max_x),
            position.y,
            position.z.clamp(self.min_z, self.max_z),
        )
    }

    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.min_x, self.min_z),
            (self.max_x, self.min_z),
            (self.min_x, self.max_z),
            (self.max_x, self.max_z),
        ]
    }
}

/// A row of characters: member `i` sits at `start_x + i * spacing`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub start_x: f32,
    pub z: f32,
    pub spacing: f32,
    pub height: f32,
}

impl Formation {
    pub const fn row(start_x: f32, z: f32) -> Self {
        Self {
            start_x,
            z,
            spacing: ROW_SPACING,
            height: ROW_HEIGHT,
        }
    }

    pub fn slot(&self, index: usize) -> Vec3 {
        Vec3::new(
            self.start_x + index as f32 * self.spacing,
            self.height,
            self.z,
        )
    }
}

/// Fixed layout of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub bounds: ArenaBounds,
    pub allies: Formation,
    pub enemies: Formation,
    pub bosses: Formation,
    pub ground_size: f32,
    pub light: Light,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            bounds: ArenaBounds::default(),
            allies: Formation::row(-4.0, -4.0),
            enemies: Formation::row(-4.0, 4.0),
            bosses: Formation::row(-2.0, 7.0),
            ground_size: 20.0,
            light: Light::default(),
        }
    }
}

/// Directional light shining from `position` toward the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 10.0, 7.0),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// What a scene object stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "lowercase")]
pub enum ObjectKind {
    Character(Role),
    Placeholder(Role),
    Player,
    Ground,
    Marker,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(role) => write!(f, "{role}"),
            Self::Placeholder(role) => write!(f, "{role} placeholder"),
            Self::Player => f.write_str("player"),
            Self::Ground => f.write_str("ground"),
            Self::Marker => f.write_str("marker"),
        }
    }
}

/// How a scene object is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Model(CharacterModel),
    Primitive(Primitive),
}

/// Object placed in the world, tagged with the name it was created from.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub visual: Visual,
}

impl SceneObject {
    pub fn primitive(
        name: impl Into<String>,
        kind: ObjectKind,
        position: Vec3,
        primitive: Primitive,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            rotation: Quat::IDENTITY,
            visual: Visual::Primitive(primitive),
        }
    }

    /// Every primitive of the object with its world-space position.
    pub fn world_primitives(&self) -> Vec<(Primitive, Vec3)> {
        match &self.visual {
            Visual::Primitive(primitive) => vec![(*primitive, self.position)],
            Visual::Model(model) => model
                .walk()
                .into_iter()
                .map(|(id, offset)| {
                    (
                        model.node(id).primitive,
                        self.position + self.rotation * offset,
                    )
                })
                .collect(),
        }
    }

    /// Distance along `ray` to the nearest primitive surface of the object.
    /// World-space bounding boxes reject misses before the exact test.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let abs = self.abs_rotation();
        let to_local = self.rotation.inverse();
        let mut nearest: Option<f32> = None;
        for (primitive, center) in self.world_primitives() {
            let aabb =
                Aabb::from_center_half_extents(center, abs * primitive.geometry.half_extents());
            if ray.intersect_aabb(&aabb).is_none() {
                continue;
            }
            let local = Ray {
                origin: to_local * (ray.origin - center),
                direction: to_local * ray.direction,
            };
            if let Some(distance) = primitive.geometry.intersect(&local) {
                if nearest.map_or(true, |current| distance < current) {
                    nearest = Some(distance);
                }
            }
        }
        nearest
    }

    fn abs_rotation(&self) -> Mat3 {
        let rotation = Mat3::from_quat(self.rotation);
        Mat3::from_cols(
            rotation.x_axis.abs(),
            rotation.y_axis.abs(),
            rotation.z_axis.abs(),
        )
    }
}

/// Nearest intersection found by [`Scene::raycast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub object: usize,
    pub distance: f32,
}

/// The assembled world.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub light: Light,
    pub layout: SceneLayout,
}

impl Scene {
    /// Places every character of the roster into its role's row and adds the
    /// ground, the light and the boundary markers.
    pub fn assemble(
        characters: &[CharacterDocument],
        library: &ModelLibrary,
        layout: SceneLayout,
    ) -> Self {
        let mut objects = Vec::with_capacity(characters.len() + 5);

        let mut ground = SceneObject::primitive(
            "ground",
            ObjectKind::Ground,
            Vec3::ZERO,
            Primitive {
                geometry: Geometry::Plane {
                    width: layout.ground_size,
                    height: layout.ground_size,
                },
                color: Vec3::new(0.33, 0.42, 0.18),
            },
        );
        ground.rotation = Quat::from_rotation_x(-FRAC_PI_2);
        objects.push(ground);

        let buckets = [
            (layout.allies, &[Role::Ally][..]),
            (layout.enemies, &[Role::Enemy][..]),
            (layout.bosses, &[Role::Boss, Role::MiniBoss][..]),
        ];
        for (formation, roles) in buckets {
            let members = characters
                .iter()
                .filter(|character| roles.contains(&character.role));
            for (index, character) in members.enumerate() {
                objects.push(place_character(character, library, formation.slot(index)));
            }
        }

        for (x, z) in layout.bounds.corners() {
            objects.push(SceneObject::primitive(
                format!("marker ({x}, {z})"),
                ObjectKind::Marker,
                Vec3::new(x, 0.1, z),
                Primitive {
                    geometry: Geometry::Box {
                        width: 0.2,
                        height: 0.2,
                        depth: 0.2,
                    },
                    color: Vec3::new(1.0, 1.0, 0.0),
                },
            ));
        }

        info!(
            "assembled scene with {} objects from {} characters",
            objects.len(),
            characters.len()
        );

        Self {
            objects,
            light: layout.light,
            layout,
        }
    }

    /// Appends an object and returns its index.
    pub fn add(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn object(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) -> bool {
        match self.objects.get_mut(index) {
            Some(object) => {
                object.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_color(&mut self, index: usize, color: Vec3) -> bool {
        match self.objects.get_mut(index).map(|object| &mut object.visual) {
            Some(Visual::Primitive(primitive)) => {
                primitive.color = color;
                true
            }
            _ => false,
        }
    }

    /// Nearest hit among objects accepted by `filter`, measured against the
    /// primitives' true shapes. Every object is tested; there is no spatial
    /// index.
    pub fn raycast<F>(&self, ray: &Ray, filter: F) -> Option<SceneHit>
    where
        F: Fn(usize, &SceneObject) -> bool,
    {
        let mut nearest: Option<SceneHit> = None;
        for (index, object) in self.objects.iter().enumerate() {
            if !filter(index, object) {
                continue;
            }
            let Some(distance) = object.intersect(ray) else {
                continue;
            };
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(SceneHit {
                    object: index,
                    distance,
                });
            }
        }
        nearest
    }
}

fn place_character(
    character: &CharacterDocument,
    library: &ModelLibrary,
    position: Vec3,
) -> SceneObject {
    match library.build(&character.name) {
        Ok(Some(model)) if model.primitive_count() > 0 => SceneObject {
            name: character.name.clone(),
            kind: ObjectKind::Character(character.role),
            position,
            rotation: Quat::IDENTITY,
            visual: Visual::Model(model),
        },
        Ok(_) => placeholder(character, position),
        Err(err) => {
            warn!("{err}; using placeholder");
            placeholder(character, position)
        }
    }
}

fn placeholder(character: &CharacterDocument, position: Vec3) -> SceneObject {
    SceneObject::primitive(
        character.name.clone(),
        ObjectKind::Placeholder(character.role),
        position,
        Primitive {
            geometry: Geometry::unit_cube(),
            color: placeholder_color(character.role),
        },
    )
}

pub fn placeholder_color(role: Role) -> Vec3 {
    match role {
        Role::Ally => Vec3::new(0.0, 1.0, 0.0),
        Role::Enemy => Vec3::new(1.0, 0.0, 0.0),
        Role::MiniBoss | Role::Boss => Vec3::new(0.5, 0.0, 0.5),
    }
}
