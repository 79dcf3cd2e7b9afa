use std::collections::HashMap;

use glam::{Vec2, Vec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{CharacterDocument, PartSpec, Role, Shape};
use crate::raycast::{Aabb, Ray};

/// Errors raised while assembling a character rig from its part/weld list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("character {character}: part {part:?} is defined more than once")]
    DuplicatePart { character: String, part: String },
    #[error("character {character}: weld #{weld} references unknown part {part:?}")]
    UnknownPart {
        character: String,
        weld: usize,
        part: String,
    },
    #[error("character {character}: welding {child:?} under {parent:?} would form a cycle")]
    WeldCycle {
        character: String,
        parent: String,
        child: String,
    },
}

/// Handle to a node inside a [`CharacterModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Renderable geometry derived from a part's shape and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Geometry {
    Sphere {
        radius: f32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Plane {
        width: f32,
        height: f32,
    },
}

impl Geometry {
    pub fn from_part(part: &PartSpec) -> Self {
        match part.shape {
            Shape::Sphere => Geometry::Sphere {
                radius: part.extent(0),
            },
            Shape::Cylinder => Geometry::Cylinder {
                radius_top: part.extent(0),
                radius_bottom: part.extent(0),
                height: part.extent(1),
            },
            Shape::Plane => Geometry::Plane {
                width: part.extent(0),
                height: part.extent(1),
            },
            Shape::Box => Geometry::Box {
                width: part.extent(0),
                height: part.extent(1),
                depth: part.extent(2),
            },
        }
    }

    pub fn unit_cube() -> Self {
        Geometry::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }

    /// Half extents of the local bounding box. Planes lie in the XY plane.
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Geometry::Sphere { radius } => Vec3::splat(radius),
            Geometry::Box {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth) * 0.5,
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let radius = radius_top.max(radius_bottom);
                Vec3::new(radius, height * 0.5, radius)
            }
            Geometry::Plane { width, height } => Vec3::new(width * 0.5, height * 0.5, 0.0),
        }
    }

    /// Distance along `ray` to the surface. The ray is in the primitive's
    /// own frame: centered on the origin and unrotated. Cylinders with
    /// different end radii are tested against the wider one.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match *self {
            Geometry::Sphere { radius } => ray.intersect_sphere(Vec3::ZERO, radius),
            Geometry::Box { .. } => ray.intersect_aabb(&Aabb::from_center_half_extents(
                Vec3::ZERO,
                self.half_extents(),
            )),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => ray.intersect_cylinder(Vec3::ZERO, radius_top.max(radius_bottom), height * 0.5),
            Geometry::Plane { width, height } => {
                ray.intersect_rect(Vec3::ZERO, Vec2::new(width * 0.5, height * 0.5))
            }
        }
    }
}

/// Geometry plus its tint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub geometry: Geometry,
    pub color: Vec3,
}

/// One part inside the assembled rig.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub primitive: Primitive,
    /// Offset from the parent node, or from the model origin for root parts.
    pub position: Vec3,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl ModelNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Fully assembled rigid hierarchy for one character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterModel {
    name: String,
    role: Role,
    nodes: Vec<ModelNode>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl CharacterModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Nodes attached directly to the model root, in part order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &ModelNode {
        &self.nodes[id.0]
    }

    pub fn find(&self, part: &str) -> Option<NodeId> {
        self.index.get(part).copied()
    }

    pub fn primitive_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when `node` sits somewhere below `ancestor`.
    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Depth-first walk from the roots yielding each node with its
    /// model-space position.
    pub fn walk(&self) -> Vec<(NodeId, Vec3)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, Vec3)> = self
            .roots
            .iter()
            .rev()
            .map(|id| (*id, Vec3::ZERO))
            .collect();
        while let Some((id, parent_position)) = stack.pop() {
            let node = &self.nodes[id.0];
            let position = parent_position + node.position;
            out.push((id, position));
            for child in node.children.iter().rev() {
                stack.push((*child, position));
            }
        }
        out
    }
}

/// Builds a character rig from its declarative description.
pub fn build_model(document: &CharacterDocument) -> Result<CharacterModel, ModelError> {
    let mut nodes = Vec::with_capacity(document.parts.len());
    let mut index = HashMap::with_capacity(document.parts.len());

    for part in &document.parts {
        let id = NodeId(nodes.len());
        if index.insert(part.name.clone(), id).is_some() {
            return Err(ModelError::DuplicatePart {
                character: document.name.clone(),
                part: part.name.clone(),
            });
        }
        let color = part.color.to_rgb().unwrap_or_else(|| {
            warn!(
                "character {}: part {} has unreadable color {:?}; using white",
                document.name, part.name, part.color
            );
            Vec3::ONE
        });
        nodes.push(ModelNode {
            name: part.name.clone(),
            primitive: Primitive {
                geometry: Geometry::from_part(part),
                color,
            },
            position: part.position,
            parent: None,
            children: Vec::new(),
        });
    }

    let mut model = CharacterModel {
        name: document.name.clone(),
        role: document.role,
        nodes,
        roots: Vec::new(),
        index,
    };

    for (weld_index, weld) in document.welds.iter().enumerate() {
        let lookup = |part: &str| {
            model.find(part).ok_or_else(|| ModelError::UnknownPart {
                character: document.name.clone(),
                weld: weld_index,
                part: part.to_string(),
            })
        };
        let parent = lookup(&weld.part0)?;
        let child = lookup(&weld.part1)?;
        if parent == child || model.is_descendant(child, parent) {
            return Err(ModelError::WeldCycle {
                character: document.name.clone(),
                parent: weld.part0.clone(),
                child: weld.part1.clone(),
            });
        }
        model.attach(parent, child);
    }

    model.roots = (0..model.nodes.len())
        .map(NodeId)
        .filter(|id| model.nodes[id.0].parent.is_none())
        .collect();

    debug!(
        "built model {} with {} parts ({} root parts)",
        model.name,
        model.nodes.len(),
        model.roots.len()
    );
    Ok(model)
}

impl CharacterModel {
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(previous) = self.nodes[child.0].parent.take() {
            self.nodes[previous.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }
}

/// Character documents indexed by name, ready to be turned into models.
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    characters: HashMap<String, CharacterDocument>,
}

impl ModelLibrary {
    pub fn new<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = CharacterDocument>,
    {
        let characters = documents
            .into_iter()
            .map(|doc| (doc.name.clone(), doc))
            .collect();
        Self { characters }
    }

    /// Builds the named character. `Ok(None)` means no definition exists
    /// and the caller should fall back to a placeholder.
    pub fn build(&self, name: &str) -> Result<Option<CharacterModel>, ModelError> {
        self.characters.get(name).map(build_model).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ColorValue, WeldSpec};

    fn part(name: &str, shape: Shape, position: Vec3) -> PartSpec {
        PartSpec {
            name: name.to_string(),
            shape,
            size: vec![1.0, 2.0, 3.0],
            color: ColorValue::Packed(0x808080),
            position,
        }
    }

    fn weld(parent: &str, child: &str) -> WeldSpec {
        WeldSpec {
            part0: parent.to_string(),
            part1: child.to_string(),
        }
    }

    fn golem() -> CharacterDocument {
        CharacterDocument {
            name: "Golem".into(),
            role: Role::Boss,
            parts: vec![
                part("torso", Shape::Box, Vec3::ZERO),
                part("head", Shape::Sphere, Vec3::new(0.0, 1.5, 0.0)),
                part("arm", Shape::Cylinder, Vec3::new(1.0, 0.0, 0.0)),
                part("hand", Shape::Sphere, Vec3::new(0.0, -1.0, 0.0)),
                part("banner", Shape::Plane, Vec3::new(3.0, 0.0, 0.0)),
            ],
            welds: vec![
                weld("torso", "head"),
                weld("torso", "arm"),
                weld("arm", "hand"),
            ],
        }
    }

    #[test]
    fn single_sphere_character() {
        let doc = CharacterDocument {
            name: "Bok".into(),
            role: Role::Ally,
            parts: vec![PartSpec {
                name: "body".into(),
                shape: Shape::Sphere,
                size: vec![0.5, 0.0, 0.0],
                color: ColorValue::Text("#00ff00".into()),
                position: Vec3::ZERO,
            }],
            welds: vec![],
        };
        let model = build_model(&doc).unwrap();
        assert_eq!(model.primitive_count(), 1);
        assert_eq!(model.roots().len(), 1);
        let body = model.node(model.roots()[0]);
        assert_eq!(body.primitive.geometry, Geometry::Sphere { radius: 0.5 });
        assert_eq!(body.primitive.color, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(body.position, Vec3::ZERO);
    }

    #[test]
    fn welds_form_a_tree() {
        let doc = golem();
        let model = build_model(&doc).unwrap();
        assert_eq!(model.primitive_count(), doc.parts.len());
        assert_eq!(model.walk().len(), doc.parts.len());

        for weld in &doc.welds {
            let parent = model.find(&weld.part0).unwrap();
            let child = model.find(&weld.part1).unwrap();
            assert!(model.is_descendant(parent, child));
            assert!(!model.roots().contains(&child));
        }

        let roots: Vec<&str> = model
            .roots()
            .iter()
            .map(|id| model.node(*id).name.as_str())
            .collect();
        assert_eq!(roots, vec!["torso", "banner"]);
    }

    #[test]
    fn positions_accumulate_through_parents() {
        let model = build_model(&golem()).unwrap();
        let hand = model.find("hand").unwrap();
        let walked = model
            .walk()
            .into_iter()
            .find(|(id, _)| *id == hand)
            .map(|(_, position)| position);
        assert_eq!(walked, Some(Vec3::new(1.0, -1.0, 0.0)));
    }

    #[test]
    fn geometry_follows_shape_mapping() {
        let model = build_model(&golem()).unwrap();
        let geometry = |name: &str| model.node(model.find(name).unwrap()).primitive.geometry;
        assert_eq!(
            geometry("torso"),
            Geometry::Box {
                width: 1.0,
                height: 2.0,
                depth: 3.0
            }
        );
        assert_eq!(
            geometry("arm"),
            Geometry::Cylinder {
                radius_top: 1.0,
                radius_bottom: 1.0,
                height: 2.0
            }
        );
        assert_eq!(
            geometry("banner"),
            Geometry::Plane {
                width: 1.0,
                height: 2.0
            }
        );
    }

    #[test]
    fn later_weld_reparents_child() {
        let mut doc = golem();
        doc.welds.push(weld("banner", "hand"));
        let model = build_model(&doc).unwrap();
        let arm = model.find("arm").unwrap();
        let banner = model.find("banner").unwrap();
        let hand = model.find("hand").unwrap();
        assert_eq!(model.node(hand).parent(), Some(banner));
        assert!(model.node(arm).children().is_empty());
        assert_eq!(model.walk().len(), doc.parts.len());
    }

    #[test]
    fn dangling_weld_is_rejected() {
        let mut doc = golem();
        doc.welds.push(weld("torso", "tail"));
        let err = build_model(&doc).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownPart {
                character: "Golem".into(),
                weld: 3,
                part: "tail".into()
            }
        );
    }

    #[test]
    fn cycles_are_rejected() {
        let mut doc = golem();
        doc.welds.push(weld("hand", "torso"));
        assert!(matches!(
            build_model(&doc),
            Err(ModelError::WeldCycle { .. })
        ));

        let mut doc = golem();
        doc.welds.push(weld("banner", "banner"));
        assert!(matches!(
            build_model(&doc),
            Err(ModelError::WeldCycle { .. })
        ));
    }

    #[test]
    fn duplicate_parts_are_rejected() {
        let mut doc = golem();
        doc.parts.push(part("head", Shape::Box, Vec3::ZERO));
        assert!(matches!(
            build_model(&doc),
            Err(ModelError::DuplicatePart { .. })
        ));
    }

    #[test]
    fn library_reports_missing_definitions() {
        let library = ModelLibrary::new(vec![golem()]);
        assert!(library.build("Golem").unwrap().is_some());
        assert!(library.build("Nobody").unwrap().is_none());
    }
}
