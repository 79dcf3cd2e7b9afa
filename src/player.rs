use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::input::InputSnapshot;
use crate::raycast::Ray;
use crate::scene::{ArenaBounds, ObjectKind, Scene};

/// Tunables for the player avatar. Distances are per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub speed: f32,
    pub radius: f32,
    pub ground_level: f32,
    pub gravity_step: f32,
    pub ground_epsilon: f32,
    pub color_smoothing: f32,
    pub moving_color: Vec3,
    pub idle_color: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 0.1,
            radius: 0.5,
            ground_level: 0.5,
            gravity_step: 0.05,
            ground_epsilon: 0.01,
            color_smoothing: 0.1,
            moving_color: Vec3::ONE,
            idle_color: Vec3::splat(0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveState {
    Idle,
    Moving,
}

/// Runtime state of the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub is_moving: bool,
    pub is_on_ground: bool,
}

/// Outcome of one [`PlayerController::update`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStep {
    /// Set when the state machine changed this frame.
    pub transition: Option<MoveState>,
    /// Set when the horizontal move was rejected by a collision.
    pub blocked: bool,
}

const COLLISION_DIRECTIONS: [Vec3; 4] = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];

#[derive(Debug, Clone)]
pub struct PlayerController {
    config: PlayerConfig,
    bounds: ArenaBounds,
    state: PlayerState,
    move_state: MoveState,
    color: Vec3,
}

impl PlayerController {
    pub fn new(config: PlayerConfig, bounds: ArenaBounds, spawn: Vec3) -> Self {
        Self {
            config,
            bounds,
            state: PlayerState {
                position: spawn,
                is_moving: false,
                is_on_ground: spawn.y - config.ground_level <= config.ground_epsilon,
            },
            move_state: MoveState::Idle,
            color: config.idle_color,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn move_state(&self) -> MoveState {
        self.move_state
    }

    /// Current tint of the avatar's material.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Advances the avatar by one frame against the given scene.
    pub fn update(&mut self, input: &InputSnapshot, scene: &Scene) -> PlayerStep {
        let transition = self.update_move_state(input);

        let target_color = match self.move_state {
            MoveState::Moving => self.config.moving_color,
            MoveState::Idle => self.config.idle_color,
        };
        self.color = self.color.lerp(target_color, self.config.color_smoothing);

        let candidate = self.bounds.clamp(self.state.position + self.displacement(input));
        let blocked = self.is_blocked(candidate, scene);
        if !blocked {
            self.state.position.x = candidate.x;
            self.state.position.z = candidate.z;
        }

        self.apply_gravity();

        PlayerStep {
            transition,
            blocked,
        }
    }

    fn update_move_state(&mut self, input: &InputSnapshot) -> Option<MoveState> {
        let next = if input.any() {
            MoveState::Moving
        } else {
            MoveState::Idle
        };
        self.state.is_moving = next == MoveState::Moving;
        if next == self.move_state {
            return None;
        }
        debug!("player {:?} -> {:?}", self.move_state, next);
        self.move_state = next;
        Some(next)
    }

    fn displacement(&self, input: &InputSnapshot) -> Vec3 {
        let mut delta = Vec3::ZERO;
        if input.forward {
            delta.z -= self.config.speed;
        }
        if input.backward {
            delta.z += self.config.speed;
        }
        if input.left {
            delta.x -= self.config.speed;
        }
        if input.right {
            delta.x += self.config.speed;
        }
        delta
    }

    /// Casts along the four horizontal axes from `candidate`. Any hit closer than
    /// the player's radius rejects the whole move.
    fn is_blocked(&self, candidate: Vec3, scene: &Scene) -> bool {
        COLLISION_DIRECTIONS.iter().any(|direction| {
            let ray = Ray::new(candidate, *direction);
            scene
                .raycast(&ray, |_, object| {
                    !matches!(object.kind, ObjectKind::Player | ObjectKind::Ground)
                })
                .is_some_and(|hit| hit.distance < self.config.radius)
        })
    }

    fn apply_gravity(&mut self) {
        let ground = self.config.ground_level;
        if self.state.position.y > ground + self.config.ground_epsilon {
            self.state.position.y = (self.state.position.y - self.config.gravity_step).max(ground);
            self.state.is_on_ground = false;
        } else {
            self.state.position.y = ground;
            self.state.is_on_ground = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CharacterDocument, ColorValue, PartSpec, Role, Shape};
    use crate::model::ModelLibrary;
    use crate::scene::SceneLayout;

    fn empty_scene() -> Scene {
        Scene::assemble(&[], &ModelLibrary::default(), SceneLayout::default())
    }

    fn controller_at(position: Vec3) -> PlayerController {
        PlayerController::new(PlayerConfig::default(), ArenaBounds::default(), position)
    }

    fn held(keys: &str) -> InputSnapshot {
        InputSnapshot::from_keys(keys)
    }

    #[test]
    fn forward_left_moves_diagonally_and_falls() {
        let scene = empty_scene();
        let mut player = controller_at(Vec3::new(0.0, 1.0, 0.0));
        let step = player.update(&held("wa"), &scene);
        let state = player.state();
        assert!((state.position.x + 0.1).abs() < 1e-6);
        assert!((state.position.z + 0.1).abs() < 1e-6);
        assert!((state.position.y - 0.95).abs() < 1e-6);
        assert!(state.is_moving);
        assert_eq!(step.transition, Some(MoveState::Moving));
        assert!(!step.blocked);
    }

    #[test]
    fn position_stays_within_bounds() {
        let scene = empty_scene();
        let bounds = ArenaBounds::default();
        let mut player = controller_at(Vec3::new(8.95, 0.5, -8.95));
        for _ in 0..20 {
            player.update(&held("wd"), &scene);
            let position = player.state().position;
            assert_eq!(bounds.clamp(position), position);
        }
        assert_eq!(player.state().position.x, bounds.max_x);
    }

    #[test]
    fn height_never_rises_and_settles_on_ground() {
        let scene = empty_scene();
        let mut player = controller_at(Vec3::new(0.0, 3.0, 0.0));
        let mut previous = player.state().position.y;
        for _ in 0..100 {
            player.update(&held(""), &scene);
            let y = player.state().position.y;
            assert!(y <= previous);
            assert!(y >= player.config().ground_level);
            previous = y;
        }
        assert_eq!(previous, player.config().ground_level);
        assert!(player.state().is_on_ground);
    }

    #[test]
    fn obstacle_within_radius_blocks_the_whole_move() {
        let characters = vec![CharacterDocument {
            name: "Crate".into(),
            role: Role::Ally,
            parts: vec![],
            welds: vec![],
        }];
        let scene = Scene::assemble(
            &characters,
            &ModelLibrary::default(),
            SceneLayout::default(),
        );
        // Placeholder cube at (-4, 0.5, -4) spans z in [-4.5, -3.5].
        let start = Vec3::new(-4.0, 0.5, -2.95);
        let mut player = controller_at(start);
        let step = player.update(&held("wd"), &scene);
        assert!(step.blocked);
        assert_eq!(player.state().position.x, start.x);
        assert_eq!(player.state().position.z, start.z);

        let step = player.update(&held("s"), &scene);
        assert!(!step.blocked);
        assert!(player.state().position.z > start.z);
    }

    #[test]
    fn only_the_true_sphere_surface_blocks() {
        let characters = vec![CharacterDocument {
            name: "Bok".into(),
            role: Role::Ally,
            parts: vec![PartSpec {
                name: "body".into(),
                shape: Shape::Sphere,
                size: vec![0.5],
                color: ColorValue::Packed(0x00ff00),
                position: Vec3::ZERO,
            }],
            welds: vec![],
        }];
        let library = ModelLibrary::new(characters.clone());
        let scene = Scene::assemble(&characters, &library, SceneLayout::default());

        // Sphere at (-4, 0.5, -4): the +X collision ray clips its bounding box
        // 0.3 ahead but reaches the surface only about 0.58 ahead.
        let mut player = controller_at(Vec3::new(-4.9, 0.5, -3.55));
        let step = player.update(&held("d"), &scene);
        assert!(!step.blocked);
        assert!((player.state().position.x + 4.8).abs() < 1e-5);

        let mut player = controller_at(Vec3::new(-4.9, 0.5, -4.0));
        let step = player.update(&held("d"), &scene);
        assert!(step.blocked);
        assert_eq!(player.state().position.x, -4.9);
    }

    #[test]
    fn color_approaches_target_per_state() {
        let scene = empty_scene();
        let mut player = controller_at(Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(player.color(), Vec3::splat(0.5));
        player.update(&held("s"), &scene);
        assert!((player.color().x - 0.55).abs() < 1e-6);
        for _ in 0..200 {
            player.update(&held("s"), &scene);
        }
        assert!(player.color().abs_diff_eq(Vec3::ONE, 1e-3));

        let step = player.update(&held(""), &scene);
        assert_eq!(step.transition, Some(MoveState::Idle));
        assert!(!player.state().is_moving);
        assert!(player.color().x < 1.0);
    }
}
