use std::sync::Arc;

use glam::{Vec2, Vec3};
use log::info;

use crate::camera::{Camera, CameraRig};
use crate::document::DimensionDocument;
use crate::gamedata::GameData;
use crate::input::InputSnapshot;
use crate::interaction::{pick, PickHit};
use crate::model::{Geometry, ModelLibrary, Primitive};
use crate::player::{PlayerConfig, PlayerController, PlayerState};
use crate::render::RenderCommand;
use crate::scene::{ObjectKind, Scene, SceneLayout, SceneObject};
use crate::viewport::ViewportProvider;

pub const PLAYER_TAG: &str = "player";
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// One running game: the assembled scene, the avatar and its camera.
pub struct GameSession {
    scene: Scene,
    dimensions: Vec<DimensionDocument>,
    player: PlayerController,
    player_index: usize,
    rig: CameraRig,
    camera: Camera,
    viewport: Arc<dyn ViewportProvider>,
    frame: u64,
    elapsed: f32,
}

impl GameSession {
    pub fn new(data: GameData, viewport: Arc<dyn ViewportProvider>) -> Self {
        Self::with_config(
            data,
            viewport,
            SceneLayout::default(),
            PlayerConfig::default(),
        )
    }

    pub fn with_config(
        data: GameData,
        viewport: Arc<dyn ViewportProvider>,
        layout: SceneLayout,
        config: PlayerConfig,
    ) -> Self {
        let GameData {
            characters,
            dimensions,
        } = data;
        for dimension in &dimensions {
            info!(
                "dimension {} (difficulty {})",
                dimension.name, dimension.difficulty_level
            );
        }

        let library = ModelLibrary::new(characters.iter().cloned());
        let mut scene = Scene::assemble(&characters, &library, layout);
        let player = PlayerController::new(config, layout.bounds, PLAYER_SPAWN);
        let player_index = scene.add(SceneObject::primitive(
            PLAYER_TAG,
            ObjectKind::Player,
            PLAYER_SPAWN,
            Primitive {
                geometry: Geometry::Sphere {
                    radius: config.radius,
                },
                color: player.color(),
            },
        ));

        let mut rig = CameraRig::default();
        let camera = rig.follow(PLAYER_SPAWN);

        Self {
            scene,
            dimensions,
            player,
            player_index,
            rig,
            camera,
            viewport,
            frame: 0,
            elapsed: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn dimensions(&self) -> &[DimensionDocument] {
        &self.dimensions
    }

    pub fn player(&self) -> &PlayerState {
        self.player.state()
    }

    pub fn player_color(&self) -> Vec3 {
        self.player.color()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds of host time fed through [`GameSession::update`].
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Runs one frame and describes what to draw. Movement is per frame, so
    /// `dt` only feeds the elapsed-time counter.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) -> RenderCommand {
        self.frame += 1;
        self.elapsed += dt.max(0.0);

        self.player.update(input, &self.scene);
        let state = *self.player.state();
        self.scene.set_position(self.player_index, state.position);
        self.scene.set_color(self.player_index, self.player.color());
        self.camera = self.rig.follow(state.position);

        RenderCommand::build(self.frame, &self.scene, &self.camera, self.viewport.aspect())
    }

    /// Resolves a click at a canvas pixel to the object under it.
    pub fn click(&self, pixel: Vec2) -> Option<PickHit> {
        pick(&self.scene, &self.camera, &*self.viewport, pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::StaticViewport;

    const PAYLOAD: &str = r##"{
        "characters": [
            {"name": "Bok", "role": "ally", "parts": [
                {"name": "body", "shape": "sphere", "size": [0.5, 0, 0], "color": "#00ff00", "position": [0, 0, 0]},
                {"name": "hat", "shape": "cylinder", "size": [0.2, 0.3], "color": 255, "position": [0, 0.6, 0]}
            ], "welds": [{"part0": "body", "part1": "hat"}]},
            {"name": "Grub", "role": "enemy"}
        ],
        "dimensions": [{"name": "Ember Wastes", "difficulty_level": 3}]
    }"##;

    fn session() -> GameSession {
        let data = GameData::from_json(PAYLOAD).unwrap();
        GameSession::new(data, Arc::new(StaticViewport::new(800, 600)))
    }

    #[test]
    fn session_places_player_and_roster() {
        let session = session();
        assert!(session.scene().find("Bok").is_some());
        assert!(session.scene().find("Grub").is_some());
        let player = session.scene().find(PLAYER_TAG).unwrap();
        assert_eq!(player.position, PLAYER_SPAWN);
        assert_eq!(session.dimensions().len(), 1);
    }

    #[test]
    fn update_moves_player_and_camera() {
        let mut session = session();
        let command = session.update(1.0 / 60.0, &InputSnapshot::from_keys("d"));
        let position = session.player().position;
        assert!((position.x - 0.1).abs() < 1e-6);
        assert_eq!(session.scene().find(PLAYER_TAG).unwrap().position, position);
        assert_eq!(session.camera().position, position + Vec3::new(0.0, 5.0, 10.0));
        assert_eq!(command.frame, 1);
        assert_eq!(command.camera.target, position);
        // ground + Bok (2 parts) + Grub + 4 markers + player
        assert_eq!(command.draws.len(), 9);
        assert!(command.draws.iter().any(|draw| draw.tag == PLAYER_TAG));
    }

    #[test]
    fn player_tint_follows_state() {
        let mut session = session();
        session.update(0.016, &InputSnapshot::from_keys("w"));
        let tint = session.player_color();
        assert!(tint.x > 0.5);
        let player = session.scene().find(PLAYER_TAG).unwrap();
        match &player.visual {
            crate::scene::Visual::Primitive(primitive) => assert_eq!(primitive.color, tint),
            other => panic!("unexpected player visual {other:?}"),
        }
    }

    #[test]
    fn click_at_screen_center_hits_player() {
        let mut session = session();
        session.update(0.016, &InputSnapshot::default());
        let hit = session.click(Vec2::new(400.0, 300.0)).unwrap();
        assert_eq!(hit.name, PLAYER_TAG);
    }

    #[test]
    fn elapsed_time_accumulates() {
        let mut session = session();
        for _ in 0..4 {
            session.update(0.25, &InputSnapshot::default());
        }
        assert_eq!(session.frame(), 4);
        assert!((session.elapsed() - 1.0).abs() < 1e-6);
    }
}
