//! Core of the arena exploration game.
//!
//! The server side loads the JSON data directory, validates it against its
//! schemas and serves the aggregated payload. The client side turns that
//! payload into character rigs and an arena scene, then advances the player
//! one frame at a time and emits render commands for whatever host draws
//! them. Rendering itself stays outside the crate so everything here runs
//! headless and is easy to test.

pub mod camera;
pub mod document;
pub mod game;
pub mod gamedata;
pub mod input;
pub mod interaction;
pub mod model;
pub mod player;
pub mod raycast;
pub mod render;
pub mod scene;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
#[cfg(not(target_arch = "wasm32"))]
pub mod store;
#[cfg(not(target_arch = "wasm32"))]
pub mod validate;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use camera::{Camera, CameraRig};
pub use document::{CharacterDocument, ColorValue, DimensionDocument, PartSpec, Role, Shape, WeldSpec};
pub use game::GameSession;
pub use gamedata::GameData;
pub use input::{InputSnapshot, InputState, KeyCode};
pub use interaction::{pick, PickHit};
pub use model::{build_model, CharacterModel, Geometry, ModelError, ModelLibrary, Primitive};
pub use player::{MoveState, PlayerConfig, PlayerController, PlayerState};
pub use render::{CameraParams, DrawCommand, LightParams, RenderCommand};
pub use scene::{ArenaBounds, Formation, Light, ObjectKind, Scene, SceneLayout, SceneObject};
#[cfg(not(target_arch = "wasm32"))]
pub use server::GameDataService;
#[cfg(not(target_arch = "wasm32"))]
pub use store::{DataStore, DocumentKind};
#[cfg(not(target_arch = "wasm32"))]
pub use validate::{validate_store, ValidationReport};
pub use viewport::{SharedViewport, StaticViewport, ViewportProvider};
