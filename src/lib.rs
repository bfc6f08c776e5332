//! Real-time renderer for a hand-composed desk scene.
//!
//! Scene description, shader state and camera navigation are plain data
//! driven through the [`render::GraphicsBackend`] seam, so everything except
//! the wgpu [`Renderer`] runs and tests headless against a
//! [`RecordingBackend`].

pub mod app;
pub mod camera;
pub mod composer;
pub mod config;
pub mod decoder;
pub mod error;
pub mod input;
pub mod lighting;
pub mod materials;
pub mod navigation;
pub mod pipeline;
pub mod render;
pub mod scene;
pub mod textures;

pub use app::{DeskSession, FrameClock, FrameSummary};
pub use camera::{Camera, Movement};
pub use composer::{DrawRecipe, FrameStats, RenderGroup, SceneComposer, Surface};
pub use config::RuntimeConfig;
pub use decoder::{DecodedImage, FileDecoder, ImageDecoder};
pub use error::{LookupKind, SceneError};
pub use input::{InputState, KeyCode, KeyboardState, NamedKey};
pub use lighting::{Light, LightColor, LightRig};
pub use materials::{Material, MaterialRegistry};
pub use navigation::{Navigation, PresetView, ProjectionMode, ViewState};
pub use pipeline::{ShaderPipeline, Transform};
pub use render::{GraphicsBackend, MeshKind, RecordingBackend, Renderer};
pub use scene::{DeskScene, PrepareReport, TEXTURE_ASSETS};
pub use textures::TextureRegistry;
