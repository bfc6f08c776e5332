//! Seams between the scene core and whatever draws it.
//!
//! The core only ever talks to a [`GraphicsBackend`]: a named-uniform sink, a
//! mesh library and a texture device. [`RecordingBackend`] logs the traffic
//! for headless runs and tests; [`Renderer`] turns it into wgpu work.

pub mod meshes;
pub mod native;
pub mod recording;
pub mod shared;
pub mod uniforms;

pub use native::Renderer;
pub use recording::{Command, RecordingBackend};

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Number of texture units a backend exposes; also the texture registry size.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// Point light slots in the uniform block and the shader loop.
pub const MAX_POINT_LIGHTS: usize = 5;

/// Largest 2D texture edge guaranteed by wgpu's default limits.
pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 8192;

/// Names of every uniform the core writes.
pub mod names {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const VIEW_POSITION: &str = "viewPosition";
    pub const OBJECT_COLOR: &str = "objectColor";
    pub const OBJECT_TEXTURE: &str = "objectTexture";
    pub const USE_TEXTURE: &str = "bUseTexture";
    pub const USE_LIGHTING: &str = "bUseLighting";
    pub const UV_SCALE: &str = "UVscale";
    pub const MATERIAL_DIFFUSE: &str = "material.diffuseColor";
    pub const MATERIAL_SPECULAR: &str = "material.specularColor";
    pub const MATERIAL_SHININESS: &str = "material.shininess";
    pub const DIRECTIONAL_LIGHT: &str = "directionalLight";
    pub const POINT_LIGHTS: &str = "pointLights";
    pub const SPOT_LIGHT: &str = "spotLight";

    /// `pointLights[index].field`
    pub fn point_light(index: usize, field: &str) -> String {
        format!("{POINT_LIGHTS}[{index}].{field}")
    }

    /// `directionalLight.field`
    pub fn directional_light(field: &str) -> String {
        format!("{DIRECTIONAL_LIGHT}.{field}")
    }

    /// `spotLight.field`
    pub fn spot_light(field: &str) -> String {
        format!("{SPOT_LIGHT}.{field}")
    }
}

/// Value pushed into a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    /// Texture unit index; `-1` means "no texture resolved".
    Sampler(i32),
}

/// Receiver of named uniform values (the shader manager).
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_sampler(&mut self, name: &str, unit: i32) {
        self.set_uniform(name, UniformValue::Sampler(unit));
    }
}

/// Primitive shapes the mesh library knows how to build and draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeshKind {
    Plane,
    Box,
    Cylinder,
    Sphere,
    Torus,
}

impl MeshKind {
    pub const ALL: [MeshKind; 5] = [
        MeshKind::Plane,
        MeshKind::Box,
        MeshKind::Cylinder,
        MeshKind::Torus,
        MeshKind::Sphere,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MeshKind::Plane => "plane",
            MeshKind::Box => "box",
            MeshKind::Cylinder => "cylinder",
            MeshKind::Sphere => "sphere",
            MeshKind::Torus => "torus",
        }
    }
}

/// Loads each primitive once and draws it with whatever uniforms are current.
pub trait MeshLibrary {
    fn load_mesh(&mut self, kind: MeshKind);
    fn draw_mesh(&mut self, kind: MeshKind);
}

/// Opaque GPU texture identifier handed out by a [`TextureDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Pixel layout of an uploaded texture, inferred from the channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Sampling state requested for a texture at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    pub wrap: WrapMode,
    pub filter: FilterMode,
    pub mipmaps: bool,
}

impl SamplerSettings {
    pub const REPEAT_LINEAR_MIPMAPPED: Self = Self {
        wrap: WrapMode::Repeat,
        filter: FilterMode::Linear,
        mipmaps: true,
    };
}

/// Pixel data and sampling state for one texture upload.
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub pixels: &'a [u8],
    pub sampler: SamplerSettings,
}

impl TextureUpload<'_> {
    /// Rejects empty images, edges above `max_dimension` and pixel buffers
    /// that do not match the declared size.
    pub fn validate(&self, max_dimension: u32) -> Result<(), SceneError> {
        let rejected = |reason: String| {
            Err(SceneError::Upload {
                tag: self.label.to_string(),
                reason,
            })
        };
        if self.width == 0 || self.height == 0 {
            return rejected(format!("{}x{} image is empty", self.width, self.height));
        }
        if self.width > max_dimension || self.height > max_dimension {
            return rejected(format!(
                "{}x{} exceeds the {max_dimension} texel limit",
                self.width, self.height
            ));
        }
        let expected =
            self.width as usize * self.height as usize * self.format.channels() as usize;
        if self.pixels.len() != expected {
            return rejected(format!(
                "{}x{} {:?} needs {expected} bytes, got {}",
                self.width,
                self.height,
                self.format,
                self.pixels.len()
            ));
        }
        Ok(())
    }
}

/// GPU texture object management.
pub trait TextureDevice {
    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<TextureHandle, SceneError>;
    fn bind_texture(&mut self, unit: u32, handle: TextureHandle);
    fn destroy_texture(&mut self, handle: TextureHandle);
}

/// Everything the scene needs from a renderer.
pub trait GraphicsBackend: UniformSink + MeshLibrary + TextureDevice {}

impl<T: UniformSink + MeshLibrary + TextureDevice + ?Sized> GraphicsBackend for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_channel_count() {
        assert_eq!(TextureFormat::from_channels(3), Some(TextureFormat::Rgb8));
        assert_eq!(TextureFormat::from_channels(4), Some(TextureFormat::Rgba8));
        assert_eq!(TextureFormat::from_channels(1), None);
        assert_eq!(TextureFormat::from_channels(2), None);
    }

    #[test]
    fn uploads_are_checked_against_size_limits() {
        let upload = |width, height, pixels: &'static [u8]| TextureUpload {
            label: "wood",
            width,
            height,
            format: TextureFormat::Rgb8,
            pixels,
            sampler: SamplerSettings::REPEAT_LINEAR_MIPMAPPED,
        };
        assert!(upload(2, 1, &[0; 6]).validate(8).is_ok());
        assert!(upload(0, 1, &[]).validate(8).is_err());
        assert!(upload(16, 1, &[0; 48]).validate(8).is_err());
        assert!(upload(2, 1, &[0; 5]).validate(8).is_err());
    }

    #[test]
    fn indexed_uniform_names() {
        assert_eq!(names::point_light(3, "bActive"), "pointLights[3].bActive");
        assert_eq!(names::spot_light("cutOff"), "spotLight.cutOff");
        assert_eq!(
            names::directional_light("direction"),
            "directionalLight.direction"
        );
    }
}
