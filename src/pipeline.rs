use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{LookupKind, SceneError};
use crate::materials::MaterialRegistry;
use crate::render::{names, UniformSink};
use crate::textures::TextureRegistry;

/// Placement of one object for a single draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: Vec3,
    /// Euler angles in degrees, applied X first, then Y, then Z.
    pub rotation_degrees: Vec3,
    pub position: Vec3,
    pub offset: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
            position: Vec3::ZERO,
            offset: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn new(scale: Vec3, rotation_degrees: Vec3, position: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            position,
            offset: Vec3::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// `T(position + offset) · Rz · Ry · Rx · S(scale)`
    pub fn model_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position + self.offset);
        let rotation = Mat4::from_rotation_z(self.rotation_degrees.z.to_radians())
            * Mat4::from_rotation_y(self.rotation_degrees.y.to_radians())
            * Mat4::from_rotation_x(self.rotation_degrees.x.to_radians());
        translation * rotation * Mat4::from_scale(self.scale)
    }
}

/// Counts failed texture and material lookups per tag.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LookupDiagnostics {
    misses: BTreeMap<(LookupKind, String), usize>,
}

impl LookupDiagnostics {
    /// Records a miss; returns `true` the first time a tag misses.
    pub fn record(&mut self, kind: LookupKind, tag: &str) -> bool {
        let count = self.misses.entry((kind, tag.to_string())).or_insert(0);
        *count += 1;
        *count == 1
    }

    pub fn count(&self, kind: LookupKind, tag: &str) -> usize {
        self.misses
            .get(&(kind, tag.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.misses.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.misses.is_empty()
    }

    /// `(kind, tag, count)` for every tag that missed, sorted by kind then tag.
    pub fn entries(&self) -> impl Iterator<Item = (LookupKind, &str, usize)> + '_ {
        self.misses
            .iter()
            .map(|((kind, tag), count)| (*kind, tag.as_str(), *count))
    }
}

/// Pushes per-object shader state ahead of each draw.
///
/// Holds the texture and material registries it resolves tags against, plus
/// the UV scale currently loaded in the shader so scoped overrides can put it
/// back.
#[derive(Debug)]
pub struct ShaderPipeline {
    textures: TextureRegistry,
    materials: MaterialRegistry,
    uv_scale: Vec2,
    diagnostics: LookupDiagnostics,
}

impl ShaderPipeline {
    pub fn new(textures: TextureRegistry, materials: MaterialRegistry) -> Self {
        Self {
            textures,
            materials,
            uv_scale: Vec2::ONE,
            diagnostics: LookupDiagnostics::default(),
        }
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialRegistry {
        &mut self.materials
    }

    pub fn diagnostics(&self) -> &LookupDiagnostics {
        &self.diagnostics
    }

    pub fn uv_scale(&self) -> Vec2 {
        self.uv_scale
    }

    pub fn set_transform<S: UniformSink + ?Sized>(&self, sink: &mut S, transform: &Transform) {
        sink.set_mat4(names::MODEL, transform.model_matrix());
    }

    /// Switches the next draw to flat `color`.
    pub fn set_solid_color<S: UniformSink + ?Sized>(&self, sink: &mut S, color: Vec4) {
        sink.set_bool(names::USE_TEXTURE, false);
        sink.set_vec4(names::OBJECT_COLOR, color);
    }

    /// Enables texturing and points the sampler at `tag`'s slot.
    ///
    /// An unknown tag still enables texturing but loads sampler `-1`, records
    /// the miss and returns `LookupMiss`.
    pub fn set_texture<S: UniformSink + ?Sized>(
        &mut self,
        sink: &mut S,
        tag: &str,
    ) -> Result<(), SceneError> {
        sink.set_bool(names::USE_TEXTURE, true);
        match self.textures.find_slot_index(tag) {
            Some(slot) => {
                sink.set_sampler(names::OBJECT_TEXTURE, slot as i32);
                Ok(())
            }
            None => {
                sink.set_sampler(names::OBJECT_TEXTURE, -1);
                if self.diagnostics.record(LookupKind::Texture, tag) {
                    warn!("texture `{tag}` is not registered; sampler left unbound");
                }
                Err(SceneError::texture_miss(tag))
            }
        }
    }

    pub fn set_uv_scale<S: UniformSink + ?Sized>(&mut self, sink: &mut S, scale: Vec2) {
        self.uv_scale = scale;
        sink.set_vec2(names::UV_SCALE, scale);
    }

    /// Loads `tag`'s reflectance. Does nothing when no materials exist; an
    /// unknown tag pushes nothing and returns `LookupMiss`.
    pub fn set_material<S: UniformSink + ?Sized>(
        &mut self,
        sink: &mut S,
        tag: &str,
    ) -> Result<(), SceneError> {
        if self.materials.is_empty() {
            return Ok(());
        }
        match self.materials.find(tag) {
            Some(material) => {
                sink.set_vec3(names::MATERIAL_DIFFUSE, material.diffuse_color);
                sink.set_vec3(names::MATERIAL_SPECULAR, material.specular_color);
                sink.set_float(names::MATERIAL_SHININESS, material.shininess);
                Ok(())
            }
            None => {
                if self.diagnostics.record(LookupKind::Material, tag) {
                    warn!("material `{tag}` is not defined; keeping previous material");
                }
                Err(SceneError::material_miss(tag))
            }
        }
    }

    /// Runs `body` with the UV scale set to `scale`, then restores the
    /// previous scale.
    pub fn with_uv_scale<S, R>(
        &mut self,
        sink: &mut S,
        scale: Vec2,
        body: impl FnOnce(&mut Self, &mut S) -> R,
    ) -> R
    where
        S: UniformSink + ?Sized,
    {
        let previous = self.uv_scale;
        self.set_uv_scale(sink, scale);
        let result = body(self, sink);
        self.set_uv_scale(sink, previous);
        result
    }

    /// Runs `body` drawing flat `color`, then turns texturing back on.
    pub fn with_solid_color<S, R>(
        &mut self,
        sink: &mut S,
        color: Vec4,
        body: impl FnOnce(&mut Self, &mut S) -> R,
    ) -> R
    where
        S: UniformSink + ?Sized,
    {
        self.set_solid_color(sink, color);
        let result = body(self, sink);
        sink.set_bool(names::USE_TEXTURE, true);
        result
    }
}
