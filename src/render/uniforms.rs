use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use log::debug;

use super::names;
use super::shared::{
    GlobalUniform, GpuDirectionalLight, GpuPointLight, GpuSpotLight, ObjectConstants,
};
use super::{UniformValue, MAX_POINT_LIGHTS};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct LightSlot {
    active: bool,
    position: Vec3,
    direction: Vec3,
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    cut_off: f32,
    outer_cut_off: f32,
}

impl LightSlot {
    fn apply(&mut self, field: &str, value: UniformValue) -> bool {
        match (field, value) {
            ("bActive", UniformValue::Bool(v)) => self.active = v,
            ("position", UniformValue::Vec3(v)) => self.position = v,
            ("direction", UniformValue::Vec3(v)) => self.direction = v,
            ("ambient", UniformValue::Vec3(v)) => self.ambient = v,
            ("diffuse", UniformValue::Vec3(v)) => self.diffuse = v,
            ("specular", UniformValue::Vec3(v)) => self.specular = v,
            ("cutOff", UniformValue::Float(v)) => self.cut_off = v,
            ("outerCutOff", UniformValue::Float(v)) => self.outer_cut_off = v,
            _ => return false,
        }
        true
    }

    fn flag(&self) -> f32 {
        if self.active {
            1.0
        } else {
            0.0
        }
    }
}

/// Current value of every named uniform the shader understands.
///
/// The native renderer feeds each `set_uniform` call through here and
/// snapshots [`UniformBlock::object_constants`] on every draw.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    view: Mat4,
    projection: Mat4,
    view_position: Vec3,
    use_lighting: bool,
    directional: LightSlot,
    point_lights: [LightSlot; MAX_POINT_LIGHTS],
    spot: LightSlot,
    model: Mat4,
    object_color: Vec4,
    use_texture: bool,
    texture_unit: i32,
    uv_scale: Vec2,
    diffuse: Vec3,
    specular: Vec3,
    shininess: f32,
}

impl Default for UniformBlock {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_position: Vec3::ZERO,
            use_lighting: false,
            directional: LightSlot::default(),
            point_lights: [LightSlot::default(); MAX_POINT_LIGHTS],
            spot: LightSlot::default(),
            model: Mat4::IDENTITY,
            object_color: Vec4::ONE,
            use_texture: false,
            texture_unit: -1,
            uv_scale: Vec2::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            shininess: 32.0,
        }
    }
}

impl UniformBlock {
    /// Stores `value` under `name`. Returns `false` for names or value types
    /// the shader has no slot for.
    pub fn apply(&mut self, name: &str, value: UniformValue) -> bool {
        let known = match (name, value) {
            (names::MODEL, UniformValue::Mat4(m)) => {
                self.model = m;
                true
            }
            (names::VIEW, UniformValue::Mat4(m)) => {
                self.view = m;
                true
            }
            (names::PROJECTION, UniformValue::Mat4(m)) => {
                self.projection = m;
                true
            }
            (names::VIEW_POSITION, UniformValue::Vec3(v)) => {
                self.view_position = v;
                true
            }
            (names::OBJECT_COLOR, UniformValue::Vec4(v)) => {
                self.object_color = v;
                true
            }
            (names::OBJECT_TEXTURE, UniformValue::Sampler(unit)) => {
                self.texture_unit = unit;
                true
            }
            (names::USE_TEXTURE, UniformValue::Bool(v)) => {
                self.use_texture = v;
                true
            }
            (names::USE_LIGHTING, UniformValue::Bool(v)) => {
                self.use_lighting = v;
                true
            }
            (names::UV_SCALE, UniformValue::Vec2(v)) => {
                self.uv_scale = v;
                true
            }
            (names::MATERIAL_DIFFUSE, UniformValue::Vec3(v)) => {
                self.diffuse = v;
                true
            }
            (names::MATERIAL_SPECULAR, UniformValue::Vec3(v)) => {
                self.specular = v;
                true
            }
            (names::MATERIAL_SHININESS, UniformValue::Float(v)) => {
                self.shininess = v;
                true
            }
            _ => self.apply_light(name, value),
        };
        if !known {
            debug!("ignoring uniform {name} = {value:?}");
        }
        known
    }

    fn apply_light(&mut self, name: &str, value: UniformValue) -> bool {
        let Some((target, field)) = name.split_once('.') else {
            return false;
        };
        if target == names::DIRECTIONAL_LIGHT {
            return self.directional.apply(field, value);
        }
        if target == names::SPOT_LIGHT {
            return self.spot.apply(field, value);
        }
        let index = target
            .strip_prefix(names::POINT_LIGHTS)
            .and_then(|rest| rest.strip_prefix('['))
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|index| index.parse::<usize>().ok());
        match index.and_then(|i| self.point_lights.get_mut(i)) {
            Some(slot) => slot.apply(field, value),
            None => false,
        }
    }

    /// Texture unit the next draw samples, if texturing is on and resolved.
    pub fn texture_unit(&self) -> Option<u32> {
        (self.use_texture && self.texture_unit >= 0).then_some(self.texture_unit as u32)
    }

    pub(crate) fn globals(&self) -> GlobalUniform {
        let sun = &self.directional;
        GlobalUniform {
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            view_position: self
                .view_position
                .extend(if self.use_lighting { 1.0 } else { 0.0 })
                .into(),
            directional: GpuDirectionalLight {
                direction: sun.direction.extend(sun.flag()).into(),
                ambient: sun.ambient.extend(0.0).into(),
                diffuse: sun.diffuse.extend(0.0).into(),
                specular: sun.specular.extend(0.0).into(),
            },
            point_lights: self.point_lights.map(|slot| GpuPointLight {
                position: slot.position.extend(slot.flag()).into(),
                ambient: slot.ambient.extend(0.0).into(),
                diffuse: slot.diffuse.extend(0.0).into(),
                specular: slot.specular.extend(0.0).into(),
            }),
            spot: GpuSpotLight {
                position: self.spot.position.extend(self.spot.flag()).into(),
                direction: self.spot.direction.extend(self.spot.cut_off).into(),
                ambient: self.spot.ambient.extend(self.spot.outer_cut_off).into(),
                diffuse: self.spot.diffuse.extend(0.0).into(),
                specular: self.spot.specular.extend(0.0).into(),
            },
        }
    }

    pub(crate) fn object_constants(&self) -> ObjectConstants {
        let normal = Mat4::from_mat3(Mat3::from_mat4(self.model).inverse().transpose());
        ObjectConstants {
            model: self.model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color: self.object_color.into(),
            material_diffuse: self.diffuse.extend(self.shininess).into(),
            material_specular: self.specular.extend(0.0).into(),
            surface: [
                self.uv_scale.x,
                self.uv_scale.y,
                if self.use_texture { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_indexed_light_fields() {
        let mut block = UniformBlock::default();
        assert!(block.apply(
            &names::point_light(1, "position"),
            UniformValue::Vec3(Vec3::new(5.0, 3.0, 5.0))
        ));
        assert!(block.apply(&names::point_light(1, "bActive"), UniformValue::Bool(true)));
        assert!(block.apply(&names::spot_light("cutOff"), UniformValue::Float(0.9)));

        let globals = block.globals();
        assert_eq!(globals.point_lights[1].position, [5.0, 3.0, 5.0, 1.0]);
        assert_eq!(globals.point_lights[0].position[3], 0.0);
        assert_eq!(globals.spot.direction[3], 0.9);
    }

    #[test]
    fn rejects_unknown_names_and_out_of_range_slots() {
        let mut block = UniformBlock::default();
        assert!(!block.apply("fogColor", UniformValue::Vec3(Vec3::ONE)));
        assert!(!block.apply(&names::point_light(5, "bActive"), UniformValue::Bool(true)));
        assert!(!block.apply(names::MODEL, UniformValue::Float(1.0)));
        assert_eq!(block, UniformBlock::default());
    }

    #[test]
    fn texture_unit_requires_flag_and_resolved_sampler() {
        let mut block = UniformBlock::default();
        block.apply(names::OBJECT_TEXTURE, UniformValue::Sampler(3));
        assert_eq!(block.texture_unit(), None);
        block.apply(names::USE_TEXTURE, UniformValue::Bool(true));
        assert_eq!(block.texture_unit(), Some(3));
        block.apply(names::OBJECT_TEXTURE, UniformValue::Sampler(-1));
        assert_eq!(block.texture_unit(), None);
        assert_eq!(block.object_constants().surface[2], 1.0);
    }
}
