use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::render::{names, UniformSink, MAX_POINT_LIGHTS};

/// Linear RGB contributions of one light, each channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightColor {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightColor {
    /// Full-strength diffuse and specular over the given ambient level.
    pub fn white(ambient: f32) -> Self {
        Self {
            ambient: Vec3::splat(ambient),
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Directional {
        direction: Vec3,
        color: LightColor,
    },
    Point {
        position: Vec3,
        color: LightColor,
    },
    /// Cutoffs are half-angles in degrees; the shader receives their cosines.
    Spot {
        position: Vec3,
        direction: Vec3,
        inner_cutoff_degrees: f32,
        outer_cutoff_degrees: f32,
        color: LightColor,
    },
}

/// The bounded light set: one directional, up to five points, one spot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightRig {
    directional: Option<Light>,
    points: Vec<Light>,
    spot: Option<Light>,
}

impl LightRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `light` to its slot group. A second directional or spot light
    /// replaces the first; a sixth point light is refused.
    pub fn add(&mut self, light: Light) -> Result<(), SceneError> {
        match light {
            Light::Directional { .. } => self.directional = Some(light),
            Light::Spot { .. } => self.spot = Some(light),
            Light::Point { .. } => {
                if self.points.len() >= MAX_POINT_LIGHTS {
                    return Err(SceneError::RegistryFull {
                        registry: "point light",
                        capacity: MAX_POINT_LIGHTS,
                    });
                }
                self.points.push(light);
            }
        }
        Ok(())
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// The desk lighting: overhead sun, two room lights and a desk spot.
    pub fn desk_default() -> Self {
        Self {
            directional: Some(Light::Directional {
                direction: Vec3::new(-0.2, -1.0, -0.3),
                color: LightColor::white(0.5),
            }),
            points: vec![
                Light::Point {
                    position: Vec3::new(0.0, 5.0, 0.0),
                    color: LightColor::white(0.3),
                },
                Light::Point {
                    position: Vec3::new(5.0, 3.0, 5.0),
                    color: LightColor::white(0.3),
                },
            ],
            spot: Some(Light::Spot {
                position: Vec3::new(0.0, 4.0, 5.0),
                direction: Vec3::new(0.0, -1.0, -1.0),
                inner_cutoff_degrees: 20.0,
                outer_cutoff_degrees: 25.0,
                color: LightColor::white(0.2),
            }),
        }
    }

    /// Pushes every light and explicitly switches off each unused slot.
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        sink.set_bool(names::USE_LIGHTING, true);

        match self.directional {
            Some(Light::Directional { direction, color }) => {
                sink.set_vec3(&names::directional_light("direction"), direction);
                push_color(sink, &names::directional_light, color);
                sink.set_bool(&names::directional_light("bActive"), true);
            }
            _ => sink.set_bool(&names::directional_light("bActive"), false),
        }

        for index in 0..MAX_POINT_LIGHTS {
            let field = |name: &str| names::point_light(index, name);
            match self.points.get(index) {
                Some(Light::Point { position, color }) => {
                    sink.set_vec3(&field("position"), *position);
                    push_color(sink, &field, *color);
                    sink.set_bool(&field("bActive"), true);
                }
                _ => {
                    sink.set_bool(&field("bActive"), false);
                    debug!("point light {index} disabled");
                }
            }
        }

        match self.spot {
            Some(Light::Spot {
                position,
                direction,
                inner_cutoff_degrees,
                outer_cutoff_degrees,
                color,
            }) => {
                sink.set_vec3(&names::spot_light("position"), position);
                sink.set_vec3(&names::spot_light("direction"), direction);
                sink.set_float(
                    &names::spot_light("cutOff"),
                    inner_cutoff_degrees.to_radians().cos(),
                );
                sink.set_float(
                    &names::spot_light("outerCutOff"),
                    outer_cutoff_degrees.to_radians().cos(),
                );
                push_color(sink, &names::spot_light, color);
                sink.set_bool(&names::spot_light("bActive"), true);
            }
            _ => sink.set_bool(&names::spot_light("bActive"), false),
        }
    }
}

fn push_color<S, F>(sink: &mut S, field: &F, color: LightColor)
where
    S: UniformSink + ?Sized,
    F: Fn(&str) -> String,
{
    sink.set_vec3(&field("ambient"), color.ambient);
    sink.set_vec3(&field("diffuse"), color.diffuse);
    sink.set_vec3(&field("specular"), color.specular);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingBackend, UniformValue};

    #[test]
    fn desk_rig_activates_two_points_and_disables_the_rest() {
        let mut sink = RecordingBackend::new();
        LightRig::desk_default().apply(&mut sink);

        for (index, active) in [true, true, false, false, false].into_iter().enumerate() {
            assert_eq!(
                sink.uniform(&names::point_light(index, "bActive")),
                Some(UniformValue::Bool(active)),
                "point light {index}"
            );
        }
        assert_eq!(
            sink.uniform(&names::point_light(1, "position")),
            Some(UniformValue::Vec3(Vec3::new(5.0, 3.0, 5.0)))
        );
        assert_eq!(
            sink.uniform(names::USE_LIGHTING),
            Some(UniformValue::Bool(true))
        );
    }

    #[test]
    fn spot_cutoffs_are_sent_as_cosines() {
        let mut sink = RecordingBackend::new();
        LightRig::desk_default().apply(&mut sink);
        let Some(UniformValue::Float(inner)) = sink.uniform(&names::spot_light("cutOff")) else {
            panic!("cutOff missing");
        };
        let Some(UniformValue::Float(outer)) = sink.uniform(&names::spot_light("outerCutOff"))
        else {
            panic!("outerCutOff missing");
        };
        assert!((inner - 20f32.to_radians().cos()).abs() < 1e-6);
        assert!((outer - 25f32.to_radians().cos()).abs() < 1e-6);
        assert!(inner > outer);
    }

    #[test]
    fn empty_rig_still_deactivates_every_slot() {
        let mut sink = RecordingBackend::new();
        LightRig::new().apply(&mut sink);
        assert_eq!(
            sink.uniform(&names::directional_light("bActive")),
            Some(UniformValue::Bool(false))
        );
        assert_eq!(
            sink.uniform(&names::spot_light("bActive")),
            Some(UniformValue::Bool(false))
        );
        for index in 0..MAX_POINT_LIGHTS {
            assert_eq!(
                sink.uniform(&names::point_light(index, "bActive")),
                Some(UniformValue::Bool(false))
            );
        }
    }

    #[test]
    fn point_lights_are_bounded() {
        let mut rig = LightRig::desk_default();
        let extra = Light::Point {
            position: Vec3::ZERO,
            color: LightColor::white(0.1),
        };
        for _ in 0..3 {
            rig.add(extra).unwrap();
        }
        assert_eq!(rig.point_count(), MAX_POINT_LIGHTS);
        assert!(matches!(
            rig.add(extra),
            Err(SceneError::RegistryFull { capacity: 5, .. })
        ));
    }
}
