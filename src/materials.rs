use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Surface reflectance pushed to the shader's `material.*` uniforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub tag: String,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

/// Append-only list of materials looked up by exact tag.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub const CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a material. Duplicate tags are accepted; the first one wins
    /// every lookup.
    pub fn define(
        &mut self,
        tag: &str,
        diffuse_color: Vec3,
        specular_color: Vec3,
        shininess: f32,
    ) -> Result<(), SceneError> {
        if self.materials.len() >= Self::CAPACITY {
            return Err(SceneError::RegistryFull {
                registry: "material",
                capacity: Self::CAPACITY,
            });
        }
        self.materials.push(Material {
            tag: tag.to_string(),
            diffuse_color,
            specular_color,
            shininess,
        });
        Ok(())
    }

    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// The desk's stock materials.
    pub fn desk_default() -> Self {
        let mut registry = Self::new();
        let stock = [
            ("metal", Vec3::splat(0.4), Vec3::new(0.7, 0.7, 0.6), 52.0),
            ("wood", Vec3::new(0.2, 0.2, 0.3), Vec3::ZERO, 0.1),
            ("glass", Vec3::splat(0.2), Vec3::ONE, 95.0),
            ("plate", Vec3::splat(0.4), Vec3::splat(0.2), 30.0),
            ("fabric", Vec3::new(0.6, 0.3, 0.2), Vec3::splat(0.1), 10.0),
        ];
        for (tag, diffuse, specular, shininess) in stock {
            registry.materials.push(Material {
                tag: tag.to_string(),
                diffuse_color: diffuse,
                specular_color: specular,
                shininess,
            });
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_is_not_found() {
        let registry = MaterialRegistry::desk_default();
        let before = registry.find("metal").cloned();
        assert!(registry.find("velvet").is_none());
        assert_eq!(registry.find("metal").cloned(), before);
    }

    #[test]
    fn first_definition_shadows_duplicates() {
        let mut registry = MaterialRegistry::new();
        registry.define("dup", Vec3::ONE, Vec3::ZERO, 1.0).unwrap();
        registry.define("dup", Vec3::ZERO, Vec3::ONE, 2.0).unwrap();
        let found = registry.find("dup").unwrap();
        assert_eq!(found.diffuse_color, Vec3::ONE);
        assert_eq!(found.shininess, 1.0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn define_is_bounded() {
        let mut registry = MaterialRegistry::new();
        for i in 0..MaterialRegistry::CAPACITY {
            registry
                .define(&format!("m{i}"), Vec3::ONE, Vec3::ONE, 1.0)
                .unwrap();
        }
        assert!(matches!(
            registry.define("extra", Vec3::ONE, Vec3::ONE, 1.0),
            Err(SceneError::RegistryFull { capacity: 64, .. })
        ));
    }

    #[test]
    fn desk_materials_match_the_scene() {
        let registry = MaterialRegistry::desk_default();
        assert_eq!(registry.len(), 5);
        let glass = registry.find("glass").unwrap();
        assert_eq!(glass.specular_color, Vec3::ONE);
        assert_eq!(glass.shininess, 95.0);
    }
}
