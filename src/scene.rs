use std::path::Path;

use log::info;

use crate::composer::{FrameStats, SceneComposer};
use crate::decoder::ImageDecoder;
use crate::error::SceneError;
use crate::lighting::LightRig;
use crate::materials::MaterialRegistry;
use crate::pipeline::ShaderPipeline;
use crate::render::{GraphicsBackend, MeshKind};
use crate::textures::TextureRegistry;

/// Image files the desk uses, relative to the asset directory, with the tag
/// each one is registered under.
pub const TEXTURE_ASSETS: [(&str, &str); 8] = [
    ("wood_grain.jpg", "tabletop"),
    ("brushed_metal.jpg", "brushed_metal"),
    ("matte_plastic.jpg", "matte_plastic"),
    ("keycaps.png", "keycaps"),
    ("cover_fabric.png", "cover_fabric"),
    ("cover_leather.jpg", "cover_leather"),
    ("cover_floral.jpg", "cover_floral"),
    ("holder_ceramic.jpg", "holder_ceramic"),
];

/// Outcome of [`DeskScene::prepare`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrepareReport {
    pub textures_loaded: usize,
    pub textures_expected: usize,
    /// Tag and reason for every texture that could not be registered.
    pub failures: Vec<(String, SceneError)>,
    pub materials: usize,
    pub point_lights: usize,
    pub meshes: Vec<MeshKind>,
}

impl PrepareReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The desk scene: registries, lights and the fixed draw list.
#[derive(Debug)]
pub struct DeskScene {
    pipeline: ShaderPipeline,
    lights: LightRig,
    composer: SceneComposer,
}

impl Default for DeskScene {
    fn default() -> Self {
        Self::new(LightRig::desk_default(), SceneComposer::default())
    }
}

impl DeskScene {
    pub fn new(lights: LightRig, composer: SceneComposer) -> Self {
        Self {
            pipeline: ShaderPipeline::new(TextureRegistry::new(), MaterialRegistry::new()),
            lights,
            composer,
        }
    }

    pub fn pipeline(&self) -> &ShaderPipeline {
        &self.pipeline
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Loads textures, binds them to units, defines materials, pushes the
    /// lights and loads each mesh kind once.
    ///
    /// Texture failures are logged and reported; preparation always finishes.
    pub fn prepare<B>(
        &mut self,
        backend: &mut B,
        decoder: &dyn ImageDecoder,
        asset_dir: &Path,
    ) -> PrepareReport
    where
        B: GraphicsBackend + ?Sized,
    {
        let mut report = PrepareReport {
            textures_expected: TEXTURE_ASSETS.len(),
            ..PrepareReport::default()
        };

        let textures = self.pipeline.textures_mut();
        for (file, tag) in TEXTURE_ASSETS {
            let path = asset_dir.join(file);
            match textures.load(decoder, backend, &path, tag) {
                Ok(_) => report.textures_loaded += 1,
                Err(err) => report.failures.push((tag.to_string(), err)),
            }
        }
        textures.bind_all(backend);

        *self.pipeline.materials_mut() = MaterialRegistry::desk_default();
        report.materials = self.pipeline.materials().len();

        self.lights.apply(backend);
        report.point_lights = self.lights.point_count();

        for kind in MeshKind::ALL {
            backend.load_mesh(kind);
        }
        report.meshes = MeshKind::ALL.to_vec();

        info!(
            "scene prepared: {}/{} textures, {} materials, {} meshes",
            report.textures_loaded,
            report.textures_expected,
            report.materials,
            report.meshes.len()
        );
        report
    }

    /// Draws every object once, in fixed order.
    pub fn render<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) -> FrameStats {
        self.composer.render(&mut self.pipeline, backend)
    }

    /// Releases every GPU texture the scene registered.
    pub fn teardown<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) {
        let released = self.pipeline.textures().len();
        self.pipeline.textures_mut().destroy_all(backend);
        info!("released {released} textures");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::decoder::DecodedImage;
    use crate::render::{names, Command, RecordingBackend, UniformValue};

    /// Decodes every path to a 1x1 RGB image except those listed as broken.
    struct FixtureDecoder {
        broken: Vec<&'static str>,
    }

    impl ImageDecoder for FixtureDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedImage, SceneError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if self.broken.contains(&name) {
                return Err(SceneError::Decode {
                    path: PathBuf::from(path),
                    reason: "corrupt".into(),
                });
            }
            Ok(DecodedImage {
                width: 1,
                height: 1,
                channels: 3,
                pixels: vec![200, 100, 50],
            })
        }
    }

    #[test]
    fn prepare_registers_assets_in_table_order() {
        let mut scene = DeskScene::default();
        let mut backend = RecordingBackend::new();
        let report = scene.prepare(
            &mut backend,
            &FixtureDecoder { broken: vec![] },
            Path::new("textures"),
        );

        assert!(report.is_complete());
        assert_eq!(report.textures_loaded, 8);
        assert_eq!(report.materials, 5);
        assert_eq!(report.point_lights, 2);
        for (index, (_, tag)) in TEXTURE_ASSETS.iter().enumerate() {
            assert_eq!(scene.pipeline().textures().find_slot_index(tag), Some(index));
        }
        let loads = backend
            .commands()
            .iter()
            .filter(|command| matches!(command, Command::LoadMesh(_)))
            .count();
        assert_eq!(loads, 5);
    }

    #[test]
    fn missing_texture_degrades_to_unbound_sampler() {
        let mut scene = DeskScene::default();
        let mut backend = RecordingBackend::new();
        let decoder = FixtureDecoder {
            broken: vec!["keycaps.png"],
        };
        let report = scene.prepare(&mut backend, &decoder, Path::new("textures"));
        assert_eq!(report.textures_loaded, 7);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "keycaps");

        backend.clear();
        let stats = scene.render(&mut backend);
        assert_eq!(stats.draw_calls, 55);
        assert_eq!(stats.lookup_misses, 40);
        // first key is the sixth draw: table, 3 monitor parts, keyboard base
        assert_eq!(
            backend.uniform_at_draw(5, names::OBJECT_TEXTURE),
            Some(UniformValue::Sampler(-1))
        );
        assert_eq!(scene.pipeline().diagnostics().total(), 40);
    }

    #[test]
    fn teardown_destroys_every_texture() {
        let mut scene = DeskScene::default();
        let mut backend = RecordingBackend::new();
        scene.prepare(
            &mut backend,
            &FixtureDecoder { broken: vec![] },
            Path::new("textures"),
        );
        assert_eq!(backend.live_texture_count(), 8);
        scene.teardown(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
        assert!(scene.pipeline().textures().is_empty());
    }
}
