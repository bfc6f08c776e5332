use std::collections::HashSet;

use log::warn;

use super::{
    MeshKind, MeshLibrary, TextureDevice, TextureFormat, TextureHandle, TextureUpload,
    UniformSink, UniformValue, DEFAULT_MAX_TEXTURE_DIMENSION,
};
use crate::error::SceneError;

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Uniform { name: String, value: UniformValue },
    LoadMesh(MeshKind),
    Draw(MeshKind),
    CreateTexture {
        handle: TextureHandle,
        label: String,
        width: u32,
        height: u32,
        format: TextureFormat,
    },
    BindTexture { unit: u32, handle: TextureHandle },
    DestroyTexture(TextureHandle),
}

/// Headless backend that keeps a log of every command it receives.
#[derive(Debug)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    loaded_meshes: HashSet<MeshKind>,
    live_textures: HashSet<TextureHandle>,
    next_handle: u32,
    max_texture_dimension: u32,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            loaded_meshes: HashSet::new(),
            live_textures: HashSet::new(),
            next_handle: 0,
            max_texture_dimension: DEFAULT_MAX_TEXTURE_DIMENSION,
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mimics a device with a smaller texture size limit.
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drops the recorded log but keeps loaded meshes and live textures.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Mesh kinds drawn so far, in submission order.
    pub fn draws(&self) -> Vec<MeshKind> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Draw(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Draw(_)))
            .count()
    }

    /// Latest value pushed under `name`.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::Uniform { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Value `name` held when the `draw_index`-th draw (zero based) was issued.
    pub fn uniform_at_draw(&self, draw_index: usize, name: &str) -> Option<UniformValue> {
        let mut current = None;
        let mut draws = 0;
        for command in &self.commands {
            match command {
                Command::Uniform { name: n, value } if n == name => current = Some(*value),
                Command::Draw(_) => {
                    if draws == draw_index {
                        return current;
                    }
                    draws += 1;
                }
                _ => {}
            }
        }
        None
    }

    /// Number of times `name` was written.
    pub fn uniform_writes(&self, name: &str) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Uniform { name: n, .. } if n == name))
            .count()
    }

    pub fn loaded_meshes(&self) -> &HashSet<MeshKind> {
        &self.loaded_meshes
    }

    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }
}

impl UniformSink for RecordingBackend {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.commands.push(Command::Uniform {
            name: name.to_string(),
            value,
        });
    }
}

impl MeshLibrary for RecordingBackend {
    fn load_mesh(&mut self, kind: MeshKind) {
        self.loaded_meshes.insert(kind);
        self.commands.push(Command::LoadMesh(kind));
    }

    fn draw_mesh(&mut self, kind: MeshKind) {
        if !self.loaded_meshes.contains(&kind) {
            warn!("drawing {} mesh that was never loaded", kind.name());
        }
        self.commands.push(Command::Draw(kind));
    }
}

impl TextureDevice for RecordingBackend {
    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<TextureHandle, SceneError> {
        upload.validate(self.max_texture_dimension)?;
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.live_textures.insert(handle);
        self.commands.push(Command::CreateTexture {
            handle,
            label: upload.label.to_string(),
            width: upload.width,
            height: upload.height,
            format: upload.format,
        });
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, handle: TextureHandle) {
        self.commands.push(Command::BindTexture { unit, handle });
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.live_textures.remove(&handle);
        self.commands.push(Command::DestroyTexture(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SamplerSettings;

    #[test]
    fn uniform_at_draw_tracks_state_per_draw() {
        let mut backend = RecordingBackend::new();
        backend.load_mesh(MeshKind::Box);
        backend.set_bool("bUseTexture", true);
        backend.draw_mesh(MeshKind::Box);
        backend.set_bool("bUseTexture", false);
        backend.draw_mesh(MeshKind::Box);

        assert_eq!(
            backend.uniform_at_draw(0, "bUseTexture"),
            Some(UniformValue::Bool(true))
        );
        assert_eq!(
            backend.uniform_at_draw(1, "bUseTexture"),
            Some(UniformValue::Bool(false))
        );
        assert_eq!(backend.uniform_at_draw(2, "bUseTexture"), None);
        assert_eq!(backend.uniform_writes("bUseTexture"), 2);
    }

    #[test]
    fn rejects_uploads_with_mismatched_pixel_data() {
        let mut backend = RecordingBackend::new();
        let upload = TextureUpload {
            label: "short",
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8,
            pixels: &[0; 8],
            sampler: SamplerSettings::REPEAT_LINEAR_MIPMAPPED,
        };
        assert!(matches!(
            backend.create_texture(&upload),
            Err(SceneError::Upload { .. })
        ));
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn rejects_textures_over_the_device_limit() {
        let mut backend = RecordingBackend::new().with_max_texture_dimension(4);
        let pixels = [0u8; 8 * 2 * 3];
        let upload = TextureUpload {
            label: "poster",
            width: 8,
            height: 2,
            format: TextureFormat::Rgb8,
            pixels: &pixels,
            sampler: SamplerSettings::REPEAT_LINEAR_MIPMAPPED,
        };
        let err = backend.create_texture(&upload).unwrap_err();
        assert!(err.to_string().contains("exceeds the 4 texel limit"));
        assert_eq!(backend.live_texture_count(), 0);
        assert!(backend.commands().is_empty());
    }
}
