use std::path::Path;

use log::{info, warn};

use crate::decoder::ImageDecoder;
use crate::error::SceneError;
use crate::render::{
    SamplerSettings, TextureDevice, TextureFormat, TextureHandle, TextureUpload, MAX_TEXTURE_UNITS,
};

/// A registered texture; its index in the registry is its texture unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub tag: String,
    pub handle: TextureHandle,
}

/// Fixed-capacity table of GPU textures keyed by tag.
///
/// Slots are only ever appended during scene preparation and are destroyed
/// together in [`TextureRegistry::destroy_all`].
#[derive(Debug, Default)]
pub struct TextureRegistry {
    slots: Vec<TextureSlot>,
}

impl TextureRegistry {
    pub const CAPACITY: usize = MAX_TEXTURE_UNITS;

    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `path`, uploads it and appends a slot for `tag`.
    ///
    /// Returns the new slot index. On any failure nothing is registered.
    pub fn load<D>(
        &mut self,
        decoder: &dyn ImageDecoder,
        device: &mut D,
        path: &Path,
        tag: &str,
    ) -> Result<usize, SceneError>
    where
        D: TextureDevice + ?Sized,
    {
        self.register(decoder, device, path, tag)
            .inspect_err(|err| warn!("texture `{tag}` not loaded: {err}"))
    }

    fn register<D>(
        &mut self,
        decoder: &dyn ImageDecoder,
        device: &mut D,
        path: &Path,
        tag: &str,
    ) -> Result<usize, SceneError>
    where
        D: TextureDevice + ?Sized,
    {
        if self.slots.len() >= Self::CAPACITY {
            return Err(SceneError::RegistryFull {
                registry: "texture",
                capacity: Self::CAPACITY,
            });
        }
        if self.find_slot_index(tag).is_some() {
            warn!("texture tag `{tag}` is already registered; lookups keep the first slot");
        }

        let mut image = decoder.decode(path)?;
        let format =
            TextureFormat::from_channels(image.channels).ok_or(SceneError::UnsupportedFormat {
                path: path.to_path_buf(),
                channels: image.channels,
            })?;
        image.flip_vertical();

        let handle = device.create_texture(&TextureUpload {
            label: tag,
            width: image.width,
            height: image.height,
            format,
            pixels: &image.pixels,
            sampler: SamplerSettings::REPEAT_LINEAR_MIPMAPPED,
        })?;
        info!(
            "loaded texture {} as `{tag}` ({}x{}, {} channels)",
            path.display(),
            image.width,
            image.height,
            image.channels
        );

        self.slots.push(TextureSlot {
            tag: tag.to_string(),
            handle,
        });
        Ok(self.slots.len() - 1)
    }

    /// Binds slot `i` to texture unit `i` for every populated slot.
    pub fn bind_all<D: TextureDevice + ?Sized>(&self, device: &mut D) {
        for (unit, slot) in self.slots.iter().enumerate() {
            device.bind_texture(unit as u32, slot.handle);
        }
    }

    pub fn find_handle(&self, tag: &str) -> Option<TextureHandle> {
        self.slots
            .iter()
            .find(|slot| slot.tag == tag)
            .map(|slot| slot.handle)
    }

    pub fn find_slot_index(&self, tag: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.tag == tag)
    }

    /// Releases every GPU texture and empties the registry.
    pub fn destroy_all<D: TextureDevice + ?Sized>(&mut self, device: &mut D) {
        for slot in self.slots.drain(..) {
            device.destroy_texture(slot.handle);
        }
    }

    pub fn slots(&self) -> &[TextureSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use std::sync::{Mutex, Once};

    use log::{Level, LevelFilter, Log, Metadata, Record};

    use super::*;
    use crate::decoder::DecodedImage;
    use crate::render::{Command, RecordingBackend};

    static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct WarningLog;

    impl Log for WarningLog {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Warn
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    fn capture_warnings() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            if log::set_logger(&WarningLog).is_ok() {
                log::set_max_level(LevelFilter::Warn);
            }
        });
    }

    fn warned_about(tag: &str) -> bool {
        let needle = format!("`{tag}`");
        WARNINGS
            .lock()
            .unwrap()
            .iter()
            .any(|line| line.contains(&needle))
    }

    /// Serves fixed images by file name; anything else fails to decode.
    struct StubDecoder(HashMap<PathBuf, DecodedImage>);

    impl StubDecoder {
        fn with(entries: &[(&str, u8)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|&(name, channels)| {
                        let image = DecodedImage {
                            width: 2,
                            height: 2,
                            channels,
                            pixels: vec![0; 4 * channels as usize],
                        };
                        (PathBuf::from(name), image)
                    })
                    .collect(),
            )
        }
    }

    impl ImageDecoder for StubDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedImage, SceneError> {
            self.0.get(path).cloned().ok_or_else(|| SceneError::Decode {
                path: path.to_path_buf(),
                reason: "not found".into(),
            })
        }
    }

    #[test]
    fn slot_index_matches_registration_and_bind_order() {
        let decoder = StubDecoder::with(&[("a.png", 3), ("b.png", 4), ("c.png", 3)]);
        let mut backend = RecordingBackend::new();
        let mut registry = TextureRegistry::new();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            let index = registry
                .load(&decoder, &mut backend, Path::new(&format!("{name}.png")), name)
                .unwrap();
            assert_eq!(index, i);
        }

        backend.clear();
        registry.bind_all(&mut backend);
        let binds: Vec<_> = backend
            .commands()
            .iter()
            .filter_map(|command| match command {
                Command::BindTexture { unit, handle } => Some((*unit, *handle)),
                _ => None,
            })
            .collect();
        for (i, tag) in ["a", "b", "c"].into_iter().enumerate() {
            assert_eq!(registry.find_slot_index(tag), Some(i));
            assert_eq!(binds[i], (i as u32, registry.find_handle(tag).unwrap()));
        }
        assert_eq!(registry.find_slot_index("missing"), None);
    }

    #[test]
    fn unsupported_channel_count_does_not_register() {
        let decoder = StubDecoder::with(&[("rgb.png", 3), ("gray.png", 1), ("ga.png", 2)]);
        let mut backend = RecordingBackend::new();
        let mut registry = TextureRegistry::new();
        registry
            .load(&decoder, &mut backend, Path::new("rgb.png"), "rgb")
            .unwrap();

        for (name, channels) in [("gray.png", 1), ("ga.png", 2)] {
            let err = registry
                .load(&decoder, &mut backend, Path::new(name), "bad")
                .unwrap_err();
            assert_eq!(
                err,
                SceneError::UnsupportedFormat {
                    path: PathBuf::from(name),
                    channels,
                }
            );
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(backend.live_texture_count(), 1);
    }

    #[test]
    fn decode_failure_is_reported_and_skipped() {
        let decoder = StubDecoder::with(&[]);
        let mut backend = RecordingBackend::new();
        let mut registry = TextureRegistry::new();
        let err = registry
            .load(&decoder, &mut backend, Path::new("nope.jpg"), "nope")
            .unwrap_err();
        assert!(matches!(err, SceneError::Decode { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn failed_loads_are_logged_by_the_registry() {
        capture_warnings();
        let decoder = StubDecoder::with(&[("gray.png", 1)]);
        let mut backend = RecordingBackend::new();
        let mut registry = TextureRegistry::new();
        registry
            .load(&decoder, &mut backend, Path::new("absent.jpg"), "absent_asset")
            .unwrap_err();
        registry
            .load(&decoder, &mut backend, Path::new("gray.png"), "gray_asset")
            .unwrap_err();
        assert!(warned_about("absent_asset"));
        assert!(warned_about("gray_asset"));
    }

    #[test]
    fn refuses_to_grow_past_sixteen_slots() {
        let decoder = StubDecoder::with(&[("t.png", 4)]);
        let mut backend = RecordingBackend::new();
        let mut registry = TextureRegistry::new();
        for i in 0..TextureRegistry::CAPACITY {
            registry
                .load(&decoder, &mut backend, Path::new("t.png"), &format!("t{i}"))
                .unwrap();
        }
        let err = registry
            .load(&decoder, &mut backend, Path::new("t.png"), "overflow")
            .unwrap_err();
        assert_eq!(
            err,
            SceneError::RegistryFull {
                registry: "texture",
                capacity: 16,
            }
        );
        assert_eq!(registry.len(), 16);
        assert_eq!(registry.find_slot_index("t0"), Some(0));
    }

    #[test]
    fn duplicate_tags_resolve_to_first_slot() {
        let decoder = StubDecoder::with(&[("t.png", 3)]);
        let mut backend = RecordingBackend::new();
        let mut registry = TextureRegistry::new();
        registry
            .load(&decoder, &mut backend, Path::new("t.png"), "dup")
            .unwrap();
        registry
            .load(&decoder, &mut backend, Path::new("t.png"), "dup")
            .unwrap();
        assert_eq!(registry.find_slot_index("dup"), Some(0));
        assert_eq!(registry.find_handle("dup"), Some(registry.slots()[0].handle));
    }

    #[test]
    fn destroy_all_releases_every_handle() {
        let decoder = StubDecoder::with(&[("t.png", 3)]);
        let mut backend = RecordingBackend::new();
        let mut registry = TextureRegistry::new();
        for tag in ["a", "b"] {
            registry
                .load(&decoder, &mut backend, Path::new("t.png"), tag)
                .unwrap();
        }
        registry.destroy_all(&mut backend);
        assert!(registry.is_empty());
        assert_eq!(backend.live_texture_count(), 0);
    }
}
