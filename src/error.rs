use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Registry a failed lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupKind {
    Texture,
    Material,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Texture => f.write_str("texture"),
            LookupKind::Material => f.write_str("material"),
        }
    }
}

/// Failures raised while preparing or drawing the scene.
///
/// None of these abort a running frame: callers log them and carry on with
/// the affected slot, material or sampler absent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("could not decode image {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
    #[error(
        "image {} has {channels} channel(s); only RGB and RGBA are supported",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf, channels: u8 },
    #[error("{registry} registry is full ({capacity} entries)")]
    RegistryFull {
        registry: &'static str,
        capacity: usize,
    },
    #[error("no {kind} registered under tag `{tag}`")]
    LookupMiss { kind: LookupKind, tag: String },
    #[error("texture upload for `{tag}` was rejected: {reason}")]
    Upload { tag: String, reason: String },
}

impl SceneError {
    pub(crate) fn texture_miss(tag: &str) -> Self {
        Self::LookupMiss {
            kind: LookupKind::Texture,
            tag: tag.to_string(),
        }
    }

    pub(crate) fn material_miss(tag: &str) -> Self {
        Self::LookupMiss {
            kind: LookupKind::Material,
            tag: tag.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = SceneError::UnsupportedFormat {
            path: PathBuf::from("textures/gray.png"),
            channels: 1,
        };
        assert_eq!(
            err.to_string(),
            "image textures/gray.png has 1 channel(s); only RGB and RGBA are supported"
        );
        assert_eq!(
            SceneError::material_miss("velvet").to_string(),
            "no material registered under tag `velvet`"
        );
    }
}
