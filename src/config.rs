use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use crate::input::KeyCode;

/// Environment variable that overrides the default asset directory.
pub const ASSETS_ENV: &str = "DESK_SCENE_ASSETS";
pub const DEFAULT_ASSETS_DIR: &str = "textures";
pub const WINDOW_WIDTH: u32 = 1000;
pub const WINDOW_HEIGHT: u32 = 800;
pub const WINDOW_TITLE: &str = "Desk Scene";

const USAGE: &str =
    "Usage: desk-scene [--assets DIR] [--summary-only] [--frames N] [--press KEY[,KEY...]]";

/// Command-line options for the desk-scene binary.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub assets_dir: PathBuf,
    /// Render into a recording backend instead of opening a window.
    pub summary_only: bool,
    /// Frames to run in summary mode.
    pub frames: usize,
    /// Keys played back in summary mode, one per frame.
    pub presses: Vec<KeyCode>,
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            summary_only: false,
            frames: 1,
            presses: Vec::new(),
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            title: WINDOW_TITLE.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Reads the process arguments and `DESK_SCENE_ASSETS`.
    pub fn parse() -> Result<Self> {
        Self::from_args(env::args().skip(1), env::var_os(ASSETS_ENV).map(PathBuf::from))
    }

    /// `--assets` wins over `env_assets`, which wins over the default.
    pub fn from_args<I>(args: I, env_assets: Option<PathBuf>) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        if let Some(dir) = env_assets {
            config.assets_dir = dir;
        }

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => config.summary_only = true,
                "--assets" => {
                    let dir = args
                        .next()
                        .ok_or_else(|| anyhow!("--assets needs a directory. {USAGE}"))?;
                    config.assets_dir = PathBuf::from(dir);
                }
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames needs a count. {USAGE}"))?;
                    config.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count `{value}`"))?;
                    if config.frames == 0 {
                        bail!("--frames must be at least 1");
                    }
                }
                "--press" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--press needs a key list. {USAGE}"))?;
                    config.presses = parse_keys(&value)?;
                }
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(config)
    }
}

fn parse_keys(list: &str) -> Result<Vec<KeyCode>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| KeyCode::from_name(name).ok_or_else(|| anyhow!("unknown key `{name}`")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn defaults_match_the_desk_window() {
        let config = RuntimeConfig::from_args(Vec::new(), None).unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("textures"));
        assert_eq!((config.window_width, config.window_height), (1000, 800));
        assert_eq!(config.frames, 1);
        assert!(!config.summary_only);
    }

    #[test]
    fn flag_overrides_environment() {
        let from_env =
            RuntimeConfig::from_args(Vec::new(), Some(PathBuf::from("/srv/desk"))).unwrap();
        assert_eq!(from_env.assets_dir, PathBuf::from("/srv/desk"));

        let config = RuntimeConfig::from_args(
            args(&["--assets", "local", "--summary-only"]),
            Some(PathBuf::from("/srv/desk")),
        )
        .unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("local"));
        assert!(config.summary_only);
    }

    #[test]
    fn press_list_parses_keys() {
        let config = RuntimeConfig::from_args(args(&["--press", "O, 1,w,Esc"]), None).unwrap();
        assert_eq!(
            config.presses,
            vec![
                KeyCode::Character('O'),
                KeyCode::Digit(1),
                KeyCode::Character('W'),
                KeyCode::ESCAPE,
            ]
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(RuntimeConfig::from_args(args(&["--frames", "0"]), None).is_err());
        assert!(RuntimeConfig::from_args(args(&["--frames", "many"]), None).is_err());
        assert!(RuntimeConfig::from_args(args(&["--press", "F13"]), None).is_err());
        assert!(RuntimeConfig::from_args(args(&["--assets"]), None).is_err());
        let err = RuntimeConfig::from_args(args(&["--wireframe"]), None).unwrap_err();
        assert!(err.to_string().starts_with("Unknown argument: --wireframe"));
    }
}
