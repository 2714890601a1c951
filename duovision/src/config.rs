//! Configuration management (~/.config/Duovision/config.toml)
//!
//! Handles loading, saving, and providing defaults for the presentation
//! settings. Settings are stored in TOML format in the platform-specific
//! config directory. The renderer reads a `VideoConfig` snapshot once per
//! frame; the frontend is responsible for signalling a pipeline reload (via
//! `FrameEvents`) when the stereo mode changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How separate left/right-eye images are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StereoRenderMode {
    /// Mono output using the eye selected by `mono_eye`.
    #[default]
    Off,
    /// Both eyes side by side at half width each.
    SideBySide,
    /// Red/cyan color-filter combination of both eyes in one pass.
    Anaglyph,
    /// Alternating scanlines, left eye on even rows.
    Interlaced,
    /// Alternating scanlines, left eye on odd rows.
    ReverseInterlaced,
    /// Full-size per-eye views with a lens-dependent horizontal offset.
    CardboardVr,
}

/// Which eye feeds the top screen when stereo rendering is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EyeSelect {
    #[default]
    Left,
    Right,
}

/// Sampling filter for scaling the screen textures to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Stereo presentation mode (default: Off)
    #[serde(default)]
    pub render_3d: StereoRenderMode,
    /// Eye shown on the top screen in mono mode (default: Left)
    #[serde(default)]
    pub mono_eye: EyeSelect,
    /// Present the bottom screen where the top one normally goes (default: false)
    #[serde(default)]
    pub swap_screens: bool,
    /// Screen texture sampling filter (default: Linear)
    #[serde(default)]
    pub filter_mode: TextureFilter,
    /// Internal resolution multiplier reported to the shaders (default: 1)
    #[serde(default = "default_resolution_scale")]
    pub resolution_scale: u32,
    /// Letterbox color around the screens (default: black)
    #[serde(default = "default_background_color")]
    pub background_color: [f32; 3],
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Video/presentation settings
    #[serde(default)]
    pub video: VideoConfig,
}

fn default_resolution_scale() -> u32 {
    1
}

fn default_background_color() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            render_3d: StereoRenderMode::default(),
            mono_eye: EyeSelect::default(),
            swap_screens: false,
            filter_mode: TextureFilter::default(),
            resolution_scale: default_resolution_scale(),
            background_color: default_background_color(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.duovision", "", "Duovision")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir()
        .and_then(|dir| std::fs::read_to_string(dir.join("config.toml")).ok())
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default()
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &Config) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(config).expect("config serialization cannot fail");
        std::fs::write(dir.join("config.toml"), content)?;
    }
    Ok(())
}
