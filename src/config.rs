//! Engine configuration.
//!
//! The configuration is a JSON file. Every field is optional and falls back to the values
//! below, so `{}` is a valid configuration.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    camera::{Camera, DEFAULT_MOUSE_SENSITIVITY, DEFAULT_MOVEMENT_SPEED},
    error::{Error, Result},
};

const APP_DIR: &str = "poor-engine";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    /// Capture the cursor for free-look as soon as the window opens.
    pub grab_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Poor Engine".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            grab_cursor: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub texture: PathBuf,
    pub models: Vec<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            vertex_shader: "assets/shaders/vertex.glsl".into(),
            fragment_shader: "assets/shaders/fragment.glsl".into(),
            texture: "assets/textures/checker.ppm".into(),
            models: vec!["assets/models/quad.obj".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub world_up: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            world_up: [0.0, 1.0, 0.0],
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> Camera {
        let mut camera = Camera::new(
            Vec3::from(self.position),
            Vec3::from(self.world_up).normalize_or(Vec3::Y),
            self.yaw,
            self.pitch.clamp(-89.0, 89.0),
        );
        camera.movement_speed = self.movement_speed;
        camera.mouse_sensitivity = self.mouse_sensitivity;
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            camera: CameraConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the user config directory is tried and
    /// the defaults are used if no file is there.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            Some(path) => {
                log::warn!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                log::warn!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        serde_json::from_str(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses `log_level`, falling back to `Info` for unknown names.
    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level {:?}, using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}

/// `<config dir>/poor-engine/config.json`, if the platform has a config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
