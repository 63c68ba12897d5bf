//! Viewer configuration, resolved once at startup.
//!
//! Every field has a default, so a config file only needs the values it changes:
//!
//! ```json
//! { "screen_width": 640, "screen_height": 480, "render_mode": "flat" }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::texture::{TextureSize, pack_rgb};
use crate::world::Grid;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Textured,
    Flat,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Textured => RenderMode::Flat,
            RenderMode::Flat => RenderMode::Textured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn packed(self) -> u32 {
        pack_rgb(self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub screen_width: usize,
    pub screen_height: usize,
    pub texture_width: usize,
    pub texture_height: usize,
    /// Camera-plane length relative to a unit heading; sets the field of view.
    pub plane_magnitude: f32,
    /// Units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub rot_speed: f32,
    pub start_position: [f32; 2],
    pub start_direction: [f32; 2],
    /// Map file; the built-in map when absent.
    pub map: Option<PathBuf>,
    /// Texture files by id; generated textures when empty.
    pub textures: Vec<PathBuf>,
    pub floor_texture: Option<usize>,
    pub ceiling_texture: Option<usize>,
    pub floor_color: Rgb,
    pub ceiling_color: Rgb,
    pub fallback_color: Rgb,
    pub render_mode: RenderMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 1080,
            screen_height: 720,
            texture_width: 64,
            texture_height: 64,
            plane_magnitude: 0.6,
            move_speed: 5.0,
            rot_speed: 3.0,
            start_position: [14.0, 12.0],
            start_direction: [-1.0, 0.0],
            map: None,
            textures: Vec::new(),
            floor_texture: Some(1),
            ceiling_texture: None,
            floor_color: Rgb(40, 40, 40),
            ceiling_color: Rgb(30, 30, 70),
            fallback_color: Rgb(255, 0, 0),
            render_mode: RenderMode::Textured,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.screen_width == 0 || self.screen_height == 0 {
            return invalid(format!(
                "screen size {}x{} must be positive",
                self.screen_width, self.screen_height
            ));
        }
        if self.texture_width == 0 || self.texture_height == 0 {
            return invalid(format!(
                "texture size {}x{} must be positive",
                self.texture_width, self.texture_height
            ));
        }
        if !(self.plane_magnitude.is_finite() && self.plane_magnitude > 0.0) {
            return invalid(format!(
                "plane_magnitude {} must be finite and positive",
                self.plane_magnitude
            ));
        }
        for (name, v) in [("move_speed", self.move_speed), ("rot_speed", self.rot_speed)] {
            if !(v.is_finite() && v >= 0.0) {
                return invalid(format!("{name} {v} must be finite and non-negative"));
            }
        }
        let [dx, dy] = self.start_direction;
        if !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
            return invalid(format!("start_direction {:?} must be non-zero", self.start_direction));
        }
        if !self.start_position.iter().all(|v| v.is_finite()) {
            return invalid(format!("start_position {:?} must be finite", self.start_position));
        }
        Ok(())
    }

    /// The start position must lie inside the grid on an open tile.
    pub fn validate_start(&self, grid: &Grid) -> Result<(), ConfigError> {
        let [x, y] = self.start_position;
        let (cx, cy) = (x.floor() as i32, y.floor() as i32);
        match grid.get(cx, cy) {
            Some(0) => Ok(()),
            Some(tile) => Err(ConfigError::Invalid(format!(
                "start position ({x}, {y}) is inside wall tile {tile}"
            ))),
            None => Err(ConfigError::Invalid(format!(
                "start position ({x}, {y}) is outside the {}x{} map",
                grid.width(),
                grid.height()
            ))),
        }
    }

    pub fn texture_size(&self) -> TextureSize {
        TextureSize {
            width: self.texture_width,
            height: self.texture_height,
        }
    }

    pub fn initial_camera(&self) -> CameraState {
        CameraState::new(self.start_position, self.start_direction, self.plane_magnitude)
    }
}
