//! First-person maze viewer over a tile grid.
//!
//! Every frame, one ray per screen column walks the grid with a DDA until it meets a wall
//! tile; the hit distance becomes a vertical textured strip, and the rows below (and
//! mirrored above) each strip are filled by perspective floor casting.
//!
//! The core (`world`, `camera`, `raycast`, `projection`) is pure and allocation-free per
//! column. `renderer` sequences it into a frame buffer; the window lives in the binary.

pub mod camera;
pub mod clock;
pub mod config;
pub mod input;
pub mod projection;
pub mod raycast;
pub mod renderer;
pub mod scaler;
pub mod texture;
pub mod world;

pub use camera::CameraState;
pub use config::{Config, ConfigError, RenderMode};
pub use input::InputState;
pub use projection::{FloorRow, FloorSampleRow, WallStrip, project_floor_row, project_wall};
pub use raycast::{RayError, RayHit, Side, cast_ray};
pub use renderer::{FrameBuffer, RenderSettings, render_frame};
pub use texture::{Texture, TextureSet, TextureSize};
pub use world::{Grid, MapError, Tile};
