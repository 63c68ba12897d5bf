//! Screen-space projection of ray hits (walls) and of screen rows (floor and ceiling).

use crate::camera::CameraState;
use crate::raycast::{RayHit, Side};
use crate::texture::TextureSize;
use crate::world::Tile;

/// One vertical wall slice and how to sample its texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallStrip {
    pub column: usize,
    pub draw_start: i32,
    pub draw_end: i32,
    pub line_height: i32,
    pub side: Side,
    pub tile: Tile,
    pub texture_id: usize,
    pub tex_x: usize,
    pub tex_start_y: f32,
    pub tex_step_y: f32,
}

impl WallStrip {
    /// Texture row for screen row `y` inside the strip.
    #[inline]
    pub fn tex_y(&self, y: i32, tex_height: usize) -> usize {
        let v = self.tex_start_y + (y - self.draw_start) as f32 * self.tex_step_y;
        (v.max(0.0) as usize).min(tex_height - 1)
    }
}

/// Whether the texture column must be flipped so textures read the same way from both
/// faces of a wall.
#[inline]
pub fn needs_mirror(side: Side, ray_dir: [f32; 2]) -> bool {
    match side {
        Side::X => ray_dir[0] > 0.0,
        Side::Y => ray_dir[1] < 0.0,
    }
}

#[inline]
pub fn mirror_tex_x(tex_x: usize, tex_width: usize) -> usize {
    tex_width - tex_x - 1
}

/// Y-side faces are drawn at half intensity.
#[inline]
pub fn shade(color: u32, side: Side) -> u32 {
    match side {
        Side::X => color,
        Side::Y => (color >> 1) & 0x007F_7F7F,
    }
}

pub fn project_wall(
    camera: &CameraState,
    hit: &RayHit,
    column: usize,
    screen_height: usize,
    tex: TextureSize,
) -> WallStrip {
    let h = screen_height as i32;
    // `as` saturates, so a vanishing distance cannot overflow.
    let line_height = (screen_height as f32 / hit.perp_wall_dist) as i32;

    let draw_start = (-line_height / 2 + h / 2).clamp(0, h - 1);
    let draw_end = (line_height / 2 + h / 2).clamp(0, h - 1);

    // Fractional position along the struck face.
    let mut wall_x = match hit.side {
        Side::X => camera.pos[1] + hit.perp_wall_dist * hit.ray_dir[1],
        Side::Y => camera.pos[0] + hit.perp_wall_dist * hit.ray_dir[0],
    };
    wall_x -= wall_x.floor();

    let mut tex_x = ((wall_x * tex.width as f32) as usize).min(tex.width - 1);
    if needs_mirror(hit.side, hit.ray_dir) {
        tex_x = mirror_tex_x(tex_x, tex.width);
    }

    let tex_step_y = tex.height as f32 / line_height.max(1) as f32;
    // Skip the texels above the screen when the strip is taller than the view.
    let tex_start_y = ((draw_start - (h - line_height) / 2) as f32 * tex_step_y).max(0.0);

    WallStrip {
        column,
        draw_start,
        draw_end,
        line_height,
        side: hit.side,
        tile: hit.tile,
        texture_id: (hit.tile as usize).saturating_sub(1),
        tex_x,
        tex_start_y,
        tex_step_y,
    }
}

/// World-floor mapping of one screen row below the horizon. World coordinates advance
/// linearly across the row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorRow {
    pub row: usize,
    pub row_distance: f32,
    pub origin: [f32; 2], // world position under column 0
    pub step: [f32; 2],   // world delta per column
}

/// One floor (or mirrored ceiling) pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorSampleRow {
    pub row: usize,
    pub column: usize,
    pub world_x: f32,
    pub world_y: f32,
    pub tex_x: usize,
    pub tex_y: usize,
}

impl FloorRow {
    #[inline]
    pub fn world_at(&self, column: usize) -> [f32; 2] {
        [
            self.origin[0] + self.step[0] * column as f32,
            self.origin[1] + self.step[1] * column as f32,
        ]
    }

    pub fn sample(&self, column: usize, tex: TextureSize) -> FloorSampleRow {
        let [world_x, world_y] = self.world_at(column);
        FloorSampleRow {
            row: self.row,
            column,
            world_x,
            world_y,
            tex_x: wrap_texel(world_x, tex.width),
            tex_y: wrap_texel(world_y, tex.height),
        }
    }
}

#[inline]
fn wrap_texel(world: f32, size: usize) -> usize {
    let t = (size as f32 * (world - world.floor())) as i64;
    t.rem_euclid(size as i64) as usize
}

/// `None` for rows at or above the horizon.
pub fn project_floor_row(
    camera: &CameraState,
    row: usize,
    screen_width: usize,
    screen_height: usize,
) -> Option<FloorRow> {
    let p = row as i64 - (screen_height / 2) as i64;
    if p <= 0 || screen_width == 0 {
        return None;
    }
    // Eye at half the screen height above the floor.
    let row_distance = 0.5 * screen_height as f32 / p as f32;

    let left = [camera.dir[0] - camera.plane[0], camera.dir[1] - camera.plane[1]];
    let right = [camera.dir[0] + camera.plane[0], camera.dir[1] + camera.plane[1]];
    let w = screen_width as f32;

    Some(FloorRow {
        row,
        row_distance,
        origin: [
            camera.pos[0] + row_distance * left[0],
            camera.pos[1] + row_distance * left[1],
        ],
        step: [
            row_distance * (right[0] - left[0]) / w,
            row_distance * (right[1] - left[1]) / w,
        ],
    })
}
