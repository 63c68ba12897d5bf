//! DDA ray traversal over the tile grid.
//!
//! Each screen column maps to a camera-space offset in `[-1, 1]`; the ray for that column
//! is `dir + plane * offset`. The traversal steps cell by cell along whichever axis reaches
//! its next grid line first, and stops on the first non-zero tile.

use crate::camera::CameraState;
use crate::world::{Grid, Tile};

/// Smallest distance reported for a hit. A camera exactly on a grid line next to a wall
/// would otherwise produce zero.
pub const MIN_PERP_DIST: f32 = 1e-4;

/// Which grid axis was crossed to enter the struck cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub perp_wall_dist: f32,
    pub side: Side,
    pub map_x: i32,
    pub map_y: i32,
    pub tile: Tile,
    pub ray_dir: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RayError {
    #[error("ray at offset {column_offset} escaped the grid after {steps} steps")]
    Escaped { column_offset: f32, steps: usize },
    #[error("ray direction is zero at offset {column_offset}")]
    DegenerateDirection { column_offset: f32 },
}

/// Camera-space offset for a screen column: -1 at the left edge, approaching +1 at the right.
#[inline]
pub fn camera_offset(column: usize, screen_width: usize) -> f32 {
    2.0 * column as f32 / screen_width as f32 - 1.0
}

/// Traversal cap: generous for any path that stays inside the grid.
#[inline]
fn max_steps(grid: &Grid) -> usize {
    2 * (grid.width() + grid.height())
}

/// Ray length needed to cross one whole cell along an axis whose direction component is
/// `this`. A zero component never crosses, so the step is infinite.
#[inline]
fn delta_dist(this: f32, other: f32) -> f32 {
    if this == 0.0 {
        f32::INFINITY
    } else {
        (1.0 + (other * other) / (this * this)).sqrt()
    }
}

/// Step sign and distance to the first grid line on one axis.
#[inline]
fn initial_side(pos: f32, cell: i32, dir: f32, delta: f32) -> (i32, f32) {
    if delta.is_infinite() {
        return (if dir < 0.0 { -1 } else { 1 }, f32::INFINITY);
    }
    if dir < 0.0 {
        (-1, (pos - cell as f32) * delta)
    } else {
        (1, (cell as f32 + 1.0 - pos) * delta)
    }
}

pub fn cast_ray(grid: &Grid, camera: &CameraState, column_offset: f32) -> Result<RayHit, RayError> {
    let ray_dir = [
        camera.dir[0] + camera.plane[0] * column_offset,
        camera.dir[1] + camera.plane[1] * column_offset,
    ];
    if ray_dir[0] == 0.0 && ray_dir[1] == 0.0 {
        return Err(RayError::DegenerateDirection { column_offset });
    }

    let mut map_x = camera.pos[0].floor() as i32;
    let mut map_y = camera.pos[1].floor() as i32;

    let delta_x = delta_dist(ray_dir[0], ray_dir[1]);
    let delta_y = delta_dist(ray_dir[1], ray_dir[0]);

    let (step_x, mut side_x) = initial_side(camera.pos[0], map_x, ray_dir[0], delta_x);
    let (step_y, mut side_y) = initial_side(camera.pos[1], map_y, ray_dir[1], delta_y);

    let limit = max_steps(grid);
    let mut steps = 0;
    let (side, tile) = loop {
        let side = if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            Side::X
        } else {
            side_y += delta_y;
            map_y += step_y;
            Side::Y
        };
        steps += 1;

        match grid.get(map_x, map_y) {
            Some(0) if steps < limit => {}
            Some(t) if t > 0 => break (side, t),
            _ => {
                return Err(RayError::Escaped {
                    column_offset,
                    steps,
                });
            }
        }
    };

    // Distance along the view axis, not Euclidean, so straight walls stay straight.
    let perp = match side {
        Side::X => (map_x as f32 - camera.pos[0] + (1 - step_x) as f32 / 2.0) / ray_dir[0],
        Side::Y => (map_y as f32 - camera.pos[1] + (1 - step_y) as f32 / 2.0) / ray_dir[1],
    };

    Ok(RayHit {
        perp_wall_dist: perp.abs().max(MIN_PERP_DIST),
        side,
        map_x,
        map_y,
        tile,
        ray_dir,
    })
}
