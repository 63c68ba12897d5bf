use crate::input::InputState;
use crate::world::Grid;

/// Player viewpoint. `dir` and `plane` are always rotated together; the ratio of their
/// lengths sets the horizontal field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub pos: [f32; 2],   // (x, y) position in grid space
    pub dir: [f32; 2],   // heading
    pub plane: [f32; 2], // camera plane, perpendicular to dir
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new([14.0, 12.0], [-1.0, 0.0], 0.6)
    }
}

impl CameraState {
    /// Build a camera whose plane is perpendicular to `dir` with the given magnitude.
    /// A heading of (-1, 0) gets a plane of (0, magnitude).
    pub fn new(pos: [f32; 2], dir: [f32; 2], plane_magnitude: f32) -> Self {
        let len = (dir[0] * dir[0] + dir[1] * dir[1]).sqrt();
        let k = if len > 0.0 { plane_magnitude / len } else { 0.0 };
        Self {
            pos,
            dir,
            plane: [dir[1] * k, -dir[0] * k],
        }
    }

    /// Horizontal field of view in degrees.
    pub fn fov_degrees(&self) -> f32 {
        let d = (self.dir[0] * self.dir[0] + self.dir[1] * self.dir[1]).sqrt();
        let p = (self.plane[0] * self.plane[0] + self.plane[1] * self.plane[1]).sqrt();
        2.0 * (p / d).atan().to_degrees()
    }

    /// Rotate heading and camera plane by `angle` radians (counter-clockwise).
    pub fn rotate(&mut self, angle: f32) {
        let (s, c) = angle.sin_cos();
        self.dir = rotate2(self.dir, c, s);
        self.plane = rotate2(self.plane, c, s);
    }

    /// Move along the heading by `amount` (negative moves backwards). Each axis is
    /// committed only if the destination cell on that axis is open; X is resolved first
    /// and the Y check uses the updated X.
    pub fn translate(&mut self, grid: &Grid, amount: f32) {
        let nx = self.pos[0] + self.dir[0] * amount;
        if !grid.is_wall(nx.floor() as i32, self.pos[1].floor() as i32) {
            self.pos[0] = nx;
        }
        let ny = self.pos[1] + self.dir[1] * amount;
        if !grid.is_wall(self.pos[0].floor() as i32, ny.floor() as i32) {
            self.pos[1] = ny;
        }
    }

    /// Apply one frame of input. Speeds are already scaled by the frame time.
    pub fn update(&mut self, grid: &Grid, input: &InputState, move_speed: f32, rot_speed: f32) {
        if input.forward {
            self.translate(grid, move_speed);
        }
        if input.backward {
            self.translate(grid, -move_speed);
        }
        if input.rotate_right {
            self.rotate(-rot_speed);
        }
        if input.rotate_left {
            self.rotate(rot_speed);
        }
    }
}

#[inline]
fn rotate2(v: [f32; 2], c: f32, s: f32) -> [f32; 2] {
    [v[0] * c - v[1] * s, v[0] * s + v[1] * c]
}
