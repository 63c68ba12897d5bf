use std::path::Path;

use rayon::{
    iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::camera::CameraState;
use crate::config::{Config, RenderMode};
use crate::projection::{WallStrip, project_floor_row, project_wall, shade};
use crate::raycast::{camera_offset, cast_ray};
use crate::texture::{Texture, TextureSet, TextureSize, pack_rgb};
use crate::world::{Grid, Tile};

/// Row-major 0x00RRGGBB pixels at the internal render resolution.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// Upper half to `ceiling`, lower half to `floor`.
    pub fn clear_halves(&mut self, ceiling: u32, floor: u32) {
        let mid = self.height / 2;
        let (top, bottom) = self.pixels.split_at_mut(mid * self.width);
        top.fill(ceiling);
        bottom.fill(floor);
    }

    /// Solid vertical line, inclusive, clipped to the buffer.
    pub fn vertical_line(&mut self, column: usize, y0: i32, y1: i32, color: u32) {
        if column >= self.width {
            return;
        }
        let y0 = y0.max(0);
        let y1 = y1.min(self.height as i32 - 1);
        let mut idx = y0 as usize * self.width + column;
        for _y in y0..=y1 {
            self.pixels[idx] = color;
            idx += self.width;
        }
    }

    /// Textured wall strip with side shading.
    pub fn textured_strip(&mut self, strip: &WallStrip, texture: &Texture) {
        if strip.column >= self.width {
            return;
        }
        let y1 = strip.draw_end.min(self.height as i32 - 1);
        let mut idx = strip.draw_start.max(0) as usize * self.width + strip.column;
        for y in strip.draw_start.max(0)..=y1 {
            let texel = texture.sample(strip.tex_x, strip.tex_y(y, texture.height));
            self.pixels[idx] = shade(texel, strip.side);
            idx += self.width;
        }
    }

    /// Write the frame as a PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        let img = image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.pixel(x as usize, y as usize);
            image::Rgb([(c >> 16) as u8, (c >> 8) as u8, c as u8])
        });
        img.save(path)
    }
}

/// Per-frame rendering choices taken from the config and runtime toggles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub mode: RenderMode,
    pub floor_texture: Option<usize>,
    pub ceiling_texture: Option<usize>,
    pub floor_color: u32,
    pub ceiling_color: u32,
}

impl From<&Config> for RenderSettings {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.render_mode,
            floor_texture: config.floor_texture,
            ceiling_texture: config.ceiling_texture,
            floor_color: config.floor_color.packed(),
            ceiling_color: config.ceiling_color.packed(),
        }
    }
}

impl RenderSettings {
    /// Floor/ceiling texture ids with nothing loaded behind them; those passes keep the
    /// flat colour.
    pub fn unresolved_textures(&self, textures: &TextureSet) -> Vec<(&'static str, usize)> {
        [("floor", self.floor_texture), ("ceiling", self.ceiling_texture)]
            .into_iter()
            .filter_map(|(surface, id)| id.map(|id| (surface, id)))
            .filter(|&(_, id)| textures.get(id).is_none())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub walls: usize,
    pub escaped: usize,
}

/// Flat-mode wall colour by tile value.
pub fn flat_color(tile: Tile) -> u32 {
    match tile {
        1 => pack_rgb(255, 0, 0),
        2 => pack_rgb(0, 255, 0),
        3 => pack_rgb(0, 0, 255),
        4 => pack_rgb(255, 255, 255),
        _ => pack_rgb(255, 255, 0),
    }
}

/// Cast and project every column. `None` marks a ray that left the grid.
pub fn cast_columns(
    grid: &Grid,
    camera: &CameraState,
    width: usize,
    height: usize,
    tex: TextureSize,
) -> Vec<Option<WallStrip>> {
    (0..width)
        .into_par_iter()
        .map(|x| match cast_ray(grid, camera, camera_offset(x, width)) {
            Ok(hit) => Some(project_wall(camera, &hit, x, height, tex)),
            Err(err) => {
                tracing::trace!(column = x, %err, "no wall for column");
                None
            }
        })
        .collect()
}

pub fn render_frame(
    frame: &mut FrameBuffer,
    grid: &Grid,
    camera: &CameraState,
    textures: &TextureSet,
    settings: &RenderSettings,
) -> FrameStats {
    // Workers only ever see this copy.
    let camera = *camera;
    let (width, height) = (frame.width, frame.height);
    if width == 0 || height == 0 {
        return FrameStats::default();
    }
    let tex = textures.size();

    let strips = cast_columns(grid, &camera, width, height, tex);

    frame.clear_halves(settings.ceiling_color, settings.floor_color);

    if settings.mode == RenderMode::Textured {
        let floor_tex = settings.floor_texture.and_then(|id| textures.get(id));
        let ceil_tex = settings.ceiling_texture.and_then(|id| textures.get(id));
        if floor_tex.is_some() || ceil_tex.is_some() {
            let mid = height / 2;
            frame
                .pixels
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    // Ceiling rows reuse the floor mapping of their mirror row.
                    let (source_row, texture, is_floor) = if y > mid {
                        (y, floor_tex, true)
                    } else {
                        (height - 1 - y, ceil_tex, false)
                    };
                    let (Some(texture), Some(floor_row)) =
                        (texture, project_floor_row(&camera, source_row, width, height))
                    else {
                        return;
                    };
                    let yi = y as i32;
                    for (x, px) in row.iter_mut().enumerate() {
                        let covered = strips[x].is_some_and(|s| {
                            if is_floor {
                                yi <= s.draw_end
                            } else {
                                yi >= s.draw_start
                            }
                        });
                        if covered {
                            continue;
                        }
                        let sample = floor_row.sample(x, tex);
                        *px = texture.sample(sample.tex_x, sample.tex_y);
                    }
                });
        }
    }

    let mut stats = FrameStats::default();
    for strip in &strips {
        let Some(strip) = strip else {
            stats.escaped += 1;
            continue;
        };
        stats.walls += 1;
        match settings.mode {
            RenderMode::Flat => {
                let color = shade(flat_color(strip.tile), strip.side);
                frame.vertical_line(strip.column, strip.draw_start, strip.draw_end, color);
            }
            RenderMode::Textured => match textures.get(strip.texture_id) {
                Some(texture) => frame.textured_strip(strip, texture),
                None => frame.vertical_line(
                    strip.column,
                    strip.draw_start,
                    strip.draw_end,
                    textures.fallback(),
                ),
            },
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::Side;

    const TEX: TextureSize = TextureSize {
        width: 8,
        height: 8,
    };

    fn settings(mode: RenderMode) -> RenderSettings {
        RenderSettings {
            mode,
            floor_texture: None,
            ceiling_texture: None,
            floor_color: 0x0000_0011,
            ceiling_color: 0x0000_0022,
        }
    }

    #[test]
    fn vertical_line_is_clipped() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.vertical_line(1, -5, 10, 7);
        assert!((0..4).all(|y| fb.pixel(1, y) == 7));
        assert_eq!(fb.pixel(0, 0), 0);
        fb.vertical_line(9, 0, 3, 7); // off-screen column is ignored
    }

    #[test]
    fn clear_splits_at_horizon() {
        let mut fb = FrameBuffer::new(2, 4);
        fb.clear_halves(1, 2);
        assert_eq!(fb.pixel(0, 1), 1);
        assert_eq!(fb.pixel(0, 2), 2);
    }

    #[test]
    fn flat_mode_uses_palette_and_side_shading() {
        let grid = Grid::parse("11111\n10001\n10001\n10001\n11111").unwrap();
        let cam = CameraState::new([2.5, 2.5], [-1.0, 0.0], 0.6);
        let textures = TextureSet::procedural(TEX, 0);
        let mut fb = FrameBuffer::new(32, 24);
        let stats = render_frame(&mut fb, &grid, &cam, &textures, &settings(RenderMode::Flat));
        assert_eq!(stats.walls, 32);
        assert_eq!(stats.escaped, 0);
        // Centre column looks straight at the west wall (an X side): full red.
        assert_eq!(fb.pixel(16, 12), flat_color(1));
    }

    #[test]
    fn missing_texture_draws_fallback() {
        let grid = Grid::parse("11111\n10001\n10001\n10001\n11111").unwrap();
        let cam = CameraState::new([2.5, 2.5], [-1.0, 0.0], 0.6);
        let textures = TextureSet::new(TEX, vec![None], 0x00AB_CDEF);
        let mut fb = FrameBuffer::new(16, 16);
        render_frame(&mut fb, &grid, &cam, &textures, &settings(RenderMode::Textured));
        assert_eq!(fb.pixel(8, 8), 0x00AB_CDEF);
    }

    #[test]
    fn textured_y_side_is_half_texel() {
        let grid = Grid::parse("11111\n10001\n10001\n11111").unwrap();
        let cam = CameraState::new([2.5, 1.5], [0.0, 1.0], 0.6);
        let texel = 0x00C8_6432;
        let textures = TextureSet::new(TEX, vec![Some(Texture::solid(TEX, texel))], 0);
        let mut fb = FrameBuffer::new(20, 20);
        render_frame(&mut fb, &grid, &cam, &textures, &settings(RenderMode::Textured));
        assert_eq!(fb.pixel(10, 10), shade(texel, Side::Y));
        assert_eq!(fb.pixel(10, 10), 0x0064_3219);
    }

    #[test]
    fn textured_x_side_is_full_texel() {
        let grid = Grid::parse("11111\n10001\n10001\n10001\n11111").unwrap();
        let cam = CameraState::new([2.5, 2.5], [-1.0, 0.0], 0.6);
        let texel = 0x00C8_6432;
        let textures = TextureSet::new(TEX, vec![Some(Texture::solid(TEX, texel))], 0);
        let mut fb = FrameBuffer::new(20, 20);
        render_frame(&mut fb, &grid, &cam, &textures, &settings(RenderMode::Textured));
        assert_eq!(fb.pixel(10, 10), texel);
    }

    #[test]
    fn textured_strip_samples_column_and_rows() {
        // Red encodes the texture column, green the texture row.
        let mut gradient = Texture::solid(TEX, 0);
        for v in 0..TEX.height {
            for u in 0..TEX.width {
                gradient.texels[v * TEX.width + u] = pack_rgb(u as u8 * 16, v as u8 * 16, 0);
            }
        }
        let grid = Grid::parse("11111\n10001\n10001\n10001\n11111").unwrap();
        let cam = CameraState::new([2.5, 2.5], [-1.0, 0.0], 0.6);
        let textures = TextureSet::new(TEX, vec![Some(gradient)], 0);
        let mut fb = FrameBuffer::new(20, 20);
        render_frame(&mut fb, &grid, &cam, &textures, &settings(RenderMode::Textured));

        // Wall 1.5 away: line height 13, rows 4..=16. The centre ray meets the face at
        // y = 2.5, half way across, so texture column 4.
        assert_eq!(fb.pixel(10, 4), pack_rgb(64, 0, 0));
        assert_eq!(fb.pixel(10, 16), pack_rgb(64, 112, 0));
        // Column 15 leans toward +y and meets the face at y = 2.95: column 7, mid rows.
        assert_eq!(fb.pixel(15, 10), pack_rgb(112, 64, 0));
    }

    #[test]
    fn textured_floor_fills_below_walls() {
        let grid = Grid::parse("11111\n10001\n10001\n10001\n11111").unwrap();
        let cam = CameraState::new([2.5, 2.5], [-1.0, 0.0], 0.6);
        let textures = TextureSet::new(TEX, vec![Some(Texture::solid(TEX, 0x0000_0099))], 0);
        let mut fb = FrameBuffer::new(16, 64);
        let s = RenderSettings {
            floor_texture: Some(0),
            ceiling_texture: Some(0),
            ..settings(RenderMode::Textured)
        };
        render_frame(&mut fb, &grid, &cam, &textures, &s);
        // Wall is 1.5 away: strip spans rows ~11..53, so the bottom and top rows are floor
        // and ceiling.
        assert_eq!(fb.pixel(8, 63), 0x0000_0099);
        assert_eq!(fb.pixel(8, 0), 0x0000_0099);
    }

    #[test]
    fn unresolved_floor_and_ceiling_ids() {
        let textures = TextureSet::new(TEX, vec![Some(Texture::solid(TEX, 1)), None], 0);
        let mut s = RenderSettings {
            floor_texture: Some(0),
            ceiling_texture: Some(1),
            ..settings(RenderMode::Textured)
        };
        assert_eq!(s.unresolved_textures(&textures), vec![("ceiling", 1)]);
        s.floor_texture = Some(9);
        s.ceiling_texture = None;
        assert_eq!(s.unresolved_textures(&textures), vec![("floor", 9)]);
    }

    #[test]
    fn escaped_rays_leave_background() {
        let grid = Grid::parse("000\n000\n000").unwrap();
        let cam = CameraState::new([1.5, 1.5], [1.0, 0.0], 0.6);
        let textures = TextureSet::procedural(TEX, 0);
        let mut fb = FrameBuffer::new(8, 8);
        let stats = render_frame(&mut fb, &grid, &cam, &textures, &settings(RenderMode::Textured));
        assert_eq!(stats.escaped, 8);
        assert_eq!(fb.pixel(4, 0), 0x0000_0022);
        assert_eq!(fb.pixel(4, 7), 0x0000_0011);
    }

    #[test]
    fn snapshot_roundtrips_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut fb = FrameBuffer::new(3, 2);
        fb.clear_halves(pack_rgb(1, 2, 3), pack_rgb(4, 5, 6));
        fb.save_png(&path).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(2, 1).0, [4, 5, 6]);
    }
}
