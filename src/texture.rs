use std::path::{Path, PathBuf};

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // 0x00RRGGBB, the softbuffer pixel layout
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSize {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub texels: Vec<u32>, // row-major
}

impl Texture {
    pub fn solid(size: TextureSize, color: u32) -> Self {
        Self {
            width: size.width,
            height: size.height,
            texels: vec![color; size.width * size.height],
        }
    }

    /// Decode an image file and resample it to `size`.
    pub fn load(path: &Path, size: TextureSize) -> Result<Self, TextureError> {
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgb = img.to_rgb8();
        let rgb = if rgb.width() as usize != size.width || rgb.height() as usize != size.height {
            image::imageops::resize(
                &rgb,
                size.width as u32,
                size.height as u32,
                image::imageops::FilterType::Nearest,
            )
        } else {
            rgb
        };
        let texels = rgb.pixels().map(|p| pack_rgb(p[0], p[1], p[2])).collect();
        Ok(Self {
            width: size.width,
            height: size.height,
            texels,
        })
    }

    /// Texel lookup; coordinates wrap.
    #[inline]
    pub fn sample(&self, u: usize, v: usize) -> u32 {
        self.texels[(v % self.height) * self.width + (u % self.width)]
    }
}

/// Wall and floor materials indexed by texture id (tile value - 1).
#[derive(Debug, Clone)]
pub struct TextureSet {
    size: TextureSize,
    slots: Vec<Option<Texture>>,
    fallback: u32,
}

impl TextureSet {
    pub fn new(size: TextureSize, slots: Vec<Option<Texture>>, fallback: u32) -> Self {
        Self {
            size,
            slots,
            fallback,
        }
    }

    /// Load every path; a file that fails to decode leaves an empty slot, drawn with the
    /// fallback colour.
    pub fn load(paths: &[PathBuf], size: TextureSize, fallback: u32) -> Self {
        let slots = paths
            .iter()
            .enumerate()
            .map(|(id, path)| match Texture::load(path, size) {
                Ok(tex) => Some(tex),
                Err(err) => {
                    tracing::warn!(id, %err, "texture unavailable, using fallback colour");
                    None
                }
            })
            .collect::<Vec<_>>();
        let loaded = slots.iter().filter(|s| s.is_some()).count();
        tracing::info!(loaded, requested = paths.len(), "loaded textures");
        Self::new(size, slots, fallback)
    }

    /// Nine generated patterns, so the viewer runs without any asset files.
    pub fn procedural(size: TextureSize, fallback: u32) -> Self {
        let slots = (0..9).map(|id| Some(generate(id, size))).collect();
        Self::new(size, slots, fallback)
    }

    #[inline]
    pub fn size(&self) -> TextureSize {
        self.size
    }

    #[inline]
    pub fn fallback(&self) -> u32 {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `None` when the id is out of range or its slot failed to load.
    #[inline]
    pub fn get(&self, id: usize) -> Option<&Texture> {
        self.slots.get(id).and_then(Option::as_ref)
    }
}

fn generate(id: usize, size: TextureSize) -> Texture {
    let (w, h) = (size.width, size.height);
    let mut texels = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            // Normalised to 0..=255 regardless of texture size.
            let fx = (x * 256 / w) as u32;
            let fy = (y * 256 / h) as u32;
            let xor = (fx ^ fy) as u8;
            let border = x == 0 || y == 0;
            let c = match id {
                0 => pack_rgb(xor / 2 + 100, 40, xor / 2 + 100),
                1 => pack_rgb(xor, xor / 2, 255 - xor),
                2 => {
                    if x == y || x + y == w.min(h) - 1 {
                        pack_rgb(240, 200, 60)
                    } else {
                        pack_rgb(40, 40, 160)
                    }
                }
                3 => pack_rgb(xor / 2 + 64, xor / 2 + 64, xor / 2 + 64),
                4 => pack_rgb(40, (xor / 2) + 96, 40),
                5 => pack_rgb(40, 60, (fy as u8 / 2) + 120),
                6 => {
                    // Brick courses, offset by half a brick on odd courses.
                    let course_h = (h / 8).max(1);
                    let brick_w = (w / 4).max(1);
                    let shift = if (y / course_h) % 2 == 0 { 0 } else { brick_w / 2 };
                    if y % course_h == 0 || (x + shift) % brick_w == 0 {
                        pack_rgb(180, 180, 180)
                    } else {
                        pack_rgb(160, 40, 30)
                    }
                }
                7 => pack_rgb(120 + (fx as u8 % 32), 80, 30),
                _ => pack_rgb(150, 110, (fx as u8) / 4 + 40),
            };
            texels.push(if border { (c >> 1) & 0x007F_7F7F } else { c });
        }
    }
    Texture {
        width: w,
        height: h,
        texels,
    }
}
