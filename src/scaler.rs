use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source column/row for every destination pixel. Nearest-neighbour keeps
/// texels crisp when the window is larger than the render resolution.
pub struct ScaleLut {
    dst_w: usize,
    dst_h: usize,
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            dst_w: 0,
            dst_h: 0,
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }

    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        let axis = |dst: usize, src: usize| -> Vec<usize> {
            (0..dst)
                .map(|d| ((d * src) / dst.max(1)).min(src.saturating_sub(1)))
                .collect()
        };
        Self {
            dst_w,
            dst_h,
            src_x: axis(dst_w, src_w),
            src_y: axis(dst_h, src_h),
        }
    }

    /// Whether this table was built for the given destination size.
    pub fn matches(&self, dst_w: usize, dst_h: usize) -> bool {
        self.dst_w == dst_w && self.dst_h == dst_h
    }
}

/// Stretch `src` (row-major, `src_w` wide) into `dst`, rows in parallel.
pub fn blit_nearest(dst: &mut [u32], src: &[u32], src_w: usize, lut: &ScaleLut) {
    if lut.dst_w == 0 {
        return;
    }
    dst.par_chunks_mut(lut.dst_w)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let Some(&sy) = lut.src_y.get(y) else {
                return;
            };
            let src_row = &src[sy * src_w..(sy + 1) * src_w];
            for (px, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
                *px = src_row[sx];
            }
        });
}
