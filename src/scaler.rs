use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source index per destination pixel, one table per axis.
pub struct StretchLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl StretchLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }

    /// Nearest-neighbor mapping that centers each destination pixel over the
    /// source grid.
    pub fn build(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        let map_axis = |dst: usize, src: usize| -> Vec<usize> {
            let scale = src as f32 / dst.max(1) as f32;
            (0..dst)
                .map(|i| (((i as f32 + 0.5) * scale) as usize).min(src - 1))
                .collect()
        };
        Self {
            src_x: map_axis(dst_w, src_w),
            src_y: map_axis(dst_h, src_h),
        }
    }
}

/// Stretch the internal framebuffer over the window surface. Rows are
/// processed in parallel for cache friendly writes.
pub fn blit_stretch(dst: &mut [u32], dst_w: usize, src: &[u32], src_w: usize, lut: &StretchLut) {
    dst.par_chunks_mut(dst_w).enumerate().for_each(|(y, dst_row)| {
        let src_row = lut.src_y[y] * src_w;
        for (x, pixel) in dst_row.iter_mut().enumerate() {
            *pixel = src[src_row + lut.src_x[x]];
        }
    });
}
