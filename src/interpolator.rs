use ndarray::ArrayView2;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Map an output pixel to source coordinates using pixel centres.
    #[inline]
    pub(crate) fn source_coordinate(dst: u32, dst_len: u32, src_len: usize) -> f32 {
        let norm = (dst as f32 + 0.5) / dst_len as f32;
        let src = norm * src_len as f32 - 0.5;
        src.max(0.0).min((src_len - 1) as f32)
    }

    #[inline]
    pub(crate) fn nearest(raster: &ArrayView2<u8>, y: f32, x: f32) -> u8 {
        let (height, width) = raster.dim();
        let y = (y.round() as usize).min(height - 1);
        let x = (x.round() as usize).min(width - 1);
        raster[[y, x]]
    }

    #[inline]
    pub(crate) fn bilinear_interpolate(raster: &ArrayView2<u8>, y: f32, x: f32) -> u8 {
        let (height, width) = raster.dim();

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f32;
        let dx = x - x0 as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = raster[[y0, x0]] as f32;
        let v01 = raster[[y0, x1]] as f32;
        let v10 = raster[[y1, x0]] as f32;
        let v11 = raster[[y1, x1]] as f32;

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);

        // Weights are convex, so the result stays within the four neighbours
        v0.mul_add(one_minus_dy, v1 * dy).round().clamp(0.0, 255.0) as u8
    }
}
