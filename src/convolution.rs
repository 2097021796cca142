/*
 * Copyright (c) Radzivon Bartoshyk. All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1.  Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2.  Redistributions in binary form must reproduce the above copyright notice,
 * this list of conditions and the following disclaimer in the documentation
 * and/or other materials provided with the distribution.
 *
 * 3.  Neither the name of the copyright holder nor the names of its
 * contributors may be used to endorse or promote products derived from
 * this software without specific prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::ImageSize;
use crate::image_store::{ImageStore, PixelBuffer, PixelFormat};
use crate::kernel::Kernel;
use crate::pic_convolve_error::{PicConvolveBufferMismatch, PicConvolveError, try_vec};
use crate::region::Region;
use num_traits::{AsPrimitive, clamp};

/// Post-processing of the truncated sum before it is clamped
#[derive(Debug, Copy, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Rectification {
    /// Negative sums clamp to zero
    #[default]
    None,
    /// For zero-sum kernels the absolute value is taken before clamping,
    /// so negative Laplace responses survive as edge magnitude.
    MagnitudeOfZeroSum,
    /// [Rectification::MagnitudeOfZeroSum] for color images only, grayscale
    /// sums clamp as with [Rectification::None].
    /// The partitioned shared-memory driver uses this by default.
    MagnitudeOfZeroSumColor,
}

impl Rectification {
    #[inline]
    fn applies_to(&self, kernel: &Kernel, format: PixelFormat) -> bool {
        match self {
            Rectification::None => false,
            Rectification::MagnitudeOfZeroSum => kernel.is_zero_sum(),
            Rectification::MagnitudeOfZeroSumColor => {
                format == PixelFormat::Color && kernel.is_zero_sum()
            }
        }
    }
}

/// Applies one 3x3 kernel with zero padding at the borders.
///
/// Weights are stored as `f32`, products are accumulated in `f64` in kernel
/// row-major order, then truncated toward zero and clamped to
/// `[0, max_value]`. Every driver goes through this type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConvolutionEngine {
    kernel: Kernel,
    rectification: Rectification,
}

impl ConvolutionEngine {
    pub fn new(kernel: Kernel) -> Self {
        ConvolutionEngine {
            kernel,
            rectification: Rectification::None,
        }
    }

    pub fn with_rectification(mut self, rectification: Rectification) -> Self {
        self.rectification = rectification;
        self
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn rectification(&self) -> Rectification {
        self.rectification
    }

    /// Computes the output sample(s) of pixel (`row`, `col`) into `out`,
    /// which must hold exactly one value per channel.
    pub fn convolve_at(
        &self,
        store: &ImageStore,
        row: usize,
        col: usize,
        out: &mut [i32],
    ) -> Result<(), PicConvolveError> {
        let size = store.size();
        if out.len() != store.channels() {
            return Err(PicConvolveError::BufferMismatch(PicConvolveBufferMismatch {
                expected: store.channels(),
                width: 1,
                height: 1,
                channels: store.channels(),
                slice_len: out.len(),
            }));
        }
        if row >= size.height || col >= size.width {
            return Err(PicConvolveError::PixelOutOfBounds {
                row,
                col,
                width: size.width,
                height: size.height,
            });
        }
        let region = Region::new(row, row + 1, col, col + 1);
        self.dispatch(store, &region, out);
        Ok(())
    }

    /// Convolves `region` into a scratch buffer sized to the clamped region.
    ///
    /// Neighbours are read from `store` only, so pixels across the region
    /// border contribute their unfiltered values.
    pub fn convolve_region(
        &self,
        store: &ImageStore,
        region: &Region,
    ) -> Result<Vec<i32>, PicConvolveError> {
        let region = region.clamp_to(store.size());
        let mut scratch = try_vec![0i32; region.area() * store.channels()];
        self.dispatch(store, &region, &mut scratch);
        Ok(scratch)
    }

    /// Convolves the whole image into a new buffer; `store` is left untouched.
    pub fn convolve_image(&self, store: &ImageStore) -> Result<PixelBuffer, PicConvolveError> {
        let region = Region::full(store.size());
        let samples = self.convolve_region(store, &region)?;
        PixelBuffer::from_vec(samples, store.size(), store.channels())
    }

    #[inline]
    fn dispatch(&self, store: &ImageStore, region: &Region, dst: &mut [i32]) {
        let rectify = self.rectification.applies_to(&self.kernel, store.format());
        let src = store.samples();
        let size = store.size();
        let max_value = store.max_value();
        match store.format() {
            PixelFormat::Grayscale => convolve_region_impl::<1>(
                src,
                size,
                max_value,
                &self.kernel,
                rectify,
                region,
                dst,
            ),
            PixelFormat::Color => convolve_region_impl::<3>(
                src,
                size,
                max_value,
                &self.kernel,
                rectify,
                region,
                dst,
            ),
        }
    }
}

#[inline(always)]
fn accumulate_pixel<const CN: usize>(
    src: &[i32],
    size: ImageSize,
    kernel: &Kernel,
    row: usize,
    col: usize,
) -> [f64; CN] {
    let mut sums = [0f64; CN];
    for ky in 0..3 {
        // Out of bounds neighbours contribute nothing.
        let Some(ny) = (row + ky).checked_sub(1) else {
            continue;
        };
        if ny >= size.height {
            continue;
        }
        for kx in 0..3 {
            let Some(nx) = (col + kx).checked_sub(1) else {
                continue;
            };
            if nx >= size.width {
                continue;
            }
            let weight: f64 = kernel.weight(ky, kx).as_();
            let px = (ny * size.width + nx) * CN;
            for (sum, &sample) in sums.iter_mut().zip(&src[px..px + CN]) {
                let sample: f64 = sample.as_();
                *sum += sample * weight;
            }
        }
    }
    sums
}

#[inline(always)]
fn narrow(sum: f64, rectify: bool, max_value: i32) -> i32 {
    // `as` truncates toward zero and saturates at the i32 range
    let mut value: i32 = sum.as_();
    if rectify {
        value = value.saturating_abs();
    }
    clamp(value, 0, max_value)
}

/// # Generics
/// `CN` - samples per pixel
fn convolve_region_impl<const CN: usize>(
    src: &[i32],
    size: ImageSize,
    max_value: i32,
    kernel: &Kernel,
    rectify: bool,
    region: &Region,
    dst: &mut [i32],
) {
    if region.is_empty() {
        return;
    }
    let region_stride = region.width() * CN;
    for (row, dst_row) in region.rows().zip(dst.chunks_exact_mut(region_stride)) {
        for (col, dst_px) in region.cols().zip(dst_row.chunks_exact_mut(CN)) {
            let sums = accumulate_pixel::<CN>(src, size, kernel, row, col);
            for (dst, sum) in dst_px.iter_mut().zip(sums) {
                *dst = narrow(sum, rectify, max_value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: usize, height: usize, samples: &[i32]) -> ImageStore {
        ImageStore::from_data(PixelFormat::Grayscale, width, height, 255, samples).unwrap()
    }

    fn impulse() -> ImageStore {
        gray(3, 3, &[0, 0, 0, 0, 255, 0, 0, 0, 0])
    }

    #[test]
    fn uniform_interior_is_blur_fixed_point() {
        let store = gray(3, 3, &[255; 9]);
        let out = ConvolutionEngine::new(Kernel::BLUR)
            .convolve_image(&store)
            .unwrap();
        assert_eq!(out.get(1, 1, 0), 255);
        // corners see four of nine neighbours, edges six
        assert_eq!(out.get(0, 0, 0), 113);
        assert_eq!(out.get(0, 1, 0), 170);
        assert_eq!(out.get(2, 2, 0), 113);
    }

    #[test]
    fn uniform_interior_fixed_point_for_every_level() {
        let engine = ConvolutionEngine::new(Kernel::BLUR);
        for level in [0, 1, 5, 7, 10, 28, 99, 128, 254, 255] {
            let store = gray(3, 3, &[level; 9]);
            let out = engine.convolve_image(&store).unwrap();
            assert_eq!(out.get(1, 1, 0), level, "level {level}");
        }
    }

    #[test]
    fn laplace_impulse_without_rectification() {
        let out = ConvolutionEngine::new(Kernel::LAPLACE)
            .convolve_image(&impulse())
            .unwrap();
        assert_eq!(out.as_slice(), &[0, 255, 0, 255, 0, 255, 0, 255, 0]);
    }

    #[test]
    fn laplace_impulse_with_rectification() {
        let out = ConvolutionEngine::new(Kernel::LAPLACE)
            .with_rectification(Rectification::MagnitudeOfZeroSum)
            .convolve_image(&impulse())
            .unwrap();
        assert_eq!(out.as_slice(), &[0, 255, 0, 255, 255, 255, 0, 255, 0]);
    }

    #[test]
    fn color_rectification_skips_grayscale() {
        let engine = ConvolutionEngine::new(Kernel::LAPLACE)
            .with_rectification(Rectification::MagnitudeOfZeroSumColor);
        let out = engine.convolve_image(&impulse()).unwrap();
        assert_eq!(out.as_slice(), &[0, 255, 0, 255, 0, 255, 0, 255, 0]);

        let mut samples = vec![0; 27];
        samples[4 * 3..4 * 3 + 3].copy_from_slice(&[255, 255, 255]);
        let store = ImageStore::from_data(PixelFormat::Color, 3, 3, 255, &samples).unwrap();
        let out = engine.convolve_image(&store).unwrap();
        for channel in 0..3 {
            assert_eq!(out.get(1, 1, channel), 255);
            assert_eq!(out.get(0, 1, channel), 255);
            assert_eq!(out.get(0, 0, channel), 0);
        }
    }

    #[test]
    fn rectification_ignores_non_zero_sum_kernels() {
        let store = gray(3, 1, &[255, 0, 255]);
        let plain = ConvolutionEngine::new(Kernel::SHARPEN)
            .convolve_image(&store)
            .unwrap();
        let rectified = ConvolutionEngine::new(Kernel::SHARPEN)
            .with_rectification(Rectification::MagnitudeOfZeroSum)
            .convolve_image(&store)
            .unwrap();
        assert_eq!(plain, rectified);
        assert_eq!(plain.as_slice(), &[255, 0, 255]);
    }

    #[test]
    fn single_pixel_sees_only_center_weight() {
        for kernel in [Kernel::BLUR, Kernel::LAPLACE, Kernel::SHARPEN] {
            for sample in [0, 1, 40, 100, 255] {
                let store = gray(1, 1, &[sample]);
                let out = ConvolutionEngine::new(kernel).convolve_image(&store).unwrap();
                let expected = clamp((kernel.center() as f64 * sample as f64) as i32, 0, 255);
                assert_eq!(out.as_slice(), &[expected]);
            }
        }
    }

    #[test]
    fn output_is_always_clamped() {
        let samples: Vec<i32> = (0..48).map(|i| (i * 97) % 256).collect();
        let store = ImageStore::from_data(PixelFormat::Color, 4, 4, 255, &samples).unwrap();
        for kernel in [Kernel::BLUR, Kernel::LAPLACE, Kernel::SHARPEN] {
            for rectification in [Rectification::None, Rectification::MagnitudeOfZeroSum] {
                let out = ConvolutionEngine::new(kernel)
                    .with_rectification(rectification)
                    .convolve_image(&store)
                    .unwrap();
                assert!(out.as_slice().iter().all(|&s| (0..=255).contains(&s)));
            }
        }
    }

    #[test]
    fn color_channels_are_independent() {
        // red carries an impulse, green is flat, blue is empty
        let mut samples = vec![0; 27];
        for px in 0..9 {
            samples[px * 3 + 1] = 90;
        }
        samples[4 * 3] = 200;
        let store = ImageStore::from_data(PixelFormat::Color, 3, 3, 255, &samples).unwrap();
        let out = ConvolutionEngine::new(Kernel::SHARPEN)
            .convolve_image(&store)
            .unwrap();
        assert_eq!(out.get(1, 1, 0), 255);
        assert_eq!(out.get(0, 1, 0), 0);
        assert_eq!(out.get(1, 1, 1), 90);
        assert!((0..9).all(|px| out.as_slice()[px * 3 + 2] == 0));
    }

    #[test]
    fn region_matches_whole_image_slice() {
        let samples: Vec<i32> = (0..30).map(|i| (i * 37) % 200).collect();
        let store = gray(6, 5, &samples);
        let engine = ConvolutionEngine::new(Kernel::SHARPEN);
        let whole = engine.convolve_image(&store).unwrap();
        let region = Region::new(1, 4, 2, 5);
        let scratch = engine.convolve_region(&store, &region).unwrap();
        assert_eq!(scratch.len(), region.area());
        for (i, row) in region.rows().enumerate() {
            for (j, col) in region.cols().enumerate() {
                assert_eq!(scratch[i * region.width() + j], whole.get(row, col, 0));
            }
        }
    }

    #[test]
    fn convolve_at_matches_image_pass() {
        let store = impulse();
        let engine = ConvolutionEngine::new(Kernel::LAPLACE);
        let mut out = [0i32; 1];
        engine.convolve_at(&store, 0, 1, &mut out).unwrap();
        assert_eq!(out, [255]);
        assert!(matches!(
            engine.convolve_at(&store, 5, 5, &mut out),
            Err(PicConvolveError::PixelOutOfBounds {
                row: 5,
                col: 5,
                ..
            })
        ));
        assert!(matches!(
            engine.convolve_at(&store, usize::MAX, 0, &mut out),
            Err(PicConvolveError::PixelOutOfBounds { .. })
        ));
        assert!(engine.convolve_at(&store, 0, 0, &mut [0, 0]).is_err());
    }

    #[test]
    fn convolution_is_deterministic() {
        let samples: Vec<i32> = (0..64).map(|i| (i * 131) % 256).collect();
        let store = gray(8, 8, &samples);
        let engine = ConvolutionEngine::new(Kernel::BLUR);
        let first = engine.convolve_image(&store).unwrap();
        for _ in 0..4 {
            assert_eq!(engine.convolve_image(&store).unwrap(), first);
        }
    }
}
