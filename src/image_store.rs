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
use crate::convolution::ConvolutionEngine;
use crate::kernel::FilterKind;
use crate::pic_convolve_error::{PicConvolveBufferMismatch, PicConvolveError, try_vec};
use crate::region::Region;

/// Sample layout of an image, carried next to its buffer
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    /// One sample per pixel, tagged `P2`
    Grayscale,
    /// Three samples per pixel, tagged `P3`
    Color,
}

impl PixelFormat {
    pub fn from_tag(tag: &str) -> Result<PixelFormat, PicConvolveError> {
        match tag {
            "P2" => Ok(PixelFormat::Grayscale),
            "P3" => Ok(PixelFormat::Color),
            _ => Err(PicConvolveError::UnknownFormatTag(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PixelFormat::Grayscale => "P2",
            PixelFormat::Color => "P3",
        }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Grayscale => 1,
            PixelFormat::Color => 3,
        }
    }
}

/// Exclusively owned, contiguous, row-major sample storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    samples: Vec<i32>,
    size: ImageSize,
    channels: usize,
}

impl PixelBuffer {
    /// Allocates a zero filled buffer
    pub fn alloc(size: ImageSize, channels: usize) -> Result<PixelBuffer, PicConvolveError> {
        let len = Self::checked_len(size, channels)?;
        let samples = try_vec![0i32; len];
        Ok(PixelBuffer {
            samples,
            size,
            channels,
        })
    }

    /// Copies `slice` into a freshly allocated buffer
    pub fn from_slice(
        slice: &[i32],
        size: ImageSize,
        channels: usize,
    ) -> Result<PixelBuffer, PicConvolveError> {
        Self::check_len(slice.len(), size, channels)?;
        let mut samples = try_vec![0i32; slice.len()];
        samples.copy_from_slice(slice);
        Ok(PixelBuffer {
            samples,
            size,
            channels,
        })
    }

    /// Takes ownership of `samples` without copying
    pub fn from_vec(
        samples: Vec<i32>,
        size: ImageSize,
        channels: usize,
    ) -> Result<PixelBuffer, PicConvolveError> {
        Self::check_len(samples.len(), size, channels)?;
        Ok(PixelBuffer {
            samples,
            size,
            channels,
        })
    }

    fn checked_len(size: ImageSize, channels: usize) -> Result<usize, PicConvolveError> {
        size.checked_len(channels)
            .ok_or(PicConvolveError::DimensionsOverflow {
                width: size.width,
                height: size.height,
                channels,
            })
    }

    fn check_len(len: usize, size: ImageSize, channels: usize) -> Result<(), PicConvolveError> {
        let expected = Self::checked_len(size, channels)?;
        if len != expected {
            return Err(PicConvolveError::BufferMismatch(PicConvolveBufferMismatch {
                expected,
                width: size.width,
                height: size.height,
                channels,
                slice_len: len,
            }));
        }
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        self.size
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples per row
    #[inline]
    pub fn stride(&self) -> usize {
        self.size.width * self.channels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Offset of the first sample of pixel (`row`, `col`)
    #[inline(always)]
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        (row * self.size.width + col) * self.channels
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> i32 {
        self.samples[self.index_of(row, col) + channel]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: i32) {
        let idx = self.index_of(row, col) + channel;
        self.samples[idx] = value;
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.samples
    }

    /// Copies a region-sized scratch buffer into this buffer at the region's coordinates.
    pub fn write_region(&mut self, region: &Region, scratch: &[i32]) -> Result<(), PicConvolveError> {
        let region = region.clamp_to(self.size);
        let region_stride = region.width() * self.channels;
        if scratch.len() != region.height() * region_stride {
            return Err(PicConvolveError::BufferMismatch(PicConvolveBufferMismatch {
                expected: region.height() * region_stride,
                width: region.width(),
                height: region.height(),
                channels: self.channels,
                slice_len: scratch.len(),
            }));
        }
        if region.is_empty() {
            return Ok(());
        }
        for (row, src_row) in region.rows().zip(scratch.chunks_exact(region_stride)) {
            let start = self.index_of(row, region.start_col);
            self.samples[start..start + region_stride].copy_from_slice(src_row);
        }
        Ok(())
    }
}

/// An image: format tag, dimensions, max sample value and its owned samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStore {
    pub(crate) buffer: PixelBuffer,
    pub(crate) format: PixelFormat,
    pub(crate) max_value: i32,
}

impl ImageStore {
    /// Creates a zero filled image of the given format
    pub fn new(
        format: PixelFormat,
        width: usize,
        height: usize,
        max_value: i32,
    ) -> Result<ImageStore, PicConvolveError> {
        let size = Self::validate(format, width, height, max_value)?;
        Ok(ImageStore {
            buffer: PixelBuffer::alloc(size, format.channels())?,
            format,
            max_value,
        })
    }

    /// Populates an image from a foreign sample array, always copying it
    pub fn from_data(
        format: PixelFormat,
        width: usize,
        height: usize,
        max_value: i32,
        samples: &[i32],
    ) -> Result<ImageStore, PicConvolveError> {
        let size = Self::validate(format, width, height, max_value)?;
        Ok(ImageStore {
            buffer: PixelBuffer::from_slice(samples, size, format.channels())?,
            format,
            max_value,
        })
    }

    fn validate(
        format: PixelFormat,
        width: usize,
        height: usize,
        max_value: i32,
    ) -> Result<ImageSize, PicConvolveError> {
        if width == 0 || height == 0 {
            return Err(PicConvolveError::ZeroImageDimensions);
        }
        if max_value <= 0 {
            return Err(PicConvolveError::InvalidMaxValue(max_value));
        }
        let size = ImageSize::new(width, height);
        if size.checked_len(format.channels()).is_none() {
            return Err(PicConvolveError::DimensionsOverflow {
                width,
                height,
                channels: format.channels(),
            });
        }
        Ok(size)
    }

    fn check_buffer(
        format: PixelFormat,
        size: ImageSize,
        buffer: &PixelBuffer,
    ) -> Result<(), PicConvolveError> {
        if buffer.size() != size || buffer.channels() != format.channels() {
            return Err(PicConvolveError::BufferMismatch(PicConvolveBufferMismatch {
                expected: size.checked_len(format.channels()).unwrap_or(usize::MAX),
                width: size.width,
                height: size.height,
                channels: format.channels(),
                slice_len: buffer.len(),
            }));
        }
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        self.buffer.size()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.buffer.size().width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.buffer.size().height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    #[inline]
    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn samples(&self) -> &[i32] {
        self.buffer.as_slice()
    }

    pub fn into_samples(self) -> Vec<i32> {
        self.buffer.into_vec()
    }

    #[inline]
    pub fn sample(&self, row: usize, col: usize, channel: usize) -> i32 {
        self.buffer.get(row, col, channel)
    }

    /// Swaps in a fully computed buffer of the same geometry, dropping the old one
    pub fn replace_buffer(&mut self, buffer: PixelBuffer) -> Result<(), PicConvolveError> {
        Self::check_buffer(self.format, self.size(), &buffer)?;
        self.buffer = buffer;
        Ok(())
    }

    /// Applies `kind` over the whole image.
    ///
    /// Every output is computed from the current samples into a new buffer,
    /// which replaces the old one only once the pass is complete.
    pub fn apply_filter(&mut self, kind: FilterKind) -> Result<(), PicConvolveError> {
        let filtered = ConvolutionEngine::new(kind.kernel()).convolve_image(self)?;
        self.replace_buffer(filtered)
    }
}
