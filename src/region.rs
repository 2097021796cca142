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
use std::ops::Range;

/// Number of regions produced by [partition_quadrants]
pub const QUADRANTS: usize = 4;

/// Rectangle `[start_row, end_row) x [start_col, end_col)` in pixel coordinates
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Region {
    pub fn new(start_row: usize, end_row: usize, start_col: usize, end_col: usize) -> Region {
        Region {
            start_row,
            end_row,
            start_col,
            end_col,
        }
    }

    /// Region covering the whole image
    pub fn full(size: ImageSize) -> Region {
        Region::new(0, size.height, 0, size.width)
    }

    /// Shrinks the region so it lies inside `size`
    pub fn clamp_to(&self, size: ImageSize) -> Region {
        let end_row = self.end_row.min(size.height);
        let end_col = self.end_col.min(size.width);
        Region::new(
            self.start_row.min(end_row),
            end_row,
            self.start_col.min(end_col),
            end_col,
        )
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.end_col.saturating_sub(self.start_col)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.end_row.saturating_sub(self.start_row)
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row.max(self.start_row)
    }

    pub fn cols(&self) -> Range<usize> {
        self.start_col..self.end_col.max(self.start_col)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }
}

/// Splits the image at its integer midpoints into
/// top-left, top-right, bottom-left and bottom-right quadrants.
///
/// Quadrants may be empty when a dimension is 1, they never overlap
/// and together cover every pixel exactly once.
pub fn partition_quadrants(size: ImageSize) -> [Region; QUADRANTS] {
    let mid_row = size.height / 2;
    let mid_col = size.width / 2;
    [
        Region::new(0, mid_row, 0, mid_col),
        Region::new(0, mid_row, mid_col, size.width),
        Region::new(mid_row, size.height, 0, mid_col),
        Region::new(mid_row, size.height, mid_col, size.width),
    ]
    .map(|region| region.clamp_to(size))
}
