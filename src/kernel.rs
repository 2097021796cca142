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
use crate::pic_convolve_error::PicConvolveError;
use std::fmt::Display;
use std::str::FromStr;

/// Fixed 3x3 matrix of convolution weights, row-major, centered on the target pixel
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Kernel {
    weights: [[f32; 3]; 3],
}

impl Kernel {
    /// Uniform 1/9 box blur
    pub const BLUR: Kernel = Kernel::new([[1.0 / 9.0; 3]; 3]);
    /// 4-neighbour Laplacian, weights sum to zero
    pub const LAPLACE: Kernel = Kernel::new([[0., 1., 0.], [1., -4., 1.], [0., 1., 0.]]);
    pub const SHARPEN: Kernel = Kernel::new([[0., -1., 0.], [-1., 5., -1.], [0., -1., 0.]]);

    pub const fn new(weights: [[f32; 3]; 3]) -> Kernel {
        Kernel { weights }
    }

    /// Weight at kernel row `ky` and column `kx`, both in `0..3`
    #[inline(always)]
    pub fn weight(&self, ky: usize, kx: usize) -> f32 {
        self.weights[ky][kx]
    }

    #[inline]
    pub fn center(&self) -> f32 {
        self.weights[1][1]
    }

    pub fn weights(&self) -> &[[f32; 3]; 3] {
        &self.weights
    }

    /// True when all nine weights add up to exactly zero, summed in row-major order.
    pub fn is_zero_sum(&self) -> bool {
        self.weights.iter().flatten().fold(0f32, |acc, &w| acc + w) == 0f32
    }
}

/// The three supported filters
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum FilterKind {
    Blur,
    Laplace,
    Sharpen,
}

impl FilterKind {
    /// All filters, in worker rank order
    pub const ALL: [FilterKind; 3] = [FilterKind::Blur, FilterKind::Laplace, FilterKind::Sharpen];

    pub fn kernel(&self) -> Kernel {
        match self {
            FilterKind::Blur => Kernel::BLUR,
            FilterKind::Laplace => Kernel::LAPLACE,
            FilterKind::Sharpen => Kernel::SHARPEN,
        }
    }

    /// Name accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Blur => "blur",
            FilterKind::Laplace => "laplace",
            FilterKind::Sharpen => "sharpening",
        }
    }

    /// Distributed worker rank owning this filter, ranks start at 1
    pub fn rank(&self) -> usize {
        match self {
            FilterKind::Blur => 1,
            FilterKind::Laplace => 2,
            FilterKind::Sharpen => 3,
        }
    }

    pub fn for_rank(rank: usize) -> Option<FilterKind> {
        match rank {
            1 => Some(FilterKind::Blur),
            2 => Some(FilterKind::Laplace),
            3 => Some(FilterKind::Sharpen),
            _ => None,
        }
    }
}

impl FromStr for FilterKind {
    type Err = PicConvolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blur" => Ok(FilterKind::Blur),
            "laplace" => Ok(FilterKind::Laplace),
            "sharpening" => Ok(FilterKind::Sharpen),
            _ => Err(PicConvolveError::UnknownFilter(s.to_string())),
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_laplace_is_zero_sum() {
        assert!(Kernel::LAPLACE.is_zero_sum());
        assert!(!Kernel::BLUR.is_zero_sum());
        assert!(!Kernel::SHARPEN.is_zero_sum());
    }

    #[test]
    fn parses_exactly_three_names() {
        assert_eq!("blur".parse::<FilterKind>().unwrap(), FilterKind::Blur);
        assert_eq!("laplace".parse::<FilterKind>().unwrap(), FilterKind::Laplace);
        assert_eq!(
            "sharpening".parse::<FilterKind>().unwrap(),
            FilterKind::Sharpen
        );
        for bad in ["sharpen", "Blur", "", "emboss"] {
            assert!(matches!(
                bad.parse::<FilterKind>(),
                Err(PicConvolveError::UnknownFilter(_))
            ));
        }
    }

    #[test]
    fn ranks_round_trip() {
        for kind in FilterKind::ALL {
            assert_eq!(FilterKind::for_rank(kind.rank()), Some(kind));
        }
        assert_eq!(FilterKind::for_rank(0), None);
        assert_eq!(FilterKind::for_rank(4), None);
    }
}
