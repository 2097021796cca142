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
use crate::filterer::{FilterSet, MultiFiltering};
use crate::image_store::ImageStore;
use crate::kernel::FilterKind;
use crate::pic_convolve_error::PicConvolveError;
use crate::threading_policy::ThreadingPolicy;
use log::debug;

/// Runs blur, laplace and sharpen concurrently, each on its own private copy
/// of the source. The tasks share no mutable state.
#[derive(Debug, Copy, Clone, Default)]
pub struct ForkJoinFilterer {
    pub(crate) threading_policy: ThreadingPolicy,
}

impl ForkJoinFilterer {
    pub fn new(threading_policy: ThreadingPolicy) -> Self {
        ForkJoinFilterer { threading_policy }
    }

    pub fn set_threading_policy(&mut self, threading_policy: ThreadingPolicy) {
        self.threading_policy = threading_policy;
    }
}

fn filtered_copy(store: &ImageStore, kind: FilterKind) -> Result<ImageStore, PicConvolveError> {
    let mut copy = store.clone();
    debug!("fork-join task {kind} started");
    copy.apply_filter(kind)?;
    Ok(copy)
}

impl MultiFiltering for ForkJoinFilterer {
    fn filter_all(&self, store: &ImageStore) -> Result<FilterSet, PicConvolveError> {
        let pool = self.threading_policy.get_pool(store.size())?;

        let run = || {
            rayon::join(
                || filtered_copy(store, FilterKind::Blur),
                || {
                    rayon::join(
                        || filtered_copy(store, FilterKind::Laplace),
                        || filtered_copy(store, FilterKind::Sharpen),
                    )
                },
            )
        };

        let (blur, (laplace, sharpen)) = match pool {
            Some(pool) => pool.install(run),
            None => (
                filtered_copy(store, FilterKind::Blur),
                (
                    filtered_copy(store, FilterKind::Laplace),
                    filtered_copy(store, FilterKind::Sharpen),
                ),
            ),
        };

        Ok(FilterSet {
            blur: blur?,
            laplace: laplace?,
            sharpen: sharpen?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filterer::SequentialFilterer;
    use crate::image_store::PixelFormat;

    #[test]
    fn every_policy_matches_sequential() {
        let samples: Vec<i32> = (0..5 * 4 * 3).map(|i| (i * 71) % 256).collect();
        let store = ImageStore::from_data(PixelFormat::Color, 5, 4, 255, &samples).unwrap();
        let expected = SequentialFilterer::new().filter_all(&store).unwrap();
        for policy in [
            ThreadingPolicy::Single,
            ThreadingPolicy::Fixed(2),
            ThreadingPolicy::Fixed(3),
            ThreadingPolicy::Adaptive,
        ] {
            let actual = ForkJoinFilterer::new(policy).filter_all(&store).unwrap();
            assert_eq!(actual, expected, "{policy:?}");
        }
        assert_eq!(store.samples(), samples.as_slice());
    }
}
