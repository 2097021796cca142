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
use crate::convolution::{ConvolutionEngine, Rectification};
use crate::filterer::Filtering;
use crate::image_store::{ImageStore, PixelBuffer};
use crate::kernel::FilterKind;
use crate::pic_convolve_error::PicConvolveError;
use crate::region::{Region, partition_quadrants};
use log::debug;
use parking_lot::Mutex;
use std::thread;

/// Shared-memory driver: one OS thread per image quadrant.
///
/// Workers read the unmodified source buffer without locking, compute their
/// quadrant into a private scratch buffer, then copy it into the shared live
/// buffer under a single mutex. The live buffer replaces the source only
/// after every worker has written back.
///
/// Laplace output on color images differs from the other drivers here:
/// zero-sum kernels are rectified with [Rectification::MagnitudeOfZeroSumColor].
#[derive(Debug, Copy, Clone)]
pub struct PartitionedFilterer {
    rectification: Rectification,
}

impl Default for PartitionedFilterer {
    fn default() -> Self {
        PartitionedFilterer {
            rectification: Rectification::MagnitudeOfZeroSumColor,
        }
    }
}

impl PartitionedFilterer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the rectification, [Rectification::None] makes the output
    /// identical to the other drivers for every kernel.
    pub fn with_rectification(mut self, rectification: Rectification) -> Self {
        self.rectification = rectification;
        self
    }

    pub fn filter_in_place(
        &self,
        store: &mut ImageStore,
        kind: FilterKind,
    ) -> Result<(), PicConvolveError> {
        let engine = ConvolutionEngine::new(kind.kernel()).with_rectification(self.rectification);
        let regions = partition_quadrants(store.size());
        let live = Mutex::new(store.buffer().clone());

        let source: &ImageStore = store;
        let outcomes: Vec<Result<(), PicConvolveError>> = thread::scope(|scope| {
            let handles: Vec<_> = regions
                .iter()
                .enumerate()
                .map(|(index, region)| {
                    let live = &live;
                    let engine = &engine;
                    thread::Builder::new()
                        .name(format!("region-{index}"))
                        .spawn_scoped(scope, move || {
                            filter_region(source, engine, region, live, index)
                        })
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(index, handle)| match handle {
                    Ok(handle) => handle.join().unwrap_or_else(|_| {
                        Err(PicConvolveError::WorkerPanicked(format!("region-{index}")))
                    }),
                    Err(err) => Err(PicConvolveError::Io(err)),
                })
                .collect()
        });

        for outcome in outcomes {
            outcome?;
        }
        store.replace_buffer(live.into_inner())
    }
}

fn filter_region(
    source: &ImageStore,
    engine: &ConvolutionEngine,
    region: &Region,
    live: &Mutex<PixelBuffer>,
    index: usize,
) -> Result<(), PicConvolveError> {
    let scratch = engine.convolve_region(source, region)?;
    debug!(
        "region-{index} computed rows {:?} cols {:?}",
        region.rows(),
        region.cols()
    );
    let mut guard = live.lock();
    guard.write_region(region, &scratch)
}

impl Filtering for PartitionedFilterer {
    fn filter(&self, store: &ImageStore, kind: FilterKind) -> Result<ImageStore, PicConvolveError> {
        debug!(
            "partitioned {kind} over {}x{}",
            store.width(),
            store.height()
        );
        let mut filtered = store.clone();
        self.filter_in_place(&mut filtered, kind)?;
        Ok(filtered)
    }
}
