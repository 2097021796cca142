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
#![deny(deprecated)]
#![allow(clippy::too_many_arguments)]

mod convolution;
pub mod distributed;
mod filterer;
mod fork_join;
mod image_size;
mod image_store;
mod kernel;
mod partitioned;
mod pic_convolve_error;
mod pnm;
mod region;
mod threading_policy;

pub use convolution::{ConvolutionEngine, Rectification};
pub use distributed::{DistributedFilterer, DistributedOptions, WorkerLaunch};
pub use filterer::{FilterSet, Filtering, MultiFiltering, SequentialFilterer};
pub use fork_join::ForkJoinFilterer;
pub use image_size::ImageSize;
pub use image_store::{ImageStore, PixelBuffer, PixelFormat};
pub use kernel::{FilterKind, Kernel};
pub use partitioned::PartitionedFilterer;
pub use pic_convolve_error::{PicConvolveBufferMismatch, PicConvolveError};
pub use pnm::{read_pnm, write_pnm};
pub use region::{QUADRANTS, Region, partition_quadrants};
pub use threading_policy::*;
