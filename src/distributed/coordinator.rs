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
use crate::distributed::protocol::{
    COORDINATOR_RANK, REQUIRED_WORLD_SIZE, WORKER_RANKS, WorkOrder, WorkResult, encode,
    recv_message, send_frame,
};
use crate::distributed::world::WorkerWorld;
use crate::filterer::{FilterSet, MultiFiltering};
use crate::image_store::ImageStore;
use crate::kernel::FilterKind;
use crate::pic_convolve_error::PicConvolveError;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DistributedOptions {
    /// Cooperating processes including the coordinator
    pub world_size: usize,
}

impl Default for DistributedOptions {
    fn default() -> Self {
        DistributedOptions {
            world_size: REQUIRED_WORLD_SIZE,
        }
    }
}

/// How worker ranks are brought up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerLaunch {
    /// Worker threads inside this process, linked by channels
    Local,
    /// `program args... --rank <rank>` child processes, linked by pipes
    Process { program: PathBuf, args: Vec<OsString> },
}

impl WorkerLaunch {
    fn command_for_rank(program: &Path, args: &[OsString], rank: usize) -> Command {
        let mut command = Command::new(program);
        command.args(args).arg("--rank").arg(rank.to_string());
        command
    }
}

/// Coordinator side of the distributed pipeline.
///
/// Sends the whole image to ranks 1, 2 and 3, each applies one fixed filter,
/// and collects the results addressed by rank, never by arrival order.
/// Any failure ends the run, no partial results are kept.
#[derive(Debug, Clone)]
pub struct DistributedFilterer {
    options: DistributedOptions,
    launch: WorkerLaunch,
}

impl DistributedFilterer {
    /// Validates the world size up front, before any image is touched
    pub fn new(options: DistributedOptions, launch: WorkerLaunch) -> Result<Self, PicConvolveError> {
        WorkerWorld::check_world_size(options.world_size)?;
        Ok(DistributedFilterer { options, launch })
    }

    pub fn local(options: DistributedOptions) -> Result<Self, PicConvolveError> {
        Self::new(options, WorkerLaunch::Local)
    }

    pub fn options(&self) -> DistributedOptions {
        self.options
    }

    fn spawn_world(&self) -> Result<WorkerWorld, PicConvolveError> {
        match &self.launch {
            WorkerLaunch::Local => WorkerWorld::spawn_local(self.options.world_size),
            WorkerLaunch::Process { program, args } => {
                WorkerWorld::spawn_processes(self.options.world_size, |rank| {
                    WorkerLaunch::command_for_rank(program, args, rank)
                })
            }
        }
    }
}

/// Runs one coordinator round against an already started world
pub fn coordinate(world: &mut WorkerWorld, store: &ImageStore) -> Result<FilterSet, PicConvolveError> {
    let order = WorkOrder::from_store(store);
    let payload = encode(COORDINATOR_RANK, &order)?;
    drop(order);
    for rank in WORKER_RANKS {
        send_frame(world.endpoint(rank)?, rank, &payload)?;
        debug!("sent {} bytes to rank {rank}", payload.len());
    }

    let expected = store.samples().len();
    let mut slots: [Option<ImageStore>; 3] = [None, None, None];
    for rank in WORKER_RANKS {
        let result: WorkResult = recv_message(world.endpoint(rank)?, rank)?;
        if result.samples.len() != expected {
            return Err(PicConvolveError::Protocol {
                rank,
                reason: format!(
                    "expected {expected} samples, received {}",
                    result.samples.len()
                ),
            });
        }
        let filtered = ImageStore::from_data(
            store.format(),
            store.width(),
            store.height(),
            store.max_value(),
            &result.samples,
        )?;
        debug!("received result of rank {rank}");
        slots[rank - 1] = Some(filtered);
    }

    let [blur, laplace, sharpen] = slots;
    let missing = |kind: FilterKind| PicConvolveError::Protocol {
        rank: kind.rank(),
        reason: "no result collected".to_string(),
    };
    Ok(FilterSet {
        blur: blur.ok_or_else(|| missing(FilterKind::Blur))?,
        laplace: laplace.ok_or_else(|| missing(FilterKind::Laplace))?,
        sharpen: sharpen.ok_or_else(|| missing(FilterKind::Sharpen))?,
    })
}

impl MultiFiltering for DistributedFilterer {
    fn filter_all(&self, store: &ImageStore) -> Result<FilterSet, PicConvolveError> {
        info!(
            "distributing {}x{} image to {} workers",
            store.width(),
            store.height(),
            WORKER_RANKS.len()
        );
        let mut world = self.spawn_world()?;
        let outcome = coordinate(&mut world, store);
        let joined = world.join();
        let results = outcome?;
        joined?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filterer::SequentialFilterer;
    use crate::image_store::PixelFormat;

    #[test]
    fn rejects_small_worlds_before_work() {
        let err = DistributedFilterer::local(DistributedOptions { world_size: 3 }).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn two_by_two_color_matches_sequential() {
        let samples = [255, 0, 10, 30, 60, 90, 120, 150, 180, 210, 240, 5];
        let store = ImageStore::from_data(PixelFormat::Color, 2, 2, 255, &samples).unwrap();
        let filterer = DistributedFilterer::local(DistributedOptions::default()).unwrap();
        let results = filterer.filter_all(&store).unwrap();
        assert_eq!(results, SequentialFilterer::new().filter_all(&store).unwrap());
    }

    #[test]
    fn process_command_appends_rank() {
        let command = WorkerLaunch::command_for_rank(
            Path::new("worker-bin"),
            &[OsString::from("worker")],
            2,
        );
        let args: Vec<String> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["worker", "--rank", "2"]);
    }
}
