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
use crate::distributed::endpoint::{ChannelEndpoint, Endpoint, StreamEndpoint};
use crate::distributed::protocol::{REQUIRED_WORLD_SIZE, WORKER_RANKS};
use crate::distributed::worker;
use crate::pic_convolve_error::PicConvolveError;
use log::{debug, warn};
use std::io::{BufReader, BufWriter};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

type ProcessEndpoint = StreamEndpoint<BufReader<ChildStdout>, BufWriter<ChildStdin>>;

enum Liveness {
    Thread(JoinHandle<Result<(), PicConvolveError>>),
    Process(Child),
}

struct WorkerHandle {
    rank: usize,
    endpoint: Box<dyn Endpoint + Send>,
    liveness: Liveness,
}

/// The three filter workers as seen from the coordinator
pub struct WorkerWorld {
    world_size: usize,
    workers: Vec<WorkerHandle>,
}

impl WorkerWorld {
    /// Fails with a configuration error when fewer than one coordinator and
    /// three workers are available. Surplus ranks stay idle.
    pub fn check_world_size(world_size: usize) -> Result<(), PicConvolveError> {
        if world_size < REQUIRED_WORLD_SIZE {
            return Err(PicConvolveError::InsufficientWorkers {
                required: REQUIRED_WORLD_SIZE,
                available: world_size,
            });
        }
        if world_size > REQUIRED_WORLD_SIZE {
            warn!(
                "world size {} exceeds {}, ranks {}..{} stay idle",
                world_size, REQUIRED_WORLD_SIZE, REQUIRED_WORLD_SIZE, world_size
            );
        }
        Ok(())
    }

    /// Starts each worker as a thread of this process
    pub fn spawn_local(world_size: usize) -> Result<WorkerWorld, PicConvolveError> {
        Self::check_world_size(world_size)?;
        let mut workers = Vec::with_capacity(WORKER_RANKS.len());
        for rank in WORKER_RANKS {
            let (coordinator_side, mut worker_side) = ChannelEndpoint::pair();
            let handle = thread::Builder::new()
                .name(format!("rank-{rank}"))
                .spawn(move || worker::serve(rank, &mut worker_side))?;
            debug!("rank {rank} started as thread");
            workers.push(WorkerHandle {
                rank,
                endpoint: Box::new(coordinator_side),
                liveness: Liveness::Thread(handle),
            });
        }
        Ok(WorkerWorld {
            world_size,
            workers,
        })
    }

    /// Starts each worker as a child process talking over its stdin and stdout.
    ///
    /// `command_for_rank` must build a command that ends up in
    /// [worker::serve_stdio] for the given rank.
    pub fn spawn_processes<F>(
        world_size: usize,
        mut command_for_rank: F,
    ) -> Result<WorkerWorld, PicConvolveError>
    where
        F: FnMut(usize) -> Command,
    {
        Self::check_world_size(world_size)?;
        let mut world = WorkerWorld {
            world_size,
            workers: Vec::with_capacity(WORKER_RANKS.len()),
        };
        for rank in WORKER_RANKS {
            match Self::spawn_process(rank, &mut command_for_rank(rank)) {
                Ok(worker) => world.workers.push(worker),
                Err(err) => {
                    // reap the ranks already running before giving up
                    if let Err(join_err) = world.join() {
                        debug!("stopping started workers: {join_err}");
                    }
                    return Err(err);
                }
            }
        }
        Ok(world)
    }

    fn spawn_process(rank: usize, command: &mut Command) -> Result<WorkerHandle, PicConvolveError> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            if let Err(err) = child.kill() {
                debug!("rank {rank} could not be killed: {err}");
            }
            child.wait()?;
            return Err(PicConvolveError::Transport {
                rank,
                reason: "worker pipes are unavailable".to_string(),
            });
        };
        debug!("rank {rank} started as process {}", child.id());
        let endpoint: ProcessEndpoint =
            StreamEndpoint::new(BufReader::new(stdout), BufWriter::new(stdin));
        Ok(WorkerHandle {
            rank,
            endpoint: Box::new(endpoint),
            liveness: Liveness::Process(child),
        })
    }

    pub fn world_size(&self) -> usize {
        self.world_size
    }

    pub(crate) fn endpoint(&mut self, rank: usize) -> Result<&mut dyn Endpoint, PicConvolveError> {
        match self.workers.iter_mut().find(|worker| worker.rank == rank) {
            Some(worker) => {
                let endpoint: &mut dyn Endpoint = worker.endpoint.as_mut();
                Ok(endpoint)
            }
            None => Err(PicConvolveError::Protocol {
                rank,
                reason: "no worker with this rank".to_string(),
            }),
        }
    }

    /// Closes every link and waits for all workers to finish.
    /// Reports the first failure in rank order.
    pub fn join(self) -> Result<(), PicConvolveError> {
        let mut first_error = None;
        for worker in self.workers {
            let WorkerHandle {
                rank,
                endpoint,
                liveness,
            } = worker;
            drop(endpoint);
            let outcome = match liveness {
                Liveness::Thread(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(PicConvolveError::WorkerPanicked(format!("rank-{rank}")))),
                Liveness::Process(mut child) => match child.wait() {
                    Ok(status) if status.success() => Ok(()),
                    Ok(status) => Err(PicConvolveError::WorkerExited {
                        rank,
                        status: status.to_string(),
                    }),
                    Err(err) => Err(PicConvolveError::Io(err)),
                },
            };
            if let Err(err) = outcome {
                debug!("rank {rank} failed: {err}");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_worlds_are_rejected() {
        for world_size in 0..REQUIRED_WORLD_SIZE {
            assert!(matches!(
                WorkerWorld::spawn_local(world_size),
                Err(PicConvolveError::InsufficientWorkers {
                    required: 4,
                    available,
                }) if available == world_size
            ));
        }
    }

    #[test]
    fn surplus_ranks_are_accepted() {
        assert!(WorkerWorld::check_world_size(6).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failed_spawn_reaps_started_ranks() {
        // rank 1 is a stand-in that exits once its stdin closes
        let outcome = WorkerWorld::spawn_processes(4, |rank| match rank {
            1 => Command::new("cat"),
            _ => Command::new("/nonexistent/pic-convolve-worker"),
        });
        assert!(matches!(outcome, Err(PicConvolveError::Io(_))));
    }

    #[test]
    fn idle_world_reports_worker_failures() {
        // workers see their link closed before any order arrives
        let world = WorkerWorld::spawn_local(4).unwrap();
        assert_eq!(world.world_size(), 4);
        assert!(matches!(
            world.join(),
            Err(PicConvolveError::Transport { rank: 1, .. })
        ));
    }
}
