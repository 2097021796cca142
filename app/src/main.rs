use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use pic_convolve::distributed::serve_stdio;
use pic_convolve::{
    DistributedFilterer, DistributedOptions, FilterKind, FilterSet, Filtering, ForkJoinFilterer,
    ImageStore, MultiFiltering, PartitionedFilterer, SequentialFilterer, ThreadingPolicy,
    WorkerLaunch,
};

#[derive(Parser)]
#[command(name = "pic-convolve")]
#[command(about = "Apply blur, laplace or sharpening kernels to P2/P3 images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Destinations for the three filter results
#[derive(clap::Args)]
struct FilterOutputs {
    /// Blurred result
    blur: PathBuf,
    /// Laplace result
    laplace: PathBuf,
    /// Sharpened result
    sharpen: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// One whole-image pass on the main thread
    Sequential {
        input: PathBuf,
        output: PathBuf,
        /// blur, laplace or sharpening
        #[arg(short, long, value_parser = parse_filter)]
        filter: FilterKind,
    },
    /// Four threads, one per image quadrant
    Partitioned {
        input: PathBuf,
        output: PathBuf,
        /// blur, laplace or sharpening
        #[arg(short, long, value_parser = parse_filter)]
        filter: FilterKind,
    },
    /// All three filters concurrently on private copies
    ForkJoin {
        input: PathBuf,
        #[command(flatten)]
        outputs: FilterOutputs,
        /// Threads for the three tasks, 1 runs them one after another
        #[arg(long, default_value_t = 3)]
        threads: usize,
    },
    /// One coordinator and three worker processes, one filter each
    Distributed {
        input: PathBuf,
        #[command(flatten)]
        outputs: FilterOutputs,
        /// Cooperating processes including the coordinator, at least 4
        #[arg(short = 'n', long, default_value_t = 4)]
        processes: usize,
        /// Run the workers as threads instead of child processes
        #[arg(long)]
        local: bool,
    },
    /// Serve one work order on stdin/stdout
    #[command(hide = true)]
    Worker {
        #[arg(long)]
        rank: usize,
    },
    /// Read an image and write it back unchanged
    Copy { input: PathBuf, output: PathBuf },
}

fn parse_filter(name: &str) -> Result<FilterKind, String> {
    name.parse::<FilterKind>().map_err(|err| err.to_string())
}

fn open(path: &Path) -> Result<ImageStore> {
    ImageStore::open(path).with_context(|| format!("could not read {}", path.display()))
}

fn create(store: &ImageStore, path: &Path) -> Result<()> {
    store
        .create(path)
        .with_context(|| format!("could not write {}", path.display()))
}

fn save_all(set: &FilterSet, outputs: &FilterOutputs) -> Result<()> {
    for (kind, store) in set.iter() {
        let path = match kind {
            FilterKind::Blur => &outputs.blur,
            FilterKind::Laplace => &outputs.laplace,
            FilterKind::Sharpen => &outputs.sharpen,
        };
        create(store, path)?;
    }
    Ok(())
}

fn run_single(filterer: &dyn Filtering, input: &Path, output: &Path, kind: FilterKind) -> Result<()> {
    let store = open(input)?;
    let start = Instant::now();
    let filtered = filterer.filter(&store, kind)?;
    info!("{kind} took {:?}", start.elapsed());
    create(&filtered, output)
}

fn run_multi(filterer: &dyn MultiFiltering, input: &Path, outputs: &FilterOutputs) -> Result<()> {
    let store = open(input)?;
    let start = Instant::now();
    let set = filterer.filter_all(&store)?;
    info!("three filters took {:?}", start.elapsed());
    save_all(&set, outputs)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Sequential {
            input,
            output,
            filter,
        } => run_single(&SequentialFilterer::new(), &input, &output, filter),
        Command::Partitioned {
            input,
            output,
            filter,
        } => run_single(&PartitionedFilterer::new(), &input, &output, filter),
        Command::ForkJoin {
            input,
            outputs,
            threads,
        } => {
            let policy = match threads {
                0 | 1 => ThreadingPolicy::Single,
                n => ThreadingPolicy::Fixed(n),
            };
            run_multi(&ForkJoinFilterer::new(policy), &input, &outputs)
        }
        Command::Distributed {
            input,
            outputs,
            processes,
            local,
        } => {
            let launch = if local {
                WorkerLaunch::Local
            } else {
                let program =
                    std::env::current_exe().context("could not locate this executable")?;
                WorkerLaunch::Process {
                    program,
                    args: vec!["worker".into()],
                }
            };
            // the world size is checked before the input is read
            let filterer = DistributedFilterer::new(
                DistributedOptions {
                    world_size: processes,
                },
                launch,
            )?;
            run_multi(&filterer, &input, &outputs)
        }
        Command::Worker { rank } => {
            serve_stdio(rank).with_context(|| format!("worker rank {rank} failed"))
        }
        Command::Copy { input, output } => create(&open(&input)?, &output),
    }
}
