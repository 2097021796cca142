use pic_convolve::{
    DistributedFilterer, DistributedOptions, FilterKind, Filtering, ForkJoinFilterer, ImageStore,
    MultiFiltering, PartitionedFilterer, PicConvolveError, PixelFormat, Rectification,
    SequentialFilterer, ThreadingPolicy,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn noise(format: PixelFormat, width: usize, height: usize, max_value: i32) -> ImageStore {
    let len = width * height * format.channels();
    let mut state = 0x2545_f491u32;
    let samples: Vec<i32> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state % (max_value as u32 + 1)) as i32
        })
        .collect();
    ImageStore::from_data(format, width, height, max_value, &samples).unwrap()
}

fn fixtures() -> Vec<ImageStore> {
    vec![
        noise(PixelFormat::Grayscale, 1, 1, 255),
        noise(PixelFormat::Grayscale, 13, 7, 255),
        noise(PixelFormat::Grayscale, 2, 9, 65535),
        noise(PixelFormat::Color, 2, 2, 255),
        noise(PixelFormat::Color, 11, 10, 100),
    ]
}

#[test]
fn all_three_filter_drivers_agree() {
    init_logger();
    let distributed = DistributedFilterer::local(DistributedOptions::default()).unwrap();
    for store in fixtures() {
        let sequential = SequentialFilterer::new().filter_all(&store).unwrap();
        let fork_join = ForkJoinFilterer::new(ThreadingPolicy::Fixed(3))
            .filter_all(&store)
            .unwrap();
        let remote = distributed.filter_all(&store).unwrap();
        assert_eq!(fork_join, sequential);
        assert_eq!(remote, sequential);
    }
}

#[test]
fn partitioned_driver_agrees_except_for_color_laplace_rectification() {
    init_logger();
    for store in fixtures() {
        for kind in FilterKind::ALL {
            let sequential = SequentialFilterer::new().filter(&store, kind).unwrap();
            let partitioned = PartitionedFilterer::new().filter(&store, kind).unwrap();
            if kind == FilterKind::Laplace && store.format() == PixelFormat::Color {
                // rectification can only raise a sample
                for (p, s) in partitioned.samples().iter().zip(sequential.samples()) {
                    assert!(p >= s);
                }
                let plain = PartitionedFilterer::new()
                    .with_rectification(Rectification::None)
                    .filter(&store, kind)
                    .unwrap();
                assert_eq!(plain, sequential);
            } else {
                assert_eq!(partitioned, sequential);
            }
        }
    }
}

#[test]
fn every_output_is_clamped() {
    for store in fixtures() {
        let max_value = store.max_value();
        let set = SequentialFilterer::new().filter_all(&store).unwrap();
        for (kind, filtered) in set.iter() {
            assert!(
                filtered.samples().iter().all(|&s| (0..=max_value).contains(&s)),
                "{kind} escaped [0, {max_value}]"
            );
        }
        let partitioned = PartitionedFilterer::new()
            .filter(&store, FilterKind::Laplace)
            .unwrap();
        assert!(partitioned.samples().iter().all(|&s| (0..=max_value).contains(&s)));
    }
}

#[test]
fn distributed_two_by_two_color_returns_three_results() {
    init_logger();
    let store = noise(PixelFormat::Color, 2, 2, 255);
    let set = DistributedFilterer::local(DistributedOptions { world_size: 4 })
        .unwrap()
        .filter_all(&store)
        .unwrap();
    let results = set.into_array();
    assert_eq!(results.len(), 3);
    for (kind, filtered) in results {
        let expected = SequentialFilterer::new().filter(&store, kind).unwrap();
        assert_eq!(filtered.samples(), expected.samples(), "{kind}");
        assert_eq!(filtered.format(), PixelFormat::Color);
        assert_eq!(filtered.max_value(), 255);
    }
}

#[test]
fn insufficient_world_is_a_configuration_error() {
    for world_size in [0, 1, 3] {
        match DistributedFilterer::local(DistributedOptions { world_size }) {
            Err(err @ PicConvolveError::InsufficientWorkers { .. }) => {
                assert!(err.is_configuration())
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
