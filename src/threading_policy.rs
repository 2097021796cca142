/*
 * // Copyright (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */

use crate::ImageSize;
use crate::kernel::FilterKind;
use crate::pic_convolve_error::PicConvolveError;
use rayon::ThreadPool;

/// How many threads the fork-join driver may use for its three filter tasks
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum ThreadingPolicy {
    Single,
    Fixed(usize),
    Adaptive,
}

impl Default for ThreadingPolicy {
    fn default() -> Self {
        ThreadingPolicy::Fixed(FilterKind::ALL.len())
    }
}

impl ThreadingPolicy {
    pub fn get_threads_count(&self, for_size: ImageSize) -> usize {
        match self {
            ThreadingPolicy::Single => 1,
            ThreadingPolicy::Fixed(thread_count) => (*thread_count).max(1),
            ThreadingPolicy::Adaptive => {
                let box_size = 256 * 256;
                let new_box_size = for_size.area();
                (new_box_size / box_size).clamp(1, FilterKind::ALL.len())
            }
        }
    }

    /// Returns `None` when the work should stay on the calling thread
    pub fn get_pool(&self, for_size: ImageSize) -> Result<Option<ThreadPool>, PicConvolveError> {
        let threads_count = self.get_threads_count(for_size);
        if threads_count == 1 {
            return Ok(None);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads_count)
            .thread_name(|index| format!("fork-join-{index}"))
            .build()
            .map_err(|err| PicConvolveError::ThreadPool(err.to_string()))?;
        Ok(Some(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_counts() {
        let small = ImageSize::new(16, 16);
        let large = ImageSize::new(2048, 2048);
        assert_eq!(ThreadingPolicy::Single.get_threads_count(large), 1);
        assert_eq!(ThreadingPolicy::Fixed(0).get_threads_count(small), 1);
        assert_eq!(ThreadingPolicy::Fixed(5).get_threads_count(small), 5);
        assert_eq!(ThreadingPolicy::Adaptive.get_threads_count(small), 1);
        assert_eq!(ThreadingPolicy::Adaptive.get_threads_count(large), 3);
        assert_eq!(ThreadingPolicy::default(), ThreadingPolicy::Fixed(3));
    }

    #[test]
    fn single_policy_has_no_pool() {
        let pool = ThreadingPolicy::Single
            .get_pool(ImageSize::new(4, 4))
            .unwrap();
        assert!(pool.is_none());
        let pool = ThreadingPolicy::Fixed(2)
            .get_pool(ImageSize::new(4, 4))
            .unwrap();
        assert_eq!(pool.map(|p| p.current_num_threads()), Some(2));
    }
}
