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
use crate::image_store::ImageStore;
use crate::kernel::FilterKind;
use crate::pic_convolve_error::PicConvolveError;
use log::debug;

/// Drivers applying one filter to one image
pub trait Filtering {
    /// Returns a filtered copy, `store` is never modified
    fn filter(&self, store: &ImageStore, kind: FilterKind) -> Result<ImageStore, PicConvolveError>;
}

/// Drivers producing the blur, laplace and sharpen results of one image
pub trait MultiFiltering {
    fn filter_all(&self, store: &ImageStore) -> Result<FilterSet, PicConvolveError>;
}

/// One result per [FilterKind]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    pub blur: ImageStore,
    pub laplace: ImageStore,
    pub sharpen: ImageStore,
}

impl FilterSet {
    pub fn get(&self, kind: FilterKind) -> &ImageStore {
        match kind {
            FilterKind::Blur => &self.blur,
            FilterKind::Laplace => &self.laplace,
            FilterKind::Sharpen => &self.sharpen,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKind, &ImageStore)> {
        FilterKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn into_array(self) -> [(FilterKind, ImageStore); 3] {
        [
            (FilterKind::Blur, self.blur),
            (FilterKind::Laplace, self.laplace),
            (FilterKind::Sharpen, self.sharpen),
        ]
    }
}

/// One whole-image pass on the calling thread
#[derive(Debug, Copy, Clone, Default)]
pub struct SequentialFilterer;

impl SequentialFilterer {
    pub fn new() -> Self {
        SequentialFilterer
    }
}

impl Filtering for SequentialFilterer {
    fn filter(&self, store: &ImageStore, kind: FilterKind) -> Result<ImageStore, PicConvolveError> {
        debug!(
            "sequential {kind} over {}x{}",
            store.width(),
            store.height()
        );
        let mut filtered = store.clone();
        filtered.apply_filter(kind)?;
        Ok(filtered)
    }
}

impl MultiFiltering for SequentialFilterer {
    fn filter_all(&self, store: &ImageStore) -> Result<FilterSet, PicConvolveError> {
        Ok(FilterSet {
            blur: self.filter(store, FilterKind::Blur)?,
            laplace: self.filter(store, FilterKind::Laplace)?,
            sharpen: self.filter(store, FilterKind::Sharpen)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_store::PixelFormat;

    #[test]
    fn sequential_leaves_source_untouched() {
        let store =
            ImageStore::from_data(PixelFormat::Grayscale, 2, 2, 255, &[10, 20, 30, 40]).unwrap();
        let filtered = SequentialFilterer::new()
            .filter(&store, FilterKind::Sharpen)
            .unwrap();
        assert_eq!(store.samples(), &[10, 20, 30, 40]);
        // 5*10 - 20 - 30 = 0, 5*40 - 20 - 30 = 150
        assert_eq!(filtered.sample(0, 0, 0), 0);
        assert_eq!(filtered.sample(1, 1, 0), 150);
    }

    #[test]
    fn filter_set_is_ordered_by_rank() {
        let store = ImageStore::from_data(PixelFormat::Grayscale, 1, 1, 255, &[90]).unwrap();
        let set = SequentialFilterer::new().filter_all(&store).unwrap();
        let kinds: Vec<FilterKind> = set.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, FilterKind::ALL.to_vec());
        assert_eq!(set.get(FilterKind::Blur).samples(), &[10]);
        assert_eq!(set.get(FilterKind::Laplace).samples(), &[0]);
        assert_eq!(set.get(FilterKind::Sharpen).samples(), &[255]);
    }
}
