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
use crate::distributed::endpoint::{Endpoint, StreamEndpoint};
use crate::distributed::protocol::{WorkOrder, WorkResult, recv_message, send_message};
use crate::kernel::FilterKind;
use crate::pic_convolve_error::PicConvolveError;
use log::debug;
use std::io::{self, BufReader, BufWriter};

/// Handles exactly one work order: receive the image, apply the filter owned
/// by `rank` over the whole image, send the samples back.
pub fn serve(rank: usize, endpoint: &mut dyn Endpoint) -> Result<(), PicConvolveError> {
    let kind = FilterKind::for_rank(rank).ok_or_else(|| PicConvolveError::Protocol {
        rank,
        reason: "rank has no filter assigned".to_string(),
    })?;
    let order: WorkOrder = recv_message(endpoint, rank)?;
    debug!(
        "rank {rank} received {}x{} {} image",
        order.width, order.height, order.format_tag
    );
    let mut store = order.to_store()?;
    drop(order);
    store.apply_filter(kind)?;
    let result = WorkResult {
        samples: store.into_samples(),
    };
    send_message(endpoint, rank, &result)?;
    debug!("rank {rank} sent {} samples", result.samples.len());
    Ok(())
}

/// Serves one work order over this process' stdin and stdout
pub fn serve_stdio(rank: usize) -> Result<(), PicConvolveError> {
    let mut endpoint = StreamEndpoint::new(BufReader::new(io::stdin()), BufWriter::new(io::stdout()));
    serve(rank, &mut endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::endpoint::ChannelEndpoint;
    use crate::filterer::{Filtering, SequentialFilterer};
    use crate::image_store::{ImageStore, PixelFormat};
    use std::thread;

    #[test]
    fn worker_applies_its_rank_filter() {
        let store = ImageStore::from_data(
            PixelFormat::Grayscale,
            3,
            3,
            255,
            &[0, 0, 0, 0, 255, 0, 0, 0, 0],
        )
        .unwrap();
        for kind in FilterKind::ALL {
            let (mut coordinator, mut worker) = ChannelEndpoint::pair();
            let rank = kind.rank();
            let handle = thread::spawn(move || serve(rank, &mut worker));
            send_message(&mut coordinator, rank, &WorkOrder::from_store(&store)).unwrap();
            let result: WorkResult = recv_message(&mut coordinator, rank).unwrap();
            handle.join().unwrap().unwrap();
            let expected = SequentialFilterer::new().filter(&store, kind).unwrap();
            assert_eq!(result.samples, expected.samples());
        }
    }

    #[test]
    fn unknown_rank_is_refused() {
        let (_coordinator, mut worker) = ChannelEndpoint::pair();
        assert!(matches!(
            serve(4, &mut worker),
            Err(PicConvolveError::Protocol { rank: 4, .. })
        ));
    }

    #[test]
    fn closed_link_is_a_transport_error() {
        let (coordinator, mut worker) = ChannelEndpoint::pair();
        drop(coordinator);
        assert!(matches!(
            serve(1, &mut worker),
            Err(PicConvolveError::Transport { rank: 1, .. })
        ));
    }
}
