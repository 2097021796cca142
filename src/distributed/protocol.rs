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
use crate::distributed::endpoint::Endpoint;
use crate::image_store::{ImageStore, PixelFormat};
use crate::pic_convolve_error::PicConvolveError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Rank of the coordinating process
pub const COORDINATOR_RANK: usize = 0;
/// Ranks of the three filter workers, in the order results are collected
pub const WORKER_RANKS: [usize; 3] = [1, 2, 3];
/// Coordinator plus one worker per filter
pub const REQUIRED_WORLD_SIZE: usize = 1 + WORKER_RANKS.len();

/// Coordinator to worker: the full source image.
///
/// bincode writes the format tag and the sample vector length-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub width: u64,
    pub height: u64,
    pub max_value: i32,
    pub format_tag: String,
    pub samples: Vec<i32>,
}

impl WorkOrder {
    pub fn from_store(store: &ImageStore) -> WorkOrder {
        WorkOrder {
            width: store.width() as u64,
            height: store.height() as u64,
            max_value: store.max_value(),
            format_tag: store.format().tag().to_string(),
            samples: store.samples().to_vec(),
        }
    }

    /// Rebuilds the image on the receiving side, bypassing the text codec
    pub fn to_store(&self) -> Result<ImageStore, PicConvolveError> {
        let format = PixelFormat::from_tag(&self.format_tag)?;
        let overflow = || PicConvolveError::DimensionsOverflow {
            width: usize::MAX,
            height: usize::MAX,
            channels: format.channels(),
        };
        let width = usize::try_from(self.width).map_err(|_| overflow())?;
        let height = usize::try_from(self.height).map_err(|_| overflow())?;
        ImageStore::from_data(format, width, height, self.max_value, &self.samples)
    }
}

/// Worker to coordinator: the filtered samples, length-prefixed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkResult {
    pub samples: Vec<i32>,
}

pub(crate) fn encode<T: Serialize>(rank: usize, message: &T) -> Result<Vec<u8>, PicConvolveError> {
    bincode::serialize(message).map_err(|err| PicConvolveError::Protocol {
        rank,
        reason: err.to_string(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(rank: usize, bytes: &[u8]) -> Result<T, PicConvolveError> {
    bincode::deserialize(bytes).map_err(|err| PicConvolveError::Protocol {
        rank,
        reason: err.to_string(),
    })
}

/// Sends one message to (or as) `rank`
pub fn send_message<T: Serialize>(
    endpoint: &mut dyn Endpoint,
    rank: usize,
    message: &T,
) -> Result<(), PicConvolveError> {
    let payload = encode(rank, message)?;
    send_frame(endpoint, rank, &payload)
}

pub(crate) fn send_frame(
    endpoint: &mut dyn Endpoint,
    rank: usize,
    payload: &[u8],
) -> Result<(), PicConvolveError> {
    endpoint
        .send_frame(payload)
        .map_err(|err| PicConvolveError::Transport {
            rank,
            reason: err.to_string(),
        })
}

/// Blocks until one message from (or for) `rank` has arrived
pub fn recv_message<T: DeserializeOwned>(
    endpoint: &mut dyn Endpoint,
    rank: usize,
) -> Result<T, PicConvolveError> {
    let frame = endpoint
        .recv_frame()
        .map_err(|err| PicConvolveError::Transport {
            rank,
            reason: err.to_string(),
        })?;
    decode(rank, &frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_order_rebuilds_the_image() {
        let store =
            ImageStore::from_data(PixelFormat::Color, 2, 1, 200, &[1, 2, 3, 4, 5, 6]).unwrap();
        let order = WorkOrder::from_store(&store);
        assert_eq!(order.format_tag, "P3");
        let bytes = encode(1, &order).unwrap();
        let received: WorkOrder = decode(1, &bytes).unwrap();
        assert_eq!(received.to_store().unwrap(), store);
    }

    #[test]
    fn rejects_unknown_tag_and_short_buffers() {
        let mut order = WorkOrder {
            width: 2,
            height: 2,
            max_value: 255,
            format_tag: "P5".to_string(),
            samples: vec![0; 4],
        };
        assert!(matches!(
            order.to_store(),
            Err(PicConvolveError::UnknownFormatTag(_))
        ));
        order.format_tag = "P3".to_string();
        assert!(matches!(
            order.to_store(),
            Err(PicConvolveError::BufferMismatch(_))
        ));
    }

    #[test]
    fn oversized_geometry_is_rejected() {
        let order = WorkOrder {
            width: u64::MAX / 2,
            height: 4,
            max_value: 255,
            format_tag: "P2".to_string(),
            samples: vec![],
        };
        assert!(matches!(
            order.to_store(),
            Err(PicConvolveError::DimensionsOverflow { .. })
        ));
    }

    #[test]
    fn truncated_payload_is_a_protocol_error() {
        let bytes = encode(2, &WorkResult {
            samples: vec![1, 2, 3],
        })
        .unwrap();
        let err = decode::<WorkResult>(2, &bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, PicConvolveError::Protocol { rank: 2, .. }));
    }
}
