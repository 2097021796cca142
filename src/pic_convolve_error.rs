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
use std::error::Error;
use std::fmt::Display;

/// Buffer mismatch error description
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PicConvolveBufferMismatch {
    pub expected: usize,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub slice_len: usize,
}

/// Error enumeration type
#[derive(Debug)]
pub enum PicConvolveError {
    ZeroImageDimensions,
    InvalidMaxValue(i32),
    BufferMismatch(PicConvolveBufferMismatch),
    UnknownFormatTag(String),
    UnknownFilter(String),
    InsufficientWorkers { required: usize, available: usize },
    MalformedHeader(&'static str),
    InvalidSample { index: usize, token: String },
    MissingSamples { expected: usize, received: usize },
    OutOfMemory(usize),
    ThreadPool(String),
    WorkerPanicked(String),
    Transport { rank: usize, reason: String },
    Protocol { rank: usize, reason: String },
    WorkerExited { rank: usize, status: String },
    Io(std::io::Error),
    DimensionsOverflow { width: usize, height: usize, channels: usize },
    PixelOutOfBounds { row: usize, col: usize, width: usize, height: usize },
}

impl PicConvolveError {
    /// Returns error as int code
    #[inline]
    pub fn code(&self) -> usize {
        match self {
            PicConvolveError::ZeroImageDimensions => 1,
            PicConvolveError::InvalidMaxValue(_) => 2,
            PicConvolveError::BufferMismatch(_) => 3,
            PicConvolveError::UnknownFormatTag(_) => 4,
            PicConvolveError::UnknownFilter(_) => 5,
            PicConvolveError::InsufficientWorkers { .. } => 6,
            PicConvolveError::MalformedHeader(_) => 7,
            PicConvolveError::InvalidSample { .. } => 8,
            PicConvolveError::MissingSamples { .. } => 9,
            PicConvolveError::OutOfMemory(_) => 10,
            PicConvolveError::ThreadPool(_) => 11,
            PicConvolveError::WorkerPanicked(_) => 12,
            PicConvolveError::Transport { .. } => 13,
            PicConvolveError::Protocol { .. } => 14,
            PicConvolveError::WorkerExited { .. } => 15,
            PicConvolveError::Io(_) => 16,
            PicConvolveError::DimensionsOverflow { .. } => 17,
            PicConvolveError::PixelOutOfBounds { .. } => 18,
        }
    }

    /// Configuration errors are raised before any image work starts
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PicConvolveError::UnknownFilter(_) | PicConvolveError::InsufficientWorkers { .. }
        )
    }
}

impl Display for PicConvolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PicConvolveError::ZeroImageDimensions => {
                f.write_str("One of image dimensions is 0, this should not happen")
            }
            PicConvolveError::InvalidMaxValue(max_value) => f.write_fmt(format_args!(
                "Max sample value must be positive, but received {max_value}"
            )),
            PicConvolveError::BufferMismatch(buffer_mismatch) => f.write_fmt(format_args!(
                "Image buffer len expected to be {} [w({})*h({})*channels({})] but received {}",
                buffer_mismatch.expected,
                buffer_mismatch.width,
                buffer_mismatch.height,
                buffer_mismatch.channels,
                buffer_mismatch.slice_len,
            )),
            PicConvolveError::UnknownFormatTag(tag) => f.write_fmt(format_args!(
                "Unknown format tag {tag:?}, expected \"P2\" or \"P3\""
            )),
            PicConvolveError::UnknownFilter(name) => f.write_fmt(format_args!(
                "Unknown filter {name:?}, use blur, laplace or sharpening"
            )),
            PicConvolveError::InsufficientWorkers {
                required,
                available,
            } => f.write_fmt(format_args!(
                "There needs to be {required} processes, but only {available} were given"
            )),
            PicConvolveError::MalformedHeader(field) => {
                f.write_fmt(format_args!("Image header is missing or has invalid {field}"))
            }
            PicConvolveError::InvalidSample { index, token } => f.write_fmt(format_args!(
                "Sample #{index} is not an integer: {token:?}"
            )),
            PicConvolveError::MissingSamples { expected, received } => f.write_fmt(format_args!(
                "Image declares {expected} samples but only {received} were found"
            )),
            PicConvolveError::OutOfMemory(capacity) => f.write_fmt(format_args!(
                "There is no enough memory to allocate {capacity} samples"
            )),
            PicConvolveError::ThreadPool(reason) => {
                f.write_fmt(format_args!("Failed to build thread pool: {reason}"))
            }
            PicConvolveError::WorkerPanicked(worker) => {
                f.write_fmt(format_args!("Worker {worker} panicked"))
            }
            PicConvolveError::Transport { rank, reason } => f.write_fmt(format_args!(
                "Transfer with rank {rank} failed: {reason}"
            )),
            PicConvolveError::Protocol { rank, reason } => f.write_fmt(format_args!(
                "Rank {rank} violated the protocol: {reason}"
            )),
            PicConvolveError::WorkerExited { rank, status } => f.write_fmt(format_args!(
                "Worker process of rank {rank} exited with {status}"
            )),
            PicConvolveError::Io(err) => f.write_fmt(format_args!("I/O error: {err}")),
            PicConvolveError::DimensionsOverflow {
                width,
                height,
                channels,
            } => f.write_fmt(format_args!(
                "Image of {width}x{height} with {channels} channels has more samples than addressable"
            )),
            PicConvolveError::PixelOutOfBounds {
                row,
                col,
                width,
                height,
            } => f.write_fmt(format_args!(
                "Pixel ({row}, {col}) is outside of {width}x{height} image"
            )),
        }
    }
}

impl Error for PicConvolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PicConvolveError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PicConvolveError {
    fn from(value: std::io::Error) -> Self {
        PicConvolveError::Io(value)
    }
}

macro_rules! try_vec {
    () => {
        Vec::new()
    };
    ($elem:expr; $n:expr) => {{
        let mut v = Vec::new();
        v.try_reserve_exact($n)
            .map_err(|_| crate::pic_convolve_error::PicConvolveError::OutOfMemory($n))?;
        v.resize($n, $elem);
        v
    }};
}

pub(crate) use try_vec;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(PicConvolveError::UnknownFilter("emboss".to_string()).is_configuration());
        assert!(
            PicConvolveError::InsufficientWorkers {
                required: 4,
                available: 2
            }
            .is_configuration()
        );
        assert!(!PicConvolveError::ZeroImageDimensions.is_configuration());
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            PicConvolveError::ZeroImageDimensions,
            PicConvolveError::InvalidMaxValue(0),
            PicConvolveError::UnknownFilter(String::new()),
            PicConvolveError::OutOfMemory(1),
            PicConvolveError::Io(std::io::Error::other("closed")),
            PicConvolveError::DimensionsOverflow {
                width: usize::MAX,
                height: 2,
                channels: 1,
            },
            PicConvolveError::PixelOutOfBounds {
                row: 3,
                col: 0,
                width: 3,
                height: 3,
            },
        ];
        let mut codes: Vec<usize> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn buffer_mismatch_message() {
        let err = PicConvolveError::BufferMismatch(PicConvolveBufferMismatch {
            expected: 12,
            width: 2,
            height: 2,
            channels: 3,
            slice_len: 4,
        });
        assert_eq!(
            err.to_string(),
            "Image buffer len expected to be 12 [w(2)*h(2)*channels(3)] but received 4"
        );
    }
}
