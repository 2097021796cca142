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
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::io::{self, Read, Write};

/// Size of the big-endian length prefix in front of every frame
pub const FRAME_HEADER_SIZE: usize = 4;

/// One side of a blocking, ordered, point-to-point link.
/// Every call blocks without a timeout.
pub trait Endpoint {
    fn send_frame(&mut self, payload: &[u8]) -> io::Result<()>;
    fn recv_frame(&mut self) -> io::Result<Vec<u8>>;
}

/// Length-prefixed frames over a byte stream, e.g. child process pipes
pub struct StreamEndpoint<R: Read, W: Write> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> StreamEndpoint<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        StreamEndpoint { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W: Write> Endpoint for StreamEndpoint<R, W> {
    fn send_frame(&mut self, payload: &[u8]) -> io::Result<()> {
        let len = u32::try_from(payload.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame of {} bytes does not fit the length prefix", payload.len()),
            )
        })?;
        self.writer.write_all(&len.to_be_bytes())?;
        self.writer.write_all(payload)?;
        self.writer.flush()
    }

    fn recv_frame(&mut self) -> io::Result<Vec<u8>> {
        let mut header = [0u8; FRAME_HEADER_SIZE];
        self.reader.read_exact(&mut header)?;
        let len = u32::from_be_bytes(header) as usize;
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(len)
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, format!("frame of {len} bytes")))?;
        payload.resize(len, 0);
        self.reader.read_exact(&mut payload)?;
        Ok(payload)
    }
}

/// Frames over in-process channels, for workers running as threads
pub struct ChannelEndpoint {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl ChannelEndpoint {
    /// Two connected endpoints
    pub fn pair() -> (ChannelEndpoint, ChannelEndpoint) {
        let (a_tx, b_rx) = unbounded();
        let (b_tx, a_rx) = unbounded();
        (
            ChannelEndpoint { tx: a_tx, rx: a_rx },
            ChannelEndpoint { tx: b_tx, rx: b_rx },
        )
    }
}

impl Endpoint for ChannelEndpoint {
    fn send_frame(&mut self, payload: &[u8]) -> io::Result<()> {
        self.tx
            .send(payload.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer endpoint was dropped"))
    }

    fn recv_frame(&mut self) -> io::Result<Vec<u8>> {
        self.rx
            .recv()
            .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "peer endpoint was dropped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn stream_frames_are_length_prefixed() {
        let mut endpoint = StreamEndpoint::new(io::empty(), Vec::new());
        endpoint.send_frame(&[7, 8, 9]).unwrap();
        endpoint.send_frame(&[]).unwrap();
        let (_, written) = endpoint.into_inner();
        assert_eq!(written, vec![0, 0, 0, 3, 7, 8, 9, 0, 0, 0, 0]);

        let mut reader = StreamEndpoint::new(Cursor::new(written), io::sink());
        assert_eq!(reader.recv_frame().unwrap(), vec![7, 8, 9]);
        assert_eq!(reader.recv_frame().unwrap(), Vec::<u8>::new());
        let eof = reader.recv_frame().unwrap_err();
        assert_eq!(eof.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn short_frame_is_an_error() {
        let mut reader = StreamEndpoint::new(Cursor::new(vec![0, 0, 0, 5, 1, 2]), io::sink());
        assert!(reader.recv_frame().is_err());
    }

    #[test]
    fn channel_pair_is_bidirectional() {
        let (mut left, mut right) = ChannelEndpoint::pair();
        left.send_frame(b"ping").unwrap();
        assert_eq!(right.recv_frame().unwrap(), b"ping".to_vec());
        right.send_frame(b"pong").unwrap();
        assert_eq!(left.recv_frame().unwrap(), b"pong".to_vec());
        drop(right);
        assert!(left.recv_frame().is_err());
        assert!(left.send_frame(b"lost").is_err());
    }
}
