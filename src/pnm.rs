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
use crate::ImageSize;
use crate::image_store::{ImageStore, PixelFormat};
use crate::pic_convolve_error::PicConvolveError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Whitespace separated tokens with `#` comments stripped
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.lines().flat_map(|line| {
        let content = match line.find('#') {
            Some(comment) => &line[..comment],
            None => line,
        };
        content.split_whitespace()
    })
}

fn header_field<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    field: &'static str,
) -> Result<T, PicConvolveError> {
    tokens
        .next()
        .and_then(|token| token.parse::<T>().ok())
        .ok_or(PicConvolveError::MalformedHeader(field))
}

/// Parses a plain `P2` or `P3` image: tag, width, height, max value, then
/// width * height * channels integers in row-major order.
pub fn read_pnm<R: BufRead>(mut reader: R) -> Result<ImageStore, PicConvolveError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = tokens(&text);

    let tag = tokens
        .next()
        .ok_or(PicConvolveError::MalformedHeader("format tag"))?;
    let format = PixelFormat::from_tag(tag)?;
    let width: usize = header_field(&mut tokens, "width")?;
    let height: usize = header_field(&mut tokens, "height")?;
    let max_value: i32 = header_field(&mut tokens, "max value")?;
    if width == 0 || height == 0 {
        return Err(PicConvolveError::ZeroImageDimensions);
    }
    if max_value <= 0 {
        return Err(PicConvolveError::InvalidMaxValue(max_value));
    }

    let expected = ImageSize::new(width, height)
        .checked_len(format.channels())
        .ok_or(PicConvolveError::DimensionsOverflow {
            width,
            height,
            channels: format.channels(),
        })?;
    // Every sample takes at least one digit and one separator, so the
    // declared count never reserves more than the text can hold.
    let capacity = expected.min(text.len() / 2 + 1);
    let mut samples: Vec<i32> = Vec::new();
    samples
        .try_reserve_exact(capacity)
        .map_err(|_| PicConvolveError::OutOfMemory(capacity))?;
    for index in 0..expected {
        let token = tokens.next().ok_or(PicConvolveError::MissingSamples {
            expected,
            received: index,
        })?;
        let sample = token
            .parse::<i32>()
            .map_err(|_| PicConvolveError::InvalidSample {
                index,
                token: token.to_string(),
            })?;
        samples.push(sample);
    }

    ImageStore::from_data(format, width, height, max_value, &samples)
}

/// Writes the header on three lines followed by one sample per line
pub fn write_pnm<W: Write>(store: &ImageStore, mut writer: W) -> Result<(), PicConvolveError> {
    writeln!(writer, "{}", store.format().tag())?;
    writeln!(writer, "{} {}", store.width(), store.height())?;
    writeln!(writer, "{}", store.max_value())?;
    for sample in store.samples() {
        writeln!(writer, "{sample}")?;
    }
    writer.flush()?;
    Ok(())
}

impl ImageStore {
    pub fn load<R: BufRead>(reader: R) -> Result<ImageStore, PicConvolveError> {
        read_pnm(reader)
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<(), PicConvolveError> {
        write_pnm(self, writer)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<ImageStore, PicConvolveError> {
        let file = File::open(path)?;
        read_pnm(BufReader::new(file))
    }

    pub fn create<P: AsRef<Path>>(&self, path: P) -> Result<(), PicConvolveError> {
        let file = File::create(path)?;
        write_pnm(self, BufWriter::new(file))
    }
}
