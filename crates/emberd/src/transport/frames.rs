//! Delimiter-based framing of the inbound byte stream.

use std::io::{self, BufRead, BufReader, Read};

/// One unit read from the stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Frame content without its delimiter.
    Complete(Vec<u8>),
    /// A frame longer than the limit was discarded.
    Oversized {
        /// Bytes skipped, delimiter included.
        size: usize,
    },
    /// The peer closed the stream.
    EndOfStream,
}

/// Splits a stream into frames bounded by `max_frame_bytes`.
pub(crate) struct FrameReader<R> {
    reader: BufReader<R>,
    delimiter: u8,
    max_frame_bytes: usize,
}

impl<R: Read> FrameReader<R> {
    pub(crate) fn new(inner: R, delimiter: u8, max_frame_bytes: usize) -> Self {
        Self {
            reader: BufReader::new(inner),
            delimiter,
            max_frame_bytes,
        }
    }

    /// Reads the next frame.
    ///
    /// Trailing bytes without a delimiter at end of stream form a final
    /// frame. An oversized frame is consumed up to and including its
    /// delimiter so the next call starts at a frame boundary.
    pub(crate) fn next_frame(&mut self) -> io::Result<Frame> {
        let limit = u64::try_from(self.max_frame_bytes)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let mut buffer = Vec::new();
        let read = (&mut self.reader)
            .take(limit)
            .read_until(self.delimiter, &mut buffer)?;
        if read == 0 {
            return Ok(Frame::EndOfStream);
        }
        if buffer.last() == Some(&self.delimiter) {
            buffer.pop();
            return Ok(Frame::Complete(buffer));
        }
        if buffer.len() > self.max_frame_bytes {
            let skipped = self.reader.skip_until(self.delimiter)?;
            return Ok(Frame::Oversized {
                size: buffer.len() + skipped,
            });
        }
        Ok(Frame::Complete(buffer))
    }
}
