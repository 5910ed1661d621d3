use {
    super::*,
    bytes::{Bytes, BytesMut},
    std::io,
    tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder},
};

pub(super) enum Frame {
    Line(Bytes),
    /// A line longer than the limit. Its bytes are discarded up to the next
    /// newline and reading carries on after it.
    Oversized,
}

/// Newline framing that never ends the stream on a bad line. `FramedRead`
/// stops after the first decoder error, so only real I/O errors are returned
/// as errors.
pub(super) struct LineCodec {
    inner: AnyDelimiterCodec,
}

impl LineCodec {
    pub(super) fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_length),
        }
    }

    fn frame(
        result: std::result::Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> io::Result<Option<Frame>> {
        match result {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(AnyDelimiterCodecError::Io(err)) => Err(err),
        }
    }
}

impl Decoder for LineCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::frame(self.inner.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::frame(self.inner.decode_eof(src))
    }
}
