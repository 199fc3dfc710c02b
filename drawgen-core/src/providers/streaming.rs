//! Line framing and the byte-stream → delta-stream adapter
//!
//! Provider responses arrive as newline-delimited `data: <json>` records,
//! but network reads split them at arbitrary byte boundaries. The
//! `LineAssembler` buffers the undecoded tail across reads and only ever
//! yields complete lines, so decoders see identical input regardless of
//! how the transport chunked the bytes.

use super::error::ProviderError;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;

/// Boxed stream of decoded text deltas
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Accumulates raw bytes and yields complete lines.
///
/// Works at the byte level so a chunk boundary inside a multi-byte UTF-8
/// sequence cannot corrupt the text; conversion happens per complete
/// line. A line is complete once `\n` has been observed; the terminator
/// and any trailing `\r` are stripped.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8>,
}

impl LineAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns the lines completed by this chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // the \n itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Drain the trailing partial line, if any, at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(line)
    }
}

/// Turns a provider's raw byte stream into a sequence of text deltas.
///
/// Implementations own their line framing (via [`LineAssembler`]) and
/// their full-text accumulation, so the same decoder can be driven
/// synchronously in tests and asynchronously through [`decode_stream`].
pub trait StreamDecoder {
    /// Feed raw bytes; returns the deltas decoded from lines completed
    /// by this chunk, in emission order.
    fn feed(&mut self, chunk: &[u8]) -> Vec<String>;

    /// Flush the buffered tail at end of stream.
    fn finish(&mut self) -> Vec<String>;

    /// The concatenation of every delta emitted so far.
    fn full_text(&self) -> &str;

    /// True once the provider's logical end-of-stream record was seen.
    fn is_done(&self) -> bool;
}

/// Adapt a raw byte stream plus a decoder into a [`DeltaStream`].
///
/// Transport errors surface as a single `Err` item; the stream should
/// not be polled further after that.
pub fn decode_stream<S, D, E>(bytes: S, decoder: D) -> DeltaStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ProviderError> + Send + 'static,
    D: StreamDecoder + Send + 'static,
{
    let mut decoder = decoder;

    // A trailing None marks end-of-input so the decoder can flush its
    // buffered tail.
    let with_sentinel = bytes.map(Some).chain(stream::once(async { None }));

    Box::pin(with_sentinel.flat_map(move |item| {
        let out: Vec<Result<String, ProviderError>> = match item {
            Some(Ok(chunk)) => decoder.feed(&chunk).into_iter().map(Ok).collect(),
            Some(Err(e)) => vec![Err(e.into())],
            None => decoder.finish().into_iter().map(Ok).collect(),
        };
        stream::iter(out)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_only_complete_lines() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.push(b"hel"), Vec::<String>::new());
        assert_eq!(assembler.push(b"lo\nwor"), vec!["hello".to_string()]);
        assert_eq!(assembler.push(b"ld\n"), vec!["world".to_string()]);
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn strips_carriage_returns() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.push(b"a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn finish_drains_the_partial_tail() {
        let mut assembler = LineAssembler::new();
        assert!(assembler.push(b"no terminator").is_empty());
        assert_eq!(assembler.finish(), Some("no terminator".to_string()));
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn split_inside_utf8_sequence_is_safe() {
        let text = "héllo\n".as_bytes();
        // 'é' is two bytes; split between them.
        let mut assembler = LineAssembler::new();
        assert!(assembler.push(&text[..2]).is_empty());
        assert_eq!(assembler.push(&text[2..]), vec!["héllo".to_string()]);
    }

    #[test]
    fn every_split_point_yields_identical_lines() {
        let input = b"data: one\ndata: two\r\ndata: three\n";
        let expected = {
            let mut a = LineAssembler::new();
            a.push(input)
        };

        for split in 0..=input.len() {
            let mut a = LineAssembler::new();
            let mut lines = a.push(&input[..split]);
            lines.extend(a.push(&input[split..]));
            assert_eq!(lines, expected, "split at byte {}", split);
        }
    }
}
