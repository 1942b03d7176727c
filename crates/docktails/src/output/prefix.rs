//! Prefix — per-container line prefixing in front of a sink.

use bytes::Bytes;

use super::color::{Color, RESET};
use super::json;
use super::sink::SinkHandle;

/// Separator between the colored name and the log text.
const GAP: &str = "  ";

/// `<color><name><reset>  `
pub fn make_prefix(color: Color, name: &str) -> Bytes {
    Bytes::from(format!("{}{}{}{}", color, name, RESET, GAP))
}

/// Wraps one sink for one container stream.
///
/// Each `write` emits the prefix once at the start, repeats it after every
/// newline except a final trailing one, and hands the whole result to the
/// sink as a single buffer.
#[derive(Debug, Clone)]
pub struct PrefixWriter {
    sink: SinkHandle,
    prefix: Bytes,
    pretty_json: bool,
}

impl PrefixWriter {
    pub fn new(sink: SinkHandle, prefix: Bytes, pretty_json: bool) -> Self {
        Self { sink, prefix, pretty_json }
    }

    /// Render a chunk without writing it. `None` for an empty chunk.
    pub fn render(&self, chunk: &[u8]) -> Option<Vec<u8>> {
        if chunk.is_empty() {
            return None;
        }

        let body = if self.pretty_json {
            json::indent_embedded(chunk)
        } else {
            std::borrow::Cow::Borrowed(chunk)
        };

        Some(prefix_lines(&self.prefix, &body))
    }

    /// Sink failures are swallowed.
    pub async fn write(&self, chunk: &[u8]) {
        if let Some(buf) = self.render(chunk) {
            self.sink.send(Bytes::from(buf)).await;
        }
    }
}

fn prefix_lines(prefix: &[u8], body: &[u8]) -> Vec<u8> {
    let newlines = body.iter().filter(|&&b| b == b'\n').count();
    let mut out = Vec::with_capacity(body.len() + prefix.len() * (newlines + 1));
    out.extend_from_slice(prefix);

    let last = body.len() - 1;
    for (i, &b) in body.iter().enumerate() {
        out.push(b);
        if b == b'\n' && i != last {
            out.extend_from_slice(prefix);
        }
    }
    out
}
