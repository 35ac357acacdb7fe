//! Line codec for the stdio wire protocol.
//!
//! Frame format: one JSON object per line, LF-terminated, compact encoding.
//! The JSON encoder never emits raw newlines, so line framing is unambiguous.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt};

/// Read one message line from the stream.
///
/// Returns the line without its terminator, or `None` on clean EOF.
/// `max_line_bytes` caps the accepted frame size; an over-long or non-UTF-8
/// frame is an unrecoverable transport error.
pub async fn read_message<R: AsyncBufReadExt + Unpin>(
    reader: &mut R,
    max_line_bytes: usize,
) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    let mut limited = reader.take(max_line_bytes as u64 + 1);
    let n = limited.read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
        buf.pop();
    }
    if buf.len() > max_line_bytes {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Frame too large: more than {} bytes", max_line_bytes),
        ));
    }
    String::from_utf8(buf).map(Some).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Frame is not valid UTF-8: {e}"),
        )
    })
}

/// Write one message line to the stream and flush it.
pub async fn write_message<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    value: &Value,
) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(value).map_err(|e| {
        tracing::error!("JSON encoding failed: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
