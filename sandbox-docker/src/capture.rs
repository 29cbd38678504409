use tokio::io::{AsyncRead, AsyncReadExt};

/// Bytes captured from one stream, cut off at the configured ceiling.
#[derive(Debug, Default)]
pub(crate) struct Captured {
    pub data: Vec<u8>,
    pub truncated: bool,
}

/// Read a stream to EOF, keeping at most `limit` bytes.
///
/// Reading continues past the ceiling so the writing process never
/// blocks on a full pipe buffer; the excess is discarded. Output exactly
/// at the ceiling is kept whole.
pub(crate) async fn read_capped<R>(mut reader: R, limit: usize) -> Captured
where
    R: AsyncRead + Unpin,
{
    let mut captured = Captured::default();
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = buf.get(..n).unwrap_or_default();
                let room = limit.saturating_sub(captured.data.len());
                let take = room.min(chunk.len());
                captured
                    .data
                    .extend_from_slice(chunk.get(..take).unwrap_or_default());
                if take < chunk.len() {
                    captured.truncated = true;
                }
            }
            // A broken pipe after the child died yields what was read so far.
            Err(_) => break,
        }
    }
    captured
}
