use futures_core::Stream;
use futures_util::StreamExt;
use std::pin::Pin;
use tokio_util::bytes::Bytes;

use crate::api::error::ApiError;

/// Lines carrying a frame payload start with this literal prefix.
pub const FRAME_PREFIX: &str = "data: ";

pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, ApiError>> + Send>>;

/// Reassembles `data: `-prefixed frames from a chunked byte stream.
///
/// Chunk boundaries may fall anywhere, including mid-line or inside a
/// multi-byte character, so the buffer holds raw bytes and only complete
/// lines are decoded. Lines without the frame prefix (keep-alives,
/// comments, blanks) are dropped. Bytes left in the buffer when the stream
/// ends never form a frame. A transport error ends the sequence after
/// yielding it.
pub fn decode_frames<S, E>(byte_stream: S) -> FrameStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + 'static,
{
    let frames = async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();

        tokio::pin!(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let chunk = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(ApiError::Stream {
                        details: e.to_string(),
                    });
                    return;
                }
            };

            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                if let Some(payload) = frame_payload(&line) {
                    yield Ok(payload.to_string());
                }
            }
        }
    };

    Box::pin(frames)
}

fn frame_payload(line: &str) -> Option<&str> {
    line.trim().strip_prefix(FRAME_PREFIX)
}
