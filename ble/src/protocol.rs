use std::time::Duration;
use uuid::Uuid;

/// Nordic UART Service, exposed by the device firmware.
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x6e400001_b5a3_f393_e0a9_e50e24dcca9e);

/// Written by us, read by the device.
pub const TX_CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0x6e400002_b5a3_f393_e0a9_e50e24dcca9e);

/// Notified by the device.
pub const RX_CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0x6e400003_b5a3_f393_e0a9_e50e24dcca9e);

// The default ATT MTU is 23, leaving 20 bytes of payload per write.
pub const MAX_CHUNK_SIZE: usize = 20;
pub const CHUNK_DELAY: Duration = Duration::from_millis(10);
pub const TERMINATOR: &[u8] = b"\n";

/// Splits `text` into contiguous chunks of at most `max_chunk_size` characters.
///
/// Chunks are counted in characters rather than bytes, so a code point is never split, but a
/// chunk of multi-byte characters can be longer than `max_chunk_size` bytes.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<&str> {
    let max_chunk_size = max_chunk_size.max(1);

    let mut chunks = Vec::with_capacity(text.len().div_ceil(max_chunk_size));
    let mut start = 0;
    let mut count = 0;
    for (index, _) in text.char_indices() {
        if count == max_chunk_size {
            chunks.push(&text[start..index]);
            start = index;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
