pub mod block_page;
pub mod header_page;

pub use block_page::BlockPage;
pub use header_page::HeaderPage;

use crate::common::constants::PAGE_SIZE;
use crate::common::Result;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Fixed-int, trailing-bytes-tolerant bincode configuration shared by both
/// on-disk page layouts, so integer widths (and thus slot offsets) are
/// deterministic regardless of value magnitude, and a page struct smaller
/// than PAGE_SIZE can be read back out of a zero-padded frame buffer.
pub(crate) fn bincode_options() -> impl bincode::Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

pub(crate) fn encode_into_frame<T: Serialize>(value: &T, frame: &mut [u8; PAGE_SIZE]) -> Result<()> {
    let bytes = bincode_options().serialize(value)?;
    if bytes.len() > PAGE_SIZE {
        return Err(crate::common::Error::Serialization(format!(
            "page layout ({} bytes) exceeds PAGE_SIZE ({PAGE_SIZE})",
            bytes.len()
        )));
    }
    frame.fill(0);
    frame[..bytes.len()].copy_from_slice(&bytes);
    Ok(())
}

pub(crate) fn decode_from_frame<T: DeserializeOwned>(frame: &[u8; PAGE_SIZE]) -> Result<T> {
    Ok(bincode_options().deserialize(&frame[..])?)
}
