//! Transfer progress

/// Size above which files are uploaded in chunks
pub const CHUNKED_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Size of upload chunks
pub const CHUNK_SIZE: u64 = 1024 * 1024;

/// Google requires chunks to be multiple of this, except for the last one.
pub const CHUNK_GRANULARITY: u64 = 256 * 1024;

/// Percentage of `total` that `sent` represents, rounded down.
/// An empty transfer is complete.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 || sent >= total {
        return 100;
    }
    (sent as u128 * 100 / total as u128) as u8
}
