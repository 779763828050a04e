// src/utils.rs

/// Splits an inclusive block range into inclusive `(from, to)` chunks of at most
/// `chunk_size` blocks, for log queries that providers cap by range.
pub fn create_block_chunks(from_block: u64, to_block: u64, chunk_size: u64) -> Vec<(u64, u64)> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut current_from = from_block;
    while current_from <= to_block {
        let current_to = current_from.saturating_add(chunk_size - 1).min(to_block);
        chunks.push((current_from, current_to));
        if current_to == u64::MAX {
            break;
        }
        current_from = current_to + 1;
    }
    chunks
}
