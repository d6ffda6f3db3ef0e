//! Fixed-width text chunker.
//!
//! Splits source text into [`Chunk`]s of at most `max_chars` characters.
//! Boundaries are purely positional: no paragraph or sentence detection,
//! no overlap, and no trimming, so joining the chunks in index order gives
//! back the original text byte for byte.
//!
//! Lengths are counted in `char`s, which keeps every boundary on a UTF-8
//! code point.

use anyhow::{bail, Result};

use crate::models::Chunk;

/// Split text into consecutive chunks of `max_chars` characters.
/// Returns chunks with contiguous indices starting at 1; empty text
/// yields no chunks.
pub fn split_text(text: &str, max_chars: usize) -> Result<Vec<Chunk>> {
    if max_chars == 0 {
        bail!("chunk size must be > 0");
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let split_at = remaining
            .char_indices()
            .nth(max_chars)
            .map(|(pos, _)| pos)
            .unwrap_or(remaining.len());
        let (piece, rest) = remaining.split_at(split_at);
        chunks.push(Chunk {
            index: chunks.len() + 1,
            text: piece.to_string(),
        });
        remaining = rest;
    }

    Ok(chunks)
}
