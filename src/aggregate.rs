//! Ordered, failure-isolating aggregation of per-chunk results.
//!
//! Chunks are queried one at a time, in index order, and every record a
//! chunk yields is appended to a single flat collection. A chunk that yields
//! nothing (empty reply, unparseable reply) simply adds nothing. An error
//! from the query function stops the loop at once: later chunks are never
//! queried and the partial collection is dropped.

use anyhow::Result;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, error, info};

use crate::models::Chunk;

/// Run `query` over `chunks` sequentially and concatenate the results.
///
/// # Errors
///
/// Returns the first error produced by `query`, annotated with the chunk
/// that failed.
pub async fn aggregate<'a, F, Fut>(chunks: &'a [Chunk], mut query: F) -> Result<Vec<Value>>
where
    F: FnMut(&'a Chunk) -> Fut,
    Fut: Future<Output = Result<Vec<Value>>>,
{
    let total = chunks.len();
    let mut results = Vec::new();

    for chunk in chunks {
        info!(chunk = chunk.index, total, "querying chunk");

        let records = match query(chunk).await {
            Ok(records) => records,
            Err(e) => {
                error!(
                    chunk = chunk.index,
                    total,
                    discarded = results.len(),
                    "query failed, aborting run"
                );
                return Err(e.context(format!("chunk {} of {} failed", chunk.index, total)));
            }
        };

        debug!(chunk = chunk.index, records = records.len(), "chunk done");
        results.extend(records);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;
    use std::cell::RefCell;

    fn chunks(n: usize) -> Vec<Chunk> {
        (1..=n)
            .map(|index| Chunk {
                index,
                text: format!("chunk {}", index),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_results_in_chunk_order() {
        let chunks = chunks(3);
        let out = aggregate(&chunks, |chunk| async move {
            Ok::<_, anyhow::Error>(match chunk.index {
                1 => vec![json!("A")],
                2 => vec![],
                _ => vec![json!("B"), json!("C")],
            })
        })
        .await
        .unwrap();
        assert_eq!(out, vec![json!("A"), json!("B"), json!("C")]);
    }

    #[tokio::test]
    async fn test_error_stops_before_later_chunks() {
        let chunks = chunks(3);
        let seen = RefCell::new(Vec::new());
        let err = aggregate(&chunks, |chunk| {
            seen.borrow_mut().push(chunk.index);
            async move {
                if chunk.index == 2 {
                    bail!("connection refused");
                }
                Ok::<_, anyhow::Error>(vec![json!(chunk.index)])
            }
        })
        .await
        .unwrap_err();

        assert_eq!(*seen.borrow(), vec![1, 2]);
        let msg = format!("{:#}", err);
        assert!(msg.contains("chunk 2 of 3"), "got: {}", msg);
        assert!(msg.contains("connection refused"), "got: {}", msg);
    }

    #[tokio::test]
    async fn test_no_chunks_no_queries() {
        let calls = RefCell::new(0);
        let out = aggregate(&[], |_chunk| {
            *calls.borrow_mut() += 1;
            async { Ok::<_, anyhow::Error>(vec![json!("unexpected")]) }
        })
        .await
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(*calls.borrow(), 0);
    }
}
