//! Compresses oversized diffs into a bounded digest a reviewer can read.

use futures::{StreamExt, stream};
use tracing::warn;

use crate::agent::Summarizer;
use crate::limits::{
    CHUNK_TARGET_SIZE, FALLBACK_DIFF_CAP, MAX_CONCURRENT_SUMMARIES, SMALL_DIFF_THRESHOLD,
    truncate_chars,
};

const SUMMARY_PLACEHOLDER: &str = "(summary unavailable for this change set)";

/// A contiguous, file-boundary-aligned slice of the diff. `index` fixes the
/// chunk's position in the reassembled digest regardless of which summary
/// returns first.
#[derive(Debug, Clone)]
pub struct DiffChunk {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Compression {
    pub text: String,
    pub compressed: bool,
    pub ratio: f64,
}

impl Compression {
    fn passthrough(diff: &str) -> Self {
        Self {
            text: diff.to_string(),
            compressed: false,
            ratio: 0.0,
        }
    }
}

/// Split along `diff --git` boundaries: a chunk closes at the next file
/// header once it has exceeded the target size. A single file larger than
/// the target stays whole.
pub fn chunk_diff(diff: &str, target: usize) -> Vec<DiffChunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in diff.split_inclusive('\n') {
        if line.starts_with("diff --git ") && current.chars().count() > target {
            chunks.push(DiffChunk {
                index: chunks.len(),
                text: std::mem::take(&mut current),
            });
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(DiffChunk {
            index: chunks.len(),
            text: current,
        });
    }
    chunks
}

/// Small diffs pass through untouched. Large ones are chunked, summarized
/// with bounded concurrency, and reassembled in original chunk order; a
/// failed chunk becomes a placeholder. Only when every chunk fails does the
/// digest give way to a truncated copy of the raw diff.
pub async fn compress_if_large<S: Summarizer>(summarizer: &S, diff: &str) -> Compression {
    let original_len = diff.chars().count();
    if original_len < SMALL_DIFF_THRESHOLD {
        return Compression::passthrough(diff);
    }

    let chunks = chunk_diff(diff, CHUNK_TARGET_SIZE);
    let mut slots: Vec<Option<String>> = vec![None; chunks.len()];

    let mut results = stream::iter(chunks.iter())
        .map(|chunk| async move {
            let summary = summarizer.summarize(&chunk.text).await;
            (chunk.index, summary)
        })
        .buffer_unordered(MAX_CONCURRENT_SUMMARIES);

    while let Some((index, result)) = results.next().await {
        match result {
            Ok(summary) => slots[index] = Some(summary),
            Err(err) => warn!(chunk = index, error = %err, "chunk summarization failed"),
        }
    }

    if slots.iter().all(Option::is_none) {
        warn!("all chunk summaries failed; falling back to truncated diff");
        return Compression::passthrough(truncate_chars(diff, FALLBACK_DIFF_CAP));
    }

    let digest = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let body = slot.as_deref().unwrap_or(SUMMARY_PLACEHOLDER);
            format!("### Change Set {}:\n{body}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let compressed_len = digest.chars().count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = 1.0 - compressed_len as f64 / original_len as f64;

    Compression {
        text: digest,
        compressed: true,
        ratio,
    }
}
