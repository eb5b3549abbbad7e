//! Size and concurrency limits for the review pipeline.
//!
//! All counts are in characters, not bytes, since the limits exist to bound
//! what a language model reads rather than what the wire carries.

/// Diffs below this length go to review untouched; summarizing them costs
/// more than it saves.
pub const SMALL_DIFF_THRESHOLD: usize = 5_000;

/// A chunk closes at the next file boundary once it has grown past this.
/// A single file larger than the target stays whole in one chunk.
pub const CHUNK_TARGET_SIZE: usize = 8_000;

/// Concurrent chunk summarization requests in flight at once.
pub const MAX_CONCURRENT_SUMMARIES: usize = 5;

/// When every chunk summary fails, the raw diff is truncated to this length
/// instead.
pub const FALLBACK_DIFF_CAP: usize = 10_000;

/// Hard ceiling on the diff-or-digest section of a review request. Exceeding
/// it fails the request before any reviewer call is made; an oversized
/// request would be silently truncated by the reviewer anyway.
pub const REQUEST_DIFF_CEILING: usize = 50_000;

/// Independent cap on the task-requirements and recent-context sections of a
/// review request.
pub const REQUEST_SECTION_CAP: usize = 20_000;

/// Consecutive non-task commits, counting the one just made, that trigger the
/// "start tracking this as a task" suggestion.
pub const NON_TASK_STREAK_THRESHOLD: usize = 3;

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
