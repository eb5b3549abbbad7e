//! Partitions a unified diff into reviewable code changes and documentation
//! noise.

/// One review cycle's view of the uncommitted change set.
#[derive(Debug, Clone, Default)]
pub struct DiffBundle {
    pub full_diff: String,
    pub filtered_diff: String,
    pub has_doc_changes: bool,
    pub doc_only_changes: bool,
}

const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "markdown", "rst", "txt", "adoc"];

/// Documentation files, docs directories, READMEs, and everything under the
/// `notes/` journal convention (including its derived artifacts) are not
/// reviewable code.
pub fn is_doc_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let segments: Vec<&str> = lower.split('/').collect();

    if segments.iter().any(|s| *s == "docs" || *s == "notes") {
        return true;
    }
    let Some(file_name) = segments.last() else {
        return false;
    };
    if file_name.starts_with("readme") {
        return true;
    }
    match file_name.rsplit_once('.') {
        Some((_, ext)) => DOC_EXTENSIONS.contains(&ext),
        None => false,
    }
}

fn header_path(line: &str) -> Option<&str> {
    // `diff --git a/<path> b/<path>`; the b-side is the post-change name.
    line.strip_prefix("diff --git ")?
        .split_whitespace()
        .find_map(|part| part.strip_prefix("b/"))
}

/// Scan the diff once, keeping code-file sections verbatim and dropping
/// documentation-file sections (headers included). Pure text transformation,
/// no failure modes.
pub fn split_reviewable(full_diff: &str) -> DiffBundle {
    let mut filtered = String::new();
    let mut has_doc = false;
    let mut has_code = false;
    // Lines before the first file header belong to no file and are dropped.
    let mut keep_current = false;

    for line in full_diff.split_inclusive('\n') {
        if line.starts_with("diff --git ") {
            let doc = header_path(line).is_some_and(is_doc_path);
            has_doc |= doc;
            has_code |= !doc;
            keep_current = !doc;
        }
        if keep_current {
            filtered.push_str(line);
        }
    }

    DiffBundle {
        full_diff: full_diff.to_string(),
        filtered_diff: filtered,
        has_doc_changes: has_doc,
        doc_only_changes: has_doc && !has_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_section(path: &str, body: &str) -> String {
        format!(
            "diff --git a/{path} b/{path}\nindex 000..111 100644\n--- a/{path}\n+++ b/{path}\n{body}"
        )
    }

    #[test]
    fn doc_path_rules() {
        assert!(is_doc_path("README.md"));
        assert!(is_doc_path("readme"));
        assert!(is_doc_path("docs/guide/setup.rst"));
        assert!(is_doc_path("CHANGELOG.txt"));
        assert!(is_doc_path("notes/2025-08-12.md"));
        assert!(is_doc_path("notes/embeddings/journal.json"));
        assert!(!is_doc_path("src/main.rs"));
        assert!(!is_doc_path("src/markdown.rs"));
        assert!(!is_doc_path("Cargo.toml"));
    }

    #[test]
    fn empty_diff_produces_empty_bundle() {
        let bundle = split_reviewable("");
        assert!(bundle.filtered_diff.is_empty());
        assert!(!bundle.has_doc_changes);
        assert!(!bundle.doc_only_changes);
    }

    #[test]
    fn doc_sections_are_dropped_headers_included() {
        let diff = format!(
            "{}{}",
            file_section("README.md", "+# hello\n"),
            file_section("src/lib.rs", "+pub fn f() {}\n"),
        );
        let bundle = split_reviewable(&diff);
        assert!(bundle.has_doc_changes);
        assert!(!bundle.doc_only_changes);
        assert!(!bundle.filtered_diff.contains("README.md"));
        assert!(bundle.filtered_diff.starts_with("diff --git a/src/lib.rs"));
        assert!(bundle.filtered_diff.contains("+pub fn f() {}"));
    }

    #[test]
    fn doc_only_change_set_empties_the_filtered_diff() {
        let diff = format!(
            "{}{}",
            file_section("README.md", "+# hello\n"),
            file_section("docs/api.md", "+endpoints\n"),
        );
        let bundle = split_reviewable(&diff);
        assert!(bundle.has_doc_changes);
        assert!(bundle.doc_only_changes);
        assert!(bundle.filtered_diff.is_empty());
    }

    #[test]
    fn filtering_a_code_only_diff_is_idempotent() {
        let diff = format!(
            "{}{}",
            file_section("src/lib.rs", "+pub fn f() {}\n"),
            file_section("src/main.rs", "+fn main() {}\n"),
        );
        let once = split_reviewable(&diff);
        assert!(!once.has_doc_changes);
        assert_eq!(once.filtered_diff, diff);

        let twice = split_reviewable(&once.filtered_diff);
        assert_eq!(twice.filtered_diff, once.filtered_diff);
        assert!(!twice.has_doc_changes);
    }

    #[test]
    fn every_file_lands_in_exactly_one_bucket() {
        let diff = format!(
            "{}{}{}",
            file_section("src/lib.rs", "+a\n"),
            file_section("notes/day.md", "+b\n"),
            file_section("server/handler.go", "+c\n"),
        );
        let bundle = split_reviewable(&diff);
        assert!(bundle.filtered_diff.contains("src/lib.rs"));
        assert!(bundle.filtered_diff.contains("server/handler.go"));
        assert!(!bundle.filtered_diff.contains("notes/day.md"));
        assert!(bundle.has_doc_changes);
        assert!(!bundle.doc_only_changes);
    }
}
