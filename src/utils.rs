use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
    }
    Ok(())
}

/// Find the largest char boundary in `s` that is <= `max_bytes`.
/// Safe for slicing: `&s[..find_char_boundary(s, max_bytes)]` never panics.
pub fn find_char_boundary(s: &str, max_bytes: usize) -> usize {
    if max_bytes >= s.len() {
        return s.len();
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}

/// Cut `s` to at most `max_bytes`, appending `...` when something was dropped.
pub fn truncate(s: &str, max_bytes: usize) -> String {
    let end = find_char_boundary(s, max_bytes);
    if end < s.len() {
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}
