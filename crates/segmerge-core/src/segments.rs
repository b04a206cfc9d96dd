//! Segment address construction.

use crate::request::{ValidRequest, PLACEHOLDERS};

/// Zero-fills `index` to `width` digits. Wider numbers pass through as-is;
/// a minus sign counts toward the width and stays in front.
pub fn pad_index(index: i64, width: usize) -> String {
    format!("{:0width$}", index, width = width)
}

/// Substitutes `value` into the pattern's placeholder.
pub fn render_filename(pattern: &str, value: &str) -> String {
    for placeholder in PLACEHOLDERS {
        if pattern.contains(placeholder) {
            return pattern.replacen(placeholder, value, 1);
        }
    }
    pattern.to_string()
}

/// Joins a base location and a filename like a directory path: one `/`
/// between them, and a name starting with `/` replaces the base entirely.
pub fn join_address(base: &str, name: &str) -> String {
    if name.starts_with('/') || base.is_empty() {
        return name.to_string();
    }
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Builds one address per index in `start..=end`, ascending.
pub fn build_addresses(req: &ValidRequest) -> Vec<String> {
    (req.start..=req.end)
        .map(|i| {
            let name = render_filename(&req.pattern, &pad_index(i, req.padding));
            join_address(&req.base, &name)
        })
        .collect()
}
