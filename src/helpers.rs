//! Small pure helpers shared by the catalog client and the downloader.
//!
//! - Canonical chapter and volume labels
//! - Filename sanitization for on-disk path components
//! - Page link extension handling
//!
//! # Examples
//!
//! ```
//! use mangamirror::helpers::{normalize_chapter_label, normalize_volume_label};
//!
//! assert_eq!(normalize_chapter_label("12.5"), "Chapter 12.5");
//! assert_eq!(normalize_volume_label("3", "Extras"), "Volume 3");
//! assert_eq!(normalize_volume_label("", "Extras"), "Extras");
//! ```

/// Canonicalize a chapter label. Bare numbers become "Chapter N"; labels
/// that already carry words ("Prologue", "Chapter 3 Extra") pass through.
pub fn normalize_chapter_label(raw: &str) -> String {
    if is_numeric(raw) {
        format!("Chapter {}", raw)
    } else {
        raw.to_string()
    }
}

/// Canonicalize a volume label. The catalog leaves unassigned chapters
/// with an empty volume, which maps to the configured placeholder name.
pub fn normalize_volume_label(raw: &str, empty_volume_name: &str) -> String {
    if raw.is_empty() {
        empty_volume_name.to_string()
    } else if is_numeric(raw) {
        format!("Volume {}", raw)
    } else {
        raw.to_string()
    }
}

// Float syntax counts, so "12" and "12.5" both read as numbers.
fn is_numeric(s: &str) -> bool {
    s.parse::<f64>().is_ok()
}

/// Replace characters that can break a path component.
pub fn sanitize_filename(s: &str) -> String {
    s.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// File extension of a page link, dot included, empty when there is none.
pub fn link_extension(link: &str) -> &str {
    let name = link.rsplit('/').next().unwrap_or("");
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}
