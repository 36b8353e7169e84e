//! Filesystem-safe filenames.

use crate::storage::STAGING_SUFFIX;

/// Longest name most Linux filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Longest derived name that still leaves room for the staging suffix.
const MAX_NAME_LEN: usize = NAME_MAX - STAGING_SUFFIX.len();

/// Extensions longer than this are not worth preserving when cutting.
const MAX_KEPT_EXTENSION: usize = 16;

/// Make `name` safe to join onto a directory.
///
/// Path separators, NUL and control characters become `_` (runs collapse to
/// one); leading and trailing dots, spaces and underscores are stripped; the
/// result is cut on a char boundary so that `<name>.part` still fits in
/// [`NAME_MAX`] bytes, keeping a short extension when there is one. May
/// return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let unsafe_char = c == '/' || c == '\\' || c == '\0' || c.is_control();
        if unsafe_char {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '.' || c == '_' || c.is_whitespace());
    truncate_name(trimmed, MAX_NAME_LEN)
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let ext = name
        .rfind('.')
        .filter(|&dot| dot > 0 && name.len() - dot <= MAX_KEPT_EXTENSION)
        .map(|dot| &name[dot..])
        .unwrap_or("");
    let stem = &name[..name.len() - ext.len()];
    let mut out = floor_char_boundary(stem, max - ext.len()).to_string();
    out.push_str(ext);
    out
}

fn floor_char_boundary(s: &str, max: usize) -> &str {
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_become_underscores() {
        assert_eq!(sanitize_filename("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_filename("a//b"), "a_b");
    }

    #[test]
    fn control_characters_are_replaced() {
        assert_eq!(sanitize_filename("bad\x00name\n.txt"), "bad_name_.txt");
    }

    #[test]
    fn edges_are_trimmed() {
        assert_eq!(sanitize_filename("  ..hidden.txt. "), "hidden.txt");
        assert_eq!(sanitize_filename(".."), "");
    }

    #[test]
    fn inner_spaces_survive() {
        assert_eq!(sanitize_filename("my file.txt"), "my file.txt");
    }

    #[test]
    fn long_names_are_cut_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= MAX_NAME_LEN);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn long_names_leave_room_for_staging_suffix() {
        let long = format!("{}.iso", "a".repeat(251));
        let out = sanitize_filename(&long);
        assert_eq!(out.len(), MAX_NAME_LEN);
        assert!(out.ends_with(".iso"));
        assert!(out.len() + STAGING_SUFFIX.len() <= NAME_MAX);
    }

    #[test]
    fn oversized_extension_is_cut_with_the_rest() {
        let long = format!("name.{}", "x".repeat(300));
        let out = sanitize_filename(&long);
        assert_eq!(out.len(), MAX_NAME_LEN);
        assert!(out.starts_with("name.x"));
    }

    #[test]
    fn short_names_are_untouched() {
        assert_eq!(sanitize_filename("debian-12.iso"), "debian-12.iso");
    }
}
