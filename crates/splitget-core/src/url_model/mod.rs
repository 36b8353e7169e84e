//! Local filename selection for a download.
//!
//! The name comes from the server's `Content-Disposition`, else the last
//! segment of the URL path, else [`DEFAULT_FILENAME`]. Whatever is picked is
//! sanitized so it can only ever name a file inside the target directory.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use path::last_path_segment;
pub use sanitize::sanitize_filename;

/// Fallback when neither the header nor the URL yields a usable name.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Pick the local filename for `url`.
///
/// `suggested` is the filename already extracted from `Content-Disposition`
/// by the probe (see [`parse_content_disposition_filename`]).
pub fn derive_filename(url: &str, suggested: Option<&str>) -> String {
    suggested
        .map(sanitize_filename)
        .filter(|name| is_usable(name))
        .or_else(|| {
            last_path_segment(url)
                .map(|segment| sanitize_filename(&segment))
                .filter(|name| is_usable(name))
        })
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

fn is_usable(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_name_wins_over_url() {
        assert_eq!(
            derive_filename("https://mirror.example/pool/a.iso", Some("release.iso")),
            "release.iso"
        );
    }

    #[test]
    fn url_segment_is_used_without_header() {
        assert_eq!(
            derive_filename("https://mirror.example/pool/main/pkg_1.0.deb", None),
            "pkg_1.0.deb"
        );
        assert_eq!(
            derive_filename("https://mirror.example/file%20name.txt?sig=1", None),
            "file name.txt"
        );
    }

    #[test]
    fn unusable_header_falls_back_to_url() {
        assert_eq!(
            derive_filename("https://mirror.example/data.csv", Some("..")),
            "data.csv"
        );
        assert_eq!(derive_filename("https://mirror.example/data.csv", Some("")), "data.csv");
    }

    #[test]
    fn nothing_usable_gives_default() {
        assert_eq!(derive_filename("https://mirror.example/", None), DEFAULT_FILENAME);
        assert_eq!(derive_filename("https://mirror.example", None), DEFAULT_FILENAME);
        assert_eq!(derive_filename("not a url", None), DEFAULT_FILENAME);
    }

    #[test]
    fn traversal_in_header_is_neutralized() {
        let name = derive_filename("https://mirror.example/x", Some("../../etc/passwd"));
        assert!(!name.contains('/'));
        assert_eq!(name, "etc_passwd");
    }
}
