//! `Content-Disposition` filename extraction.

/// Filename carried by a `Content-Disposition` header value.
///
/// `filename*=` (RFC 5987, charset `UTF-8`) is preferred over `filename=`.
/// Quoted values may contain `;` and backslash escapes. The result is not
/// sanitized.
pub fn parse_content_disposition_filename(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for (name, raw) in params(value) {
        if name.eq_ignore_ascii_case("filename*") {
            extended = decode_ext_value(&raw).filter(|v| !v.is_empty());
        } else if name.eq_ignore_ascii_case("filename") && !raw.is_empty() {
            plain = Some(raw);
        }
    }
    extended.or(plain)
}

/// `name=value` pairs after the disposition type, with quoted values
/// unescaped.
fn params(value: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut rest = match value.split_once(';') {
        Some((_, params)) => params,
        None => return out,
    };

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }
        let Some(eq) = rest.find('=') else { break };
        let name = rest[..eq].trim().to_string();
        rest = rest[eq + 1..].trim_start();

        let (val, remaining) = if let Some(quoted) = rest.strip_prefix('"') {
            take_quoted(quoted)
        } else {
            match rest.find(';') {
                Some(end) => (rest[..end].trim_end().to_string(), &rest[end..]),
                None => (rest.trim_end().to_string(), ""),
            }
        };
        out.push((name, val));
        rest = remaining;
    }
    out
}

/// Reads a quoted-string body (opening quote already consumed).
fn take_quoted(s: &str) -> (String, &str) {
    let mut val = String::new();
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            val.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return (val, &s[i + 1..]);
        } else {
            val.push(c);
        }
    }
    (val, "")
}

/// `charset'lang'pct-encoded` → decoded text. Only UTF-8 is accepted.
fn decode_ext_value(raw: &str) -> Option<String> {
    let mut parts = raw.splitn(3, '\'');
    let charset = parts.next()?;
    let _lang = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    Some(percent_decode(encoded))
}

/// Lossy percent-decoding; malformed escapes are kept as-is.
pub(super) fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_token_forms() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=\"a b.zip\"").as_deref(),
            Some("a b.zip")
        );
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=plain.bin").as_deref(),
            Some("plain.bin")
        );
    }

    #[test]
    fn quoted_value_may_contain_semicolon_and_escapes() {
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="x;y \"z\".txt"; size=3"#)
                .as_deref(),
            Some(r#"x;y "z".txt"#)
        );
    }

    #[test]
    fn extended_form_is_preferred() {
        let header = "attachment; filename=\"fallback.bin\"; filename*=UTF-8''na%C3%AFve%20file.txt";
        assert_eq!(
            parse_content_disposition_filename(header).as_deref(),
            Some("naïve file.txt")
        );
    }

    #[test]
    fn unsupported_charset_falls_back_to_plain() {
        let header = "attachment; filename*=ISO-8859-1''caf%E9.txt; filename=cafe.txt";
        assert_eq!(parse_content_disposition_filename(header).as_deref(), Some("cafe.txt"));
    }

    #[test]
    fn no_filename_param() {
        assert_eq!(parse_content_disposition_filename("inline"), None);
        assert_eq!(parse_content_disposition_filename("attachment; size=10"), None);
        assert_eq!(parse_content_disposition_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn percent_decode_keeps_malformed_escapes() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
