use crate::Disposition;

/// `Content-Disposition` value for `filename`.
///
/// Emits a quoted ASCII `filename` for old clients plus an RFC 5987
/// `filename*` carrying the exact UTF-8 name. In the quoted form `"` and `\`
/// are backslash-escaped and anything outside printable ASCII becomes `?`,
/// so the result is always a valid header value.
pub fn content_disposition(disposition: Disposition, filename: &str) -> String {
    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition.as_str(),
        quoted_fallback(filename),
        urlencoding::encode(filename)
    )
}

fn quoted_fallback(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c == ' ' || c.is_ascii_graphic() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
