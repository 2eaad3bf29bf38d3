use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters percent-encoded in emitted URLs, on top of controls and non-ASCII.
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encodes a link or image destination.
///
/// Existing `%XX` escapes are kept as they are; a `%` that does not start one is
/// encoded as `%25`.
pub fn normalize_url(url: &str) -> String {
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut start = 0;
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'%' {
            out.extend(utf8_percent_encode(&url[start..index], URL_UNSAFE));
            if is_escape(&bytes[index..]) {
                out.push_str(&url[index..index + 3]);
                index += 3;
            } else {
                out.push_str("%25");
                index += 1;
            }
            start = index;
        } else {
            index += 1;
        }
    }
    out.extend(utf8_percent_encode(&url[start..], URL_UNSAFE));
    out
}

fn is_escape(bytes: &[u8]) -> bool {
    bytes.len() >= 3 && bytes[1].is_ascii_hexdigit() && bytes[2].is_ascii_hexdigit()
}
