use super::mock_dom::Dom;
use super::*;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea"];

pub(crate) fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

/// Parses `html` and appends the resulting nodes under `parent`.
///
/// The parser is lenient the way browsers are: unknown end tags are ignored,
/// open elements are closed at the end of input, and a `<` that does not
/// start a well-formed tag is kept as text. Character references are kept
/// verbatim so markup round-trips exactly.
pub(crate) fn parse_into(dom: &mut Dom, parent: NodeId, html: &str) -> Result<()> {
    let mut stack = vec![parent];
    let bytes = html.as_bytes();
    let mut i = 0usize;
    let mut text_start = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        if starts_with_at(bytes, i, b"<!--") {
            flush_text(dom, &stack, html, text_start, i)?;
            let end = find_subslice(bytes, i + 4, b"-->")
                .ok_or_else(|| Error::HtmlParse("unclosed HTML comment".into()))?;
            i = end + 3;
            text_start = i;
            continue;
        }

        if starts_with_at(bytes, i, b"<!") {
            flush_text(dom, &stack, html, text_start, i)?;
            i = find_byte(bytes, i, b'>').map(|end| end + 1).unwrap_or(bytes.len());
            text_start = i;
            continue;
        }

        if starts_with_at(bytes, i, b"</") {
            let Some((tag, next)) = parse_end_tag(html, i) else {
                i += 1;
                continue;
            };
            flush_text(dom, &stack, html, text_start, i)?;
            i = next;
            text_start = i;

            if let Some(pos) = stack
                .iter()
                .skip(1)
                .rposition(|node| dom.tag_name(*node).is_some_and(|t| t.eq_ignore_ascii_case(&tag)))
            {
                stack.truncate(pos + 1);
            }
            continue;
        }

        let Some((tag, attrs, self_closing, next)) = parse_start_tag(html, i) else {
            i += 1;
            continue;
        };
        flush_text(dom, &stack, html, text_start, i)?;
        i = next;
        text_start = i;

        let current = *stack
            .last()
            .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
        let node = dom.create_element(current, tag.clone(), attrs);

        if RAW_TEXT_TAGS.iter().any(|raw| raw.eq_ignore_ascii_case(&tag)) && !self_closing {
            let close = find_raw_end_tag(bytes, i, tag.as_bytes()).unwrap_or(bytes.len());
            if let Some(body) = html.get(i..close) {
                if !body.is_empty() {
                    dom.create_text(node, body.to_string());
                }
            }
            dom.sync_default_value(node);
            i = parse_end_tag(html, close).map(|(_, next)| next).unwrap_or(close);
            text_start = i;
            continue;
        }

        if !self_closing && !is_void_tag(&tag) {
            stack.push(node);
        }
    }

    flush_text(dom, &stack, html, text_start, bytes.len())?;
    Ok(())
}

fn flush_text(dom: &mut Dom, stack: &[NodeId], html: &str, start: usize, end: usize) -> Result<()> {
    if start >= end {
        return Ok(());
    }
    let text = html
        .get(start..end)
        .ok_or_else(|| Error::HtmlParse("text is not on a character boundary".into()))?;
    let parent = *stack
        .last()
        .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
    dom.create_text(parent, text.to_string());
    Ok(())
}

fn parse_start_tag(html: &str, at: usize) -> Option<(String, Vec<(String, String)>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    if tag_start == i || !bytes[tag_start].is_ascii_alphabetic() {
        return None;
    }
    let tag = html.get(tag_start..i)?.to_ascii_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return None;
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        if bytes[i] == b'/' {
            if bytes.get(i + 1) == Some(&b'>') {
                self_closing = true;
                i += 2;
                break;
            }
            i += 1;
            continue;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if name_start == i {
            // Junk inside a tag: skip one byte and keep going.
            i += 1;
            continue;
        }
        let name = html.get(name_start..i)?.to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, &mut i)?
        } else {
            String::new()
        };

        if !attrs.iter().any(|(existing, _)| existing == &name) {
            attrs.push((name, value));
        }
    }

    Some((tag, attrs, self_closing, i))
}

fn parse_attr_value(html: &str, i: &mut usize) -> Option<String> {
    let bytes = html.as_bytes();
    match bytes.get(*i) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let start = *i + 1;
            let end = find_byte(bytes, start, quote)?;
            *i = end + 1;
            Some(html.get(start..end)?.to_string())
        }
        Some(_) => {
            let start = *i;
            while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
                *i += 1;
            }
            Some(html.get(start..*i)?.to_string())
        }
        None => None,
    }
}

fn parse_end_tag(html: &str, at: usize) -> Option<(String, usize)> {
    let bytes = html.as_bytes();
    if !starts_with_at(bytes, at, b"</") {
        return None;
    }
    let mut i = at + 2;
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    if tag_start == i {
        return None;
    }
    let tag = html.get(tag_start..i)?.to_ascii_lowercase();
    let close = find_byte(bytes, i, b'>')?;
    Some((tag, close + 1))
}

fn find_raw_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + 2 + tag.len() <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag)
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn starts_with_at(bytes: &[u8], at: usize, prefix: &[u8]) -> bool {
    bytes.len() >= at + prefix.len() && &bytes[at..at + prefix.len()] == prefix
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|b| *b == needle)
        .map(|pos| from + pos)
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':'
}

fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'>' | b'/' | b'=' | b'"' | b'\'' | b'<')
}

pub(crate) fn escape_attr_value(value: &str) -> String {
    value.replace('"', "&quot;")
}
