const HEADER_OPEN: &str = "======= ";
const HEADER_CLOSE: &str = " =======\nEVM assembly:\n";

/// One compilation unit's section of the compiler's assembly output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmUnit<'a> {
    pub name: &'a str,
    pub body: &'a str,
}

struct Header<'a> {
    name: &'a str,
    start: usize,
    body_start: usize,
}

/// Find a `======= <name> =======\nEVM assembly:\n` header starting at `at`.
fn header_at(output: &str, at: usize) -> Option<Header<'_>> {
    let rest = output[at..].strip_prefix(HEADER_OPEN)?;
    let close = rest.find(HEADER_CLOSE)?;
    let name = &rest[..close];
    if name.contains('\n') {
        return None;
    }
    Some(Header {
        name,
        start: at,
        body_start: at + HEADER_OPEN.len() + close + HEADER_CLOSE.len(),
    })
}

/// Split raw compiler output into per-unit assembly text.
///
/// Anything before the first header is dropped; each body runs up to the
/// next header or the end of output.
pub fn split_units(output: &str) -> Vec<AsmUnit<'_>> {
    let mut headers = Vec::new();
    let mut at = 0usize;

    while let Some(found) = output[at..].find(HEADER_OPEN) {
        let candidate = at + found;
        match header_at(output, candidate) {
            Some(header) => {
                at = header.body_start;
                headers.push(header);
            }
            None => at = candidate + 1,
        }
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let end = headers.get(i + 1).map_or(output.len(), |next| next.start);
            AsmUnit {
                name: header.name,
                body: &output[header.body_start..end],
            }
        })
        .collect()
}

/// The first complete top-level JSON object in `text`.
///
/// The assembly dump concatenates the creation object and the runtime
/// object; only the first one is wanted. Braces inside string literals are
/// ignored.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find(|c: char| !c.is_whitespace())?;
    if !text[start..].starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
