//! Plain-text extraction from HTML bodies.
//!
//! Feeds previews, summarization, printing, and length gating. Block-level
//! elements become line breaks, entities are decoded, whitespace is
//! collapsed, and the contents of `<style>`/`<script>` containers are
//! dropped rather than leaking CSS or code into the text.

/// Converts an HTML body to readable plain text.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        flush_text(&rest[..lt], &mut out);
        let after_lt = &rest[lt + 1..];
        let Some(gt) = after_lt.find('>') else {
            // Truncated tag at end of input; nothing renderable follows.
            rest = "";
            break;
        };
        let tag = &after_lt[..gt];
        rest = &after_lt[gt + 1..];

        let name = tag_name(tag);
        if name == "style" || name == "script" {
            rest = skip_container(rest, &name);
        } else if is_block_boundary(&name) && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
    }
    flush_text(rest, &mut out);

    tidy(&out)
}

/// Derives the short single-line snippet used for message placeholders.
///
/// Flattens the plain text onto one line and truncates on a character
/// boundary, appending an ellipsis when content was dropped.
#[must_use]
pub fn preview(html: &str, max_chars: usize) -> String {
    let text = html_to_text(html);
    let mut flat = String::with_capacity(text.len().min(max_chars * 4));
    for word in text.split_whitespace() {
        if !flat.is_empty() {
            flat.push(' ');
        }
        flat.push_str(word);
    }
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}\u{2026}", cut.trim_end())
}

/// Appends visible text, decoding entities and collapsing whitespace runs.
fn flush_text(text: &str, out: &mut String) {
    let mut i = 0;
    while let Some(c) = text[i..].chars().next() {
        if c == '&' {
            if let Some((entity, consumed)) = parse_entity(&text[i..]) {
                match decode_entity(entity) {
                    Some(decoded) => out.push_str(&decoded),
                    // Unknown entity, keep it verbatim.
                    None => out.push_str(&text[i..i + consumed]),
                }
                i += consumed;
                continue;
            }
            out.push('&');
            i += 1;
        } else if c.is_whitespace() {
            if !out.is_empty() && !out.ends_with([' ', '\n']) {
                out.push(' ');
            }
            i += c.len_utf8();
        } else {
            out.push(c);
            i += c.len_utf8();
        }
    }
}

/// Returns the entity body and total consumed length when `text` starts
/// with a well-formed `&…;` sequence.
fn parse_entity(text: &str) -> Option<(&str, usize)> {
    let semi = text[1..].find(';')?;
    if semi == 0 || semi > 16 {
        return None;
    }
    let body = &text[1..1 + semi];
    if !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '#') {
        return None;
    }
    Some((body, semi + 2))
}

/// Decodes one entity body (the text between `&` and `;`).
fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        _ => {
            let code = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#')?.parse().ok())?;
            // Zero-width characters add nothing to plain text.
            if matches!(code, 0x200B..=0x200D | 0xFEFF) {
                return Some(String::new());
            }
            return char::from_u32(code).map(String::from);
        }
    };
    Some(decoded.to_string())
}

/// Extracts the lowercased element name from a tag body like
/// `/DIV class="x"`.
fn tag_name(tag: &str) -> String {
    tag.trim_start()
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Elements whose opening or closing marks a line break in the text form.
fn is_block_boundary(name: &str) -> bool {
    matches!(
        name,
        "br" | "p"
            | "div"
            | "tr"
            | "li"
            | "ul"
            | "ol"
            | "table"
            | "blockquote"
            | "hr"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

/// Skips past the matching close tag of a raw-text container.
fn skip_container<'a>(rest: &'a str, name: &str) -> &'a str {
    let lower = rest.to_ascii_lowercase();
    let close = format!("</{name}");
    let Some(pos) = lower.find(&close) else {
        return "";
    };
    match rest[pos..].find('>') {
        Some(gt) => &rest[pos + gt + 1..],
        None => "",
    }
}

/// Drops trailing spaces before line breaks and collapses runs of blank
/// lines down to one.
fn tidy(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            while cleaned.ends_with(' ') {
                cleaned.pop();
            }
            newlines += 1;
            if newlines <= 2 {
                cleaned.push('\n');
            }
        } else {
            newlines = 0;
            cleaned.push(c);
        }
    }
    cleaned.trim().to_string()
}
