use lazy_regex::regex;

/// Removes every markup tag. Block-level boundaries become a space so
/// adjacent paragraphs do not glue together; inline tags vanish.
pub fn strip_tags(html: &str) -> String {
    let block_re = regex!(r"(?i)<br\s*/?>|</?(?:p|div|li|ul|ol|center|pre|tr|td|th|table)\b[^>]*>");
    let tag_re = regex!(r"(?s)<[^>]*>");

    let spaced = block_re.replace_all(html, " ");
    tag_re.replace_all(&spaced, "").into_owned()
}

/// Decodes named and numeric character entities.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Collapses every whitespace run (including no-break spaces) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cleans narrative markup into a single line of text. Tags go before
/// entities are decoded, so an escaped `&lt;b&gt;` survives as the text `<b>`.
pub fn clean_text(html: &str) -> String {
    normalize_whitespace(&decode_entities(&strip_tags(html)))
}

/// Cleans a literal block (sample input/output) keeping its line structure.
///
/// `<br>` and closing `div`s become line breaks, trailing spaces are cut per
/// line, and blank lines are only removed at the very start and end.
pub fn clean_sample_text(html: &str) -> String {
    let break_re = regex!(r"(?i)<br\s*/?>|</div\s*>");
    let tag_re = regex!(r"(?s)<[^>]*>");

    let broken = break_re.replace_all(html, "\n");
    let stripped = tag_re.replace_all(&broken, "");
    let decoded = decode_entities(&stripped)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ");

    let lines: Vec<&str> = decoded.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());

    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

/// Cleans the markup of a single sample line.
pub fn clean_line(html: &str) -> String {
    let tag_re = regex!(r"(?s)<[^>]*>");
    decode_entities(&tag_re.replace_all(html, ""))
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}
