use lazy_regex::regex;
use std::ops::Range;

use crate::constants::*;
use crate::models::ParseDiagnostics;
use crate::services::cleaner::clean_text;

/// Byte ranges of each section inside the normalized markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    pub title: Option<Range<usize>>,
    pub time_limit: Option<Range<usize>>,
    pub memory_limit: Option<Range<usize>>,
    pub input_file: Option<Range<usize>>,
    pub output_file: Option<Range<usize>>,
    pub statement: Option<Range<usize>>,
    pub input_spec: Option<Range<usize>>,
    pub output_spec: Option<Range<usize>>,
    pub interaction: Option<Range<usize>>,
    pub samples: Option<Range<usize>>,
    pub note: Option<Range<usize>>,
}

impl SectionMap {
    /// Content of a located section, or "" when it was not found.
    pub fn slice<'a>(markup: &'a str, range: &Option<Range<usize>>) -> &'a str {
        range
            .as_ref()
            .and_then(|r| markup.get(r.clone()))
            .unwrap_or("")
    }
}

/// Header values with placeholders already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub name: String,
    pub time_limit: String,
    pub memory_limit: String,
    pub input_file: String,
    pub output_file: String,
}

fn find_from(text: &str, pattern: &str, from: usize) -> Option<usize> {
    text.get(from..)?.find(pattern).map(|p| p + from)
}

/// Position just past the `</div>` that closes the `<div` opening at `open`,
/// together with the start of that closing tag.
fn matching_div_close(text: &str, open: usize) -> Option<(usize, usize)> {
    let tag_re = regex!(r"(?i)<div\b[^>]*>|</div\s*>");
    let mut depth = 0usize;
    for m in tag_re.find_iter(text.get(open..)?) {
        if m.as_str().starts_with("</") {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some((open + m.start(), open + m.end()));
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// Range of the `problem-statement` container, or the whole text.
fn statement_scope(text: &str) -> Range<usize> {
    let scope_re = regex!(r#"<div\s+class="problem-statement"\s*>"#);
    scope_re
        .find(text)
        .and_then(|m| matching_div_close(text, m.start()).map(|(close, _)| m.end()..close))
        .unwrap_or(0..text.len())
}

/// Value of a header property such as time limit: the text after the
/// optional `property-title` div up to the property's closing `</div>`.
fn locate_property(text: &str, scope: &Range<usize>, marker: &str) -> Option<Range<usize>> {
    let title_re = regex!(r#"(?s)^\s*<div class="property-title">.*?</div>"#);

    let start = find_from(&text[..scope.end], marker, scope.start)? + marker.len();
    let value_start = title_re
        .find(&text[start..scope.end])
        .map(|m| start + m.end())
        .unwrap_or(start);
    let value_end = find_from(&text[..scope.end], DIV_CLOSE, value_start)?;
    Some(value_start..value_end)
}

/// Title inside the header div. Without a header the first title in scope is
/// used; with one, a title outside it (e.g. a sample caption) never counts.
fn locate_title(text: &str, scope: &Range<usize>) -> Option<Range<usize>> {
    let within = &text[..scope.end];
    let (from, until) = match find_from(within, HEADER_MARKER, scope.start) {
        Some(header) => (header, matching_div_close(within, header)?.0),
        None => (scope.start, scope.end),
    };
    let bounded = &text[..until];
    let start = find_from(bounded, TITLE_MARKER, from)? + TITLE_MARKER.len();
    let end = find_from(bounded, DIV_CLOSE, start)?;
    Some(start..end)
}

/// Start of the div enclosing a section titled "Interaction", unless that div
/// is itself the input or output specification.
fn locate_interaction_start(text: &str, scope: &Range<usize>) -> Option<(usize, usize)> {
    let title_re = regex!(r#"(?s)<div class="section-title">\s*Interaction\s*</div>"#);
    let m = title_re.find(&text[scope.clone()])?;
    let title_start = scope.start + m.start();
    let open = text[scope.start..title_start].rfind("<div").map(|p| scope.start + p)?;
    let enclosing = &text[open..title_start];
    if enclosing.starts_with(INPUT_SPEC_MARKER) || enclosing.starts_with(OUTPUT_SPEC_MARKER) {
        return None;
    }
    Some((open, scope.start + m.end()))
}

/// Content of a marker-opened section: from the end of the marker to the
/// earliest of the next boundary marker and the section's own closing div.
fn locate_block_section(
    text: &str,
    scope: &Range<usize>,
    start: usize,
    content_start: usize,
    boundaries: &[Option<usize>],
) -> Range<usize> {
    let next_boundary = boundaries
        .iter()
        .flatten()
        .copied()
        .filter(|&b| b > start)
        .min()
        .unwrap_or(scope.end);
    let own_close = matching_div_close(&text[..scope.end], start)
        .map(|(close, _)| close)
        .unwrap_or(scope.end);
    content_start..next_boundary.min(own_close).max(content_start)
}

/// Locates every section of the page with independent two-anchor scans.
/// Pure and total: a missing anchor yields `None`, never an error.
pub fn locate_sections(text: &str) -> SectionMap {
    let scope = statement_scope(text);
    let within = &text[..scope.end];

    let header = find_from(within, HEADER_MARKER, scope.start);
    let input_spec = find_from(within, INPUT_SPEC_MARKER, scope.start);
    let output_spec = find_from(within, OUTPUT_SPEC_MARKER, scope.start);
    let samples = find_from(within, SAMPLE_TESTS_MARKER, scope.start)
        .or_else(|| find_from(within, SAMPLE_TEST_MARKER, scope.start));
    let note = find_from(within, NOTE_MARKER, scope.start);
    let interaction = locate_interaction_start(text, &scope);
    let interaction_open = interaction.map(|(open, _)| open);

    let mut map = SectionMap {
        title: locate_title(text, &scope),
        time_limit: locate_property(text, &scope, TIME_LIMIT_MARKER),
        memory_limit: locate_property(text, &scope, MEMORY_LIMIT_MARKER),
        input_file: locate_property(text, &scope, INPUT_FILE_MARKER),
        output_file: locate_property(text, &scope, OUTPUT_FILE_MARKER),
        ..SectionMap::default()
    };

    // The legend has no class of its own: it starts after the header and ends
    // at the last `</div>` before whichever section comes next.
    let body_start = header
        .and_then(|h| matching_div_close(within, h).map(|(_, after)| after))
        .or_else(|| map.output_file.as_ref().map(|r| r.end + DIV_CLOSE.len()))
        .or_else(|| map.title.as_ref().map(|r| r.end + DIV_CLOSE.len()))
        .unwrap_or(scope.start);
    let body_boundary = [input_spec, interaction_open, output_spec, samples, note]
        .into_iter()
        .flatten()
        .filter(|&b| b >= body_start)
        .min();
    if let Some(boundary) = body_boundary {
        let body_end = text[body_start..boundary]
            .rfind(DIV_CLOSE)
            .map(|p| body_start + p)
            .unwrap_or(boundary);
        if body_end > body_start {
            map.statement = Some(body_start..body_end);
        }
    } else if body_start < scope.end {
        map.statement = Some(body_start..scope.end);
    }

    map.input_spec = input_spec.map(|start| {
        locate_block_section(
            text,
            &scope,
            start,
            start + INPUT_SPEC_MARKER.len(),
            &[interaction_open, output_spec, samples, note],
        )
    });
    map.output_spec = output_spec.map(|start| {
        locate_block_section(
            text,
            &scope,
            start,
            start + OUTPUT_SPEC_MARKER.len(),
            &[interaction_open, samples, note],
        )
    });
    map.interaction = interaction.map(|(open, content_start)| {
        locate_block_section(text, &scope, open, content_start, &[output_spec, samples, note])
    });
    map.samples = samples.map(|start| {
        locate_block_section(text, &scope, start, start, &[note])
    });
    map.note = note.map(|start| {
        locate_block_section(text, &scope, start, start + NOTE_MARKER.len(), &[])
    });

    map
}

/// Removes `<div class="section-title">…</div>` headings from section content.
pub fn strip_section_title(html: &str) -> String {
    let title_re = regex!(r#"(?s)<div class="section-title">.*?</div>"#);
    title_re.replace_all(html, "").into_owned()
}

/// Reads the header values, substituting placeholders for anything missing.
pub fn read_header(text: &str, map: &SectionMap, diagnostics: &mut ParseDiagnostics) -> HeaderInfo {
    let mut read = |name: &str, range: &Option<Range<usize>>, default: &str| {
        let value = clean_text(SectionMap::slice(text, range));
        if value.is_empty() {
            diagnostics.section_missing(name);
            default.to_string()
        } else {
            value
        }
    };

    HeaderInfo {
        name: read("title", &map.title, UNTITLED_PROBLEM),
        time_limit: read("time_limit", &map.time_limit, DEFAULT_TIME_LIMIT),
        memory_limit: read("memory_limit", &map.memory_limit, DEFAULT_MEMORY_LIMIT),
        input_file: read("input_file", &map.input_file, DEFAULT_INPUT_FILE),
        output_file: read("output_file", &map.output_file, DEFAULT_OUTPUT_FILE),
    }
}
