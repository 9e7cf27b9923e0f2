use lazy_regex::regex;
use std::cmp::Reverse;
use std::ops::Range;

use crate::services::cleaner::clean_text;

/// Kind of block, in search priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKind {
    Paragraph,
    ContentDiv,
    Centered,
    List,
    /// Text not covered by any search
    Loose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    pub kind: BlockKind,
    pub range: Range<usize>,
    pub html: &'a str,
}

fn candidates(html: &str) -> Vec<(Range<usize>, BlockKind)> {
    let searches = [
        (regex!(r"(?is)<p\b[^>]*>.*?</p\s*>"), BlockKind::Paragraph),
        (
            regex!(r#"(?is)<div\b[^>]*class="[^"]*content[^"]*"[^>]*>.*?</div\s*>"#),
            BlockKind::ContentDiv,
        ),
        (
            regex!(r#"(?is)<center\b[^>]*>.*?</center\s*>|<div\b[^>]*style="[^"]*text-align:\s*center[^"]*"[^>]*>.*?</div\s*>"#),
            BlockKind::Centered,
        ),
        (
            regex!(r"(?is)<ul\b[^>]*>.*?</ul\s*>|<ol\b[^>]*>.*?</ol\s*>"),
            BlockKind::List,
        ),
    ];

    let mut found = Vec::new();
    for (re, kind) in searches {
        for m in re.find_iter(html) {
            found.push((m.range(), kind));
        }
    }
    found
}

/// Keeps outer matches and drops anything starting inside an already kept
/// block. Output is sorted by start and pairwise disjoint.
fn resolve_overlaps(mut found: Vec<(Range<usize>, BlockKind)>) -> Vec<(Range<usize>, BlockKind)> {
    found.sort_by_key(|(range, kind)| (range.start, Reverse(range.end), *kind));

    let mut kept: Vec<(Range<usize>, BlockKind)> = Vec::with_capacity(found.len());
    for (range, kind) in found {
        let last_end = kept.last().map(|(r, _)| r.end).unwrap_or(0);
        if kept.is_empty() || range.start >= last_end {
            kept.push((range, kind));
        }
    }
    kept
}

fn has_content(html: &str) -> bool {
    !clean_text(html).is_empty() || html.contains("<img")
}

/// Ordered, non-overlapping blocks of a section.
///
/// Paragraphs, content divs, centered blocks and lists are searched
/// independently. Candidates are ordered by start and the outer match wins;
/// identical ranges keep the earlier search. Text left between kept blocks
/// becomes a `Loose` block.
pub fn extract_blocks(html: &str) -> Vec<Block<'_>> {
    let kept = resolve_overlaps(candidates(html));

    let mut blocks = Vec::with_capacity(kept.len());
    let mut cursor = 0;
    for (range, kind) in kept {
        if range.start > cursor && has_content(&html[cursor..range.start]) {
            blocks.push(Block {
                kind: BlockKind::Loose,
                range: cursor..range.start,
                html: &html[cursor..range.start],
            });
        }
        cursor = range.end;
        blocks.push(Block {
            kind,
            html: &html[range.clone()],
            range,
        });
    }
    if cursor < html.len() && has_content(&html[cursor..]) {
        blocks.push(Block {
            kind: BlockKind::Loose,
            range: cursor..html.len(),
            html: &html[cursor..],
        });
    }
    blocks
}
