use lazy_regex::regex;

use crate::models::TestSample;
use crate::services::cleaner::{clean_line, clean_sample_text};

/// Samples of a statement and how many literal blocks each side had.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleExtraction {
    pub samples: Vec<TestSample>,
    pub inputs: usize,
    pub outputs: usize,
}

impl SampleExtraction {
    pub fn is_unpaired(&self) -> bool {
        self.inputs != self.outputs
    }
}

/// Text of one literal block and its per-line groups when every line is marked.
#[derive(Debug, Clone, Default, PartialEq)]
struct LiteralBlock {
    text: String,
    groups: Option<Vec<i32>>,
}

/// Reads explicit `test-example-line-N` markers. Only succeeds when every
/// line of the block carries one; blank marked lines are dropped together
/// with their group so groups stay aligned with non-blank lines.
fn marked_lines(pre_html: &str) -> Option<(String, Vec<i32>)> {
    let line_re = regex!(r#"(?is)<div\b[^>]*class="[^"]*test-example-line-(\d+)[^"]*"[^>]*>(.*?)</div\s*>"#);

    let unmarked = line_re.replace_all(pre_html, "");
    if !clean_line(&unmarked).is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    let mut groups = Vec::new();
    for caps in line_re.captures_iter(pre_html) {
        let group: i32 = caps.get(1)?.as_str().parse().ok()?;
        let line = clean_line(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
        if line.is_empty() {
            continue;
        }
        lines.push(line);
        groups.push(group);
    }
    if lines.is_empty() {
        return None;
    }
    Some((lines.join("\n"), groups))
}

fn literal_block(pre_html: &str) -> LiteralBlock {
    match marked_lines(pre_html) {
        Some((text, groups)) => LiteralBlock {
            text,
            groups: Some(groups),
        },
        None => LiteralBlock {
            text: clean_sample_text(pre_html),
            groups: None,
        },
    }
}

fn read_blocks(re: &regex::Regex, region: &str) -> Vec<LiteralBlock> {
    re.captures_iter(region)
        .filter_map(|caps| caps.get(1))
        .map(|m| literal_block(m.as_str()))
        .collect()
}

/// Pulls ordered input/output pairs out of the sample region.
///
/// Strict pairing keeps `min(inputs, outputs)` samples. Lenient pairing
/// (interactive problems) keeps every block and fills the missing side with
/// an empty string.
pub fn extract_samples(region: &str, lenient: bool) -> SampleExtraction {
    let input_re = regex!(r#"(?is)<div class="input">.*?<pre\b[^>]*>(.*?)</pre\s*>"#);
    let output_re = regex!(r#"(?is)<div class="output">.*?<pre\b[^>]*>(.*?)</pre\s*>"#);

    let inputs = read_blocks(input_re, region);
    let outputs = read_blocks(output_re, region);

    let count = if lenient {
        inputs.len().max(outputs.len())
    } else {
        inputs.len().min(outputs.len())
    };

    let samples = (0..count)
        .map(|i| {
            let input = inputs.get(i).cloned().unwrap_or_default();
            let output = outputs.get(i).cloned().unwrap_or_default();
            TestSample {
                index: i + 1,
                input: input.text,
                output: output.text,
                input_line_groups: input.groups,
                output_line_groups: output.groups,
            }
        })
        .collect();

    SampleExtraction {
        samples,
        inputs: inputs.len(),
        outputs: outputs.len(),
    }
}
