use lazy_regex::regex;

use crate::constants::EXCLUDED_GROUP;
use crate::models::{non_blank_lines, plain_text, ContentElement, RegroupStrategy, TestSample};

/// Whether the input specification describes a leading test-count line.
pub fn detect_multiple_tests(input_spec: &[ContentElement]) -> bool {
    let text = plain_text(input_spec).to_lowercase();
    let patterns = [
        regex!(r"number of test ?cases"),
        regex!(r"number of tests\b"),
        regex!(r"(?:multiple|several) test ?cases"),
        regex!(r"first line .{0,120}?\btest ?cases"),
        regex!(r"each test ?case (?:contains|consists|is given|starts)"),
        regex!(r"number of (?:input )?data ?sets"),
        regex!(r"sum of .{0,60}?over all test ?cases"),
    ];
    patterns.iter().any(|re| re.is_match(&text))
}

/// A regrouped sample and which strategy produced each side.
#[derive(Debug, Clone, PartialEq)]
pub struct Regrouped {
    pub sample: TestSample,
    pub input: Option<RegroupStrategy>,
    pub output: Option<RegroupStrategy>,
}

impl Regrouped {
    fn unchanged(sample: &TestSample) -> Self {
        Self {
            sample: sample.clone(),
            input: None,
            output: None,
        }
    }

    pub fn changed(&self) -> bool {
        self.input.is_some() || self.output.is_some()
    }
}

/// Run id for every non-blank line, where runs are separated by blank lines,
/// plus the number of distinct runs.
fn blank_line_runs<'a>(lines: impl Iterator<Item = &'a str>) -> (Vec<i32>, usize) {
    let mut ids = Vec::new();
    let mut run = 0i32;
    let mut in_run = false;
    for line in lines {
        if line.trim().is_empty() {
            if in_run {
                run += 1;
                in_run = false;
            }
        } else {
            ids.push(run);
            in_run = true;
        }
    }
    let distinct = ids.last().map(|&last| last as usize + 1).unwrap_or(0);
    (ids, distinct)
}

/// Splits `n` lines into `tests` contiguous chunks; the last chunk takes the remainder.
fn equal_chunks(n: usize, tests: usize) -> Vec<i32> {
    let chunk = (n / tests).max(1);
    (0..n).map(|i| (i / chunk).min(tests - 1) as i32).collect()
}

fn shift_explicit(sample: &TestSample, input_groups: &[i32]) -> Regrouped {
    let mut input = Vec::with_capacity(input_groups.len());
    input.push(EXCLUDED_GROUP);
    input.extend(input_groups[1..].iter().map(|g| g - 1));

    let output = sample
        .output_line_groups
        .as_ref()
        .map(|groups| groups.iter().map(|g| g - 1).collect::<Vec<_>>());
    let output_strategy = output.as_ref().map(|_| RegroupStrategy::ExplicitShift);

    Regrouped {
        sample: TestSample {
            input_line_groups: Some(input),
            output_line_groups: output,
            ..sample.clone()
        },
        input: Some(RegroupStrategy::ExplicitShift),
        output: output_strategy,
    }
}

fn group_input(input: &str, tests: usize) -> (Vec<i32>, RegroupStrategy) {
    let mut lines = input.lines().skip_while(|l| l.trim().is_empty());
    lines.next();
    let rest: Vec<&str> = lines.collect();

    let (runs, distinct) = blank_line_runs(rest.iter().copied());
    let (groups, strategy) = if distinct > 1 && distinct <= tests.saturating_add(1) {
        (runs, RegroupStrategy::BlankLines)
    } else {
        (equal_chunks(runs.len(), tests), RegroupStrategy::EqualChunks)
    };

    let mut all = Vec::with_capacity(groups.len() + 1);
    all.push(EXCLUDED_GROUP);
    all.extend(groups);
    (all, strategy)
}

fn group_output(output: &str, tests: usize) -> Option<(Vec<i32>, RegroupStrategy)> {
    let count = non_blank_lines(output).len();
    if count == 0 {
        return None;
    }

    let (runs, distinct) = blank_line_runs(output.lines());
    // A single run carries no grouping, so it falls through to the line count.
    if distinct > 1 && distinct.abs_diff(tests) <= 1 {
        Some((runs, RegroupStrategy::BlankLines))
    } else if count == tests {
        Some(((0..count as i32).collect(), RegroupStrategy::OnePerLine))
    } else {
        Some((equal_chunks(count, tests), RegroupStrategy::EqualChunks))
    }
}

/// Regroups one sample of a multi-test problem. The first input line (the
/// test count) gets the excluded group; the rest are split per test case,
/// from explicit markers, then blank-line runs, then an even split.
pub fn regroup_sample(sample: &TestSample) -> Regrouped {
    match &sample.input_line_groups {
        Some(groups) if groups.len() >= 2 => return shift_explicit(sample, groups),
        Some(_) => return Regrouped::unchanged(sample),
        None => {}
    }

    let lines = sample.input_lines();
    if lines.len() < 2 {
        return Regrouped::unchanged(sample);
    }
    let tests = match lines[0].trim().parse::<i64>() {
        Ok(t) if t > 1 => usize::try_from(t).unwrap_or(usize::MAX),
        _ => return Regrouped::unchanged(sample),
    };

    let (input_groups, input_strategy) = group_input(&sample.input, tests);
    let output = match &sample.output_line_groups {
        Some(_) => None,
        None => group_output(&sample.output, tests),
    };

    let (output_groups, output_strategy) = match output {
        Some((groups, strategy)) => (Some(groups), Some(strategy)),
        None => (sample.output_line_groups.clone(), None),
    };

    Regrouped {
        sample: TestSample {
            input_line_groups: Some(input_groups),
            output_line_groups: output_groups,
            ..sample.clone()
        },
        input: Some(input_strategy),
        output: output_strategy,
    }
}
