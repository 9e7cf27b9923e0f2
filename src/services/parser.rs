use chrono::Utc;
use std::ops::Range;

use crate::constants::{DEFAULT_SOURCE_BASE_URL, DEFAULT_SOURCE_NAME, INTERACTIVE_TAG};
use crate::models::{
    ContentElement, DiagnosticEvent, ParseDiagnostics, ProblemKey, ProblemStatement, TestSample,
};
use crate::services::content::ContentBuilder;
use crate::services::delimiters::normalize_delimiters;
use crate::services::multitest::{detect_multiple_tests, regroup_sample};
use crate::services::samples::extract_samples;
use crate::services::sections::{locate_sections, read_header, strip_section_title, SectionMap};
use crate::services::validation::validate_statement;

/// Decoded markup of one problem page plus what the caller knows about it.
#[derive(Debug, Clone)]
pub struct ParseInput {
    pub key: ProblemKey,
    pub html: String,
    /// Problem tags; only `interactive` changes parsing
    pub tags: Vec<String>,
    /// URL or file path the markup came from
    pub source: String,
}

impl ParseInput {
    pub fn new(key: ProblemKey, html: impl Into<String>) -> Self {
        Self {
            key,
            html: html.into(),
            tags: Vec::new(),
            source: DEFAULT_SOURCE_NAME.to_string(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    fn has_interactive_tag(&self) -> bool {
        self.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(INTERACTIVE_TAG))
    }
}

/// A statement together with the trace of how it was extracted.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub statement: ProblemStatement,
    pub diagnostics: ParseDiagnostics,
}

/// Turns problem page markup into a `ProblemStatement`.
///
/// Parsing is total: missing or broken sections degrade to placeholders or
/// empty content and are reported through `ParseDiagnostics`, never as errors.
/// The parser holds no mutable state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct StatementParser {
    content: ContentBuilder,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_BASE_URL)
    }
}

impl StatementParser {
    /// `base_url` is used to resolve root-relative image paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            content: ContentBuilder::new(base_url),
        }
    }

    pub fn parse(&self, input: &ParseInput) -> ProblemStatement {
        self.parse_with_diagnostics(input).statement
    }

    pub fn parse_with_diagnostics(&self, input: &ParseInput) -> ParseOutcome {
        let mut diagnostics = ParseDiagnostics::new();
        let markup = normalize_delimiters(&input.html);
        let map = locate_sections(&markup);
        let header = read_header(&markup, &map, &mut diagnostics);

        let statement = self
            .prose_section("statement", &markup, &map.statement, true, &mut diagnostics)
            .unwrap_or_default();
        let input_spec = self
            .prose_section("input_spec", &markup, &map.input_spec, true, &mut diagnostics)
            .unwrap_or_default();
        let output_spec = self
            .prose_section("output_spec", &markup, &map.output_spec, true, &mut diagnostics)
            .unwrap_or_default();
        let interaction = self.prose_section("interaction", &markup, &map.interaction, false, &mut diagnostics);
        let note = self.prose_section("note", &markup, &map.note, false, &mut diagnostics);

        let is_interactive = input.has_interactive_tag() || map.interaction.is_some();
        let mut samples = self.samples(&markup, &map, is_interactive, &mut diagnostics);

        let has_multiple_test_cases = detect_multiple_tests(&input_spec);
        if has_multiple_test_cases {
            diagnostics.push(DiagnosticEvent::MultiTestDetected);
            samples = samples
                .iter()
                .map(|sample| {
                    let regrouped = regroup_sample(sample);
                    if regrouped.changed() {
                        diagnostics.push(DiagnosticEvent::SampleRegrouped {
                            index: sample.index,
                            input: regrouped.input,
                            output: regrouped.output,
                        });
                    }
                    regrouped.sample
                })
                .collect();
        }

        let statement = ProblemStatement {
            key: input.key.clone(),
            name: header.name,
            time_limit: header.time_limit,
            memory_limit: header.memory_limit,
            input_file: header.input_file,
            output_file: header.output_file,
            statement,
            input_spec,
            output_spec,
            interaction: interaction.filter(|elements| !elements.is_empty()),
            note: note.filter(|elements| !elements.is_empty()),
            samples,
            has_multiple_test_cases,
            is_interactive,
            tags: input.tags.clone(),
            source: input.source.clone(),
            fetched_at: Utc::now(),
        };

        let validation = validate_statement(&statement);
        for error in validation.errors {
            let message = match error.location {
                Some(location) => format!("{} ({}): {}", error.code, location, error.message),
                None => format!("{}: {}", error.code, error.message),
            };
            diagnostics.push(DiagnosticEvent::InvariantViolation { message });
        }
        for warning in &validation.warnings {
            log::debug!("{}: {} {}", statement.key, warning.code, warning.message);
        }

        log::debug!(
            "Parsed {} with {} samples and {} diagnostic events",
            statement.key,
            statement.samples.len(),
            diagnostics.events.len()
        );

        ParseOutcome {
            statement,
            diagnostics,
        }
    }

    /// Builds one prose section. `None` when its anchor was not found.
    fn prose_section(
        &self,
        name: &str,
        markup: &str,
        range: &Option<Range<usize>>,
        required: bool,
        diagnostics: &mut ParseDiagnostics,
    ) -> Option<Vec<ContentElement>> {
        if range.is_none() {
            if required {
                diagnostics.section_missing(name);
            }
            return None;
        }

        let html = strip_section_title(SectionMap::slice(markup, range));
        let built = self.content.build_section(&html);
        if built.used_math_fallback {
            diagnostics.push(DiagnosticEvent::MathFallbackUsed {
                section: name.to_string(),
            });
        }
        if built.only_loose_text {
            diagnostics.push(DiagnosticEvent::NoBlocksFound {
                section: name.to_string(),
            });
        }
        Some(built.elements)
    }

    fn samples(
        &self,
        markup: &str,
        map: &SectionMap,
        lenient: bool,
        diagnostics: &mut ParseDiagnostics,
    ) -> Vec<TestSample> {
        if map.samples.is_none() {
            diagnostics.section_missing("samples");
            return Vec::new();
        }

        let extraction = extract_samples(SectionMap::slice(markup, &map.samples), lenient);
        if extraction.is_unpaired() {
            diagnostics.push(DiagnosticEvent::SamplesUnpaired {
                inputs: extraction.inputs,
                outputs: extraction.outputs,
            });
        }
        extraction.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_TIME_LIMIT, UNTITLED_PROBLEM};
    use crate::models::RegroupStrategy;
    use pretty_assertions::assert_eq;

    fn marked(group: i32, text: &str) -> String {
        let parity = if group % 2 == 0 { "even" } else { "odd" };
        format!(
            r#"<div class="test-example-line test-example-line-{} test-example-line-{}">{}</div>"#,
            parity, group, text
        )
    }

    fn multitest_page() -> String {
        let input_lines = [marked(0, "2"), marked(1, "3"), marked(1, "1 2 3"), marked(2, "1"), marked(2, "5")].concat();
        [
            r#"<html><head><title>Problem - 1843B - Codeforces</title></head><body>"#,
            r#"<div id="header"><p>Codeforces menu</p></div>"#,
            r#"<div class="problem-statement">"#,
            r#"<div class="header"><div class="title">B. Long Sum</div>"#,
            r#"<div class="time-limit"><div class="property-title">time limit per test</div>2 seconds</div>"#,
            r#"<div class="memory-limit"><div class="property-title">memory limit per test</div>256 megabytes</div>"#,
            r#"<div class="input-file"><div class="property-title">input</div>standard input</div>"#,
            r#"<div class="output-file"><div class="property-title">output</div>standard output</div></div>"#,
            r#"<div><p>You are given an array <span class="tex-span">$$$a$$$</span> of <span class="tex-span">$$$n$$$</span> integers.</p>"#,
            r#"<p>Find <span class="tex-span">$$$$$$\sum_{i=1}^{n} a_i$$$$$$</span>.</p></div>"#,
            r#"<div class="input-specification"><div class="section-title">Input</div>"#,
            r#"<p>The first line contains a single integer <span class="tex-span">$$$t$$$</span> (<span class="tex-span">$$$1 \le t \le 10^4$$$</span>) &mdash; the number of test cases.</p>"#,
            r#"<p>Each test case consists of two lines.</p></div>"#,
            r#"<div class="output-specification"><div class="section-title">Output</div><p>For each test case, print the sum.</p></div>"#,
            r#"<div class="sample-tests"><div class="section-title">Example</div><div class="sample-test">"#,
            r#"<div class="input"><div class="title">Input</div><pre>"#,
            &input_lines,
            r#"</pre></div><div class="output"><div class="title">Output</div><pre>6
5
</pre></div></div></div>"#,
            r#"<div class="note"><div class="section-title">Note</div><p>In the first test case the sum is <span class="tex-span">$$$6$$$</span>.</p>"#,
            r#"<center><img class="tex-graphics" src="//espresso.codeforces.com/abc.png"></center></div>"#,
            r#"</div><div id="footer">Footer</div></body></html>"#,
        ]
        .concat()
    }

    fn parse(html: &str) -> ParseOutcome {
        StatementParser::default().parse_with_diagnostics(&ParseInput::new(ProblemKey::new(1843, "B"), html))
    }

    fn text(s: &str) -> ContentElement {
        ContentElement::Text(s.to_string())
    }

    #[test]
    fn test_full_multitest_page() {
        let outcome = parse(&multitest_page());
        let s = &outcome.statement;

        assert_eq!(s.display_name(), "1843B. B. Long Sum");
        assert_eq!(s.time_limit, "2 seconds");
        assert_eq!(s.memory_limit, "256 megabytes");
        assert_eq!(s.input_file, "standard input");
        assert_eq!(
            s.statement,
            vec![
                ContentElement::Paragraph(vec![
                    text("You are given an array"),
                    ContentElement::InlineMath("a".into()),
                    text("of"),
                    ContentElement::InlineMath("n".into()),
                    text("integers."),
                ]),
                text("Find"),
                ContentElement::BlockMath("\\sum_{i=1}^{n} a_i".into()),
                text("."),
            ]
        );
        assert_eq!(s.output_spec, vec![text("For each test case, print the sum.")]);
        assert_eq!(
            s.note,
            Some(vec![
                ContentElement::Paragraph(vec![
                    text("In the first test case the sum is"),
                    ContentElement::InlineMath("6".into()),
                    text("."),
                ]),
                ContentElement::Image("https://espresso.codeforces.com/abc.png".into()),
            ])
        );
        assert!(s.interaction.is_none());
        assert!(!s.is_interactive);

        assert!(s.has_multiple_test_cases);
        assert_eq!(s.samples.len(), 1);
        assert_eq!(s.samples[0].input, "2\n3\n1 2 3\n1\n5");
        assert_eq!(s.samples[0].output, "6\n5");
        assert_eq!(s.samples[0].input_line_groups, Some(vec![-1, 0, 0, 1, 1]));
        assert_eq!(s.samples[0].output_line_groups, None);

        assert_eq!(
            outcome.diagnostics.events,
            vec![
                DiagnosticEvent::MultiTestDetected,
                DiagnosticEvent::SampleRegrouped {
                    index: 1,
                    input: Some(RegroupStrategy::ExplicitShift),
                    output: None,
                },
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let statement = parse(&multitest_page()).statement;
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["key"]["contest_id"], 1843);
        assert_eq!(json["statement"][1], serde_json::json!({"type": "text", "value": "Find"}));
        assert_eq!(json["samples"][0]["index"], 1);
        assert!(json["samples"][0].get("output_line_groups").is_none());
    }

    #[test]
    fn test_raw_delimiters_use_fallback() {
        let html = concat!(
            r#"<div class="problem-statement"><div class="header"><div class="title">A. Square</div></div>"#,
            r#"<div><p>Compute $$x^2$$ for $x$.</p></div>"#,
            r#"<div class="input-specification"><div class="section-title">Input</div><p>One integer $x$.</p></div>"#,
            r#"<div class="output-specification"><div class="section-title">Output</div><p>The square.</p></div>"#,
            r#"<div class="sample-tests"><div class="sample-test">"#,
            r#"<div class="input"><pre>3</pre></div><div class="output"><pre>9</pre></div></div></div></div>"#,
        );
        let outcome = parse(html);
        let s = &outcome.statement;
        assert_eq!(
            s.statement,
            vec![
                text("Compute"),
                ContentElement::BlockMath("x^2".into()),
                ContentElement::Paragraph(vec![text("for"), ContentElement::InlineMath("x".into()), text(".")]),
            ]
        );
        assert!(!s.has_multiple_test_cases);
        assert_eq!(s.samples, vec![TestSample::new(1, "3".into(), "9".into())]);

        let fallback_sections: Vec<&str> = outcome
            .diagnostics
            .events
            .iter()
            .filter_map(|e| match e {
                DiagnosticEvent::MathFallbackUsed { section } => Some(section.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fallback_sections, vec!["statement", "input_spec"]);
        assert!(outcome.diagnostics.events.contains(&DiagnosticEvent::SectionMissing {
            section: "time_limit".into()
        }));
    }

    #[test]
    fn test_interactive_pairing_is_lenient() {
        let html = concat!(
            r#"<div class="problem-statement"><div class="header"><div class="title">C. Guess</div></div>"#,
            r#"<div><p>Guess the hidden number.</p></div>"#,
            r#"<div class="input-specification"><div class="section-title">Input</div><p>Read n.</p></div>"#,
            r#"<div class="sample-tests"><div class="sample-test">"#,
            r#"<div class="input"><pre>5</pre></div><div class="output"><pre>? 3</pre></div>"#,
            r#"<div class="input"><pre>&lt;</pre></div></div></div></div>"#,
        );

        let strict = parse(html);
        assert!(!strict.statement.is_interactive);
        assert_eq!(strict.statement.samples.len(), 1);
        assert!(strict
            .diagnostics
            .events
            .contains(&DiagnosticEvent::SamplesUnpaired { inputs: 2, outputs: 1 }));

        let input = ParseInput::new(ProblemKey::new(1807, "e"), html)
            .with_tags(vec!["Interactive".into(), "binary search".into()])
            .with_source("https://codeforces.com/contest/1807/problem/E");
        let lenient = StatementParser::default().parse(&input);
        assert!(lenient.is_interactive);
        assert_eq!(lenient.key.to_string(), "1807E");
        assert_eq!(lenient.samples.len(), 2);
        assert_eq!(lenient.samples[1].input, "<");
        assert_eq!(lenient.samples[1].output, "");
        assert_eq!(lenient.source, "https://codeforces.com/contest/1807/problem/E");
    }

    #[test]
    fn test_interaction_title_marks_interactive() {
        let html = concat!(
            r#"<div class="problem-statement"><div class="header"><div class="title">D. Ask</div></div>"#,
            r#"<div><p>Find x.</p></div>"#,
            r#"<div><div class="section-title">Interaction</div><p>Print <span class="tex-span">$$$?\ y$$$</span> to ask.</p></div>"#,
            r#"</div>"#,
        );
        let s = parse(html).statement;
        assert!(s.is_interactive);
        assert_eq!(
            s.interaction,
            Some(vec![ContentElement::Paragraph(vec![
                text("Print"),
                ContentElement::InlineMath("?\\ y".into()),
                text("to ask."),
            ])])
        );
        assert_eq!(s.statement, vec![text("Find x.")]);
    }

    #[test]
    fn test_bare_title_document() {
        let outcome = parse(r#"<div class="title">Greedy Monocarp</div>"#);
        assert_eq!(outcome.statement.name, "Greedy Monocarp");
        assert_eq!(outcome.statement.time_limit, DEFAULT_TIME_LIMIT);
        assert!(outcome.statement.statement.is_empty());
        assert!(outcome.statement.samples.is_empty());
    }

    #[test]
    fn test_empty_document_reports_every_missing_section() {
        let outcome = parse("");
        assert_eq!(outcome.statement.name, UNTITLED_PROBLEM);
        let missing: Vec<&str> = outcome
            .diagnostics
            .events
            .iter()
            .filter_map(|e| match e {
                DiagnosticEvent::SectionMissing { section } => Some(section.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            missing,
            vec![
                "title",
                "time_limit",
                "memory_limit",
                "input_file",
                "output_file",
                "statement",
                "input_spec",
                "output_spec",
                "samples",
            ]
        );
        assert!(!outcome.diagnostics.has_violations());
    }

    #[test]
    fn test_total_on_garbage() {
        let inputs = [
            "",
            "$$$",
            "$$$$$$$ unmatched $ and $$",
            "<<<>>></div></div><p><p><ul><li>",
            "\u{0}\u{fffd}\u{1b}[0m binary junk \u{7f}",
            r#"<div class="problem-statement"><div class="sample-tests"><div class="input"><pre>1"#,
            r#"<div class="input-specification"><p>number of test cases <div class="sample-tests"><div class="input"><pre>3</pre></div><div class="output"><pre></pre></div>"#,
            r#"<p><span class="tex-span">$$$</span><img src=""><center></p></center>"#,
        ];
        let parser = StatementParser::default();
        for html in inputs {
            let outcome = parser.parse_with_diagnostics(&ParseInput::new(ProblemKey::new(1, "A"), html));
            assert!(!outcome.diagnostics.has_violations(), "{html:?}: {:?}", outcome.diagnostics);
            assert!(!outcome.statement.name.is_empty());
        }
    }
}
