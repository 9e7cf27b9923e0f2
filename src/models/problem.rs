use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a problem: contest id plus problem index.
/// Example: 1843 + "B1" -> "1843B1"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemKey {
    pub contest_id: u32,
    pub index: String,
}

impl ProblemKey {
    pub fn new(contest_id: u32, index: impl Into<String>) -> Self {
        Self {
            contest_id,
            index: index.into().trim().to_uppercase(),
        }
    }
}

impl fmt::Display for ProblemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.contest_id, self.index)
    }
}

/// One renderable unit of a statement section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentElement {
    /// Plain narrative text, already cleaned
    Text(String),
    /// Formula flowing within a line of text
    InlineMath(String),
    /// Formula standing on its own line
    BlockMath(String),
    /// Absolute image URL
    Image(String),
    List(Vec<String>),
    /// Monospace block; part of the model but not produced by extraction yet
    Code(String),
    /// Inline elements rendered on one logical line
    Paragraph(Vec<ContentElement>),
}

impl ContentElement {
    /// Builds a paragraph, splicing the children of nested paragraphs in place
    /// so a paragraph never directly contains another one.
    pub fn paragraph(children: Vec<ContentElement>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                ContentElement::Paragraph(inner) => {
                    if let ContentElement::Paragraph(inner) = ContentElement::paragraph(inner) {
                        flat.extend(inner);
                    }
                }
                other => flat.push(other),
            }
        }
        ContentElement::Paragraph(flat)
    }

    /// Whether the element may sit inside a paragraph.
    pub fn is_inline(&self) -> bool {
        matches!(self, ContentElement::Text(_) | ContentElement::InlineMath(_))
    }

    /// Flattens the element to plain text. Math becomes its formula,
    /// list items go one per line, images are dropped.
    pub fn plain_text(&self) -> String {
        match self {
            ContentElement::Text(t) | ContentElement::Code(t) => t.clone(),
            ContentElement::InlineMath(f) | ContentElement::BlockMath(f) => f.clone(),
            ContentElement::Image(_) => String::new(),
            ContentElement::List(items) => items.join("\n"),
            ContentElement::Paragraph(children) => children
                .iter()
                .map(ContentElement::plain_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Flattens a whole section to plain text, one element per line.
pub fn plain_text(elements: &[ContentElement]) -> String {
    elements
        .iter()
        .map(ContentElement::plain_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One example test from the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSample {
    /// 1-based position among the samples
    pub index: usize,
    pub input: String,
    pub output: String,
    /// Group id per non-blank input line; -1 means "not part of any test case"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_line_groups: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_line_groups: Option<Vec<i32>>,
}

impl TestSample {
    pub fn new(index: usize, input: String, output: String) -> Self {
        Self {
            index,
            input,
            output,
            input_line_groups: None,
            output_line_groups: None,
        }
    }

    pub fn input_lines(&self) -> Vec<&str> {
        non_blank_lines(&self.input)
    }

    pub fn output_lines(&self) -> Vec<&str> {
        non_blank_lines(&self.output)
    }
}

/// Lines that carry something other than whitespace.
pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.trim().is_empty()).collect()
}

/// Fully extracted problem statement. Built once per parse and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemStatement {
    pub key: ProblemKey,
    pub name: String,
    pub time_limit: String,
    pub memory_limit: String,
    pub input_file: String,
    pub output_file: String,
    pub statement: Vec<ContentElement>,
    pub input_spec: Vec<ContentElement>,
    pub output_spec: Vec<ContentElement>,
    /// Present for interactive problems that describe the protocol separately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Vec<ContentElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<ContentElement>>,
    pub samples: Vec<TestSample>,
    pub has_multiple_test_cases: bool,
    pub is_interactive: bool,
    pub tags: Vec<String>,
    /// Where the markup came from (URL or file path)
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl ProblemStatement {
    /// Display id for UI (e.g. "1843B1. Tenzing and Books")
    pub fn display_name(&self) -> String {
        format!("{}. {}", self.key, self.name)
    }
}
