use serde::{Deserialize, Serialize};

/// How a sample's line groups were (re)derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegroupStrategy {
    /// Explicit per-line markers shifted to exclude the test-count line
    ExplicitShift,
    BlankLines,
    EqualChunks,
    OnePerLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// An anchor was not found; the section fell back to a default or empty value
    SectionMissing { section: String },
    /// Math came from raw delimiter pairing instead of tagged spans
    MathFallbackUsed { section: String },
    /// No block matched; the section was read as one loose-text block
    NoBlocksFound { section: String },
    SamplesUnpaired { inputs: usize, outputs: usize },
    MultiTestDetected,
    SampleRegrouped {
        index: usize,
        input: Option<RegroupStrategy>,
        output: Option<RegroupStrategy>,
    },
    InvariantViolation { message: String },
}

/// Structured trace of the decisions taken while parsing one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub events: Vec<DiagnosticEvent>,
}

impl ParseDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: DiagnosticEvent) {
        log::debug!("parse diagnostic: {:?}", event);
        self.events.push(event);
    }

    pub fn section_missing(&mut self, section: &str) {
        self.push(DiagnosticEvent::SectionMissing {
            section: section.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn has_violations(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, DiagnosticEvent::InvariantViolation { .. }))
    }
}
