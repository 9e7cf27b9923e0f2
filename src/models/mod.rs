pub mod diagnostics;
pub mod problem;

pub use diagnostics::*;
pub use problem::*;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ProblemPath {
    pub contest_id: u32,
    pub index: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProblemQuery {
    /// Comma-separated problem tags, e.g. "interactive,math"
    pub tags: Option<String>,
}

/// Body of `POST /parse`
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub contest_id: u32,
    pub index: String,
    pub html: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub statement: ProblemStatement,
    pub diagnostics: ParseDiagnostics,
}

/// Splits a comma-separated tag list, dropping empty entries.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
