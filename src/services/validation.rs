use crate::constants::UNTITLED_PROBLEM;
use crate::models::{ContentElement, ProblemStatement, TestSample};

/// Validation result
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    /// Section or sample the finding refers to, e.g. "note" or "sample 2"
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub location: Option<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, code: &str, message: &str, location: Option<String>) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            code: code.to_string(),
            message: message.to_string(),
            location,
        });
    }

    pub fn add_warning(&mut self, code: &str, message: &str, location: Option<String>) {
        self.warnings.push(ValidationWarning {
            code: code.to_string(),
            message: message.to_string(),
            location,
        });
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_elements(section: &str, elements: &[ContentElement], result: &mut ValidationResult) {
    for element in elements {
        match element {
            ContentElement::Paragraph(children) => {
                if children.is_empty() {
                    result.add_warning("EMPTY_PARAGRAPH", "Paragraph has no children", Some(section.to_string()));
                }
                for child in children {
                    if !child.is_inline() {
                        result.add_error(
                            "NESTED_IN_PARAGRAPH",
                            &format!("Paragraph directly contains a non-inline element: {:?}", child),
                            Some(section.to_string()),
                        );
                    }
                    if let ContentElement::Text(text) = child {
                        check_stray_delimiters(section, text, result);
                    }
                }
            }
            ContentElement::Text(text) => check_stray_delimiters(section, text, result),
            ContentElement::List(items) => {
                for item in items {
                    check_stray_delimiters(section, item, result);
                }
            }
            ContentElement::InlineMath(formula) | ContentElement::BlockMath(formula) if formula.trim().is_empty() => {
                result.add_warning("EMPTY_FORMULA", "Math element has an empty formula", Some(section.to_string()));
            }
            _ => {}
        }
    }
}

fn check_stray_delimiters(section: &str, text: &str, result: &mut ValidationResult) {
    if text.contains('$') {
        result.add_warning(
            "STRAY_DELIMITER",
            &format!("Text still contains a math delimiter: {:?}", text),
            Some(section.to_string()),
        );
    }
}

fn validate_groups(location: &str, side: &str, text: &str, groups: &Option<Vec<i32>>, result: &mut ValidationResult) {
    let Some(groups) = groups else { return };
    let lines = crate::models::non_blank_lines(text).len();
    if groups.len() != lines {
        result.add_error(
            "GROUP_LENGTH",
            &format!("{} has {} line groups for {} non-blank lines", side, groups.len(), lines),
            Some(location.to_string()),
        );
    }
}

fn validate_samples(samples: &[TestSample], result: &mut ValidationResult) {
    for (position, sample) in samples.iter().enumerate() {
        let location = format!("sample {}", sample.index);
        if sample.index != position + 1 {
            result.add_error(
                "SAMPLE_INDEX",
                &format!("Sample at position {} has index {}", position + 1, sample.index),
                Some(location.clone()),
            );
        }
        validate_groups(&location, "input", &sample.input, &sample.input_line_groups, result);
        validate_groups(&location, "output", &sample.output, &sample.output_line_groups, result);
    }
}

/// Checks the structural invariants of an extracted statement.
///
/// Errors mean the engine produced something a renderer must not trust;
/// warnings flag degraded but usable output.
pub fn validate_statement(statement: &ProblemStatement) -> ValidationResult {
    let mut result = ValidationResult::new();

    let sections = [
        ("statement", Some(&statement.statement)),
        ("input_spec", Some(&statement.input_spec)),
        ("output_spec", Some(&statement.output_spec)),
        ("interaction", statement.interaction.as_ref()),
        ("note", statement.note.as_ref()),
    ];
    for (name, elements) in sections {
        if let Some(elements) = elements {
            validate_elements(name, elements, &mut result);
        }
    }

    validate_samples(&statement.samples, &mut result);

    if statement.statement.is_empty() {
        result.add_warning("EMPTY_STATEMENT", "Statement body is empty", None);
    }
    if statement.name == UNTITLED_PROBLEM {
        result.add_warning("PLACEHOLDER_NAME", "Problem title was not found", None);
    }
    if statement.has_multiple_test_cases && statement.samples.is_empty() {
        result.add_warning("MULTITEST_WITHOUT_SAMPLES", "Multi-test problem has no samples", None);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProblemKey;
    use chrono::Utc;

    fn statement() -> ProblemStatement {
        ProblemStatement {
            key: ProblemKey::new(1843, "B1"),
            name: "Tenzing and Books".to_string(),
            time_limit: "1 second".to_string(),
            memory_limit: "256 megabytes".to_string(),
            input_file: "standard input".to_string(),
            output_file: "standard output".to_string(),
            statement: vec![ContentElement::Text("Legend.".into())],
            input_spec: vec![],
            output_spec: vec![],
            interaction: None,
            note: None,
            samples: vec![TestSample::new(1, "1\n2".into(), "3".into())],
            has_multiple_test_cases: false,
            is_interactive: false,
            tags: vec![],
            source: "test".to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_clean_statement_is_valid() {
        let result = validate_statement(&statement());
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_nested_paragraph_is_an_error() {
        let mut s = statement();
        s.note = Some(vec![ContentElement::Paragraph(vec![
            ContentElement::Text("a".into()),
            ContentElement::BlockMath("x".into()),
        ])]);
        let result = validate_statement(&s);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].code, "NESTED_IN_PARAGRAPH");
        assert_eq!(result.errors[0].location.as_deref(), Some("note"));
    }

    #[test]
    fn test_sample_checks() {
        let mut s = statement();
        let mut second = TestSample::new(3, "2\na\nb".into(), "x".into());
        second.input_line_groups = Some(vec![-1, 0]);
        s.samples.push(second);

        let result = validate_statement(&s);
        let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["SAMPLE_INDEX", "GROUP_LENGTH"]);
    }

    #[test]
    fn test_warnings_for_degraded_output() {
        let mut s = statement();
        s.name = UNTITLED_PROBLEM.to_string();
        s.statement = vec![];
        s.input_spec = vec![ContentElement::Text("costs $5".into())];

        let result = validate_statement(&s);
        assert!(result.is_valid);
        let codes: Vec<&str> = result.warnings.iter().map(|w| w.code.as_str()).collect();
        assert!(codes.contains(&"STRAY_DELIMITER"));
        assert!(codes.contains(&"EMPTY_STATEMENT"));
        assert!(codes.contains(&"PLACEHOLDER_NAME"));
    }

    #[test]
    fn test_image_inside_paragraph_is_nested() {
        let mut s = statement();
        s.statement = vec![ContentElement::Paragraph(vec![
            ContentElement::Text("see".into()),
            ContentElement::Image("https://codeforces.com/a.png".into()),
        ])];

        let result = validate_statement(&s);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].code, "NESTED_IN_PARAGRAPH");
    }

    #[test]
    fn test_list_items_with_raw_math_warn() {
        let mut s = statement();
        s.note = Some(vec![ContentElement::List(vec!["if $a_i < b$ then".into(), "plain".into()])]);

        let result = validate_statement(&s);
        assert!(result.is_valid);
        let stray: Vec<_> = result.warnings.iter().filter(|w| w.code == "STRAY_DELIMITER").collect();
        assert_eq!(stray.len(), 1);
        assert!(stray[0].message.contains("a_i < b"));
    }
}
