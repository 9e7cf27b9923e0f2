use lazy_regex::regex;

use crate::models::ContentElement;
use crate::services::cleaner::{clean_line, clean_text};

/// Flat sequence of text and math pieces found in one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MathExtraction {
    pub elements: Vec<ContentElement>,
    /// Raw delimiter pairing was used because no tagged span was present
    pub used_fallback: bool,
}

fn push_text(elements: &mut Vec<ContentElement>, html: &str) {
    let text = clean_text(html);
    if !text.is_empty() {
        elements.push(ContentElement::Text(text));
    }
}

/// Classifies the stripped content of a tagged span by its delimiters.
fn classify_span(content: &str) -> Option<ContentElement> {
    let content = content.trim();
    if content.len() >= 4 && content.starts_with("$$") && content.ends_with("$$") {
        let formula = content[2..content.len() - 2].trim();
        return (!formula.is_empty()).then(|| ContentElement::BlockMath(formula.to_string()));
    }
    if content.len() >= 2 && content.starts_with('$') && content.ends_with('$') {
        let formula = content[1..content.len() - 1].trim();
        return (!formula.is_empty()).then(|| ContentElement::InlineMath(formula.to_string()));
    }
    // Spans carrying pre-formatted markup instead of TeX read as text
    (!content.is_empty()).then(|| ContentElement::Text(content.to_string()))
}

/// Tagged math spans: `<span class="tex-span">` and MathJax `<script type="math/tex">`.
fn extract_tagged(html: &str) -> Option<Vec<ContentElement>> {
    let span_re = regex!(
        r#"(?is)<span\b[^>]*class="[^"]*tex-span[^"]*"[^>]*>(.*?)</span\s*>|<script\b[^>]*type="math/tex([^"]*)"[^>]*>(.*?)</script\s*>"#
    );

    let mut elements = Vec::new();
    let mut cursor = 0;
    let mut spans = 0;
    for caps in span_re.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        spans += 1;
        push_text(&mut elements, &html[cursor..whole.start()]);
        cursor = whole.end();

        let element = if let Some(inner) = caps.get(1) {
            classify_span(&clean_line(inner.as_str()))
        } else {
            let display = caps.get(2).is_some_and(|m| m.as_str().contains("mode=display"));
            let formula = caps.get(3).map(|m| clean_line(m.as_str())).unwrap_or_default();
            match (formula.is_empty(), display) {
                (true, _) => None,
                (false, true) => Some(ContentElement::BlockMath(formula)),
                (false, false) => Some(ContentElement::InlineMath(formula)),
            }
        };
        elements.extend(element);
    }
    if spans == 0 {
        return None;
    }
    push_text(&mut elements, &html[cursor..]);
    Some(elements)
}

/// Pairs raw delimiters left to right, preferring `$$` over `$` at each position.
fn extract_delimited(html: &str) -> Vec<ContentElement> {
    let pair_re = regex!(r"(?s)\$\$(.+?)\$\$|\$([^$]+?)\$");

    let mut elements = Vec::new();
    let mut cursor = 0;
    for caps in pair_re.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(&mut elements, &html[cursor..whole.start()]);
        cursor = whole.end();

        if let Some(block) = caps.get(1) {
            let formula = clean_line(block.as_str());
            if !formula.is_empty() {
                elements.push(ContentElement::BlockMath(formula));
            }
        } else if let Some(inline) = caps.get(2) {
            let formula = clean_line(inline.as_str());
            if !formula.is_empty() {
                elements.push(ContentElement::InlineMath(formula));
            }
        }
    }
    push_text(&mut elements, &html[cursor..]);
    elements
}

/// Splits a block into text and math. Tagged spans are preferred; raw
/// delimiters are only paired when the block has no tagged span at all.
pub fn extract_math(html: &str) -> MathExtraction {
    if let Some(elements) = extract_tagged(html) {
        return MathExtraction {
            elements,
            used_fallback: false,
        };
    }
    if html.contains('$') {
        return MathExtraction {
            elements: extract_delimited(html),
            used_fallback: true,
        };
    }

    let mut elements = Vec::new();
    push_text(&mut elements, html);
    MathExtraction {
        elements,
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> ContentElement {
        ContentElement::Text(s.to_string())
    }

    #[test]
    fn test_fallback_block_math() {
        let result = extract_math("$$x^2$$");
        assert!(result.used_fallback);
        assert_eq!(result.elements, vec![ContentElement::BlockMath("x^2".into())]);
    }

    #[test]
    fn test_fallback_mixed() {
        let result = extract_math("<p>Let $n$ be even, then $$\\sum a_i$$ holds &amp; $k &lt; n$.</p>");
        assert_eq!(
            result.elements,
            vec![
                text("Let"),
                ContentElement::InlineMath("n".into()),
                text("be even, then"),
                ContentElement::BlockMath("\\sum a_i".into()),
                text("holds &"),
                ContentElement::InlineMath("k < n".into()),
                text("."),
            ]
        );
        for e in &result.elements {
            if let ContentElement::Text(t) = e {
                assert!(!t.contains('$'));
            }
        }
    }

    #[test]
    fn test_tagged_spans() {
        let html = r#"Print <span class="tex-span">$$a_1$$</span> or <span class="tex-span"><i>$b$</i></span> now"#;
        let result = extract_math(html);
        assert!(!result.used_fallback);
        assert_eq!(
            result.elements,
            vec![
                text("Print"),
                ContentElement::BlockMath("a_1".into()),
                text("or"),
                ContentElement::InlineMath("b".into()),
                text("now"),
            ]
        );
    }

    #[test]
    fn test_tagged_spans_win_over_raw_delimiters() {
        let html = r#"<span class="tex-span">$x$</span> and $y$"#;
        let result = extract_math(html);
        assert!(!result.used_fallback);
        assert_eq!(result.elements, vec![ContentElement::InlineMath("x".into()), text("and $y$")]);
    }

    #[test]
    fn test_formatted_span_reads_as_text() {
        let html = r#"<span class="tex-span"><i>a</i><sub class="lower-index">i</sub></span>"#;
        assert_eq!(extract_math(html).elements, vec![text("ai")]);
    }

    #[test]
    fn test_mathjax_script() {
        let html = r#"<script type="math/tex; mode=display">x^2</script> and <script type="math/tex">y</script>"#;
        assert_eq!(
            extract_math(html).elements,
            vec![
                ContentElement::BlockMath("x^2".into()),
                text("and"),
                ContentElement::InlineMath("y".into()),
            ]
        );
    }

    #[test]
    fn test_unmatched_delimiter_is_total() {
        let result = extract_math("costs $5 only");
        assert_eq!(result.elements, vec![text("costs $5 only")]);
    }

    #[test]
    fn test_plain_block() {
        let result = extract_math("<p>No math.</p>");
        assert!(!result.used_fallback);
        assert_eq!(result.elements, vec![text("No math.")]);
        assert!(extract_math("").elements.is_empty());
    }
}
