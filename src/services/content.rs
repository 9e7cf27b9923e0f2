use lazy_regex::regex;

use crate::models::ContentElement;
use crate::services::blocks::{extract_blocks, BlockKind};
use crate::services::cleaner::clean_text;
use crate::services::math::extract_math;
use crate::utils::resolve_url;

/// Elements of one prose section plus what it took to get them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltSection {
    pub elements: Vec<ContentElement>,
    pub used_math_fallback: bool,
    /// No structured block matched; everything came from loose text
    pub only_loose_text: bool,
}

/// Accumulates inline elements until something forces a line break.
#[derive(Debug, Default)]
struct InlineBuffer {
    pending: Vec<ContentElement>,
}

impl InlineBuffer {
    fn push(&mut self, element: ContentElement, out: &mut Vec<ContentElement>) {
        match element {
            ContentElement::Text(_) | ContentElement::InlineMath(_) => self.pending.push(element),
            ContentElement::Paragraph(children) => {
                for child in children {
                    self.push(child, out);
                }
            }
            other => {
                self.flush(out);
                out.push(other);
            }
        }
    }

    /// A lone text element goes out as is; anything else is wrapped in a paragraph.
    fn flush(&mut self, out: &mut Vec<ContentElement>) {
        match self.pending.len() {
            0 => {}
            1 if matches!(self.pending[0], ContentElement::Text(_)) => out.append(&mut self.pending),
            _ => out.push(ContentElement::paragraph(std::mem::take(&mut self.pending))),
        }
    }
}

/// Builds the `ContentElement` tree for prose sections.
#[derive(Debug, Clone)]
pub struct ContentBuilder {
    base_url: String,
}

impl ContentBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Items are plain strings, so any math in them keeps its `$` delimiters.
    fn list_items(html: &str) -> Vec<String> {
        let item_re = regex!(r"(?is)<li\b[^>]*>(.*?)</li\s*>");
        item_re
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| clean_text(m.as_str()))
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// Text, math and images of one block, in order. Returns whether the
    /// math fallback was needed.
    fn build_flow(&self, html: &str, out: &mut Vec<ContentElement>) -> bool {
        let img_re = regex!(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'][^>]*>"#);

        let mut buffer = InlineBuffer::default();
        let mut used_fallback = false;
        let mut cursor = 0;
        let mut segments: Vec<(&str, Option<String>)> = Vec::new();
        for caps in img_re.captures_iter(html) {
            let (Some(whole), Some(src)) = (caps.get(0), caps.get(1)) else { continue };
            segments.push((&html[cursor..whole.start()], Some(src.as_str().to_string())));
            cursor = whole.end();
        }
        segments.push((&html[cursor..], None));

        for (text, image) in segments {
            let math = extract_math(text);
            used_fallback |= math.used_fallback;
            for element in math.elements {
                buffer.push(element, out);
            }
            if let Some(src) = image {
                buffer.push(ContentElement::Image(resolve_url(&self.base_url, &src)), out);
            }
        }
        buffer.flush(out);
        used_fallback
    }

    /// Converts one section's markup into elements, block by block.
    pub fn build_section(&self, html: &str) -> BuiltSection {
        let blocks = extract_blocks(html);
        let mut section = BuiltSection {
            only_loose_text: !blocks.is_empty() && blocks.iter().all(|b| b.kind == BlockKind::Loose),
            ..BuiltSection::default()
        };

        for block in blocks {
            if block.kind == BlockKind::List {
                let items = Self::list_items(block.html);
                if !items.is_empty() {
                    section.elements.push(ContentElement::List(items));
                    continue;
                }
            }
            section.used_math_fallback |= self.build_flow(block.html, &mut section.elements);
        }
        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn builder() -> ContentBuilder {
        ContentBuilder::new("https://codeforces.com")
    }

    fn text(s: &str) -> ContentElement {
        ContentElement::Text(s.to_string())
    }

    #[test]
    fn test_inline_math_joins_paragraph() {
        let section = builder().build_section("<p>Given $n$ integers.</p><p>Plain.</p>");
        assert_eq!(
            section.elements,
            vec![
                ContentElement::Paragraph(vec![
                    text("Given"),
                    ContentElement::InlineMath("n".into()),
                    text("integers."),
                ]),
                text("Plain."),
            ]
        );
        assert!(section.used_math_fallback);
        assert!(!section.only_loose_text);
    }

    #[test]
    fn test_block_math_breaks_paragraph() {
        let section = builder().build_section("<p>Compute $$\\sum_{i=1}^n a_i$$ modulo $p$.</p>");
        assert_eq!(
            section.elements,
            vec![
                text("Compute"),
                ContentElement::BlockMath("\\sum_{i=1}^n a_i".into()),
                ContentElement::Paragraph(vec![
                    text("modulo"),
                    ContentElement::InlineMath("p".into()),
                    text("."),
                ]),
            ]
        );
    }

    #[test]
    fn test_single_inline_math_is_wrapped() {
        let section = builder().build_section("<p>$x$</p>");
        assert_eq!(
            section.elements,
            vec![ContentElement::Paragraph(vec![ContentElement::InlineMath("x".into())])]
        );
    }

    #[test]
    fn test_list_and_image() {
        let html = concat!(
            "<ul><li>first $a$</li><li>second</li></ul>",
            r#"<center><img class="tex-graphics" src="//espresso.codeforces.com/p.png" style="max-width: 100.0%"></center>"#,
        );
        assert_eq!(
            builder().build_section(html).elements,
            vec![
                ContentElement::List(vec!["first $a$".into(), "second".into()]),
                ContentElement::Image("https://espresso.codeforces.com/p.png".into()),
            ]
        );
    }

    #[test]
    fn test_image_inside_paragraph_splits_flow() {
        let html = r#"<p>See <img src="/pic.png"> below $k$</p>"#;
        assert_eq!(
            builder().build_section(html).elements,
            vec![
                text("See"),
                ContentElement::Image("https://codeforces.com/pic.png".into()),
                ContentElement::Paragraph(vec![text("below"), ContentElement::InlineMath("k".into())]),
            ]
        );
    }

    #[test]
    fn test_loose_text_section() {
        let section = builder().build_section("Only loose text");
        assert!(section.only_loose_text);
        assert_eq!(section.elements, vec![text("Only loose text")]);
    }

    #[test]
    fn test_paragraphs_never_nest() {
        let html = "<p>a $b$ $$c$$ d $e$</p><ol><li>x</li></ol><p>$f$ g</p>";
        for element in builder().build_section(html).elements {
            if let ContentElement::Paragraph(children) = element {
                assert!(children.iter().all(ContentElement::is_inline));
            }
        }
    }
}
