use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::collections::HashSet;

use super::{attr, element_text, select, select_in, to_fragment, util, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

const SECTION_KEYWORDS: [&str; 7] = [
    "references",
    "referans",
    "clients",
    "müşteri",
    "testimonial",
    "partners",
    "iş ortakları",
];

const SECTIONS_PER_KEYWORD: usize = 3;
const LOGOS_PER_SECTION: usize = 10;
const TESTIMONIALS_PER_SECTION: usize = 5;
const SNIPPET_LEN: usize = 200;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reference {
    Logo { name: String, image_url: String },
    Testimonial { text: String, full_text: String },
}

pub struct ReferencesExtractor {
    keywords: Vec<Regex>,
    testimonial: Regex,
}

impl ReferencesExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        let keywords = SECTION_KEYWORDS
            .iter()
            .map(|keyword| Regex::new(&format!("(?i){}", regex::escape(keyword))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            keywords,
            testimonial: Regex::new(r"(?i)testimonial|review")?,
        })
    }

    fn collect_section(
        &self,
        page: &PageContext,
        section: ElementRef<'_>,
        out: &mut Vec<Reference>,
    ) -> Result<(), ExtractError> {
        for logo in select_in(section, "img")?.into_iter().take(LOGOS_PER_SECTION) {
            let name = attr(logo, "alt")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| attr(logo, "title").filter(|s| !s.trim().is_empty()));
            if let Some(name) = name {
                out.push(Reference::Logo {
                    name: name.trim().to_string(),
                    image_url: page.resolve(attr(logo, "src").unwrap_or_default()),
                });
            }
        }

        let testimonials = select_in(section, "blockquote, p, div")?
            .into_iter()
            .filter(|el| attr(*el, "class").is_some_and(|class| self.testimonial.is_match(class)))
            .take(TESTIMONIALS_PER_SECTION);

        for testimonial in testimonials {
            let full_text = element_text(testimonial);
            if !full_text.is_empty() {
                out.push(Reference::Testimonial {
                    text: util::truncate_chars(&full_text, SNIPPET_LEN),
                    full_text,
                });
            }
        }

        Ok(())
    }
}

impl Extractor for ReferencesExtractor {
    fn mode(&self) -> Mode {
        Mode::References
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let containers = select(document, "section, div")?;
        let mut visited = HashSet::new();
        let mut references = Vec::new();

        for keyword in &self.keywords {
            let by_class = containers
                .iter()
                .filter(|el| attr(**el, "class").is_some_and(|v| keyword.is_match(v)));
            let by_id = containers
                .iter()
                .filter(|el| attr(**el, "id").is_some_and(|v| keyword.is_match(v)));

            let sections: Vec<ElementRef<'_>> = by_class
                .chain(by_id)
                .take(SECTIONS_PER_KEYWORD)
                .copied()
                .collect();

            for section in sections {
                // A section matching several keywords is only read once
                if visited.insert(section.id()) {
                    self.collect_section(page, section, &mut references)?;
                }
            }
        }

        to_fragment(&references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::run;
    use serde_json::json;

    #[test]
    fn test_logos_and_testimonials() {
        let html = r#"<body>
            <section class="our-clients">
                <img src="/logos/a.png" alt="Alpha">
                <img src="/logos/b.png" title="Beta">
                <img src="/logos/c.png">
            </section>
            <div id="testimonials">
                <blockquote class="testimonial">  Great   service! </blockquote>
                <p class="intro">Not a testimonial</p>
            </div>
        </body>"#;

        let references = run(&ReferencesExtractor::new().unwrap(), "https://example.com/", html);

        assert_eq!(
            references,
            json!([
                {"type": "logo", "name": "Alpha", "image_url": "https://example.com/logos/a.png"},
                {"type": "logo", "name": "Beta", "image_url": "https://example.com/logos/b.png"},
                {"type": "testimonial", "text": "Great service!", "full_text": "Great service!"}
            ])
        );
    }

    #[test]
    fn test_long_testimonial_is_truncated() {
        let long = "word ".repeat(100);
        let html = format!(r#"<div class="references"><p class="review">{}</p></div>"#, long);

        let references = run(&ReferencesExtractor::new().unwrap(), "https://example.com/", &html);

        assert_eq!(references[0]["text"].as_str().unwrap().chars().count(), 200);
        assert_eq!(references[0]["full_text"], json!(long.trim()));
    }

    #[test]
    fn test_no_reference_sections() {
        let references = run(&ReferencesExtractor::new().unwrap(), "https://example.com/", "<div><img src='a.png' alt='x'></div>");
        assert_eq!(references, json!([]));
    }
}
