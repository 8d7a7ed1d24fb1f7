// Crawl-wide accumulation of per-page extraction fragments

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use crate::extract::{Fragment, brand, compliance, contact, legal, seo};
use crate::mode::Mode;

/// Per-page list limits that also hold for the merged crawl-wide object.
const MERGED_LIST_CAPS: [(Mode, &str, usize); 9] = [
    (Mode::Brand, "/about_urls", brand::MAX_ABOUT_URLS),
    (Mode::Seo, "/headings/h2", seo::MAX_SUBHEADINGS),
    (Mode::Seo, "/headings/h3", seo::MAX_SUBHEADINGS),
    (Mode::Compliance, "/iso_certifications", compliance::MAX_ISO_MENTIONS),
    (Mode::Legal, "/privacy_policy_urls", legal::MAX_LINKS),
    (Mode::Legal, "/terms_urls", legal::MAX_LINKS),
    (Mode::Contact, "/emails", contact::MAX_EMAILS),
    (Mode::Contact, "/phones", contact::MAX_PHONES),
    (Mode::Contact, "/contact_page_urls", contact::MAX_CONTACT_PAGES),
];

/// Per-mode results accumulated across every page of one crawl.
#[derive(Debug, Clone)]
pub struct Aggregate {
    data: BTreeMap<Mode, Value>,
    pages_extracted: usize,
}

impl Aggregate {
    /// Every requested mode starts present: an empty list or an empty object.
    pub fn new(modes: &[Mode]) -> Self {
        let data = modes
            .iter()
            .map(|mode| {
                let empty = if mode.is_list() {
                    Value::Array(Vec::new())
                } else {
                    Value::Object(Map::new())
                };
                (*mode, empty)
            })
            .collect();

        Self {
            data,
            pages_extracted: 0,
        }
    }

    /// Fold one page's fragments in. Pages must be added in crawl order.
    pub fn add_page(&mut self, fragments: Vec<(Mode, Fragment)>) {
        self.pages_extracted += 1;

        for (mode, fragment) in fragments {
            let Some(slot) = self.data.get_mut(&mode) else {
                continue;
            };

            if mode.is_list() {
                if let Value::Array(items) = slot {
                    match fragment {
                        Value::Array(new_items) => items.extend(new_items),
                        Value::Null => {}
                        other => items.push(other),
                    }
                }
            } else {
                merge_value(slot, fragment);
            }
        }
    }

    pub fn pages_extracted(&self) -> usize {
        self.pages_extracted
    }

    pub fn get(&self, mode: Mode) -> Option<&Value> {
        self.data.get(&mode)
    }

    /// Final per-mode payloads keyed by mode name, images deduplicated by URL.
    ///
    /// Capped lists keep their earliest entries, so the first pages win.
    pub fn finalize(mut self) -> BTreeMap<String, Value> {
        for (mode, pointer, cap) in MERGED_LIST_CAPS {
            if let Some(Value::Array(items)) = self.data.get_mut(&mode).and_then(|v| v.pointer_mut(pointer)) {
                items.truncate(cap);
            }
        }

        if let Some(Value::Array(images)) = self.data.get_mut(&Mode::Images) {
            let mut seen = HashSet::new();
            images.retain(|image| match image.get("url").and_then(Value::as_str) {
                Some(url) => seen.insert(url.to_string()),
                None => true,
            });
        }

        self.data
            .into_iter()
            .map(|(mode, value)| (mode.as_str().to_string(), value))
            .collect()
    }
}

/// Merge `incoming` into `target`.
///
/// Missing keys are added, objects merge recursively, arrays gain unseen
/// items in order, booleans are OR-ed and any other existing value stays.
pub fn merge_value(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(new)) => {
            for (key, value) in new {
                match existing.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(new)) => {
            for item in new {
                if !existing.contains(&item) {
                    existing.push(item);
                }
            }
        }
        (Value::Bool(existing), Value::Bool(new)) => *existing |= new,
        (target, new) => {
            if target.is_null() {
                *target = new;
            }
        }
    }
}
