/**
 * Directive Matching - CSS Selector Matching
 *
 * Parses directive selectors and matches them against elements. Supported:
 * element names, `.class`, `#id`, `[attr]`, `[attr=value]`, `:not(...)` and
 * comma separated alternatives. Combinators are rejected at parse time.
 */
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::dom::{Document, NodeId};
use crate::error::{Result, TemplatingError};

/// Regex for parsing CSS selectors
static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\:not\()|(([\.\#]?)[-\w]+)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#)
        .expect("selector regexp is valid")
});

/// Match groups in the selector regex
#[derive(Debug, Clone, Copy)]
enum SelectorRegexp {
    All = 0,
    Not = 1,
    Tag = 2,
    Prefix = 3,
    Attribute = 4,
    AttributeValueDouble = 5,
    AttributeValueSingle = 6,
    AttributeValueUnquoted = 7,
    NotEnd = 8,
    Separator = 9,
}

/// CSS Selector representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    /// Attributes stored in pairs: [name, value, name, value, ...]
    pub attrs: Vec<String>,
    pub not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    pub fn new() -> Self {
        CssSelector {
            element: None,
            class_names: Vec::new(),
            attrs: Vec::new(),
            not_selectors: Vec::new(),
        }
    }

    /// Parse a selector string into its comma separated alternatives.
    pub fn parse(selector: &str) -> Result<Vec<CssSelector>> {
        let invalid = |reason: String| TemplatingError::InvalidSelector {
            selector: selector.to_string(),
            reason,
        };

        let source = selector.trim();
        if source.is_empty() {
            return Err(invalid("selector is empty".to_string()));
        }

        let mut results = Vec::new();
        let mut css_selector = CssSelector::new();
        let mut in_not = false;
        let mut last_end = 0;

        for cap in SELECTOR_REGEXP.captures_iter(source) {
            let Some(all) = cap.get(SelectorRegexp::All as usize) else {
                continue;
            };
            if all.start() != last_end {
                return Err(invalid(describe_gap(&source[last_end..all.start()])));
            }
            last_end = all.end();

            // Check for :not(
            if cap.get(SelectorRegexp::Not as usize).is_some() {
                if in_not {
                    return Err(invalid("Nesting :not in a selector is not allowed".to_string()));
                }
                in_not = true;
                css_selector.not_selectors.push(CssSelector::new());
            }

            // Check for tag/class/id
            if let Some(tag_match) = cap.get(SelectorRegexp::Tag as usize) {
                let tag = tag_match.as_str();
                let prefix = cap
                    .get(SelectorRegexp::Prefix as usize)
                    .map(|m| m.as_str())
                    .unwrap_or("");

                let current = current_selector(&mut css_selector, in_not);
                if prefix == "#" {
                    // ID selector: #id
                    current.add_attribute("id", &tag[1..]);
                } else if prefix == "." {
                    // Class selector: .class
                    current.add_class_name(&tag[1..]);
                } else {
                    // Element selector: div
                    current.set_element(tag);
                }
            }

            // Check for attribute
            if let Some(attr_match) = cap.get(SelectorRegexp::Attribute as usize) {
                let attr = Self::unescape_attribute(attr_match.as_str()).map_err(invalid)?;
                let value = [
                    SelectorRegexp::AttributeValueDouble,
                    SelectorRegexp::AttributeValueSingle,
                    SelectorRegexp::AttributeValueUnquoted,
                ]
                .iter()
                .find_map(|group| cap.get(*group as usize))
                .map(|m| m.as_str())
                .unwrap_or("");

                current_selector(&mut css_selector, in_not).add_attribute(&attr, value);
            }

            // Check for ) closing :not
            if cap.get(SelectorRegexp::NotEnd as usize).is_some() {
                if !in_not {
                    return Err(invalid("Unbalanced \")\"".to_string()));
                }
                in_not = false;
            }

            // Check for , separator
            if cap.get(SelectorRegexp::Separator as usize).is_some() {
                if in_not {
                    return Err(invalid("Multiple selectors in :not are not supported".to_string()));
                }
                Self::add_result(&mut results, css_selector).map_err(invalid)?;
                css_selector = CssSelector::new();
            }
        }

        if last_end != source.len() {
            return Err(invalid(describe_gap(&source[last_end..])));
        }
        if in_not {
            return Err(invalid("Unterminated :not(".to_string()));
        }
        Self::add_result(&mut results, css_selector).map_err(invalid)?;
        Ok(results)
    }

    fn add_result(results: &mut Vec<CssSelector>, mut css_sel: CssSelector) -> std::result::Result<(), String> {
        let has_simple_part = css_sel.element.is_some()
            || !css_sel.class_names.is_empty()
            || !css_sel.attrs.is_empty();
        if !has_simple_part {
            if css_sel.not_selectors.is_empty() {
                return Err("Empty selector in list".to_string());
            }
            css_sel.element = Some("*".to_string());
        }
        results.push(css_sel);
        Ok(())
    }

    /// Unescape \$ sequences from CSS attribute selector
    fn unescape_attribute(attr: &str) -> std::result::Result<String, String> {
        let mut result = String::new();
        let mut escaping = false;

        for ch in attr.chars() {
            if ch == '\\' {
                escaping = true;
                continue;
            }
            if ch == '$' && !escaping {
                return Err(format!(
                    "Error in attribute selector \"{}\". Unescaped \"$\" is not supported. Please escape with \"\\$\".",
                    attr
                ));
            }
            escaping = false;
            result.push(ch);
        }

        Ok(result)
    }

    /// Escape $ in attribute for selector output
    fn escape_attribute(attr: &str) -> String {
        attr.replace('$', "\\$")
    }

    /// Builds the selector describing an element node, used as the match subject.
    pub fn from_element(doc: &Document, node: NodeId) -> Option<CssSelector> {
        let el = doc.element(node)?;
        let mut css_selector = CssSelector::new();
        css_selector.set_element(&el.name);
        for (name, value) in &el.attrs {
            css_selector.add_attribute(name, value);
            if name.eq_ignore_ascii_case("class") {
                for class_name in value.split_whitespace() {
                    css_selector.add_class_name(class_name);
                }
            }
        }
        Some(css_selector)
    }

    pub fn is_element_selector(&self) -> bool {
        self.has_element_selector() && self.class_names.is_empty() && self.attrs.is_empty()
    }

    pub fn has_element_selector(&self) -> bool {
        matches!(&self.element, Some(element) if element != "*")
    }

    pub fn set_element(&mut self, element: &str) {
        self.element = Some(element.to_string());
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push(name.to_string());
        self.attrs.push(value.to_lowercase());
    }

    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    /// Get attribute value by name
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .chunks(2)
            .find(|pair| pair[0] == name)
            .map(|pair| pair[1].as_str())
    }
}

fn current_selector(css_selector: &mut CssSelector, in_not: bool) -> &mut CssSelector {
    if in_not && !css_selector.not_selectors.is_empty() {
        let last = css_selector.not_selectors.len() - 1;
        return &mut css_selector.not_selectors[last];
    }
    css_selector
}

fn describe_gap(gap: &str) -> String {
    let trimmed = gap.trim();
    if trimmed.is_empty() || matches!(trimmed, ">" | "+" | "~") {
        "Combinators are not supported in directive selectors".to_string()
    } else {
        format!("Unexpected \"{}\"", trimmed)
    }
}

impl std::fmt::Display for CssSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let res = self.element.as_deref().unwrap_or("");
        write!(f, "{}", res)?;

        for class_name in &self.class_names {
            write!(f, ".{}", class_name)?;
        }

        for pair in self.attrs.chunks(2) {
            let name = Self::escape_attribute(&pair[0]);
            let value = &pair[1];
            if value.is_empty() {
                write!(f, "[{}]", name)?;
            } else {
                write!(f, "[{}={}]", name, value)?;
            }
        }

        for not_selector in &self.not_selectors {
            write!(f, ":not({})", not_selector)?;
        }

        Ok(())
    }
}

/// Selector Matcher - indexes selectors and finds the ones matching an element
#[derive(Debug)]
pub struct SelectorMatcher<T> {
    element_map: HashMap<String, Vec<SelectorContext<T>>>,
    class_map: HashMap<String, Vec<SelectorContext<T>>>,
    attr_map: HashMap<String, HashMap<String, Vec<SelectorContext<T>>>>,
    counter: usize,
}

#[derive(Debug, Clone)]
struct SelectorContext<T> {
    selector: CssSelector,
    data: T,
    id: usize,
}

impl<T: Clone> SelectorMatcher<T> {
    pub fn new() -> Self {
        SelectorMatcher {
            element_map: HashMap::new(),
            class_map: HashMap::new(),
            attr_map: HashMap::new(),
            counter: 0,
        }
    }

    /// Add a selector with associated data
    pub fn add_selectable(&mut self, css_selector: CssSelector, data: T) {
        let context = SelectorContext {
            selector: css_selector.clone(),
            data,
            id: self.counter,
        };
        self.counter += 1;

        // Index by element, * included for universal lookup
        if let Some(ref element) = css_selector.element {
            self.element_map
                .entry(element.clone())
                .or_default()
                .push(context.clone());
        }

        for class_name in &css_selector.class_names {
            self.class_map
                .entry(class_name.clone())
                .or_default()
                .push(context.clone());
        }

        for pair in css_selector.attrs.chunks(2) {
            self.attr_map
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_default()
                .push(context.clone());
        }
    }

    /// Match a CSS selector against indexed selectors. Every registered
    /// selector is reported at most once, in no particular order.
    pub fn match_selector<F>(&self, css_selector: &CssSelector, mut callback: F) -> bool
    where
        F: FnMut(&CssSelector, &T),
    {
        let mut matched = false;
        let mut matched_ids = HashSet::new();

        self.match_selector_visit(css_selector, |sel, data, id| {
            if matched_ids.insert(id) {
                callback(sel, data);
                matched = true;
            }
        });

        matched
    }

    /// All matching entries in the order they were added.
    pub fn match_all(&self, css_selector: &CssSelector) -> Vec<T> {
        let mut found: Vec<(usize, T)> = Vec::new();
        let mut matched_ids = HashSet::new();
        self.match_selector_visit(css_selector, |_, data, id| {
            if matched_ids.insert(id) {
                found.push((id, data.clone()));
            }
        });
        found.sort_by_key(|(id, _)| *id);
        found.into_iter().map(|(_, data)| data).collect()
    }

    fn match_selector_visit<F>(&self, css_selector: &CssSelector, mut callback: F)
    where
        F: FnMut(&CssSelector, &T, usize),
    {
        let mut visit = |contexts: &[SelectorContext<T>]| {
            for context in contexts {
                if self.is_match(css_selector, &context.selector) {
                    callback(&context.selector, &context.data, context.id);
                }
            }
        };

        if let Some(ref element) = css_selector.element {
            if let Some(contexts) = self.element_map.get(element) {
                visit(contexts);
            }
        }

        // Always match universal selector *
        if let Some(contexts) = self.element_map.get("*") {
            visit(contexts);
        }

        for class_name in &css_selector.class_names {
            if let Some(contexts) = self.class_map.get(class_name) {
                visit(contexts);
            }
        }

        for pair in css_selector.attrs.chunks(2) {
            let (name, value) = (&pair[0], &pair[1]);
            if let Some(attr_values) = self.attr_map.get(name) {
                if let Some(contexts) = attr_values.get(value) {
                    visit(contexts);
                }
                // [attr] without a value matches any value of attr
                if !value.is_empty() {
                    if let Some(contexts) = attr_values.get("") {
                        visit(contexts);
                    }
                }
            }
        }
    }

    /// Check whether `selector` (the element) satisfies `pattern`
    fn is_match(&self, selector: &CssSelector, pattern: &CssSelector) -> bool {
        if let (Some(sel_elem), Some(pat_elem)) = (&selector.element, &pattern.element) {
            if sel_elem != pat_elem && pat_elem != "*" {
                return false;
            }
        }

        if !pattern
            .class_names
            .iter()
            .all(|pat_class| selector.class_names.contains(pat_class))
        {
            return false;
        }

        for pat in pattern.attrs.chunks(2) {
            let (pat_name, pat_value) = (&pat[0], &pat[1]);
            let found = selector.attrs.chunks(2).any(|sel| {
                &sel[0] == pat_name && (pat_value.is_empty() || sel[1].eq_ignore_ascii_case(pat_value))
            });
            if !found {
                return false;
            }
        }

        !pattern
            .not_selectors
            .iter()
            .any(|not_selector| self.is_match(selector, not_selector))
    }
}

impl Default for CssSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Default for SelectorMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_selector() {
        let selectors = CssSelector::parse("div").unwrap();
        assert_eq!(selectors.len(), 1);
        assert_eq!(selectors[0].element, Some("div".to_string()));
    }

    #[test]
    fn test_parse_class_and_id_selector() {
        let selectors = CssSelector::parse(".my-class#my-id").unwrap();
        assert_eq!(selectors[0].class_names, vec!["my-class"]);
        assert_eq!(selectors[0].get_attr("id"), Some("my-id"));
    }

    #[test]
    fn test_parse_attribute_selector() {
        let selectors = CssSelector::parse("[attr=value]").unwrap();
        assert_eq!(selectors[0].get_attr("attr"), Some("value"));
        let selectors = CssSelector::parse("[name]").unwrap();
        assert_eq!(selectors[0].get_attr("name"), Some(""));
        assert_eq!(selectors[0].element, None);
    }

    #[test]
    fn test_parse_not_and_alternatives() {
        let selectors = CssSelector::parse("div:not(.exclude), [tpl]").unwrap();
        assert_eq!(selectors.len(), 2);
        assert_eq!(selectors[0].not_selectors.len(), 1);
        assert_eq!(selectors[1].get_attr("tpl"), Some(""));

        let selectors = CssSelector::parse(":not([a])").unwrap();
        assert_eq!(selectors[0].element.as_deref(), Some("*"));
    }

    #[test]
    fn test_rejects_malformed_selectors() {
        for bad in [
            "",
            "   ",
            "div span",
            "div > span",
            "div,",
            "[a$b]",
            ":not(:not(a))",
            ":not(a",
            "a)",
            "[a",
            "div!",
        ] {
            assert!(
                matches!(CssSelector::parse(bad), Err(TemplatingError::InvalidSelector { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_selector_to_string() {
        let mut selector = CssSelector::new();
        selector.set_element("div");
        selector.add_class_name("my-class");
        selector.add_attribute("attr", "value");
        assert_eq!(selector.to_string(), "div.my-class[attr=value]");
    }

    #[test]
    fn test_match_all_keeps_registration_order() {
        let mut matcher = SelectorMatcher::new();
        for (data, selector) in [(0, "[b]"), (1, "div"), (2, "[a]"), (3, "span")] {
            matcher.add_selectable(CssSelector::parse(selector).unwrap().remove(0), data);
        }

        let mut element = CssSelector::new();
        element.set_element("div");
        element.add_attribute("a", "1");
        element.add_attribute("b", "");
        assert_eq!(matcher.match_all(&element), vec![0, 1, 2]);
    }

    #[test]
    fn test_unescape_attribute() {
        assert_eq!(CssSelector::unescape_attribute("test\\$attr").unwrap(), "test$attr");
        assert!(CssSelector::unescape_attribute("test$attr").is_err());
    }
}
