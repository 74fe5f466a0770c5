//! Minimal SVG element tree and serializer.
//!
//! Output rules: attributes keep insertion order, every tag is followed by a
//! newline, and childless `use`, `line`, `path` and `rect` elements are
//! self-closed. Other childless elements keep an explicit end tag.

use quick_xml::escape::{escape, partial_escape};

const SELF_CLOSING: [&str; 4] = ["use", "line", "path", "rect"];

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Content>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set`].
    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Content::Element(child));
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Content::Text(text.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", key, escape(value)));
        }
        if self.children.is_empty() && SELF_CLOSING.contains(&self.name.as_str()) {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");
        for child in &self.children {
            match child {
                Content::Element(element) => element.write_into(out),
                Content::Text(text) => out.push_str(&partial_escape(text)),
            }
        }
        out.push_str(&format!("</{}>\n", self.name));
    }
}

/// Formats a length the shortest way that reads back exactly; negative zero
/// prints as `0`.
pub(crate) fn num(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}

/// Fixed four decimals, used for printed text positions.
pub(crate) fn fixed(value: f64) -> String {
    let text = format!("{:.4}", value);
    if text == "-0.0000" {
        "0.0000".to_string()
    } else {
        text
    }
}
