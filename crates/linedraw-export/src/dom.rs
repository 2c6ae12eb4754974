//! Minimal mutable SVG element tree.
//!
//! [`parse`] tokenizes with the [`svg`] crate's event parser and builds an
//! owned tree of [`Element`]s and text nodes that can be edited in place
//! and written back out through [`Display`](fmt::Display).
//!
//! Parsed attribute values and text are kept in their markup form
//! (entities are not decoded) and written back verbatim. Values set
//! through [`Element::set_attribute`] and text added through
//! [`Element::with_text`] are escaped on the way in. Comments and CDATA
//! sections inside the root are kept as [`Node::Markup`] and written back
//! unchanged; processing instructions and anything outside the root are
//! dropped.

use std::fmt;

use svg::node::element::tag::Type;
use svg::parser::Event;

use crate::error::ExportError;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, already escaped.
    Text(String),
    /// A comment or CDATA section, delimiters included, kept verbatim.
    Markup(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append an escaped text node.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(escape(text)));
        self
    }

    /// Tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value in markup form, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in document order (sorted by name when parsed).
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set an attribute, replacing an existing value in place or
    /// appending a new one. `value` is escaped.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let value = escape(value);
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_owned(), value)),
        }
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Insert `node` ahead of every existing child.
    pub fn prepend_child(&mut self, node: impl Into<Node>) {
        self.children.insert(0, node.into());
    }

    /// Descendants named `name`, depth-first in document order.
    ///
    /// A matching element is returned without searching inside it.
    #[must_use]
    pub fn descendants_named(&self, name: &str) -> Vec<&Self> {
        let mut out = Vec::new();
        collect(self, name, &mut out);
        out
    }

    /// Mutable counterpart of [`descendants_named`](Self::descendants_named).
    pub fn descendants_named_mut(&mut self, name: &str) -> Vec<&mut Self> {
        let mut out = Vec::new();
        collect_mut(self, name, &mut out);
        out
    }
}

fn collect<'a>(element: &'a Element, name: &str, out: &mut Vec<&'a Element>) {
    for child in &element.children {
        if let Node::Element(e) = child {
            if e.name == name {
                out.push(e);
            } else {
                collect(e, name, out);
            }
        }
    }
}

fn collect_mut<'a>(element: &'a mut Element, name: &str, out: &mut Vec<&'a mut Element>) {
    for child in &mut element.children {
        if let Node::Element(e) = child {
            if e.name == name {
                out.push(e);
            } else {
                collect_mut(e, name, out);
            }
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{value}\"")?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;

        // Element content goes one child per line; pure text stays inline.
        let block = self.children.iter().any(|c| matches!(c, Node::Element(_)));
        for child in &self.children {
            if block {
                f.write_str("\n")?;
            }
            match child {
                Node::Element(e) => write!(f, "{e}")?,
                Node::Text(text) | Node::Markup(text) => f.write_str(text)?,
            }
        }
        if block {
            f.write_str("\n")?;
        }
        write!(f, "</{}>", self.name)
    }
}

/// Parse SVG text into its root `<svg>` element.
///
/// Whitespace-only text between elements is discarded; attributes are
/// sorted by name.
///
/// # Errors
///
/// Returns [`ExportError::Parse`] if the markup is malformed, has
/// mismatched or unclosed tags, has no root or more than one, or the
/// root is not `<svg>`.
pub fn parse(text: &str) -> Result<Element, ExportError> {
    let parser = svg::read(text).map_err(|e| ExportError::Parse(e.to_string()))?;
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    for event in parser {
        match event {
            Event::Tag(name, kind, attributes) => {
                let mut element = Element::new(name);
                let mut pairs: Vec<(String, String)> = attributes
                    .into_iter()
                    .map(|(k, v)| (k, v.to_string()))
                    .collect();
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                element.attributes = pairs;

                match kind {
                    Type::Start => stack.push(element),
                    Type::Empty => attach(&mut stack, &mut root, element)?,
                    Type::End => {
                        let open = stack.pop().ok_or_else(|| {
                            ExportError::Parse(format!("unexpected closing tag </{name}>"))
                        })?;
                        if open.name != name {
                            return Err(ExportError::Parse(format!(
                                "expected </{}>, found </{name}>",
                                open.name
                            )));
                        }
                        attach(&mut stack, &mut root, open)?;
                    }
                }
            }
            Event::Text(content) => {
                if content.trim().is_empty() {
                    continue;
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(content.to_owned())),
                    None => {
                        return Err(ExportError::Parse(
                            "text outside the root element".to_owned(),
                        ));
                    }
                }
            }
            Event::Comment(content) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Markup(delimited(content, "<!--", "-->")));
                }
            }
            // CDATA sections arrive as declarations.
            Event::Declaration(content) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Markup(delimited(content, "<!", ">")));
                }
            }
            Event::Error(e) => return Err(ExportError::Parse(e.to_string())),
            Event::Instruction(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ExportError::Parse(format!("unclosed element <{}>", open.name)));
    }
    let root = root.ok_or_else(|| ExportError::Parse("document has no root element".to_owned()))?;
    if root.name != "svg" {
        return Err(ExportError::Parse(format!(
            "root element is <{}>, expected <svg>",
            root.name
        )));
    }
    Ok(root)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ExportError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(ExportError::Parse(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

/// `content` with its delimiters, whether or not the parser kept them.
fn delimited(content: &str, open: &str, close: &str) -> String {
    if content.starts_with(open) {
        content.to_owned()
    } else {
        format!("{open}{content}{close}")
    }
}

/// Escape the five XML special characters.
pub(crate) fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
