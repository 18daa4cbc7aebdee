//! Generic XML tree built with roxmltree
//!
//! The reader works on this owned tree instead of roxmltree nodes so that
//! the InkML passes do not carry the document lifetime around. No InkML
//! semantics live here.

use crate::parse::errors::{InkError, InkResult};
use roxmltree::{Document, Node, ParsingOptions};

/// URI of the `xml:` prefix
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Content of an element, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Local tag name
    pub name: String,
    pub namespace: Option<String>,
    /// Attributes in document order; `xml:` attributes are keyed `xml:<name>`
    pub attributes: Vec<(String, String)>,
    pub content: Vec<XmlNode>,
    /// 1-based source position of the start tag
    pub line: u32,
    pub column: u32,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Non-empty attribute value
    pub fn attr_non_empty(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    /// The `xml:id` attribute
    ///
    /// Some writers drop the namespace, so a plain `id` is accepted as well.
    pub fn id(&self) -> Option<&str> {
        self.attr_non_empty("xml:id").or_else(|| self.attr_non_empty("id"))
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.content.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given tag
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == tag)
    }

    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |e| e.name == tag)
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// All descendant text in document order
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.content {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }

    pub fn is_in_namespace(&self, uri: &str) -> bool {
        self.namespace.as_deref() == Some(uri)
    }
}

/// Parse text into an owned element tree rooted at the document element
pub fn build_tree(text: &str, allow_dtd: bool) -> InkResult<XmlElement> {
    let options = ParsingOptions { allow_dtd, ..ParsingOptions::default() };

    let doc = Document::parse_with_options(text, options).map_err(|e| {
        let pos = e.pos();
        InkError::MalformedDocument { line: pos.row, column: pos.col, message: e.to_string() }
    })?;

    Ok(convert_element(&doc, doc.root_element()))
}

fn convert_element(doc: &Document, node: Node) -> XmlElement {
    let pos = doc.text_pos_at(node.range().start);

    let attributes = node
        .attributes()
        .map(|a| {
            let key = match a.namespace() {
                Some(XML_NAMESPACE_URI) => format!("xml:{}", a.name()),
                _ => a.name().to_string(),
            };
            (key, a.value().to_string())
        })
        .collect();

    let content = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(XmlNode::Element(convert_element(doc, child)))
            } else if child.is_text() {
                child.text().map(|t| XmlNode::Text(t.to_string()))
            } else {
                None
            }
        })
        .collect();

    XmlElement {
        name: node.tag_name().name().to_string(),
        namespace: node.tag_name().namespace().map(|ns| ns.to_string()),
        attributes,
        content,
        line: pos.row,
        column: pos.col,
    }
}
