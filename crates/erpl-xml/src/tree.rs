// SPDX-License-Identifier: MIT OR Apache-2.0
//! A minimal namespace-agnostic XML tree, purpose-built for the handful of
//! shapes SAP's ADT/BW endpoints emit. Every element and attribute is
//! indexed by local name only (the prefix before `:` is discarded while
//! parsing), which implements the "try namespaced then plain" and
//! "local-name comparison ignores namespace prefixes" rules of §4.2 for
//! free: `bwModel:objectName` and `objectName` both key into `"objectName"`.

use std::fmt;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use erpl_error::{Error, ErrorKind};

/// A parsed XML element, indexed by local (prefix-stripped) name.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    /// Local element name (namespace prefix stripped).
    pub name: String,
    /// Local attribute name -> value. First occurrence wins on duplicate
    /// local names (e.g. a namespaced and a plain variant both present).
    pub attrs: Vec<(String, String)>,
    /// Concatenated text content of direct text nodes.
    pub text: String,
    /// Child elements, in document order.
    pub children: Vec<XmlElement>,
}

/// An XML parse failure, carrying a line number when detectable (§4.2, §7).
#[derive(Debug, Clone)]
pub struct XmlParseError {
    /// 1-indexed line number, when the underlying parser reported a byte offset.
    pub line: Option<usize>,
    /// Diagnostic message.
    pub message: String,
}

impl fmt::Display for XmlParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "XML parse error at line {line}: {}", self.message),
            None => write!(f, "XML parse error: {}", self.message),
        }
    }
}

impl XmlParseError {
    /// Convert into a full `erpl_error::Error` for the given operation/endpoint/kind.
    pub fn into_error(self, operation: &str, endpoint: &str, kind: ErrorKind) -> Error {
        Error::new(operation, endpoint, self.to_string(), kind)
    }
}

fn local_name(qname: &[u8]) -> String {
    let s = String::from_utf8_lossy(qname);
    match s.split_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.into_owned(),
    }
}

fn line_of_offset(xml: &str, offset: usize) -> usize {
    xml.as_bytes()[..offset.min(xml.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Parse `xml` into a tree rooted at its single root element.
///
/// If the document has no single root element (SAP sometimes returns a
/// "flat" fragment with multiple top-level siblings and no enclosing tag —
/// the lock response is the canonical example), wrap the raw text in a
/// synthetic `<synthetic-root>` element first via [`parse_xml_tree_wrapped`].
pub fn parse_xml_tree(xml: &str) -> Result<XmlElement, XmlParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let mut el = XmlElement {
                    name: local_name(e.name().as_ref()),
                    ..Default::default()
                };
                for attr in e.attributes().flatten() {
                    let key = local_name(attr.key.as_ref());
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_default();
                    if !el.attrs.iter().any(|(k, _)| k == &key) {
                        el.attrs.push((key, value));
                    }
                }
                stack.push(el);
            }
            Ok(Event::Empty(e)) => {
                let mut el = XmlElement {
                    name: local_name(e.name().as_ref()),
                    ..Default::default()
                };
                for attr in e.attributes().flatten() {
                    let key = local_name(attr.key.as_ref());
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_default();
                    if !el.attrs.iter().any(|(k, _)| k == &key) {
                        el.attrs.push((key, value));
                    }
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(el),
                    None => root = Some(el),
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map(|v| v.into_owned()).unwrap_or_default();
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                if let Some(finished) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(finished),
                        None => root = Some(finished),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(XmlParseError {
                    line: Some(line_of_offset(xml, pos)),
                    message: e.to_string(),
                });
            }
        }
    }

    root.ok_or_else(|| XmlParseError {
        line: None,
        message: "document has no root element".to_string(),
    })
}

/// Parse a body that may be a bare sequence of sibling elements with no
/// enclosing root (the ADT lock endpoint's response shape) by wrapping it
/// in a synthetic root first.
pub fn parse_xml_tree_wrapped(xml: &str) -> Result<XmlElement, XmlParseError> {
    match parse_xml_tree(xml) {
        Ok(tree) => Ok(tree),
        Err(_) => {
            let wrapped = format!("<synthetic-root>{xml}</synthetic-root>");
            parse_xml_tree(&wrapped)
        }
    }
}

impl XmlElement {
    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Trimmed text content.
    pub fn text_trimmed(&self) -> &str {
        self.text.trim()
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search for the first descendant (including self) with
    /// the given local name. Used to implement "try each shape family until
    /// one yields data" without hand-writing a path per shape.
    pub fn find_descendant(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        for child in &self.children {
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first collection of every descendant (including self) with the
    /// given local name.
    pub fn find_all_descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.find_all_descendants(name, out);
        }
    }

    /// Look up an attribute, falling back to searching this element's first
    /// matching descendant sibling group (used for SAP "connect form" shapes
    /// where values live on a sibling element rather than the root).
    pub fn attr_anywhere(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.attr(name) {
            return Some(v);
        }
        for child in &self.children {
            if let Some(v) = child.attr_anywhere(name) {
                return Some(v);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_attributes_as_local_names() {
        let xml = r#"<root xmlns:bw="urn:x"><entry bw:objectName="FOO" objectType="BAR"/></root>"#;
        let tree = parse_xml_tree(xml).unwrap();
        let entry = tree.child("entry").unwrap();
        assert_eq!(entry.attr("objectName"), Some("FOO"));
        assert_eq!(entry.attr("objectType"), Some("BAR"));
    }

    #[test]
    fn wraps_bare_sibling_fragment() {
        let xml = "<DATA><LOCK_HANDLE>abc</LOCK_HANDLE></DATA><MORE>x</MORE>";
        let tree = parse_xml_tree_wrapped(xml).unwrap();
        assert_eq!(tree.name, "synthetic-root");
        assert!(tree.child("DATA").is_some());
    }

    #[test]
    fn reports_line_number_on_malformed_xml() {
        let xml = "<root>\n<a>\n<unclosed>\n</root>";
        let err = parse_xml_tree(xml).unwrap_err();
        assert!(err.line.is_some());
    }
}
