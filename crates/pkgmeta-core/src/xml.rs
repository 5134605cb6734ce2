//! Element tree adapter over quick-xml.
//!
//! The schema layer never touches quick-xml types directly; it works on the
//! owned [`Element`] tree built here. Tag and attribute names are kept
//! exactly as written in the source (namespace prefixes included) and
//! compared case-sensitively. No DTD or schema validation is performed:
//! any well-formed document loads, and only markup-level failures are
//! reported.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::error::{DocumentError, ErrorContext};

/// One element of the parsed tree: tag name, attributes in document order,
/// child elements in document order, and the element's own text content.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Tag name as written in the source, prefix included.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Looks up an attribute by its exact name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text(&self) -> String {
        if self.children.is_empty() {
            return self.text.clone();
        }
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text());
        }
        out
    }
}

/// A loaded document: the owned element tree plus nothing else. quick-xml
/// keeps no process-wide state, so dropping the value releases everything
/// on every exit path.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Loads and parses a document from a file on disk.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path)
            .with_context(|| format!("opening metadata document {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a document from an in-memory string.
    pub fn parse(source: &str) -> Result<Self, DocumentError> {
        Self::from_reader(source.as_bytes())
    }

    /// Parses a document from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);
        build_tree(reader)
    }

    /// The document's single root element.
    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn element_from_start<R>(
    reader: &Reader<R>,
    start: &BytesStart,
) -> Result<Element, DocumentError> {
    let tag = reader
        .decoder()
        .decode(start.name().as_ref())
        .map_err(quick_xml::Error::from)?
        .into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(quick_xml::Error::from)?
            .into_owned();
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        tag,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DocumentError::MultipleRoots),
    }
    Ok(())
}

fn build_tree<R: BufRead>(mut reader: Reader<R>) -> Result<Document, DocumentError> {
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                stack.push(element_from_start(&reader, &start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&reader, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                // quick-xml has already verified the end tag matches
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(quick_xml::Error::from)?;
                    parent.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let decoded = reader
                        .decoder()
                        .decode(data.as_ref())
                        .map_err(quick_xml::Error::from)?;
                    parent.text.push_str(&decoded);
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctypes
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DocumentError::UnexpectedEof);
    }

    root.map(|root| Document { root }).ok_or(DocumentError::NoRoot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_in_order() {
        let doc = Document::parse(
            r#"<root><a x="1">one</a><b/><a x="2">two</a></root>"#,
        )
        .unwrap();

        let root = doc.root();
        assert_eq!(root.tag(), "root");
        let tags: Vec<_> = root.children().iter().map(Element::tag).collect();
        assert_eq!(tags, ["a", "b", "a"]);
        assert_eq!(root.children()[0].attribute("x"), Some("1"));
        assert_eq!(root.children()[2].attribute("x"), Some("2"));
        assert_eq!(root.children()[2].text(), "two");
    }

    #[test]
    fn text_content_includes_descendants() {
        let doc = Document::parse("<a>one<b>two</b></a>").unwrap();
        assert_eq!(doc.root().text(), "onetwo");
    }

    #[test]
    fn unescapes_entities_in_text_and_attributes() {
        let doc = Document::parse(r#"<a note="x &amp; y">1 &lt; 2</a>"#).unwrap();
        assert_eq!(doc.root().text(), "1 < 2");
        assert_eq!(doc.root().attribute("note"), Some("x & y"));
    }

    #[test]
    fn keeps_namespace_prefix_in_tag_names() {
        let doc =
            Document::parse(r#"<ns:pkg xmlns:ns="urn:x"><ns:name/></ns:pkg>"#).unwrap();
        assert_eq!(doc.root().tag(), "ns:pkg");
        assert_eq!(doc.root().children()[0].tag(), "ns:name");
    }

    #[test]
    fn missing_attribute_is_absent() {
        let doc = Document::parse("<a/>").unwrap();
        assert_eq!(doc.root().attribute("nope"), None);
    }

    #[test]
    fn rejects_malformed_markup() {
        assert!(matches!(
            Document::parse("<a><b></a>"),
            Err(DocumentError::Xml(_))
        ));
    }

    #[test]
    fn rejects_empty_document() {
        assert!(matches!(Document::parse(""), Err(DocumentError::NoRoot)));
    }

    #[test]
    fn rejects_missing_file() {
        let err = Document::from_path(Path::new("/nonexistent/package.xml")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
