//! Lightweight element tree built from quick-xml events.
//!
//! BPMN documents reference elements declared later in the file, so the
//! reader needs random access to the whole document. The tree keeps only
//! what the reader uses: names, attributes in document order, children and
//! concatenated text.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{DiagramError, Result};

#[derive(Debug, Clone, Default)]
pub(super) struct XmlElement {
    /// Qualified name as written, e.g. `bpmn:task`.
    pub name: String,
    /// Name without prefix, e.g. `task`.
    pub local: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local == local)
    }

    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local == local)
    }

    /// Human-readable element reference for errors and warnings.
    pub fn describe(&self) -> String {
        match self.attr("id") {
            Some(id) => format!("{} {id}", self.local),
            None => self.local.clone(),
        }
    }
}

/// Parse a complete document into its root element.
pub(super) fn parse(input: &[u8]) -> Result<XmlElement> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(element_from(e)?),
            Ok(Event::Empty(ref e)) => {
                let element = element_from(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DiagramError::malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| DiagramError::malformed(format!("Text error: {e}")))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref c)) => {
                let text = std::str::from_utf8(c)
                    .map_err(|e| DiagramError::malformed(format!("Invalid UTF-8 in CDATA: {e}")))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DiagramError::malformed(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(DiagramError::malformed(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| DiagramError::malformed("document has no root element"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(DiagramError::malformed(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

fn element_from(e: &BytesStart<'_>) -> Result<XmlElement> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| DiagramError::malformed(format!("Invalid tag name: {e}")))?
        .to_string();
    let local = std::str::from_utf8(e.local_name().as_ref())
        .map_err(|e| DiagramError::malformed(format!("Invalid tag name: {e}")))?
        .to_string();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|e| DiagramError::malformed(format!("Attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| DiagramError::malformed(format!("Attribute key error: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| DiagramError::malformed(format!("Attribute value error: {e}")))?
            .to_string();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        local,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}
