//! Export document reader.
//!
//! Parses the catalog's XML export into a generic tree of nodes.
//! Field access is permissive: a missing subnode yields the caller's
//! default instead of an error, since sparse catalog entries are
//! normal.

use crate::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

/// One element of the export document.
#[derive(Debug, Clone, Default)]
pub struct ExportNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<ExportNode>,
}

impl ExportNode {
    /// Parse an export document from a string.
    pub fn parse(xml: &str) -> Result<ExportNode> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut buf = Vec::new();

        let mut stack: Vec<ExportNode> = Vec::new();
        let mut root: Option<ExportNode> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(node_from_tag(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let node = node_from_tag(&e)?;
                    attach(&mut stack, &mut root, node);
                }
                Ok(Event::Text(t)) => {
                    if let Some(current) = stack.last_mut() {
                        let val = t.unescape().unwrap_or_default();
                        if !current.text.is_empty() {
                            current.text.push(' ');
                        }
                        current.text.push_str(val.trim());
                    }
                }
                Ok(Event::End(_)) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| Error::ExportParse("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, node);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::Xml(e)),
            }
            buf.clear();
        }

        root.ok_or_else(|| Error::ExportParse("empty document".to_string()))
    }

    /// First child with the given element name.
    pub fn child(&self, name: &str) -> Option<&ExportNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given element name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ExportNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the named subnode, or the supplied default when the
    /// subnode is absent.
    pub fn text_of(&self, name: &str, default: &str) -> String {
        self.child(name)
            .map(|c| c.text.clone())
            .unwrap_or_else(|| default.to_string())
    }

    /// Attribute value, or the supplied default when absent.
    pub fn attr(&self, name: &str, default: &str) -> String {
        self.attributes
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

fn node_from_tag(e: &quick_xml::events::BytesStart<'_>) -> Result<ExportNode> {
    let mut node = ExportNode {
        name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
        ..Default::default()
    };
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().unwrap_or_default().to_string();
        node.attributes.insert(key, value);
    }
    Ok(node)
}

fn attach(stack: &mut [ExportNode], root: &mut Option<ExportNode>, node: ExportNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    }
}
