// Copyright 2025 the oncards authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A small owned DOM over `quick-xml`'s pull parser.
//!
//! Both the OneNote export parser and the MathML converter need random access
//! to small documents, so we build a tree of [`Element`] values instead of
//! threading state through event loops. Element and attribute names are stored
//! without their namespace prefix (`one:OE` becomes `OE`).

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// An XML element with its attributes, child elements, and character data.
///
/// Character data is the concatenation of all text and CDATA nodes directly
/// under this element. CDATA sections are kept verbatim; plain text nodes are
/// entity-unescaped.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn new(name: String, attrs: HashMap<String, String>) -> Self {
        Element {
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// The value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|v| v.as_str())
    }

    /// The first direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a path of child names, taking the first match at each step.
    pub fn descend(&self, path: &[&str]) -> Option<&Element> {
        let mut current = self;
        for name in path {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// All elements in the subtree (including `self`) with the given name,
    /// in document order.
    pub fn descendants_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.descendants_named(name, out);
        }
    }
}

fn local_name(raw: &[u8]) -> Fallible<String> {
    let name = String::from_utf8(raw.to_vec())?;
    match name.rsplit_once(':') {
        Some((_, local)) => Ok(local.to_string()),
        None => Ok(name),
    }
}

fn read_attrs(start: &quick_xml::events::BytesStart) -> Fallible<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ErrorReport::new(format!("XML attribute error: {e}")))?;
        let key = local_name(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| ErrorReport::new(format!("XML attribute error: {e}")))?
            .to_string();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// Parse a complete XML document into its root [`Element`].
pub fn parse(xml: &str) -> Fallible<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = local_name(e.name().as_ref())?;
                let attrs = read_attrs(e)?;
                stack.push(Element::new(name, attrs));
            }
            Event::Empty(ref e) => {
                let name = local_name(e.name().as_ref())?;
                let attrs = read_attrs(e)?;
                let element = Element::new(name, attrs);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return fail("multiple root elements in XML document"),
                }
            }
            Event::End(_) => match stack.pop() {
                Some(element) => match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return fail("multiple root elements in XML document"),
                },
                None => return fail("unbalanced closing tag in XML document"),
            },
            Event::Text(e) => {
                let text = e.unescape()?;
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                let raw = String::from_utf8(e.into_inner().to_vec())?;
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&raw);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    if !stack.is_empty() {
        return fail("unclosed element in XML document");
    }
    match root {
        Some(root) => Ok(root),
        None => fail("empty XML document"),
    }
}
