//! XML tree reading and writing on top of quick-xml.
//!
//! Requests are assembled as [`Element`] trees and written in one pass.
//! Responses are read into [`XmlNode`] trees with namespace prefixes resolved,
//! so callers match on local name plus namespace URI and never on prefixes.
//!
//! quick-xml does not expand external entities; DOCTYPE declarations are
//! rejected outright.

use crate::error::{ClientError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// SOAP 1.1 envelope namespace.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// XML Schema instance namespace (`i:type`, `i:nil`).
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// Serialization namespace of primitive arrays.
pub const ARRAYS_NS: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Element to be written. Names are written exactly as given, prefix included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Children(Vec<Element>),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Content::Children(Vec::new()),
        }
    }

    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Content::Text(text.into()),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Append a child, turning a text element into a container.
    pub fn push(&mut self, child: Element) {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            Content::Text(_) => self.content = Content::Children(vec![child]),
        }
    }
}

/// Write `root` as a UTF-8 document with an XML declaration.
pub fn write_document(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(serialization)?;
    writer.get_mut().push(b'\n');
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(start)).map_err(serialization)?;

    match &element.content {
        Content::Text(text) if !text.is_empty() => {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(serialization)?;
        }
        Content::Text(_) => {}
        Content::Children(children) => {
            for child in children {
                write_element(writer, child)?;
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(serialization)?;
    Ok(())
}

fn serialization(err: impl std::fmt::Display) -> ClientError {
    ClientError::Serialization(err.to_string())
}

/// Parsed element with resolved namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub local_name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    /// Concatenated, trimmed text content
    pub text: String,
    pub children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub local_name: String,
    pub namespace: Option<String>,
    pub value: String,
}

impl XmlNode {
    pub fn is(&self, local_name: &str) -> bool {
        self.local_name == local_name
    }

    /// First child with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.is(local_name))
    }

    pub fn children_named<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.is(local_name))
    }

    /// Text of the first child with the given local name. Nil and missing
    /// children are both `None`.
    pub fn child_text(&self, local_name: &str) -> Option<&str> {
        self.child(local_name)
            .filter(|c| !c.is_nil())
            .map(|c| c.text.as_str())
    }

    pub fn attribute(&self, namespace: Option<&str>, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Value of the `xsi:type` attribute, whatever its prefix.
    pub fn xsi_type(&self) -> Option<&str> {
        self.attribute(Some(XSI_NS), "type")
    }

    /// `xsi:nil="true"`.
    pub fn is_nil(&self) -> bool {
        matches!(self.attribute(Some(XSI_NS), "nil"), Some("true" | "1"))
    }
}

/// Namespace bindings declared on one open element.
type Scope = Vec<(Option<String>, String)>;

/// Parse a document into its root element.
pub fn parse_document(data: &[u8]) -> Result<XmlNode> {
    let xml = std::str::from_utf8(data)
        .map_err(|e| ClientError::malformed(format!("invalid UTF-8: {}", e)))?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scopes: Vec<Scope> = Vec::new();
    let mut open: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let node = open_node(e, &mut scopes)?;
                open.push(node);
            }

            Ok(Event::Empty(ref e)) => {
                let node = open_node(e, &mut scopes)?;
                scopes.pop();
                attach(node, &mut open, &mut root)?;
            }

            Ok(Event::End(_)) => {
                scopes.pop();
                let node = open
                    .pop()
                    .ok_or_else(|| ClientError::malformed("unbalanced end tag"))?;
                attach(node, &mut open, &mut root)?;
            }

            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| ClientError::malformed(format!("bad text content: {}", e)))?;
                if let Some(node) = open.last_mut() {
                    node.text.push_str(&text);
                }
            }

            Ok(Event::CData(ref e)) => {
                let text = std::str::from_utf8(e)
                    .map_err(|e| ClientError::malformed(format!("bad CDATA: {}", e)))?;
                if let Some(node) = open.last_mut() {
                    node.text.push_str(text);
                }
            }

            Ok(Event::DocType(_)) => {
                return Err(ClientError::malformed(
                    "DOCTYPE declarations are not allowed",
                ));
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(ClientError::malformed(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }

            _ => {}
        }

        buf.clear();
    }

    if !open.is_empty() {
        return Err(ClientError::malformed("unexpected end of document"));
    }
    root.ok_or_else(|| ClientError::malformed("document has no root element"))
}

fn attach(node: XmlNode, open: &mut [XmlNode], root: &mut Option<XmlNode>) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(ClientError::malformed("multiple root elements")),
    }
    Ok(())
}

/// Build a node from a start tag, pushing its namespace scope.
fn open_node(e: &BytesStart, scopes: &mut Vec<Scope>) -> Result<XmlNode> {
    let mut scope = Scope::new();
    let mut raw_attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ClientError::malformed(format!("bad attribute: {}", e)))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| ClientError::malformed(format!("bad attribute value: {}", e)))?
            .into_owned();

        if key == "xmlns" {
            scope.push((None, value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((Some(prefix.to_string()), value));
        } else {
            raw_attributes.push((key, value));
        }
    }
    scopes.push(scope);

    let qname = e.name();
    let (prefix, local_name) = split_qname(utf8(qname.as_ref())?);
    let namespace = resolve(scopes, prefix);

    let attributes = raw_attributes
        .into_iter()
        .map(|(key, value)| {
            let (prefix, local) = split_qname(&key);
            // Unprefixed attributes are in no namespace.
            let namespace = prefix.and_then(|p| resolve(scopes, Some(p)));
            XmlAttribute {
                local_name: local.to_string(),
                namespace,
                value,
            }
        })
        .collect();

    Ok(XmlNode {
        local_name: local_name.to_string(),
        namespace,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn resolve(scopes: &[Scope], prefix: Option<&str>) -> Option<String> {
    if prefix == Some("xml") {
        return Some(XML_NS.to_string());
    }
    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter().rev())
        .find(|(p, _)| p.as_deref() == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}

fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| ClientError::malformed(format!("invalid UTF-8 name: {}", e)))
}
