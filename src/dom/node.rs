//! Node records stored in the document arena

use std::fmt;

/// Index of a node in its document arena
pub type NodeId = u32;

/// Node tag
///
/// Exactly one tag per node. Only `Document` and `Element` nodes own children;
/// `Attribute` is reserved for the synthetic attribute nodes handed out by
/// queries and never appears inside a document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    /// XML declaration (`<?xml ...?>`)
    Declaration,
    Element,
    Text,
    /// `<![CDATA[...]]>`
    CharData,
    Comment,
    /// DOCTYPE / notation declaration
    Notation,
    /// Attribute presented as a node
    Attribute,
}

impl NodeKind {
    /// Whether nodes of this kind may own children
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }
}

/// Qualified name: `space` holds the prefix, `local` the local part
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QualName {
    pub space: String,
    pub local: String,
}

impl QualName {
    pub fn new(space: impl Into<String>, local: impl Into<String>) -> Self {
        QualName {
            space: space.into(),
            local: local.into(),
        }
    }

    /// Split `prefix:local` at the first colon. A bare name has no prefix.
    pub fn parse(name: &str) -> Self {
        match memchr::memchr(b':', name.as_bytes()) {
            Some(pos) => QualName::new(&name[..pos], &name[pos + 1..]),
            None => QualName::new("", name),
        }
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.space.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{}:{}", self.space, self.local)
        }
    }
}

/// Attribute record stored on an element, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: QualName,
    pub namespace_uri: String,
    pub value: String,
}

impl XmlAttribute {
    /// Unqualified attribute
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        XmlAttribute {
            name: QualName::parse(name),
            namespace_uri: String::new(),
            value: value.into(),
        }
    }

    /// Namespace-qualified attribute
    pub fn with_namespace(
        name: &str,
        namespace_uri: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        XmlAttribute {
            name: QualName::parse(name),
            namespace_uri: namespace_uri.into(),
            value: value.into(),
        }
    }
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Local name for elements and attributes, literal text otherwise
    pub data: String,
    /// Namespace prefix, empty when unqualified
    pub prefix: String,
    /// Namespace URI, empty when unqualified
    pub namespace_uri: String,
    /// Attributes in document order (elements only)
    pub attrs: Vec<XmlAttribute>,
    // Tree links, maintained by `XmlDocument::append_child`.
    // Only the document node has no parent.
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Position among the parent's children, counting from 0
    pub sibling_index: u32,
}

impl XmlNode {
    fn detached(kind: NodeKind, data: String) -> Self {
        XmlNode {
            kind,
            data,
            prefix: String::new(),
            namespace_uri: String::new(),
            attrs: Vec::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            sibling_index: 0,
        }
    }

    pub fn document() -> Self {
        Self::detached(NodeKind::Document, String::new())
    }

    /// Element from a possibly prefixed name
    pub fn element(name: &str) -> Self {
        let qname = QualName::parse(name);
        let mut node = Self::detached(NodeKind::Element, qname.local);
        node.prefix = qname.space;
        node
    }

    /// Element with explicit prefix and namespace
    pub fn element_ns(prefix: &str, local: &str, namespace_uri: &str) -> Self {
        let mut node = Self::detached(NodeKind::Element, local.to_string());
        node.prefix = prefix.to_string();
        node.namespace_uri = namespace_uri.to_string();
        node
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::detached(NodeKind::Text, content.into())
    }

    pub fn cdata(content: impl Into<String>) -> Self {
        Self::detached(NodeKind::CharData, content.into())
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Self::detached(NodeKind::Comment, content.into())
    }

    pub fn declaration(content: impl Into<String>) -> Self {
        Self::detached(NodeKind::Declaration, content.into())
    }

    pub fn notation(content: impl Into<String>) -> Self {
        Self::detached(NodeKind::Notation, content.into())
    }

    /// Create a detached attribute node. Only the query layer builds these.
    pub(crate) fn attribute(attr: &XmlAttribute) -> Self {
        let mut node = Self::detached(NodeKind::Attribute, attr.name.local.clone());
        node.prefix = attr.name.space.clone();
        node.namespace_uri = attr.namespace_uri.clone();
        node
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Text node made only of whitespace (formatting between tags)
    #[inline]
    pub fn is_whitespace_text(&self) -> bool {
        self.kind == NodeKind::Text && self.data.trim().is_empty()
    }

    /// Attribute value by qualified name (`prefix:local` or `local`), case-sensitive
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        let qname = QualName::parse(name);
        self.attrs
            .iter()
            .find(|attr| attr.name == qname)
            .map(|attr| attr.value.as_str())
    }
}
