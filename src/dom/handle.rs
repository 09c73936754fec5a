//! Borrowed node handles
//!
//! `NodeRef` points at a node inside an arena. `AttributeNode` is the
//! detached, query-only stand-in for an attribute, and `Node` is what
//! queries hand back: one or the other.

use std::fmt;

use super::document::{Children, XmlDocument};
use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};

/// Handle on a node inside an `XmlDocument`
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a XmlDocument,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(doc: &'a XmlDocument, id: NodeId) -> Self {
        NodeRef { doc, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a XmlDocument {
        self.doc
    }

    /// The underlying arena record
    pub fn node(&self) -> &'a XmlNode {
        self.doc.at(self.id)
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    /// Local name for elements, literal text for text-like nodes
    pub fn data(&self) -> &'a str {
        &self.node().data
    }

    pub fn prefix(&self) -> &'a str {
        &self.node().prefix
    }

    pub fn namespace_uri(&self) -> &'a str {
        &self.node().namespace_uri
    }

    pub fn attrs(&self) -> &'a [XmlAttribute] {
        &self.node().attrs
    }

    fn link(&self, id: Option<NodeId>) -> Option<NodeRef<'a>> {
        id.map(|id| NodeRef::new(self.doc, id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().parent)
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().first_child)
    }

    pub fn last_child(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().last_child)
    }

    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().prev_sibling)
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().next_sibling)
    }

    /// Children in document order
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        let ids: Children<'a> = doc.children(self.id);
        ids.map(move |id| NodeRef::new(doc, id))
    }

    /// Concatenated text of this subtree
    pub fn inner_text(&self) -> String {
        self.doc.inner_text(self.id)
    }

    /// Attribute value by qualified name, or "" when absent
    pub fn select_attr(&self, name: &str) -> &'a str {
        self.doc.select_attr(self.id, name)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("data", &self.data())
            .finish()
    }
}

/// An attribute fabricated as a node for a query result
///
/// Holds a detached `Attribute` node whose single `Text` child carries the
/// value. Neither node is part of any arena: the owner element's child list
/// does not contain them and nothing links back to them.
#[derive(Debug, Clone)]
pub struct AttributeNode<'a> {
    owner: NodeRef<'a>,
    index: usize,
    node: XmlNode,
    text: XmlNode,
}

impl<'a> AttributeNode<'a> {
    /// Materialize attribute `index` of `owner`; `None` if out of range
    pub(crate) fn new(owner: NodeRef<'a>, index: usize) -> Option<Self> {
        let attr = owner.attrs().get(index)?;
        Some(AttributeNode {
            owner,
            index,
            node: XmlNode::attribute(attr),
            text: XmlNode::text(attr.value.clone()),
        })
    }

    /// Element carrying the attribute
    pub fn owner(&self) -> NodeRef<'a> {
        self.owner
    }

    /// Position in the owner's attribute list
    pub fn index(&self) -> usize {
        self.index
    }

    /// The attribute record this node was built from
    pub fn attribute(&self) -> &'a XmlAttribute {
        &self.owner.attrs()[self.index]
    }

    /// The detached `Attribute` node. Its link fields are all `None`: the
    /// `Text` child lives outside any arena and is reached through
    /// [`children`](Self::children) or [`text_child`](Self::text_child).
    pub fn node(&self) -> &XmlNode {
        &self.node
    }

    /// The single detached `Text` child
    pub fn text_child(&self) -> &XmlNode {
        &self.text
    }

    /// Children of the attribute node: exactly its `Text` child
    pub fn children(&self) -> impl Iterator<Item = &XmlNode> + '_ {
        std::iter::once(&self.text)
    }

    pub fn local_name(&self) -> &str {
        &self.node.data
    }

    pub fn prefix(&self) -> &str {
        &self.node.prefix
    }

    pub fn namespace_uri(&self) -> &str {
        &self.node.namespace_uri
    }

    pub fn value(&self) -> &str {
        &self.text.data
    }
}

impl PartialEq for AttributeNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.index == other.index
    }
}

impl Eq for AttributeNode<'_> {}

/// A query result: a real tree node, or a synthetic attribute node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    Tree(NodeRef<'a>),
    Attribute(AttributeNode<'a>),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Tree(node) => node.kind(),
            Node::Attribute(_) => NodeKind::Attribute,
        }
    }

    /// Local name for elements and attributes, literal text otherwise
    pub fn data(&self) -> &str {
        match self {
            Node::Tree(node) => node.data(),
            Node::Attribute(attr) => attr.local_name(),
        }
    }

    pub fn prefix(&self) -> &str {
        match self {
            Node::Tree(node) => node.prefix(),
            Node::Attribute(attr) => attr.prefix(),
        }
    }

    pub fn namespace_uri(&self) -> &str {
        match self {
            Node::Tree(node) => node.namespace_uri(),
            Node::Attribute(attr) => attr.namespace_uri(),
        }
    }

    /// Concatenated text; for an attribute, the text of its single child
    pub fn inner_text(&self) -> String {
        match self {
            Node::Tree(node) => node.inner_text(),
            Node::Attribute(attr) => attr.value().to_string(),
        }
    }

    /// Attribute value by name, or "".
    ///
    /// On a synthetic attribute node this returns its own value when `name`
    /// is its own name.
    pub fn select_attr(&self, name: &str) -> &str {
        match self {
            Node::Tree(node) => node.select_attr(name),
            Node::Attribute(attr) if attr.local_name() == name => attr.value(),
            Node::Attribute(_) => "",
        }
    }

    /// The parent node; for an attribute, the element carrying it
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        match self {
            Node::Tree(node) => node.parent(),
            Node::Attribute(attr) => Some(attr.owner()),
        }
    }

    pub fn as_tree(&self) -> Option<NodeRef<'a>> {
        match self {
            Node::Tree(node) => Some(*node),
            Node::Attribute(_) => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&AttributeNode<'a>> {
        match self {
            Node::Tree(_) => None,
            Node::Attribute(attr) => Some(attr),
        }
    }
}

impl<'a> From<NodeRef<'a>> for Node<'a> {
    fn from(node: NodeRef<'a>) -> Self {
        Node::Tree(node)
    }
}
