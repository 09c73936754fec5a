//! Arena document
//!
//! Nodes live in one `Vec` and refer to each other by `NodeId`. Linking is
//! append-only, so a tree never changes shape under a live cursor.
//!
//! The arena is filled by whatever produced the tree (a parser, or code
//! using the builder methods below). Node 0 is always the document node.

use super::handle::NodeRef;
use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use crate::error::TreeError;

/// Id of the document node in every arena
pub const DOCUMENT_NODE: NodeId = 0;

/// An XML document stored in arena format
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    /// Create a document holding only the document node
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(XmlNode::document());
        XmlDocument { nodes }
    }

    /// Handle on the document node
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(self, DOCUMENT_NODE)
    }

    /// Get the root element ID (first element child of the document node)
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.children(DOCUMENT_NODE)
            .find(|&id| self.nodes[id as usize].is_element())
    }

    /// Handle on the root element
    pub fn root_element(&self) -> Option<NodeRef<'_>> {
        self.root_element_id().map(|id| NodeRef::new(self, id))
    }

    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Handle on a node by ID
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.get_node(id).map(|_| NodeRef::new(self, id))
    }

    /// Arena access for ids that came out of this arena
    #[inline]
    pub(crate) fn at(&self, id: NodeId) -> &XmlNode {
        &self.nodes[id as usize]
    }

    /// Number of nodes, the document node included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append `node` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, mut node: XmlNode) -> Result<NodeId, TreeError> {
        let parent_kind = self
            .get_node(parent)
            .ok_or(TreeError::UnknownNode(parent))?
            .kind;
        if !parent_kind.is_container() {
            return Err(TreeError::LeafParent {
                parent,
                kind: parent_kind,
            });
        }
        if matches!(node.kind, NodeKind::Attribute | NodeKind::Document) {
            return Err(TreeError::Unlinkable(node.kind));
        }

        // Links are owned by the arena, never by the caller
        node.parent = Some(parent);
        node.first_child = None;
        node.last_child = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        node.sibling_index = 0;

        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_last(parent, id);
        Ok(id)
    }

    /// Make `child` the new last child of `parent`
    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let slot = &mut self.nodes[parent as usize];
        let prev = slot.last_child.replace(child);
        slot.first_child.get_or_insert(child);
        if let Some(prev) = prev {
            let index = self.nodes[prev as usize].sibling_index + 1;
            self.nodes[prev as usize].next_sibling = Some(child);
            let node = &mut self.nodes[child as usize];
            node.prev_sibling = Some(prev);
            node.sibling_index = index;
        }
    }

    /// Append an element; `name` may carry a `prefix:`
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        self.append_child(parent, XmlNode::element(name))
    }

    /// Append a namespace-qualified element
    pub fn append_element_ns(
        &mut self,
        parent: NodeId,
        prefix: &str,
        local: &str,
        namespace_uri: &str,
    ) -> Result<NodeId, TreeError> {
        self.append_child(parent, XmlNode::element_ns(prefix, local, namespace_uri))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.append_child(parent, XmlNode::text(text))
    }

    pub fn append_cdata(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.append_child(parent, XmlNode::cdata(text))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.append_child(parent, XmlNode::comment(text))
    }

    pub fn append_declaration(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.append_child(parent, XmlNode::declaration(text))
    }

    pub fn append_notation(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.append_child(parent, XmlNode::notation(text))
    }

    /// Add an attribute to an element, keeping document order
    pub fn set_attribute(&mut self, element: NodeId, attr: XmlAttribute) -> Result<(), TreeError> {
        let node = self
            .nodes
            .get_mut(element as usize)
            .ok_or(TreeError::UnknownNode(element))?;
        if !node.is_element() {
            return Err(TreeError::NotAnElement(element));
        }
        if node.attrs.iter().any(|existing| existing.name == attr.name) {
            return Err(TreeError::DuplicateAttribute(attr.name.to_string()));
        }
        node.attrs.push(attr);
        Ok(())
    }

    /// Child ids of `id` in document order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.get_node(id).and_then(|n| n.first_child),
        }
    }

    /// Descendant ids of `id` in document order, `id` itself excluded
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            origin: id,
            next: self.get_node(id).and_then(|n| n.first_child),
        }
    }

    /// Text and CDATA pieces under `id` (the node itself included), in document order
    pub fn text_chunks(&self, id: NodeId) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter_map(move |nid| {
                let node = self.get_node(nid)?;
                match node.kind {
                    NodeKind::Text | NodeKind::CharData => Some(node.data.as_str()),
                    _ => None,
                }
            })
    }

    /// Concatenated text of the subtree rooted at `id`
    pub fn inner_text(&self, id: NodeId) -> String {
        self.text_chunks(id).collect()
    }

    /// Attribute value by qualified name, or "" when the node has no such attribute
    pub fn select_attr(&self, id: NodeId, name: &str) -> &str {
        self.get_node(id)
            .and_then(|node| node.attribute_value(name))
            .unwrap_or("")
    }
}

/// Iterator over the children of one node
pub struct Children<'d> {
    doc: &'d XmlDocument,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc.at(id).next_sibling;
        Some(id)
    }
}

/// Pre-order walk of a subtree. Follows the arena links, so it needs no stack.
pub struct Descendants<'d> {
    doc: &'d XmlDocument,
    origin: NodeId,
    next: Option<NodeId>,
}

impl Descendants<'_> {
    /// Node after `id` in pre-order, without leaving the subtree of `origin`
    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(child) = self.doc.at(id).first_child {
            return Some(child);
        }
        let mut id = id;
        while id != self.origin {
            let node = self.doc.at(id);
            if let Some(sibling) = node.next_sibling {
                return Some(sibling);
            }
            id = node.parent?;
        }
        None
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.successor(id);
        Some(id)
    }
}
