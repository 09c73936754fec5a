//! Cursor over an `XmlDocument`
//!
//! `XmlNavigator` is what the XPath engine walks. It is a node id plus an
//! optional attribute slot, so forking it is a plain copy. Whitespace-only
//! text between elements is stepped over by sibling moves but stays
//! reachable as a first child.

use std::borrow::Cow;
use std::ptr;

use crate::dom::{AttributeNode, Node, NodeId, NodeKind, NodeRef, XmlDocument, XmlNode};
use crate::xpath::navigator::{NodeNavigator, NodeType};

/// Stateful position inside one document
#[derive(Clone)]
pub struct XmlNavigator<'a> {
    doc: &'a XmlDocument,
    root: NodeId,
    curr: NodeId,
    attr: Option<usize>,
}

impl<'a> XmlNavigator<'a> {
    /// Cursor positioned on `top`, which is also where `move_to_root` returns
    pub fn new(top: NodeRef<'a>) -> Self {
        XmlNavigator {
            doc: top.document(),
            root: top.id(),
            curr: top.id(),
            attr: None,
        }
    }

    /// The node under the cursor. On an attribute this is a detached
    /// attribute node, never the owning element.
    pub fn current(&self) -> Node<'a> {
        let owner = NodeRef::new(self.doc, self.curr);
        match self.attr.and_then(|index| AttributeNode::new(owner, index)) {
            Some(attr) => Node::Attribute(attr),
            None => Node::Tree(owner),
        }
    }

    pub fn current_id(&self) -> NodeId {
        self.curr
    }

    /// Selected attribute slot of the current element
    pub fn attribute_index(&self) -> Option<usize> {
        self.attr
    }

    pub fn document(&self) -> &'a XmlDocument {
        self.doc
    }

    fn node(&self) -> &'a XmlNode {
        self.doc.at(self.curr)
    }

    fn attribute(&self) -> Option<&'a crate::dom::XmlAttribute> {
        self.attr.and_then(|index| self.node().attrs.get(index))
    }

    fn is_skippable(&self, id: NodeId) -> bool {
        self.doc.at(id).is_whitespace_text()
    }

    /// Follow a sibling link past whitespace-only text
    fn step_sibling(&mut self, link: fn(&XmlNode) -> Option<NodeId>) -> bool {
        if self.attr.is_some() {
            return false;
        }
        let mut next = link(self.node());
        while let Some(id) = next {
            if !self.is_skippable(id) {
                self.curr = id;
                return true;
            }
            next = link(self.doc.at(id));
        }
        false
    }
}

impl<'a> NodeNavigator for XmlNavigator<'a> {
    fn node_type(&self) -> NodeType {
        match self.node().kind {
            NodeKind::Document | NodeKind::Declaration => NodeType::Root,
            NodeKind::Comment => NodeType::Comment,
            NodeKind::Text | NodeKind::CharData | NodeKind::Notation => NodeType::Text,
            NodeKind::Element => {
                if self.attr.is_some() {
                    NodeType::Attribute
                } else {
                    NodeType::Element
                }
            }
            NodeKind::Attribute => {
                panic!("attribute node {} linked into the tree", self.curr)
            }
        }
    }

    fn local_name(&self) -> &str {
        match self.attribute() {
            Some(attr) => &attr.name.local,
            None => &self.node().data,
        }
    }

    fn prefix(&self) -> &str {
        match self.attribute() {
            Some(attr) => &attr.name.space,
            None => &self.node().prefix,
        }
    }

    fn namespace_uri(&self) -> &str {
        match self.attribute() {
            Some(attr) => &attr.namespace_uri,
            None => &self.node().namespace_uri,
        }
    }

    fn value(&self) -> Cow<'_, str> {
        let node = self.node();
        match node.kind {
            NodeKind::Comment | NodeKind::Text => Cow::Borrowed(node.data.as_str()),
            NodeKind::Element => match self.attribute() {
                Some(attr) => Cow::Borrowed(attr.value.as_str()),
                None => Cow::Owned(self.doc.inner_text(self.curr)),
            },
            NodeKind::Document
            | NodeKind::Declaration
            | NodeKind::CharData
            | NodeKind::Notation
            | NodeKind::Attribute => Cow::Borrowed(""),
        }
    }

    fn move_to_root(&mut self) {
        self.curr = self.root;
        self.attr = None;
    }

    fn move_to_parent(&mut self) -> bool {
        if self.attr.take().is_some() {
            return true;
        }
        match self.node().parent {
            Some(parent) => {
                self.curr = parent;
                true
            }
            None => false,
        }
    }

    fn move_to_next_attribute(&mut self) -> bool {
        let next = self.attr.map_or(0, |index| index + 1);
        if next >= self.node().attrs.len() {
            return false;
        }
        self.attr = Some(next);
        true
    }

    fn move_to_child(&mut self) -> bool {
        if self.attr.is_some() {
            return false;
        }
        match self.node().first_child {
            Some(child) => {
                self.curr = child;
                true
            }
            None => false,
        }
    }

    fn move_to_first(&mut self) -> bool {
        if self.attr.is_some() || self.node().prev_sibling.is_none() {
            return false;
        }
        while let Some(prev) = self.node().prev_sibling {
            self.curr = prev;
        }
        true
    }

    fn move_to_next(&mut self) -> bool {
        self.step_sibling(|node| node.next_sibling)
    }

    fn move_to_previous(&mut self) -> bool {
        self.step_sibling(|node| node.prev_sibling)
    }

    fn move_to(&mut self, other: &Self) -> bool {
        if !ptr::eq(self.doc, other.doc) || self.root != other.root {
            return false;
        }
        self.curr = other.curr;
        self.attr = other.attr;
        true
    }

    fn is_same_position(&self, other: &Self) -> bool {
        ptr::eq(self.doc, other.doc) && self.curr == other.curr && self.attr == other.attr
    }

    /// Attributes of an element rank before its children
    fn document_order_key(&self) -> Option<Vec<usize>> {
        let mut key: Vec<usize> = self.attr.into_iter().collect();
        let mut node = self.node();
        while let Some(parent) = node.parent {
            let parent_node = self.doc.at(parent);
            key.push(parent_node.attrs.len() + node.sibling_index as usize);
            node = parent_node;
        }
        key.reverse();
        Some(key)
    }
}

impl std::fmt::Debug for XmlNavigator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlNavigator")
            .field("root", &self.root)
            .field("curr", &self.curr)
            .field("attr", &self.attr)
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    /// Cursor rooted at this node
    pub fn navigator(&self) -> XmlNavigator<'a> {
        XmlNavigator::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{XmlAttribute, DOCUMENT_NODE};

    /// <a><b id="1">x</b><b id="2">y</b></a>
    fn two_bs() -> (XmlDocument, NodeId, NodeId) {
        let mut doc = XmlDocument::new();
        let a = doc.append_element(DOCUMENT_NODE, "a").unwrap();
        let b1 = doc.append_element(a, "b").unwrap();
        doc.set_attribute(b1, XmlAttribute::new("id", "1")).unwrap();
        doc.append_text(b1, "x").unwrap();
        let b2 = doc.append_element(a, "b").unwrap();
        doc.set_attribute(b2, XmlAttribute::new("id", "2")).unwrap();
        doc.append_text(b2, "y").unwrap();
        (doc, b1, b2)
    }

    /// <b>\n  <c/>\n  <d/>\n</b>
    fn spaced() -> (XmlDocument, NodeId) {
        let mut doc = XmlDocument::new();
        let b = doc.append_element(DOCUMENT_NODE, "b").unwrap();
        doc.append_text(b, "\n  ").unwrap();
        doc.append_element(b, "c").unwrap();
        doc.append_text(b, "\n  ").unwrap();
        doc.append_element(b, "d").unwrap();
        doc.append_text(b, "\n").unwrap();
        (doc, b)
    }

    #[test]
    fn reports_node_kinds() {
        let mut doc = XmlDocument::new();
        let decl = doc.append_declaration(DOCUMENT_NODE, "xml version=\"1.0\"").unwrap();
        let e = doc.append_element(DOCUMENT_NODE, "e").unwrap();
        doc.set_attribute(e, XmlAttribute::new("k", "v")).unwrap();
        let t = doc.append_text(e, "t").unwrap();
        let cd = doc.append_cdata(e, "cd").unwrap();
        let c = doc.append_comment(e, "c").unwrap();
        let n = doc.append_notation(e, "n").unwrap();

        let kind = |id| doc.node(id).unwrap().navigator().node_type();
        assert_eq!(kind(DOCUMENT_NODE), NodeType::Root);
        assert_eq!(kind(decl), NodeType::Root);
        assert_eq!(kind(e), NodeType::Element);
        assert_eq!(kind(t), NodeType::Text);
        assert_eq!(kind(cd), NodeType::Text);
        assert_eq!(kind(n), NodeType::Text);
        assert_eq!(kind(c), NodeType::Comment);

        let mut nav = doc.node(e).unwrap().navigator();
        assert!(nav.move_to_next_attribute());
        assert_eq!(nav.node_type(), NodeType::Attribute);
    }

    #[test]
    fn reports_values() {
        let mut doc = XmlDocument::new();
        let e = doc.append_element(DOCUMENT_NODE, "e").unwrap();
        doc.set_attribute(e, XmlAttribute::new("k", "v")).unwrap();
        doc.append_text(e, "one ").unwrap();
        let cd = doc.append_cdata(e, "two").unwrap();
        let c = doc.append_comment(e, "note").unwrap();

        let value = |id| doc.node(id).unwrap().navigator().value().into_owned();
        assert_eq!(value(e), "one two");
        assert_eq!(value(c), "note");
        assert_eq!(value(cd), "");
        assert_eq!(value(DOCUMENT_NODE), "");

        let mut nav = doc.node(e).unwrap().navigator();
        nav.move_to_next_attribute();
        assert_eq!(nav.value(), "v");
        assert_eq!(nav.local_name(), "k");
    }

    #[test]
    fn namespace_reporting() {
        let mut doc = XmlDocument::new();
        let e = doc.append_element_ns(DOCUMENT_NODE, "p", "e", "urn:p").unwrap();
        doc.set_attribute(e, XmlAttribute::new("plain", "1")).unwrap();
        doc.set_attribute(e, XmlAttribute::with_namespace("q:k", "urn:q", "2"))
            .unwrap();

        let mut nav = doc.node(e).unwrap().navigator();
        assert_eq!(nav.prefix(), "p");
        assert_eq!(nav.namespace_uri(), "urn:p");
        assert_eq!(nav.name(), "p:e");

        assert!(nav.move_to_next_attribute());
        assert_eq!(nav.prefix(), "");
        assert_eq!(nav.namespace_uri(), "");

        assert!(nav.move_to_next_attribute());
        assert_eq!(nav.prefix(), "q");
        assert_eq!(nav.namespace_uri(), "urn:q");
        assert_eq!(nav.local_name(), "k");
    }

    #[test]
    fn attribute_iteration_count() {
        let (doc, b1, _) = two_bs();
        for (id, k) in [(b1, 1usize), (DOCUMENT_NODE, 0)] {
            let mut nav = doc.node(id).unwrap().navigator();
            let mut moves = 0;
            while nav.move_to_next_attribute() {
                moves += 1;
            }
            assert_eq!(moves, k);
            assert_eq!(nav.attribute_index(), k.checked_sub(1));
            assert!(nav.move_to_parent() || k == 0);
            assert_eq!(nav.attribute_index(), None);
            assert_eq!(nav.current_id(), id);
        }
    }

    #[test]
    fn attributes_block_tree_moves() {
        let (doc, b1, _) = two_bs();
        let mut nav = doc.node(b1).unwrap().navigator();
        assert!(nav.move_to_next_attribute());
        assert!(!nav.move_to_child());
        assert!(!nav.move_to_next());
        assert!(!nav.move_to_previous());
        assert!(!nav.move_to_first());
        assert_eq!(nav.attribute_index(), Some(0));
    }

    #[test]
    fn parent_then_child_returns() {
        let (doc, b1, _) = two_bs();
        let start = doc.node(b1).unwrap().navigator();
        let mut nav = start.copy();
        assert!(nav.move_to_parent());
        assert!(nav.move_to_child());
        assert!(nav.is_same_position(&start));
    }

    #[test]
    fn copy_is_independent() {
        let (doc, b1, b2) = two_bs();
        let nav = doc.node(b1).unwrap().navigator();
        let mut fork = nav.copy();
        assert!(fork.move_to_next());
        assert_eq!(fork.current_id(), b2);
        assert_eq!(nav.current_id(), b1);
    }

    #[test]
    fn move_to_root_clears_attribute() {
        let (doc, _, b2) = two_bs();
        let mut nav = doc.root().navigator();
        let mut other = doc.node(b2).unwrap().navigator();
        other.move_to_next_attribute();
        assert!(!nav.move_to(&other));

        let mut nav = doc.node(b2).unwrap().navigator();
        nav.move_to_next_attribute();
        nav.move_to_root();
        assert_eq!(nav.current_id(), b2);
        assert_eq!(nav.attribute_index(), None);
    }

    #[test]
    fn move_to_requires_same_root() {
        let (doc, b1, b2) = two_bs();
        let (other_doc, _, _) = two_bs();

        let mut nav = doc.root().navigator();
        let mut peer = doc.root().navigator();
        assert!(peer.move_to_child());
        assert!(peer.move_to_child());
        assert!(peer.move_to_next());
        assert!(peer.move_to_next_attribute());
        assert!(nav.move_to(&peer));
        assert_eq!((nav.current_id(), nav.attribute_index()), (b2, Some(0)));

        assert!(!nav.move_to(&other_doc.root().navigator()));
        assert!(!nav.move_to(&doc.node(b1).unwrap().navigator()));
        assert_eq!(nav.current_id(), b2);
    }

    #[test]
    fn sibling_moves_skip_whitespace() {
        let (doc, b) = spaced();
        let mut nav = doc.node(b).unwrap().navigator();
        assert!(nav.move_to_child());
        assert_eq!(nav.node_type(), NodeType::Text);
        assert!(nav.move_to_next());
        assert_eq!(nav.local_name(), "c");
        assert!(nav.move_to_next());
        assert_eq!(nav.local_name(), "d");

        let at_d = nav.current_id();
        assert!(!nav.move_to_next());
        assert_eq!(nav.current_id(), at_d);

        assert!(nav.move_to_previous());
        assert_eq!(nav.local_name(), "c");
        assert!(!nav.move_to_previous());
        assert_eq!(nav.local_name(), "c");
    }

    #[test]
    fn move_to_first_reaches_whitespace_head() {
        let (doc, b) = spaced();
        let mut nav = doc.node(b).unwrap().navigator();
        assert!(nav.move_to_child());
        assert!(!nav.move_to_first());
        assert!(nav.move_to_next());
        assert!(nav.move_to_first());
        assert_eq!(nav.node_type(), NodeType::Text);
        assert_eq!(nav.value(), "\n  ");
    }

    #[test]
    fn current_synthesizes_attribute_nodes() {
        let (doc, _, b2) = two_bs();
        let mut nav = doc.node(b2).unwrap().navigator();
        assert_eq!(nav.current().as_tree().map(|n| n.id()), Some(b2));

        nav.move_to_next_attribute();
        let current = nav.current();
        let attr = current.as_attribute().unwrap();
        assert_eq!(attr.node().kind, NodeKind::Attribute);
        assert_eq!(attr.value(), "2");
        assert_eq!(current.inner_text(), "2");
        assert_eq!(current.select_attr("id"), "2");
        assert_eq!(current.select_attr("ID"), "");
        // The source tree is untouched
        assert_eq!(doc.node(b2).unwrap().children().count(), 1);
    }
}
