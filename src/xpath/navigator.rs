//! Navigation contract between the engine and a tree model
//!
//! The engine never sees nodes. It holds cursors, moves them, forks them
//! with `copy`, and asks them to describe their position.

use std::borrow::Cow;

/// Node kinds as the engine sees them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
}

/// A stateful cursor over some tree
///
/// Move operations return `false` and leave the cursor where it was when the
/// move is impossible. A cursor is single-owner state; `copy` forks it.
pub trait NodeNavigator: Clone {
    /// Kind of the current position
    fn node_type(&self) -> NodeType;

    fn local_name(&self) -> &str;

    fn prefix(&self) -> &str;

    fn namespace_uri(&self) -> &str;

    /// String value of the current position
    fn value(&self) -> Cow<'_, str>;

    /// Independent cursor at the same position
    fn copy(&self) -> Self {
        self.clone()
    }

    fn move_to_root(&mut self);

    fn move_to_parent(&mut self) -> bool;

    /// Step to the next attribute of the current element; from the element
    /// itself this selects its first attribute
    fn move_to_next_attribute(&mut self) -> bool;

    fn move_to_child(&mut self) -> bool;

    /// Jump to the first sibling
    fn move_to_first(&mut self) -> bool;

    fn move_to_next(&mut self) -> bool;

    fn move_to_previous(&mut self) -> bool;

    /// Take over `other`'s position when both walk the same tree
    fn move_to(&mut self, other: &Self) -> bool;

    /// Both cursors denote the same node (or the same attribute)
    fn is_same_position(&self, other: &Self) -> bool;

    /// Document-order key of the current position, for trees that can build
    /// one without scanning siblings. Keys from one tree compare the way the
    /// positions do. An implementation returns `Some` for every position or
    /// for none; `None` makes the engine rank positions through cursor moves.
    fn document_order_key(&self) -> Option<Vec<usize>> {
        None
    }

    /// `prefix:local`, or just `local`
    fn name(&self) -> String {
        let prefix = self.prefix();
        if prefix.is_empty() {
            self.local_name().to_string()
        } else {
            format!("{}:{}", prefix, self.local_name())
        }
    }
}
