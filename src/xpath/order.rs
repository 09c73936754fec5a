//! Document order for cursor positions
//!
//! Trees that can compute an order key directly provide it through
//! `NodeNavigator::document_order_key`. Otherwise order is derived from
//! ancestry through cursor moves: a
//! node's key lists, from the top down, its rank under each ancestor.
//! Under one parent, attributes rank before children; within each group the
//! cursor's own enumeration order is kept. An ancestor's key is a prefix of
//! its descendants' keys and therefore sorts first.

use super::navigator::{NodeNavigator, NodeType};

/// Ancestry key of the cursor's position
pub fn order_key<N: NodeNavigator>(nav: &N) -> Vec<usize> {
    let mut key = Vec::new();
    let mut node = nav.copy();
    loop {
        let mut parent = node.copy();
        if !parent.move_to_parent() {
            break;
        }
        key.push(rank_under(&parent, &node));
        node = parent;
    }
    key.reverse();
    key
}

/// Rank of `node` among `parent`'s attributes and children
fn rank_under<N: NodeNavigator>(parent: &N, node: &N) -> usize {
    let is_attribute = node.node_type() == NodeType::Attribute;

    let mut probe = parent.copy();
    let mut rank = 0;
    while probe.move_to_next_attribute() {
        if is_attribute && probe.is_same_position(node) {
            return rank;
        }
        rank += 1;
    }

    let mut probe = parent.copy();
    if probe.move_to_child() {
        loop {
            if probe.is_same_position(node) {
                return rank;
            }
            if !probe.move_to_next() {
                break;
            }
            rank += 1;
        }
    }
    usize::MAX
}

/// Sort into document order and drop repeated positions
pub fn sort_document_order<N: NodeNavigator>(nodes: &mut Vec<N>) {
    if nodes.len() < 2 {
        return;
    }
    nodes.sort_by_cached_key(|nav| nav.document_order_key().unwrap_or_else(|| order_key(nav)));
    nodes.dedup_by(|a, b| a.is_same_position(b));
}
