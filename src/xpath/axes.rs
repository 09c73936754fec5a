//! XPath Axes Implementation
//!
//! All 13 XPath 1.0 axes, driven purely by cursor moves:
//! - child, parent, self
//! - descendant, descendant-or-self
//! - ancestor, ancestor-or-self
//! - following, following-sibling
//! - preceding, preceding-sibling
//! - attribute, namespace
//!
//! Every axis returns its nodes in axis order: reverse axes (ancestor,
//! preceding, preceding-sibling) walk away from the context node.

use super::compiler::CompiledNodeTest;
use super::navigator::{NodeNavigator, NodeType};
use super::parser::Axis;

/// Navigate along an axis from a context node
pub fn navigate<N: NodeNavigator>(context: &N, axis: Axis) -> Vec<N> {
    let mut result = Vec::new();
    match axis {
        Axis::Child => push_children(context, &mut result),
        Axis::Descendant => push_descendants(context, &mut result),
        Axis::DescendantOrSelf => {
            result.push(context.copy());
            push_descendants(context, &mut result);
        }
        Axis::Parent => {
            let mut nav = context.copy();
            if nav.move_to_parent() {
                result.push(nav);
            }
        }
        Axis::Ancestor => push_ancestors(context, &mut result),
        Axis::AncestorOrSelf => {
            result.push(context.copy());
            push_ancestors(context, &mut result);
        }
        Axis::FollowingSibling => {
            let mut nav = context.copy();
            while nav.move_to_next() {
                result.push(nav.copy());
            }
        }
        Axis::PrecedingSibling => {
            let mut nav = context.copy();
            while nav.move_to_previous() {
                result.push(nav.copy());
            }
        }
        Axis::Following => following_axis(context, &mut result),
        Axis::Preceding => preceding_axis(context, &mut result),
        Axis::Self_ => result.push(context.copy()),
        Axis::Attribute => {
            // Attributes have no attributes of their own
            if context.node_type() != NodeType::Attribute {
                let mut nav = context.copy();
                while nav.move_to_next_attribute() {
                    result.push(nav.copy());
                }
            }
        }
        // Namespace nodes are not modelled
        Axis::Namespace => {}
    }
    result
}

/// child:: axis - all child nodes
fn push_children<N: NodeNavigator>(context: &N, result: &mut Vec<N>) {
    let mut nav = context.copy();
    if nav.move_to_child() {
        result.push(nav.copy());
        while nav.move_to_next() {
            result.push(nav.copy());
        }
    }
}

/// descendant:: axis - depth-first, document order
fn push_descendants<N: NodeNavigator>(context: &N, result: &mut Vec<N>) {
    let mut nav = context.copy();
    if !nav.move_to_child() {
        return;
    }
    loop {
        result.push(nav.copy());
        push_descendants(&nav, result);
        if !nav.move_to_next() {
            break;
        }
    }
}

/// descendant:: axis in reverse document order
fn push_descendants_reversed<N: NodeNavigator>(context: &N, result: &mut Vec<N>) {
    let mut forward = Vec::new();
    push_descendants(context, &mut forward);
    result.extend(forward.into_iter().rev());
}

/// ancestor:: axis - parent, grandparent, ...
fn push_ancestors<N: NodeNavigator>(context: &N, result: &mut Vec<N>) {
    let mut nav = context.copy();
    while nav.move_to_parent() {
        result.push(nav.copy());
    }
}

/// following:: axis - all nodes after in document order (not descendants)
fn following_axis<N: NodeNavigator>(context: &N, result: &mut Vec<N>) {
    let mut current = context.copy();
    if current.node_type() == NodeType::Attribute {
        // An attribute precedes its owner's content
        current.move_to_parent();
        push_descendants(&current, result);
    }
    loop {
        let mut sibling = current.copy();
        while sibling.move_to_next() {
            result.push(sibling.copy());
            push_descendants(&sibling, result);
        }
        if !current.move_to_parent() {
            break;
        }
    }
}

/// preceding:: axis - all nodes before in reverse document order (not ancestors)
fn preceding_axis<N: NodeNavigator>(context: &N, result: &mut Vec<N>) {
    let mut current = context.copy();
    if current.node_type() == NodeType::Attribute {
        current.move_to_parent();
    }
    loop {
        let mut sibling = current.copy();
        while sibling.move_to_previous() {
            push_descendants_reversed(&sibling, result);
            result.push(sibling.copy());
        }
        if !current.move_to_parent() {
            break;
        }
    }
}

/// Check if a node matches a node test.
///
/// `*` and name tests only match the axis' principal node type: attributes
/// on the attribute axis, elements everywhere else.
pub fn matches_node_test<N: NodeNavigator>(nav: &N, node_test: &CompiledNodeTest, axis: Axis) -> bool {
    let principal = if axis == Axis::Attribute {
        NodeType::Attribute
    } else {
        NodeType::Element
    };
    let kind = nav.node_type();

    match node_test {
        CompiledNodeTest::Any => kind == principal,
        CompiledNodeTest::Name(name) => kind == principal && nav.local_name() == name,
        CompiledNodeTest::QName { prefix, uri, local } => {
            kind == principal && nav.local_name() == local && namespace_matches(nav, prefix, uri.as_deref())
        }
        CompiledNodeTest::NamespaceWildcard { prefix, uri } => {
            kind == principal && namespace_matches(nav, prefix, uri.as_deref())
        }
        // node() matches any node type
        CompiledNodeTest::Node => true,
        CompiledNodeTest::Text => kind == NodeType::Text,
        CompiledNodeTest::Comment => kind == NodeType::Comment,
        // The tree model has no processing instructions
        CompiledNodeTest::ProcessingInstruction(_) => false,
    }
}

fn namespace_matches<N: NodeNavigator>(nav: &N, prefix: &str, uri: Option<&str>) -> bool {
    match uri {
        Some(uri) => nav.namespace_uri() == uri,
        None => nav.prefix() == prefix,
    }
}
