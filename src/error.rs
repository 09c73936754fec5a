//! Error types
//!
//! Two families: `XPathError` for compiling and evaluating queries,
//! `TreeError` for building a document arena.

use crate::dom::{NodeId, NodeKind};

/// Errors raised while compiling or evaluating an XPath expression
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XPathError {
    /// Malformed expression string
    #[error("invalid XPath expression `{expr}`: {message}")]
    Syntax { expr: String, message: String },
    /// Runtime failure (unknown function, wrong arity, unbound variable, ...)
    #[error("XPath evaluation failed: {0}")]
    Eval(String),
    /// A node selection was requested but the expression yields a scalar
    #[error("XPath expression `{expr}` does not evaluate to a node-set")]
    NotANodeSet { expr: String },
}

impl XPathError {
    pub(crate) fn syntax(expr: &str, message: impl Into<String>) -> Self {
        XPathError::Syntax {
            expr: expr.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error comes from compiling the expression
    pub fn is_syntax(&self) -> bool {
        matches!(self, XPathError::Syntax { .. })
    }
}

/// Errors raised while building a document tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node {0} does not exist in this document")]
    UnknownNode(NodeId),
    #[error("node {parent} is a {kind:?} node and cannot own children")]
    LeafParent { parent: NodeId, kind: NodeKind },
    #[error("{0:?} nodes cannot be linked into the tree")]
    Unlinkable(NodeKind),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("duplicate attribute `{0}`")]
    DuplicateAttribute(String),
}

/// Crate-wide result alias
pub type Result<T, E = XPathError> = std::result::Result<T, E>;
