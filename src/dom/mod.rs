//! DOM Module - Arena-based XML Document
//!
//! Implements the tree the query layer navigates:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for parent/child/sibling links
//! - Attributes kept as ordered records on their element

pub mod document;
pub mod handle;
pub mod node;

pub use document::{Children, Descendants, XmlDocument, DOCUMENT_NODE};
pub use handle::{AttributeNode, Node, NodeRef};
pub use node::{NodeId, NodeKind, QualName, XmlAttribute, XmlNode};
