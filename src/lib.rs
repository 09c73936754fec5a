//! xmlnav - XPath queries over an arena XML tree
//!
//! Layers:
//! - `dom`: arena document, builder, borrowed node handles
//! - `navigator`: the cursor the XPath engine walks
//! - `xpath`: XPath 1.0 engine over any `NodeNavigator`
//! - `query`: compile-and-select helpers, expression cache, batch queries
//!
//! ```
//! use xmlnav::dom::{XmlAttribute, XmlDocument, DOCUMENT_NODE};
//!
//! let mut doc = XmlDocument::new();
//! let a = doc.append_element(DOCUMENT_NODE, "a")?;
//! for (id, text) in [("1", "x"), ("2", "y")] {
//!     let b = doc.append_element(a, "b")?;
//!     doc.set_attribute(b, XmlAttribute::new("id", id))?;
//!     doc.append_text(b, text)?;
//! }
//!
//! let b = xmlnav::query(doc.root(), "//b[@id='2']")?.expect("second b");
//! assert_eq!(b.inner_text(), "y");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dom;
pub mod error;
pub mod navigator;
pub mod query;
pub mod xpath;

pub use dom::{AttributeNode, Node, NodeKind, NodeRef, XmlAttribute, XmlDocument};
pub use error::{Result, TreeError, XPathError};
pub use navigator::XmlNavigator;
pub use query::{
    compile, compile_with_options, find_all, find_one, query, query_all, query_all_with_options,
    query_with_options, select_all, select_first,
};
#[allow(deprecated)]
pub use query::{find_each, find_each_with_break};
pub use xpath::{CompileOptions, Expr, Literal, NodeNavigator, NodeType, Value};
