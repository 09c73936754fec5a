//! Query facade
//!
//! Compile-then-select helpers over a document tree. Every query runs from
//! a fresh cursor seeded at the node passed in, which is also where an
//! absolute path (`/...`) starts. Matches on attributes come back as
//! detached [`AttributeNode`](crate::dom::AttributeNode)s.
//!
//! Two surfaces share one implementation: the `Result`-returning functions
//! (`query_all`, `query`, ...) and the panicking `find_*` family for call
//! sites that treat a malformed expression as a bug.

pub mod cache;
#[cfg(feature = "parallel")]
pub mod parallel;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::dom::{Node, NodeRef};
use crate::error::Result;
use crate::xpath::{CompileOptions, Expr};

/// Compile `xpath`, reusing the process-wide cache
pub fn compile(xpath: &str) -> Result<Arc<Expr>> {
    cache::global().get_or_compile(xpath)
}

/// Compile with bindings. Non-empty options bypass the cache, whose key is
/// the bare expression text.
pub fn compile_with_options(xpath: &str, options: &CompileOptions) -> Result<Arc<Expr>> {
    if options.is_empty() {
        return compile(xpath);
    }
    debug!(xpath, "compiling with options, bypassing cache");
    Expr::compile_with_options(xpath, options).map(Arc::new)
}

/// Every node `expr` selects from `top`, in document order
pub fn select_all<'a>(top: NodeRef<'a>, expr: &Expr) -> Result<Vec<Node<'a>>> {
    let nodes: Vec<Node<'a>> = expr.select(&top.navigator())?.map(|nav| nav.current()).collect();
    trace!(xpath = expr.as_str(), matches = nodes.len(), "selected nodes");
    Ok(nodes)
}

/// First node `expr` selects from `top`; `Ok(None)` when nothing matches
pub fn select_first<'a>(top: NodeRef<'a>, expr: &Expr) -> Result<Option<Node<'a>>> {
    Ok(expr.select(&top.navigator())?.next().map(|nav| nav.current()))
}

pub fn query_all<'a>(top: NodeRef<'a>, xpath: &str) -> Result<Vec<Node<'a>>> {
    let expr = compile(xpath)?;
    select_all(top, &expr)
}

pub fn query<'a>(top: NodeRef<'a>, xpath: &str) -> Result<Option<Node<'a>>> {
    let expr = compile(xpath)?;
    select_first(top, &expr)
}

pub fn query_all_with_options<'a>(
    top: NodeRef<'a>,
    xpath: &str,
    options: &CompileOptions,
) -> Result<Vec<Node<'a>>> {
    let expr = compile_with_options(xpath, options)?;
    select_all(top, &expr)
}

pub fn query_with_options<'a>(
    top: NodeRef<'a>,
    xpath: &str,
    options: &CompileOptions,
) -> Result<Option<Node<'a>>> {
    let expr = compile_with_options(xpath, options)?;
    select_first(top, &expr)
}

/// Like [`query_all`], but panics when the expression is malformed or
/// fails to evaluate.
pub fn find_all<'a>(top: NodeRef<'a>, xpath: &str) -> Vec<Node<'a>> {
    query_all(top, xpath).unwrap_or_else(|err| panic!("{}", err))
}

/// Like [`query`], but panics when the expression is malformed or fails to
/// evaluate.
pub fn find_one<'a>(top: NodeRef<'a>, xpath: &str) -> Option<Node<'a>> {
    query(top, xpath).unwrap_or_else(|err| panic!("{}", err))
}

/// Calls `f` with each match and its index.
#[deprecated(note = "iterate over `find_all` instead")]
pub fn find_each<'a>(top: NodeRef<'a>, xpath: &str, mut f: impl FnMut(usize, Node<'a>)) {
    for (i, node) in find_all(top, xpath).into_iter().enumerate() {
        f(i, node);
    }
}

/// Like `find_each`, stopping once `f` returns `false`.
#[deprecated(note = "iterate over `find_all` instead")]
pub fn find_each_with_break<'a>(top: NodeRef<'a>, xpath: &str, mut f: impl FnMut(usize, Node<'a>) -> bool) {
    for (i, node) in find_all(top, xpath).into_iter().enumerate() {
        if !f(i, node) {
            break;
        }
    }
}

impl<'a> NodeRef<'a> {
    /// Nodes selected by `name` relative to this node, usually its child
    /// elements with that name.
    ///
    /// # Panics
    ///
    /// When `name` is not a valid expression.
    pub fn select_elements(&self, name: &str) -> Vec<Node<'a>> {
        find_all(*self, name)
    }

    /// First of [`select_elements`](Self::select_elements)
    ///
    /// # Panics
    ///
    /// When `name` is not a valid expression.
    pub fn select_element(&self, name: &str) -> Option<Node<'a>> {
        find_one(*self, name)
    }
}
