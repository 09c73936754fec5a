//! XPath 1.0 Engine
//!
//! XPath 1.0 over any tree that implements [`NodeNavigator`]:
//! - All 13 axes, driven by cursor moves only
//! - The core function library
//! - Namespace and variable bindings at compile time

pub mod axes;
pub mod compiler;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod navigator;
pub mod order;
pub mod parser;
pub mod value;

pub use compiler::{CompileOptions, Literal};
pub use navigator::{NodeNavigator, NodeType};
pub use value::Value;

use crate::error::{Result, XPathError};
use compiler::CompiledExpr;
use eval::{evaluate_compiled, EvalContext};

/// A compiled, reusable XPath expression
#[derive(Debug, Clone)]
pub struct Expr {
    source: String,
    program: CompiledExpr,
}

impl Expr {
    /// Compile with no namespace or variable bindings
    pub fn compile(xpath: &str) -> Result<Self> {
        Self::compile_with_options(xpath, &CompileOptions::default())
    }

    pub fn compile_with_options(xpath: &str, options: &CompileOptions) -> Result<Self> {
        let program = compiler::compile(xpath, options)?;
        Ok(Expr {
            source: xpath.to_string(),
            program,
        })
    }

    /// The expression text this was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate with `nav` as the context node
    pub fn evaluate<N: NodeNavigator>(&self, nav: &N) -> Result<Value<N>> {
        evaluate_compiled(&self.program, &EvalContext::new(nav))
    }

    /// Evaluate and iterate the selected positions in document order.
    ///
    /// Fails with [`XPathError::NotANodeSet`] when the expression yields a
    /// string, number or boolean.
    pub fn select<N: NodeNavigator>(&self, nav: &N) -> Result<NodeIter<N>> {
        match self.evaluate(nav)? {
            Value::NodeSet(nodes) => Ok(NodeIter {
                inner: nodes.into_iter(),
            }),
            _ => Err(XPathError::NotANodeSet {
                expr: self.source.clone(),
            }),
        }
    }
}

/// Forward-only iterator over selected cursor positions
#[derive(Debug)]
pub struct NodeIter<N> {
    inner: std::vec::IntoIter<N>,
}

impl<N> Iterator for NodeIter<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<N> ExactSizeIterator for NodeIter<N> {}
