//! XPath Expression Compiler
//!
//! Compiles parsed XPath expressions into a flat stack program.
//! Namespace prefixes and variables are resolved here, against the
//! caller's `CompileOptions`.

use std::collections::HashMap;

use super::parser::{Axis, BinaryOp, Expr, NodeTest, Step};
use crate::error::{Result, XPathError};

/// Constant bound to an XPath variable
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

/// Caller-supplied compilation settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions {
    /// Prefix -> namespace URI bindings for prefixed name tests
    pub namespaces: HashMap<String, String>,
    /// Values for `$name` references
    pub variables: HashMap<String, Literal>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.variables.is_empty()
    }
}

/// Compiled XPath expression
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    pub ops: Vec<Op>,
}

/// Compiled operation
#[derive(Debug, Clone)]
pub enum Op {
    /// Push root node onto stack
    Root,
    /// Push context node onto stack
    Context,
    /// Navigate along axis with node test; predicates apply per context node
    Step(Axis, CompiledNodeTest, Vec<CompiledExpr>),
    /// Apply predicate filter to a whole node-set
    Predicate(Box<CompiledExpr>),
    /// Union two node sets
    Union,
    /// Push literal number
    Number(f64),
    /// Push literal string
    String(String),
    /// Push literal boolean
    Boolean(bool),
    /// Call function
    Call(String, usize), // name, arg count
    /// Binary operation
    Binary(BinaryOp),
    /// Negate
    Negate,
    /// Variable with no binding; fails when evaluated
    Variable(String),
}

/// Compiled node test
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledNodeTest {
    Any,
    Name(String),
    /// `prefix:local`; `uri` is set when the prefix was bound at compile time
    QName {
        prefix: String,
        uri: Option<String>,
        local: String,
    },
    /// `prefix:*`
    NamespaceWildcard { prefix: String, uri: Option<String> },
    Node,
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
}

struct Compiler<'o> {
    options: &'o CompileOptions,
}

impl Compiler<'_> {
    fn compile(&self, expr: &Expr) -> CompiledExpr {
        let mut ops = Vec::new();
        self.compile_expr(expr, &mut ops);
        CompiledExpr { ops }
    }

    fn compile_expr(&self, expr: &Expr, ops: &mut Vec<Op>) {
        match expr {
            Expr::Root => {
                ops.push(Op::Root);
            }
            Expr::Number(n) => {
                ops.push(Op::Number(*n));
            }
            Expr::String(s) => {
                ops.push(Op::String(s.clone()));
            }
            Expr::Variable(name) => match self.options.variables.get(name) {
                Some(Literal::String(s)) => ops.push(Op::String(s.clone())),
                Some(Literal::Number(n)) => ops.push(Op::Number(*n)),
                Some(Literal::Boolean(b)) => ops.push(Op::Boolean(*b)),
                None => ops.push(Op::Variable(name.clone())),
            },
            Expr::Negate(inner) => {
                self.compile_expr(inner, ops);
                ops.push(Op::Negate);
            }
            Expr::Binary(left, op, right) => {
                self.compile_expr(left, ops);
                self.compile_expr(right, ops);
                ops.push(Op::Binary(*op));
            }
            Expr::Union(left, right) => {
                self.compile_expr(left, ops);
                self.compile_expr(right, ops);
                ops.push(Op::Union);
            }
            Expr::Path(base, step) => {
                self.compile_expr(base, ops);
                self.compile_step(step, ops);
            }
            Expr::Filter(base, pred) => {
                self.compile_expr(base, ops);
                ops.push(Op::Predicate(Box::new(self.compile(pred))));
            }
            Expr::Step(step) => {
                ops.push(Op::Context);
                self.compile_step(step, ops);
            }
            Expr::Function(name, args) => {
                for arg in args {
                    self.compile_expr(arg, ops);
                }
                ops.push(Op::Call(name.clone(), args.len()));
            }
        }
    }

    fn compile_step(&self, step: &Step, ops: &mut Vec<Op>) {
        let node_test = match &step.node_test {
            NodeTest::Any => CompiledNodeTest::Any,
            NodeTest::Name(n) => CompiledNodeTest::Name(n.clone()),
            NodeTest::QName(prefix, local) => CompiledNodeTest::QName {
                prefix: prefix.clone(),
                uri: self.options.namespaces.get(prefix).cloned(),
                local: local.clone(),
            },
            NodeTest::NamespaceWildcard(prefix) => CompiledNodeTest::NamespaceWildcard {
                prefix: prefix.clone(),
                uri: self.options.namespaces.get(prefix).cloned(),
            },
            NodeTest::Node => CompiledNodeTest::Node,
            NodeTest::Text => CompiledNodeTest::Text,
            NodeTest::Comment => CompiledNodeTest::Comment,
            NodeTest::ProcessingInstruction(arg) => {
                CompiledNodeTest::ProcessingInstruction(arg.clone())
            }
        };

        let predicates = step.predicates.iter().map(|p| self.compile(p)).collect();
        ops.push(Op::Step(step.axis, node_test, predicates));
    }
}

/// Compile an XPath expression string
pub fn compile(xpath: &str, options: &CompileOptions) -> Result<CompiledExpr> {
    let expr = super::parser::parse(xpath).map_err(|message| XPathError::syntax(xpath, message))?;
    Ok(Compiler { options }.compile(&expr))
}
