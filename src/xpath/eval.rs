//! XPath Evaluation Engine
//!
//! Runs a compiled stack program against a cursor. Node-sets are vectors of
//! cursors kept in document order without duplicates.

use super::axes::{matches_node_test, navigate};
use super::compiler::{CompiledExpr, CompiledNodeTest, Op};
use super::functions;
use super::navigator::NodeNavigator;
use super::order::sort_document_order;
use super::parser::{Axis, BinaryOp};
use super::value::{parse_number, Value};
use crate::error::{Result, XPathError};

/// Evaluation context
pub struct EvalContext<'c, N> {
    pub node: &'c N,
    pub position: usize,
    pub size: usize,
}

impl<'c, N: NodeNavigator> EvalContext<'c, N> {
    /// Context for a top-level evaluation
    pub fn new(node: &'c N) -> Self {
        EvalContext {
            node,
            position: 1,
            size: 1,
        }
    }
}

fn pop_nodeset<N: NodeNavigator>(stack: &mut Vec<Value<N>>, what: &str) -> Result<Vec<N>> {
    match stack.pop() {
        Some(Value::NodeSet(nodes)) => Ok(nodes),
        Some(_) => Err(XPathError::Eval(format!("{} requires a node-set", what))),
        None => Ok(Vec::new()),
    }
}

/// Evaluate a compiled expression
pub fn evaluate_compiled<N: NodeNavigator>(expr: &CompiledExpr, ctx: &EvalContext<'_, N>) -> Result<Value<N>> {
    let mut stack: Vec<Value<N>> = Vec::new();

    for op in &expr.ops {
        match op {
            Op::Root => {
                let mut root = ctx.node.copy();
                root.move_to_root();
                stack.push(Value::single_node(root));
            }

            Op::Context => {
                stack.push(Value::single_node(ctx.node.copy()));
            }

            Op::Step(axis, node_test, predicates) => {
                let nodes = pop_nodeset(&mut stack, "a location step")?;
                let mut result = Vec::with_capacity(nodes.len());
                for node in &nodes {
                    result.extend(step(node, *axis, node_test, predicates)?);
                }
                if nodes.len() > 1 || axis_is_reverse(*axis) {
                    sort_document_order(&mut result);
                }
                stack.push(Value::NodeSet(result));
            }

            Op::Predicate(pred_expr) => {
                let nodes = pop_nodeset(&mut stack, "a predicate")?;
                stack.push(Value::NodeSet(filter(nodes, pred_expr)?));
            }

            Op::Union => {
                let right = pop_nodeset(&mut stack, "union")?;
                let mut result = pop_nodeset(&mut stack, "union")?;
                result.extend(right);
                sort_document_order(&mut result);
                stack.push(Value::NodeSet(result));
            }

            Op::Number(n) => {
                stack.push(Value::Number(*n));
            }

            Op::String(s) => {
                stack.push(Value::String(s.clone()));
            }

            Op::Boolean(b) => {
                stack.push(Value::Boolean(*b));
            }

            Op::Variable(name) => {
                return Err(XPathError::Eval(format!("unbound variable ${}", name)));
            }

            Op::Negate => {
                let val = stack.pop().unwrap_or(Value::Number(0.0));
                stack.push(Value::Number(-val.to_number()));
            }

            Op::Binary(op) => {
                let right = stack.pop().unwrap_or(Value::Number(0.0));
                let left = stack.pop().unwrap_or(Value::Number(0.0));

                let result = match op {
                    BinaryOp::Or => Value::Boolean(left.to_boolean() || right.to_boolean()),
                    BinaryOp::And => Value::Boolean(left.to_boolean() && right.to_boolean()),
                    BinaryOp::Eq
                    | BinaryOp::NotEq
                    | BinaryOp::Lt
                    | BinaryOp::LtEq
                    | BinaryOp::Gt
                    | BinaryOp::GtEq => Value::Boolean(compare(*op, &left, &right)),
                    BinaryOp::Add => Value::Number(left.to_number() + right.to_number()),
                    BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
                    BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
                    BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
                    BinaryOp::Mod => Value::Number(left.to_number() % right.to_number()),
                };

                stack.push(result);
            }

            Op::Call(name, arg_count) => {
                if stack.len() < *arg_count {
                    return Err(XPathError::Eval(format!("{}() is missing arguments", name)));
                }
                let args = stack.split_off(stack.len() - arg_count);
                stack.push(functions::call(name, args, ctx)?);
            }
        }
    }

    Ok(stack.pop().unwrap_or_else(Value::empty_nodeset))
}

fn axis_is_reverse(axis: Axis) -> bool {
    matches!(
        axis,
        Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling
    )
}

/// One location step from one context node. Predicate positions count in
/// axis order, so `preceding-sibling::*[1]` is the nearest sibling.
fn step<N: NodeNavigator>(
    context: &N,
    axis: Axis,
    node_test: &CompiledNodeTest,
    predicates: &[CompiledExpr],
) -> Result<Vec<N>> {
    let mut nodes: Vec<N> = navigate(context, axis)
        .into_iter()
        .filter(|candidate| matches_node_test(candidate, node_test, axis))
        .collect();
    for pred in predicates {
        nodes = filter(nodes, pred)?;
    }
    Ok(nodes)
}

/// Keep the nodes for which `pred` holds; a numeric result selects by position
fn filter<N: NodeNavigator>(nodes: Vec<N>, pred: &CompiledExpr) -> Result<Vec<N>> {
    let size = nodes.len();
    let mut filtered = Vec::new();

    for (i, node) in nodes.into_iter().enumerate() {
        let pred_ctx = EvalContext {
            node: &node,
            position: i + 1,
            size,
        };

        let include = match evaluate_compiled(pred, &pred_ctx)? {
            Value::Number(n) => (i + 1) as f64 == n,
            other => other.to_boolean(),
        };

        if include {
            filtered.push(node);
        }
    }

    Ok(filtered)
}

/// Comparison per XPath 1.0 §3.4: node-sets compare existentially through
/// their members' string-values, except against a boolean, where the whole
/// set converts first.
fn compare<N: NodeNavigator>(op: BinaryOp, left: &Value<N>, right: &Value<N>) -> bool {
    match (left, right) {
        (Value::NodeSet(ln), Value::NodeSet(rn)) => {
            let right_values: Vec<Value<N>> = rn.iter().map(|r| Value::String(r.value().into_owned())).collect();
            ln.iter().any(|l| {
                let ls = Value::String(l.value().into_owned());
                right_values.iter().any(|rs| compare_atoms(op, &ls, rs))
            })
        }
        (Value::NodeSet(nodes), other @ Value::Boolean(_)) => {
            compare_atoms(op, &Value::Boolean(!nodes.is_empty()), other)
        }
        (other @ Value::Boolean(_), Value::NodeSet(nodes)) => {
            compare_atoms(op, other, &Value::Boolean(!nodes.is_empty()))
        }
        (Value::NodeSet(nodes), other) => nodes
            .iter()
            .any(|n| compare_atoms(op, &node_atom(n, other), other)),
        (other, Value::NodeSet(nodes)) => nodes
            .iter()
            .any(|n| compare_atoms(op, other, &node_atom(n, other))),
        _ => compare_atoms(op, left, right),
    }
}

/// A node's string-value, converted to the type of the value it is compared with
fn node_atom<N: NodeNavigator>(node: &N, other: &Value<N>) -> Value<N> {
    let s = node.value();
    match other {
        Value::Number(_) => Value::Number(parse_number(&s)),
        _ => Value::String(s.into_owned()),
    }
}

fn compare_atoms<N: NodeNavigator>(op: BinaryOp, left: &Value<N>, right: &Value<N>) -> bool {
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => {
            let equal = match (left, right) {
                (Value::Boolean(_), _) | (_, Value::Boolean(_)) => left.to_boolean() == right.to_boolean(),
                (Value::Number(_), _) | (_, Value::Number(_)) => left.to_number() == right.to_number(),
                _ => left.to_string_value() == right.to_string_value(),
            };
            if op == BinaryOp::Eq {
                equal
            } else {
                !equal
            }
        }
        _ => {
            let (l, r) = (left.to_number(), right.to_number());
            match op {
                BinaryOp::Lt => l < r,
                BinaryOp::LtEq => l <= r,
                BinaryOp::Gt => l > r,
                _ => l >= r,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{XmlAttribute, XmlDocument, DOCUMENT_NODE};
    use crate::navigator::XmlNavigator;
    use crate::xpath::compiler::{compile, CompileOptions};

    /// <root><a/><b n="5">text</b><c/><b n="10"/></root>
    fn sample() -> XmlDocument {
        let mut doc = XmlDocument::new();
        let root = doc.append_element(DOCUMENT_NODE, "root").unwrap();
        doc.append_element(root, "a").unwrap();
        let b = doc.append_element(root, "b").unwrap();
        doc.set_attribute(b, XmlAttribute::new("n", "5")).unwrap();
        doc.append_text(b, "text").unwrap();
        doc.append_element(root, "c").unwrap();
        let b2 = doc.append_element(root, "b").unwrap();
        doc.set_attribute(b2, XmlAttribute::new("n", "10")).unwrap();
        doc
    }

    fn eval<'a>(doc: &'a XmlDocument, xpath: &str) -> Value<XmlNavigator<'a>> {
        let compiled = compile(xpath, &CompileOptions::default()).unwrap();
        let nav = XmlNavigator::new(doc.root());
        evaluate_compiled(&compiled, &EvalContext::new(&nav)).unwrap()
    }

    fn count(doc: &XmlDocument, xpath: &str) -> usize {
        eval(doc, xpath).as_nodeset().map(|n| n.len()).unwrap_or(0)
    }

    #[test]
    fn test_simple_path() {
        let doc = sample();
        assert_eq!(count(&doc, "/root/b"), 2);
        assert_eq!(count(&doc, "/root/missing"), 0);
    }

    #[test]
    fn test_predicate() {
        let doc = sample();
        let result = eval(&doc, "/root/*[2]");
        let nodes = result.as_nodeset().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].local_name(), "b");
        assert_eq!(count(&doc, "//b[last()]"), 1);
    }

    #[test]
    fn reverse_axis_positions() {
        let doc = sample();
        let result = eval(&doc, "/root/c/preceding-sibling::*[1]");
        assert_eq!(result.as_nodeset().unwrap()[0].local_name(), "b");
    }

    #[test]
    fn union_is_document_ordered() {
        let doc = sample();
        let result = eval(&doc, "//c | //a");
        let names: Vec<_> = result.as_nodeset().unwrap().iter().map(|n| n.local_name().to_string()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn comparisons_with_node_sets() {
        let doc = sample();
        assert_eq!(count(&doc, "//b[@n > 6]"), 1);
        assert_eq!(count(&doc, "//b[@n = 5]"), 1);
        assert_eq!(count(&doc, "//b[@n != '5']"), 1);
        assert!(eval(&doc, "//b/@n = 10").to_boolean());
        assert!(!eval(&doc, "//b/@n = //a").to_boolean());
    }

    #[test]
    fn node_set_against_boolean_converts_whole_set() {
        let doc = sample();
        for (xpath, expected) in [
            ("//missing = false()", true),
            ("false() = //missing", true),
            ("//missing != true()", true),
            ("//missing = true()", false),
            ("//b = true()", true),
            ("true() != //b", false),
            ("//b = false()", false),
            ("boolean(//missing) = false()", true),
        ] {
            assert_eq!(eval(&doc, xpath).to_boolean(), expected, "{}", xpath);
        }
    }

    #[test]
    fn test_count_and_arithmetic() {
        let doc = sample();
        assert_eq!(eval(&doc, "count(/root/*)").to_number(), 4.0);
        assert_eq!(eval(&doc, "1 + 2 * 3").to_number(), 7.0);
        assert_eq!(eval(&doc, "7 mod 3").to_number(), 1.0);
        assert_eq!(eval(&doc, "-(4 div 2)").to_number(), -2.0);
    }

    #[test]
    fn unbound_variable_is_an_error() {
        let doc = sample();
        let compiled = compile("$nope", &CompileOptions::default()).unwrap();
        let nav = XmlNavigator::new(doc.root());
        assert!(matches!(
            evaluate_compiled(&compiled, &EvalContext::new(&nav)),
            Err(XPathError::Eval(_))
        ));
    }

    #[test]
    fn parent_abbreviation() {
        let doc = sample();
        let result = eval(&doc, "//b/..");
        let nodes = result.as_nodeset().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].local_name(), "root");
    }
}
