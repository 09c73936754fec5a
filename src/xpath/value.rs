//! XPath Value Types
//!
//! XPath 1.0 has four data types: node-set, boolean, number, and string.
//! Node-sets hold cursors positioned on the selected nodes.

use super::navigator::NodeNavigator;

/// XPath value types
#[derive(Debug, Clone)]
#[must_use]
pub enum Value<N> {
    /// A set of nodes (document order, no duplicates)
    NodeSet(Vec<N>),
    /// Boolean value
    Boolean(bool),
    /// Floating-point number
    Number(f64),
    /// String value
    String(String),
}

impl<N: NodeNavigator> Value<N> {
    /// Create an empty node set
    pub fn empty_nodeset() -> Self {
        Value::NodeSet(Vec::new())
    }

    /// Create a node set with a single node
    pub fn single_node(nav: N) -> Self {
        Value::NodeSet(vec![nav])
    }

    /// Convert to boolean (XPath boolean() function semantics)
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::NodeSet(nodes) => !nodes.is_empty(),
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Convert to number (XPath number() function semantics)
    pub fn to_number(&self) -> f64 {
        match self {
            Value::NodeSet(_) => parse_number(&self.to_string_value()),
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => parse_number(s),
        }
    }

    /// Convert to string (XPath string() function semantics).
    ///
    /// A node-set converts to the string-value of its first node.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::NodeSet(nodes) => nodes
                .first()
                .map(|nav| nav.value().into_owned())
                .unwrap_or_default(),
            Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
        }
    }

    /// Check if this is a node set
    pub fn is_nodeset(&self) -> bool {
        matches!(self, Value::NodeSet(_))
    }

    /// Get as node set, or None
    pub fn as_nodeset(&self) -> Option<&[N]> {
        match self {
            Value::NodeSet(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Take the node set, or None
    pub fn into_nodeset(self) -> Option<Vec<N>> {
        match self {
            Value::NodeSet(nodes) => Some(nodes),
            _ => None,
        }
    }
}

impl<N> From<bool> for Value<N> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<N> From<f64> for Value<N> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<N> From<String> for Value<N> {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<N> From<&str> for Value<N> {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// XPath number literal grammar: optional sign, digits, optional fraction.
/// Anything else (exponents, "inf", empty) is NaN.
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let well_formed = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if well_formed {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Number to string per XPath: integers without a fraction, NaN/Infinity spelled out
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
