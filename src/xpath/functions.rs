//! XPath 1.0 Functions
//!
//! Implements the XPath 1.0 core function library:
//!
//! Node Set Functions:
//! - position(), last(), count(), local-name(), namespace-uri(), name()
//!
//! String Functions:
//! - string(), concat(), starts-with(), ends-with(), contains(), substring(),
//!   substring-before(), substring-after(), string-length(),
//!   normalize-space(), translate()
//!
//! Boolean Functions:
//! - boolean(), not(), true(), false(), lang()
//!
//! Number Functions:
//! - number(), sum(), floor(), ceiling(), round()

use super::eval::EvalContext;
use super::navigator::NodeNavigator;
use super::value::{parse_number, Value};
use crate::error::{Result, XPathError};

fn arity_error<T>(message: &str) -> Result<T> {
    Err(XPathError::Eval(message.to_string()))
}

/// Evaluate a function call
pub fn call<N: NodeNavigator>(name: &str, args: Vec<Value<N>>, ctx: &EvalContext<'_, N>) -> Result<Value<N>> {
    match name {
        // Node Set Functions
        "position" => Ok(Value::Number(ctx.position as f64)),
        "last" => Ok(Value::Number(ctx.size as f64)),
        "count" => fn_count(args),
        "local-name" => with_node(args, ctx, "local-name", |n| n.local_name().to_string()),
        "namespace-uri" => with_node(args, ctx, "namespace-uri", |n| n.namespace_uri().to_string()),
        "name" => with_node(args, ctx, "name", |n| n.name()),
        "id" => arity_error("id() is not supported: the tree carries no DTD attribute types"),

        // String Functions
        "string" => fn_string(args, ctx),
        "concat" => fn_concat(args),
        "starts-with" => string_pair(args, "starts-with", |s, p| s.starts_with(p)),
        "ends-with" => string_pair(args, "ends-with", |s, p| s.ends_with(p)),
        "contains" => string_pair(args, "contains", |s, p| s.contains(p)),
        "substring" => fn_substring(args),
        "substring-before" => fn_substring_before(args),
        "substring-after" => fn_substring_after(args),
        "string-length" => fn_string_length(args, ctx),
        "normalize-space" => fn_normalize_space(args, ctx),
        "translate" => fn_translate(args),

        // Boolean Functions
        "boolean" => fn_boolean(args),
        "not" => fn_not(args),
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        "lang" => fn_lang(args, ctx),

        // Number Functions
        "number" => fn_number(args, ctx),
        "sum" => fn_sum(args),
        "floor" => unary_number(args, "floor", f64::floor),
        "ceiling" => unary_number(args, "ceiling", f64::ceil),
        "round" => unary_number(args, "round", xpath_round),

        _ => Err(XPathError::Eval(format!("Unknown function: {}", name))),
    }
}

// Node Set Functions

fn fn_count<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() != 1 {
        return arity_error("count() requires exactly 1 argument");
    }
    match &args[0] {
        Value::NodeSet(nodes) => Ok(Value::Number(nodes.len() as f64)),
        _ => arity_error("count() argument must be a node-set"),
    }
}

/// Name accessors: the context node, or the first node of the argument
fn with_node<N: NodeNavigator>(
    args: Vec<Value<N>>,
    ctx: &EvalContext<'_, N>,
    name: &str,
    read: impl Fn(&N) -> String,
) -> Result<Value<N>> {
    match args.as_slice() {
        [] => Ok(Value::String(read(ctx.node))),
        [Value::NodeSet(nodes)] => Ok(Value::String(nodes.first().map(read).unwrap_or_default())),
        [_] => Err(XPathError::Eval(format!("{}() argument must be a node-set", name))),
        _ => Err(XPathError::Eval(format!("{}() requires 0 or 1 arguments", name))),
    }
}

// String Functions

fn fn_string<N: NodeNavigator>(args: Vec<Value<N>>, ctx: &EvalContext<'_, N>) -> Result<Value<N>> {
    let value = match args.as_slice() {
        [] => ctx.node.value().into_owned(),
        [arg] => arg.to_string_value(),
        _ => return arity_error("string() requires 0 or 1 arguments"),
    };
    Ok(Value::String(value))
}

fn fn_concat<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() < 2 {
        return arity_error("concat() requires at least 2 arguments");
    }
    let result: String = args.iter().map(|a| a.to_string_value()).collect();
    Ok(Value::String(result))
}

fn string_pair<N: NodeNavigator>(
    args: Vec<Value<N>>,
    name: &str,
    test: impl Fn(&str, &str) -> bool,
) -> Result<Value<N>> {
    if args.len() != 2 {
        return Err(XPathError::Eval(format!("{}() requires exactly 2 arguments", name)));
    }
    let s = args[0].to_string_value();
    let pattern = args[1].to_string_value();
    Ok(Value::Boolean(test(&s, &pattern)))
}

fn fn_substring<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() < 2 || args.len() > 3 {
        return arity_error("substring() requires 2 or 3 arguments");
    }

    let chars: Vec<char> = args[0].to_string_value().chars().collect();
    // Positions are 1-based and compared after rounding
    let start = xpath_round(args[1].to_number());
    let end = match args.get(2) {
        Some(len) => start + xpath_round(len.to_number()),
        None => f64::INFINITY,
    };

    let result: String = chars
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (*i + 1) as f64;
            pos >= start && pos < end
        })
        .map(|(_, c)| *c)
        .collect();

    Ok(Value::String(result))
}

fn fn_substring_before<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() != 2 {
        return arity_error("substring-before() requires exactly 2 arguments");
    }
    let s = args[0].to_string_value();
    let pattern = args[1].to_string_value();

    let result = match s.find(&pattern) {
        Some(pos) => s[..pos].to_string(),
        None => String::new(),
    };

    Ok(Value::String(result))
}

fn fn_substring_after<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() != 2 {
        return arity_error("substring-after() requires exactly 2 arguments");
    }
    let s = args[0].to_string_value();
    let pattern = args[1].to_string_value();

    let result = match s.find(&pattern) {
        Some(pos) => s[pos + pattern.len()..].to_string(),
        None => String::new(),
    };

    Ok(Value::String(result))
}

fn fn_string_length<N: NodeNavigator>(args: Vec<Value<N>>, ctx: &EvalContext<'_, N>) -> Result<Value<N>> {
    let s = match args.as_slice() {
        [] => ctx.node.value().into_owned(),
        [arg] => arg.to_string_value(),
        _ => return arity_error("string-length() requires 0 or 1 arguments"),
    };
    Ok(Value::Number(s.chars().count() as f64))
}

fn fn_normalize_space<N: NodeNavigator>(args: Vec<Value<N>>, ctx: &EvalContext<'_, N>) -> Result<Value<N>> {
    let s = match args.as_slice() {
        [] => ctx.node.value().into_owned(),
        [arg] => arg.to_string_value(),
        _ => return arity_error("normalize-space() requires 0 or 1 arguments"),
    };

    let normalized: String = s.split_whitespace().collect::<Vec<_>>().join(" ");

    Ok(Value::String(normalized))
}

fn fn_translate<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() != 3 {
        return arity_error("translate() requires exactly 3 arguments");
    }

    let s = args[0].to_string_value();
    let from: Vec<char> = args[1].to_string_value().chars().collect();
    let to: Vec<char> = args[2].to_string_value().chars().collect();

    let result: String = s
        .chars()
        .filter_map(|c| match from.iter().position(|&fc| fc == c) {
            Some(pos) => to.get(pos).copied(),
            None => Some(c),
        })
        .collect();

    Ok(Value::String(result))
}

// Boolean Functions

fn fn_boolean<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() != 1 {
        return arity_error("boolean() requires exactly 1 argument");
    }
    Ok(Value::Boolean(args[0].to_boolean()))
}

fn fn_not<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() != 1 {
        return arity_error("not() requires exactly 1 argument");
    }
    Ok(Value::Boolean(!args[0].to_boolean()))
}

/// Nearest `xml:lang` on the context node or its ancestors
fn xml_lang<N: NodeNavigator>(context: &N) -> Option<String> {
    let mut node = context.copy();
    loop {
        let mut attr = node.copy();
        while attr.move_to_next_attribute() {
            if attr.prefix() == "xml" && attr.local_name() == "lang" {
                return Some(attr.value().into_owned());
            }
        }
        if !node.move_to_parent() {
            return None;
        }
    }
}

fn fn_lang<N: NodeNavigator>(args: Vec<Value<N>>, ctx: &EvalContext<'_, N>) -> Result<Value<N>> {
    if args.len() != 1 {
        return arity_error("lang() requires exactly 1 argument");
    }
    let target = args[0].to_string_value().to_lowercase();

    let matched = xml_lang(ctx.node).is_some_and(|lang| {
        let lang = lang.to_lowercase();
        // Exact match or subtag prefix match ("en" matches "en-US")
        lang == target || (lang.starts_with(&target) && lang.as_bytes().get(target.len()) == Some(&b'-'))
    });
    Ok(Value::Boolean(matched))
}

// Number Functions

fn fn_number<N: NodeNavigator>(args: Vec<Value<N>>, ctx: &EvalContext<'_, N>) -> Result<Value<N>> {
    let value = match args.as_slice() {
        [] => parse_number(&ctx.node.value()),
        [arg] => arg.to_number(),
        _ => return arity_error("number() requires 0 or 1 arguments"),
    };
    Ok(Value::Number(value))
}

fn fn_sum<N: NodeNavigator>(args: Vec<Value<N>>) -> Result<Value<N>> {
    if args.len() != 1 {
        return arity_error("sum() requires exactly 1 argument");
    }

    match &args[0] {
        Value::NodeSet(nodes) => Ok(Value::Number(
            nodes.iter().map(|node| parse_number(&node.value())).sum(),
        )),
        _ => arity_error("sum() argument must be a node-set"),
    }
}

fn unary_number<N: NodeNavigator>(args: Vec<Value<N>>, name: &str, f: fn(f64) -> f64) -> Result<Value<N>> {
    if args.len() != 1 {
        return Err(XPathError::Eval(format!("{}() requires exactly 1 argument", name)));
    }
    Ok(Value::Number(f(args[0].to_number())))
}

/// XPath round: halves go towards positive infinity
fn xpath_round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}
