//! Parallel XPath Evaluation
//!
//! Uses Rayon to run several queries against one tree at once. Each query
//! gets its own cursor; the tree is only read.

use rayon::prelude::*;

use crate::dom::{Node, NodeRef};
use crate::error::Result;

/// Evaluate multiple XPath expressions in parallel, results in input order
pub fn query_all_many<'a>(top: NodeRef<'a>, xpaths: &[&str]) -> Vec<Result<Vec<Node<'a>>>> {
    xpaths.par_iter().map(|xpath| super::query_all(top, xpath)).collect()
}

/// Keyed variant of [`query_all_many`]; the first failure aborts the batch
pub fn query_map<'a>(top: NodeRef<'a>, queries: &[(&str, &str)]) -> Result<Vec<(String, Vec<Node<'a>>)>> {
    queries
        .par_iter()
        .map(|(key, xpath)| super::query_all(top, xpath).map(|nodes| (key.to_string(), nodes)))
        .collect()
}
