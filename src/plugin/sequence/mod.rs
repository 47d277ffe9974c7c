/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Executable command sequences.
//!
//! [`compile`] turns a decoded YAML/JSON tree into a graph of chain nodes;
//! [`run`] interprets a compiled graph against a query context. The tree
//! grammar:
//!
//! ```yaml
//! exec:
//!   - upstream_a                 # bare string: executor tag
//!   - if: [qtype_a, "!private"]  # or-mode condition, '!' negates
//!     exec: forward
//!     else_exec: reject
//!   - if_and: [has_resp, cn_ip]  # and-mode condition
//!     exec: accept
//! ```
//!
//! Plugin tags resolve against the registry while compiling, so unknown
//! tags and capability mismatches surface at load time, not per query.

pub mod chain;

use crate::core::error::{Error, Result};
use crate::plugin::registry::Registry;
use chain::{CmdNode, CondMode, CondNode, ExecNode, MatcherRef, SeqNode};
use serde_yml::Value;

pub use chain::run;

const KEY_IF: &str = "if";
const KEY_IF_AND: &str = "if_and";
const KEY_EXEC: &str = "exec";
const KEY_ELSE_EXEC: &str = "else_exec";

/// Compiles a configuration tree into an executable node graph.
pub fn compile(tree: &Value, registry: &Registry) -> Result<Box<dyn CmdNode>> {
    parse_node(tree, registry)
}

fn parse_node(value: &Value, registry: &Registry) -> Result<Box<dyn CmdNode>> {
    match value {
        Value::String(tag) => parse_exec_ref(tag, registry),
        Value::Sequence(items) => {
            if items.is_empty() {
                return Err(Error::syntax("empty command sequence"));
            }
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                children.push(parse_node(item, registry)?);
            }
            Ok(Box::new(SeqNode { children }))
        }
        Value::Mapping(map) => parse_mapping(map, registry),
        other => Err(Error::syntax(format!(
            "expected string, list or mapping, got {}",
            value_kind(other)
        ))),
    }
}

fn parse_exec_ref(tag: &str, registry: &Registry) -> Result<Box<dyn CmdNode>> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(Error::syntax("empty executor tag"));
    }
    let executor = registry.executor(tag)?;
    Ok(Box::new(ExecNode {
        tag: tag.to_string(),
        executor,
    }))
}

fn parse_mapping(map: &serde_yml::Mapping, registry: &Registry) -> Result<Box<dyn CmdNode>> {
    let mut if_tests = None;
    let mut if_and_tests = None;
    let mut exec = None;
    let mut else_exec = None;

    for (key, value) in map {
        let Some(key) = key.as_str() else {
            return Err(Error::syntax("command mapping keys must be strings"));
        };
        match key {
            KEY_IF => if_tests = Some(value),
            KEY_IF_AND => if_and_tests = Some(value),
            KEY_EXEC => exec = Some(value),
            KEY_ELSE_EXEC => else_exec = Some(value),
            other => {
                return Err(Error::syntax(format!(
                    "unknown key '{other}' in command mapping"
                )))
            }
        }
    }

    let exec = exec.ok_or_else(|| Error::syntax("command mapping requires 'exec'"))?;

    let (mode, tests) = match (if_tests, if_and_tests) {
        (Some(_), Some(_)) => {
            return Err(Error::syntax("'if' and 'if_and' cannot both be present"))
        }
        (Some(tests), None) => (CondMode::Or, tests),
        (None, Some(tests)) => (CondMode::And, tests),
        (None, None) => {
            if else_exec.is_some() {
                return Err(Error::syntax("'else_exec' requires 'if' or 'if_and'"));
            }
            return Ok(Box::new(SeqNode {
                children: vec![parse_node(exec, registry)?],
            }));
        }
    };

    let tests = parse_tests(tests, registry)?;
    let then_node = parse_node(exec, registry)?;
    let else_node = match else_exec {
        Some(value) => Some(parse_node(value, registry)?),
        None => None,
    };

    Ok(Box::new(CondNode {
        mode,
        tests,
        then_node,
        else_node,
    }))
}

fn parse_tests(value: &Value, registry: &Registry) -> Result<Vec<MatcherRef>> {
    let Value::Sequence(items) = value else {
        return Err(Error::syntax("'if'/'if_and' must be a list of matcher tags"));
    };
    if items.is_empty() {
        return Err(Error::syntax("empty matcher list"));
    }
    items
        .iter()
        .map(|item| match item.as_str() {
            Some(raw) => parse_matcher_ref(raw, registry),
            None => Err(Error::syntax("matcher entries must be strings")),
        })
        .collect()
}

/// `"!foo"` negates the result of matcher `foo`.
fn parse_matcher_ref(raw: &str, registry: &Registry) -> Result<MatcherRef> {
    let raw = raw.trim();
    let (tag, negated) = match raw.strip_prefix('!') {
        Some(rest) => (rest.trim(), true),
        None => (raw, false),
    };
    if tag.is_empty() {
        return Err(Error::syntax(format!("invalid matcher reference '{raw}'")));
    }
    let matcher = registry.matcher(tag)?;
    Ok(MatcherRef {
        tag: tag.to_string(),
        negated,
        matcher,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
