/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Compiled chain nodes and their interpreter.
//!
//! Three node shapes cover the whole grammar: an executor reference, an
//! ordered sequence, and a conditional with or/and matcher tests. Skip is
//! carried out-of-band in [`ExecStep`] so early termination never rides the
//! error channel.

use crate::core::context::QueryContext;
use crate::core::error::Result;
use crate::plugin::{ExecStep, Executor, Matcher};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait CmdNode: Debug + Send + Sync + 'static {
    async fn exec(&self, context: &mut QueryContext) -> Result<ExecStep>;
}

/// Runs a compiled pipeline to completion.
///
/// A skip that reaches the root terminated the top-level sequence early;
/// the pipeline still counts as successful.
pub async fn run(context: &mut QueryContext, root: &dyn CmdNode) -> Result<()> {
    if root.exec(context).await? == ExecStep::Skip {
        debug!("pipeline ended early by skip");
    }
    Ok(())
}

/// Resolved reference to a registered executor plugin.
#[derive(Debug)]
pub struct ExecNode {
    pub(super) tag: String,
    pub(super) executor: Arc<dyn Executor>,
}

#[async_trait]
impl CmdNode for ExecNode {
    async fn exec(&self, context: &mut QueryContext) -> Result<ExecStep> {
        context.check_abort()?;
        debug!("executing plugin {}", self.tag);
        self.executor.execute(context).await
    }
}

/// Ordered list of children, run left to right.
#[derive(Debug)]
pub struct SeqNode {
    pub(super) children: Vec<Box<dyn CmdNode>>,
}

#[async_trait]
impl CmdNode for SeqNode {
    async fn exec(&self, context: &mut QueryContext) -> Result<ExecStep> {
        for child in &self.children {
            // Skip stops the remaining siblings and propagates to the
            // parent; the nearest conditional (or the root) absorbs it.
            if child.exec(context).await? == ExecStep::Skip {
                return Ok(ExecStep::Skip);
            }
        }
        Ok(ExecStep::Next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondMode {
    /// First true test decides; `if` in the source form.
    Or,
    /// First false test decides; `if_and` in the source form.
    And,
}

/// Resolved reference to a registered matcher plugin, with optional
/// negation (`"!tag"` in the source form).
#[derive(Debug)]
pub struct MatcherRef {
    pub(super) tag: String,
    pub(super) negated: bool,
    pub(super) matcher: Arc<dyn Matcher>,
}

impl MatcherRef {
    async fn matches(&self, context: &mut QueryContext) -> Result<bool> {
        let matched = self.matcher.is_match(context).await?;
        Ok(matched != self.negated)
    }
}

/// Conditional branch: short-circuit matcher tests, a then branch, an
/// optional else branch.
#[derive(Debug)]
pub struct CondNode {
    pub(super) mode: CondMode,
    pub(super) tests: Vec<MatcherRef>,
    pub(super) then_node: Box<dyn CmdNode>,
    pub(super) else_node: Option<Box<dyn CmdNode>>,
}

#[async_trait]
impl CmdNode for CondNode {
    async fn exec(&self, context: &mut QueryContext) -> Result<ExecStep> {
        context.check_abort()?;

        let hit = self.evaluate(context).await?;
        let branch = if hit {
            Some(&self.then_node)
        } else {
            self.else_node.as_ref()
        };
        let Some(branch) = branch else {
            return Ok(ExecStep::Next);
        };

        // A skip emitted inside the branch ends that branch only; the
        // conditional's siblings still run.
        if branch.exec(context).await? == ExecStep::Skip {
            debug!("skip absorbed at conditional boundary");
        }
        Ok(ExecStep::Next)
    }
}

impl CondNode {
    /// Left-to-right short-circuit evaluation. A matcher error aborts the
    /// whole conditional; tests behind the short-circuit point never run.
    async fn evaluate(&self, context: &mut QueryContext) -> Result<bool> {
        for test in &self.tests {
            let matched = test.matches(context).await?;
            match self.mode {
                CondMode::Or if matched => return Ok(true),
                CondMode::And if !matched => {
                    debug!("matcher {} ended and-chain", test.tag);
                    return Ok(false);
                }
                _ => {}
            }
        }
        Ok(match self.mode {
            CondMode::Or => false,
            CondMode::And => true,
        })
    }
}
