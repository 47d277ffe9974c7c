/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Plugin model.
//!
//! A plugin is registered under a unique tag and exposes one or both
//! capabilities: [`Matcher`] classifies a query context, [`Executor`] acts
//! on it and may write the response slot. Executors additionally steer the
//! pipeline through [`ExecStep`].

pub mod registry;
pub mod sequence;

#[cfg(test)]
pub(crate) mod testutil;

use crate::core::context::QueryContext;
use crate::core::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Base trait every plugin capability builds on.
pub trait Plugin: Debug + Send + Sync + 'static {
    fn tag(&self) -> &str;
}

/// Control signal returned by a successful executor invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecStep {
    /// Continue with the next sibling node.
    Next,
    /// The enclosing branch is done; remaining siblings are not run. Not a
    /// failure: the pipeline result stays successful.
    Skip,
}

/// A plugin that acts on a query context, possibly mutating the response
/// slot. Implementations must observe the context's deadline and cancel
/// signal when they block on I/O.
#[async_trait]
pub trait Executor: Plugin {
    async fn execute(&self, context: &mut QueryContext) -> Result<ExecStep>;
}

/// A plugin that reports a boolean classification of a query context.
#[async_trait]
pub trait Matcher: Plugin {
    async fn is_match(&self, context: &mut QueryContext) -> Result<bool>;
}

/// A registered plugin: one tag, up to two capability vtables.
#[derive(Clone, Debug)]
pub struct PluginEntry {
    tag: String,
    executor: Option<Arc<dyn Executor>>,
    matcher: Option<Arc<dyn Matcher>>,
}

impl PluginEntry {
    pub fn from_executor<E: Executor>(executor: E) -> Self {
        let executor: Arc<dyn Executor> = Arc::new(executor);
        Self {
            tag: executor.tag().to_string(),
            executor: Some(executor),
            matcher: None,
        }
    }

    pub fn from_matcher<M: Matcher>(matcher: M) -> Self {
        let matcher: Arc<dyn Matcher> = Arc::new(matcher);
        Self {
            tag: matcher.tag().to_string(),
            executor: None,
            matcher: Some(matcher),
        }
    }

    /// One object registered under both capabilities.
    pub fn from_hybrid<P: Executor + Matcher>(plugin: P) -> Self {
        let plugin = Arc::new(plugin);
        Self {
            tag: plugin.tag().to_string(),
            executor: Some(plugin.clone()),
            matcher: Some(plugin),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn executor(&self) -> Option<Arc<dyn Executor>> {
        self.executor.clone()
    }

    pub fn matcher(&self) -> Option<Arc<dyn Matcher>> {
        self.matcher.clone()
    }
}
