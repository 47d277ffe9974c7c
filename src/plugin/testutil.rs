/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Canned plugins for exercising the sequence engine in tests.

use crate::core::context::QueryContext;
use crate::core::error::{Error, Result};
use crate::plugin::registry::Registry;
use crate::plugin::{ExecStep, Executor, Matcher, Plugin, PluginEntry};
use async_trait::async_trait;
use hickory_proto::op::Message;

#[derive(Debug)]
pub(crate) struct DummyMatcher {
    tag: String,
    matched: bool,
    err: Option<String>,
}

impl DummyMatcher {
    pub(crate) fn new(tag: &str, matched: bool) -> Self {
        Self {
            tag: tag.to_string(),
            matched,
            err: None,
        }
    }

    pub(crate) fn failing(tag: &str, err: &str) -> Self {
        Self {
            tag: tag.to_string(),
            matched: false,
            err: Some(err.to_string()),
        }
    }
}

impl Plugin for DummyMatcher {
    fn tag(&self) -> &str {
        &self.tag
    }
}

#[async_trait]
impl Matcher for DummyMatcher {
    async fn is_match(&self, _context: &mut QueryContext) -> Result<bool> {
        match &self.err {
            Some(msg) => Err(Error::plugin(msg.clone())),
            None => Ok(self.matched),
        }
    }
}

#[derive(Debug)]
pub(crate) struct DummyExecutor {
    tag: String,
    response: Option<Message>,
    skip: bool,
    err: Option<String>,
}

impl DummyExecutor {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            response: None,
            skip: false,
            err: None,
        }
    }

    pub(crate) fn with_response(tag: &str, response: Message) -> Self {
        Self {
            response: Some(response),
            ..Self::new(tag)
        }
    }

    pub(crate) fn skipping(tag: &str) -> Self {
        Self {
            skip: true,
            ..Self::new(tag)
        }
    }

    pub(crate) fn failing(tag: &str, err: &str) -> Self {
        Self {
            err: Some(err.to_string()),
            ..Self::new(tag)
        }
    }
}

impl Plugin for DummyExecutor {
    fn tag(&self) -> &str {
        &self.tag
    }
}

#[async_trait]
impl Executor for DummyExecutor {
    async fn execute(&self, context: &mut QueryContext) -> Result<ExecStep> {
        if let Some(msg) = &self.err {
            return Err(Error::plugin(msg.clone()));
        }
        if let Some(response) = &self.response {
            context.set_response(response.clone());
        }
        Ok(if self.skip {
            ExecStep::Skip
        } else {
            ExecStep::Next
        })
    }
}

/// Plugin carrying both capabilities: matches when a response is present,
/// clears the response slot when executed.
#[derive(Debug)]
pub(crate) struct DummyHybrid {
    tag: String,
}

impl DummyHybrid {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
        }
    }
}

impl Plugin for DummyHybrid {
    fn tag(&self) -> &str {
        &self.tag
    }
}

#[async_trait]
impl Executor for DummyHybrid {
    async fn execute(&self, context: &mut QueryContext) -> Result<ExecStep> {
        context.take_response();
        Ok(ExecStep::Next)
    }
}

#[async_trait]
impl Matcher for DummyHybrid {
    async fn is_match(&self, context: &mut QueryContext) -> Result<bool> {
        Ok(context.response().is_some())
    }
}

/// Registry preloaded with the canned plugins the sequence tests reference:
/// `matched`/`not_matched`/`match_err` matchers and `exec`/`exec_target`/
/// `exec_skip`/`exec_err` executors. `exec_target` answers with `target`.
pub(crate) fn test_registry(target: &Message) -> Registry {
    let registry = Registry::new();
    registry
        .register(PluginEntry::from_matcher(DummyMatcher::new("matched", true)), false)
        .unwrap();
    registry
        .register(
            PluginEntry::from_matcher(DummyMatcher::new("not_matched", false)),
            false,
        )
        .unwrap();
    registry
        .register(
            PluginEntry::from_matcher(DummyMatcher::failing("match_err", "mErr")),
            false,
        )
        .unwrap();
    registry
        .register(PluginEntry::from_executor(DummyExecutor::new("exec")), false)
        .unwrap();
    registry
        .register(
            PluginEntry::from_executor(DummyExecutor::with_response("exec_target", target.clone())),
            false,
        )
        .unwrap();
    registry
        .register(
            PluginEntry::from_executor(DummyExecutor::skipping("exec_skip")),
            false,
        )
        .unwrap();
    registry
        .register(
            PluginEntry::from_executor(DummyExecutor::failing("exec_err", "eErr")),
            false,
        )
        .unwrap();
    registry
}
