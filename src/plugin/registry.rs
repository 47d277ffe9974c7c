/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Plugin registry.
//!
//! A tag-indexed catalog of [`PluginEntry`] values. The registry is
//! read-mostly: lookups are concurrent-safe, registration and purge take
//! exclusive shard access through the underlying map. Parsers and
//! interpreters receive a registry as an explicit collaborator; the
//! process-wide [`global`] instance is a thin convenience layer on top.

use crate::core::error::{Error, Result};
use crate::plugin::{Executor, Matcher, PluginEntry};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lazy_static::lazy_static;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Registry {
    plugins: DashMap<String, Arc<PluginEntry>>,
}

lazy_static! {
    static ref GLOBAL: Registry = Registry::new();
}

/// Process-wide registry for callers that do not thread their own through.
pub fn global() -> &'static Registry {
    &GLOBAL
}

impl Registry {
    pub fn new() -> Self {
        Self {
            plugins: DashMap::new(),
        }
    }

    /// Registers `entry` under its tag. Fails with [`Error::DuplicateTag`]
    /// when the tag is taken and `allow_overwrite` is false.
    pub fn register(&self, entry: PluginEntry, allow_overwrite: bool) -> Result<()> {
        match self.plugins.entry(entry.tag().to_string()) {
            Entry::Occupied(mut occupied) => {
                if !allow_overwrite {
                    return Err(Error::DuplicateTag(entry.tag().to_string()));
                }
                debug!("replacing plugin {}", entry.tag());
                occupied.insert(Arc::new(entry));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(entry));
            }
        }
        Ok(())
    }

    pub fn lookup(&self, tag: &str) -> Option<Arc<PluginEntry>> {
        self.plugins.get(tag).map(|entry| entry.clone())
    }

    /// Capability-checked lookup for an executor slot.
    pub fn executor(&self, tag: &str) -> Result<Arc<dyn Executor>> {
        let entry = self
            .lookup(tag)
            .ok_or_else(|| Error::UnknownTag(tag.to_string()))?;
        entry.executor().ok_or_else(|| Error::CapabilityMismatch {
            tag: tag.to_string(),
            expected: "executor",
        })
    }

    /// Capability-checked lookup for a matcher slot.
    pub fn matcher(&self, tag: &str) -> Result<Arc<dyn Matcher>> {
        let entry = self
            .lookup(tag)
            .ok_or_else(|| Error::UnknownTag(tag.to_string()))?;
        entry.matcher().ok_or_else(|| Error::CapabilityMismatch {
            tag: tag.to_string(),
            expected: "matcher",
        })
    }

    /// Drops every registration. Test-isolation hook; callers must ensure
    /// no pipeline is executing.
    pub fn purge(&self) {
        self.plugins.clear();
    }

    /// Get all registered plugin tags
    pub fn tags(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Get the number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
