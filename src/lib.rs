/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Core engine of a pluggable DNS forwarder.
//!
//! The crate provides the pieces a listener threads a query through:
//! - [`QueryContext`]: per-request state (request, response slot, deadline,
//!   cancellation),
//! - [`Registry`]: a tag-indexed catalog of matcher/executor plugins,
//! - [`plugin::sequence`]: the executable command sequence engine, compiling
//!   a decoded YAML tree into a node graph and interpreting it with
//!   short-circuit and skip semantics,
//! - [`ResponseCache`]: persisted DNS responses over a remote key-value
//!   backend with stored/expiration metadata.
//!
//! Listeners, upstream clients and the DNS wire parser live elsewhere; this
//! crate only consumes `hickory_proto` messages and already-decoded
//! `serde_yml` trees.

pub mod cache;
pub mod config;
pub mod core;
pub mod pkg;
pub mod plugin;

pub use crate::cache::{CachedResponse, KvBackend, RedisBackend, ResponseCache};
pub use crate::core::context::QueryContext;
pub use crate::core::error::{Error, Result};
pub use crate::plugin::registry::Registry;
pub use crate::plugin::sequence::{compile, run};
pub use crate::plugin::{ExecStep, Executor, Matcher, Plugin, PluginEntry};
