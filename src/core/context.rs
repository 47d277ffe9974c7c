/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Per-query execution context.
//!
//! One [`QueryContext`] is created per incoming request and threaded through
//! the whole pipeline. Plugins within one pipeline run sequentially, so the
//! context needs no internal locking.

use crate::core::error::{Error, Result};
use ahash::AHashMap;
use hickory_proto::op::Message;
use std::any::Any;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default deadline distance applied when the listener sets none.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Mutable per-request state.
///
/// The request is frozen at construction; the response slot is written by
/// executor plugins. Attribute values are `Arc`-shared so a branch copy is
/// cheap, and the cancel token is shared with copies so an upstream abort
/// reaches side branches.
#[derive(Clone)]
pub struct QueryContext {
    request: Message,

    /// Response slot written by executor plugins; empty until the pipeline
    /// produces something.
    pub response: Option<Message>,

    attributes: AHashMap<String, Arc<dyn Any + Send + Sync>>,

    src_addr: Option<SocketAddr>,

    deadline: Instant,

    cancel: CancellationToken,
}

impl QueryContext {
    pub fn new(request: Message) -> Self {
        Self {
            request,
            response: None,
            attributes: AHashMap::new(),
            src_addr: None,
            deadline: Instant::now() + DEFAULT_QUERY_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_src_addr(mut self, addr: SocketAddr) -> Self {
        self.src_addr = Some(addr);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = deadline;
        self
    }

    /// The question this pipeline is answering. Never mutates.
    pub fn request(&self) -> &Message {
        &self.request
    }

    pub fn response(&self) -> Option<&Message> {
        self.response.as_ref()
    }

    /// Installs a response, overwriting any prior value.
    pub fn set_response(&mut self, msg: Message) {
        self.response = Some(msg);
    }

    pub fn take_response(&mut self) -> Option<Message> {
        self.response.take()
    }

    pub fn src_addr(&self) -> Option<SocketAddr> {
        self.src_addr
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Handle for the listener to abort this query. Cancellation is
    /// monotonic: once fired it stays set, including on copies.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Errors with [`Error::Cancelled`] when the cancel signal fired or the
    /// deadline elapsed. The interpreter calls this at every dispatch point.
    pub fn check_abort(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled("cancel signal"));
        }
        if Instant::now() >= self.deadline {
            return Err(Error::Cancelled("deadline exceeded"));
        }
        Ok(())
    }

    /// Stores an attribute for plugins further down the pipeline.
    pub fn set_attr<T>(&mut self, name: impl Into<String>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.attributes.insert(name.into(), Arc::new(value));
    }

    pub fn get_attr<T>(&self, name: &str) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.attributes.get(name).and_then(|a| a.downcast_ref())
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.remove(name);
    }
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("request_id", &self.request.id())
            .field("has_response", &self.response.is_some())
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("src_addr", &self.src_addr)
            .field("deadline", &self.deadline)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
